//! Integration tests for fibra-types.

use fibra_types::{BodyId, FibraError, GroupId, PropId};

// ─── ID Tests ──────────────────────────────────────────────────

#[test]
fn body_id_index() {
    let id = BodyId(42);
    assert_eq!(id.index(), 42);
}

#[test]
fn group_id_equality() {
    assert_eq!(GroupId(3), GroupId::from(3));
    assert_ne!(GroupId(3), GroupId(4));
}

#[test]
fn body_ids_are_ordered() {
    let mut ids = vec![BodyId(5), BodyId(1), BodyId(3)];
    ids.sort();
    assert_eq!(ids, vec![BodyId(1), BodyId(3), BodyId(5)]);
}

#[test]
fn ids_are_serializable() {
    let id = PropId(7);
    let json = serde_json::to_string(&id).unwrap();
    let deserialized: PropId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, deserialized);
}

// ─── Error Tests ──────────────────────────────────────────────

#[test]
fn error_display() {
    let err = FibraError::InvalidConfig("steric pane 3 is out of range".into());
    assert!(err.to_string().contains("pane 3"));
    assert!(err.to_string().starts_with("Invalid configuration"));
}

#[test]
fn io_error_converts() {
    fn read() -> fibra_types::FibraResult<()> {
        Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))?;
        Ok(())
    }
    assert!(matches!(read(), Err(FibraError::Io(_))));
}
