//! Strongly-typed identifiers for simulation entities.
//!
//! Newtype wrappers prevent accidental mixing of body handles with
//! property indices or composite-group ids. All of them are plain
//! indices: records that carry them never extend an object's lifetime.

use serde::{Deserialize, Serialize};

/// Stable handle of a movable body (filament, bead, sphere or solid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// Composite-assembly group ("buddy" group) shared by bodies that are
/// structurally attached to one another, e.g. an aster's core and its fibers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(pub u32);

/// Index into a property table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropId(pub u16);

impl BodyId {
    /// Returns the raw index as `usize` for array indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl GroupId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl PropId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for BodyId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u32> for GroupId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}

impl From<u16> for PropId {
    fn from(val: u16) -> Self {
        Self(val)
    }
}
