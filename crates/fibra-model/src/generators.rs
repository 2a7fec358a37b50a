//! Procedural vertex generators for scenarios and tests.

use fibra_math::Vec3;

/// Vertices of a straight filament of `length`, starting at `start`
/// along `dir`, cut into `segments` equal segments.
///
/// `dir` is normalized; a zero direction falls back to +X.
///
/// # Example
/// ```
/// use fibra_math::Vec3;
/// use fibra_model::generators::straight_fiber;
/// let pts = straight_fiber(Vec3::ZERO, Vec3::X, 5.0, 5);
/// assert_eq!(pts.len(), 6);
/// assert_eq!(pts[5], Vec3::new(5.0, 0.0, 0.0));
/// ```
pub fn straight_fiber(start: Vec3, dir: Vec3, length: f32, segments: usize) -> Vec<Vec3> {
    let segments = segments.max(1);
    let dir = dir.try_normalize().unwrap_or(Vec3::X);
    let step = length / segments as f32;
    (0..=segments)
        .map(|i| start + dir * (step * i as f32))
        .collect()
}

/// Number of segments needed to keep segments no longer than `segmentation`.
pub fn segment_count(length: f32, segmentation: f32) -> usize {
    if segmentation <= 0.0 {
        return 1;
    }
    ((length / segmentation).round() as usize).max(1)
}

/// Points of a ring of `count` vertices with the given `radius`, in the XY
/// plane around `center`. Used to build solids.
pub fn ring(center: Vec3, radius: f32, count: usize) -> Vec<Vec3> {
    let count = count.max(1);
    (0..count)
        .map(|i| {
            let angle = std::f32::consts::TAU * i as f32 / count as f32;
            center + Vec3::new(radius * angle.cos(), radius * angle.sin(), 0.0)
        })
        .collect()
}
