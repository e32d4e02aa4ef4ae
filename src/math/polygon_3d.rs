use super::{Point3, Vector3, TOLERANCE};

/// Computes the unnormalized normal of a polygon using Newell's method.
///
/// The length of the result is twice the polygon area, so a near-zero
/// vector means the polygon is degenerate.
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Vector3 {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let curr = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }
    normal
}

/// Returns the unit normal of a polygon, or `None` if it has no area.
#[must_use]
pub fn polygon_normal(points: &[Point3]) -> Option<Vector3> {
    let normal = newell_normal(points);
    let len = normal.norm();
    if len < TOLERANCE {
        None
    } else {
        Some(normal / len)
    }
}

/// Builds two orthonormal in-plane directions `(u_dir, v_dir)` for a unit normal.
///
/// `u_dir × v_dir` points along `normal`.
#[must_use]
pub fn plane_basis(normal: &Vector3) -> (Vector3, Vector3) {
    // Choose a reference vector not parallel to the normal
    let reference = if normal.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u_dir = reference.cross(normal).normalize();
    let v_dir = normal.cross(&u_dir);
    (u_dir, v_dir)
}
