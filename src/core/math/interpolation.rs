use nalgebra::{Point2, Vector3};

const EPSILON: f32 = 1e-5;

/// Barycentric weights of `p` relative to the screen-space triangle (a, b, c).
///
/// Returns `None` for triangles with (near) zero area.
pub fn barycentric_coordinates(
    p: Point2<f32>,
    a: Point2<f32>,
    b: Point2<f32>,
    c: Point2<f32>,
) -> Option<Vector3<f32>> {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let area_x2 = ab.x * ac.y - ab.y * ac.x;
    if area_x2.abs() < EPSILON {
        return None;
    }

    let inv_area = 1.0 / area_x2;
    let w_b = (ap.x * ac.y - ap.y * ac.x) * inv_area;
    let w_c = (ab.x * ap.y - ab.y * ap.x) * inv_area;

    Some(Vector3::new(1.0 - w_b - w_c, w_b, w_c))
}

#[inline]
pub fn is_inside_triangle(bary: Vector3<f32>) -> bool {
    bary.x >= -EPSILON && bary.y >= -EPSILON && bary.z >= -EPSILON
}

/// Rescales screen-space weights by 1/w so attributes interpolate linearly in view space.
pub fn perspective_correct_barycentric(bary: Vector3<f32>, w: [f32; 3]) -> Option<Vector3<f32>> {
    let inv = w.map(|wi| if wi.abs() > EPSILON { 1.0 / wi } else { 1.0 });
    let weighted = Vector3::new(bary.x * inv[0], bary.y * inv[1], bary.z * inv[2]);

    let sum = weighted.x + weighted.y + weighted.z;
    if sum.abs() < EPSILON {
        return None;
    }
    Some(weighted / sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one_and_hit_vertices() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(4.0, 0.0);
        let c = Point2::new(0.0, 4.0);

        let at_b = barycentric_coordinates(b, a, b, c).unwrap();
        assert!((at_b - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-6);

        let inner = barycentric_coordinates(Point2::new(1.0, 1.0), a, b, c).unwrap();
        assert!((inner.sum() - 1.0).abs() < 1e-6);
        assert!(is_inside_triangle(inner));

        let outer = barycentric_coordinates(Point2::new(5.0, 5.0), a, b, c).unwrap();
        assert!(!is_inside_triangle(outer));
    }

    #[test]
    fn degenerate_triangle_has_no_weights() {
        let p = Point2::new(1.0, 1.0);
        assert!(barycentric_coordinates(p, p, p, Point2::new(2.0, 2.0)).is_none());
    }

    #[test]
    fn equal_depths_leave_weights_unchanged() {
        let bary = Vector3::new(0.2, 0.3, 0.5);
        let corrected = perspective_correct_barycentric(bary, [2.0, 2.0, 2.0]).unwrap();
        assert!((corrected - bary).norm() < 1e-6);
    }
}
