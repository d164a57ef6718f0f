use nalgebra::Point2;

/// Angle in degrees at vertex `b` formed by the rays `b -> a` and `b -> c`.
///
/// The cosine is clamped to [-1, 1] before `acos` so floating-point
/// overshoot on nearly collinear points cannot produce NaN, and the
/// denominator carries a small epsilon so coincident points stay finite.
pub fn point_angle_deg(a: Point2<f32>, b: Point2<f32>, c: Point2<f32>) -> f32 {
    let v1 = a - b;
    let v2 = c - b;
    let dot = v1.dot(&v2);
    let cos = (dot / (v1.norm() * v2.norm() + 1e-6)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Unsigned distance from `p` to the infinite line through `a` and `b`.
///
/// Computed as |cross(ap, ab)| / |ab|, with the line length floored at one
/// pixel so a degenerate reference segment cannot blow the quotient up.
pub fn perpendicular_distance(p: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f32 {
    let ab = b - a;
    let ap = p - a;
    let cross = (ap.x * ab.y - ap.y * ab.x).abs();
    cross / ab.norm().max(1.0)
}
