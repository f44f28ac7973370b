use nalgebra::{Vector3, Vector4};

/// Quantizes a [0, 1] color to 8-bit RGB, clamping out-of-range channels.
pub fn to_rgb8(color: Vector3<f32>) -> [u8; 3] {
    let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
    [q(color.x), q(color.y), q(color.z)]
}

/// Expands 8-bit pixels with 1 to 4 channels into normalized RGBA.
/// Gray expands to RGB; missing alpha is opaque.
pub fn rgba_from_bytes(bytes: &[u8]) -> Vector4<f32> {
    let n = |b: u8| b as f32 / 255.0;
    match *bytes {
        [g] => Vector4::new(n(g), n(g), n(g), 1.0),
        [g, a] => Vector4::new(n(g), n(g), n(g), n(a)),
        [r, g, b] => Vector4::new(n(r), n(g), n(b), 1.0),
        [r, g, b, a, ..] => Vector4::new(n(r), n(g), n(b), n(a)),
        [] => Vector4::new(0.0, 0.0, 0.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_clamps() {
        assert_eq!(to_rgb8(Vector3::new(-1.0, 0.5, 2.0)), [0, 128, 255]);
    }

    #[test]
    fn expands_channel_counts() {
        assert_eq!(rgba_from_bytes(&[255]), Vector4::new(1.0, 1.0, 1.0, 1.0));
        assert_eq!(rgba_from_bytes(&[0, 255, 0]), Vector4::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(rgba_from_bytes(&[0, 0, 0, 0]).w, 0.0);
    }
}
