//! Linear RGB colors
//!
//! Colors travel as `Vec3` in `[0, 1]` so they pack straight into light
//! records and uniforms.

use super::math::Vec3;

/// Linear RGB color
pub type Color = Vec3;

/// Opaque white
pub const WHITE: Color = Vec3::new(1.0, 1.0, 1.0);

/// Build a color from 8-bit channels
pub fn rgb(r: u8, g: u8, b: u8) -> Color {
    Vec3::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rgb_scales_channels() {
        assert_relative_eq!(rgb(255, 0, 51), Vec3::new(1.0, 0.0, 0.2));
        assert_relative_eq!(rgb(255, 255, 255), WHITE);
    }
}
