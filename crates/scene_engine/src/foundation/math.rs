//! Math utilities and types
//!
//! Thin aliases over nalgebra's `f32` types plus the handful of helpers the
//! scene code needs: axis constants, degree/radian conversion, interpolation,
//! Euler conversion for scene descriptions and GL-style camera matrices.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Rotation3,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// World axes used by transforms and cameras
pub mod axes {
    use super::Vec3;

    /// Local forward axis `(0, 0, 1)`
    pub const FORWARD: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    /// Local left axis `(1, 0, 0)`
    pub const LEFT: Vec3 = Vec3::new(1.0, 0.0, 0.0);

    /// Local up axis `(0, 1, 0)`
    pub const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;

    /// Squared magnitude below which a velocity is treated as zero
    pub const VELOCITY_EPSILON: f32 = 1e-5;
}

/// Math utility functions
pub mod utils {
    use super::*;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Position of `value` inside `[min, max]` as a 0..1 factor
    pub fn inverse_lerp(value: f32, min: f32, max: f32) -> f32 {
        if (max - min).abs() <= f32::EPSILON {
            0.0
        } else {
            (value - min) / (max - min)
        }
    }

    /// Component-wise linear interpolation of two vectors
    pub fn lerp_vec3(a: &Vec3, b: &Vec3, t: f32) -> Vec3 {
        a + (b - a) * t
    }

    /// Normalize, returning zero for a zero-length vector
    pub fn normalize_or_zero(v: &Vec3) -> Vec3 {
        v.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros)
    }

    /// Build a rotation from Euler angles in degrees (pitch about X, yaw about Y, roll about Z)
    pub fn quat_from_euler_degrees(euler: &Vec3) -> Quat {
        Quat::from_euler_angles(
            deg_to_rad(euler.x),
            deg_to_rad(euler.y),
            deg_to_rad(euler.z),
        )
    }

    /// Decompose a rotation into Euler angles in degrees
    pub fn quat_to_euler_degrees(rotation: &Quat) -> Vec3 {
        let (roll, pitch, yaw) = rotation.euler_angles();
        Vec3::new(rad_to_deg(roll), rad_to_deg(pitch), rad_to_deg(yaw))
    }

    /// Transform a point (w = 1) by a homogeneous matrix
    pub fn transform_point(matrix: &Mat4, point: &Vec3) -> Vec3 {
        matrix.transform_point(&Point3::from(*point)).coords
    }

    /// Transform a direction (w = 0) by a homogeneous matrix without renormalizing
    pub fn transform_direction(matrix: &Mat4, direction: &Vec3) -> Vec3 {
        matrix.transform_vector(direction)
    }

    /// Translation column of a homogeneous matrix
    pub fn translation_of(matrix: &Mat4) -> Vec3 {
        Vec3::new(matrix.m14, matrix.m24, matrix.m34)
    }
}

/// Extension trait for Mat4 with camera-oriented constructors
pub trait Mat4Ext {
    /// Create a right-handed perspective projection with a `[-1, 1]` depth range
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;

    /// Inverse, falling back to identity for singular matrices
    fn inverse_or_identity(&self) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_perspective(aspect, fov_y, near, far)
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &up)
    }

    fn inverse_or_identity(&self) -> Mat4 {
        self.try_inverse().unwrap_or_else(Mat4::identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_axes_are_orthonormal() {
        assert_relative_eq!(axes::FORWARD.dot(&axes::LEFT), 0.0);
        assert_relative_eq!(axes::LEFT.cross(&axes::UP), axes::FORWARD);
    }

    #[test]
    fn test_inverse_lerp_handles_degenerate_range() {
        assert_relative_eq!(utils::inverse_lerp(0.5, 0.0, 2.0), 0.25);
        assert_relative_eq!(utils::inverse_lerp(3.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn test_euler_round_trip() {
        let euler = Vec3::new(10.0, 20.0, 30.0);
        let rotation = utils::quat_from_euler_degrees(&euler);
        let back = utils::quat_to_euler_degrees(&rotation);
        assert_relative_eq!(back, euler, epsilon = 1e-3);
    }

    #[test]
    fn test_direction_ignores_translation() {
        let matrix = Mat4::new_translation(&Vec3::new(5.0, 0.0, 0.0));
        let direction = utils::transform_direction(&matrix, &Vec3::new(0.0, 0.0, 2.0));
        assert_relative_eq!(direction, Vec3::new(0.0, 0.0, 2.0), epsilon = EPSILON);
        let point = utils::transform_point(&matrix, &Vec3::zeros());
        assert_relative_eq!(point, Vec3::new(5.0, 0.0, 0.0), epsilon = EPSILON);
    }

    #[test]
    fn test_look_at_moves_target_onto_negative_z() {
        let view = Mat4::look_at(Vec3::new(0.0, 0.0, -5.0), Vec3::zeros(), axes::UP);
        let target = utils::transform_point(&view, &Vec3::zeros());
        assert_relative_eq!(target, Vec3::new(0.0, 0.0, -5.0), epsilon = EPSILON);
    }

    #[test]
    fn test_singular_inverse_falls_back_to_identity() {
        assert_eq!(Mat4::zeros().inverse_or_identity(), Mat4::identity());
    }
}
