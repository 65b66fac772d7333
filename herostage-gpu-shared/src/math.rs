use glam::{EulerRot, Mat4, Quat, Vec3};

/// Right-handed perspective projection with a 0..1 depth range (wgpu convention).
/// `fov_y_degrees` is the vertical field of view.
pub fn perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh(fov_y_degrees.to_radians(), aspect, near, far)
}

/// View matrix of a camera placed at `position` with orientation `rotation`.
pub fn view_matrix(position: Vec3, rotation: Quat) -> Mat4 {
    Mat4::from_rotation_translation(rotation, position).inverse()
}

/// Width over height, or `None` for a collapsed (zero-height) viewport.
pub fn aspect_ratio(width: u32, height: u32) -> Option<f32> {
    if height == 0 {
        None
    } else {
        Some(width as f32 / height as f32)
    }
}

/// Drawing-buffer extent for a CSS extent at the given device pixel ratio.
/// Never returns 0; surfaces cannot be configured with an empty extent.
pub fn physical_extent(css: u32, pixel_ratio: f64) -> u32 {
    ((css as f64 * pixel_ratio).round() as u32).max(1)
}

/// Quaternion for XYZ-ordered Euler angles in radians.
pub fn euler_xyz(x: f32, y: f32, z: f32) -> Quat {
    Quat::from_euler(EulerRot::XYZ, x, y, z)
}

/// Compose a local transform matrix from translation, rotation, and scale.
pub fn compose_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, rotation, translation)
}

/// Inverse-transpose used to carry normals through non-uniform scale.
pub fn normal_matrix(model: &Mat4) -> Mat4 {
    model.inverse().transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    // ── perspective ──

    #[test]
    fn test_perspective_maps_near_and_far_to_depth_range() {
        let proj = perspective(75.0, 16.0 / 9.0, 0.1, 1000.0);
        let near = proj * Vec4::new(0.0, 0.0, -0.1, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -1000.0, 1.0);
        assert!(approx_eq(near.z / near.w, 0.0), "near depth {}", near.z / near.w);
        assert!((far.z / far.w - 1.0).abs() < 1e-4, "far depth {}", far.z / far.w);
    }

    #[test]
    fn test_perspective_aspect_scales_x() {
        let square = perspective(75.0, 1.0, 0.1, 100.0);
        let wide = perspective(75.0, 2.0, 0.1, 100.0);
        assert!(approx_eq(wide.col(0).x * 2.0, square.col(0).x));
        assert!(approx_eq(wide.col(1).y, square.col(1).y));
    }

    // ── view_matrix ──

    #[test]
    fn test_view_matrix_moves_origin_in_front_of_camera() {
        let view = view_matrix(Vec3::new(0.0, 0.0, 3.0), Quat::IDENTITY);
        let origin = view.transform_point3(Vec3::ZERO);
        assert!(approx_eq(origin.z, -3.0));
        assert!(approx_eq(origin.x, 0.0) && approx_eq(origin.y, 0.0));
    }

    // ── aspect_ratio / physical_extent ──

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(aspect_ratio(1920, 1080), Some(1920.0 / 1080.0));
        assert_eq!(aspect_ratio(640, 0), None);
    }

    #[test]
    fn test_physical_extent_scales_and_clamps() {
        assert_eq!(physical_extent(800, 1.0), 800);
        assert_eq!(physical_extent(800, 2.0), 1600);
        assert_eq!(physical_extent(333, 1.5), 500);
        assert_eq!(physical_extent(0, 2.0), 1);
    }

    // ── euler / trs ──

    #[test]
    fn test_euler_y_matches_axis_angle() {
        let q = euler_xyz(0.0, 0.5, 0.0);
        let expected = Quat::from_rotation_y(0.5);
        assert!(q.abs_diff_eq(expected, EPSILON));
    }

    #[test]
    fn test_compose_trs_order() {
        let m = compose_trs(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY, Vec3::splat(10.0));
        // Scale applies before translation
        let p = m.transform_point3(Vec3::new(0.1, 0.0, 0.0));
        assert!(approx_eq(p.x, 2.0));
    }

    #[test]
    fn test_normal_matrix_non_uniform_scale() {
        let model = compose_trs(Vec3::ZERO, Quat::IDENTITY, Vec3::new(2.0, 1.0, 1.0));
        let n = normal_matrix(&model).transform_vector3(Vec3::new(1.0, 1.0, 0.0));
        // x shrinks by the inverse scale
        assert!(approx_eq(n.x, 0.5));
        assert!(approx_eq(n.y, 1.0));
    }
}
