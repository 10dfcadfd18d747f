//! Fixed perspective camera looking at the field from the front.

use glam::{Mat4, Vec3};

/// Perspective camera on the +Z axis, aimed at the origin.
///
/// Only the aspect ratio changes at runtime (window resize).
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Distance from the origin along +Z.
    pub distance: f32,
    aspect: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            fov_y: 60.0_f32.to_radians(),
            near: 0.1,
            far: 2000.0,
            distance: 350.0,
            aspect: 16.0 / 9.0,
        }
    }

    /// Match the output surface. Zero sizes (minimised window) are ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.distance)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), Vec3::ZERO, Vec3::Y)
    }

    /// World-space width per unit of point size.
    ///
    /// A node of size `s` at depth `d` covers `s * (height / 2) / d` pixels,
    /// the usual attenuated point-sprite rule, on any viewport.
    #[inline]
    pub fn point_scale(&self) -> f32 {
        (self.fov_y * 0.5).tan()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_projects_to_centre() {
        let camera = Camera::new();
        let clip = camera.projection_matrix() * camera.view_matrix() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_point_size_matches_attenuated_sprites() {
        let mut camera = Camera::new();
        let height = 720.0;
        camera.set_viewport(1280, height as u32);

        let size = 3.5;
        let width = size * camera.point_scale();
        let clip_proj = camera.projection_matrix() * camera.view_matrix();
        let bottom = clip_proj * Vec3::ZERO.extend(1.0);
        let top = clip_proj * Vec3::new(0.0, width, 0.0).extend(1.0);
        let pixels = (top.y / top.w - bottom.y / bottom.w) * height * 0.5;

        let expected = size * (height * 0.5) / camera.distance;
        assert!((pixels - expected).abs() < 1e-3, "{pixels} vs {expected}");
    }

    #[test]
    fn test_resize_changes_aspect_only() {
        let mut camera = Camera::new();
        camera.set_viewport(1000, 500);
        assert_eq!(camera.aspect(), 2.0);
        assert_eq!(camera.distance, 350.0);

        camera.set_viewport(0, 500);
        assert_eq!(camera.aspect(), 2.0);
    }
}
