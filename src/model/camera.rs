use glam::{Mat3, Mat4, Quat, Vec3};

/// Perspective camera with a cached projection matrix.
///
/// `fov` is the vertical field of view in degrees. The projection is only
/// rebuilt by [`PerspectiveCamera::update_projection_matrix`], so callers that
/// change `fov`, `aspect`, `near` or `far` must call it afterwards.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub orientation: Quat,
    pub up: Vec3,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            up: Vec3::Y,
            fov,
            aspect,
            near,
            far,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Direction the camera looks along (its local -Z axis)
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view()
    }

    /// Move along one of the camera's local axes.
    pub fn translate_on_axis(&mut self, axis: Vec3, distance: f32) {
        self.position += self.orientation * axis * distance;
    }

    pub fn translate_x(&mut self, distance: f32) {
        self.translate_on_axis(Vec3::X, distance);
    }

    pub fn translate_y(&mut self, distance: f32) {
        self.translate_on_axis(Vec3::Y, distance);
    }

    pub fn translate_z(&mut self, distance: f32) {
        self.translate_on_axis(Vec3::Z, distance);
    }

    /// Rotate so that the local -Z axis points at `target`.
    pub fn look_at(&mut self, target: Vec3) {
        let back = self.position - target;
        if back.length_squared() == 0.0 {
            return;
        }
        let z = back.normalize();

        // Looking straight along `up` leaves the right axis undefined; nudge z
        let mut x = self.up.cross(z);
        if x.length_squared() == 0.0 {
            let nudged = (z + Vec3::new(0.0, 0.0, 1e-4)).normalize();
            x = self.up.cross(nudged);
            if x.length_squared() == 0.0 {
                x = self.up.cross(z + Vec3::new(1e-4, 0.0, 0.0));
            }
        }
        let x = x.normalize();
        let y = z.cross(x);

        self.orientation = Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_new_camera_faces_negative_z() {
        let cam = PerspectiveCamera::new(75.0, 2.0, 0.1, 1000.0);
        assert!(approx(cam.forward(), Vec3::NEG_Z));
        assert!(!cam.view_proj().col(0).x.is_nan());
    }

    #[test]
    fn test_projection_only_changes_on_update() {
        let mut cam = PerspectiveCamera::new(75.0, 2.0, 0.1, 1000.0);
        let before = cam.projection();

        cam.aspect = 800.0 / 600.0;
        assert_eq!(cam.projection(), before, "projection is cached until updated");

        cam.update_projection_matrix();
        assert_ne!(cam.projection(), before);
        assert_eq!(
            cam.projection(),
            Mat4::perspective_rh(75f32.to_radians(), 800.0 / 600.0, 0.1, 1000.0)
        );
    }

    #[test]
    fn test_look_at_points_forward_at_target() {
        let mut cam = PerspectiveCamera::new(75.0, 2.0, 0.1, 1000.0);
        cam.position = Vec3::new(0.0, 0.0, 4.0);
        cam.look_at(Vec3::new(3.0, 0.0, 4.0));
        assert!(approx(cam.forward(), Vec3::X), "forward was {:?}", cam.forward());

        // Up stays upright
        assert!((cam.orientation * Vec3::Y).y > 0.99);
    }

    #[test]
    fn test_look_at_straight_up_is_finite() {
        let mut cam = PerspectiveCamera::new(75.0, 2.0, 0.1, 1000.0);
        cam.look_at(Vec3::new(0.0, 10.0, 0.0));
        assert!(cam.orientation.is_finite());
        assert!(cam.forward().y > 0.99);
    }

    #[test]
    fn test_translate_follows_orientation() {
        let mut cam = PerspectiveCamera::new(75.0, 2.0, 0.1, 1000.0);
        cam.look_at(Vec3::new(1.0, 0.0, 0.0));

        // Moving "forward" is -Z in camera space
        cam.translate_z(-2.0);
        assert!(approx(cam.position, Vec3::new(2.0, 0.0, 0.0)));

        cam.translate_y(1.0);
        assert!(approx(cam.position, Vec3::new(2.0, 1.0, 0.0)));
    }
}
