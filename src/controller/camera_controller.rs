use std::f32::consts::PI;

use glam::Vec3;

use crate::controller::input::ControlInput;
use crate::model::PerspectiveCamera;

/// Anything that turns accumulated input into camera motion once per frame
pub trait Controller {
    fn update(&mut self, camera: &mut PerspectiveCamera, input: &ControlInput, delta: f32);
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerSettings {
    pub look_speed: f32,
    pub movement_speed: f32,
    pub look_vertical: bool,
    pub auto_forward: bool,
    pub active_look: bool,
    pub constrain_vertical: bool,
    /// Lower polar angle bound in radians, used when `constrain_vertical` is set
    pub vertical_min: f32,
    pub vertical_max: f32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            look_speed: 0.1,
            movement_speed: 5.0,
            look_vertical: true,
            auto_forward: false,
            active_look: true,
            constrain_vertical: true,
            vertical_min: 1.0,
            vertical_max: 2.0,
        }
    }
}

/// First-person camera controls.
///
/// The view turns continuously while the pointer sits off-centre: the offset
/// from the surface centre, scaled by `look_speed` and the frame delta, is
/// accumulated into longitude/latitude (degrees). Keys move the camera along its
/// own axes at `movement_speed` units per second.
#[derive(Debug, Clone)]
pub struct FirstPersonController {
    pub settings: ControllerSettings,
    lat: f32,
    lon: f32,
}

impl FirstPersonController {
    /// Start from the camera's current viewing direction
    pub fn new(settings: ControllerSettings, camera: &PerspectiveCamera) -> Self {
        let dir = camera.forward();
        let phi = dir.y.clamp(-1.0, 1.0).acos();
        let theta = dir.x.atan2(dir.z);

        Self {
            settings,
            lat: 90.0 - phi.to_degrees(),
            lon: theta.to_degrees(),
        }
    }

    pub fn lat(&self) -> f32 {
        self.lat
    }

    pub fn lon(&self) -> f32 {
        self.lon
    }

    fn translate(&self, camera: &mut PerspectiveCamera, input: &ControlInput, distance: f32) {
        let s = &self.settings;
        if input.forward || (s.auto_forward && !input.backward) {
            camera.translate_z(-distance);
        }
        if input.backward {
            camera.translate_z(distance);
        }
        if input.left {
            camera.translate_x(-distance);
        }
        if input.right {
            camera.translate_x(distance);
        }
        if input.up {
            camera.translate_y(distance);
        }
        if input.down {
            camera.translate_y(-distance);
        }
    }
}

impl Controller for FirstPersonController {
    fn update(&mut self, camera: &mut PerspectiveCamera, input: &ControlInput, delta: f32) {
        let s = self.settings;

        self.translate(camera, input, delta * s.movement_speed);

        let look = if s.active_look { delta * s.look_speed } else { 0.0 };
        let vertical_ratio = if s.constrain_vertical {
            PI / (s.vertical_max - s.vertical_min)
        } else {
            1.0
        };

        self.lon -= input.pointer.x * look;
        if s.look_vertical {
            self.lat -= input.pointer.y * look * vertical_ratio;
        }
        self.lat = self.lat.clamp(-85.0, 85.0);

        let mut phi = (90.0 - self.lat).to_radians();
        let theta = self.lon.to_radians();
        if s.constrain_vertical {
            phi = map_linear(phi, 0.0, PI, s.vertical_min, s.vertical_max);
        }

        let target = camera.position + spherical_to_cartesian(1.0, phi, theta);
        camera.look_at(target);
    }
}

fn map_linear(x: f32, a1: f32, a2: f32, b1: f32, b2: f32) -> f32 {
    b1 + (x - a1) * (b2 - b1) / (a2 - a1)
}

/// `phi` is the polar angle from +Y, `theta` the azimuth around Y from +Z
fn spherical_to_cartesian(radius: f32, phi: f32, theta: f32) -> Vec3 {
    let sin_phi = phi.sin() * radius;
    Vec3::new(sin_phi * theta.sin(), phi.cos() * radius, sin_phi * theta.cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn camera() -> PerspectiveCamera {
        let mut cam = PerspectiveCamera::new(75.0, 2.0, 0.1, 1000.0);
        cam.position.z = 4.0;
        cam
    }

    #[test]
    fn test_initial_angles_from_camera() {
        let cam = camera();
        let ctrl = FirstPersonController::new(ControllerSettings::default(), &cam);
        // Looking down -Z
        assert!(ctrl.lat().abs() < 1e-4);
        assert!((ctrl.lon().abs() - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_delta_keeps_position() {
        let mut cam = camera();
        let mut ctrl = FirstPersonController::new(ControllerSettings::default(), &cam);
        let input = ControlInput { forward: true, ..Default::default() };
        ctrl.update(&mut cam, &input, 0.0);
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 4.0));
    }

    #[test]
    fn test_forward_moves_along_view() {
        let mut cam = camera();
        let mut ctrl = FirstPersonController::new(ControllerSettings::default(), &cam);
        let input = ControlInput { forward: true, ..Default::default() };
        ctrl.update(&mut cam, &input, 0.1);

        // 5 units/s for 0.1s along -Z
        assert!((cam.position.z - 3.5).abs() < 1e-4, "z = {}", cam.position.z);
    }

    #[test]
    fn test_constrained_view_stays_within_vertical_bounds() {
        let mut cam = camera();
        let mut ctrl = FirstPersonController::new(ControllerSettings::default(), &cam);
        let input = ControlInput {
            pointer: Vec2::new(0.0, -10_000.0),
            ..Default::default()
        };
        for _ in 0..50 {
            ctrl.update(&mut cam, &input, 0.1);
        }
        assert_eq!(ctrl.lat(), 85.0);

        // phi is remapped into [1, 2] rad, so forward.y = cos(phi) stays within
        let y = cam.forward().y;
        assert!(y <= 1f32.cos() + 1e-4 && y >= 2f32.cos() - 1e-4, "y = {y}");
    }

    #[test]
    fn test_pointer_right_turns_right() {
        let mut cam = camera();
        let mut ctrl = FirstPersonController::new(ControllerSettings::default(), &cam);
        let input = ControlInput {
            pointer: Vec2::new(200.0, 0.0),
            ..Default::default()
        };
        let lon = ctrl.lon();
        ctrl.update(&mut cam, &input, 0.5);
        assert!((ctrl.lon() - (lon - 10.0)).abs() < 1e-3);
        assert!(cam.forward().x > 0.0, "turned towards +X, forward = {:?}", cam.forward());
    }

    #[test]
    fn test_inactive_look_ignores_pointer() {
        let mut cam = camera();
        let settings = ControllerSettings { active_look: false, ..Default::default() };
        let mut ctrl = FirstPersonController::new(settings, &cam);
        let input = ControlInput {
            pointer: Vec2::new(300.0, 300.0),
            ..Default::default()
        };
        let (lat, lon) = (ctrl.lat(), ctrl.lon());
        ctrl.update(&mut cam, &input, 1.0);
        assert_eq!((ctrl.lat(), ctrl.lon()), (lat, lon));
    }

    #[test]
    fn test_map_linear() {
        assert_eq!(map_linear(0.0, 0.0, PI, 1.0, 2.0), 1.0);
        assert!((map_linear(PI / 2.0, 0.0, PI, 1.0, 2.0) - 1.5).abs() < 1e-6);
    }
}
