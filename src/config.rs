//! Startup configuration. Everything here is fixed once the viewer starts.

use glam::Vec3;

use crate::controller::ControllerSettings;
use crate::model::Color;

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub camera: CameraConfig,
    pub background: Color,
    pub objects: Vec<ObjectConfig>,
    pub light: LightConfig,
    pub controller: ControllerSettings,
    /// Camera Y offset applied per frame while Space/Shift is held
    pub move_speed: f32,
    /// MSAA samples per pixel; 1 turns antialiasing off
    pub sample_count: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Placeholder until the first resize reconciliation
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub initial_z: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct ObjectConfig {
    pub color: Color,
    pub x: f32,
    pub size: Vec3,
}

#[derive(Debug, Clone, Copy)]
pub struct LightConfig {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            aspect: 2.0,
            near: 0.1,
            far: 1000.0,
            initial_z: 4.0,
        }
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            color: Color::from_hex(0xffffff),
            intensity: 3.0,
            position: Vec3::new(-1.0, 2.0, 4.0),
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let unit = Vec3::ONE;
        Self {
            camera: CameraConfig::default(),
            background: Color::WHITE,
            objects: vec![
                ObjectConfig { color: Color::LIGHT_BLUE, x: 0.0, size: unit },
                ObjectConfig { color: Color::from_hex(0x8844aa), x: -2.0, size: unit },
                ObjectConfig { color: Color::from_hex(0xaa8844), x: 2.0, size: unit },
            ],
            light: LightConfig::default(),
            controller: ControllerSettings::default(),
            move_speed: 0.1,
            sample_count: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_objects() {
        let config = ViewerConfig::default();
        let xs: Vec<f32> = config.objects.iter().map(|o| o.x).collect();
        assert_eq!(xs, vec![0.0, -2.0, 2.0]);
        assert_eq!(config.objects[1].color, Color::from_hex(0x8844aa));
    }

    #[test]
    fn test_antialiasing_on_by_default() {
        assert_eq!(ViewerConfig::default().sample_count, 4);
    }
}
