use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

use crate::config::ViewerConfig;

/// sRGB colour with components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };
    /// CSS `lightblue`
    pub const LIGHT_BLUE: Color = Color::from_hex(0xadd8e6);

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn to_linear(self) -> [f32; 3] {
        fn channel(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        [channel(self.r), channel(self.g), channel(self.b)]
    }
}

/// A box mesh placed in the scene. `scale` carries the box dimensions.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub position: Vec3,
    /// Euler angles in radians, applied in XYZ order
    pub rotation: Vec3,
    pub scale: Vec3,
    pub color: Color,
}

impl SceneObject {
    pub fn new(color: Color, size: Vec3) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: size,
            color,
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }

    pub fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(self.model_matrix()).inverse().transpose()
    }
}

/// Light shining from `position` towards `target`
#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl DirectionalLight {
    /// Unit vector pointing from the lit surface towards the light
    pub fn direction(&self) -> Vec3 {
        (self.position - self.target).normalize_or_zero()
    }
}

/// An object spun by the frame loop. The angle is a pure function of elapsed
/// time, so frames can be skipped without drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatedObject {
    /// Index into `Scene::objects`
    pub object: usize,
    pub speed: f64,
}

impl AnimatedObject {
    /// Speed multiplier `1 + index * 0.1`
    pub fn at_index(index: usize) -> Self {
        Self {
            object: index,
            speed: 1.0 + index as f64 * 0.1,
        }
    }

    pub fn angle_at(&self, elapsed: f64) -> f64 {
        elapsed * self.speed
    }
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub background: Color,
    pub objects: Vec<SceneObject>,
    pub lights: Vec<DirectionalLight>,
}

impl Scene {
    pub fn new(background: Color) -> Self {
        Self {
            background,
            objects: Vec::new(),
            lights: Vec::new(),
        }
    }

    pub fn add_object(&mut self, object: SceneObject) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn add_light(&mut self, light: DirectionalLight) {
        self.lights.push(light);
    }

    /// Build the configured scene together with one animation per object.
    pub fn from_config(config: &ViewerConfig) -> (Self, Vec<AnimatedObject>) {
        let mut scene = Scene::new(config.background);

        let animated = config
            .objects
            .iter()
            .enumerate()
            .map(|(i, obj)| {
                let mut object = SceneObject::new(obj.color, obj.size);
                object.position.x = obj.x;
                let index = scene.add_object(object);
                debug_assert_eq!(index, i);
                AnimatedObject::at_index(index)
            })
            .collect();

        scene.add_light(DirectionalLight {
            color: config.light.color,
            intensity: config.light.intensity,
            position: config.light.position,
            target: Vec3::ZERO,
        });

        (scene, animated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        let c = Color::from_hex(0xff8000);
        assert_eq!(c.r, 1.0);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn test_linear_conversion_keeps_endpoints() {
        for c in Color::WHITE.to_linear() {
            assert!((c - 1.0).abs() < 1e-5);
        }
        assert_eq!(Color::from_hex(0x000000).to_linear(), [0.0, 0.0, 0.0]);
        let mid = Color::from_hex(0x808080).to_linear()[0];
        assert!(mid > 0.2 && mid < 0.23, "sRGB 0.5 is about 0.216 linear, got {mid}");
    }

    #[test]
    fn test_speed_multipliers() {
        let speeds: Vec<f64> = (0..3).map(|i| AnimatedObject::at_index(i).speed).collect();
        assert_eq!(speeds[0], 1.0);
        assert!((speeds[1] - 1.1).abs() < 1e-12);
        assert!((speeds[2] - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_angle_is_unbounded_and_monotonic() {
        let anim = AnimatedObject::at_index(2);
        let mut last = f64::MIN;
        for step in 0..100 {
            let angle = anim.angle_at(step as f64 * 0.5);
            assert!(angle >= last);
            last = angle;
        }
        assert!(last > std::f64::consts::TAU, "angle is not wrapped");
    }

    #[test]
    fn test_from_config_builds_default_scene() {
        let (scene, animated) = Scene::from_config(&ViewerConfig::default());
        assert_eq!(scene.objects.len(), 3);
        assert_eq!(animated.len(), 3);
        assert_eq!(scene.objects[1].position, Vec3::new(-2.0, 0.0, 0.0));
        assert_eq!(scene.objects[2].position, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(scene.lights.len(), 1);
        assert_eq!(scene.lights[0].intensity, 3.0);
        assert_eq!(scene.background, Color::WHITE);
    }

    #[test]
    fn test_model_matrix_places_object() {
        let mut object = SceneObject::new(Color::WHITE, Vec3::ONE);
        object.position = Vec3::new(2.0, 0.0, 0.0);
        object.rotation = Vec3::new(0.3, 0.3, 0.0);
        let origin = object.model_matrix().transform_point3(Vec3::ZERO);
        assert!((origin - object.position).length() < 1e-6);
    }

    #[test]
    fn test_light_direction_points_at_light() {
        let light = DirectionalLight {
            color: Color::WHITE,
            intensity: 1.0,
            position: Vec3::new(0.0, 5.0, 0.0),
            target: Vec3::ZERO,
        };
        assert_eq!(light.direction(), Vec3::Y);
    }
}
