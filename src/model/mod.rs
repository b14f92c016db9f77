// MODEL: camera, scene contents and frame timing
pub mod camera;
pub mod clock;
pub mod scene;

pub use camera::PerspectiveCamera;
pub use clock::{Clock, FrameTime};
pub use scene::{AnimatedObject, Color, DirectionalLight, Scene, SceneObject};
