// CONTROLLER: input, camera controls and the frame loop
pub mod input;
pub mod camera_controller;
pub mod frame_loop;

pub use input::{ControlInput, InputEvent, InputFlags, InputState, Key, MouseButton};
pub use camera_controller::{Controller, ControllerSettings, FirstPersonController};
pub use frame_loop::{FrameLoop, LoopHandle, SharedInput};
