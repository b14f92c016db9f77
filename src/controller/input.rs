/// Platform-agnostic input handling
use glam::Vec2;

/// Physical keys the viewer reacts to. Names follow `KeyboardEvent.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    ShiftLeft,
    ShiftRight,
    W,
    A,
    S,
    D,
    R,
    F,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

impl Key {
    pub fn from_code(code: &str) -> Option<Self> {
        let key = match code {
            "Space" => Key::Space,
            "ShiftLeft" => Key::ShiftLeft,
            "ShiftRight" => Key::ShiftRight,
            "KeyW" => Key::W,
            "KeyA" => Key::A,
            "KeyS" => Key::S,
            "KeyD" => Key::D,
            "KeyR" => Key::R,
            "KeyF" => Key::F,
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            _ => return None,
        };
        Some(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn from_web_button(button: i16) -> Self {
        match button {
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => MouseButton::Left,
        }
    }
}

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// Pointer offset from the centre of the drawing surface, in CSS/logical pixels
    PointerMove { x: f32, y: f32 },
    PointerDown(MouseButton),
    PointerUp(MouseButton),
}

/// Vertical fly flags driven by Space and either Shift key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputFlags {
    pub move_up: bool,
    pub move_down: bool,
}

/// Movement and look state consumed by the first-person controller
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub pointer: Vec2,
}

/// Everything the event handlers write and the frame loop reads
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub flags: InputFlags,
    pub controls: ControlInput,
    /// Mouse buttons only drive movement while mouse-look is active
    pub active_look: bool,
}

impl InputState {
    pub fn new(active_look: bool) -> Self {
        Self {
            active_look,
            ..Default::default()
        }
    }

    /// Apply an event. Returns true when the host's default action for the
    /// event (page scroll on Space) should be suppressed.
    pub fn process_event(&mut self, event: &InputEvent) -> bool {
        match *event {
            InputEvent::KeyDown(key) => self.set_key(key, true),
            InputEvent::KeyUp(key) => {
                self.set_key(key, false);
                false
            }
            InputEvent::PointerMove { x, y } => {
                self.controls.pointer = Vec2::new(x, y);
                false
            }
            InputEvent::PointerDown(button) => {
                if self.active_look {
                    self.set_button(button, true);
                }
                false
            }
            InputEvent::PointerUp(button) => {
                if self.active_look {
                    self.set_button(button, false);
                }
                false
            }
        }
    }

    fn set_key(&mut self, key: Key, down: bool) -> bool {
        match key {
            Key::Space => {
                self.flags.move_up = down;
                return down;
            }
            Key::ShiftLeft | Key::ShiftRight => self.flags.move_down = down,
            Key::W | Key::ArrowUp => self.controls.forward = down,
            Key::S | Key::ArrowDown => self.controls.backward = down,
            Key::A | Key::ArrowLeft => self.controls.left = down,
            Key::D | Key::ArrowRight => self.controls.right = down,
            Key::R => self.controls.up = down,
            Key::F => self.controls.down = down,
        }
        false
    }

    fn set_button(&mut self, button: MouseButton, down: bool) {
        match button {
            MouseButton::Left => self.controls.forward = down,
            MouseButton::Right => self.controls.backward = down,
            MouseButton::Middle => {}
        }
    }
}

/// Offset of `point` from the centre of the rectangle at `origin` with `size`,
/// held to the rectangle's half-extents
pub fn centre_offset(point: Vec2, origin: Vec2, size: Vec2) -> Vec2 {
    let half = size / 2.0;
    (point - origin - half).clamp(-half, half)
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> Option<InputEvent> {
        let key = Key::from_code(&e.code())?;
        Some(if is_down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        })
    }

    /// Pointer position relative to the canvas centre
    pub fn mouse_move_to_input(e: &MouseEvent, canvas: &HtmlCanvasElement) -> InputEvent {
        let rect = canvas.get_bounding_client_rect();
        let offset = centre_offset(
            Vec2::new(e.client_x() as f32, e.client_y() as f32),
            Vec2::new(rect.left() as f32, rect.top() as f32),
            Vec2::new(rect.width() as f32, rect.height() as f32),
        );
        InputEvent::PointerMove { x: offset.x, y: offset.y }
    }

    pub fn mouse_click_to_input(e: &MouseEvent, is_down: bool) -> InputEvent {
        let button = MouseButton::from_web_button(e.button());
        if is_down {
            InputEvent::PointerDown(button)
        } else {
            InputEvent::PointerUp(button)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_sets_move_up_and_suppresses_default() {
        let mut input = InputState::new(true);
        assert!(input.process_event(&InputEvent::KeyDown(Key::Space)));
        assert!(input.flags.move_up);

        assert!(!input.process_event(&InputEvent::KeyUp(Key::Space)));
        assert!(!input.flags.move_up);
    }

    #[test]
    fn test_either_shift_moves_down() {
        let mut input = InputState::new(true);
        input.process_event(&InputEvent::KeyDown(Key::ShiftLeft));
        assert!(input.flags.move_down);
        input.process_event(&InputEvent::KeyUp(Key::ShiftLeft));
        assert!(!input.flags.move_down);

        input.process_event(&InputEvent::KeyDown(Key::ShiftRight));
        assert!(input.flags.move_down);
        // Left and right are the same logical action
        input.process_event(&InputEvent::KeyUp(Key::ShiftLeft));
        assert!(!input.flags.move_down);
    }

    #[test]
    fn test_repeated_press_is_idempotent() {
        let mut input = InputState::new(true);
        input.process_event(&InputEvent::KeyDown(Key::Space));
        input.process_event(&InputEvent::KeyDown(Key::Space));
        assert_eq!(input.flags, InputFlags { move_up: true, move_down: false });
    }

    #[test]
    fn test_release_without_press_is_noop() {
        let mut input = InputState::new(true);
        input.process_event(&InputEvent::KeyUp(Key::Space));
        input.process_event(&InputEvent::KeyUp(Key::ShiftRight));
        assert_eq!(input.flags, InputFlags::default());
    }

    #[test]
    fn test_up_and_down_are_independent() {
        let mut input = InputState::new(true);
        input.process_event(&InputEvent::KeyDown(Key::ShiftLeft));
        input.process_event(&InputEvent::KeyDown(Key::Space));
        assert_eq!(input.flags, InputFlags { move_up: true, move_down: true });
    }

    #[test]
    fn test_key_codes() {
        assert_eq!(Key::from_code("Space"), Some(Key::Space));
        assert_eq!(Key::from_code("ShiftRight"), Some(Key::ShiftRight));
        assert_eq!(Key::from_code("KeyW"), Some(Key::W));
        assert_eq!(Key::from_code("Enter"), None);
    }

    #[test]
    fn test_mouse_buttons_follow_active_look() {
        let mut input = InputState::new(true);
        input.process_event(&InputEvent::PointerDown(MouseButton::Left));
        assert!(input.controls.forward);
        input.process_event(&InputEvent::PointerUp(MouseButton::Left));
        assert!(!input.controls.forward);

        let mut passive = InputState::new(false);
        passive.process_event(&InputEvent::PointerDown(MouseButton::Right));
        assert!(!passive.controls.backward);
    }

    #[test]
    fn test_pointer_move_stores_offset() {
        let mut input = InputState::new(true);
        input.process_event(&InputEvent::PointerMove { x: -12.0, y: 30.0 });
        assert_eq!(input.controls.pointer, Vec2::new(-12.0, 30.0));
    }

    #[test]
    fn test_centre_offset_is_bounded_by_half_extents() {
        let origin = Vec2::new(10.0, 20.0);
        let size = Vec2::new(800.0, 600.0);
        assert_eq!(centre_offset(Vec2::new(410.0, 320.0), origin, size), Vec2::ZERO);
        assert_eq!(centre_offset(Vec2::new(110.0, 20.0), origin, size), Vec2::new(-300.0, -300.0));
        // Far outside the rectangle the offset stops at its edge
        assert_eq!(centre_offset(Vec2::new(5000.0, -900.0), origin, size), Vec2::new(400.0, -300.0));
    }
}
