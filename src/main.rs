use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, KeyEvent, MouseButton as WinitMouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use cubeview::controller::{FirstPersonController, FrameLoop, InputEvent, Key, MouseButton};
use cubeview::model::Clock;
use cubeview::view::{DrawingSurface, GpuContext, WgpuRenderer};
use cubeview::{logging, ViewerConfig};

type NativeLoop = FrameLoop<WgpuRenderer, WindowSurface, FirstPersonController>;

/// Window size in physical pixels, so the surface matches it one to one
struct WindowSurface {
    window: Arc<Window>,
}

impl DrawingSurface for WindowSurface {
    fn display_size(&self) -> (f64, f64) {
        let size = self.window.inner_size();
        (size.width as f64, size.height as f64)
    }

    fn pixel_ratio(&self) -> f64 {
        1.0
    }
}

fn key_from_code(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::Space => Key::Space,
        KeyCode::ShiftLeft => Key::ShiftLeft,
        KeyCode::ShiftRight => Key::ShiftRight,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyF => Key::F,
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        _ => return None,
    };
    Some(key)
}

fn mouse_button(button: WinitMouseButton) -> Option<MouseButton> {
    match button {
        WinitMouseButton::Left => Some(MouseButton::Left),
        WinitMouseButton::Right => Some(MouseButton::Right),
        WinitMouseButton::Middle => Some(MouseButton::Middle),
        _ => None,
    }
}

struct App {
    config: ViewerConfig,
    window: Option<Arc<Window>>,
    frame_loop: Option<NativeLoop>,
    started: Instant,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            window: None,
            frame_loop: None,
            started: Instant::now(),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("cubeview")
            .with_inner_size(LogicalSize::new(1280, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let size = window.inner_size();
        let gpu = pollster::block_on(GpuContext::new_native(window.clone(), size.width, size.height))?;
        let surface = WindowSurface { window: window.clone() };

        let mut frame_loop = FrameLoop::from_config(
            &self.config,
            WgpuRenderer::new(gpu, self.config.sample_count),
            surface,
            Clock::starting_at(0.0),
        );
        // The surface starts at the window size, so no resize will fix the aspect up
        if size.width > 0 && size.height > 0 {
            frame_loop.camera.aspect = size.width as f32 / size.height as f32;
            frame_loop.camera.update_projection_matrix();
        }

        self.frame_loop = Some(frame_loop);
        self.window = Some(window);
        self.started = Instant::now();
        Ok(())
    }

    /// Cursor offset from the window centre in logical pixels
    fn pointer_offset(&self, position: PhysicalPosition<f64>) -> Option<InputEvent> {
        let window = self.window.as_ref()?;
        let scale = window.scale_factor();
        let pos = position.to_logical::<f64>(scale);
        let size = window.inner_size().to_logical::<f64>(scale);
        Some(InputEvent::PointerMove {
            x: (pos.x - size.width / 2.0) as f32,
            y: (pos.y - size.height / 2.0) as f32,
        })
    }

    fn dispatch(&mut self, event: InputEvent) {
        if let Some(frame_loop) = &self.frame_loop {
            frame_loop.input().borrow_mut().process_event(&event);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            tracing::error!("failed to start viewer: {e:#}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(frame_loop) = &self.frame_loop {
                    frame_loop.handle().cancel();
                }
                tracing::info!("window closed");
                event_loop.exit();
            }
            WindowEvent::Resized(_) => {
                // Size is reconciled at the start of the next frame
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::KeyboardInput {
                event: KeyEvent { physical_key: PhysicalKey::Code(code), state, repeat, .. },
                ..
            } => {
                if let Some(key) = key_from_code(code) {
                    let event = match state {
                        ElementState::Pressed if repeat => return,
                        ElementState::Pressed => InputEvent::KeyDown(key),
                        ElementState::Released => InputEvent::KeyUp(key),
                    };
                    self.dispatch(event);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(event) = self.pointer_offset(position) {
                    self.dispatch(event);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(button) = mouse_button(button) {
                    let event = match state {
                        ElementState::Pressed => InputEvent::PointerDown(button),
                        ElementState::Released => InputEvent::PointerUp(button),
                    };
                    self.dispatch(event);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = self.started.elapsed().as_secs_f64();
                if let Some(frame_loop) = &mut self.frame_loop {
                    if frame_loop.step(now).is_break() {
                        event_loop.exit();
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    logging::init();
    tracing::info!("cubeview starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(ViewerConfig::default());
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
