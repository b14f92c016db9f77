use std::cell::{Cell, RefCell};
use std::ops::ControlFlow;
use std::rc::Rc;

use crate::config::ViewerConfig;
use crate::controller::camera_controller::{Controller, FirstPersonController};
use crate::controller::input::InputState;
use crate::model::{AnimatedObject, Clock, FrameTime, PerspectiveCamera, Scene};
use crate::view::{DrawingSurface, Renderer, ViewportSize};

/// Input state shared between the event handlers and the frame loop
pub type SharedInput = Rc<RefCell<InputState>>;

/// Cancellation token checked at the top of every frame.
/// Nothing cancels it by default, so the loop runs until the host goes away.
#[derive(Debug, Clone, Default)]
pub struct LoopHandle {
    cancelled: Rc<Cell<bool>>,
}

impl LoopHandle {
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Per-frame orchestration: timing, resize, vertical input, controller,
/// cube animation and drawing.
pub struct FrameLoop<R, S, C> {
    pub renderer: R,
    pub surface: S,
    pub controller: C,
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub animated: Vec<AnimatedObject>,
    input: SharedInput,
    clock: Clock,
    move_speed: f32,
    handle: LoopHandle,
}

impl<R: Renderer, S: DrawingSurface> FrameLoop<R, S, FirstPersonController> {
    /// Build the configured scene, camera and first-person controls.
    pub fn from_config(config: &ViewerConfig, renderer: R, surface: S, clock: Clock) -> Self {
        let cam = &config.camera;
        let mut camera = PerspectiveCamera::new(cam.fov, cam.aspect, cam.near, cam.far);
        camera.position.z = cam.initial_z;

        let controller = FirstPersonController::new(config.controller, &camera);
        let (scene, animated) = Scene::from_config(config);
        let input = Rc::new(RefCell::new(InputState::new(config.controller.active_look)));

        Self::new(renderer, surface, controller, scene, camera, animated, input, clock, config.move_speed)
    }
}

impl<R: Renderer, S: DrawingSurface, C: Controller> FrameLoop<R, S, C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        renderer: R,
        surface: S,
        controller: C,
        scene: Scene,
        camera: PerspectiveCamera,
        animated: Vec<AnimatedObject>,
        input: SharedInput,
        clock: Clock,
        move_speed: f32,
    ) -> Self {
        Self {
            renderer,
            surface,
            controller,
            scene,
            camera,
            animated,
            input,
            clock,
            move_speed,
            handle: LoopHandle::default(),
        }
    }

    /// Handle to clone into event listeners
    pub fn input(&self) -> SharedInput {
        self.input.clone()
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    /// Run one frame for host timestamp `now` (seconds).
    /// Breaks without touching any state once the loop has been cancelled.
    pub fn step(&mut self, now: f64) -> ControlFlow<()> {
        if self.handle.is_cancelled() {
            return ControlFlow::Break(());
        }

        let FrameTime { elapsed, delta } = self.clock.tick(now);

        self.reconcile_size();
        self.apply_vertical_input();

        let controls = self.input.borrow().controls;
        self.controller.update(&mut self.camera, &controls, delta as f32);

        self.animate(elapsed);

        if let Err(e) = self.renderer.render(&self.scene, &self.camera) {
            tracing::warn!("frame skipped: {e}");
        }

        ControlFlow::Continue(())
    }

    /// Match the renderer's buffer to the displayed size. Returns whether a
    /// resize happened; a second call without a display change is a no-op.
    pub fn reconcile_size(&mut self) -> bool {
        let (width, height) = self.surface.display_size();
        let desired = ViewportSize::from_display(width, height, self.surface.pixel_ratio());

        // Minimised or hidden surface: keep the previous buffer
        if desired.is_empty() || desired == self.renderer.size() {
            return false;
        }

        tracing::debug!(width = desired.width, height = desired.height, "resizing output buffer");
        self.renderer.set_size(desired);
        self.camera.aspect = (width / height) as f32;
        self.camera.update_projection_matrix();
        true
    }

    /// Space/Shift move the camera by a fixed step per frame; both cancel out.
    pub fn apply_vertical_input(&mut self) {
        let flags = self.input.borrow().flags;
        if flags.move_up {
            self.camera.position.y += self.move_speed;
        }
        if flags.move_down {
            self.camera.position.y -= self.move_speed;
        }
    }

    /// Set absolute rotations from elapsed time. Nothing accumulates.
    pub fn animate(&mut self, elapsed: f64) {
        for anim in &self.animated {
            if let Some(object) = self.scene.objects.get_mut(anim.object) {
                let angle = anim.angle_at(elapsed) as f32;
                object.rotation.x = angle;
                object.rotation.y = angle;
            }
        }
    }
}
