// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod error;
pub mod logging;
pub mod utils;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

pub use config::ViewerConfig;
pub use error::ViewerError;

#[cfg(target_arch = "wasm32")]
pub use web::start;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::RefCell;
    use std::ops::ControlFlow;
    use std::rc::Rc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent, Window};

    use crate::config::ViewerConfig;
    use crate::controller::input::wasm::{keyboard_event_to_input, mouse_click_to_input, mouse_move_to_input};
    use crate::controller::{FrameLoop, SharedInput};
    use crate::error::ViewerError;
    use crate::logging;
    use crate::model::{Clock, PerspectiveCamera, Scene};
    use crate::view::{DrawingSurface, GpuContext, RenderError, Renderer, ViewportSize, WgpuRenderer};

    const CANVAS_SELECTOR: &str = "#c";

    #[wasm_bindgen(start)]
    pub async fn start() -> Result<(), JsValue> {
        logging::init();
        let (window, document, canvas) = find_canvas(CANVAS_SELECTOR)?;
        setup_app(&window, &document, canvas).await?;
        Ok(())
    }

    /// Canvas as seen by the frame loop: CSS size and device pixel ratio
    struct CanvasSurface {
        window: Window,
        canvas: HtmlCanvasElement,
    }

    impl DrawingSurface for CanvasSurface {
        fn display_size(&self) -> (f64, f64) {
            (self.canvas.client_width() as f64, self.canvas.client_height() as f64)
        }

        fn pixel_ratio(&self) -> f64 {
            self.window.device_pixel_ratio()
        }
    }

    /// Keeps the canvas drawing-buffer attributes in step with the surface
    /// configuration. CSS size is left alone.
    struct CanvasRenderer {
        inner: WgpuRenderer,
        canvas: HtmlCanvasElement,
    }

    impl Renderer for CanvasRenderer {
        fn size(&self) -> ViewportSize {
            self.inner.size()
        }

        fn set_size(&mut self, size: ViewportSize) {
            self.canvas.set_width(size.width);
            self.canvas.set_height(size.height);
            self.inner.set_size(size);
        }

        fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError> {
            self.inner.render(scene, camera)
        }
    }

    async fn setup_app(
        window: &Window,
        document: &Document,
        canvas: HtmlCanvasElement,
    ) -> Result<(), ViewerError> {
        let config = ViewerConfig::default();

        let gpu = GpuContext::new(&canvas, canvas.width(), canvas.height()).await?;
        let renderer = CanvasRenderer {
            inner: WgpuRenderer::new(gpu, config.sample_count),
            canvas: canvas.clone(),
        };
        let surface = CanvasSurface {
            window: window.clone(),
            canvas: canvas.clone(),
        };

        // RAF timestamps count from the page's time origin
        let mut frame_loop = FrameLoop::from_config(&config, renderer, surface, Clock::starting_at(0.0));

        setup_input_listeners(window, document, &canvas, frame_loop.input())?;

        tracing::info!("starting frame loop");
        AnimationLoop::new(window.clone(), move |now| frame_loop.step(now)).start()
    }

    /// Keyboard on the window, pointer on the canvas
    fn setup_input_listeners(
        window: &Window,
        document: &Document,
        canvas: &HtmlCanvasElement,
        input_state: SharedInput,
    ) -> Result<(), ViewerError> {
        // Keyboard down
        {
            let input_state = input_state.clone();
            let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                if let Some(event) = keyboard_event_to_input(&e, true) {
                    if input_state.borrow_mut().process_event(&event) {
                        e.prevent_default();
                    }
                }
            }) as Box<dyn FnMut(KeyboardEvent)>);
            window.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
            keydown.forget();
        }

        // Keyboard up
        {
            let input_state = input_state.clone();
            let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                if let Some(event) = keyboard_event_to_input(&e, false) {
                    input_state.borrow_mut().process_event(&event);
                }
            }) as Box<dyn FnMut(KeyboardEvent)>);
            window.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
            keyup.forget();
        }

        // Pointer position relative to the canvas centre drives mouse-look
        {
            let input_state = input_state.clone();
            let canvas_for_rect = canvas.clone();
            let mm = Closure::wrap(Box::new(move |e: MouseEvent| {
                let event = mouse_move_to_input(&e, &canvas_for_rect);
                input_state.borrow_mut().process_event(&event);
            }) as Box<dyn FnMut(MouseEvent)>);
            canvas.add_event_listener_with_callback("mousemove", mm.as_ref().unchecked_ref())?;
            mm.forget();
        }

        // Mouse down/up: move forward/back while held
        {
            let input_state = input_state.clone();
            let canvas_focus = canvas.clone();
            let mousedown = Closure::wrap(Box::new(move |e: MouseEvent| {
                let _ = canvas_focus.focus();
                input_state.borrow_mut().process_event(&mouse_click_to_input(&e, true));
            }) as Box<dyn FnMut(MouseEvent)>);
            canvas.add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())?;
            mousedown.forget();
        }
        {
            let input_state = input_state.clone();
            let mouseup = Closure::wrap(Box::new(move |e: MouseEvent| {
                input_state.borrow_mut().process_event(&mouse_click_to_input(&e, false));
            }) as Box<dyn FnMut(MouseEvent)>);
            document.add_event_listener_with_callback("mouseup", mouseup.as_ref().unchecked_ref())?;
            mouseup.forget();
        }

        // Right button moves backwards, so keep the context menu away
        {
            let contextmenu = Closure::wrap(Box::new(move |e: MouseEvent| {
                e.prevent_default();
            }) as Box<dyn FnMut(MouseEvent)>);
            canvas.add_event_listener_with_callback("contextmenu", contextmenu.as_ref().unchecked_ref())?;
            contextmenu.forget();
        }

        Ok(())
    }

    fn find_canvas(selector: &str) -> Result<(Window, Document, HtmlCanvasElement), ViewerError> {
        let window = web_sys::window().ok_or(ViewerError::MissingGlobal("window"))?;
        let document = window.document().ok_or(ViewerError::MissingGlobal("document"))?;
        let element = document
            .query_selector(selector)?
            .ok_or_else(|| ViewerError::CanvasNotFound(selector.to_string()))?;
        let canvas = element
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| ViewerError::NotACanvas(selector.to_string()))?;
        Ok((window, document, canvas))
    }

    /// requestAnimationFrame chain: each callback runs one step and schedules
    /// the next until the step breaks.
    struct AnimationLoop {
        inner: Rc<RefCell<Box<dyn FnMut(f64) -> ControlFlow<()>>>>,
        window: Window,
    }

    impl AnimationLoop {
        fn new(window: Window, f: impl FnMut(f64) -> ControlFlow<()> + 'static) -> Self {
            Self {
                inner: Rc::new(RefCell::new(Box::new(f))),
                window,
            }
        }

        fn start(self) -> Result<(), ViewerError> {
            let inner = self.inner.clone();
            let window = self.window.clone();

            let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut(f64)>>));
            let callback_clone = callback.clone();

            *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
                // RAF hands us milliseconds
                if inner.borrow_mut().as_mut()(timestamp / 1000.0).is_break() {
                    tracing::info!("frame loop stopped");
                    return;
                }

                if let Some(cb) = callback_clone.borrow().as_ref() {
                    if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        tracing::error!("requestAnimationFrame failed: {e:?}");
                    }
                }
            }) as Box<dyn FnMut(f64)>));

            if let Some(cb) = callback.borrow().as_ref() {
                self.window.request_animation_frame(cb.as_ref().unchecked_ref())?;
            }

            // The closure holds its own Rc, so the chain stays alive on its own
            Ok(())
        }
    }
}
