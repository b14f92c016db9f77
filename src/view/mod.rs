// VIEW: rendering and the drawing surface
pub mod gpu_init;
pub mod render;

pub use gpu_init::GpuContext;
pub use render::WgpuRenderer;

use crate::model::{PerspectiveCamera, Scene};

/// Output buffer size in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Displayed size times pixel ratio, floored to whole pixels
    pub fn from_display(width: f64, height: f64, pixel_ratio: f64) -> Self {
        Self {
            width: (width * pixel_ratio).floor().max(0.0) as u32,
            height: (height * pixel_ratio).floor().max(0.0) as u32,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Where the frame ends up on screen: a canvas or a native window
pub trait DrawingSurface {
    /// Displayed size in CSS (logical) pixels
    fn display_size(&self) -> (f64, f64);
    fn pixel_ratio(&self) -> f64;
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("surface acquisition timed out")]
    Timeout,
    #[error("out of GPU memory")]
    OutOfMemory,
    #[error("surface error: {0}")]
    Surface(String),
}

/// Draws a scene and owns the output buffer the frame loop keeps in sync
pub trait Renderer {
    fn size(&self) -> ViewportSize;
    fn set_size(&mut self, size: ViewportSize);
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_from_display_floors() {
        assert_eq!(ViewportSize::from_display(800.0, 600.0, 1.0), ViewportSize::new(800, 600));
        assert_eq!(ViewportSize::from_display(333.5, 200.2, 1.5), ViewportSize::new(500, 300));
        assert_eq!(ViewportSize::from_display(100.0, 100.0, 2.0), ViewportSize::new(200, 200));
    }

    #[test]
    fn test_empty_viewport() {
        assert!(ViewportSize::from_display(0.0, 600.0, 1.0).is_empty());
        assert!(!ViewportSize::new(1, 1).is_empty());
    }
}
