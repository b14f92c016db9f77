/// Startup failures. Once the first frame is scheduled nothing in the viewer
/// returns this type.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("no global `{0}`")]
    MissingGlobal(&'static str),
    #[error("no drawing surface: element `{0}` not found")]
    CanvasNotFound(String),
    #[error("element `{0}` is not a canvas")]
    NotACanvas(String),
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("surface is not supported by the adapter")]
    UnsupportedSurface,
    #[error("host error: {0}")]
    Host(String),
}

#[cfg(target_arch = "wasm32")]
impl From<ViewerError> for wasm_bindgen::JsValue {
    fn from(e: ViewerError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for ViewerError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        ViewerError::Host(format!("{value:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_problem() {
        let e = ViewerError::CanvasNotFound("#c".into());
        assert_eq!(e.to_string(), "no drawing surface: element `#c` not found");
        assert_eq!(ViewerError::MissingGlobal("window").to_string(), "no global `window`");
    }
}
