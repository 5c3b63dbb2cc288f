use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

use pixscale::pixel::{argb_from_rgba_bytes, rgba_bytes_from_argb};
use pixscale::{
    scale_image, scale_image_proportionally, Extent, ImageHandle, ImageHost, MemoryHost,
    PixelBuffer, Rect, ScaleError, ScaleType,
};

// ── Tsify types for TypeScript interface generation ──

/// Source region passed from JavaScript.
#[derive(Tsify, Serialize, Deserialize, Clone, Copy)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct WasmRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl From<WasmRect> for Rect {
    fn from(r: WasmRect) -> Self {
        Rect::new(r.left, r.top, r.width, r.height)
    }
}

/// Image dimensions returned to JavaScript.
#[derive(Tsify, Serialize, Deserialize)]
#[tsify(into_wasm_abi)]
pub struct WasmExtent {
    pub width: u32,
    pub height: u32,
}

impl From<Extent> for WasmExtent {
    fn from(e: Extent) -> Self {
        WasmExtent {
            width: e.width,
            height: e.height,
        }
    }
}

// ── Image store ──

/// Image store handed to scripts. Scale calls name images by numeric handle
/// and report success as a boolean; `lastError()` explains a `false`.
#[wasm_bindgen]
pub struct ImageStore {
    host: MemoryHost,
    last_error: Option<String>,
}

impl Default for ImageStore {
    fn default() -> Self {
        Self::from_host(MemoryHost::new())
    }
}

#[wasm_bindgen]
impl ImageStore {
    /// Create an empty store.
    #[wasm_bindgen(constructor)]
    pub fn new() -> ImageStore {
        ImageStore::default()
    }

    /// Create a store whose images and scratch buffers share a byte budget.
    #[wasm_bindgen(js_name = "withMemoryLimit")]
    pub fn with_memory_limit(bytes: usize) -> ImageStore {
        Self::from_host(MemoryHost::new().with_memory_limit(bytes))
    }

    /// Add an RGBA image (4 bytes per pixel) and return its handle.
    #[wasm_bindgen(js_name = "addImageRgba")]
    pub fn add_image_rgba(&mut self, data: &[u8], width: u32, height: u32) -> Result<u32, JsError> {
        self.insert_rgba(data, width, height)
            .map(|h| h.0)
            .map_err(|e| JsError::new(&e))
    }

    /// Reserve a handle for the result of a scale call.
    #[wasm_bindgen(js_name = "createPlaceholder")]
    pub fn create_placeholder(&mut self) -> u32 {
        self.host.create_placeholder().0
    }

    /// Dimensions of a bound image.
    #[wasm_bindgen(js_name = "imageSize")]
    pub fn image_size(&self, handle: u32) -> Result<JsValue, JsError> {
        let extent = self
            .host
            .image_size(ImageHandle(handle))
            .map_err(|e| JsError::new(&e.to_string()))?;
        serde_wasm_bindgen::to_value(&WasmExtent::from(extent)).map_err(|e| JsError::new(&e.to_string()))
    }

    /// RGBA bytes of a bound image.
    #[wasm_bindgen(js_name = "imageDataRgba")]
    pub fn image_data_rgba(&self, handle: u32) -> Result<js_sys::Uint8Array, JsError> {
        let bytes = self
            .rgba_bytes(ImageHandle(handle))
            .ok_or_else(|| JsError::new(&format!("no image bound to handle {handle}")))?;
        Ok(js_sys::Uint8Array::from(bytes.as_slice()))
    }

    /// Release a handle. Returns whether an image was bound to it.
    #[wasm_bindgen(js_name = "removeImage")]
    pub fn remove_image(&mut self, handle: u32) -> bool {
        self.host.remove(ImageHandle(handle)).is_some()
    }

    /// Scale to an explicit size. `rect` may be `undefined` for the whole
    /// image; `scaleType` is 1 (nearest neighbour) or 2 (bilinear).
    #[wasm_bindgen(js_name = "imageScale")]
    pub fn image_scale(
        &mut self,
        source: u32,
        rect: JsValue,
        placeholder: u32,
        width: u32,
        height: u32,
        scale_type: i32,
    ) -> bool {
        match parse_rect(rect) {
            Ok(rect) => self.scale_to(source, rect, placeholder, width, height, scale_type),
            Err(msg) => self.fail(msg),
        }
    }

    /// Scale by a uniform factor.
    #[wasm_bindgen(js_name = "imageScaleProportionally")]
    pub fn image_scale_proportionally(
        &mut self,
        source: u32,
        rect: JsValue,
        placeholder: u32,
        factor: f64,
        scale_type: i32,
    ) -> bool {
        match parse_rect(rect) {
            Ok(rect) => self.scale_by(source, rect, placeholder, factor, scale_type),
            Err(msg) => self.fail(msg),
        }
    }

    /// Why the last scale call returned `false`, cleared by the next success.
    #[wasm_bindgen(js_name = "lastError")]
    pub fn last_error(&self) -> Option<String> {
        self.last_error.clone()
    }
}

impl ImageStore {
    fn from_host(host: MemoryHost) -> Self {
        ImageStore {
            host,
            last_error: None,
        }
    }

    fn insert_rgba(&mut self, data: &[u8], width: u32, height: u32) -> Result<ImageHandle, String> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(format!(
                "RGBA data length {} does not match {}x{}x4 = {}",
                data.len(),
                width,
                height,
                expected,
            ));
        }
        let pixels = argb_from_rgba_bytes(data);
        Ok(self.host.add_image(PixelBuffer::from_buf(width, height, width, pixels)))
    }

    fn rgba_bytes(&self, handle: ImageHandle) -> Option<Vec<u8>> {
        self.host
            .image(handle)
            .map(|img| rgba_bytes_from_argb(&img.to_packed()))
    }

    fn scale_to(
        &mut self,
        source: u32,
        rect: Option<Rect>,
        placeholder: u32,
        width: u32,
        height: u32,
        scale_type: i32,
    ) -> bool {
        let result = ScaleType::try_from(scale_type).and_then(|t| {
            scale_image(
                &mut self.host,
                ImageHandle(source),
                rect,
                ImageHandle(placeholder),
                width,
                height,
                t,
            )
        });
        self.record(result)
    }

    fn scale_by(
        &mut self,
        source: u32,
        rect: Option<Rect>,
        placeholder: u32,
        factor: f64,
        scale_type: i32,
    ) -> bool {
        let result = ScaleType::try_from(scale_type).and_then(|t| {
            scale_image_proportionally(
                &mut self.host,
                ImageHandle(source),
                rect,
                ImageHandle(placeholder),
                factor,
                t,
            )
        });
        self.record(result)
    }

    fn record(&mut self, result: Result<Extent, ScaleError>) -> bool {
        match result {
            Ok(_) => {
                self.last_error = None;
                true
            }
            Err(e) => self.fail(e.to_string()),
        }
    }

    fn fail(&mut self, msg: String) -> bool {
        self.last_error = Some(msg);
        false
    }
}

fn parse_rect(rect: JsValue) -> Result<Option<Rect>, String> {
    if rect.is_undefined() || rect.is_null() {
        return Ok(None);
    }
    serde_wasm_bindgen::from_value::<WasmRect>(rect)
        .map(|r| Some(r.into()))
        .map_err(|e| format!("invalid rect: {e}"))
}
