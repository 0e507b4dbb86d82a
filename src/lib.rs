//! tlview - timeline layout and export for step programs
//!
//! Lays out a matrix of per-step feature values as a horizontally scrolling
//! timeline and exports it as PNG or SVG:
//! - Row roles from position or bilingual feature names
//! - Deterministic column widths and content-driven row heights
//! - Per-role cell rendering (durations, temperatures, rotated text, swatches)
//! - Full-width raster export regardless of scroll position
//!
//! # Usage (Rust)
//!
//! ```
//! use tlview::{ExportFormat, Matrix, TimelineView};
//!
//! let matrix: Matrix = serde_json::from_str(
//!     r#"[["Duration", 10, 20], ["Temperature", 38, 39], ["Aerato", "1", "0"]]"#,
//! ).unwrap();
//! let mut view = TimelineView::new(1280.0);
//! view.load_matrix(matrix);
//! let png = view.export(ExportFormat::Raster).unwrap();
//! assert_eq!(png.filename, "timeline.png");
//! ```
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { layout_timeline, export_png } from 'tlview';
//! await init();
//! const layout = layout_timeline(matrix, { fontSizePx: 14 }, null);
//! const bytes = await export_png(matrix, null, null, 1920);
//! ```

pub mod cells;
pub mod classify;
pub mod color;
pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod render;
pub mod types;
pub mod viewer;

use std::collections::BTreeMap;

use wasm_bindgen::prelude::*;

pub use cells::{CellContent, CellDescriptor, TextOrientation};
pub use classify::{classify, RoleKind};
pub use color::{FeatureColorMap, Rgb};
pub use config::{LayoutConfig, WidthSource};
pub use error::{Result, TlviewError};
pub use export::{Artifact, ExportFormat, ExportHandle, ExportRenderer, ExportRequest};
pub use layout::{layout, GridLayout, LayoutDescriptor};
pub use types::{CellValue, Matrix};
pub use viewer::TimelineView;

/// Inputs shared by the JavaScript entry points. `null`/`undefined` config or
/// colors select the defaults; colors given are applied over the defaults.
fn js_inputs(
    matrix: JsValue,
    config: JsValue,
    colors: JsValue,
) -> std::result::Result<(Matrix, LayoutConfig, FeatureColorMap), JsValue> {
    console_error_panic_hook::set_once();

    let matrix: Matrix = serde_wasm_bindgen::from_value(matrix)
        .map_err(|e| JsValue::from_str(&format!("Invalid matrix: {e}")))?;
    let config: LayoutConfig = if config.is_null() || config.is_undefined() {
        LayoutConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {e}")))?
    };
    let mut feature_colors = FeatureColorMap::default();
    if !(colors.is_null() || colors.is_undefined()) {
        let overrides: BTreeMap<String, String> = serde_wasm_bindgen::from_value(colors)
            .map_err(|e| JsValue::from_str(&format!("Invalid colors: {e}")))?;
        for (feature, hex) in &overrides {
            feature_colors
                .set(feature, hex)
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
        }
    }

    let config = config.with_suggested_export_width(layout::suggested_export_width(matrix.step_count()));
    Ok((matrix, config, feature_colors))
}

/// Lay out a matrix and return the layout descriptor as a `JsValue`
///
/// # Errors
/// Returns an error if an argument cannot be deserialized.
#[wasm_bindgen]
pub fn layout_timeline(
    matrix: JsValue,
    config: JsValue,
    colors: JsValue,
) -> std::result::Result<JsValue, JsValue> {
    let (matrix, config, colors) = js_inputs(matrix, config, colors)?;
    let descriptor = layout(&matrix, &config, &colors);

    serde_wasm_bindgen::to_value(&descriptor)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Render a matrix to SVG markup at the configured export width
///
/// # Errors
/// Returns an error if an argument is invalid or the layout is empty.
#[wasm_bindgen]
pub fn export_svg(
    matrix: JsValue,
    config: JsValue,
    colors: JsValue,
) -> std::result::Result<String, JsValue> {
    let (matrix, config, colors) = js_inputs(matrix, config, colors)?;
    let descriptor = layout(&matrix, &config, &colors);
    let artifact = ExportRenderer::new()
        .export(ExportFormat::Vector, &descriptor, config.export_width_px())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    String::from_utf8(artifact.bytes).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Render a matrix to PNG at `width` logical pixels (2x device pixels).
///
/// Resolves to a `Uint8Array`.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn export_png(matrix: JsValue, config: JsValue, colors: JsValue, width: u32) -> js_sys::Promise {
    let inputs = js_inputs(matrix, config, colors);
    wasm_bindgen_futures::future_to_promise(async move {
        let (matrix, config, colors) = inputs?;
        let descriptor = layout(&matrix, &config, &colors);
        let artifact = ExportRenderer::new().export(ExportFormat::Raster, &descriptor, width)?;
        Ok(js_sys::Uint8Array::from(artifact.bytes.as_slice()).into())
    })
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
