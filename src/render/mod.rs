pub mod binner;
pub mod braille;
pub mod chart;
pub mod frame;
pub mod table;

use serde_json::Value;

pub use braille::{BraillePlot, Fill, preprocess_to_braille};
pub use chart::{Chart, ChartConfig};
pub use table::Table;

use crate::core::{
    error::DrawError,
    registry::{RenderOptions, RendererRegistry},
};

/// Front-end wide rendering switches, captured by the factories.
#[derive(Debug, Clone, Copy)]
pub struct RenderStyle {
    pub color: bool,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self { color: true }
    }
}

/// Register `braille.LineChart`, `braille.AreaChart` and `text.Table`.
pub fn register_builtin(registry: &mut RendererRegistry, style: RenderStyle) {
    registry
        .register("braille.LineChart", move |m| Chart::line(m, style))
        .register("braille.AreaChart", move |m| Chart::area(m, style))
        .register("text.Table", move |m| Table::new(m, style));
}

#[must_use]
pub fn builtin_registry(style: RenderStyle) -> RendererRegistry {
    let mut registry = RendererRegistry::new();
    register_builtin(&mut registry, style);
    registry
}

// --- Option helpers ---

pub(crate) fn option_str<'a>(options: &'a RenderOptions, key: &str) -> Option<&'a str> {
    options.get(key).and_then(Value::as_str)
}

pub(crate) fn option_usize(
    options: &RenderOptions,
    key: &'static str,
) -> Result<Option<usize>, DrawError> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or(DrawError::BadOption {
                key,
                want: "a non-negative integer",
            }),
    }
}

pub(crate) fn option_f64(
    options: &RenderOptions,
    key: &'static str,
) -> Result<Option<f64>, DrawError> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v.as_f64().map(Some).ok_or(DrawError::BadOption {
            key,
            want: "a number",
        }),
    }
}
