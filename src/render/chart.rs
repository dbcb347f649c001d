//! `braille.LineChart` / `braille.AreaChart`: one number column as a braille graph.
//!
//! Recognised options: `title`, `subtitle`, `color`, `series`, `width`,
//! `height`, `yMin`, `yMax`. Everything else in the node configuration is
//! ignored.

use crate::{
    core::{
        bounds::{graph_width, terminal_geometry, value_bounds, y_label_width},
        color::AnsiCode,
        constants::{
            BRAILLE_HORIZONTAL_RESOLUTION as HR, DECIMAL_PRECISION, DEFAULT_CHART_HEIGHT,
            MAX_GRAPH_HEIGHT, MAX_GRAPH_WIDTH, MIN_GRAPH_HEIGHT, MIN_GRAPH_WIDTH,
        },
        data::{ColumnType, TypedTable},
        error::DrawError,
        registry::{Mount, RenderOptions, Renderer},
    },
    render::{
        RenderStyle,
        binner::bin,
        braille::{Fill, encode_rows, preprocess_to_braille},
        frame::compose,
        option_f64, option_str, option_usize,
    },
};

/// Immutable parameters for one chart frame.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub title: String,
    pub subtitle: Option<String>,
    pub y_min: f64,
    pub y_max: f64,
    pub x_chars: usize,
    pub y_chars: usize,
    pub color: Option<AnsiCode>,
}

impl ChartConfig {
    #[inline]
    #[must_use]
    pub fn builder(x_chars: usize, y_chars: usize) -> ChartConfigBuilder {
        ChartConfigBuilder::new(x_chars, y_chars)
    }
}

/// Fluent builder with zero allocation until `build`.
#[derive(Debug)]
pub struct ChartConfigBuilder {
    x_chars: usize,
    y_chars: usize,
    title: Option<String>,
    subtitle: Option<String>,
    y_min: Option<f64>,
    y_max: Option<f64>,
    color: Option<Option<AnsiCode>>,
}

impl ChartConfigBuilder {
    pub(crate) fn new(x_chars: usize, y_chars: usize) -> Self {
        Self {
            x_chars,
            y_chars,
            title: None,
            subtitle: None,
            y_min: None,
            y_max: None,
            color: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn title(mut self, t: impl Into<String>) -> Self {
        self.title = Some(t.into());
        self
    }
    #[inline]
    #[must_use]
    pub fn subtitle(mut self, s: impl Into<String>) -> Self {
        self.subtitle = Some(s.into());
        self
    }
    #[inline]
    #[must_use]
    pub fn subtitle_opt(mut self, s: Option<&str>) -> Self {
        if let Some(t) = s {
            self.subtitle = Some(t.to_owned());
        }
        self
    }
    #[inline]
    #[must_use]
    pub fn y_range(mut self, r: std::ops::RangeInclusive<f64>) -> Self {
        self.y_min = Some(*r.start());
        self.y_max = Some(*r.end());
        self
    }
    #[inline]
    #[must_use]
    pub fn color(mut self, c: AnsiCode) -> Self {
        self.color = Some(Some(c));
        self
    }
    #[inline]
    #[must_use]
    pub fn no_color(mut self) -> Self {
        self.color = Some(None);
        self
    }

    pub fn build(self) -> Result<ChartConfig, DrawError> {
        let (got_w, got_h) = (self.x_chars, self.y_chars);
        if got_w < MIN_GRAPH_WIDTH || got_h < MIN_GRAPH_HEIGHT {
            return Err(DrawError::GraphTooSmall {
                want_w: MIN_GRAPH_WIDTH,
                want_h: MIN_GRAPH_HEIGHT,
                got_w,
                got_h,
            });
        }
        if got_w > MAX_GRAPH_WIDTH || got_h > MAX_GRAPH_HEIGHT {
            return Err(DrawError::GraphTooLarge {
                max_w: MAX_GRAPH_WIDTH,
                max_h: MAX_GRAPH_HEIGHT,
                got_w,
                got_h,
            });
        }
        let y_min = self.y_min.unwrap_or(0.0);
        let y_max = self.y_max.unwrap_or(1.0);
        if y_min.is_nan() || y_max.is_nan() || y_min >= y_max {
            return Err(DrawError::InvalidRange {
                low: y_min,
                high: y_max,
            });
        }
        Ok(ChartConfig {
            title: self.title.unwrap_or_default(),
            subtitle: self.subtitle,
            y_min,
            y_max,
            x_chars: self.x_chars,
            y_chars: self.y_chars,
            color: self.color.unwrap_or(Some(AnsiCode::industrial_orange())),
        })
    }
}

/// Chart renderer bound to one mount.
pub struct Chart {
    mount: Mount,
    fill: Fill,
    style: RenderStyle,
}

impl Chart {
    #[must_use]
    pub fn line(mount: Mount, style: RenderStyle) -> Self {
        Self {
            mount,
            fill: Fill::Line,
            style,
        }
    }

    #[must_use]
    pub fn area(mount: Mount, style: RenderStyle) -> Self {
        Self {
            mount,
            fill: Fill::Area,
            style,
        }
    }
}

/// The `series` option, else the first number column.
fn series_index(table: &TypedTable, options: &RenderOptions) -> Result<usize, DrawError> {
    match option_str(options, "series") {
        Some(name) => table
            .column_index(name)
            .filter(|&i| table.columns[i].kind == ColumnType::Number)
            .ok_or_else(|| DrawError::UnknownSeries(name.to_owned())),
        None => table
            .first_column_of(ColumnType::Number)
            .ok_or(DrawError::NoNumericColumn),
    }
}

impl Renderer for Chart {
    fn draw(&mut self, table: &TypedTable, options: &RenderOptions) -> Result<(), DrawError> {
        let index = series_index(table, options)?;
        let values = table.numeric_column(index);
        if !values.iter().any(|v| v.is_finite()) {
            return Err(DrawError::EmptyData);
        }

        let (lo, hi) = value_bounds(&values);
        let y_min = option_f64(options, "yMin")?.unwrap_or(lo);
        let y_max = option_f64(options, "yMax")?.unwrap_or(hi);

        let label_width = y_label_width((y_min, y_max), DECIMAL_PRECISION);
        let x_chars = match option_usize(options, "width")? {
            Some(w) => w,
            None => graph_width(terminal_geometry().0, values.len(), label_width),
        };
        let y_chars = option_usize(options, "height")?.unwrap_or(DEFAULT_CHART_HEIGHT);

        let title = option_str(options, "title").unwrap_or(table.columns[index].name.as_str());
        let mut b = ChartConfig::builder(x_chars, y_chars)
            .title(title)
            .subtitle_opt(option_str(options, "subtitle"))
            .y_range(y_min..=y_max);
        b = match (self.style.color, option_str(options, "color")) {
            (false, _) => b.no_color(),
            (true, Some(name)) => b.color(AnsiCode::from_name(name)?),
            (true, None) => b,
        };
        let cfg = b.build()?;

        let spans = bin(&values, cfg.x_chars * HR);
        let plot = preprocess_to_braille(&spans, &cfg, self.fill)?;
        let rows = encode_rows(&plot, cfg.x_chars, cfg.y_chars);
        self.mount.surface.paint(compose(&cfg, &rows));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::{config::ParseOptions, data::parse_typed, discovery::MountPoint};

    fn options(v: serde_json::Value) -> RenderOptions {
        match v {
            serde_json::Value::Object(m) => m,
            _ => RenderOptions::new(),
        }
    }

    fn table() -> TypedTable {
        parse_typed(
            "month,sales:number,live:boolean\r\nJan,3,yes\r\nFeb,5,no\r\nMar,4,yes\r\nApr,9,yes",
            &ParseOptions::default(),
        )
    }

    fn draw(fill: fn(Mount, RenderStyle) -> Chart, opts: serde_json::Value) -> Result<String, DrawError> {
        let mount = Mount::new(MountPoint { index: 0, id: None });
        let mut chart = fill(mount.clone(), RenderStyle { color: false });
        chart.draw(&table(), &options(opts))?;
        Ok(mount.surface.contents())
    }

    #[test]
    fn draws_first_number_column_with_labels() {
        let out = draw(Chart::line, json!({"width": 20, "height": 8})).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 8 + 4);
        assert!(lines[0].contains("sales"));
        assert!(lines[2].contains("9.0"));
        assert!(lines[9].contains("3.0"));
        assert!(out.chars().any(|c| ('\u{2801}'..='\u{28FF}').contains(&c)));
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn options_override_title_and_range() {
        let out = draw(
            Chart::area,
            json!({"width": 16, "height": 7, "title": "Q1", "subtitle": "units", "yMin": 0, "yMax": 10}),
        )
        .unwrap();
        assert!(out.lines().next().unwrap().contains("Q1"));
        assert!(out.contains("units"));
        assert!(out.contains("10.0"));
    }

    #[test]
    fn series_must_name_a_number_column() {
        assert!(matches!(
            draw(Chart::line, json!({"series": "month", "width": 20, "height": 8})),
            Err(DrawError::UnknownSeries(s)) if s == "month"
        ));
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(matches!(
            draw(Chart::line, json!({"yMin": 5, "yMax": 1, "width": 20, "height": 8})),
            Err(DrawError::InvalidRange { .. })
        ));
    }

    #[test]
    fn zero_height_is_too_small() {
        assert!(matches!(
            draw(Chart::line, json!({"width": 20, "height": 0})),
            Err(DrawError::GraphTooSmall { got_h: 0, .. })
        ));
    }

    #[test]
    fn oversized_width_is_rejected_before_drawing() {
        assert!(matches!(
            draw(Chart::area, json!({"width": 100_000_000_000_u64, "height": 8})),
            Err(DrawError::GraphTooLarge { got_w: 100_000_000_000, .. })
        ));
        assert!(matches!(
            draw(Chart::line, json!({"width": 20, "height": MAX_GRAPH_HEIGHT + 1})),
            Err(DrawError::GraphTooLarge { .. })
        ));
    }

    #[test]
    fn builder_bounds_are_inclusive() {
        let ok = ChartConfig::builder(MAX_GRAPH_WIDTH, MIN_GRAPH_HEIGHT)
            .y_range(0.0..=1.0)
            .build();
        assert!(ok.is_ok());
        let small = ChartConfig::builder(MIN_GRAPH_WIDTH - 1, MIN_GRAPH_HEIGHT).build();
        assert!(matches!(small, Err(DrawError::GraphTooSmall { .. })));
    }

    #[test]
    fn no_number_column_is_an_error() {
        let mount = Mount::new(MountPoint { index: 0, id: None });
        let t = parse_typed("a,b\r\nx,y", &ParseOptions::default());
        let err = Chart::line(mount, RenderStyle::default()).draw(&t, &RenderOptions::new());
        assert!(matches!(err, Err(DrawError::NoNumericColumn)));
    }

    #[test]
    fn colour_option_is_validated_when_colour_is_on() {
        let mount = Mount::new(MountPoint { index: 0, id: None });
        let mut chart = Chart::line(mount, RenderStyle { color: true });
        let err = chart.draw(&table(), &options(json!({"color": "mauve", "width": 20, "height": 8})));
        assert!(matches!(err, Err(DrawError::Color(_))));
    }
}
