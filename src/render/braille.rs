//! Binned series to UTF-8 braille rows.
//!
//! ### Workflow
//! 1. `preprocess_to_braille` maps each binned [`Span`] into pixel-space
//!    extrema (`GraphStep`), one entry per *half* column.
//! 2. `encode_rows` turns the steps into one `String` per character row.
//!
//! The intersection of a contiguous vertical range with a 4-pixel braille
//! cell is always one of 11 canonical patterns (full, top/bottom triplet,
//! top/middle/bottom pair, single dots, empty). The bit-mask for each
//! pattern is pre-computed for the left and right half-columns.

use crate::{
    core::{constants::BRAILLE_VERTICAL_RESOLUTION, error::DrawError},
    render::{binner::Span, chart::ChartConfig},
};

/// Pixel-space min/max inside one half-column. Row 0 is the top.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphStep {
    pub min: usize,
    pub max: usize,
}

#[derive(Debug)]
pub struct BraillePlot {
    pub steps: Vec<Option<GraphStep>>,
}

/// How a series is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fill {
    /// Connect neighbouring spans so the line has no gaps.
    Line,
    /// Fill from each value down to the x axis.
    Area,
}

// --- Pre-Computed Masks ---

/// 0 empty, 1 full, 2 top-three, 3 bottom-three, 4 top-two, 5 middle-two,
/// 6 bottom-two, 7..=10 single dots top to bottom.
const LEFT_MASKS: [u8; 11] = [
    0x00, 0x47, 0x07, 0x46, 0x03, 0x06, 0x44, 0x01, 0x02, 0x04, 0x40,
];
/// Same enumeration for the right half-column.
const RIGHT_MASKS: [u8; 11] = [
    0x00, 0xB8, 0x38, 0xB0, 0x18, 0x30, 0xA0, 0x08, 0x10, 0x20, 0x80,
];

/// Map `(low, high)` pixel offsets inside a 4-row cell to the pattern id.
#[inline]
const fn pattern_id(low: usize, high: usize) -> usize {
    match (low, high) {
        (0, 3) => 1,
        (0, 2) => 2,
        (1, 3) => 3,
        (0, 1) => 4,
        (1, 2) => 5,
        (2, 3) => 6,
        (0, 0) => 7,
        (1, 1) => 8,
        (2, 2) => 9,
        (3, 3) => 10,
        _ => 0,
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn preprocess_to_braille(
    spans: &[Option<Span>],
    config: &ChartConfig,
    fill: Fill,
) -> Result<BraillePlot, DrawError> {
    if spans.iter().all(Option::is_none) {
        return Err(DrawError::EmptyData);
    }

    let vert_px = config.y_chars * BRAILLE_VERTICAL_RESOLUTION;
    let bottom = vert_px.saturating_sub(1);
    let y_span = config.y_max - config.y_min; // > 0 by construction

    // λ : ℝ → [0, vert_px-1], top row is 0
    let map = |y: f64| -> usize {
        let r = ((y - config.y_min) / y_span).clamp(0.0, 1.0) * bottom as f64;
        bottom - r.round() as usize
    };

    let mut steps: Vec<Option<GraphStep>> = spans
        .iter()
        .map(|s| {
            s.map(|s| {
                // larger values sit higher, i.e. on a smaller pixel row
                let (top, low) = (map(s.max), map(s.min));
                match fill {
                    Fill::Line => GraphStep { min: top, max: low },
                    Fill::Area => GraphStep { min: top, max: bottom },
                }
            })
        })
        .collect();

    if fill == Fill::Line {
        let mut prev: Option<GraphStep> = None;
        for step in steps.iter_mut().flatten() {
            let cur = *step;
            if let Some(p) = prev {
                // previous span entirely above: reach up to just below it
                if p.max < cur.min {
                    step.min = p.max + 1;
                }
                // entirely below: reach down to just above it
                if p.min > cur.max {
                    step.max = p.min - 1;
                }
            }
            prev = Some(cur);
        }
    }

    Ok(BraillePlot { steps })
}

fn cell_pattern(step: Option<&Option<GraphStep>>, row_top: usize) -> usize {
    let row_bottom = row_top + BRAILLE_VERTICAL_RESOLUTION - 1;
    match step {
        Some(Some(s)) if s.max >= row_top && s.min <= row_bottom => pattern_id(
            s.min.max(row_top) - row_top,
            s.max.min(row_bottom) - row_top,
        ),
        _ => 0,
    }
}

/// One string of `x_chars` braille glyphs per character row, top first.
#[must_use]
pub fn encode_rows(plot: &BraillePlot, x_chars: usize, y_chars: usize) -> Vec<String> {
    (0..y_chars)
        .map(|row| {
            let row_top = row * BRAILLE_VERTICAL_RESOLUTION;
            (0..x_chars)
                .map(|col| {
                    let left = cell_pattern(plot.steps.get(col * 2), row_top);
                    let right = cell_pattern(plot.steps.get(col * 2 + 1), row_top);
                    let mask = LEFT_MASKS[left] | RIGHT_MASKS[right];
                    // https://en.wikipedia.org/wiki/Braille_Patterns
                    char::from_u32(0x2800 + u32::from(mask)).unwrap_or(' ')
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(y_chars: usize) -> ChartConfig {
        ChartConfig {
            title: String::new(),
            subtitle: None,
            y_min: 0.0,
            y_max: 1.0,
            x_chars: 2,
            y_chars,
            color: None,
        }
    }

    fn span(v: f64) -> Option<Span> {
        Some(Span { min: v, max: v })
    }

    #[test]
    fn extremes_map_to_top_and_bottom_pixels() {
        let plot = preprocess_to_braille(&[span(1.0), span(0.0)], &cfg(1), Fill::Area).unwrap();
        assert_eq!(plot.steps[0], Some(GraphStep { min: 0, max: 3 }));
        assert_eq!(plot.steps[1], Some(GraphStep { min: 3, max: 3 }));
    }

    #[test]
    fn full_columns_encode_to_full_glyph() {
        let plot = BraillePlot {
            steps: vec![Some(GraphStep { min: 0, max: 3 }); 2],
        };
        assert_eq!(encode_rows(&plot, 1, 1), vec!["⣿".to_owned()]);
    }

    #[test]
    fn empty_steps_encode_blank() {
        let plot = BraillePlot { steps: vec![None, None] };
        assert_eq!(encode_rows(&plot, 1, 1), vec!["\u{2800}".to_owned()]);
    }

    #[test]
    fn line_bridges_jumps() {
        let plot = preprocess_to_braille(&[span(1.0), span(0.0)], &cfg(2), Fill::Line).unwrap();
        // second sample reaches back up toward the first
        let second = plot.steps[1].unwrap();
        assert_eq!(second.max, 7);
        assert!(second.min <= 1);
    }

    #[test]
    fn all_missing_is_empty_data() {
        let err = preprocess_to_braille(&[None, None], &cfg(1), Fill::Line);
        assert!(matches!(err, Err(DrawError::EmptyData)));
    }
}
