//! Geometry helpers: value ranges + terminal size plumbing.

use terminal_size::{Height, Width, terminal_size};

use crate::core::constants::{
    BORDER_WIDTH, BRAILLE_HORIZONTAL_RESOLUTION as HR, LABEL_GUTTER, MIN_GRAPH_WIDTH,
};

/// Inclusive bounds without any padding.
///
/// * If the series is empty or contains only non-finite values the
///   fallback is `(0.0, 1.0)`.
/// * If *all* finite points are identical we expand by +-0.5 so the graph
///   still has non-zero height.
#[must_use]
pub fn value_bounds(values: &[f64]) -> (f64, f64) {
    let (low, high) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    if !low.is_finite() || !high.is_finite() {
        return (0.0, 1.0);
    }
    if (high - low).abs() < f64::EPSILON {
        return (low - 0.5, high + 0.5);
    }
    (low, high)
}

/// Current terminal geometry (80×30 fallback).
#[inline]
#[must_use]
pub fn terminal_geometry() -> (Width, Height) {
    terminal_size().unwrap_or((Width(80), Height(30)))
}

/// Graph columns for `samples` points in a terminal `term_width` wide,
/// leaving space for borders + labels.
#[inline]
#[must_use]
pub fn graph_width(term_width: Width, samples: usize, label_width: usize) -> usize {
    let available = usize::from(term_width.0)
        .saturating_sub(BORDER_WIDTH + LABEL_GUTTER + label_width + 1);
    samples.div_ceil(HR).min(available).max(MIN_GRAPH_WIDTH)
}

/// How wide will the y-axis labels be for this range?
#[inline]
#[must_use]
pub fn y_label_width(y_range: (f64, f64), decimals: usize) -> usize {
    let (low, high) = y_range;
    let lo = format!("{low:.decimals$}").len();
    let hi = format!("{high:.decimals$}").len();
    lo.max(hi)
}
