//! Min/max downsampling of a series onto a fixed number of half-columns.
//!
//! Each bucket keeps the extrema of the samples it covers, so spikes stay
//! visible after binning. NaN samples are skipped; a bucket with no finite
//! sample yields `None` and is drawn empty.

/// Extrema of one bucket.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

/// Index-based bucketing into at most `bins` spans.
///
/// With `bins >= values.len()` every sample gets its own span.
#[must_use]
pub fn bin(values: &[f64], bins: usize) -> Vec<Option<Span>> {
    let n = values.len();
    if n == 0 || bins == 0 {
        return Vec::new();
    }
    if n <= bins {
        return values.iter().map(|&v| span_of(&[v])).collect();
    }
    (0..bins)
        .map(|b| {
            let start = b * n / bins;
            let end = ((b + 1) * n / bins).max(start + 1);
            span_of(&values[start..end])
        })
        .collect()
}

fn span_of(chunk: &[f64]) -> Option<Span> {
    chunk
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<Span>, &v| {
            Some(match acc {
                None => Span { min: v, max: v },
                Some(s) => Span {
                    min: s.min.min(v),
                    max: s.max.max(v),
                },
            })
        })
}
