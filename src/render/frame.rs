//! Box-drawn chart frame: title rule, y labels, braille payload, subtitle rule.

use crate::{
    core::{
        bounds::y_label_width,
        color::{AnsiCode, colorize},
        constants::{BORDER_WIDTH, DECIMAL_PRECISION, LABEL_GUTTER},
    },
    render::chart::ChartConfig,
};

/// Two spaces in front, one space behind
const TITLE_PADDING: usize = 3;

// Box-drawing glyphs
const TL: &str = "┌";
const TR: &str = "┐";
const BL: &str = "└";
const BR: &str = "┘";
const H: &str = "─";
const V: &str = "│";

/// Write centred colored text between horizontal rules.
fn push_centered(buf: &mut String, text: &str, width: usize, color: Option<&AnsiCode>) {
    let inner = width.saturating_sub(TITLE_PADDING);
    let len = text.chars().count();
    if len == 0 || len > inner {
        buf.push_str(&H.repeat(width));
        return;
    }
    let pad_left = (inner - len) / 2;
    let pad_right = inner - len - pad_left;

    buf.push_str(&H.repeat(pad_left));
    buf.push_str("  ");
    buf.push_str(&colorize(color, text));
    buf.push(' ');
    buf.push_str(&H.repeat(pad_right));
}

fn push_blank_line(buf: &mut String, inner: usize) {
    buf.push_str(V);
    buf.push_str(&" ".repeat(inner));
    buf.push_str(V);
    buf.push('\n');
}

/// Assemble the full frame around `rows` (one braille string per row).
///
/// Sizes were validated when `cfg` was built.
#[must_use]
pub fn compose(cfg: &ChartConfig, rows: &[String]) -> String {
    let label_width = y_label_width((cfg.y_min, cfg.y_max), DECIMAL_PRECISION);
    let inner = cfg.x_chars + label_width + LABEL_GUTTER;
    let high_label = format!("{:.*}", DECIMAL_PRECISION, cfg.y_max);
    let low_label = format!("{:.*}", DECIMAL_PRECISION, cfg.y_min);
    let color = cfg.color.as_ref();

    let mut out = String::with_capacity((inner + BORDER_WIDTH) * (rows.len() + 4) * 3);

    // --- top ---
    out.push_str(TL);
    push_centered(&mut out, &cfg.title, inner, color);
    out.push_str(TR);
    out.push('\n');
    push_blank_line(&mut out, inner);

    // --- graph rows ---
    let last = rows.len().saturating_sub(1);
    for (i, row) in rows.iter().enumerate() {
        let label = match i {
            0 => high_label.as_str(),
            i if i == last => low_label.as_str(),
            _ => "",
        };
        out.push_str(V);
        out.push_str(&format!("{label:>label_width$}"));
        out.push_str(&" ".repeat(LABEL_GUTTER));
        out.push_str(&colorize(color, row));
        out.push_str(V);
        out.push('\n');
    }

    // --- bottom ---
    push_blank_line(&mut out, inner);
    out.push_str(BL);
    match &cfg.subtitle {
        Some(sub) => push_centered(&mut out, sub, inner, color),
        None => out.push_str(&H.repeat(inner)),
    }
    out.push_str(BR);
    out.push('\n');
    out
}
