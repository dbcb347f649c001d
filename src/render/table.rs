//! `text.Table`: the typed table as a box-drawn grid.
//!
//! Options: `title`, `maxRows`. Number columns are right-aligned.

use std::fmt::Write;

use crate::{
    core::{
        color::{AnsiCode, colorize},
        data::{ColumnType, TypedTable},
        error::DrawError,
        registry::{Mount, RenderOptions, Renderer},
    },
    render::{RenderStyle, option_str, option_usize},
};

pub struct Table {
    mount: Mount,
    style: RenderStyle,
}

impl Table {
    #[must_use]
    pub fn new(mount: Mount, style: RenderStyle) -> Self {
        Self { mount, style }
    }
}

fn rule(out: &mut String, widths: &[usize], (l, m, r): (&str, &str, &str)) {
    out.push_str(l);
    for (i, w) in widths.iter().enumerate() {
        if i > 0 {
            out.push_str(m);
        }
        out.push_str(&"─".repeat(w + 2));
    }
    out.push_str(r);
    out.push('\n');
}

fn line(out: &mut String, cells: &[String], widths: &[usize], right: &[bool]) {
    out.push('│');
    for ((cell, w), r) in cells.iter().zip(widths).zip(right) {
        let _ = if *r {
            write!(out, " {cell:>w$} │")
        } else {
            write!(out, " {cell:<w$} │")
        };
    }
    out.push('\n');
}

impl Renderer for Table {
    fn draw(&mut self, table: &TypedTable, options: &RenderOptions) -> Result<(), DrawError> {
        if table.columns.is_empty() {
            return Err(DrawError::EmptyData);
        }
        let max_rows = option_usize(options, "maxRows")?.unwrap_or(usize::MAX);
        let shown = table.rows.len().min(max_rows);

        let header: Vec<String> = table.columns.iter().map(|c| c.name.clone()).collect();
        let body: Vec<Vec<String>> = table.rows[..shown]
            .iter()
            .map(|r| r.iter().map(ToString::to_string).collect())
            .collect();
        let right: Vec<bool> = table
            .columns
            .iter()
            .map(|c| c.kind == ColumnType::Number)
            .collect();

        let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
        for row in &body {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        if let Some(title) = option_str(options, "title") {
            let color = self.style.color.then(AnsiCode::industrial_orange);
            out.push_str(&colorize(color.as_ref(), title));
            out.push('\n');
        }
        rule(&mut out, &widths, ("┌", "┬", "┐"));
        line(&mut out, &header, &widths, &vec![false; widths.len()]);
        rule(&mut out, &widths, ("├", "┼", "┤"));
        for row in &body {
            line(&mut out, row, &widths, &right);
        }
        rule(&mut out, &widths, ("└", "┴", "┘"));
        if shown < table.rows.len() {
            let _ = writeln!(out, "… {} more rows", table.rows.len() - shown);
        }

        self.mount.surface.paint(out);
        Ok(())
    }
}
