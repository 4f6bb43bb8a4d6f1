//! Plain-text rendering of a [`JobView`].
//!
//! Every call renders the whole view; callers replace what they showed
//! before instead of patching it.

use std::fmt::Write;

use crate::progress::JobProgress;
use crate::state::{FileRow, JobView};

/// Width of the bar between the brackets.
pub const BAR_WIDTH: usize = 30;

const HEADERS: [&str; 3] = ["File", "Status", "Detail"];

/// `[#########---------------------]  30%`
pub fn progress_bar(progress: &JobProgress, width: usize) -> String {
    let percent = progress.bar_percent();
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        "-".repeat(width - filled),
        percent
    )
}

/// Three-column table: file name, status label, detail.
pub fn render_table(rows: &[FileRow]) -> String {
    let cells: Vec<[String; 3]> = rows
        .iter()
        .map(|row| {
            [
                single_line(&row.name),
                single_line(row.status.label()),
                single_line(row.status.detail()),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADERS.map(String::from), &widths);
    push_line(&mut out, &widths.map(|w| "-".repeat(w)), &widths);
    for row in &cells {
        push_line(&mut out, row, &widths);
    }
    out
}

/// Bar, the two text lines and the table.
pub fn render_view(view: &JobView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", progress_bar(&view.progress, BAR_WIDTH));
    let _ = writeln!(out, "{}", view.progress.summary());
    let _ = writeln!(out, "{}", view.extra_text());
    out.push('\n');
    out.push_str(&render_table(&view.rows));
    out
}

fn push_line(out: &mut String, cells: &[String; 3], widths: &[usize; 3]) {
    let mut line = String::new();
    for (i, (cell, &width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str(" | ");
        }
        let _ = write!(line, "{cell:<width$}");
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Captions may span lines; a table row may not.
fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\r', '\n'], " ")
}
