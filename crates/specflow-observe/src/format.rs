//! Shared formatting helpers for spec views.

use specflow_core::Timestamp;
use specflow_diff::{diff_lines, EditScript, OpKind};

/// Render an ASCII bar chart.
///
/// `used` and `available` are the numerator and denominator.
/// `bar_width` is the total number of characters in the bar.
///
/// Example output: `[████████░░░░░░░░░░░░]  42.0%`
pub fn bar_chart(used: usize, available: usize, bar_width: usize) -> String {
    if available == 0 {
        let empty = "░".repeat(bar_width);
        return format!("[{empty}]   0.0%");
    }

    let percent = (used as f64 / available as f64) * 100.0;
    let filled = ((percent / 100.0) * bar_width as f64).round() as usize;
    let filled = filled.min(bar_width);

    format!(
        "[{}{}] {percent:5.1}%",
        "█".repeat(filled),
        "░".repeat(bar_width - filled)
    )
}

/// Calendar date of a timestamp.
pub fn format_date(ts: &Timestamp) -> String {
    ts.format("%Y-%m-%d").to_string()
}

/// Story points without a trailing `.0`.
pub fn format_points(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{points:.0}")
    } else {
        format!("{points}")
    }
}

/// Shorten to `width` characters, ending in `…` when cut.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let kept: String = s.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Greedy word wrap. Words longer than `width` are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            lines.push(word.drain(..width).collect());
        }
        let word: String = word.into_iter().collect();
        let needed = if line.is_empty() {
            word.chars().count()
        } else {
            line.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&word);
    }
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

/// One-column rendering of an edit script.
///
/// Deleted runs appear as `[-text-]`, inserted runs as `{+text+}`.
pub fn inline_diff(script: &EditScript) -> String {
    let mut out = String::new();
    for op in script.ops() {
        match op.kind {
            OpKind::Equal => out.push_str(&op.text),
            OpKind::Delete => {
                out.push_str("[-");
                out.push_str(&op.text);
                out.push_str("-]");
            }
            OpKind::Insert => {
                out.push_str("{+");
                out.push_str(&op.text);
                out.push_str("+}");
            }
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Same,
    Removed,
    Added,
}

impl Mark {
    fn prefix(&self) -> &'static str {
        match self {
            Mark::Same => "  ",
            Mark::Removed => "- ",
            Mark::Added => "+ ",
        }
    }
}

type Cell = Option<(Mark, String)>;

/// Two-column line diff of `old` and `new`, each column `column` wide.
///
/// Runs of deleted lines are paired row by row with the inserted lines
/// that replace them. Long lines wrap inside their column.
pub fn side_by_side(
    old_title: &str,
    old: &str,
    new_title: &str,
    new: &str,
    column: usize,
) -> String {
    let column = column.max(8);
    let mut rows: Vec<(Cell, Cell)> = Vec::new();
    let mut removed: Vec<String> = Vec::new();
    let mut added: Vec<String> = Vec::new();

    for op in diff_lines(old, new).ops() {
        let lines = op.text.lines().map(str::to_string);
        match op.kind {
            OpKind::Delete => removed.extend(lines),
            OpKind::Insert => added.extend(lines),
            OpKind::Equal => {
                flush_changes(&mut rows, &mut removed, &mut added);
                rows.extend(lines.map(|l| (Some((Mark::Same, l.clone())), Some((Mark::Same, l)))));
            }
        }
    }
    flush_changes(&mut rows, &mut removed, &mut added);

    let mut out = String::new();
    out.push_str(&format!(
        "{:<column$} │ {}\n",
        truncate(old_title, column),
        truncate(new_title, column)
    ));
    out.push_str(&format!("{:─<column$}─┼─{:─<column$}\n", "", ""));

    let body = column - 2;
    for (left, right) in rows {
        let left = cell_lines(&left, body);
        let right = cell_lines(&right, body);
        let height = left.len().max(right.len());
        for i in 0..height {
            let l = left.get(i).map(String::as_str).unwrap_or("");
            let r = right.get(i).map(String::as_str).unwrap_or("");
            let line = format!("{l:<column$} │ {r}");
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }
    out
}

fn flush_changes(rows: &mut Vec<(Cell, Cell)>, removed: &mut Vec<String>, added: &mut Vec<String>) {
    let height = removed.len().max(added.len());
    let mut removed = removed.drain(..);
    let mut added = added.drain(..);
    for _ in 0..height {
        rows.push((
            removed.next().map(|l| (Mark::Removed, l)),
            added.next().map(|l| (Mark::Added, l)),
        ));
    }
}

fn cell_lines(cell: &Cell, body: usize) -> Vec<String> {
    match cell {
        None => Vec::new(),
        Some((mark, text)) => wrap(text, body)
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| {
                let prefix = if i == 0 { mark.prefix() } else { "  " };
                format!("{prefix}{chunk}")
            })
            .collect(),
    }
}
