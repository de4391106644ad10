const SEPARATOR: &str = "  ";
const MIN_WIDE: usize = 12;

#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    /// Right-aligned.
    Number,
    /// Run, execution, severity or level words; colored when enabled.
    Status,
    /// Free text that gives up width first when the terminal is narrow.
    Wide,
}

#[derive(Clone, Copy, Debug)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Text,
        }
    }

    pub const fn number(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Number,
        }
    }

    pub const fn status(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Status,
        }
    }

    pub const fn wide(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Wide,
        }
    }
}

/// A command response with a fixed table layout.
pub trait Tabular {
    fn columns(&self) -> &'static [Column];

    /// One cell per column, in column order.
    fn rows(&self) -> Vec<Vec<String>>;

    /// Line printed above the table.
    fn caption(&self) -> Option<String> {
        None
    }

    /// Printed in place of the table when there are no rows.
    fn empty_note(&self) -> &'static str {
        "(no rows)"
    }
}

/// Lay out `value` as an aligned table.
#[must_use]
pub fn render(value: &impl Tabular, options: TableOptions) -> String {
    let columns = value.columns();
    let rows = value.rows();

    let mut lines = Vec::with_capacity(rows.len() + 3);
    if let Some(caption) = value.caption() {
        lines.push(caption);
    }
    if rows.is_empty() {
        lines.push(value.empty_note().to_string());
        return lines.join("\n");
    }

    let mut widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .fold(column.name.len(), usize::max)
        })
        .collect();
    if let Some(max_width) = options.max_width {
        shrink_wide(&mut widths, columns, max_width);
    }

    let header = columns
        .iter()
        .zip(&widths)
        .map(|(column, width)| pad(column.name, *width, column.kind))
        .collect::<Vec<_>>()
        .join(SEPARATOR);
    let divider = "-".repeat(header.chars().count());
    lines.push(header.trim_end().to_string());
    lines.push(divider);

    for row in &rows {
        let line = columns
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(index, (column, width))| {
                let cell = row.get(index).map_or("-", String::as_str);
                let padded = pad(&truncate(cell, *width), *width, column.kind);
                if options.color && column.kind == ColumnKind::Status {
                    colorize(cell, padded)
                } else {
                    padded
                }
            })
            .collect::<Vec<_>>()
            .join(SEPARATOR);
        lines.push(line.trim_end().to_string());
    }
    lines.join("\n")
}

fn shrink_wide(widths: &mut [usize], columns: &[Column], max_width: usize) {
    let separators = widths.len().saturating_sub(1) * SEPARATOR.len();
    let total = widths.iter().sum::<usize>() + separators;
    let mut excess = total.saturating_sub(max_width);

    for (width, column) in widths.iter_mut().zip(columns) {
        if excess == 0 {
            break;
        }
        if column.kind != ColumnKind::Wide {
            continue;
        }
        let floor = column.name.len().max(MIN_WIDE);
        let cut = excess.min(width.saturating_sub(floor));
        *width -= cut;
        excess -= cut;
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn pad(value: &str, width: usize, kind: ColumnKind) -> String {
    if kind == ColumnKind::Number {
        format!("{value:>width$}")
    } else {
        format!("{value:<width$}")
    }
}

fn colorize(word: &str, padded: String) -> String {
    let code = match word {
        "completed" | "high" | "info" => "32",
        "pending" | "running" | "partial" | "medium" | "low" => "33",
        "failed" | "cancelled" | "critical" | "very_low" => "31",
        _ => return padded,
    };
    format!("\u{1b}[{code}m{padded}\u{1b}[0m")
}
