use serde_json::Value;
use std::fmt::Write;

const SEPARATOR: char = '|';
const PADDING: usize = 1;

/// Header for the zero-based column `col`: `A`, `B`, `C`, ...
///
/// Only single letters are produced, so anything past `Z` comes out as the
/// following code points (`[`, `\`, ...).
pub fn column_header(col: usize) -> String {
    u32::try_from(col)
        .ok()
        .and_then(|c| char::from_u32('A' as u32 + c))
        .map(String::from)
        .unwrap_or_default()
}

/// Default scalar-to-string conversion for a cell. Integral floats drop
/// their fraction (`12.0` prints as `12`).
pub fn cell_text(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (None, Some(u), _) => u.to_string(),
            (None, None, Some(f)) => f.to_string(),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Renders a loaded range as an aligned table.
///
/// The header row is `Row` followed by one letter per cell of the first
/// row. Row labels count from 1 regardless of where the range started.
/// Short rows end early instead of being padded.
pub fn render(grid: &[Vec<Value>]) -> String {
    let Some(first) = grid.first() else {
        return String::new();
    };

    let mut lines: Vec<Vec<String>> = Vec::with_capacity(grid.len() + 1);
    let mut header = vec!["Row".to_string()];
    header.extend((0..first.len()).map(column_header));
    lines.push(header);
    for (i, row) in grid.iter().enumerate() {
        let mut line = vec![(i + 1).to_string()];
        line.extend(row.iter().map(cell_text));
        lines.push(line);
    }

    let cols = lines.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; cols];
    for line in &lines {
        for (j, field) in line.iter().enumerate() {
            widths[j] = widths[j].max(field.chars().count());
        }
    }

    let mut out = String::new();
    for line in &lines {
        for (j, field) in line.iter().enumerate() {
            // Writing into a String cannot fail.
            let _ = write!(
                out,
                "{:<width$}{}",
                field,
                SEPARATOR,
                width = widths[j] + PADDING
            );
        }
        out.push('\n');
    }
    out
}
