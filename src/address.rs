use crate::error::{ConsoleError, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

const COLUMN: &str = r"[A-Za-z]{1,3}";
const ROW: &str = r"[1-9][0-9]*";

fn column_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!("^{COLUMN}$")).expect("valid column pattern"))
}

fn cell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!("^{COLUMN}{ROW}$")).expect("valid cell pattern"))
}

fn range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let part = format!("(?:{COLUMN}{ROW}|{COLUMN}|{ROW})");
        Regex::new(&format!("^{part}(?::{part})?$")).expect("valid range pattern")
    })
}

fn r1c1_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[Rr][0-9]*[Cc][0-9]*$").expect("valid R1C1 pattern"))
}

fn plain_title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid title pattern"))
}

/// Validates column letters such as `c` or `AB` and returns them upper cased.
pub fn normalize_column(input: &str) -> Result<String> {
    let input = input.trim();
    if column_re().is_match(input) {
        Ok(input.to_ascii_uppercase())
    } else {
        Err(ConsoleError::invalid_input(format!(
            "Invalid column letter '{input}'."
        )))
    }
}

/// Validates a single cell reference such as `B7`.
pub fn validate_cell(input: &str) -> Result<&str> {
    let input = input.trim();
    if cell_re().is_match(input) {
        Ok(input)
    } else {
        Err(ConsoleError::invalid_input(format!(
            "Invalid cell reference '{input}'."
        )))
    }
}

/// Validates an A1 range without sheet prefix: `A1:D5`, `C:C`, `2:4`, `B3`.
pub fn validate_range(input: &str) -> Result<&str> {
    let input = input.trim();
    if range_re().is_match(input) {
        Ok(input)
    } else {
        Err(ConsoleError::invalid_input(format!(
            "Invalid sheet range '{input}'."
        )))
    }
}

pub fn validate_sheet_name(input: &str) -> Result<&str> {
    let input = input.trim();
    if input.is_empty() {
        Err(ConsoleError::invalid_input("Sheet name must not be empty."))
    } else {
        Ok(input)
    }
}

/// Sheet title as it must appear in a range expression. Titles that are not
/// plain identifiers, or that read as a cell (`Q1`, `FY2024`, `R1C1`), are
/// single-quoted with embedded quotes doubled.
pub fn quote_sheet_name(title: &str) -> String {
    let ambiguous = cell_re().is_match(title) || r1c1_re().is_match(title);
    if plain_title_re().is_match(title) && !ambiguous {
        title.to_string()
    } else {
        always_quoted(title)
    }
}

fn always_quoted(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Range covering a whole sheet. Always quoted, since a bare title is
/// otherwise read as a named range or cell on the first sheet.
pub fn sheet_range(title: &str) -> String {
    always_quoted(title)
}

/// `Sheet1` + `A1:D5` -> `Sheet1!A1:D5`.
pub fn qualify(sheet: &str, range: &str) -> String {
    format!("{}!{}", quote_sheet_name(sheet), range)
}

/// Whole-column range, e.g. `Sheet1!C:C`.
pub fn column_range(sheet: &str, column: &str) -> String {
    qualify(sheet, &format!("{column}:{column}"))
}

/// One cell to be written: where, and what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteTarget {
    pub sheet: String,
    pub column: String,
    pub row: usize,
    pub value: String,
}

impl WriteTarget {
    pub fn new(sheet: &str, column: &str, row: usize, value: &str) -> Self {
        Self {
            sheet: sheet.to_string(),
            column: column.to_string(),
            row,
            value: value.to_string(),
        }
    }

    pub fn address(&self) -> String {
        qualify(&self.sheet, &format!("{}{}", self.column, self.row))
    }
}

impl fmt::Display for WriteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address())
    }
}
