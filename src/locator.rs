use serde_json::Value;

/// A cell counts as empty when the API sent `null` or an empty string.
pub fn is_blank(cell: &Value) -> bool {
    match cell {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// A row is absent when it has no cells or only blank ones.
pub fn is_absent_row(row: &[Value]) -> bool {
    row.iter().all(is_blank)
}

/// Returns the 1-based row where a new value should go in a column.
///
/// The first absent row wins; with no gap the value goes right after the
/// last row. The result is only a suggestion: another writer may fill the
/// row before we do.
pub fn locate_append_row(existing: &[Vec<Value>]) -> usize {
    existing
        .iter()
        .position(|row| is_absent_row(row))
        .map(|idx| idx + 1)
        .unwrap_or(existing.len() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn present() -> Vec<Value> {
        vec![json!("100")]
    }

    fn absent() -> Vec<Value> {
        Vec::new()
    }

    #[test]
    fn empty_column_starts_at_row_one() {
        assert_eq!(locate_append_row(&[]), 1);
    }

    #[test]
    fn single_value_appends_at_row_two() {
        assert_eq!(locate_append_row(&[present()]), 2);
    }

    #[test]
    fn first_gap_wins() {
        assert_eq!(locate_append_row(&[present(), absent(), present()]), 2);
        assert_eq!(
            locate_append_row(&[present(), absent(), absent(), present()]),
            2
        );
    }

    #[test]
    fn full_column_appends_after_last_row() {
        assert_eq!(locate_append_row(&[present(), present()]), 3);
    }

    #[test]
    fn blank_strings_and_nulls_count_as_gaps() {
        assert_eq!(locate_append_row(&[present(), vec![json!("")]]), 2);
        assert_eq!(locate_append_row(&[vec![Value::Null], present()]), 1);
    }

    #[test]
    fn numbers_and_zero_are_present() {
        assert_eq!(locate_append_row(&[vec![json!(0)], vec![json!(false)]]), 3);
    }
}
