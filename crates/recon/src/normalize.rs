use crate::model::CellValue;

/// Interpret a cell as a number. Never fails: anything that cannot be read
/// as a number is `None`.
pub fn to_number(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Empty => None,
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Number(_) => None,
        CellValue::Text(s) => parse_lenient(s),
    }
}

/// Strip everything except digits, `.` and `-`, then parse.
///
/// Absorbs currency symbols, thousands separators and stray whitespace
/// ("$1,250.00" → 1250.0) while rejecting text with no digits at all.
pub fn parse_lenient(text: &str) -> Option<f64> {
    let stripped: String = text
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if stripped.is_empty() {
        return None;
    }
    stripped.parse::<f64>().ok()
}
