//! Number formatting for sentence parameters and tooltips.

/// Format with comma thousands separators, keeping any fractional part.
///
/// ```
/// use gfw_widgets::services::format::format_thousands;
///
/// assert_eq!(format_thousands(1234567.0), "1,234,567");
/// assert_eq!(format_thousands(-9876.5), "-9,876.5");
/// assert_eq!(format_thousands(12.0), "12");
/// ```
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let raw = value.abs().to_string();
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 2);
    if value < 0.0 {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// Format a count for a sentence: zero or missing becomes `"0"`.
pub fn format_count(value: Option<f64>) -> String {
    match value {
        Some(v) if v != 0.0 => format_thousands(v),
        _ => "0".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(123456.25), "123,456.25");
        assert_eq!(format_thousands(-1000000.0), "-1,000,000");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(None), "0");
        assert_eq!(format_count(Some(0.0)), "0");
        assert_eq!(format_count(Some(4321.0)), "4,321");
    }
}
