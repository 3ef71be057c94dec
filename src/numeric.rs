// 🔢 Numeric coercion
// Best-effort text → f64. Anything that won't parse is "missing", never an error.

/// Coerce a text cell to a number.
///
/// Surrounding whitespace is ignored. Empty text, unparseable text and NaN
/// all come back as `None`.
pub fn coerce_numeric(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    match trimmed.parse::<f64>() {
        Ok(n) if n.is_nan() => None,
        Ok(n) => Some(n),
        Err(_) => None,
    }
}

/// Coerce an optional cell; a missing cell stays missing
pub fn coerce_optional(value: Option<&str>) -> Option<f64> {
    value.and_then(coerce_numeric)
}

/// `a - b`, missing if either side is missing
pub fn variance(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a - b),
        _ => None,
    }
}
