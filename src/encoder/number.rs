/// Format a floating reading with two decimal places, dropping trailing
/// zeros but always keeping one fractional digit (`24.0`, `24.5`, `24.46`).
///
/// Returns `None` for NaN and infinities, which JSON cannot represent.
pub fn format_decimal(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }

    let mut formatted = format!("{value:.2}");
    while formatted.ends_with('0') && !formatted.ends_with(".0") {
        formatted.pop();
    }

    // -0.001 rounds to "-0.0"
    if formatted == "-0.0" {
        formatted.remove(0);
    }
    Some(formatted)
}

/// Whole seconds elapsed between `start_millis` and `now_millis`, rounded
/// half up.
pub fn elapsed_seconds(start_millis: i64, now_millis: i64) -> i64 {
    now_millis
        .saturating_sub(start_millis)
        .saturating_add(500)
        .div_euclid(1000)
}
