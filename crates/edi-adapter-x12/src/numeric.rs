//! Lenient numeric conversions for partner-supplied element values.
//!
//! Element values are parsed from their longest numeric prefix and fall back
//! to zero, so `"12.5LB"` reads as `12.5` and `""` reads as `0`.

pub(crate) fn lenient_f64(value: &str) -> f64 {
    let prefix = numeric_prefix(value.trim(), true);
    prefix
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

pub(crate) fn lenient_u32(value: &str) -> u32 {
    let prefix = numeric_prefix(value.trim(), false);
    prefix
        .parse::<i64>()
        .ok()
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

/// Render a number the way partner systems expect: integral values without a
/// fractional part, everything else in shortest round-trip form.
pub(crate) fn format_number(value: f64) -> String {
    if value == 0.0 {
        // avoids "-0"
        return "0".to_string();
    }
    value.to_string()
}

fn numeric_prefix(value: &str, allow_fraction: bool) -> &str {
    let bytes = value.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }

    if allow_fraction && end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > end + 1 || end > digits_start {
            end = frac_end;
        }
    }

    &value[..end]
}
