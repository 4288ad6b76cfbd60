//! Number formatting shared by the dashboards.

#[cfg(test)]
#[path = "format_test.rs"]
mod format_test;

/// Group an integer's digits in threes: `5400` -> `5,400`.
#[must_use]
pub fn thousands_u64(value: u64) -> String {
    group_digits(&value.to_string())
}

/// Locale-style number: grouped integer part, at most three fraction digits.
#[must_use]
pub fn thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');
    let negative = value < 0.0 && (int_part != "0" || !frac.is_empty());
    let sign = if negative { "-" } else { "" };
    let grouped = group_digits(int_part);
    if frac.is_empty() { format!("{sign}{grouped}") } else { format!("{sign}{grouped}.{frac}") }
}

fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
