//! Locale-free number, percentage and duration formatting.

use crate::utils::config::TEAR_LINE_LENGTH;

/// Format a number with comma thousands separators
///
/// # Example
/// ```ignore
/// assert_eq!(format_num(1234567), "1,234,567");
/// ```
pub fn format_num(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format `count (pp.pp%)`; the percentage is omitted for a zero count or total
pub fn format_num_percent(count: u64, total: u64) -> String {
    let mut out = format_num(count);
    if count > 0 && total > 0 {
        let pp = u128::from(count) * 10_000 / u128::from(total);
        let whole = u64::try_from(pp / 100).unwrap_or(u64::MAX);
        out.push_str(&format!(" ({}.{:02}%)", format_num(whole), pp % 100));
    }
    out
}

/// Format milliseconds as `<hours>h<MM>m<SS>s`
pub fn format_time(millis: u64) -> String {
    let hours = millis / 3_600_000;
    let minutes = millis / 60_000 % 60;
    let seconds = millis / 1000 % 60;
    format!("{}h{:02}m{:02}s", format_num(hours), minutes, seconds)
}

/// Format `(avg size N bytes)`, rounding half up
pub fn format_avg(size: u64, count: u64) -> String {
    let avg = if count == 0 {
        0
    } else {
        (size as f64 / count as f64).round() as u64
    };
    format!("(avg size {} bytes)", format_num(avg))
}

/// A full-width line of `ch`
pub fn tear_line(ch: char) -> String {
    std::iter::repeat(ch).take(TEAR_LINE_LENGTH).collect()
}
