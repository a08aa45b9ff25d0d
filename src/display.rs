//! Small formatting helpers for what the pages and the player chrome show.

use chrono::DateTime;

/// Renders seconds as `m:ss`, or `h:mm:ss` once past the hour. Anything that
/// is not a finite, non-negative number shows as `0:00`.
pub fn format_clock(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    let secs = total % 60;
    let mins = (total / 60) % 60;
    let hours = total / 3600;
    if hours > 0 {
        format!("{hours}:{mins:02}:{secs:02}")
    } else {
        format!("{mins}:{secs:02}")
    }
}

/// `"1234567"` becomes `"1,234,567 views"`. The API reports counts as decimal
/// strings; anything unparsable yields `None`.
pub fn format_views(raw: Option<&str>) -> Option<String> {
    let count: u64 = raw?.trim().parse().ok()?;
    Some(format!("{} views", group_thousands(count)))
}

/// RFC 3339 timestamp to a short date such as `Mar 5, 2024`.
pub fn format_published(raw: Option<&str>) -> Option<String> {
    let parsed = DateTime::parse_from_rfc3339(raw?.trim()).ok()?;
    Some(parsed.format("%b %-d, %Y").to_string())
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
