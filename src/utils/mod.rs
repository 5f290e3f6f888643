//! Shared utility functions
//!
//! Small helpers used by logging and prompt construction.

/// Format a byte size as a short human-readable string
///
/// Examples: "23B", "450KB", "1.2MB"
pub fn format_size(bytes: u64) -> String {
    const UNITS: [(&str, u64); 3] = [("GB", 1 << 30), ("MB", 1 << 20), ("KB", 1 << 10)];

    for (suffix, scale) in UNITS {
        if bytes >= scale {
            return if suffix == "KB" {
                format!("{:.0}{}", bytes as f64 / scale as f64, suffix)
            } else {
                format!("{:.1}{}", bytes as f64 / scale as f64, suffix)
            };
        }
    }
    format!("{}B", bytes)
}

/// First `max_chars` characters of `text`, with an ellipsis when cut.
/// Used wherever model output ends up in a log line.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Truncate `text` to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
