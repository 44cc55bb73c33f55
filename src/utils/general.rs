//! Text and formatting helpers.

/// Returns the longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Shortens `text` to `max_chars` characters, marking cuts with `...`.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let prefix = truncate_chars(text, max_chars);
    if prefix.len() < text.len() {
        format!("{}...", prefix.trim_end())
    } else {
        prefix.to_string()
    }
}

/// Formats bytes into human-readable format.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("क्षतिपूर्ति", 2), "क्ष");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn excerpt_marks_truncation() {
        assert_eq!(excerpt("The Vendor shall pay", 10), "The Vendor...");
        assert_eq!(excerpt("Brief", 10), "Brief");
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1_048_576), "1.0 MB");
    }
}
