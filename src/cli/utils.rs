//! Shared CLI utilities.

/// Render a secret for display without revealing it.
pub fn mask_secret(value: &str) -> String {
    match value.chars().next() {
        Some(first) if value.chars().count() > 4 => format!("{first}***"),
        _ => "***".to_string(),
    }
}

/// Escape control characters so multi-line secrets stay on one line.
pub fn single_line(value: &str) -> String {
    value.escape_debug().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_all_but_first_char() {
        assert_eq!(mask_secret("hunter2"), "h***");
        assert_eq!(mask_secret("abc"), "***");
        assert_eq!(mask_secret(""), "***");
    }

    #[test]
    fn single_line_escapes_newlines() {
        assert_eq!(single_line("pw\n"), "pw\\n");
    }
}
