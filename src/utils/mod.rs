//! Utility functions and helpers.

pub mod log;

use std::sync::LazyLock;

use regex::Regex;

/// Characters that are not allowed in file names on common platforms.
static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|\x00-\x1f]"#).expect("valid regex"));

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace path separators and other reserved characters with `_`.
pub fn sanitize_filename(name: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(name, "_").into_owned()
}

/// Whether a station list location should be fetched over HTTP.
pub fn is_remote(location: &str) -> bool {
    url::Url::parse(location)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Rs.\n   1,500 \t"), "Rs. 1,500");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(
            sanitize_filename("error_screenshot_A/B_to_C:D.png"),
            "error_screenshot_A_B_to_C_D.png"
        );
        assert_eq!(sanitize_filename("Kathmandu_to_Pokhara"), "Kathmandu_to_Pokhara");
    }

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com/stations.json"));
        assert!(is_remote("http://localhost:8000/s.json"));
        assert!(!is_remote("dropdown_options.json"));
        assert!(!is_remote("/tmp/stations.json"));
        assert!(!is_remote("C:\\data\\stations.json"));
    }
}
