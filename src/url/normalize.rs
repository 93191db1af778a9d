//! URL normalization applied before dispatch
//!
//! The target site needs a fixed set of query parameters (locale,
//! primary account, result-click marker) for the detail pane to render
//! consistently; they are appended when absent.

/// Appends the fixed query string to a place URL when it is missing.
///
/// The presence check is a substring test on the raw URL, so a URL
/// that already carries the parameters is left untouched. The fixed
/// query is given without a leading separator; `?` or `&` is chosen
/// based on whether the URL already has a query component.
pub fn normalize_place_url(url: &str, fixed_query: &str) -> String {
    if fixed_query.is_empty() || url.contains(fixed_query) {
        return url.to_string();
    }

    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, fixed_query)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXED: &str = "authuser=0&hl=en&rclk=1";

    #[test]
    fn test_appends_with_question_mark() {
        let url = "https://www.google.com/maps/place/Blue+Cafe/";
        assert_eq!(
            normalize_place_url(url, FIXED),
            "https://www.google.com/maps/place/Blue+Cafe/?authuser=0&hl=en&rclk=1"
        );
    }

    #[test]
    fn test_appends_with_ampersand_when_query_exists() {
        let url = "https://www.google.com/maps/place/Blue+Cafe/?entry=ttu";
        assert_eq!(
            normalize_place_url(url, FIXED),
            "https://www.google.com/maps/place/Blue+Cafe/?entry=ttu&authuser=0&hl=en&rclk=1"
        );
    }

    #[test]
    fn test_idempotent() {
        let url = "https://www.google.com/maps/place/Blue+Cafe/?authuser=0&hl=en&rclk=1";
        assert_eq!(normalize_place_url(url, FIXED), url);
    }

    #[test]
    fn test_empty_fixed_query_is_noop() {
        let url = "https://www.google.com/maps/place/Blue+Cafe/";
        assert_eq!(normalize_place_url(url, ""), url);
    }
}
