//! Place URL handling
//!
//! Target-pattern matching, deterministic place-id derivation, and the
//! fixed-query normalization applied before a URL is handed to the
//! engine.

mod normalize;
mod place_id;

pub use normalize::normalize_place_url;
pub use place_id::derive_place_id;

/// Returns true when the URL points at a place-detail page on the
/// configured target host.
pub fn is_place_url(url: &str, marker: &str) -> bool {
    url.contains(marker)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "www.google.com/maps/place";

    #[test]
    fn test_place_url_matches() {
        assert!(is_place_url(
            "https://www.google.com/maps/place/Blue+Cafe/",
            MARKER
        ));
    }

    #[test]
    fn test_search_url_does_not_match() {
        assert!(!is_place_url(
            "https://www.google.com/maps/search/cafes/",
            MARKER
        ));
        assert!(!is_place_url("https://example.com/", MARKER));
    }
}
