//! Deterministic place-id derivation
//!
//! A place URL carries its identity in two forms: the data blob's
//! `!1s<hex>:<hex>` token (stable across renames) and the name slug
//! after `/place/`. The token is preferred; the slug is the fallback.

use crate::PlaceUrlError;
use url::Url;

/// Derives the canonical place id from a place-detail URL.
///
/// Fails only for URLs that can never be processed: unparseable text,
/// URLs without a `/place/` segment, or URLs carrying neither a data
/// token nor a name slug. Callers discard such URLs instead of
/// re-enqueuing them.
pub fn derive_place_id(url_str: &str) -> Result<String, PlaceUrlError> {
    let url = Url::parse(url_str).map_err(|e| PlaceUrlError::Parse(e.to_string()))?;

    let path = url.path();
    let after_place = path
        .split("/place/")
        .nth(1)
        .ok_or_else(|| PlaceUrlError::NotAPlace(url_str.to_string()))?;

    if let Some(token) = extract_data_token(url_str) {
        return Ok(token);
    }

    let slug = after_place.split('/').next().unwrap_or("");
    if slug.is_empty() {
        return Err(PlaceUrlError::MissingId(url_str.to_string()));
    }

    Ok(slug.to_string())
}

/// Extracts the `!1s…` identity token from the data blob, if present
fn extract_data_token(url_str: &str) -> Option<String> {
    let start = url_str.find("!1s")? + 3;
    let token = url_str[start..]
        .split(|c: char| matches!(c, '!' | '?' | '&' | '#'))
        .next()?;

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_from_data_token() {
        let url = "https://www.google.com/maps/place/Blue+Cafe/@44.97,-93.26,17z/data=!3m1!4b1!4m6!3m5!1s0x89c259af336b3341:0xa4969e07ce3108de!8m2!3d44.97!4d-93.26";
        let id = derive_place_id(url).unwrap();
        assert_eq!(id, "0x89c259af336b3341:0xa4969e07ce3108de");
    }

    #[test]
    fn test_derive_is_deterministic() {
        let url = "https://www.google.com/maps/place/Blue+Cafe/data=!1s0x1:0x2!8m2";
        assert_eq!(derive_place_id(url).unwrap(), derive_place_id(url).unwrap());
    }

    #[test]
    fn test_derive_falls_back_to_slug() {
        let url = "https://www.google.com/maps/place/Blue+Cafe/";
        assert_eq!(derive_place_id(url).unwrap(), "Blue+Cafe");
    }

    #[test]
    fn test_unparseable_url_fails() {
        assert!(matches!(
            derive_place_id("not a url"),
            Err(PlaceUrlError::Parse(_))
        ));
    }

    #[test]
    fn test_non_place_url_fails() {
        assert!(matches!(
            derive_place_id("https://www.google.com/maps/search/cafes/"),
            Err(PlaceUrlError::NotAPlace(_))
        ));
    }

    #[test]
    fn test_place_url_without_slug_fails() {
        assert!(matches!(
            derive_place_id("https://www.google.com/maps/place/"),
            Err(PlaceUrlError::MissingId(_))
        ));
    }
}
