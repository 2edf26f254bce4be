//! Request building: caption + rendering parameters → service locator.
//!
//! The service renders the caption from the last path segment, so the text
//! goes through [`reqwest::Url`]'s path-segment encoder: a caption containing
//! a space, `?` or `/` still lands in exactly one segment. Query parameters
//! are appended in the order the caller lists them, which keeps the locator
//! byte-for-byte stable across runs.

use reqwest::Url;

/// Build the locator `<base>/says/<text>?k=v&…` for one caption.
///
/// An empty `params` slice produces no query string at all. Any query or
/// fragment already on `base` is discarded.
///
/// `base` must be able to carry a path (an http(s) URL, as accepted by
/// [`crate::config::CardConfig::parsed_base_url`]). For a cannot-be-a-base
/// URL such as `mailto:` the `/says/<text>` segments cannot be added and the
/// result is not a valid service locator.
pub fn build_request_url(base: &Url, text: &str, params: &[(&str, String)]) -> String {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);

    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push("says").push(text);
    }

    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }

    url.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RenderParams, DEFAULT_BASE_URL};

    fn base() -> Url {
        Url::parse(DEFAULT_BASE_URL).unwrap()
    }

    #[test]
    fn default_params_in_enumeration_order() {
        let url = build_request_url(&base(), "Hello", &RenderParams::default().query_pairs());
        assert_eq!(
            url,
            "https://cataas.com/cat/says/Hello?width=400&height=500&size=100&color=Pink"
        );
    }

    #[test]
    fn empty_params_have_no_query() {
        let url = build_request_url(&base(), "You", &[]);
        assert_eq!(url, "https://cataas.com/cat/says/You");
        assert!(!url.contains('?'));
    }

    #[test]
    fn deterministic() {
        let params = RenderParams::default().query_pairs();
        let a = build_request_url(&base(), "Hello", &params);
        let b = build_request_url(&base(), "Hello", &params);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_caption_keeps_says_segment() {
        let url = build_request_url(&base(), "", &[]);
        assert_eq!(url, "https://cataas.com/cat/says/");
    }

    #[test]
    fn caption_is_one_encoded_segment() {
        let url = build_request_url(&base(), "Good morning/night", &[]);
        assert_eq!(url, "https://cataas.com/cat/says/Good%20morning%2Fnight");
    }

    #[test]
    fn trailing_slash_and_existing_query_are_normalised() {
        let base = Url::parse("http://127.0.0.1:8080/cat/?stale=1#frag").unwrap();
        let url = build_request_url(&base, "Hi", &[("width", "1".to_string())]);
        assert_eq!(url, "http://127.0.0.1:8080/cat/says/Hi?width=1");
    }

    #[test]
    fn path_less_base_is_rejected_upstream() {
        use crate::config::CardConfig;

        let config = CardConfig {
            base_url: "mailto:cat@example.com".to_string(),
            ..CardConfig::default()
        };
        assert!(config.parsed_base_url().is_err());

        let config = CardConfig {
            base_url: "http://localhost:3000/cat".to_string(),
            ..CardConfig::default()
        };
        let url = build_request_url(&config.parsed_base_url().unwrap(), "Hi", &[]);
        assert!(url.ends_with("/cat/says/Hi"), "got {url}");
    }

    #[test]
    fn root_base() {
        let base = Url::parse("http://localhost:3000").unwrap();
        let url = build_request_url(&base, "Hi", &[]);
        assert_eq!(url, "http://localhost:3000/says/Hi");
    }
}
