// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! URL canonicalization.
//!
//! Collapses cosmetic URL variants to one canonical form so the
//! (user_id, canonical_url) uniqueness invariant can hold: lowercase host
//! without a `www.` prefix, no fragment, tracking parameters removed,
//! remaining query parameters sorted, trailing path slashes stripped.
//! Canonicalization is idempotent.

use reqwest::Url;

/// Canonicalize a URL string.
///
/// Unparseable input is returned unchanged; admission filtering happens
/// elsewhere and a canonical form must exist for every entry.
pub fn canonicalize(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };

    let Some(host) = url.host_str() else {
        return raw.to_string();
    };
    let lowered = host.to_ascii_lowercase();
    let stripped = lowered.strip_prefix("www.").unwrap_or(&lowered).to_string();
    if url.set_host(Some(&stripped)).is_err() {
        return raw.to_string();
    }

    url.set_fragment(None);

    // Work on the raw query text so percent- and plus-encoding survive
    // untouched and canonicalization stays idempotent.
    let raw_query = url.query().unwrap_or_default().to_string();
    let mut params: Vec<&str> = raw_query
        .split('&')
        .filter(|segment| {
            let key = segment.split('=').next().unwrap_or(segment);
            !segment.is_empty() && !is_tracking_param(key)
        })
        .collect();
    params.sort_unstable();
    let query = params.join("&");
    if query.is_empty() {
        url.set_query(None);
    } else {
        url.set_query(Some(&query));
    }

    let trimmed_path = url.path().trim_end_matches('/').to_string();
    url.set_path(&trimmed_path);

    url.to_string()
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || key == "ref"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_host_and_strips_www() {
        assert_eq!(
            canonicalize("https://WWW.Example.COM/Page"),
            "https://example.com/Page"
        );
    }

    #[test]
    fn drops_fragment() {
        assert_eq!(
            canonicalize("https://example.com/a#section-2"),
            "https://example.com/a"
        );
    }

    #[test]
    fn removes_tracking_params_and_sorts_the_rest() {
        assert_eq!(
            canonicalize("https://example.com/a?b=2&utm_source=mail&ref=tw&a=1"),
            "https://example.com/a?a=1&b=2"
        );
    }

    #[test]
    fn strips_trailing_path_slashes() {
        assert_eq!(
            canonicalize("https://example.com/a/b///"),
            "https://example.com/a/b"
        );
    }

    #[test]
    fn cosmetic_variants_share_one_canonical_form() {
        assert_eq!(
            canonicalize("https://EX.com/a/?b=2&utm_x=1&a=1"),
            canonicalize("https://ex.com/a?a=1&b=2")
        );
    }

    #[test]
    fn is_idempotent() {
        let urls = [
            "https://WWW.Example.com/a/?z=9&utm_medium=social&a=1#frag",
            "https://example.com",
            "https://example.com/path?x=1",
        ];
        for url in urls {
            let once = canonicalize(url);
            assert_eq!(canonicalize(&once), once, "not idempotent for {url}");
        }
    }

    #[test]
    fn unparseable_input_is_returned_unchanged() {
        assert_eq!(canonicalize("not a url"), "not a url");
        assert_eq!(canonicalize(""), "");
    }

    #[test]
    fn preserves_meaningful_query_params() {
        assert_eq!(
            canonicalize("https://example.com/search?q=rust+traits"),
            "https://example.com/search?q=rust+traits"
        );
    }
}
