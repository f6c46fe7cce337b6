// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Readable-article extraction from raw HTML.
//!
//! Prefers semantic content containers (`<article>`, then `<main>`, then
//! `<body>`) over the full document, strips scripts and styles, and
//! converts the remainder to plain text. Pages whose extracted text falls
//! below the configured minimum are rejected rather than persisted as
//! near-empty memories.

use std::sync::LazyLock;

use recall_core::types::Article;
use regex::Regex;

/// Maximum excerpt length in characters.
const EXCERPT_CHARS: usize = 300;

/// Assumed reading speed for the reading-time estimate.
const WORDS_PER_MINUTE: usize = 200;

static ARTICLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<article[^>]*>(.*?)</article>").unwrap()
});
static MAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<main[^>]*>(.*?)</main>").unwrap()
});
static BODY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<body[^>]*>(.*?)</body>").unwrap()
});
/// Containers whose contents never belong in the extracted text.
const NOISE_TAGS: [&str; 7] = [
    "script", "style", "noscript", "nav", "header", "footer", "aside",
];

// One pattern per tag: the regex crate has no backreferences, so a single
// `</\1>` alternation cannot work here.
static NOISE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    NOISE_TAGS
        .iter()
        .map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}>")).unwrap())
        .collect()
});
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap()
});
static OG_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+property=["']og:title["'][^>]+content=["']([^"']+)["']"#).unwrap()
});
static AUTHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+name=["']author["'][^>]+content=["']([^"']+)["']"#).unwrap()
});

/// Why a page did not yield a usable article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The HTML produced no text at all.
    NoContent,
    /// Text was extracted but is shorter than the configured minimum.
    TooShort { chars: usize, min: usize },
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoContent => write!(f, "no readable content"),
            Self::TooShort { chars, min } => {
                write!(f, "extracted text too short ({chars} chars, minimum {min})")
            }
        }
    }
}

impl std::error::Error for ExtractError {}

/// Extract a readable article from raw HTML.
///
/// `min_content_length` is the minimum character count of the extracted
/// text for the page to qualify as an article.
pub fn extract_article(html: &str, min_content_length: usize) -> Result<Article, ExtractError> {
    let mut stripped = content_region(html).to_string();
    for re in NOISE_RES.iter() {
        stripped = re.replace_all(&stripped, " ").into_owned();
    }

    let raw = html2text::from_read(stripped.as_bytes(), 120)
        .map_err(|_| ExtractError::NoContent)?;
    let text = collapse_whitespace(&raw);

    if text.is_empty() {
        return Err(ExtractError::NoContent);
    }
    let chars = text.chars().count();
    if chars < min_content_length {
        return Err(ExtractError::TooShort {
            chars,
            min: min_content_length,
        });
    }

    let word_count = text.split_whitespace().count();
    Ok(Article {
        title: page_title(html),
        excerpt: excerpt_of(&text),
        byline: AUTHOR_RE
            .captures(html)
            .map(|c| c[1].trim().to_string())
            .filter(|b| !b.is_empty()),
        word_count,
        reading_time: reading_time_minutes(word_count),
        text,
    })
}

/// Build an excerpt from already-plain text (used when no HTML is available).
pub fn excerpt_of(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= EXCERPT_CHARS {
        return trimmed.to_string();
    }
    trimmed.chars().take(EXCERPT_CHARS).collect()
}

/// Estimated reading time in whole minutes, never zero for non-empty text.
pub fn reading_time_minutes(word_count: usize) -> u32 {
    (word_count.div_ceil(WORDS_PER_MINUTE)).max(1) as u32
}

fn content_region(html: &str) -> &str {
    for re in [&*ARTICLE_RE, &*MAIN_RE, &*BODY_RE] {
        if let Some(caps) = re.captures(html) {
            if let Some(m) = caps.get(1) {
                return m.as_str();
            }
        }
    }
    html
}

fn page_title(html: &str) -> String {
    if let Some(caps) = OG_TITLE_RE.captures(html) {
        let t = caps[1].trim();
        if !t.is_empty() {
            return t.to_string();
        }
    }
    if let Some(caps) = TITLE_RE.captures(html) {
        let t = collapse_whitespace(&caps[1]);
        if !t.is_empty() {
            return t;
        }
    }
    String::new()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
