//! Keyword Matcher for Block History.
//!
//! A keyword matches a URL only as a delimited token: it must be preceded by
//! the start of the URL or one of `/ ? & # .`, and followed by one of those
//! delimiters or the end of the URL. Matching is case-insensitive and the
//! keyword is always literal text.

use regex::Regex;

/// Characters that may surround a keyword token, as a regex class.
const DELIMITER_CLASS: &str = r"[/?&#.]";

/// A keyword compiled once for repeated matching.
#[derive(Debug, Clone)]
pub struct KeywordPattern {
    keyword: String,
    regex: Regex,
}

impl KeywordPattern {
    /// Compiles `keyword`. Returns `None` for an empty keyword.
    pub fn new(keyword: &str) -> Option<Self> {
        if keyword.is_empty() {
            return None;
        }
        let pattern = format!(
            "(?i)(?:^|{d}){kw}(?:{d}|$)",
            d = DELIMITER_CLASS,
            kw = regex::escape(keyword)
        );
        match Regex::new(&pattern) {
            Ok(regex) => Some(Self {
                keyword: keyword.to_string(),
                regex,
            }),
            Err(e) => {
                tracing::warn!(keyword = %keyword, error = %e, "Keyword pattern failed to compile");
                None
            }
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn is_match(&self, url: &str) -> bool {
        !url.is_empty() && self.regex.is_match(url)
    }
}

/// An ordered keyword list compiled once, reused until the list changes.
#[derive(Debug, Clone, Default)]
pub struct KeywordSet {
    keywords: Vec<String>,
    patterns: Vec<KeywordPattern>,
}

impl KeywordSet {
    /// Compiles every non-empty keyword, keeping list order.
    pub fn compile<S: AsRef<str>>(keywords: &[S]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.as_ref().to_string()).collect(),
            patterns: keywords
                .iter()
                .filter_map(|k| KeywordPattern::new(k.as_ref()))
                .collect(),
        }
    }

    /// The source list this set was compiled from.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// First keyword, in list order, matching `url`.
    pub fn first_match(&self, url: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|p| p.is_match(url))
            .map(KeywordPattern::keyword)
    }
}

/// True when `keyword` appears in `url` as a delimited token.
pub fn matches(url: &str, keyword: &str) -> bool {
    KeywordPattern::new(keyword).is_some_and(|p| p.is_match(url))
}

/// Returns the first keyword that matches `url`, stopping at the first hit.
pub fn first_match<'a, S: AsRef<str>>(url: &str, keywords: &'a [S]) -> Option<&'a str> {
    keywords
        .iter()
        .map(AsRef::as_ref)
        .find(|keyword| matches(url, keyword))
}

/// True iff any keyword matches `url`.
pub fn matches_any<S: AsRef<str>>(url: &str, keywords: &[S]) -> bool {
    first_match(url, keywords).is_some()
}
