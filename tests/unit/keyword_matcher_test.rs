//! Unit tests for the keyword matcher's delimiter rules.

use block_history::services::keyword_matcher::{first_match, matches, matches_any, KeywordPattern};
use rstest::rstest;

#[rstest]
#[case("https://shop.example.com", "shop", true)]
#[case("https://workshop.example.com", "shop", false)]
#[case("https://example.com/shop/items", "shop", true)]
#[case("https://shopify-cdn.example.com/x", "shop", false)]
#[case("https://example.com/?q=1&shop&x=2", "shop", true)]
#[case("https://example.com/page#shop", "shop", true)]
#[case("https://example.com/shop?ref=1", "shop", true)]
#[case("shop", "shop", true)]
#[case("https://example.com/shopping", "shop", false)]
#[case("https://example.com/my-shop/", "shop", false)]
#[case("https://chrome.google.com", "chrome", true)]
#[case("https://googlechrome.com", "chrome", false)]
fn test_delimited_matching(#[case] url: &str, #[case] keyword: &str, #[case] expected: bool) {
    assert_eq!(matches(url, keyword), expected, "url={url} keyword={keyword}");
}

#[rstest]
#[case("https://SHOP.example.com", "shop")]
#[case("https://shop.example.com", "SHOP")]
#[case("https://Example.com/ShOp/items", "sHoP")]
fn test_case_insensitive(#[case] url: &str, #[case] keyword: &str) {
    assert!(matches(url, keyword));
}

#[test]
fn test_regex_metacharacters_are_literal() {
    assert!(matches("https://example.com/c++/intro", "c++"));
    assert!(!matches("https://example.com/cc/intro", "c+"));
    assert!(matches("https://example.com/a.b/", "a.b"));
    assert!(!matches("https://example.com/axb/", "a.b"));
    assert!(matches("https://example.com/(x)/", "(x)"));
    assert!(!matches("https://example.com/anything/", ".*"));
    assert!(matches("https://example.com/$100/", "$100"));
}

#[test]
fn test_matches_any_and_first_match() {
    let keywords = vec!["news".to_string(), "shop".to_string()];
    assert!(matches_any("https://shop.example.com", &keywords));
    assert!(!matches_any("https://workshop.example.com", &keywords));
    assert_eq!(first_match("https://news.shop.com", &keywords), Some("news"));

    let empty: Vec<String> = Vec::new();
    assert!(!matches_any("https://shop.example.com", &empty));
}

#[test]
fn test_compiled_pattern_reports_keyword() {
    let pattern = KeywordPattern::new("Shop").unwrap();
    assert_eq!(pattern.keyword(), "Shop");
    assert!(pattern.is_match("https://shop.example.com"));
    assert!(KeywordPattern::new("").is_none());
}
