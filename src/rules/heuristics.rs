//! Shared heuristics used by the built-in rules: document-position scoring,
//! third-party host classification and `@font-face` URL extraction.

use once_cell::sync::Lazy;
use regex::Regex;

use super::finding::Score;
use crate::error::{Result, SpofError};

/// Known third-party asset hosts: social widgets, ad networks, analytics and
/// shared library CDNs.
///
/// These are regex fragments, not host names. Unescaped dots match any
/// character and must stay that way; escaping them would narrow the matches.
pub const THIRD_PARTY_PATTERNS: &[&str] = &[
    r"platform\.twitter\.com",
    r"connect\.facebook\.net",
    r"platform\.linkedin\.com",
    r"assets\.pinterest\.com",
    r"widgets\.digg\.com",
    r".*\.addthis\.com",
    r"code\.jquery\.com",
    r"ad\.doubleclick\.net",
    r".*\.lognormal\.com",
    r"embed\.spotify\.com",
    r"apis.google.com",
    r".*\.google-analytics\.com",
    r".*\.chartbeat\.net",
    r".*\.googlesyndication\.com",
    r".*\.quantserve\.com",
    r".*\.scorecardresearch\.com",
    r".*\.twimg\.com",
    r".*\.fbcdn\.net",
    r".*\.typekit\.net",
    r"use.typekit.com",
    r"ajax.googleapis.com",
    r"fonts.googleapis.com",
    r".*\.yahooapis\.com",
    r"s7.addthis.com",
    r"widgets\.twimg\.com",
    r".*\.stumbleupon\.com",
    r"cdn\.optimizely\.com",
    r".*\.disqus\.com",
];

static BUILTIN_MATCHER: Lazy<ThirdPartyMatcher> = Lazy::new(|| {
    ThirdPartyMatcher {
        patterns: THIRD_PARTY_PATTERNS
            .iter()
            .map(|p| Regex::new(&format!("(?i){p}")).unwrap())
            .collect(),
    }
});

static FONT_FACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)@font-face\s*\{([^{}]*)\}").unwrap());

static CSS_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)url\(\s*['"]?([^'")]*)['"]?\s*\)"#).unwrap());

/// Ordered, case-insensitive list of third-party host patterns.
#[derive(Debug, Clone)]
pub struct ThirdPartyMatcher {
    patterns: Vec<Regex>,
}

impl ThirdPartyMatcher {
    /// The built-in host list.
    pub fn builtin() -> Self {
        BUILTIN_MATCHER.clone()
    }

    /// The built-in list followed by `extra` user-supplied fragments.
    pub fn with_extra(extra: &[String]) -> Result<Self> {
        let mut matcher = Self::builtin();
        for fragment in extra {
            let re = Regex::new(&format!("(?i){fragment}")).map_err(|e| {
                SpofError::Config(format!("invalid third-party pattern '{fragment}': {e}"))
            })?;
            matcher.patterns.push(re);
        }
        Ok(matcher)
    }

    /// First matching pattern wins.
    pub fn is_third_party(&self, url: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(url))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for ThirdPartyMatcher {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Classify `url` against the built-in host list.
pub fn is_third_party(url: &str) -> bool {
    BUILTIN_MATCHER.is_third_party(url)
}

/// Score how early `source` appears in `html`: close to 100 near the top of
/// the document, close to 0 at the end.
///
/// A source that cannot be found is treated as sitting at offset -1.
pub fn position_score(source: &str, html: &str) -> Score {
    if html.is_empty() {
        return Score::Value(0);
    }
    let index = html.find(source).map(|i| i as f64).unwrap_or(-1.0);
    let end = index + source.len() as f64;
    let raw = 100.0 - (end / html.len() as f64) * 100.0;
    // Half-up rounding, so 12.5 scores 13 and -0.5 scores 0.
    Score::Value((raw + 0.5).floor() as i64)
}

/// Every `url(...)` referenced from an `@font-face { ... }` block, in order.
pub fn font_face_urls(text: &str) -> Vec<String> {
    FONT_FACE_RE
        .captures_iter(text)
        .filter_map(|cap| cap.get(1))
        .flat_map(|body| {
            CSS_URL_RE
                .captures_iter(body.as_str())
                .filter_map(|cap| cap.get(1))
                .map(|m| m.as_str().trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|url| !url.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn classifies_known_hosts() {
        assert!(is_third_party("http://platform.twitter.com/widgets.js"));
        assert!(is_third_party("HTTP://CONNECT.FACEBOOK.NET/en_US/all.js"));
        assert!(!is_third_party("http://example.com/app.js"));
        assert!(!is_third_party("/app.js"));
    }

    #[test]
    fn unescaped_dots_match_any_character() {
        assert!(is_third_party("http://apisXgoogle.com/js/plusone.js"));
        assert!(!is_third_party("http://platformXtwitter.com/widgets.js"));
    }

    #[test]
    fn builtin_list_size() {
        assert_eq!(ThirdPartyMatcher::builtin().len(), 28);
    }

    #[test]
    fn extra_patterns_extend_the_list() {
        let matcher = ThirdPartyMatcher::with_extra(&[r"cdn\.example\.net".into()]).unwrap();
        assert!(matcher.is_third_party("https://CDN.example.net/lib.js"));
        assert!(matcher.is_third_party("http://platform.twitter.com/widgets.js"));
        assert!(!is_third_party("https://cdn.example.net/lib.js"));
    }

    #[test]
    fn invalid_extra_pattern_is_a_config_error() {
        let err = ThirdPartyMatcher::with_extra(&["(".into()]).unwrap_err();
        assert!(matches!(err, SpofError::Config(_)));
    }

    #[test]
    fn score_at_start_and_end() {
        let html = "abcdefghij";
        assert_eq!(position_score("ab", html), Score::Value(80));
        assert_eq!(position_score("ij", html), Score::Value(0));
    }

    #[test]
    fn missing_source_scores_from_offset_minus_one() {
        let html = "0123456789";
        // (-1 + 2) / 10 => 90
        assert_eq!(position_score("zz", html), Score::Value(90));
    }

    #[test]
    fn empty_html_scores_zero() {
        assert_eq!(position_score("a.js", ""), Score::Value(0));
    }

    #[test]
    fn extracts_font_urls() {
        let css = "@font-face{font-family:x;src:url('http://cdn.example.com/f.woff')}\n\
                   body{background:url(bg.png)}\n\
                   @FONT-FACE {\n  src: url(\"a.eot\");\n  src: url( b.ttf ) format('truetype');\n}";
        assert_eq!(
            font_face_urls(css),
            vec!["http://cdn.example.com/f.woff", "a.eot", "b.ttf"]
        );
    }

    #[test]
    fn no_font_face_no_urls() {
        assert!(font_face_urls("").is_empty());
        assert!(font_face_urls("p { color: red }").is_empty());
    }

    proptest! {
        #[test]
        fn earlier_source_scores_at_least_as_high(
            prefix in "[a-z ]{0,40}",
            middle in "[a-z ]{0,40}",
            suffix in "[a-z ]{0,40}",
        ) {
            let marker = "<script src=\"x.js\">";
            let early = format!("{prefix}{marker}{middle}{suffix}");
            let late = format!("{prefix}{middle}{marker}{suffix}");
            let early_score = position_score(marker, &early).value().unwrap();
            let late_score = position_score(marker, &late).value().unwrap();
            prop_assert!(early_score >= late_score);
        }
    }
}
