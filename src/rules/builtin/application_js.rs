use std::sync::Arc;

use crate::dom::Document;
use crate::rules::heuristics::{position_score, ThirdPartyMatcher};
use crate::rules::{Reporter, Rule, RuleMetadata, Score};

/// Only scripts in the top half of the document are worth reporting.
const SCORE_THRESHOLD: i64 = 50;

/// application-js: Load Application JS Non-blocking
///
/// Flags first-party `<script src>` elements that appear early in the page
/// and are not loaded with both `defer` and `async`.
pub struct ApplicationJsRule {
    matcher: Arc<ThirdPartyMatcher>,
}

impl ApplicationJsRule {
    pub fn new(matcher: Arc<ThirdPartyMatcher>) -> Self {
        Self { matcher }
    }
}

impl Rule for ApplicationJsRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "application-js".into(),
            name: "Load Application JS Non-blocking".into(),
            desc: "Load application JS in a non-blocking pattern or towards the end of the \
                   page, using the defer and async attributes where possible."
                .into(),
        }
    }

    fn check(&self, dom: &Document, _css: &str, reporter: &mut Reporter) {
        let rule = self.metadata();
        let html = dom.html();

        for script in dom.elements_by_tag("script") {
            let Some(src) = script.attr("src") else {
                continue;
            };
            if self.matcher.is_third_party(src) {
                continue;
            }
            let score = position_score(src, html);
            let early = matches!(score, Score::Value(v) if v > SCORE_THRESHOLD);
            if early && super::is_blocking(script) {
                reporter.warn(
                    format!("WARNING: Possible SPOF attack due to script - {src}"),
                    src,
                    score,
                    &rule,
                );
            }
        }
    }
}
