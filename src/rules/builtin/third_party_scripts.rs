use std::sync::Arc;

use crate::dom::Document;
use crate::rules::heuristics::{position_score, ThirdPartyMatcher};
use crate::rules::{Reporter, Rule, RuleMetadata};

/// 3rdparty-scripts: Load 3rd Party JS Asynchronously
///
/// Flags `<script src>` elements pointing at a known third-party host that
/// are not loaded with both `defer` and `async`.
pub struct ThirdPartyScriptsRule {
    matcher: Arc<ThirdPartyMatcher>,
}

impl ThirdPartyScriptsRule {
    pub fn new(matcher: Arc<ThirdPartyMatcher>) -> Self {
        Self { matcher }
    }
}

impl Rule for ThirdPartyScriptsRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "3rdparty-scripts".into(),
            name: "Load 3rd Party JS Asynchronously".into(),
            desc: "Always load 3rd party external scripts asynchronously in a non-blocking \
                   pattern, either with the async and defer attributes or a dynamic script \
                   loader. A slow or unreachable 3rd party host must not hold up rendering."
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
            if self.matcher.is_third_party(src) && super::is_blocking(script) {
                reporter.error(
                    format!("ERROR: Possible SPOF attack due to 3rd party script - {src}"),
                    src,
                    position_score(src, html),
                    &rule,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Score, Severity};

    fn run(html: &str) -> Vec<crate::rules::Finding> {
        let mut reporter = Reporter::new();
        ThirdPartyScriptsRule::new(Arc::new(ThirdPartyMatcher::builtin())).check(
            &Document::parse(html),
            "",
            &mut reporter,
        );
        reporter.into_messages()
    }

    #[test]
    fn flags_blocking_third_party_script() {
        let findings = run(
            r#"<html><head><script src="http://platform.twitter.com/widgets.js"></script></head>
               <body><p>hello</p></body></html>"#,
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Error);
        assert_eq!(findings[0].entity, "http://platform.twitter.com/widgets.js");
        assert_eq!(findings[0].rule.id, "3rdparty-scripts");
        assert!(findings[0]
            .message
            .starts_with("ERROR: Possible SPOF attack due to 3rd party script"));
        assert!(matches!(findings[0].score, Score::Value(v) if v > 0));
    }

    #[test]
    fn async_alone_still_flagged() {
        let findings = run(r#"<script async src="//connect.facebook.net/en_US/all.js"></script>"#);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn defer_and_async_passes() {
        let findings =
            run(r#"<script defer async src="http://platform.twitter.com/widgets.js"></script>"#);
        assert!(findings.is_empty());
    }

    #[test]
    fn ignores_first_party_and_inline_scripts() {
        let findings = run(r#"<script src="/app.js"></script><script>var x = 1;</script>"#);
        assert!(findings.is_empty());
    }
}
