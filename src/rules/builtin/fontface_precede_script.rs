use once_cell::sync::Lazy;
use regex::Regex;

use crate::dom::Document;
use crate::rules::{Reporter, Rule, RuleMetadata, Score};

static SCRIPT_THEN_STYLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script[^>]*>.*?</script>\s*<style[^>]*>.*?</style>").unwrap()
});

/// fontface-inline-precede-script-IE: Inline @font-face preceded by Script Tag IE
///
/// In Internet Explorer a `<script>` directly before an inline `<style>`
/// blocks rendering until the fonts download. Emits at most one finding
/// per page.
pub struct FontFacePrecedeScriptRule;

impl Rule for FontFacePrecedeScriptRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "fontface-inline-precede-script-IE".into(),
            name: "Inline @font-face preceded by Script Tag IE".into(),
            desc: "Never place an inline @font-face style directly after a SCRIPT tag; \
                   move the SCRIPT below the STYLE block or load it asynchronously."
                .into(),
        }
    }

    fn check(&self, dom: &Document, _css: &str, reporter: &mut Reporter) {
        let occurrences = SCRIPT_THEN_STYLE_RE.find_iter(dom.html()).count();
        if occurrences == 0 {
            return;
        }

        let rule = self.metadata();
        let prefix = if occurrences > 1 {
            "multiple occurances of "
        } else {
            ""
        };
        reporter.warn(
            format!(
                "WARNING: Possible SPOF attack in IE due to {prefix}inline @font-face preceded by a SCRIPT tag"
            ),
            "NA",
            Score::NotApplicable,
            &rule,
        );
    }
}
