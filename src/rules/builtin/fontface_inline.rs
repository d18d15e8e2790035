use crate::dom::Document;
use crate::rules::heuristics::font_face_urls;
use crate::rules::{Reporter, Rule, RuleMetadata, Score};

/// fontface-inline: Inline @font-face
///
/// Same extraction as the stylesheet rule, applied to the page markup so
/// that `@font-face` blocks inside inline `<style>` elements are caught.
pub struct FontFaceInlineRule;

impl Rule for FontFaceInlineRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "fontface-inline".into(),
            name: "Inline @font-face".into(),
            desc: "Make sure the fonts referenced by inline @font-face styles are compressed, \
                   cacheable and small. Consider loading them lazily so text renders first."
                .into(),
        }
    }

    fn check(&self, dom: &Document, _css: &str, reporter: &mut Reporter) {
        let rule = self.metadata();

        for url in font_face_urls(dom.html()) {
            reporter.warn(
                format!("WARNING: Possible SPOF attack due to inline @font-face style - {url}"),
                url,
                Score::NotApplicable,
                &rule,
            );
        }
    }
}
