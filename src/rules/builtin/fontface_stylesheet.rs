use crate::dom::Document;
use crate::rules::heuristics::font_face_urls;
use crate::rules::{Reporter, Rule, RuleMetadata, Score};

/// fontface-stylesheet: Stylesheet With @font-face
///
/// Flags every font referenced from an `@font-face` block in the page's
/// external stylesheets. Position scoring does not apply to external CSS.
pub struct FontFaceStylesheetRule;

impl Rule for FontFaceStylesheetRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "fontface-stylesheet".into(),
            name: "Stylesheet With @font-face".into(),
            desc: "Try to inline @font-face style. Also make sure the font files are \
                   compressed and cacheable, and served from a host that is unlikely to fail."
                .into(),
        }
    }

    fn check(&self, _dom: &Document, css: &str, reporter: &mut Reporter) {
        if css.is_empty() {
            return;
        }
        let rule = self.metadata();

        for url in font_face_urls(css) {
            reporter.warn(
                format!(
                    "WARNING: Possible SPOF attack due to @font-face style in external stylesheet - {url}"
                ),
                url,
                Score::NotApplicable,
                &rule,
            );
        }
    }
}
