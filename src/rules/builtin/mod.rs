mod application_js;
mod fontface_inline;
mod fontface_precede_script;
mod fontface_stylesheet;
mod third_party_scripts;

use std::sync::Arc;

use super::heuristics::ThirdPartyMatcher;
use super::Rule;

pub use application_js::ApplicationJsRule;
pub use fontface_inline::FontFaceInlineRule;
pub use fontface_precede_script::FontFacePrecedeScriptRule;
pub use fontface_stylesheet::FontFaceStylesheetRule;
pub use third_party_scripts::ThirdPartyScriptsRule;

/// Returns all built-in rules in registration order. Report ordering
/// follows this order.
pub fn all_rules() -> Vec<Arc<dyn Rule>> {
    all_rules_with(Arc::new(ThirdPartyMatcher::builtin()))
}

/// Built-in rules with a custom third-party host list.
pub fn all_rules_with(matcher: Arc<ThirdPartyMatcher>) -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(ThirdPartyScriptsRule::new(Arc::clone(&matcher))),
        Arc::new(ApplicationJsRule::new(matcher)),
        Arc::new(FontFaceStylesheetRule),
        Arc::new(FontFaceInlineRule),
        Arc::new(FontFacePrecedeScriptRule),
    ]
}

/// Whether a script element is missing `defer` or `async`.
///
/// Only a script carrying both attributes counts as fully non-blocking.
fn is_blocking(script: &crate::dom::Element) -> bool {
    !script.has_attr("defer") || !script.has_attr("async")
}
