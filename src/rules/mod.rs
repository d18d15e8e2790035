pub mod builtin;
pub mod finding;
pub mod heuristics;
pub mod reporter;

use std::sync::Arc;

use crate::dom::Document;
use crate::error::{Result, SpofError};

pub use finding::{AnalysisResult, Finding, RuleMetadata, Score, Severity};
pub use reporter::Reporter;

/// A rule inspects one page and records findings on a reporter.
pub trait Rule: Send + Sync {
    /// Descriptor (id, name, remediation text) attached to every finding.
    fn metadata(&self) -> RuleMetadata;

    /// Run the rule against the parsed page and its concatenated external CSS.
    ///
    /// Absent data (no scripts, empty CSS) must yield no findings, never a panic.
    fn check(&self, dom: &Document, css: &str, reporter: &mut Reporter);
}

/// Ordered rule collection. Duplicated ids are kept as-is.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<Arc<dyn Rule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the five built-in rules.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register_all(builtin::all_rules());
        registry
    }

    pub fn register<R: Rule + 'static>(&mut self, rule: R) {
        self.rules.push(Arc::new(rule));
    }

    pub fn register_all<I>(&mut self, rules: I)
    where
        I: IntoIterator<Item = Arc<dyn Rule>>,
    {
        self.rules.extend(rules);
    }

    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    pub fn list_rules(&self) -> Vec<RuleMetadata> {
        self.rules.iter().map(|r| r.metadata()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| r.metadata().id))
            .finish()
    }
}

impl From<Vec<Arc<dyn Rule>>> for RuleRegistry {
    fn from(rules: Vec<Arc<dyn Rule>>) -> Self {
        Self { rules }
    }
}

/// Keep the rules whose id is listed in `ids`, in the order of `rules`.
///
/// Each item of `ids` may itself be a comma-separated list, so both
/// `["a", "b"]` and `["a,b"]` select the same rules. An empty result is
/// the caller's error to report.
pub fn filter_by_ids<I, S>(ids: I, rules: &[Arc<dyn Rule>]) -> Vec<Arc<dyn Rule>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let wanted: std::collections::HashSet<String> = ids
        .into_iter()
        .flat_map(|s| {
            s.as_ref()
                .split(',')
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect();

    rules
        .iter()
        .filter(|r| wanted.contains(&r.metadata().id))
        .cloned()
        .collect()
}

/// Runs a standing rule registry against parsed pages.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    registry: RuleRegistry,
}

impl RuleEngine {
    pub fn new(registry: RuleRegistry) -> Self {
        Self { registry }
    }

    /// An engine over the built-in rules.
    pub fn builtin() -> Self {
        Self::new(RuleRegistry::builtin())
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Analyze one page.
    ///
    /// `extra` rules are appended to the registry's rules, never used on
    /// their own. Rules run sequentially against a fresh [`Reporter`]; a
    /// panicking rule is not caught.
    pub fn analyze(
        &self,
        dom: &Document,
        css: &str,
        extra: Option<&[Arc<dyn Rule>]>,
    ) -> Result<AnalysisResult> {
        let mut rules: Vec<&Arc<dyn Rule>> = self.registry.rules().iter().collect();
        if let Some(extra) = extra {
            rules.extend(extra.iter());
        }

        if rules.is_empty() {
            return Err(SpofError::EmptyRuleSet);
        }

        let mut reporter = Reporter::new();
        for rule in rules {
            tracing::debug!(rule = %rule.metadata().id, "running rule");
            rule.check(dom, css, &mut reporter);
        }

        Ok(AnalysisResult {
            url: None,
            messages: reporter.into_messages(),
        })
    }
}
