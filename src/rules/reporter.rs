use super::finding::{Finding, RuleMetadata, Score, Severity};

/// Accumulates the findings of a single analysis.
///
/// The engine creates one reporter per `analyze` call, so no state leaks
/// between pages even though rules themselves are shared.
#[derive(Debug, Default)]
pub struct Reporter {
    messages: Vec<Finding>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finding. `severity` falls back to [`Severity::Info`].
    pub fn report(
        &mut self,
        message: impl Into<String>,
        entity: impl Into<String>,
        score: Score,
        rule: &RuleMetadata,
        severity: Option<Severity>,
    ) {
        self.messages.push(Finding {
            severity: severity.unwrap_or_default(),
            message: message.into(),
            entity: entity.into(),
            score,
            rule: rule.clone(),
        });
    }

    pub fn error(
        &mut self,
        message: impl Into<String>,
        entity: impl Into<String>,
        score: Score,
        rule: &RuleMetadata,
    ) {
        self.report(message, entity, score, rule, Some(Severity::Error));
    }

    pub fn warn(
        &mut self,
        message: impl Into<String>,
        entity: impl Into<String>,
        score: Score,
        rule: &RuleMetadata,
    ) {
        self.report(message, entity, score, rule, Some(Severity::Warning));
    }

    /// Findings in the order they were reported.
    pub fn messages(&self) -> &[Finding] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<Finding> {
        self.messages
    }
}
