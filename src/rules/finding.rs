use serde::{Deserialize, Serialize, Serializer};

/// A SPOF finding recorded by a rule through the [`Reporter`](super::Reporter).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    /// Severity level; serialized as `type` to match the report schema.
    #[serde(rename = "type")]
    pub severity: Severity,
    /// Human-readable description of the finding.
    pub message: String,
    /// The offending resource URL, or `"NA"`.
    pub entity: String,
    /// Position score (0-100) or not applicable.
    pub score: Score,
    /// The rule that produced this finding.
    pub rule: RuleMetadata,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Render-blocking risk derived from document position.
///
/// External resources (fonts in stylesheets, pattern-level findings) have no
/// meaningful position and carry [`Score::NotApplicable`], rendered as `NA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Value(i64),
    NotApplicable,
}

impl Score {
    pub fn value(&self) -> Option<i64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::NotApplicable => None,
        }
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}"),
            Self::NotApplicable => write!(f, "NA"),
        }
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => serializer.serialize_i64(*v),
            Self::NotApplicable => serializer.serialize_str("NA"),
        }
    }
}

/// Descriptor of a rule: what it is called and how to fix what it finds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMetadata {
    pub id: String,
    pub name: String,
    /// Remediation text, printed as `Fix:` by the formatters.
    pub desc: String,
}

/// Outcome of analyzing one page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisResult {
    /// Set by the orchestrator when several pages are analyzed in one run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub messages: Vec<Finding>,
}

impl AnalysisResult {
    pub fn count(&self, severity: Severity) -> usize {
        self.messages
            .iter()
            .filter(|m| m.severity == severity)
            .count()
    }
}
