pub mod junit;
pub mod spof_xml;
pub mod text;

use crate::rules::AnalysisResult;

/// Renders analysis results in one output syntax.
///
/// A full report is `start_format()`, then the per-URL `format_results`
/// outputs joined by newlines, then `end_format()`.
pub trait Formatter: Send + Sync {
    /// Identifier used for selection, also the artifact file stem.
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    /// Artifact file extension, without the dot.
    fn extension(&self) -> &'static str;

    fn start_format(&self) -> String {
        String::new()
    }

    fn end_format(&self) -> String {
        String::new()
    }

    fn format_results(&self, result: &AnalysisResult, url: &str) -> String;
}

/// Formatters keyed by id. Registering an existing id replaces it.
pub struct FormatterRegistry {
    formatters: Vec<Box<dyn Formatter>>,
}

impl FormatterRegistry {
    pub fn new() -> Self {
        Self {
            formatters: Vec::new(),
        }
    }

    /// `junit-xml`, `text` and `spof-xml`.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(junit::JunitXmlFormatter));
        registry.register(Box::new(text::TextFormatter));
        registry.register(Box::new(spof_xml::SpofXmlFormatter));
        registry
    }

    pub fn register(&mut self, formatter: Box<dyn Formatter>) {
        match self
            .formatters
            .iter_mut()
            .find(|f| f.id() == formatter.id())
        {
            Some(existing) => *existing = formatter,
            None => self.formatters.push(formatter),
        }
    }

    pub fn get(&self, id: &str) -> Option<&dyn Formatter> {
        self.formatters
            .iter()
            .find(|f| f.id() == id)
            .map(|f| &**f)
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.formatters.iter().map(|f| f.id()).collect()
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Assemble a complete report from per-URL outputs. Empty outputs are skipped.
pub fn render_report<S: AsRef<str>>(formatter: &dyn Formatter, per_url: &[S]) -> String {
    let body = per_url
        .iter()
        .map(|s| s.as_ref())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}{}{}", formatter.start_format(), body, formatter.end_format())
}
