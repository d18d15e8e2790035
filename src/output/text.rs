use super::Formatter;
use crate::rules::AnalysisResult;

/// Plain text report, one block per URL.
pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn id(&self) -> &'static str {
        "text"
    }

    fn name(&self) -> &'static str {
        "Plain Text"
    }

    fn extension(&self) -> &'static str {
        "text"
    }

    fn format_results(&self, result: &AnalysisResult, url: &str) -> String {
        let messages = &result.messages;
        if messages.is_empty() {
            return format!("\nspof: {url} is SPOF free.");
        }

        let mut output = format!(
            "\nspof: There are {} problems in {url}.",
            messages.len()
        );
        for (i, message) in messages.iter().enumerate() {
            output.push_str(&format!("\n\n{}. {}", i + 1, message.message));
            output.push_str(&format!("\nSeverity: {}", message.severity));
            output.push_str(&format!("\nEntity: {}", message.entity));
            output.push_str(&format!("\nScore: {}", message.score));
            output.push_str(&format!("\nFix: {}", message.rule.desc));
        }
        output.push('\n');

        output
    }
}
