use super::Formatter;
use crate::rules::AnalysisResult;

/// Custom `<spof>` schema: a `<url>` element per URL holding one
/// self-closing `<issue>` per finding.
pub struct SpofXmlFormatter;

impl Formatter for SpofXmlFormatter {
    fn id(&self) -> &'static str {
        "spof-xml"
    }

    fn name(&self) -> &'static str {
        "SPOF XML format"
    }

    fn extension(&self) -> &'static str {
        "xml"
    }

    fn start_format(&self) -> String {
        "<?xml version=\"1.0\" encoding=\"utf-8\"?><spof>".into()
    }

    fn end_format(&self) -> String {
        "</spof>".into()
    }

    fn format_results(&self, result: &AnalysisResult, url: &str) -> String {
        if result.messages.is_empty() {
            return String::new();
        }

        let mut output = format!("<url location=\"{url}\">");
        for message in &result.messages {
            output.push_str(&format!(
                "<issue entity=\"{}\" score=\"{}\" severity=\"{}\" reason=\"{}\" fix=\"{}\"/>",
                message.entity,
                message.score,
                message.severity,
                escape(&message.message),
                escape(&message.rule.desc),
            ));
        }
        output.push_str("</url>");
        output
    }
}

/// Unlike the JUnit escaping, `&` is escaped here too.
fn escape(s: &str) -> String {
    s.replace('"', "'")
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
