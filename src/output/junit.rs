//! JUnit XML output.
//!
//! One `<testsuite>` per URL with findings, one `<testcase>` per finding.
//! JUnit has no warning class, so warnings are reported as errors.

use super::Formatter;
use crate::rules::{AnalysisResult, RuleMetadata, Severity};

pub struct JunitXmlFormatter;

impl Formatter for JunitXmlFormatter {
    fn id(&self) -> &'static str {
        "junit-xml"
    }

    fn name(&self) -> &'static str {
        "JUNIT XML format"
    }

    fn extension(&self) -> &'static str {
        "xml"
    }

    fn start_format(&self) -> String {
        "<?xml version=\"1.0\" encoding=\"utf-8\"?><testsuites>".into()
    }

    fn end_format(&self) -> String {
        "</testsuites>".into()
    }

    fn format_results(&self, result: &AnalysisResult, url: &str) -> String {
        if result.messages.is_empty() {
            return String::new();
        }

        let mut errors = 0;
        let mut failures = 0;
        let mut cases = String::new();

        for message in &result.messages {
            let kind = match message.severity {
                Severity::Error | Severity::Warning => {
                    errors += 1;
                    "error"
                }
                Severity::Info => {
                    failures += 1;
                    "failure"
                }
            };

            cases.push_str(&format!(
                "<testcase time=\"0\" name=\"{}\">",
                test_name(&message.rule)
            ));
            cases.push_str(&format!(
                "<{kind} message=\"{}\"><![CDATA[entity={}:score={}%]]></{kind}>",
                escape(&format!("{} Fix: {}", message.message, message.rule.desc)),
                message.entity,
                message.score,
            ));
            cases.push_str("</testcase>");
        }

        format!(
            "<testsuite time=\"0\" tests=\"{}\" skipped=\"0\" errors=\"{}\" failures=\"{}\" package=\"net.spof\" name=\"{}\">{}</testsuite>",
            result.messages.len(),
            errors,
            failures,
            url,
            cases
        )
    }
}

/// Java-class-like name for a rule, e.g. `net.spof.InlineFontFace`.
fn test_name(rule: &RuleMetadata) -> String {
    let compact: String = rule.name.chars().filter(|c| !c.is_whitespace()).collect();
    format!("net.spof.{compact}")
}

/// Double quotes become single quotes; `&` is left alone.
fn escape(s: &str) -> String {
    s.replace('"', "'").replace('<', "&lt;").replace('>', "&gt;")
}
