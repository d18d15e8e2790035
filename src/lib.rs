//! spofcheck — frontend single point of failure detection.
//!
//! Fetches web pages and their external stylesheets, runs a set of rules
//! looking for third-party or blocking resources (scripts, `@font-face`
//! fonts) that can stall rendering when they fail to load, and reports the
//! findings as JUnit XML, SPOF XML or plain text.
//!
//! # Quick Start
//!
//! ```no_run
//! use spofcheck::run::{run_blocking, RunOptions};
//!
//! let options = RunOptions {
//!     format: "text".into(),
//!     ..RunOptions::default()
//! };
//! let report = run_blocking(&["www.ebay.com".to_string()], &options).unwrap();
//! println!("{}", report.rendered);
//! ```
//!
//! The rule engine can also be used on its own:
//!
//! ```
//! use spofcheck::{analyze_html, RuleEngine};
//!
//! let html = r#"<script src="http://platform.twitter.com/widgets.js"></script>"#;
//! let result = analyze_html(&RuleEngine::builtin(), html, "").unwrap();
//! assert_eq!(result.messages[0].rule.id, "3rdparty-scripts");
//! ```

pub mod config;
pub mod dom;
pub mod error;
pub mod net;
pub mod output;
pub mod rules;
pub mod run;

use dom::Document;
use error::Result;

pub use output::{Formatter, FormatterRegistry};
pub use rules::{
    filter_by_ids, AnalysisResult, Finding, Rule, RuleEngine, RuleMetadata, RuleRegistry, Score,
    Severity,
};

/// Parse `html` and analyze it together with already-fetched external CSS.
pub fn analyze_html(engine: &RuleEngine, html: &str, css: &str) -> Result<AnalysisResult> {
    engine.analyze(&Document::parse(html), css, None)
}
