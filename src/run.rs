//! Multi-page orchestration: fetch each page and its stylesheets
//! concurrently, analyze, and assemble the formatted report.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::Config;
use crate::dom::Document;
use crate::error::{Result, SpofError};
use crate::net::{normalize_target, stylesheet_urls, Fetcher, HttpFetcher, DEFAULT_USER_AGENT};
use crate::output::{render_report, FormatterRegistry};
use crate::rules::heuristics::ThirdPartyMatcher;
use crate::rules::{builtin, filter_by_ids, AnalysisResult, RuleEngine, RuleRegistry};

pub const USAGE: &str = "
USAGE: spofcheck check [options]* [urls]*

Options:
  --config=<file> | -c <file>                 Reads settings from this TOML file (default .spofcheck.toml).
  --format=<format> | -f <format>             Indicate which format [junit-xml | spof-xml | text] to use for output
  --outputdir=<dir> | -o <dir>                Outputs the spof results to this directory.
  --rules=<rule[,rule]+> | -r <rule[,rule]+>  Indicate which rules to include.
  --print | -p                                Outputs the results in console, instead of saving to a file.
  --quiet | -q                                Keeps the console clear from logging.
  --timeout=<secs>                            Per-request timeout in seconds.
  --debug                                     Enables debug-level logging.
  --help | -h                                 Prints help for every option.

Example:
  spofcheck check -f junit-xml -o /tests www.ebay.com www.amazon.com
";

/// Options for one run over a set of pages.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub format: String,
    /// Rule ids to keep; every built-in rule when `None`.
    pub rules: Option<Vec<String>>,
    pub output_dir: Option<PathBuf>,
    pub print: bool,
    pub timeout: Duration,
    pub user_agent: String,
    pub third_party_patterns: Vec<String>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for RunOptions {
    fn from(config: &Config) -> Self {
        Self {
            format: config.format.clone(),
            rules: config.rules.clone(),
            output_dir: config.output_dir.clone(),
            print: config.print,
            timeout: Duration::from_secs(config.timeout_secs),
            user_agent: config
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            third_party_patterns: config.third_party_patterns.clone(),
        }
    }
}

/// Outcome of a run with at least one successfully analyzed page.
#[derive(Debug)]
pub struct RunReport {
    pub formatter_id: String,
    pub extension: String,
    /// One result per analyzed page, in the order the targets were given.
    pub results: Vec<AnalysisResult>,
    /// Pages that could not be fetched.
    pub failures: Vec<SpofError>,
    /// Complete formatted report.
    pub rendered: String,
}

impl RunReport {
    /// `<formatter id>.<extension>`
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.formatter_id, self.extension)
    }
}

/// Analyze every target with the given fetcher.
///
/// A page that fails to load is recorded in [`RunReport::failures`] without
/// affecting the others. When no page could be analyzed the last fetch
/// error is returned.
pub async fn run<F>(targets: &[String], options: &RunOptions, fetcher: Arc<F>) -> Result<RunReport>
where
    F: Fetcher + 'static,
{
    if targets.is_empty() {
        return Err(SpofError::Usage(USAGE.to_string()));
    }

    let formatters = FormatterRegistry::builtin();
    let formatter = formatters
        .get(&options.format)
        .ok_or_else(|| SpofError::UnknownFormat(options.format.clone()))?;

    let engine = Arc::new(build_engine(options)?);

    let mut tasks = JoinSet::new();
    for (index, target) in targets.iter().enumerate() {
        let url = normalize_target(target);
        let fetcher = Arc::clone(&fetcher);
        let engine = Arc::clone(&engine);
        let timeout = options.timeout;
        tasks.spawn(async move {
            let outcome = analyze_page(url, fetcher, engine, timeout).await;
            (index, outcome)
        });
    }

    let mut analyzed: Vec<(usize, AnalysisResult)> = Vec::new();
    let mut failures: Vec<SpofError> = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(result))) => analyzed.push((index, result)),
            Ok((_, Err(e))) => {
                warn!(error = %e, "page failed");
                failures.push(e);
            }
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => warn!(error = %e, "page task cancelled"),
        }
    }

    if analyzed.is_empty() {
        if let Some(last) = failures.pop() {
            return Err(last);
        }
    }

    analyzed.sort_by_key(|(index, _)| *index);
    let results: Vec<AnalysisResult> = analyzed.into_iter().map(|(_, r)| r).collect();

    let per_url: Vec<String> = results
        .iter()
        .map(|r| formatter.format_results(r, r.url.as_deref().unwrap_or_default()))
        .collect();

    Ok(RunReport {
        formatter_id: formatter.id().to_string(),
        extension: formatter.extension().to_string(),
        rendered: render_report(formatter, &per_url),
        results,
        failures,
    })
}

/// Synchronous variant of [`run`] over HTTP.
pub fn run_blocking(targets: &[String], options: &RunOptions) -> Result<RunReport> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let fetcher = Arc::new(HttpFetcher::new(options.timeout, &options.user_agent));
    runtime.block_on(run(targets, options, fetcher))
}

/// Write the rendered report to `<dir>/<formatter id>.<extension>`,
/// creating `dir` if needed.
pub fn write_report(report: &RunReport, dir: &Path) -> Result<PathBuf> {
    info!("Flushing the results");
    std::fs::create_dir_all(dir)?;
    let file = dir.join(report.file_name());
    std::fs::write(&file, &report.rendered)?;
    info!(file = %file.display(), "Results available");
    Ok(file)
}

fn build_engine(options: &RunOptions) -> Result<RuleEngine> {
    let matcher = ThirdPartyMatcher::with_extra(&options.third_party_patterns)?;
    let mut rules = builtin::all_rules_with(Arc::new(matcher));

    if let Some(ids) = &options.rules {
        rules = filter_by_ids(ids, &rules);
        if rules.is_empty() {
            return Err(SpofError::InvalidRules(ids.join(",")));
        }
    }

    Ok(RuleEngine::new(RuleRegistry::from(rules)))
}

async fn analyze_page<F>(
    url: String,
    fetcher: Arc<F>,
    engine: Arc<RuleEngine>,
    timeout: Duration,
) -> Result<AnalysisResult>
where
    F: Fetcher + 'static,
{
    info!(url = %url, "Analyzing");
    let body = fetch_with_timeout(fetcher.as_ref(), &url, timeout).await?;
    let dom = Document::parse(&body);

    let css_urls = stylesheet_urls(&dom, &url);
    info!(url = %url, stylesheets = css_urls.len(), "Processing external CSS resources");
    let css = fetch_stylesheets(&fetcher, css_urls, timeout).await;

    let mut result = engine.analyze(&dom, &css, None)?;
    result.url = Some(url);
    Ok(result)
}

/// Fetch all stylesheets concurrently. A failed stylesheet contributes an
/// empty body.
async fn fetch_stylesheets<F>(fetcher: &Arc<F>, urls: Vec<String>, timeout: Duration) -> String
where
    F: Fetcher + 'static,
{
    let mut bodies = vec![String::new(); urls.len()];

    let mut tasks = JoinSet::new();
    for (index, url) in urls.into_iter().enumerate() {
        let fetcher = Arc::clone(fetcher);
        tasks.spawn(async move {
            let body = fetch_with_timeout(fetcher.as_ref(), &url, timeout).await;
            (index, url, body)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, _, Ok(body))) => bodies[index] = body,
            Ok((_, url, Err(e))) => {
                warn!(url = %url, error = %e, "Unable to load CSS resource");
            }
            Err(e) => warn!(error = %e, "stylesheet task failed"),
        }
    }

    bodies.join(",")
}

async fn fetch_with_timeout<F: Fetcher>(fetcher: &F, url: &str, timeout: Duration) -> Result<String> {
    tokio::time::timeout(timeout, fetcher.fetch(url))
        .await
        .map_err(|_| SpofError::Fetch {
            url: url.to_string(),
            message: format!("timed out after {:?}", timeout),
        })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MockFetcher {
        bodies: HashMap<String, String>,
    }

    impl MockFetcher {
        fn new(pairs: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                bodies: pairs
                    .iter()
                    .map(|(u, b)| (u.to_string(), b.to_string()))
                    .collect(),
            })
        }
    }

    impl Fetcher for MockFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.bodies
                .get(url)
                .cloned()
                .ok_or_else(|| SpofError::Fetch {
                    url: url.to_string(),
                    message: "HTTP status 404 Not Found".into(),
                })
        }
    }

    const TWITTER_PAGE: &str = r#"<html><head>
        <script src="http://platform.twitter.com/widgets.js"></script>
        </head><body><p>content</p></body></html>"#;

    const QUIET_PAGE: &str = "<html><head></head><body><p>nothing to see</p></body></html>";

    fn options(format: &str, rules: Option<&[&str]>) -> RunOptions {
        RunOptions {
            format: format.into(),
            rules: rules.map(|r| r.iter().map(|s| s.to_string()).collect()),
            ..RunOptions::default()
        }
    }

    fn targets(urls: &[&str]) -> Vec<String> {
        urls.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn no_targets_is_usage() {
        let err = run(&[], &RunOptions::default(), MockFetcher::new(&[]))
            .await
            .unwrap_err();
        assert!(matches!(err, SpofError::Usage(_)));
        let text = err.to_string();
        assert!(text.contains("USAGE"));
        assert!(text.contains("Example"));
    }

    #[tokio::test]
    async fn unknown_format_names_the_format() {
        let err = run(
            &targets(&["http://a.com/"]),
            &options("xml", None),
            MockFetcher::new(&[("http://a.com/", TWITTER_PAGE)]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SpofError::UnknownFormat(ref f) if f == "xml"));
        assert!(err.to_string().contains("format"));
    }

    #[tokio::test]
    async fn invalid_rule_selection() {
        let err = run(
            &targets(&["http://a.com/"]),
            &options("junit-xml", Some(&["invalid-rule"])),
            MockFetcher::new(&[("http://a.com/", TWITTER_PAGE)]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SpofError::InvalidRules(_)));
        assert!(err.to_string().contains("invalid-rule"));
    }

    #[tokio::test]
    async fn selected_rule_only() {
        let report = run(
            &targets(&["http://a.com/"]),
            &options("junit-xml", Some(&["3rdparty-scripts"])),
            MockFetcher::new(&[("http://a.com/", TWITTER_PAGE)]),
        )
        .await
        .unwrap();

        assert_eq!(report.results.len(), 1);
        let result = &report.results[0];
        assert_eq!(result.url.as_deref(), Some("http://a.com/"));
        assert_eq!(result.messages.len(), 1);
        assert!(result
            .messages
            .iter()
            .all(|m| m.rule.id == "3rdparty-scripts"));
        assert!(report
            .rendered
            .starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?><testsuites>"));
        assert!(report.rendered.ends_with("</testsuites>"));
        assert!(report
            .rendered
            .contains("ERROR: Possible SPOF attack due to 3rd party script"));
    }

    #[tokio::test]
    async fn bare_host_gets_http_scheme() {
        let report = run(
            &targets(&["a.com"]),
            &options("text", None),
            MockFetcher::new(&[("http://a.com", QUIET_PAGE)]),
        )
        .await
        .unwrap();
        assert_eq!(report.rendered, "\nspof: http://a.com is SPOF free.");
    }

    #[tokio::test]
    async fn results_follow_target_order() {
        let report = run(
            &targets(&["http://a.com/1", "http://a.com/2", "http://a.com/1"]),
            &options("spof-xml", None),
            MockFetcher::new(&[("http://a.com/1", TWITTER_PAGE), ("http://a.com/2", QUIET_PAGE)]),
        )
        .await
        .unwrap();

        let urls: Vec<_> = report
            .results
            .iter()
            .map(|r| r.url.as_deref().unwrap())
            .collect();
        assert_eq!(urls, vec!["http://a.com/1", "http://a.com/2", "http://a.com/1"]);
        // The finding-free page contributes nothing to the spof-xml output.
        assert_eq!(report.rendered.matches("<url location=").count(), 2);
        assert_eq!(report.file_name(), "spof-xml.xml");
    }

    #[tokio::test]
    async fn external_stylesheets_are_analyzed() {
        let page = r#"<html><head>
            <link rel="stylesheet" href="/fonts.css">
            <link rel="stylesheet" href="/missing.css">
            </head><body></body></html>"#;
        let report = run(
            &targets(&["http://a.com/index.html"]),
            &options("junit-xml", Some(&["fontface-stylesheet"])),
            MockFetcher::new(&[
                ("http://a.com/index.html", page),
                (
                    "http://a.com/fonts.css",
                    "@font-face{font-family:x;src:url('http://cdn.example.com/f.woff')}",
                ),
            ]),
        )
        .await
        .unwrap();

        let messages = &report.results[0].messages;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].entity, "http://cdn.example.com/f.woff");
        assert!(messages[0]
            .message
            .contains("@font-face style in external stylesheet"));
    }

    #[tokio::test]
    async fn failed_page_does_not_stop_siblings() {
        let report = run(
            &targets(&["http://down.example/", "http://a.com/"]),
            &options("junit-xml", None),
            MockFetcher::new(&[("http://a.com/", TWITTER_PAGE)]),
        )
        .await
        .unwrap();
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].to_string().contains("down.example"));
    }

    #[tokio::test]
    async fn all_pages_failing_is_an_error() {
        let err = run(
            &targets(&["www.invalidurlneverexists.com"]),
            &options("junit-xml", None),
            MockFetcher::new(&[]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SpofError::Fetch { .. }));
        assert!(err.to_string().contains("invalidurlneverexists"));
    }

    struct SlowFetcher {
        slow: &'static str,
        inner: Arc<MockFetcher>,
    }

    impl Fetcher for SlowFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            if url == self.slow {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            self.inner.fetch(url).await
        }
    }

    #[tokio::test]
    async fn timed_out_page_is_a_failure() {
        let fetcher = Arc::new(SlowFetcher {
            slow: "http://slow.a/",
            inner: MockFetcher::new(&[("http://slow.a/", QUIET_PAGE), ("http://fast.a/", TWITTER_PAGE)]),
        });
        let opts = RunOptions {
            timeout: Duration::from_millis(200),
            ..options("junit-xml", None)
        };

        let started = std::time::Instant::now();
        let report = run(&targets(&["http://slow.a/", "http://fast.a/"]), &opts, fetcher)
            .await
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(10));

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].url.as_deref(), Some("http://fast.a/"));
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(report.failures[0], SpofError::Fetch { ref url, .. } if url == "http://slow.a/"));
        assert!(report.failures[0]
            .to_string()
            .contains("timed out after 200ms"));
    }

    struct PanickingFetcher;

    impl Fetcher for PanickingFetcher {
        async fn fetch(&self, _url: &str) -> Result<String> {
            panic!("fetcher blew up");
        }
    }

    #[tokio::test]
    #[should_panic(expected = "fetcher blew up")]
    async fn panic_in_page_task_reaches_caller() {
        let _ = run(
            &targets(&["http://a.com/"]),
            &options("text", None),
            Arc::new(PanickingFetcher),
        )
        .await;
    }

    #[test]
    fn usage_lists_every_check_flag() {
        for flag in [
            "--config", "--format", "--outputdir", "--rules", "--print", "--quiet", "--timeout",
            "--debug", "Example:",
        ] {
            assert!(USAGE.contains(flag), "missing {flag}");
        }
    }

    #[test]
    fn writes_report_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("dist").join("spof");
        let report = RunReport {
            formatter_id: "junit-xml".into(),
            extension: "xml".into(),
            results: vec![],
            failures: vec![],
            rendered: "<testsuites></testsuites>".into(),
        };

        let file = write_report(&report, &out).unwrap();
        assert_eq!(file, out.join("junit-xml.xml"));
        assert_eq!(
            std::fs::read_to_string(file).unwrap(),
            "<testsuites></testsuites>"
        );
    }
}
