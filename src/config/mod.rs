use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_FORMAT: &str = "junit-xml";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Top-level configuration from `.spofcheck.toml`.
///
/// Every field is optional; command-line flags take precedence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Formatter id (`junit-xml`, `spof-xml`, `text`).
    #[serde(default = "default_format")]
    pub format: String,
    /// Rule ids to run; all rules when absent.
    #[serde(default)]
    pub rules: Option<Vec<String>>,
    /// Directory for the report file. Defaults to the working directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Print the report instead of writing a file.
    #[serde(default)]
    pub print: bool,
    #[serde(default)]
    pub quiet: bool,
    /// Per-request timeout for page and stylesheet fetches.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Extra third-party host patterns (regex fragments), checked after the
    /// built-in list.
    #[serde(default)]
    pub third_party_patterns: Vec<String>,
}

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: default_format(),
            rules: None,
            output_dir: None,
            print: false,
            quiet: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
            third_party_patterns: Vec::new(),
        }
    }
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# spofcheck configuration

# Output format: junit-xml, spof-xml or text.
format = "junit-xml"

# Rule IDs to run. All rules run when omitted.
# rules = ["3rdparty-scripts", "application-js"]

# Directory the report file is written to.
# output_dir = "dist/spof"

# Print the report to stdout instead of writing a file.
print = false

# Keep the console free of progress logging.
quiet = false

# Per-request timeout in seconds.
timeout_secs = 15

# Additional third-party host patterns (regular expression fragments).
# third_party_patterns = ["cdn\\.example\\.net"]
"#
    }
}
