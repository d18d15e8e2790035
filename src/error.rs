use thiserror::Error;

pub type Result<T> = std::result::Result<T, SpofError>;

#[derive(Error, Debug)]
pub enum SpofError {
    /// No targets were given; the payload is the full usage text.
    #[error("{0}")]
    Usage(String),

    #[error("Unknown format '{0}'. Cannot proceed")]
    UnknownFormat(String),

    #[error("Invalid rules - {0}")]
    InvalidRules(String),

    #[error("Empty ruleset")]
    EmptyRuleSet,

    #[error("Unable to load {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SpofError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 1,
            _ => 2,
        }
    }
}
