use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The external tool could not be executed at all
    #[error("{tool} not found or not runnable: {message}")]
    ToolMissing { tool: String, message: String },

    /// The batch was rejected before anything was spawned
    #[error("invalid job: {0}")]
    InvalidJob(String),

    #[error("Failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// Non-zero exit, carrying the tail of the tool's stderr
    #[error("{tool} failed: {detail}")]
    ToolFailed { tool: String, detail: String },

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for AppError {
    fn from(e: toml::de::Error) -> Self {
        AppError::Config(format!("Failed to parse config: {}", e))
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(e: toml::ser::Error) -> Self {
        AppError::Config(format!("Failed to serialize config: {}", e))
    }
}
