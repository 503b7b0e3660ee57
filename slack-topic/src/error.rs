use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("error reading stdin: {0}")]
    StdinRead(#[from] std::io::Error),

    #[error("error decoding stdin: {0}")]
    StdinDecode(#[from] serde_json::Error),

    #[error("stdin parameters must be a JSON object")]
    StdinNotObject,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("{method} failed: {reason}")]
    Api { method: String, reason: String },

    #[error("channel not found: {name}")]
    ChannelNotFound { name: String },

    #[error("invalid topic template: {0}")]
    TemplateSyntax(String),

    #[error("topic template references missing key: {path}")]
    TemplateMissingKey { path: String },
}

impl Error {
    /// Process exit code for this error, so calling scripts can branch
    /// on outcome. Code 2 is clap's own usage-error exit.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::StdinRead(_) | Self::StdinDecode(_) | Self::StdinNotObject => 3,
            Self::Http(_) | Self::Api { .. } => 4,
            Self::ChannelNotFound { .. } => 5,
            Self::TemplateSyntax(_) | Self::TemplateMissingKey { .. } => 6,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
