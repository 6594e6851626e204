use thiserror::Error;

pub type DialogResult<T> = Result<T, DialogError>;

#[derive(Error, Debug)]
pub enum DialogError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credentials error: {0}")]
    Credentials(String),

    /// The raw payload lacks a field the mapping for `kind` needs.
    #[error("Unsupported event shape: {kind} event has no `{field}`")]
    UnsupportedShape {
        kind: &'static str,
        field: &'static str,
    },

    #[error("Analytics transport error: {0}")]
    Transport(String),

    #[error("Analytics API error {code}: {error}")]
    Api {
        code: String,
        error: serde_json::Value,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl DialogError {
    pub fn unsupported(kind: &'static str, field: &'static str) -> Self {
        DialogError::UnsupportedShape { kind, field }
    }
}
