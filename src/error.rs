use thiserror::Error;

/// Everything that can go wrong while serving one console operation.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("unable to read credentials: {0}")]
    Credentials(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sheets API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),
}

impl ConsoleError {
    /// Errors caused by what the user typed. These are echoed back and the
    /// loop carries on; everything else is logged.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ConsoleError::InvalidInput(_) | ConsoleError::SheetNotFound(_)
        )
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ConsoleError::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
