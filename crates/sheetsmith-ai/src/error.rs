use thiserror::Error;

/// Message used when the backend fails without a readable `detail`
pub const GENERIC_FAILURE: &str = "Failed to generate cellmap";

#[derive(Error, Debug)]
pub enum FillError {
    #[error("prompt is empty")]
    EmptyPrompt,

    #[error("an AI request is already in progress")]
    InFlight,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{detail}")]
    Remote { status: u16, detail: String },

    #[error("malformed cell map: {0}")]
    MalformedResponse(String),

    #[error("AI request task ended abnormally: {0}")]
    Interrupted(String),
}

impl FillError {
    pub fn code(&self) -> &'static str {
        match self {
            FillError::EmptyPrompt => "EMPTY_PROMPT",
            FillError::InFlight => "AI_IN_FLIGHT",
            FillError::Network(_) => "AI_NETWORK",
            FillError::Remote { .. } => "AI_REMOTE",
            FillError::MalformedResponse(_) => "AI_MALFORMED_RESPONSE",
            FillError::Interrupted(_) => "AI_INTERRUPTED",
        }
    }

    /// Raised locally, before any request was made
    pub fn is_local(&self) -> bool {
        matches!(self, FillError::EmptyPrompt | FillError::InFlight)
    }
}
