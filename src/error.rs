// Error type shared by every module of the crate.
// Only genuinely fatal conditions live here: undersized pools and empty teams
// are handled locally with neutral results instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BalancerError {
    /// A match carried an outcome discriminator we cannot rank.
    #[error("unknown match outcome: {0}")]
    UnknownOutcome(String),

    /// A before/including rating query named a match absent from the history.
    #[error("match not found in history: {0}")]
    MatchNotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BalancerError>;
