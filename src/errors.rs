use thiserror::Error;

use onboard_config::ConfigError;
use onboard_domain::OfferId;

/// Crate-level failures surfaced by persistence, submission and the CLI.
#[derive(Debug, Error)]
pub enum OnboardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Submission failed: {0}")]
    Submission(#[from] SubmissionError),
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// A rule that cannot be evaluated as written. Never reaches the caller of
/// the validation engine; it is downgraded to a field message there.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("rule `{rule}` cannot be applied to a {found} value")]
    TypeMismatch { rule: String, found: &'static str },
    #[error("rule `{rule}` panicked")]
    Panicked { rule: String },
}

/// Signals returned by the offer editor. The offer list is left untouched
/// whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error("limit reached: at most {limit} {what} allowed")]
    LimitReached { what: &'static str, limit: usize },
    #[error("minimum reached: an offer needs at least {minimum} item")]
    MinimumReached { minimum: usize },
    #[error("offer {0} not found")]
    OfferNotFound(OfferId),
    #[error("offer {offer} has no item at position {index}")]
    ItemNotFound { offer: OfferId, index: usize },
    #[error("switching offer {offer} to single would discard {discarded} items")]
    WouldDiscardItems { offer: OfferId, discarded: usize },
    #[error("offer {0} needs a finite price")]
    InvalidPrice(OfferId),
    #[error("no offer ids left to allocate")]
    IdsExhausted,
}

impl CollectionError {
    /// True for the two bound signals (`LimitReached` / `MinimumReached`).
    pub fn is_bound(&self) -> bool {
        matches!(
            self,
            CollectionError::LimitReached { .. } | CollectionError::MinimumReached { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    Rejected(String),
}
