//! Error types.
//!
//! The pipeline itself (share resolution, aggregation, simplification) is
//! infallible: bad data degrades to a no-op. Errors only arise at the edges,
//! when reading stored documents, building a new expense, confirming a
//! payment, or loading configuration.

use rust_decimal::Decimal;
use thiserror::Error;

/// A stored document could not be read as a member or transaction.
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` must be a string")]
    NotAString { field: &'static str },
}

/// A new expense failed validation before being logged.
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("please enter a title")]
    MissingTitle,
    #[error("please enter a valid amount, got '{0}'")]
    InvalidAmount(String),
    #[error("select at least one member")]
    NoParticipants,
    #[error("payer {0} is not a member of this group")]
    UnknownPayer(String),
    #[error("participant {0} is not a member of this group")]
    UnknownParticipant(String),
    #[error("enter a valid amount for member {0}")]
    InvalidShare(String),
    #[error("unequal split must add up to {expected}, got {actual}")]
    SplitMismatch { expected: Decimal, actual: Decimal },
}

/// A recommended transfer could not be confirmed as a settlement.
#[derive(Debug, Error, PartialEq)]
pub enum ConfirmError {
    #[error("confirmed amount must be positive, got {0}")]
    NonPositive(Decimal),
    #[error("confirmed amount {confirmed} exceeds the outstanding {outstanding}")]
    ExceedsOutstanding {
        confirmed: Decimal,
        outstanding: Decimal,
    },
}

/// Top-level error for the binary and for callers that mix concerns.
#[derive(Debug, Error)]
pub enum Error {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("invalid expense: {0}")]
    Build(#[from] BuildError),
    #[error("cannot confirm payment: {0}")]
    Confirm(#[from] ConfirmError),
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
