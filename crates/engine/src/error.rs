//! The module contains the errors the engine can throw.
//!
//! Domain errors are recoverable by the caller:
//!
//! - [`Validation`] thrown when a candidate or a query is malformed.
//! - [`RiskBlocked`] thrown when the risk evaluator refuses a candidate.
//! - [`NotFound`] thrown when an item is not found.
//!
//! The remaining variants are infrastructure failures. They are never turned
//! into a risk tier and never retried by the engine.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`RiskBlocked`]: EngineError::RiskBlocked
//!  [`NotFound`]: EngineError::NotFound
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid transaction: {0}")]
    Validation(String),
    #[error("Transaction blocked by risk control: {0}")]
    RiskBlocked(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Transaction log timed out: {0}")]
    Timeout(String),
    #[error("Corrupted record: {0}")]
    Corrupt(String),
    #[error("Invalid engine configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` for failures of the storage layer rather than of the
    /// caller's input.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Corrupt(_) | Self::Config(_) | Self::Database(_)
        )
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::RiskBlocked(a), Self::RiskBlocked(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Timeout(a), Self::Timeout(b)) => a == b,
            (Self::Corrupt(a), Self::Corrupt(b)) => a == b,
            (Self::Config(a), Self::Config(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
