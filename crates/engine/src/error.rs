//! The module contains the error the engine can throw.
//!
//! The reconciliation core is read-only and degrades store failures to empty
//! result sets, so the error surface is small:
//!
//! - [`Schema`] thrown when a backing table is missing at startup.
//! - [`InvalidFilter`] thrown when a ledger filter is inconsistent.
//!
//!  [`Schema`]: EngineError::Schema
//!  [`InvalidFilter`]: EngineError::InvalidFilter
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("schema mismatch: {0}")]
    Schema(String),
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Schema(a), Self::Schema(b)) => a == b,
            (Self::InvalidFilter(a), Self::InvalidFilter(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
