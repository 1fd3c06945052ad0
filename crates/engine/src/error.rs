//! The module contains the errors the engine can throw.
//!
//! Every validation failure maps to exactly one variant, so the transport
//! layer can translate kinds to status codes without string matching.

use sea_orm::DbErr;
use thiserror::Error;

use crate::MoneyCents;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A group, member, expense or user was not found.
    #[error("\"{0}\" not found")]
    NotFound(String),
    /// A member with the same display name already exists in the group.
    #[error("\"{0}\" already present")]
    Conflict(String),
    /// EXACT/PERCENTAGE split inputs do not reconcile with the expense.
    ///
    /// `expected`/`actual` are minor units for EXACT splits and basis
    /// points for PERCENTAGE splits.
    #[error("split does not reconcile: expected {expected}, got {actual}")]
    SplitMismatch { expected: i64, actual: i64 },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A settlement larger than the payer's outstanding balance.
    #[error("settlement amount {requested} exceeds outstanding balance {available}")]
    SettlementExceedsBalance {
        requested: MoneyCents,
        available: MoneyCents,
    },
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (
                Self::SplitMismatch {
                    expected: a,
                    actual: b,
                },
                Self::SplitMismatch {
                    expected: c,
                    actual: d,
                },
            ) => a == c && b == d,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (
                Self::SettlementExceedsBalance {
                    requested: a,
                    available: b,
                },
                Self::SettlementExceedsBalance {
                    requested: c,
                    available: d,
                },
            ) => a == c && b == d,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
