// src/domain/errors.rs
use crate::domain::model::OrderStatus;
use std::fmt;
use thiserror::Error;

/// Top-level application error for the binary surface.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Market error: {0}")]
    Market(#[from] MarketError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Business failure taxonomy. Every variant is an expected outcome returned
/// to the caller as a structured result, never a fault.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Lead already claimed: {0}")]
    AlreadyClaimed(String),

    #[error("Insufficient credits: need {required}, have {available}")]
    InsufficientCredits { required: i64, available: i64 },

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Price is locked for order {0}")]
    PriceLocked(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Lead,
    Order,
    Agent,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EntityKind::Lead => write!(f, "Lead"),
            EntityKind::Order => write!(f, "Order"),
            EntityKind::Agent => write!(f, "Agent"),
        }
    }
}

impl MarketError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        MarketError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

// Result type aliases for convenience
pub type AppResult<T> = Result<T, AppError>;
pub type MarketResult<T> = Result<T, MarketError>;
