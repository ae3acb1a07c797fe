// src/domain/mod.rs
pub mod errors;
pub mod model;
pub mod repository;
pub mod service;

// Re-export common types for convenience
pub use errors::{AppError, AppResult, EntityKind, MarketError, MarketResult};
pub use model::{
    Actor, Agent, CreditTransaction, GeoPoint, Lead, LeadFilter, NewLead, NewOrder, Order,
    OrderStatus, Role, TransactionReason,
};
