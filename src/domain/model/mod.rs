// src/domain/model/mod.rs
// Core domain models

pub mod agent;
pub mod credit;
pub mod lead;
pub mod order;

pub use agent::Agent;
pub use credit::{CreditTransaction, TransactionReason};
pub use lead::{GeoPoint, Lead, LeadFilter, NewLead};
pub use order::{Actor, NewOrder, Order, OrderStatus, Role};
