// src/domain/repository/mod.rs
// Persistence collaborator interfaces

use async_trait::async_trait;

use crate::domain::errors::MarketResult;
use crate::domain::model::{Agent, CreditTransaction, Lead, NewLead, Order, TransactionReason};

/// Storage for the unclaimed lead pool.
///
/// `take_lead` is the only removal path and is invoked solely by the claim
/// flow; it is a compare-and-swap on the lead's version token, so concurrent
/// claimants see at most one success.
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Persist a new lead, assigning its id and version.
    async fn insert_lead(&self, request: NewLead) -> MarketResult<Lead>;

    async fn get_lead(&self, lead_id: &str) -> MarketResult<Lead>;

    async fn list_leads(&self) -> MarketResult<Vec<Lead>>;

    /// Atomically remove and return the lead. Fails `NotFound` when absent,
    /// `AlreadyClaimed` when the version token no longer matches.
    async fn take_lead(&self, lead_id: &str, expected_version: u64) -> MarketResult<Lead>;

    /// Put a taken lead back, used to compensate a claim that could not
    /// produce its order.
    async fn restore_lead(&self, lead: Lead) -> MarketResult<()>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order, assigning its human-readable id.
    async fn insert_order(&self, order: Order) -> MarketResult<Order>;

    async fn get_order(&self, order_id: &str) -> MarketResult<Order>;

    /// Versioned write: fails when the stored version differs from the one
    /// the caller read, so concurrent mutations never silently overwrite.
    async fn update_order(&self, order: Order) -> MarketResult<Order>;

    async fn list_orders(&self) -> MarketResult<Vec<Order>>;

    async fn orders_for_agent(&self, agent_id: &str) -> MarketResult<Vec<Order>>;
}

#[async_trait]
pub trait AgentRepository: Send + Sync {
    async fn get_agent(&self, agent_id: &str) -> MarketResult<Agent>;

    async fn list_agents(&self) -> MarketResult<Vec<Agent>>;

    /// Register or replace an agent record (seeding/registration flows).
    async fn upsert_agent(&self, agent: Agent) -> MarketResult<()>;

    /// Bump the stored completed-jobs counter.
    async fn record_completion(&self, agent_id: &str) -> MarketResult<()>;
}

/// The credit ledger. Mutations for one agent are serialized: the floor
/// check, the balance write and the transaction row are a single atomic
/// unit, so two concurrent debits can never both pass a balance only one
/// could cover.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    async fn balance_of(&self, agent_id: &str) -> MarketResult<i64>;

    /// Fails `InsufficientCredits` when `amount` exceeds the balance.
    /// Returns the new balance.
    async fn debit(
        &self,
        agent_id: &str,
        amount: i64,
        reason: TransactionReason,
        reference: &str,
    ) -> MarketResult<i64>;

    /// Returns the new balance.
    async fn credit(
        &self,
        agent_id: &str,
        amount: i64,
        reason: TransactionReason,
        reference: &str,
    ) -> MarketResult<i64>;

    /// Rows for one agent, newest first.
    async fn transactions(&self, agent_id: &str) -> MarketResult<Vec<CreditTransaction>>;

    /// Rows settling against one lead or order id.
    async fn find_by_reference(&self, reference: &str) -> MarketResult<Vec<CreditTransaction>>;
}
