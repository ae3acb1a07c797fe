// src/infrastructure/persistence/mod.rs
// In-memory repositories
//
// Backing store for tests and single-process deployments. The atomicity
// contracts live in the lock scopes: lead removal is a compare-and-swap
// under the pool's write lock, and a ledger debit performs its floor check,
// balance write and journal append inside one critical section.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::domain::errors::{EntityKind, MarketError, MarketResult};
use crate::domain::model::{Agent, CreditTransaction, Lead, NewLead, Order, TransactionReason};
use crate::domain::repository::{
    AgentRepository, LeadRepository, LedgerRepository, OrderRepository,
};

/// Agent records and the credit journal share one lock: a balance update
/// and its transaction row commit together or not at all.
#[derive(Default)]
struct AccountBook {
    agents: HashMap<String, Agent>,
    journal: Vec<CreditTransaction>,
}

#[derive(Default)]
pub struct MemoryStore {
    leads: RwLock<HashMap<String, Lead>>,
    orders: RwLock<HashMap<String, Order>>,
    accounts: RwLock<AccountBook>,
    lead_seq: AtomicU64,
    order_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_lead_id(&self) -> String {
        format!("LEAD-{:06}", self.lead_seq.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn next_order_id(&self) -> String {
        format!("ORD-{:06}", self.order_seq.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[async_trait]
impl LeadRepository for MemoryStore {
    async fn insert_lead(&self, request: NewLead) -> MarketResult<Lead> {
        let lead = Lead::new(self.next_lead_id(), request, Utc::now());
        self.leads
            .write()
            .await
            .insert(lead.id.clone(), lead.clone());
        Ok(lead)
    }

    async fn get_lead(&self, lead_id: &str) -> MarketResult<Lead> {
        self.leads
            .read()
            .await
            .get(lead_id)
            .cloned()
            .ok_or_else(|| MarketError::not_found(EntityKind::Lead, lead_id))
    }

    async fn list_leads(&self) -> MarketResult<Vec<Lead>> {
        Ok(self.leads.read().await.values().cloned().collect())
    }

    async fn take_lead(&self, lead_id: &str, expected_version: u64) -> MarketResult<Lead> {
        let mut leads = self.leads.write().await;
        match leads.remove(lead_id) {
            None => Err(MarketError::not_found(EntityKind::Lead, lead_id)),
            Some(lead) if lead.version != expected_version => {
                leads.insert(lead.id.clone(), lead);
                Err(MarketError::AlreadyClaimed(lead_id.to_string()))
            }
            Some(lead) => Ok(lead),
        }
    }

    async fn restore_lead(&self, mut lead: Lead) -> MarketResult<()> {
        // Bumping the token invalidates any take still holding the old one.
        lead.version += 1;
        self.leads.write().await.insert(lead.id.clone(), lead);
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn insert_order(&self, mut order: Order) -> MarketResult<Order> {
        if order.id.is_empty() {
            order.id = self.next_order_id();
        }
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(MarketError::Validation(format!(
                "order {} already exists",
                order.id
            )));
        }
        orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn get_order(&self, order_id: &str) -> MarketResult<Order> {
        self.orders
            .read()
            .await
            .get(order_id)
            .cloned()
            .ok_or_else(|| MarketError::not_found(EntityKind::Order, order_id))
    }

    async fn update_order(&self, mut order: Order) -> MarketResult<Order> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .get(&order.id)
            .ok_or_else(|| MarketError::not_found(EntityKind::Order, &order.id))?;
        if stored.version != order.version {
            return Err(MarketError::DependencyUnavailable(format!(
                "concurrent update on order {}, retry with a fresh read",
                order.id
            )));
        }
        order.version += 1;
        orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn list_orders(&self) -> MarketResult<Vec<Order>> {
        Ok(self.orders.read().await.values().cloned().collect())
    }

    async fn orders_for_agent(&self, agent_id: &str) -> MarketResult<Vec<Order>> {
        Ok(self
            .orders
            .read()
            .await
            .values()
            .filter(|order| order.assigned_agent.as_deref() == Some(agent_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AgentRepository for MemoryStore {
    async fn get_agent(&self, agent_id: &str) -> MarketResult<Agent> {
        self.accounts
            .read()
            .await
            .agents
            .get(agent_id)
            .cloned()
            .ok_or_else(|| MarketError::not_found(EntityKind::Agent, agent_id))
    }

    async fn list_agents(&self) -> MarketResult<Vec<Agent>> {
        Ok(self.accounts.read().await.agents.values().cloned().collect())
    }

    async fn upsert_agent(&self, agent: Agent) -> MarketResult<()> {
        self.accounts
            .write()
            .await
            .agents
            .insert(agent.id.clone(), agent);
        Ok(())
    }

    async fn record_completion(&self, agent_id: &str) -> MarketResult<()> {
        let mut book = self.accounts.write().await;
        let agent = book
            .agents
            .get_mut(agent_id)
            .ok_or_else(|| MarketError::not_found(EntityKind::Agent, agent_id))?;
        agent.completed_jobs += 1;
        agent.version += 1;
        Ok(())
    }
}

#[async_trait]
impl LedgerRepository for MemoryStore {
    async fn balance_of(&self, agent_id: &str) -> MarketResult<i64> {
        self.accounts
            .read()
            .await
            .agents
            .get(agent_id)
            .map(|agent| agent.balance)
            .ok_or_else(|| MarketError::not_found(EntityKind::Agent, agent_id))
    }

    async fn debit(
        &self,
        agent_id: &str,
        amount: i64,
        reason: TransactionReason,
        reference: &str,
    ) -> MarketResult<i64> {
        // Zero is legal: flooring a small asking price can cost nothing.
        if amount < 0 {
            return Err(MarketError::Validation(format!(
                "debit amount must not be negative, got {}",
                amount
            )));
        }
        let mut book = self.accounts.write().await;
        let agent = book
            .agents
            .get_mut(agent_id)
            .ok_or_else(|| MarketError::not_found(EntityKind::Agent, agent_id))?;
        if amount > agent.balance {
            return Err(MarketError::InsufficientCredits {
                required: amount,
                available: agent.balance,
            });
        }
        agent.balance -= amount;
        agent.version += 1;
        let balance = agent.balance;
        book.journal.push(CreditTransaction {
            agent_id: agent_id.to_string(),
            amount: -amount,
            reason,
            reference: reference.to_string(),
            created_at: Utc::now(),
        });
        Ok(balance)
    }

    async fn credit(
        &self,
        agent_id: &str,
        amount: i64,
        reason: TransactionReason,
        reference: &str,
    ) -> MarketResult<i64> {
        if amount < 0 {
            return Err(MarketError::Validation(format!(
                "credit amount must not be negative, got {}",
                amount
            )));
        }
        let mut book = self.accounts.write().await;
        let agent = book
            .agents
            .get_mut(agent_id)
            .ok_or_else(|| MarketError::not_found(EntityKind::Agent, agent_id))?;
        agent.balance += amount;
        agent.version += 1;
        let balance = agent.balance;
        book.journal.push(CreditTransaction {
            agent_id: agent_id.to_string(),
            amount,
            reason,
            reference: reference.to_string(),
            created_at: Utc::now(),
        });
        Ok(balance)
    }

    async fn transactions(&self, agent_id: &str) -> MarketResult<Vec<CreditTransaction>> {
        let book = self.accounts.read().await;
        let mut rows: Vec<CreditTransaction> = book
            .journal
            .iter()
            .filter(|row| row.agent_id == agent_id)
            .cloned()
            .collect();
        rows.reverse();
        Ok(rows)
    }

    async fn find_by_reference(&self, reference: &str) -> MarketResult<Vec<CreditTransaction>> {
        Ok(self
            .accounts
            .read()
            .await
            .journal
            .iter()
            .filter(|row| row.reference == reference)
            .cloned()
            .collect())
    }
}
