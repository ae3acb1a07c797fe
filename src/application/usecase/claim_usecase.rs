// src/application/usecase/claim_usecase.rs
// Claim coordinator: converts a lead into an order for exactly one agent

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::domain::errors::{MarketError, MarketResult};
use crate::domain::model::{Actor, Order, TransactionReason};
use crate::domain::repository::{LeadRepository, LedgerRepository, OrderRepository};
use crate::domain::service::{ClaimPricing, NotificationService};

#[async_trait]
pub trait ClaimLeadUseCase: Send + Sync {
    /// Acquire exclusive ownership of a lead by spending credits.
    ///
    /// Fails `NotFound` when the lead is absent (claimed by someone else and
    /// expired are indistinguishable to the caller), `AlreadyClaimed` when
    /// the race is lost after the fee was taken (the fee is credited back
    /// first), and `InsufficientCredits` with no state change at all.
    async fn claim_lead(&self, actor: &Actor, lead_id: &str) -> MarketResult<Order>;
}

pub struct ClaimCoordinator {
    leads: Arc<dyn LeadRepository>,
    orders: Arc<dyn OrderRepository>,
    ledger: Arc<dyn LedgerRepository>,
    pricing: Arc<dyn ClaimPricing>,
    notifier: Arc<dyn NotificationService>,
}

impl ClaimCoordinator {
    pub fn new(
        leads: Arc<dyn LeadRepository>,
        orders: Arc<dyn OrderRepository>,
        ledger: Arc<dyn LedgerRepository>,
        pricing: Arc<dyn ClaimPricing>,
        notifier: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            leads,
            orders,
            ledger,
            pricing,
            notifier,
        }
    }

    async fn rollback_fee(&self, agent_id: &str, amount: i64, reference: &str) {
        if let Err(err) = self
            .ledger
            .credit(agent_id, amount, TransactionReason::ClaimRollback, reference)
            .await
        {
            // The debit row is still in the ledger, so the dispute trail
            // survives even when the compensation write fails.
            log::error!(
                "Failed to roll back claim fee of {} for agent {}: {}",
                amount,
                agent_id,
                err
            );
        }
    }
}

#[async_trait]
impl ClaimLeadUseCase for ClaimCoordinator {
    async fn claim_lead(&self, actor: &Actor, lead_id: &str) -> MarketResult<Order> {
        actor.require_agent()?;

        let lead = self.leads.get_lead(lead_id).await?;
        let cost = self.pricing.claim_cost(&lead);

        let balance = self
            .ledger
            .debit(&actor.id, cost, TransactionReason::ClaimFee, &lead.id)
            .await?;
        log::debug!(
            "Agent {} paid claim fee {} for {} (balance now {})",
            actor.id,
            cost,
            lead.id,
            balance
        );

        // The versioned take is the contention point: losing it means another
        // agent won between our read and now.
        let lead = match self.leads.take_lead(lead_id, lead.version).await {
            Ok(lead) => lead,
            Err(err) => {
                self.rollback_fee(&actor.id, cost, lead_id).await;
                return Err(match err {
                    MarketError::NotFound { .. } | MarketError::AlreadyClaimed(_) => {
                        MarketError::AlreadyClaimed(lead_id.to_string())
                    }
                    other => other,
                });
            }
        };

        let order = Order::from_lead(&lead, actor.id.clone(), Utc::now());
        let order = match self.orders.insert_order(order).await {
            Ok(order) => order,
            Err(err) => {
                // Lead first so it is never lost from the pool, then the fee.
                if let Err(restore_err) = self.leads.restore_lead(lead.clone()).await {
                    log::error!("Failed to restore lead {}: {}", lead.id, restore_err);
                }
                self.rollback_fee(&actor.id, cost, &lead.id).await;
                return Err(err);
            }
        };

        log::info!(
            "Lead {} claimed by agent {} as order {} (fee {})",
            lead.id,
            actor.id,
            order.id,
            cost
        );
        if let Err(err) = self.notifier.lead_claimed(&lead.id, &actor.id).await {
            log::warn!("Claim notification for {} failed: {}", lead.id, err);
        }
        if let Err(err) = self.notifier.order_created(&order).await {
            log::warn!("Order notification for {} failed: {}", order.id, err);
        }

        Ok(order)
    }
}
