// src/adapter/coordinator.rs
// Marketplace coordinator: composes the use cases behind one surface

use std::sync::Arc;

use crate::application::dto::{
    AgentStatement, FreshnessPolicy, LeadView, LeaderboardEntry, OrderView,
};
use crate::application::usecase::{
    AgentPerformanceUseCase, ClaimCoordinator, ClaimLeadUseCase, LeadBrowsingUseCase, LeadPool,
    OrderLifecycle, OrderLifecycleUseCase, PerformanceAggregator, PriceAuthority,
    PriceAuthorityUseCase,
};
use crate::config::MarketConfig;
use crate::domain::errors::{MarketError, MarketResult};
use crate::domain::model::{
    Actor, LeadFilter, NewLead, NewOrder, Order, OrderStatus, TransactionReason,
};
use crate::domain::repository::{
    AgentRepository, LeadRepository, LedgerRepository, OrderRepository,
};
use crate::domain::service::{ClaimPricing, NotificationService, PriceEstimationService};

/// The transport-facing entry point. Hosts mount their HTTP/RPC layer on
/// top of this; everything below it is the core.
pub struct MarketplaceCoordinator {
    lead_pool: Arc<dyn LeadBrowsingUseCase>,
    claims: Arc<dyn ClaimLeadUseCase>,
    lifecycle: Arc<dyn OrderLifecycleUseCase>,
    price_authority: Arc<dyn PriceAuthorityUseCase>,
    stats: Arc<dyn AgentPerformanceUseCase>,
    ledger: Arc<dyn LedgerRepository>,
    estimator: Arc<dyn PriceEstimationService>,
}

impl MarketplaceCoordinator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        leads: Arc<dyn LeadRepository>,
        orders: Arc<dyn OrderRepository>,
        agents: Arc<dyn AgentRepository>,
        ledger: Arc<dyn LedgerRepository>,
        claim_pricing: Arc<dyn ClaimPricing>,
        estimator: Arc<dyn PriceEstimationService>,
        notifier: Arc<dyn NotificationService>,
        config: &MarketConfig,
    ) -> Self {
        let freshness = FreshnessPolicy {
            hot_max_age_minutes: config.hot_lead_max_age_minutes,
            hot_min_price: config.hot_lead_min_price,
        };
        let lead_pool = Arc::new(LeadPool::new(
            leads.clone(),
            claim_pricing.clone(),
            freshness,
        ));
        let claims = Arc::new(ClaimCoordinator::new(
            leads,
            orders.clone(),
            ledger.clone(),
            claim_pricing,
            notifier.clone(),
        ));
        let lifecycle = Arc::new(OrderLifecycle::new(
            orders.clone(),
            agents.clone(),
            ledger.clone(),
            notifier.clone(),
        ));
        let price_authority = Arc::new(PriceAuthority::new(
            orders.clone(),
            agents.clone(),
            notifier,
        ));
        let stats = Arc::new(PerformanceAggregator::new(
            orders,
            agents,
            ledger.clone(),
            config.commission_rate,
        ));
        Self {
            lead_pool,
            claims,
            lifecycle,
            price_authority,
            stats,
            ledger,
            estimator,
        }
    }

    /// Kick off the estimation callback for a fresh order. The collaborator
    /// is slow and optional, so this never blocks or fails the caller.
    fn spawn_estimate(&self, order: &Order) {
        let estimator = self.estimator.clone();
        let authority = self.price_authority.clone();
        let order_id = order.id.clone();
        let device_model = order.device_model.clone();
        let asking_price = order.asking_price;

        tokio::spawn(async move {
            match estimator.estimate(&device_model, asking_price).await {
                Ok(price) => {
                    if let Err(err) = authority.record_ai_estimate(&order_id, price).await {
                        log::warn!("Could not record estimate for {}: {}", order_id, err);
                    }
                }
                Err(err) => {
                    log::warn!(
                        "Price estimation unavailable for {} ({}): {}",
                        order_id,
                        device_model,
                        err
                    );
                }
            }
        });
    }

    // --- Lead pool ---

    pub async fn list_leads(&self, filter: &LeadFilter) -> MarketResult<Vec<LeadView>> {
        self.lead_pool.list_leads(filter).await
    }

    pub async fn submit_lead(&self, actor: &Actor, request: NewLead) -> MarketResult<LeadView> {
        self.lead_pool.submit_lead(actor, request).await
    }

    // --- Claims ---

    pub async fn claim_lead(&self, actor: &Actor, lead_id: &str) -> MarketResult<OrderView> {
        let order = self.claims.claim_lead(actor, lead_id).await?;
        self.spawn_estimate(&order);
        Ok(order.into())
    }

    // --- Order lifecycle ---

    pub async fn get_order(&self, order_id: &str) -> MarketResult<OrderView> {
        Ok(self.lifecycle.get_order(order_id).await?.into())
    }

    pub async fn advance_status(
        &self,
        actor: &Actor,
        order_id: &str,
        to: OrderStatus,
    ) -> MarketResult<OrderView> {
        Ok(self.lifecycle.advance_status(actor, order_id, to).await?.into())
    }

    pub async fn cancel_order(&self, actor: &Actor, order_id: &str) -> MarketResult<OrderView> {
        Ok(self.lifecycle.cancel_order(actor, order_id).await?.into())
    }

    pub async fn create_order(&self, actor: &Actor, request: NewOrder) -> MarketResult<OrderView> {
        let order = self.lifecycle.create_order(actor, request).await?;
        self.spawn_estimate(&order);
        Ok(order.into())
    }

    pub async fn reassign_agent(
        &self,
        actor: &Actor,
        order_id: &str,
        agent_id: &str,
    ) -> MarketResult<OrderView> {
        Ok(self
            .lifecycle
            .reassign_agent(actor, order_id, agent_id)
            .await?
            .into())
    }

    pub async fn add_note(
        &self,
        actor: &Actor,
        order_id: &str,
        note: &str,
    ) -> MarketResult<OrderView> {
        Ok(self.lifecycle.add_note(actor, order_id, note).await?.into())
    }

    pub async fn refund_claim_fee(&self, actor: &Actor, order_id: &str) -> MarketResult<i64> {
        self.lifecycle.refund_claim_fee(actor, order_id).await
    }

    // --- Price authority ---

    pub async fn override_price(
        &self,
        actor: &Actor,
        order_id: &str,
        price: i64,
    ) -> MarketResult<OrderView> {
        Ok(self
            .price_authority
            .override_price(actor, order_id, price)
            .await?
            .into())
    }

    pub async fn finalize_payment(&self, actor: &Actor, order_id: &str) -> MarketResult<OrderView> {
        Ok(self
            .price_authority
            .finalize_payment(actor, order_id)
            .await?
            .into())
    }

    // --- Performance & ledger reads ---

    pub async fn get_leaderboard(&self) -> MarketResult<Vec<LeaderboardEntry>> {
        self.stats.leaderboard().await
    }

    pub async fn completed_count(&self, agent_id: &str) -> MarketResult<usize> {
        self.stats.completed_count(agent_id).await
    }

    pub async fn total_earnings(&self, agent_id: &str) -> MarketResult<i64> {
        self.stats.total_earnings(agent_id).await
    }

    pub async fn get_agent_balance(&self, agent_id: &str) -> MarketResult<i64> {
        self.stats.agent_balance(agent_id).await
    }

    pub async fn get_agent_statement(&self, agent_id: &str) -> MarketResult<AgentStatement> {
        self.stats.agent_statement(agent_id).await
    }

    /// Entry point for the external top-up flow.
    pub async fn top_up(&self, actor: &Actor, agent_id: &str, amount: i64) -> MarketResult<i64> {
        actor.require_admin()?;
        if amount <= 0 {
            return Err(MarketError::Validation(format!(
                "top-up amount must be positive, got {}",
                amount
            )));
        }
        self.ledger
            .credit(agent_id, amount, TransactionReason::TopUp, "top-up")
            .await
    }
}
