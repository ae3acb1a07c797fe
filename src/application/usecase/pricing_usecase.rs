// src/application/usecase/pricing_usecase.rs
// Price authority: estimate intake, admin override, payment finalization

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::errors::{MarketError, MarketResult};
use crate::domain::model::{Actor, Order, OrderStatus};
use crate::domain::repository::{AgentRepository, OrderRepository};
use crate::domain::service::NotificationService;

#[async_trait]
pub trait PriceAuthorityUseCase: Send + Sync {
    /// Record the estimation collaborator's callback. The estimate is
    /// advisory: a late or conflicting arrival is dropped with a warning so
    /// the collaborator can never block lifecycle progress.
    async fn record_ai_estimate(&self, order_id: &str, price: i64) -> MarketResult<()>;

    /// Admin price override. Legal in any non-terminal state; re-applying
    /// the same price is a no-op, terminal orders fail `PriceLocked`.
    async fn override_price(&self, actor: &Actor, order_id: &str, price: i64)
        -> MarketResult<Order>;

    /// Settle the order at its effective price and complete it. Requires
    /// `PaymentPending` and a known price; the price freezes here.
    async fn finalize_payment(&self, actor: &Actor, order_id: &str) -> MarketResult<Order>;
}

pub struct PriceAuthority {
    orders: Arc<dyn OrderRepository>,
    agents: Arc<dyn AgentRepository>,
    notifier: Arc<dyn NotificationService>,
}

impl PriceAuthority {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        agents: Arc<dyn AgentRepository>,
        notifier: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            orders,
            agents,
            notifier,
        }
    }
}

#[async_trait]
impl PriceAuthorityUseCase for PriceAuthority {
    async fn record_ai_estimate(&self, order_id: &str, price: i64) -> MarketResult<()> {
        if price <= 0 {
            return Err(MarketError::Validation(format!(
                "estimate must be positive, got {}",
                price
            )));
        }
        let mut order = self.orders.get_order(order_id).await?;
        if order.status != OrderStatus::Waiting {
            log::warn!(
                "Dropping late estimate {} for order {} in status {}",
                price,
                order.id,
                order.status
            );
            return Ok(());
        }
        match order.ai_price {
            Some(existing) if existing == price => Ok(()),
            Some(existing) => {
                log::warn!(
                    "Dropping conflicting estimate {} for order {} (recorded {})",
                    price,
                    order.id,
                    existing
                );
                Ok(())
            }
            None => {
                order.ai_price = Some(price);
                let order = self.orders.update_order(order).await?;
                log::info!("Recorded estimate {} for order {}", price, order.id);
                Ok(())
            }
        }
    }

    async fn override_price(
        &self,
        actor: &Actor,
        order_id: &str,
        price: i64,
    ) -> MarketResult<Order> {
        actor.require_admin()?;
        if price <= 0 {
            return Err(MarketError::Validation(format!(
                "price must be positive, got {}",
                price
            )));
        }
        let mut order = self.orders.get_order(order_id).await?;
        if order.status.is_terminal() {
            return Err(MarketError::PriceLocked(order.id));
        }
        if order.final_price == Some(price) {
            return Ok(order);
        }

        order.final_price = Some(price);
        let order = self.orders.update_order(order).await?;
        log::info!(
            "Admin {} set price {} on order {}",
            actor.id,
            price,
            order.id
        );
        Ok(order)
    }

    async fn finalize_payment(&self, actor: &Actor, order_id: &str) -> MarketResult<Order> {
        actor.require_agent()?;
        let mut order = self.orders.get_order(order_id).await?;
        if order.assigned_agent.as_deref() != Some(actor.id.as_str()) {
            return Err(MarketError::Forbidden(format!(
                "order {} belongs to another agent",
                order.id
            )));
        }

        let from = order.status;
        order.finalize_payment()?;
        let order = self.orders.update_order(order).await?;
        if let Some(agent_id) = &order.assigned_agent {
            self.agents.record_completion(agent_id).await?;
        }

        log::info!(
            "Order {} completed at {} by agent {}",
            order.id,
            order.final_price.unwrap_or_default(),
            actor.id
        );
        if let Err(err) = self.notifier.status_changed(&order, from).await {
            log::warn!("Status notification for {} failed: {}", order.id, err);
        }
        Ok(order)
    }
}
