// src/domain/service/mod.rs
// Domain service interfaces

use async_trait::async_trait;

use crate::domain::errors::MarketResult;
use crate::domain::model::{Lead, Order, OrderStatus};

/// Policy computing what a claim costs. The flat percentage in use today is
/// a placeholder business rule, so the computation is pluggable rather than
/// a constant.
pub trait ClaimPricing: Send + Sync {
    fn claim_cost(&self, lead: &Lead) -> i64;
}

/// Opaque price-estimation collaborator, invoked once per new order. Its
/// unavailability must never block lifecycle progress.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceEstimationService: Send + Sync {
    async fn estimate(&self, device_model: &str, asking_price: i64) -> MarketResult<i64>;
}

/// Downstream display notifications. Fire-and-forget: failures are logged
/// by the caller and never roll back the operation that produced them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn lead_claimed(&self, lead_id: &str, agent_id: &str) -> MarketResult<()>;

    async fn order_created(&self, order: &Order) -> MarketResult<()>;

    async fn status_changed(&self, order: &Order, from: OrderStatus) -> MarketResult<()>;
}
