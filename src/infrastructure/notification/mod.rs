// src/infrastructure/notification/mod.rs
// Log-backed notification sink

use async_trait::async_trait;

use crate::domain::errors::MarketResult;
use crate::domain::model::{Order, OrderStatus};
use crate::domain::service::NotificationService;

/// Writes claim and status events to the log. Stands in for the downstream
/// display channel in single-process deployments.
pub struct LogNotifier;

#[async_trait]
impl NotificationService for LogNotifier {
    async fn lead_claimed(&self, lead_id: &str, agent_id: &str) -> MarketResult<()> {
        log::info!("[notify] lead {} claimed by agent {}", lead_id, agent_id);
        Ok(())
    }

    async fn order_created(&self, order: &Order) -> MarketResult<()> {
        log::info!(
            "[notify] order {} created for {} ({})",
            order.id,
            order.customer_name,
            order.device_model
        );
        Ok(())
    }

    async fn status_changed(&self, order: &Order, from: OrderStatus) -> MarketResult<()> {
        log::info!(
            "[notify] order {} moved {} -> {}",
            order.id,
            from,
            order.status
        );
        Ok(())
    }
}
