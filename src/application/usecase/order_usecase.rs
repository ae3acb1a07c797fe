// src/application/usecase/order_usecase.rs
// Order lifecycle: status progression, cancellation, staff operations

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::domain::errors::{MarketError, MarketResult};
use crate::domain::model::{Actor, NewOrder, Order, OrderStatus, Role, TransactionReason};
use crate::domain::repository::{AgentRepository, LedgerRepository, OrderRepository};
use crate::domain::service::NotificationService;

#[async_trait]
pub trait OrderLifecycleUseCase: Send + Sync {
    /// Reads are unrestricted.
    async fn get_order(&self, order_id: &str) -> MarketResult<Order>;

    /// Move the order one step along its lifecycle. Forward transitions are
    /// reserved for the assigned agent; cancellation also accepts an admin.
    async fn advance_status(
        &self,
        actor: &Actor,
        order_id: &str,
        to: OrderStatus,
    ) -> MarketResult<Order>;

    /// Cancel from any non-terminal state. No automatic refund: the claim
    /// fee stays spent until `refund_claim_fee` is invoked explicitly.
    async fn cancel_order(&self, actor: &Actor, order_id: &str) -> MarketResult<Order>;

    /// Staff-created job, starting at `Waiting`.
    async fn create_order(&self, actor: &Actor, request: NewOrder) -> MarketResult<Order>;

    /// Force-reassign the agent. Legal only while the order is `Waiting`.
    async fn reassign_agent(
        &self,
        actor: &Actor,
        order_id: &str,
        agent_id: &str,
    ) -> MarketResult<Order>;

    /// Append an administrative note.
    async fn add_note(&self, actor: &Actor, order_id: &str, note: &str) -> MarketResult<Order>;

    /// Credit the claim fee of a cancelled claimed order back to its agent.
    /// Once per order; returns the agent's new balance.
    async fn refund_claim_fee(&self, actor: &Actor, order_id: &str) -> MarketResult<i64>;
}

pub struct OrderLifecycle {
    orders: Arc<dyn OrderRepository>,
    agents: Arc<dyn AgentRepository>,
    ledger: Arc<dyn LedgerRepository>,
    notifier: Arc<dyn NotificationService>,
}

impl OrderLifecycle {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        agents: Arc<dyn AgentRepository>,
        ledger: Arc<dyn LedgerRepository>,
        notifier: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            orders,
            agents,
            ledger,
            notifier,
        }
    }

    /// Forward transitions belong to the assigned agent alone.
    fn authorize_forward(&self, actor: &Actor, order: &Order) -> MarketResult<()> {
        actor.require_agent()?;
        match &order.assigned_agent {
            Some(agent_id) if *agent_id == actor.id => Ok(()),
            Some(_) => Err(MarketError::Forbidden(format!(
                "order {} belongs to another agent",
                order.id
            ))),
            None => Err(MarketError::Forbidden(format!(
                "order {} has no assigned agent",
                order.id
            ))),
        }
    }

    /// Cancellation belongs to the assigned agent or any admin.
    fn authorize_cancel(&self, actor: &Actor, order: &Order) -> MarketResult<()> {
        if actor.role == Role::Admin {
            return Ok(());
        }
        self.authorize_forward(actor, order)
    }

    async fn persist_transition(&self, mut order: Order, to: OrderStatus) -> MarketResult<Order> {
        let from = order.status;
        if to == OrderStatus::Completed {
            // Shares the settle guard with finalize_payment so the two
            // public paths cannot disagree.
            order.finalize_payment()?;
        } else {
            order.ensure_can_advance(to)?;
            order.status = to;
        }
        let order = self.orders.update_order(order).await?;

        if order.status == OrderStatus::Completed {
            if let Some(agent_id) = &order.assigned_agent {
                self.agents.record_completion(agent_id).await?;
            }
        }

        log::info!("Order {} moved {} -> {}", order.id, from, order.status);
        if let Err(err) = self.notifier.status_changed(&order, from).await {
            log::warn!("Status notification for {} failed: {}", order.id, err);
        }
        Ok(order)
    }
}

#[async_trait]
impl OrderLifecycleUseCase for OrderLifecycle {
    async fn get_order(&self, order_id: &str) -> MarketResult<Order> {
        self.orders.get_order(order_id).await
    }

    async fn advance_status(
        &self,
        actor: &Actor,
        order_id: &str,
        to: OrderStatus,
    ) -> MarketResult<Order> {
        let order = self.orders.get_order(order_id).await?;
        if to == OrderStatus::Cancelled {
            self.authorize_cancel(actor, &order)?;
        } else {
            self.authorize_forward(actor, &order)?;
        }
        self.persist_transition(order, to).await
    }

    async fn cancel_order(&self, actor: &Actor, order_id: &str) -> MarketResult<Order> {
        let order = self.orders.get_order(order_id).await?;
        self.authorize_cancel(actor, &order)?;
        self.persist_transition(order, OrderStatus::Cancelled).await
    }

    async fn create_order(&self, actor: &Actor, request: NewOrder) -> MarketResult<Order> {
        actor.require_admin()?;
        request.validate()?;
        if let Some(agent_id) = &request.assigned_agent {
            self.agents.get_agent(agent_id).await?;
        }

        let order = self
            .orders
            .insert_order(Order::from_request(request, Utc::now()))
            .await?;
        log::info!(
            "Order {} created by staff {} ({})",
            order.id,
            actor.id,
            order.device_model
        );
        if let Err(err) = self.notifier.order_created(&order).await {
            log::warn!("Order notification for {} failed: {}", order.id, err);
        }
        Ok(order)
    }

    async fn reassign_agent(
        &self,
        actor: &Actor,
        order_id: &str,
        agent_id: &str,
    ) -> MarketResult<Order> {
        actor.require_admin()?;
        let mut order = self.orders.get_order(order_id).await?;
        if order.status != OrderStatus::Waiting {
            return Err(MarketError::Validation(format!(
                "order {} can only be reassigned while {}, current status is {}",
                order.id,
                OrderStatus::Waiting,
                order.status
            )));
        }
        self.agents.get_agent(agent_id).await?;

        let previous = order.assigned_agent.replace(agent_id.to_string());
        let order = self.orders.update_order(order).await?;
        log::info!(
            "Order {} reassigned from {} to {}",
            order.id,
            previous.as_deref().unwrap_or("nobody"),
            agent_id
        );
        Ok(order)
    }

    async fn add_note(&self, actor: &Actor, order_id: &str, note: &str) -> MarketResult<Order> {
        actor.require_admin()?;
        let mut order = self.orders.get_order(order_id).await?;
        if order.status.is_terminal() {
            return Err(MarketError::Validation(format!(
                "order {} is closed, notes are frozen",
                order.id
            )));
        }
        if !order.notes.is_empty() {
            order.notes.push('\n');
        }
        order.notes.push_str(note);
        self.orders.update_order(order).await
    }

    async fn refund_claim_fee(&self, actor: &Actor, order_id: &str) -> MarketResult<i64> {
        actor.require_admin()?;
        let order = self.orders.get_order(order_id).await?;
        if order.status != OrderStatus::Cancelled {
            return Err(MarketError::Validation(format!(
                "only cancelled orders can be refunded, order {} is {}",
                order.id, order.status
            )));
        }
        let (lead_id, agent_id) = match (&order.lead_id, &order.assigned_agent) {
            (Some(lead_id), Some(agent_id)) => (lead_id.clone(), agent_id.clone()),
            _ => {
                return Err(MarketError::Validation(format!(
                    "order {} was not created from a claimed lead",
                    order.id
                )))
            }
        };

        // Only this agent's rows matter: losing claimants leave their own
        // fee/rollback pairs against the same lead.
        let rows: Vec<_> = self
            .ledger
            .find_by_reference(&lead_id)
            .await?
            .into_iter()
            .filter(|row| row.agent_id == agent_id)
            .collect();
        let fee = rows
            .iter()
            .find(|row| row.reason == TransactionReason::ClaimFee)
            .map(|row| -row.amount)
            .ok_or_else(|| {
                MarketError::Validation(format!("no claim fee on record for order {}", order.id))
            })?;
        if rows.iter().any(|row| {
            matches!(
                row.reason,
                TransactionReason::Refund | TransactionReason::ClaimRollback
            )
        }) {
            return Err(MarketError::Validation(format!(
                "claim fee for order {} was already returned",
                order.id
            )));
        }

        let balance = self
            .ledger
            .credit(&agent_id, fee, TransactionReason::Refund, &lead_id)
            .await?;
        log::info!(
            "Refunded claim fee {} to agent {} for cancelled order {}",
            fee,
            agent_id,
            order.id
        );
        Ok(balance)
    }
}
