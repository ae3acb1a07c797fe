// src/application/usecase/stats_usecase.rs
// Agent performance: a read-only projection over the order set

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::dto::{AgentStatement, LeaderboardEntry};
use crate::domain::errors::MarketResult;
use crate::domain::model::{Order, OrderStatus};
use crate::domain::repository::{AgentRepository, LedgerRepository, OrderRepository};

#[async_trait]
pub trait AgentPerformanceUseCase: Send + Sync {
    async fn completed_count(&self, agent_id: &str) -> MarketResult<usize>;

    /// Commission earned over the agent's completed orders, in minor units.
    async fn total_earnings(&self, agent_id: &str) -> MarketResult<i64>;

    /// All agents by completed count descending; ties broken by rating
    /// descending, then agent id ascending.
    async fn leaderboard(&self) -> MarketResult<Vec<LeaderboardEntry>>;

    async fn agent_balance(&self, agent_id: &str) -> MarketResult<i64>;

    async fn agent_statement(&self, agent_id: &str) -> MarketResult<AgentStatement>;
}

pub struct PerformanceAggregator {
    orders: Arc<dyn OrderRepository>,
    agents: Arc<dyn AgentRepository>,
    ledger: Arc<dyn LedgerRepository>,
    commission_rate: Decimal,
}

impl PerformanceAggregator {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        agents: Arc<dyn AgentRepository>,
        ledger: Arc<dyn LedgerRepository>,
        commission_rate: Decimal,
    ) -> Self {
        Self {
            orders,
            agents,
            ledger,
            commission_rate,
        }
    }

    fn commission(&self, final_price: i64) -> i64 {
        (Decimal::from(final_price) * self.commission_rate)
            .floor()
            .to_i64()
            .unwrap_or(0)
    }

    fn is_completed_for(order: &Order, agent_id: &str) -> bool {
        order.status == OrderStatus::Completed
            && order.assigned_agent.as_deref() == Some(agent_id)
    }
}

#[async_trait]
impl AgentPerformanceUseCase for PerformanceAggregator {
    async fn completed_count(&self, agent_id: &str) -> MarketResult<usize> {
        self.agents.get_agent(agent_id).await?;
        let orders = self.orders.orders_for_agent(agent_id).await?;
        Ok(orders
            .iter()
            .filter(|order| Self::is_completed_for(order, agent_id))
            .count())
    }

    async fn total_earnings(&self, agent_id: &str) -> MarketResult<i64> {
        self.agents.get_agent(agent_id).await?;
        let orders = self.orders.orders_for_agent(agent_id).await?;
        Ok(orders
            .iter()
            .filter(|order| Self::is_completed_for(order, agent_id))
            .filter_map(|order| order.final_price)
            .map(|price| self.commission(price))
            .sum())
    }

    async fn leaderboard(&self) -> MarketResult<Vec<LeaderboardEntry>> {
        let orders = self.orders.list_orders().await?;
        let mut completed: HashMap<String, usize> = HashMap::new();
        for order in &orders {
            if order.status == OrderStatus::Completed {
                if let Some(agent_id) = &order.assigned_agent {
                    *completed.entry(agent_id.clone()).or_default() += 1;
                }
            }
        }

        let mut entries: Vec<LeaderboardEntry> = self
            .agents
            .list_agents()
            .await?
            .into_iter()
            .map(|agent| LeaderboardEntry {
                completed: completed.get(&agent.id).copied().unwrap_or(0),
                agent_id: agent.id,
                agent_name: agent.name,
                rating: agent.rating,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.completed
                .cmp(&a.completed)
                .then_with(|| b.rating.cmp(&a.rating))
                .then_with(|| a.agent_id.cmp(&b.agent_id))
        });
        Ok(entries)
    }

    async fn agent_balance(&self, agent_id: &str) -> MarketResult<i64> {
        self.ledger.balance_of(agent_id).await
    }

    async fn agent_statement(&self, agent_id: &str) -> MarketResult<AgentStatement> {
        let balance = self.ledger.balance_of(agent_id).await?;
        let transactions = self.ledger.transactions(agent_id).await?;
        Ok(AgentStatement {
            agent_id: agent_id.to_string(),
            balance,
            transactions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Agent, GeoPoint, Order};
    use crate::domain::repository::OrderRepository;
    use crate::infrastructure::persistence::MemoryStore;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn completed_order(agent_id: &str, final_price: i64) -> Order {
        Order {
            id: String::new(),
            customer_name: "Customer".to_string(),
            customer_phone: "9800000000".to_string(),
            device_model: "Pixel 7a".to_string(),
            assigned_agent: Some(agent_id.to_string()),
            status: OrderStatus::Completed,
            asking_price: final_price,
            ai_price: None,
            final_price: Some(final_price),
            notes: String::new(),
            location: GeoPoint::new(12.97, 77.59),
            locality: "HSR".to_string(),
            lead_id: None,
            created_at: Utc::now(),
            version: 0,
        }
    }

    async fn aggregator(store: &Arc<MemoryStore>) -> PerformanceAggregator {
        PerformanceAggregator::new(
            store.clone(),
            store.clone(),
            store.clone(),
            dec!(0.15),
        )
    }

    async fn seed_agent(store: &MemoryStore, id: &str, rating: Decimal) {
        let mut agent = Agent::new(id, id, 0);
        agent.rating = rating;
        store.upsert_agent(agent).await.unwrap();
    }

    #[tokio::test]
    async fn earnings_floor_commission_per_order() {
        let store = Arc::new(MemoryStore::new());
        seed_agent(&store, "agent-1", dec!(5)).await;
        // 15% of 333 is 49.95, floored to 49 per order
        store
            .insert_order(completed_order("agent-1", 333))
            .await
            .unwrap();
        store
            .insert_order(completed_order("agent-1", 333))
            .await
            .unwrap();

        let stats = aggregator(&store).await;
        assert_eq!(stats.total_earnings("agent-1").await.unwrap(), 98);
        assert_eq!(stats.completed_count("agent-1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn incomplete_and_cancelled_orders_do_not_count() {
        let store = Arc::new(MemoryStore::new());
        seed_agent(&store, "agent-1", dec!(5)).await;
        let mut live = completed_order("agent-1", 40_000);
        live.status = OrderStatus::Testing;
        live.final_price = None;
        store.insert_order(live).await.unwrap();
        let mut cancelled = completed_order("agent-1", 40_000);
        cancelled.status = OrderStatus::Cancelled;
        store.insert_order(cancelled).await.unwrap();

        let stats = aggregator(&store).await;
        assert_eq!(stats.completed_count("agent-1").await.unwrap(), 0);
        assert_eq!(stats.total_earnings("agent-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_agents_fail_not_found() {
        let store = Arc::new(MemoryStore::new());
        let stats = aggregator(&store).await;
        assert!(stats.completed_count("agent-ghost").await.is_err());
        assert!(stats.agent_balance("agent-ghost").await.is_err());
    }

    #[tokio::test]
    async fn leaderboard_breaks_ties_by_rating_then_id() {
        let store = Arc::new(MemoryStore::new());
        seed_agent(&store, "agent-a", dec!(4.5)).await;
        seed_agent(&store, "agent-b", dec!(4.8)).await;
        seed_agent(&store, "agent-c", dec!(4.8)).await;
        seed_agent(&store, "agent-d", dec!(3.0)).await;

        // a, b, c each complete one; d completes two
        for agent_id in ["agent-a", "agent-b", "agent-c"] {
            store
                .insert_order(completed_order(agent_id, 20_000))
                .await
                .unwrap();
        }
        store
            .insert_order(completed_order("agent-d", 20_000))
            .await
            .unwrap();
        store
            .insert_order(completed_order("agent-d", 25_000))
            .await
            .unwrap();

        let board = aggregator(&store).await.leaderboard().await.unwrap();
        let ids: Vec<_> = board.iter().map(|entry| entry.agent_id.as_str()).collect();
        assert_eq!(ids, ["agent-d", "agent-b", "agent-c", "agent-a"]);
        assert_eq!(board[0].completed, 2);
    }
}
