// src/application/dto/mod.rs
// Read-side views returned by the use cases

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::model::{CreditTransaction, GeoPoint, Lead, Order, OrderStatus};

/// Derived lead badge. Computed from age and price at read time, never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Freshness {
    Hot,
    Fresh,
    Standard,
}

/// Thresholds for the freshness badge, taken from `MarketConfig`.
#[derive(Debug, Clone, Copy)]
pub struct FreshnessPolicy {
    pub hot_max_age_minutes: i64,
    pub hot_min_price: i64,
}

impl FreshnessPolicy {
    pub fn badge(&self, lead: &Lead, now: DateTime<Utc>) -> Freshness {
        let age = lead.age_minutes(now);
        if age <= self.hot_max_age_minutes && lead.price >= self.hot_min_price {
            Freshness::Hot
        } else if age <= 24 * 60 {
            Freshness::Fresh
        } else {
            Freshness::Standard
        }
    }
}

/// A pool lead as agents browse it: claim cost and badge are computed per
/// request so price edits can never leave them stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadView {
    pub id: String,
    pub device_model: String,
    pub specs: String,
    pub price: i64,
    pub claim_cost: i64,
    pub locality: String,
    pub location: GeoPoint,
    pub posted_at: DateTime<Utc>,
    pub freshness: Freshness,
    /// Distance from the browsing agent, when their location is known.
    pub distance_km: Option<f64>,
}

impl LeadView {
    pub fn build(
        lead: &Lead,
        claim_cost: i64,
        freshness: Freshness,
        origin: Option<GeoPoint>,
    ) -> Self {
        Self {
            id: lead.id.clone(),
            device_model: lead.device_model.clone(),
            specs: lead.specs.clone(),
            price: lead.price,
            claim_cost,
            locality: lead.locality.clone(),
            location: lead.location,
            posted_at: lead.posted_at,
            freshness,
            distance_km: origin.map(|o| o.distance_km(&lead.location)),
        }
    }
}

/// An order as returned by the public surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderView {
    pub id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub device_model: String,
    pub assigned_agent: Option<String>,
    pub status: OrderStatus,
    pub asking_price: i64,
    pub ai_price: Option<i64>,
    pub final_price: Option<i64>,
    pub notes: String,
    pub locality: String,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            customer_name: order.customer_name,
            customer_phone: order.customer_phone,
            device_model: order.device_model,
            assigned_agent: order.assigned_agent,
            status: order.status,
            asking_price: order.asking_price,
            ai_price: order.ai_price,
            final_price: order.final_price,
            notes: order.notes,
            locality: order.locality,
            created_at: order.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub agent_id: String,
    pub agent_name: String,
    pub completed: usize,
    pub rating: Decimal,
}

/// Balance plus the audit trail behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStatement {
    pub agent_id: String,
    pub balance: i64,
    pub transactions: Vec<CreditTransaction>,
}
