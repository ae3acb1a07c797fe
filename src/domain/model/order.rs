// src/domain/model/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::errors::{MarketError, MarketResult};
use crate::domain::model::lead::{GeoPoint, Lead};

/// Order lifecycle states.
///
/// `Waiting` is initial; `Completed` and `Cancelled` are terminal. Forward
/// progression is strictly one step at a time; `Cancelled` is reachable from
/// any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Waiting,
    OutForPickup,
    Testing,
    PaymentPending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// The next state on the forward path, if any.
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Waiting => Some(OrderStatus::OutForPickup),
            OrderStatus::OutForPickup => Some(OrderStatus::Testing),
            OrderStatus::Testing => Some(OrderStatus::PaymentPending),
            OrderStatus::PaymentPending => Some(OrderStatus::Completed),
            OrderStatus::Completed | OrderStatus::Cancelled => None,
        }
    }

    /// Whether `to` is a legal transition target from this state,
    /// independent of who is asking.
    pub fn can_advance_to(&self, to: OrderStatus) -> bool {
        if to == OrderStatus::Cancelled {
            return !self.is_terminal();
        }
        self.next() == Some(to)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OrderStatus::Waiting => write!(f, "WAITING"),
            OrderStatus::OutForPickup => write!(f, "OUT_FOR_PICKUP"),
            OrderStatus::Testing => write!(f, "TESTING"),
            OrderStatus::PaymentPending => write!(f, "PAYMENT_PENDING"),
            OrderStatus::Completed => write!(f, "COMPLETED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Caller role as supplied by the identity collaborator. The core trusts
/// this input and performs no authentication itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Customer,
    Agent,
    Admin,
}

/// The authenticated caller of a core operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn require_admin(&self) -> MarketResult<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(MarketError::Forbidden(
                "administrator role required".to_string(),
            ))
        }
    }

    pub fn require_agent(&self) -> MarketResult<()> {
        if self.role == Role::Agent {
            Ok(())
        } else {
            Err(MarketError::Forbidden("agent role required".to_string()))
        }
    }
}

/// A claimed or staff-created unit of work, tracked from pickup to payment.
///
/// Orders are never deleted; cancellation is a terminal status, not removal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Human-readable code, e.g. `ORD-000042`.
    pub id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub device_model: String,
    /// None until claimed or assigned by staff. Immutable once the status
    /// leaves `Waiting`.
    pub assigned_agent: Option<String>,
    pub status: OrderStatus,
    /// Customer's asking price, carried over from the lead.
    pub asking_price: i64,
    /// Estimate recorded by the pricing collaborator. May stay None if the
    /// service is unavailable; the lifecycle proceeds regardless.
    pub ai_price: Option<i64>,
    /// Immutable once the order is Completed.
    pub final_price: Option<i64>,
    pub notes: String,
    pub location: GeoPoint,
    pub locality: String,
    /// Pool lead this order was claimed from. None for staff-created jobs.
    pub lead_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub version: u64,
}

impl Order {
    /// Convert a just-claimed lead into its order.
    pub fn from_lead(lead: &Lead, agent_id: String, now: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            customer_name: lead.customer_name.clone(),
            customer_phone: lead.customer_phone.clone(),
            device_model: lead.device_model.clone(),
            assigned_agent: Some(agent_id),
            status: OrderStatus::Waiting,
            asking_price: lead.price,
            ai_price: None,
            final_price: None,
            notes: String::new(),
            location: lead.location,
            locality: lead.locality.clone(),
            lead_id: Some(lead.id.clone()),
            created_at: now,
            version: 0,
        }
    }

    pub fn from_request(request: NewOrder, now: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            customer_name: request.customer_name,
            customer_phone: request.customer_phone,
            device_model: request.device_model,
            assigned_agent: request.assigned_agent,
            status: OrderStatus::Waiting,
            asking_price: request.asking_price,
            ai_price: None,
            final_price: None,
            notes: request.notes,
            location: request.location,
            locality: request.locality,
            lead_id: None,
            created_at: now,
            version: 0,
        }
    }

    /// The price a payment would settle at: the admin override when present,
    /// otherwise the recorded estimate.
    pub fn effective_price(&self) -> Option<i64> {
        self.final_price.or(self.ai_price)
    }

    pub fn ensure_can_advance(&self, to: OrderStatus) -> MarketResult<()> {
        if self.status.can_advance_to(to) {
            Ok(())
        } else {
            Err(MarketError::InvalidTransition {
                from: self.status,
                to,
            })
        }
    }

    /// Settle the order: requires `PaymentPending` and a known price.
    /// Freezes `final_price` and moves to `Completed`.
    pub fn finalize_payment(&mut self) -> MarketResult<()> {
        self.ensure_can_advance(OrderStatus::Completed)?;
        let price = self.effective_price().ok_or_else(|| {
            MarketError::Validation(format!("order {} has no price to settle at", self.id))
        })?;
        self.final_price = Some(price);
        self.status = OrderStatus::Completed;
        Ok(())
    }
}

/// Staff-created job payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_phone: String,
    pub device_model: String,
    pub asking_price: i64,
    pub assigned_agent: Option<String>,
    pub notes: String,
    pub location: GeoPoint,
    pub locality: String,
}

impl NewOrder {
    pub fn validate(&self) -> MarketResult<()> {
        if self.asking_price <= 0 {
            return Err(MarketError::Validation(format!(
                "asking price must be positive, got {}",
                self.asking_price
            )));
        }
        if self.device_model.trim().is_empty() {
            return Err(MarketError::Validation("device model is required".to_string()));
        }
        if self.customer_name.trim().is_empty() {
            return Err(MarketError::Validation("customer name is required".to_string()));
        }
        Ok(())
    }
}
