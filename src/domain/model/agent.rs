// src/domain/model/agent.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::model::lead::GeoPoint;

/// A field agent. The credit balance is written only by the ledger
/// (debit on claim, credit on top-up/rollback/refund) and never goes
/// negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    /// Spendable claim credits in minor units.
    pub balance: i64,
    /// 0 to 5, defaults to 5 for new agents.
    pub rating: Decimal,
    pub completed_jobs: u32,
    pub last_location: Option<GeoPoint>,
    pub version: u64,
}

impl Agent {
    pub fn new(id: impl Into<String>, name: impl Into<String>, balance: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            balance,
            rating: Decimal::from(5),
            completed_jobs: 0,
            last_location: None,
            version: 0,
        }
    }
}
