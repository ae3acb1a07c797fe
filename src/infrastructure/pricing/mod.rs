// src/infrastructure/pricing/mod.rs
// Claim pricing policy and the local rate-card estimator

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::domain::errors::{MarketError, MarketResult};
use crate::domain::model::Lead;
use crate::domain::service::{ClaimPricing, PriceEstimationService};

/// Flat-percentage claim cost: `floor(price * rate)`.
pub struct PercentageClaimPricing {
    rate: Decimal,
}

impl PercentageClaimPricing {
    pub fn new(rate: Decimal) -> Self {
        Self { rate }
    }
}

impl ClaimPricing for PercentageClaimPricing {
    fn claim_cost(&self, lead: &Lead) -> i64 {
        // Saturates high on a misconfigured rate so a claim can never
        // become free by overflow.
        (Decimal::from(lead.price) * self.rate)
            .floor()
            .to_i64()
            .unwrap_or(i64::MAX)
    }
}

/// Offline stand-in for the estimation service: a rate card of base prices
/// by model prefix, depreciated by a configured factor. Models without a
/// card entry report the service as unavailable, which the lifecycle is
/// required to tolerate.
pub struct RateCardEstimator {
    base_prices: HashMap<String, i64>,
    depreciation: Decimal,
}

impl RateCardEstimator {
    pub fn new(base_prices: HashMap<String, i64>, depreciation: Decimal) -> Self {
        Self {
            base_prices,
            depreciation,
        }
    }
}

#[async_trait]
impl PriceEstimationService for RateCardEstimator {
    async fn estimate(&self, device_model: &str, asking_price: i64) -> MarketResult<i64> {
        let model = device_model.to_lowercase();
        let base = self
            .base_prices
            .iter()
            .filter(|(prefix, _)| model.starts_with(&prefix.to_lowercase()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, base)| *base)
            .ok_or_else(|| {
                MarketError::DependencyUnavailable(format!(
                    "no rate card entry for {}",
                    device_model
                ))
            })?;

        let depreciated = (Decimal::from(base) * self.depreciation)
            .floor()
            .to_i64()
            .unwrap_or(0);
        // An estimate above the customer's ask is pointless for a resale
        // quote; clamp to it.
        Ok(depreciated.min(asking_price).max(1))
    }
}
