// src/domain/model/lead.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{MarketError, MarketResult};

/// Geographic coordinates with a haversine distance helper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

const EARTH_RADIUS_KM: f64 = 6371.0;

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to `other` in kilometers.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

/// An unclaimed customer sell request, visible to agents in the pool.
///
/// A lead exists only while unclaimed; a successful claim removes it and
/// creates an `Order` in its place. The `version` field is the
/// optimistic-concurrency token checked by the pool's removal path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub device_model: String,
    pub specs: String,
    /// Asking price in minor currency units. Always positive.
    pub price: i64,
    pub location: GeoPoint,
    pub locality: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub posted_at: DateTime<Utc>,
    pub version: u64,
}

impl Lead {
    pub fn new(id: String, request: NewLead, posted_at: DateTime<Utc>) -> Self {
        Self {
            id,
            device_model: request.device_model,
            specs: request.specs,
            price: request.price,
            location: request.location,
            locality: request.locality,
            customer_name: request.customer_name,
            customer_phone: request.customer_phone,
            posted_at,
            version: 0,
        }
    }

    pub fn age_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.posted_at).num_minutes()
    }
}

/// Customer-submitted sell request payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLead {
    pub device_model: String,
    pub specs: String,
    pub price: i64,
    pub location: GeoPoint,
    pub locality: String,
    pub customer_name: String,
    pub customer_phone: String,
}

impl NewLead {
    pub fn validate(&self) -> MarketResult<()> {
        if self.price <= 0 {
            return Err(MarketError::Validation(format!(
                "asking price must be positive, got {}",
                self.price
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

/// Pool browse criteria. Distance filtering needs an origin (the caller's
/// last known location) and passes everything when none is supplied.
#[derive(Debug, Clone, Default)]
pub struct LeadFilter {
    pub brand: Option<String>,
    pub min_price: Option<i64>,
    pub max_distance_km: Option<f64>,
    pub origin: Option<GeoPoint>,
}

impl LeadFilter {
    pub fn matches(&self, lead: &Lead) -> bool {
        if let Some(brand) = &self.brand {
            if !lead
                .device_model
                .to_lowercase()
                .starts_with(&brand.to_lowercase())
            {
                return false;
            }
        }
        if let Some(min_price) = self.min_price {
            if lead.price < min_price {
                return false;
            }
        }
        if let (Some(max_km), Some(origin)) = (self.max_distance_km, self.origin) {
            if origin.distance_km(&lead.location) > max_km {
                return false;
            }
        }
        true
    }
}
