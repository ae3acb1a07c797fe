// src/application/usecase/lead_usecase.rs
// Lead pool: browsing and customer intake

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::application::dto::{FreshnessPolicy, LeadView};
use crate::domain::errors::{MarketError, MarketResult};
use crate::domain::model::{Actor, Lead, LeadFilter, NewLead, Role};
use crate::domain::repository::LeadRepository;
use crate::domain::service::ClaimPricing;

#[async_trait]
pub trait LeadBrowsingUseCase: Send + Sync {
    /// Unclaimed leads matching `filter`, most recent first.
    async fn list_leads(&self, filter: &LeadFilter) -> MarketResult<Vec<LeadView>>;

    /// Customer sell request intake.
    async fn submit_lead(&self, actor: &Actor, request: NewLead) -> MarketResult<LeadView>;
}

pub struct LeadPool {
    leads: Arc<dyn LeadRepository>,
    pricing: Arc<dyn ClaimPricing>,
    freshness: FreshnessPolicy,
}

impl LeadPool {
    pub fn new(
        leads: Arc<dyn LeadRepository>,
        pricing: Arc<dyn ClaimPricing>,
        freshness: FreshnessPolicy,
    ) -> Self {
        Self {
            leads,
            pricing,
            freshness,
        }
    }

    fn view(&self, lead: &Lead, filter: &LeadFilter) -> LeadView {
        let now = Utc::now();
        LeadView::build(
            lead,
            self.pricing.claim_cost(lead),
            self.freshness.badge(lead, now),
            filter.origin,
        )
    }
}

#[async_trait]
impl LeadBrowsingUseCase for LeadPool {
    async fn list_leads(&self, filter: &LeadFilter) -> MarketResult<Vec<LeadView>> {
        let mut leads = self.leads.list_leads().await?;
        leads.retain(|lead| filter.matches(lead));
        leads.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
        Ok(leads.iter().map(|lead| self.view(lead, filter)).collect())
    }

    async fn submit_lead(&self, actor: &Actor, request: NewLead) -> MarketResult<LeadView> {
        match actor.role {
            Role::Customer | Role::Admin => {}
            Role::Agent => {
                return Err(MarketError::Forbidden(
                    "agents cannot submit sell requests".to_string(),
                ))
            }
        }
        request.validate()?;

        let lead = self.leads.insert_lead(request).await?;
        log::info!(
            "New lead {} ({}, asking {}) posted in {}",
            lead.id,
            lead.device_model,
            lead.price,
            lead.locality
        );
        Ok(self.view(&lead, &LeadFilter::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::GeoPoint;
    use crate::infrastructure::persistence::MemoryStore;
    use crate::infrastructure::pricing::PercentageClaimPricing;
    use rust_decimal_macros::dec;

    fn pool() -> (LeadPool, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let pool = LeadPool::new(
            store.clone(),
            Arc::new(PercentageClaimPricing::new(dec!(0.10))),
            FreshnessPolicy {
                hot_max_age_minutes: 60,
                hot_min_price: 50_000,
            },
        );
        (pool, store)
    }

    fn request(model: &str, price: i64) -> NewLead {
        NewLead {
            device_model: model.to_string(),
            specs: "128GB".to_string(),
            price,
            location: GeoPoint::new(12.97, 77.59),
            locality: "Koramangala".to_string(),
            customer_name: "Meera".to_string(),
            customer_phone: "9822222222".to_string(),
        }
    }

    fn customer() -> Actor {
        Actor::new("cust-1", Role::Customer)
    }

    #[tokio::test]
    async fn lists_newest_first_with_computed_claim_cost() {
        let (pool, _store) = pool();
        pool.submit_lead(&customer(), request("iPhone 13", 60_000))
            .await
            .unwrap();
        pool.submit_lead(&customer(), request("Pixel 8", 82_000))
            .await
            .unwrap();

        let views = pool.list_leads(&LeadFilter::default()).await.unwrap();
        assert_eq!(views.len(), 2);
        assert!(views[0].posted_at >= views[1].posted_at);
        let pixel = views.iter().find(|v| v.device_model == "Pixel 8").unwrap();
        assert_eq!(pixel.claim_cost, 8_200);
    }

    #[tokio::test]
    async fn filters_by_brand() {
        let (pool, _store) = pool();
        pool.submit_lead(&customer(), request("iPhone 13", 60_000))
            .await
            .unwrap();
        pool.submit_lead(&customer(), request("Pixel 8", 82_000))
            .await
            .unwrap();

        let filter = LeadFilter {
            brand: Some("pixel".to_string()),
            ..Default::default()
        };
        let views = pool.list_leads(&filter).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].device_model, "Pixel 8");
    }

    #[tokio::test]
    async fn agents_may_not_submit() {
        let (pool, _store) = pool();
        let err = pool
            .submit_lead(&Actor::new("agent-1", Role::Agent), request("iPhone 13", 60_000))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Forbidden(_)));
    }

    #[tokio::test]
    async fn rejects_invalid_requests() {
        let (pool, _store) = pool();
        let err = pool
            .submit_lead(&customer(), request("iPhone 13", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Validation(_)));
    }
}
