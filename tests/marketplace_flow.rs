// tests/marketplace_flow.rs
// End-to-end scenarios through the public coordinator surface

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal_macros::dec;

use resale_market::adapter::MarketplaceCoordinator;
use resale_market::config::MarketConfig;
use resale_market::domain::errors::{MarketError, MarketResult};
use resale_market::domain::model::{
    Actor, Agent, GeoPoint, LeadFilter, NewLead, OrderStatus, Role,
};
use resale_market::domain::repository::AgentRepository;
use resale_market::domain::service::PriceEstimationService;
use resale_market::infrastructure::notification::LogNotifier;
use resale_market::infrastructure::persistence::MemoryStore;
use resale_market::infrastructure::pricing::{PercentageClaimPricing, RateCardEstimator};

struct DownEstimator;

#[async_trait]
impl PriceEstimationService for DownEstimator {
    async fn estimate(&self, _device_model: &str, _asking_price: i64) -> MarketResult<i64> {
        Err(MarketError::DependencyUnavailable(
            "estimation service is down".to_string(),
        ))
    }
}

fn market_config() -> MarketConfig {
    MarketConfig {
        claim_fee_rate: dec!(0.10),
        commission_rate: dec!(0.15),
        hot_lead_min_price: 50_000,
        hot_lead_max_age_minutes: 60,
    }
}

fn coordinator(
    store: &Arc<MemoryStore>,
    estimator: Arc<dyn PriceEstimationService>,
) -> MarketplaceCoordinator {
    MarketplaceCoordinator::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(PercentageClaimPricing::new(dec!(0.10))),
        estimator,
        Arc::new(LogNotifier),
        &market_config(),
    )
}

fn rate_card_estimator() -> Arc<RateCardEstimator> {
    let mut card = HashMap::new();
    card.insert("Pixel".to_string(), 60_000);
    Arc::new(RateCardEstimator::new(card, dec!(0.70)))
}

fn lead_request(model: &str, price: i64) -> NewLead {
    NewLead {
        device_model: model.to_string(),
        specs: "128GB".to_string(),
        price,
        location: GeoPoint::new(12.9716, 77.5946),
        locality: "Indiranagar".to_string(),
        customer_name: "Asha".to_string(),
        customer_phone: "9900112233".to_string(),
    }
}

async fn seed_agent(store: &Arc<MemoryStore>, id: &str, balance: i64) {
    store.upsert_agent(Agent::new(id, id, balance)).await.unwrap();
}

fn customer() -> Actor {
    Actor::new("cust-1", Role::Customer)
}

fn agent(id: &str) -> Actor {
    Actor::new(id, Role::Agent)
}

fn admin() -> Actor {
    Actor::new("admin-1", Role::Admin)
}

/// Wait for the background estimation task to land, bounded.
async fn wait_for_estimate(market: &MarketplaceCoordinator, order_id: &str) -> Option<i64> {
    for _ in 0..50 {
        let order = market.get_order(order_id).await.unwrap();
        if order.ai_price.is_some() {
            return order.ai_price;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    None
}

#[tokio::test]
async fn claim_debits_the_fee_and_removes_the_lead() {
    let store = Arc::new(MemoryStore::new());
    let market = coordinator(&store, Arc::new(DownEstimator));
    seed_agent(&store, "agent-1", 10_000).await;

    let lead = market
        .submit_lead(&customer(), lead_request("Galaxy S23", 82_000))
        .await
        .unwrap();
    assert_eq!(lead.claim_cost, 8_200);

    let order = market.claim_lead(&agent("agent-1"), &lead.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Waiting);
    assert_eq!(order.assigned_agent.as_deref(), Some("agent-1"));
    assert_eq!(market.get_agent_balance("agent-1").await.unwrap(), 1_800);

    let pool = market.list_leads(&LeadFilter::default()).await.unwrap();
    assert!(pool.is_empty(), "claimed lead must leave the pool");

    // The statement records the fee against the lead
    let statement = market.get_agent_statement("agent-1").await.unwrap();
    assert_eq!(statement.balance, 1_800);
    assert_eq!(statement.transactions.len(), 1);
    assert_eq!(statement.transactions[0].amount, -8_200);
}

#[tokio::test]
async fn underfunded_claims_change_nothing() {
    let store = Arc::new(MemoryStore::new());
    let market = coordinator(&store, Arc::new(DownEstimator));
    seed_agent(&store, "agent-1", 5_000).await;

    let lead = market
        .submit_lead(&customer(), lead_request("Galaxy S23", 82_000))
        .await
        .unwrap();

    let err = market
        .claim_lead(&agent("agent-1"), &lead.id)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        MarketError::InsufficientCredits {
            required: 8_200,
            available: 5_000
        }
    );
    assert_eq!(market.get_agent_balance("agent-1").await.unwrap(), 5_000);
    let pool = market.list_leads(&LeadFilter::default()).await.unwrap();
    assert_eq!(pool.len(), 1, "lead must remain claimable");
}

#[tokio::test]
async fn second_claim_loses_and_pays_nothing() {
    let store = Arc::new(MemoryStore::new());
    let market = coordinator(&store, Arc::new(DownEstimator));
    seed_agent(&store, "agent-1", 10_000).await;
    seed_agent(&store, "agent-2", 10_000).await;

    let lead = market
        .submit_lead(&customer(), lead_request("Galaxy S23", 82_000))
        .await
        .unwrap();

    market.claim_lead(&agent("agent-1"), &lead.id).await.unwrap();
    let err = market
        .claim_lead(&agent("agent-2"), &lead.id)
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            MarketError::NotFound { .. } | MarketError::AlreadyClaimed(_)
        ),
        "got {err}"
    );
    assert_eq!(market.get_agent_balance("agent-2").await.unwrap(), 10_000);
}

#[tokio::test]
async fn full_walkthrough_locks_the_price() {
    let store = Arc::new(MemoryStore::new());
    let market = coordinator(&store, Arc::new(DownEstimator));
    seed_agent(&store, "agent-1", 10_000).await;

    let lead = market
        .submit_lead(&customer(), lead_request("Galaxy S23", 82_000))
        .await
        .unwrap();
    let order = market.claim_lead(&agent("agent-1"), &lead.id).await.unwrap();

    let actor = agent("agent-1");
    for status in [
        OrderStatus::OutForPickup,
        OrderStatus::Testing,
        OrderStatus::PaymentPending,
    ] {
        market
            .advance_status(&actor, &order.id, status)
            .await
            .unwrap();
    }

    market
        .override_price(&admin(), &order.id, 42_000)
        .await
        .unwrap();
    let completed = market.finalize_payment(&actor, &order.id).await.unwrap();
    assert_eq!(completed.status, OrderStatus::Completed);
    assert_eq!(completed.final_price, Some(42_000));

    let err = market
        .override_price(&admin(), &order.id, 42_500)
        .await
        .unwrap_err();
    assert_eq!(err, MarketError::PriceLocked(order.id.clone()));
    let unchanged = market.get_order(&order.id).await.unwrap();
    assert_eq!(unchanged.final_price, Some(42_000));

    // The completion shows up in the aggregates
    assert_eq!(market.completed_count("agent-1").await.unwrap(), 1);
    // 15% of 42,000
    assert_eq!(market.total_earnings("agent-1").await.unwrap(), 6_300);
    let board = market.get_leaderboard().await.unwrap();
    assert_eq!(board[0].agent_id, "agent-1");
    assert_eq!(board[0].completed, 1);
}

#[tokio::test]
async fn estimator_outage_is_survivable_and_manual_pricing_completes() {
    let store = Arc::new(MemoryStore::new());
    let market = coordinator(&store, Arc::new(DownEstimator));
    seed_agent(&store, "agent-1", 10_000).await;

    let lead = market
        .submit_lead(&customer(), lead_request("Galaxy S23", 82_000))
        .await
        .unwrap();
    let order = market.claim_lead(&agent("agent-1"), &lead.id).await.unwrap();

    // Give the failed estimation task a moment; the order must stay unpriced
    tokio::time::sleep(Duration::from_millis(50)).await;
    let order = market.get_order(&order.id).await.unwrap();
    assert_eq!(order.ai_price, None);

    let actor = agent("agent-1");
    for status in [
        OrderStatus::OutForPickup,
        OrderStatus::Testing,
        OrderStatus::PaymentPending,
    ] {
        market
            .advance_status(&actor, &order.id, status)
            .await
            .unwrap();
    }
    market
        .override_price(&admin(), &order.id, 40_000)
        .await
        .unwrap();
    let completed = market.finalize_payment(&actor, &order.id).await.unwrap();
    assert_eq!(completed.final_price, Some(40_000));
}

#[tokio::test]
async fn estimates_arrive_asynchronously_after_claim() {
    let store = Arc::new(MemoryStore::new());
    let market = coordinator(&store, rate_card_estimator());
    seed_agent(&store, "agent-1", 10_000).await;

    let lead = market
        .submit_lead(&customer(), lead_request("Pixel 8 Pro", 82_000))
        .await
        .unwrap();
    let order = market.claim_lead(&agent("agent-1"), &lead.id).await.unwrap();

    // 70% of the 60,000 rate-card base
    assert_eq!(wait_for_estimate(&market, &order.id).await, Some(42_000));

    // The estimate alone is enough to settle at
    let actor = agent("agent-1");
    for status in [
        OrderStatus::OutForPickup,
        OrderStatus::Testing,
        OrderStatus::PaymentPending,
    ] {
        market
            .advance_status(&actor, &order.id, status)
            .await
            .unwrap();
    }
    let completed = market.finalize_payment(&actor, &order.id).await.unwrap();
    assert_eq!(completed.final_price, Some(42_000));
}

#[tokio::test]
async fn cancellation_keeps_the_fee_until_an_explicit_refund() {
    let store = Arc::new(MemoryStore::new());
    let market = coordinator(&store, Arc::new(DownEstimator));
    seed_agent(&store, "agent-1", 10_000).await;

    let lead = market
        .submit_lead(&customer(), lead_request("Galaxy S23", 82_000))
        .await
        .unwrap();
    let order = market.claim_lead(&agent("agent-1"), &lead.id).await.unwrap();

    market.cancel_order(&admin(), &order.id).await.unwrap();
    assert_eq!(
        market.get_agent_balance("agent-1").await.unwrap(),
        1_800,
        "no automatic refund on cancellation"
    );

    let balance = market.refund_claim_fee(&admin(), &order.id).await.unwrap();
    assert_eq!(balance, 10_000);
    assert!(market.refund_claim_fee(&admin(), &order.id).await.is_err());
}

#[tokio::test]
async fn staff_orders_respect_assignment_rules() {
    use resale_market::domain::model::NewOrder;

    let store = Arc::new(MemoryStore::new());
    let market = coordinator(&store, Arc::new(DownEstimator));
    seed_agent(&store, "agent-1", 0).await;
    seed_agent(&store, "agent-2", 0).await;

    let order = market
        .create_order(
            &admin(),
            NewOrder {
                customer_name: "Walk-in".to_string(),
                customer_phone: "9877777777".to_string(),
                device_model: "iPad Air".to_string(),
                asking_price: 35_000,
                assigned_agent: None,
                notes: "store drop-off".to_string(),
                location: GeoPoint::new(12.93, 77.61),
                locality: "Church Street".to_string(),
            },
        )
        .await
        .unwrap();

    // Nobody assigned yet: the forward path is unavailable
    let err = market
        .advance_status(&agent("agent-1"), &order.id, OrderStatus::OutForPickup)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::Forbidden(_)));

    market
        .reassign_agent(&admin(), &order.id, "agent-1")
        .await
        .unwrap();
    market
        .advance_status(&agent("agent-1"), &order.id, OrderStatus::OutForPickup)
        .await
        .unwrap();

    // Out of Waiting: assignment is frozen
    let err = market
        .reassign_agent(&admin(), &order.id, "agent-2")
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::Validation(_)));
}

#[tokio::test]
async fn top_up_extends_an_agents_reach() {
    let store = Arc::new(MemoryStore::new());
    let market = coordinator(&store, Arc::new(DownEstimator));
    seed_agent(&store, "agent-1", 1_000).await;

    let lead = market
        .submit_lead(&customer(), lead_request("Galaxy S23", 82_000))
        .await
        .unwrap();
    assert!(market.claim_lead(&agent("agent-1"), &lead.id).await.is_err());

    // Agents cannot credit themselves
    let err = market
        .top_up(&agent("agent-1"), "agent-1", 9_000)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::Forbidden(_)));

    assert_eq!(
        market.top_up(&admin(), "agent-1", 9_000).await.unwrap(),
        10_000
    );
    assert!(market.claim_lead(&agent("agent-1"), &lead.id).await.is_ok());
}
