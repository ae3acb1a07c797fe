// src/application/usecase/mod.rs
pub mod claim_usecase;
pub mod lead_usecase;
pub mod order_usecase;
pub mod pricing_usecase;
pub mod stats_usecase;

// Re-export public API
pub use claim_usecase::{ClaimCoordinator, ClaimLeadUseCase};
pub use lead_usecase::{LeadBrowsingUseCase, LeadPool};
pub use order_usecase::{OrderLifecycle, OrderLifecycleUseCase};
pub use pricing_usecase::{PriceAuthority, PriceAuthorityUseCase};
pub use stats_usecase::{AgentPerformanceUseCase, PerformanceAggregator};
