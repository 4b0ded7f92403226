//! itinera-core: trip plan model and budget/itinerary reconciliation

pub mod accommodation;
pub mod cache;
pub mod category;
pub mod clock;
pub mod collaborators;
pub mod daily_cost;
pub mod error;
pub mod invariants;
pub mod money;
pub mod normalizer;
pub mod plan;
pub mod rebalance;
pub mod session;
pub mod transport;
pub mod trimmer;

#[cfg(test)]
mod test_support;

pub use accommodation::{distribute_accommodation, lodging_checkpoint};
pub use cache::EnrichmentCache;
pub use category::{airport_milestone, classify, ItemCategory};
pub use clock::ClockTime;
pub use collaborators::{
    ActivityCost, ActivityRef, BudgetRedistributor, CostBreakdown, CostEstimator, CostRequest,
    CostResponse, GapRequest, GapResponse, GapScheduler, LocalSplit, PlaceRef,
    RedistributionRequest, TransportCoster, TransportLeg, TransportRequest, TransportResponse,
};
pub use daily_cost::{aggregate_day, aggregate_days, daily_cost};
pub use error::{EngineError, Result};
pub use invariants::{check_invariants, Violation};
pub use money::{div_round, round_amount, scale_round, sum_amounts, MAX_AMOUNT};
pub use normalizer::{normalize, normalize_budget, settle};
pub use plan::{
    Breakdown, Budget, BudgetCategory, Day, Item, ItemKey, Milestone, Plan, DEFAULT_PRIORITY,
};
pub use rebalance::{
    absorb_residual, carry_over_split, remaining_local_budget, BudgetRebalancer,
    CarryOverRedistributor, RealCosts, RebalanceOutcome, RebalancePolicy,
};
pub use session::{PlanSession, Reconciler, Snapshot};
pub use transport::refresh_transport;
pub use trimmer::{
    accept_fillers, places_in_use, DayTrim, FlightTimes, GapWindow, TimeWindowTrimmer, TrimPolicy,
    TrimReport,
};
