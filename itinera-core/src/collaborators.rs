//! External collaborators consumed by the engine, and their wire contracts.
//!
//! Each concern is a single async capability returning [`crate::Result`].
//! The engine never learns which fallback inside an implementation produced
//! the answer; an `Err` is simply degraded to a safe default by the caller.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::ClockTime;
use crate::error::Result;
use crate::money::sum_amounts;
use crate::plan::{Budget, Item};

/// Place already used somewhere in the trip, for gap-fill de-duplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceRef {
    pub place: String,
    pub activity: String,
    pub priority_score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapRequest {
    pub destination: String,
    pub gap_start_time: ClockTime,
    pub gap_end_time: ClockTime,
    pub date: NaiveDate,
    pub existing_schedule: Vec<Item>,
    pub all_places: Vec<PlaceRef>,
    pub budget: Budget,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapResponse {
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub total_cost: i64,
}

/// Generates filler items for unscheduled time on the departure day.
#[async_trait]
pub trait GapScheduler: Send + Sync {
    async fn fill_gap(&self, request: &GapRequest) -> Result<GapResponse>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRef {
    pub place: String,
    pub activity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<&Item> for ActivityRef {
    fn from(item: &Item) -> Self {
        Self {
            place: item.place.clone(),
            activity: item.activity.clone(),
            notes: item.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRequest {
    pub destination: String,
    pub activities: Vec<ActivityRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    #[serde(default)]
    pub entrance_fee: i64,
    #[serde(default)]
    pub experience_program: i64,
    #[serde(default)]
    pub food_drink: i64,
    #[serde(default)]
    pub transport: i64,
    #[serde(default)]
    pub other: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCost {
    pub activity_index: usize,
    pub cost: i64,
    #[serde(default)]
    pub breakdown: CostBreakdown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostResponse {
    #[serde(default)]
    pub costs: Vec<ActivityCost>,
}

/// Estimates costs for a batch of items, index-aligned to the request.
#[async_trait]
pub trait CostEstimator: Send + Sync {
    async fn estimate(&self, request: &CostRequest) -> Result<CostResponse>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportRequest {
    pub destination: String,
    /// At least two ordered stops.
    pub route: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportLeg {
    pub from: String,
    pub to: String,
    pub transport: String,
    pub cost: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportResponse {
    pub total_cost: i64,
    #[serde(default)]
    pub breakdown: Vec<TransportLeg>,
}

/// Prices a day's movement between its ordered stops.
#[async_trait]
pub trait TransportCoster: Send + Sync {
    async fn route_cost(&self, request: &TransportRequest) -> Result<TransportResponse>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedistributionRequest {
    pub original_budget: Budget,
    pub real_flight_cost: i64,
    pub real_accommodation_cost: i64,
    #[serde(skip)]
    pub remaining_local_budget: i64,
}

/// The four destination-side categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalSplit {
    pub local_transport_cost: i64,
    pub food_and_drink_cost: i64,
    pub activities_and_tours_cost: i64,
    pub contingency_and_misc: i64,
}

impl LocalSplit {
    pub fn sum(&self) -> i64 {
        sum_amounts([
            self.local_transport_cost,
            self.food_and_drink_cost,
            self.activities_and_tours_cost,
            self.contingency_and_misc,
        ])
    }

    pub fn all_non_negative(&self) -> bool {
        self.local_transport_cost >= 0
            && self.food_and_drink_cost >= 0
            && self.activities_and_tours_cost >= 0
            && self.contingency_and_misc >= 0
    }
}

/// Splits the remaining local budget across the four local categories.
#[async_trait]
pub trait BudgetRedistributor: Send + Sync {
    async fn redistribute(&self, request: &RedistributionRequest) -> Result<LocalSplit>;
}
