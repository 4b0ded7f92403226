//! Request bodies in the layout the service routes read.

use serde::Serialize;

use itinera_core::{ActivityRef, Budget, GapRequest};

pub const GAP_SCHEDULE_PATH: &str = "/api/generate-gap-schedule";
pub const ACTIVITY_COST_PATH: &str = "/api/estimate-activity-cost";
pub const TRANSPORT_COST_PATH: &str = "/api/calculate-transport-cost";
pub const REBALANCE_PATH: &str = "/api/rebalance-budget";

/// Spending hint for filler activities: 30% of food, 20% of activities and
/// 10% of local transport, rounded.
pub fn gap_budget_hint(budget: &Budget) -> i64 {
    let b = &budget.breakdown;
    let hint = b.food_and_drink_cost as f64 * 0.3
        + b.activities_and_tours_cost as f64 * 0.2
        + b.local_transport_cost as f64 * 0.1;
    hint.round() as i64
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapPayload<'a> {
    #[serde(flatten)]
    pub request: &'a GapRequest,
    pub available_budget: i64,
}

impl<'a> GapPayload<'a> {
    pub fn new(request: &'a GapRequest) -> Self {
        Self {
            request,
            available_budget: gap_budget_hint(&request.budget),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CostPayload<'a> {
    pub destination: &'a str,
    pub activities: &'a [ActivityRef],
    pub people: u32,
}

#[derive(Debug, Serialize)]
pub struct TransportPayload<'a> {
    pub destination: &'a str,
    pub route: &'a [String],
    pub people: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use itinera_core::Breakdown;

    #[test]
    fn hint_weights_local_categories() {
        let budget = Budget::settled(
            Breakdown {
                flight_cost: 900_000,
                food_and_drink_cost: 300_000,
                activities_and_tours_cost: 200_000,
                local_transport_cost: 100_000,
                ..Breakdown::default()
            },
            "KRW",
        );
        assert_eq!(gap_budget_hint(&budget), 90_000 + 40_000 + 10_000);
    }

    #[test]
    fn hint_rounds() {
        let budget = Budget::settled(
            Breakdown {
                food_and_drink_cost: 7,
                activities_and_tours_cost: 3,
                ..Breakdown::default()
            },
            "KRW",
        );
        assert_eq!(gap_budget_hint(&budget), 3);
    }
}
