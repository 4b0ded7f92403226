//! Budget normalization and the settle pipeline.

use tracing::{debug, warn};

use crate::accommodation::distribute_accommodation;
use crate::category::{classify, ItemCategory};
use crate::daily_cost::aggregate_days;
use crate::money::sum_amounts;
use crate::plan::{Breakdown, Budget, Plan};

/// Recompute the six-category breakdown from the plan's items and days.
///
/// Flight, accommodation and contingency carry over unchanged; local transport
/// is the sum of day-level transport; food and activities are the sums of the
/// classified item costs. The total is the exact sum of all six.
pub fn normalize_budget(plan: &Plan) -> Budget {
    let previous = &plan.estimated_budget;

    let mut food = 0i64;
    let mut activities = 0i64;
    for day in &plan.days {
        for item in &day.items {
            match classify(item) {
                ItemCategory::FoodAndDrink => food = food.saturating_add(item.cost_or_zero()),
                ItemCategory::Activities => activities = activities.saturating_add(item.cost_or_zero()),
                ItemCategory::Lodging => {}
            }
        }
    }
    let transport = sum_amounts(plan.days.iter().map(|d| d.transport_cost()));

    let breakdown = Breakdown {
        flight_cost: previous.breakdown.flight_cost,
        accommodation_cost: previous.breakdown.accommodation_cost,
        local_transport_cost: transport,
        food_and_drink_cost: food,
        activities_and_tours_cost: activities,
        contingency_and_misc: previous.breakdown.contingency_and_misc,
    };
    let budget = Budget::settled(breakdown, previous.currency.clone());

    if !previous.is_settled() {
        warn!(
            plan_id = %plan.plan_id,
            reported_total = previous.total_amount,
            breakdown_sum = previous.breakdown.sum(),
            "incoming budget total disagreed with its breakdown; recomputed"
        );
    }
    debug!(plan_id = %plan.plan_id, total = budget.total_amount, "budget normalized");
    budget
}

/// Copy of `plan` carrying the normalized budget.
pub fn normalize(plan: &Plan) -> Plan {
    let mut out = plan.clone();
    out.estimated_budget = normalize_budget(plan);
    out
}

/// Run the automatic pipeline: distribute lodging, aggregate each day,
/// normalize the budget. The result is a settled plan; idempotent.
pub fn settle(plan: &Plan) -> Plan {
    let distributed = distribute_accommodation(plan);
    let aggregated = aggregate_days(&distributed);
    normalize(&aggregated)
}
