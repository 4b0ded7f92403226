//! Day-level local-transport lookups.

use tracing::{debug, warn};

use crate::collaborators::{TransportCoster, TransportRequest};
use crate::normalizer::settle;
use crate::plan::Plan;

/// Look up each day's transport cost from its ordered stops, merge every
/// result, then settle the plan. Days with fewer than two stops cost 0, and
/// failed lookups degrade to 0. Lookups are independent of each other.
pub async fn refresh_transport<T: TransportCoster>(coster: &T, plan: &Plan) -> Plan {
    let mut figures = Vec::with_capacity(plan.days.len());
    for day in &plan.days {
        let route = day.route();
        if route.len() < 2 {
            figures.push(0);
            continue;
        }
        let request = TransportRequest {
            destination: plan.destination.clone(),
            route,
        };
        let cost = match coster.route_cost(&request).await {
            Ok(response) => response.total_cost.max(0),
            Err(e) => {
                warn!(date = %day.date, error = %e, "transport lookup failed; using 0");
                0
            }
        };
        debug!(date = %day.date, cost, "transport cost");
        figures.push(cost);
    }

    let mut out = plan.clone();
    for (day, cost) in out.days.iter_mut().zip(figures) {
        day.daily_transport_cost = Some(cost);
    }
    settle(&out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::TransportResponse;
    use crate::error::{EngineError, Result};
    use crate::plan::Item;
    use crate::test_support::{budget_with, plan_of};
    use async_trait::async_trait;

    /// Charges 1500 per leg, but fails for routes starting at "Broken".
    struct PerLeg;

    #[async_trait]
    impl TransportCoster for PerLeg {
        async fn route_cost(&self, request: &TransportRequest) -> Result<TransportResponse> {
            if request.route[0] == "Broken" {
                return Err(EngineError::collaborator("timeout"));
            }
            Ok(TransportResponse {
                total_cost: 1500 * (request.route.len() as i64 - 1),
                breakdown: vec![],
            })
        }
    }

    #[tokio::test]
    async fn merges_per_day_results_and_settles() {
        let plan = plan_of(
            vec![
                vec![
                    Item::new("09:00", "A", "x"),
                    Item::new("11:00", "B", "y"),
                    Item::new("13:00", "C", "z"),
                ],
                vec![Item::new("09:00", "Solo", "only stop"), Item::new("10:00", "", "rest")],
                vec![Item::new("09:00", "Broken", "x"), Item::new("10:00", "D", "y")],
            ],
            budget_with(|_| {}),
        );

        let out = refresh_transport(&PerLeg, &plan).await;
        assert_eq!(out.days[0].daily_transport_cost, Some(3000));
        assert_eq!(out.days[1].daily_transport_cost, Some(0));
        assert_eq!(out.days[2].daily_transport_cost, Some(0));
        assert_eq!(out.days[0].daily_estimated_cost, 3000);
        assert_eq!(out.estimated_budget.breakdown.local_transport_cost, 3000);
        assert!(out.estimated_budget.is_settled());
    }
}
