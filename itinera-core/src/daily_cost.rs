//! Per-day cost aggregation.

use crate::money::sum_amounts;
use crate::plan::{Day, Plan};

/// Item costs plus the day's local-transport figure, added once. Transport is
/// never folded into an item's cost.
pub fn daily_cost(day: &Day) -> i64 {
    sum_amounts(day.items.iter().map(|i| i.cost_or_zero())).saturating_add(day.transport_cost())
}

/// Copy of `day` with `daily_estimated_cost` recomputed.
pub fn aggregate_day(day: &Day) -> Day {
    let mut out = day.clone();
    out.daily_estimated_cost = daily_cost(day);
    out
}

/// Recompute every day's cost.
pub fn aggregate_days(plan: &Plan) -> Plan {
    let mut out = plan.clone();
    for day in out.days.iter_mut() {
        day.daily_estimated_cost = daily_cost(day);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Item;
    use chrono::NaiveDate;

    #[test]
    fn adds_transport_once_and_treats_missing_cost_as_zero() {
        let day = Day::new(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap())
            .with_items(vec![
                Item::new("09:00", "a", "museum").with_cost(12000),
                Item::new("12:00", "b", "lunch").with_cost(15000),
                Item::new("15:00", "c", "walk"),
            ])
            .with_transport_cost(4500);
        let out = aggregate_day(&day);
        assert_eq!(out.daily_estimated_cost, 31500);
        assert_eq!(out.items, day.items);
    }

    #[test]
    fn stale_daily_figure_is_overwritten() {
        let mut day = Day::new(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap())
            .with_items(vec![Item::new("09:00", "a", "museum").with_cost(100)]);
        day.daily_estimated_cost = 999_999;
        assert_eq!(aggregate_day(&day).daily_estimated_cost, 100);
    }
}
