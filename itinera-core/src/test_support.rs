//! Fixtures shared by the unit tests.

use chrono::{Days, NaiveDate};

use crate::plan::{Breakdown, Budget, Day, Item, Plan};

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()
}

pub fn budget_with(f: impl FnOnce(&mut Breakdown)) -> Budget {
    let mut breakdown = Breakdown::default();
    f(&mut breakdown);
    Budget::settled(breakdown, "KRW")
}

/// A Seoul plan with one day per entry of `days`, on consecutive dates.
pub fn plan_of(days: Vec<Vec<Item>>, budget: Budget) -> Plan {
    let start = start_date();
    let days: Vec<Day> = days
        .into_iter()
        .enumerate()
        .map(|(i, items)| Day::new(start + Days::new(i as u64)).with_items(items))
        .collect();
    let end = days.last().map(|d| d.date).unwrap_or(start);
    Plan {
        plan_id: "plan-test".to_string(),
        destination: "Seoul".to_string(),
        start_date: start,
        end_date: end,
        arrival_time: None,
        departure_time: None,
        estimated_budget: budget,
        summary: serde_json::Value::Null,
        days,
    }
}
