//! Generator plan parser.
//!
//! Two stages: a structural check over the untyped JSON (the failures the
//! generation route rejects outright), then per-field coercion into
//! [`itinera_core::Plan`]. The result is not settled; callers run
//! [`itinera_core::settle`] afterwards.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, info, warn};

use itinera_core::plan::default_currency;
use itinera_core::{
    Breakdown, Budget, ClockTime, Day, EngineError, Item, Milestone, Plan, Result, DEFAULT_PRIORITY,
};

use crate::coerce;
use crate::extract::extract_json_object;
use crate::raw::{RawBudget, RawDay, RawItem, RawPlan};

/// Values the caller knows better than the generator.
#[derive(Debug, Clone, Default)]
pub struct PlanContext {
    pub plan_id: Option<String>,
    pub destination: Option<String>,
}

pub fn parse_plan(raw: &str) -> Result<Plan> {
    parse_plan_with(raw, &PlanContext::default())
}

pub fn parse_plan_with(raw: &str, ctx: &PlanContext) -> Result<Plan> {
    let json = extract_json_object(raw)?;
    let value: Value = serde_json::from_str(json)
        .map_err(|e| EngineError::structural(format!("plan is not valid JSON: {e}")))?;
    check_shape(&value)?;
    let parsed: RawPlan = serde_json::from_value(value)
        .map_err(|e| EngineError::structural(format!("plan does not match the expected layout: {e}")))?;
    build_plan(parsed, ctx)
}

fn check_shape(value: &Value) -> Result<()> {
    let days = value
        .get("days")
        .and_then(Value::as_array)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| EngineError::structural("plan has no days"))?;

    let total = value
        .get("estimated_budget")
        .and_then(|b| b.get("total_amount"))
        .and_then(coerce::amount)
        .unwrap_or(0);
    if total <= 0 {
        return Err(EngineError::structural("estimated_budget.total_amount is missing"));
    }

    for (idx, day) in days.iter().enumerate() {
        let has_date = day
            .get("date")
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty());
        let has_items = day.get("items").is_some_and(Value::is_array);
        if !has_date || !has_items {
            return Err(EngineError::structural(format!("days[{idx}] is missing date or items")));
        }
    }
    Ok(())
}

fn parse_date(field: &str, s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| EngineError::structural(format!("{field} '{s}' is not YYYY-MM-DD")))
}

fn parse_clock(field: &str, s: Option<String>) -> Result<Option<ClockTime>> {
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(t) => ClockTime::parse(t)
            .map(Some)
            .ok_or_else(|| EngineError::structural(format!("{field} '{t}' is not HH:MM"))),
    }
}

fn build_plan(raw: RawPlan, ctx: &PlanContext) -> Result<Plan> {
    let mut days = Vec::with_capacity(raw.days.len());
    for (idx, raw_day) in raw.days.into_iter().enumerate() {
        let day = build_day(idx, raw_day)?;
        if let Some(prev) = days.last().map(|d: &Day| d.date) {
            if day.date <= prev {
                return Err(EngineError::structural(format!(
                    "days[{idx}] ({}) does not follow {prev}",
                    day.date
                )));
            }
        }
        days.push(day);
    }
    let (Some(first), Some(last)) = (days.first().map(|d| d.date), days.last().map(|d| d.date)) else {
        return Err(EngineError::structural("plan has no days"));
    };

    let start_date = match raw.start_date.as_deref() {
        Some(s) => parse_date("startDate", s)?,
        None => first,
    };
    let end_date = match raw.end_date.as_deref() {
        Some(s) => parse_date("endDate", s)?,
        None => last,
    };
    if start_date != first || end_date != last {
        return Err(EngineError::structural(format!(
            "trip dates {start_date}..{end_date} do not match days {first}..{last}"
        )));
    }

    let estimated_budget = build_budget(raw.estimated_budget.unwrap_or_default());
    let plan_id = ctx
        .plan_id
        .clone()
        .or(raw.plan_id)
        .unwrap_or_else(|| format!("plan-{start_date}"));
    let destination = ctx.destination.clone().or(raw.destination).unwrap_or_default();

    let plan = Plan {
        plan_id,
        destination,
        start_date,
        end_date,
        arrival_time: parse_clock("arrivalTime", raw.arrival_time)?,
        departure_time: parse_clock("departureTime", raw.departure_time)?,
        estimated_budget,
        summary: raw.summary,
        days,
    };
    info!(
        plan_id = %plan.plan_id,
        days = plan.days.len(),
        items = plan.items().count(),
        total = plan.estimated_budget.total_amount,
        "plan ingested"
    );
    Ok(plan)
}

fn build_day(idx: usize, raw: RawDay) -> Result<Day> {
    let date_text = coerce::text(&raw.date).unwrap_or_default();
    let date = parse_date(&format!("days[{idx}].date"), &date_text)?;

    let mut day = Day::new(date);
    day.title = raw.title.unwrap_or_default();
    day.summary = raw.summary.unwrap_or_default();
    day.daily_estimated_cost = coerce::cost("daily_estimated_cost", &raw.daily_estimated_cost).unwrap_or(0);
    day.daily_transport_cost = coerce::cost("daily_transport_cost", &raw.daily_transport_cost);
    day.items = raw.items.into_iter().map(build_item).collect();
    day.sort_items();

    let unreadable = day.items.iter().filter(|i| i.clock().is_none()).count();
    if unreadable > 0 {
        warn!(%date, unreadable, "items with unreadable times sorted last");
    }
    debug!(%date, items = day.items.len(), "day ingested");
    Ok(day)
}

fn build_item(raw: RawItem) -> Item {
    let mut item = Item::new(
        coerce::text(&raw.time).unwrap_or_default(),
        coerce::text(&raw.place).unwrap_or_default(),
        coerce::text(&raw.activity).unwrap_or_default(),
    );
    item.notes = raw.notes.filter(|n| !n.trim().is_empty());
    item.cost = coerce::cost("cost", &raw.cost);
    item.next_move_duration = raw.next_move_duration;
    item.priority_score = Some(coerce::priority(&raw.priority_score, DEFAULT_PRIORITY));
    item.image_search_link = raw.image_search_link;
    item.activity_image_query = raw.activity_image_query;
    item.official_website_link = raw.official_website_link;
    item.purchase_search_link = raw.purchase_search_link;
    item.milestone = serde_json::from_value::<Milestone>(raw.milestone).ok();
    item
}

fn build_budget(raw: RawBudget) -> Budget {
    let b = &raw.breakdown;
    let field = |name: &str, v: &Value| coerce::cost(name, v).unwrap_or(0);
    let breakdown = Breakdown {
        flight_cost: field("flight_cost", &b.flight_cost),
        accommodation_cost: field("accommodation_cost", &b.accommodation_cost),
        local_transport_cost: field("local_transport_cost", &b.local_transport_cost),
        food_and_drink_cost: field("food_and_drink_cost", &b.food_and_drink_cost),
        activities_and_tours_cost: field("activities_and_tours_cost", &b.activities_and_tours_cost),
        contingency_and_misc: field("contingency_and_misc", &b.contingency_and_misc),
    };
    let currency = raw
        .currency
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(default_currency);

    // The reported total is kept as-is; normalization reconciles it later.
    Budget {
        total_amount: coerce::amount(&raw.total_amount).unwrap_or(0),
        currency,
        breakdown,
    }
}
