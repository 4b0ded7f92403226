//! Clean up service responses before they reach the engine.
//!
//! Generated numbers are rounded and floored at 0, indices are clamped into
//! range, and items missing a time, place or activity are dropped.

use anyhow::{anyhow, Result};
use serde_json::Value;
use tracing::warn;

use itinera_core::{
    sum_amounts, ActivityCost, CostBreakdown, CostResponse, GapResponse, Item, LocalSplit,
    TransportLeg, TransportResponse,
};
use itinera_ingest::coerce;

/// Priority given to filler items that arrive without one.
pub const FILLER_PRIORITY: u8 = 20;

fn floored(v: &Value) -> i64 {
    coerce::amount(v).unwrap_or(0).max(0)
}

fn field<'a>(v: &'a Value, key: &str) -> &'a Value {
    v.get(key).unwrap_or(&Value::Null)
}

fn non_empty(v: &Value) -> Option<String> {
    coerce::text(v).filter(|s| !s.is_empty())
}

pub fn gap_items(body: &Value) -> GapResponse {
    let Some(raw) = body.get("items").and_then(Value::as_array) else {
        return GapResponse::default();
    };

    let mut items = Vec::with_capacity(raw.len());
    for entry in raw {
        let (Some(time), Some(place), Some(activity)) = (
            non_empty(field(entry, "time")),
            non_empty(field(entry, "place")),
            non_empty(field(entry, "activity")),
        ) else {
            warn!(item = %entry, "dropping filler without time, place or activity");
            continue;
        };

        let mut item = Item::new(time, place, activity)
            .with_cost(floored(field(entry, "cost")))
            .with_priority(coerce::priority(field(entry, "priority_score"), FILLER_PRIORITY));
        item.notes = non_empty(field(entry, "notes"));
        item.next_move_duration = non_empty(field(entry, "next_move_duration"));
        item.image_search_link = non_empty(field(entry, "image_search_link"));
        item.activity_image_query = non_empty(field(entry, "activity_image_query"));
        item.official_website_link = non_empty(field(entry, "official_website_link"));
        item.purchase_search_link = non_empty(field(entry, "purchase_search_link"));
        items.push(item);
    }

    let total_cost = sum_amounts(items.iter().map(Item::cost_or_zero));
    GapResponse { items, total_cost }
}

/// One zero estimate per requested activity.
pub fn zero_costs(count: usize) -> CostResponse {
    CostResponse {
        costs: (0..count)
            .map(|activity_index| ActivityCost {
                activity_index,
                cost: 0,
                breakdown: CostBreakdown::default(),
            })
            .collect(),
    }
}

pub fn activity_costs(body: &Value, count: usize) -> CostResponse {
    if count == 0 {
        return CostResponse::default();
    }
    let Some(raw) = body.get("costs").and_then(Value::as_array) else {
        warn!("cost response without a costs array; using zero costs");
        return zero_costs(count);
    };

    let last = count as i64 - 1;
    let mut costs: Vec<ActivityCost> = raw
        .iter()
        .map(|entry| {
            let b = field(entry, "breakdown");
            ActivityCost {
                activity_index: coerce::amount(field(entry, "activity_index")).unwrap_or(0).clamp(0, last) as usize,
                cost: floored(field(entry, "cost")),
                breakdown: CostBreakdown {
                    entrance_fee: floored(field(b, "entrance_fee")),
                    experience_program: floored(field(b, "experience_program")),
                    food_drink: floored(field(b, "food_drink")),
                    transport: floored(field(b, "transport")),
                    other: floored(field(b, "other")),
                },
            }
        })
        .collect();
    costs.sort_by_key(|c| c.activity_index);
    CostResponse { costs }
}

pub fn transport(body: &Value) -> TransportResponse {
    let breakdown = body
        .get("breakdown")
        .and_then(Value::as_array)
        .map(|legs| {
            legs.iter()
                .map(|leg| TransportLeg {
                    from: coerce::text(field(leg, "from")).unwrap_or_default(),
                    to: coerce::text(field(leg, "to")).unwrap_or_default(),
                    transport: coerce::text(field(leg, "transport")).unwrap_or_default(),
                    cost: floored(field(leg, "cost")),
                })
                .collect()
        })
        .unwrap_or_default();
    TransportResponse {
        total_cost: floored(field(body, "total_cost")),
        breakdown,
    }
}

/// The four local figures of a rebalance response. Values are rounded but
/// not floored; the engine rejects negative categories itself.
pub fn local_split(body: &Value) -> Result<LocalSplit> {
    let breakdown = body
        .get("estimated_budget")
        .and_then(|b| b.get("breakdown"))
        .filter(|b| b.is_object())
        .ok_or_else(|| anyhow!("rebalance response has no estimated_budget.breakdown"))?;
    let figure = |key: &str| coerce::amount(field(breakdown, key)).unwrap_or(0);
    Ok(LocalSplit {
        local_transport_cost: figure("local_transport_cost"),
        food_and_drink_cost: figure("food_and_drink_cost"),
        activities_and_tours_cost: figure("activities_and_tours_cost"),
        contingency_and_misc: figure("contingency_and_misc"),
    })
}
