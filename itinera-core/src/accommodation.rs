//! Spread the lump lodging budget across the nights actually stayed.

use tracing::{debug, warn};

use crate::category::{classify, ItemCategory};
use crate::clock::ClockTime;
use crate::money::div_round;
use crate::plan::{Day, Plan};

/// Index of the day's lodging checkpoint: the latest-by-time item classified
/// as lodging. If any lodging item has an unparseable time, the last lodging
/// item in list order is used instead.
pub fn lodging_checkpoint(day: &Day) -> Option<usize> {
    let lodging: Vec<usize> = day
        .items
        .iter()
        .enumerate()
        .filter(|(_, item)| classify(item) == ItemCategory::Lodging)
        .map(|(i, _)| i)
        .collect();

    let last_in_list = *lodging.last()?;

    let mut best: Option<(usize, ClockTime)> = None;
    for &idx in &lodging {
        let Some(t) = day.items[idx].clock() else {
            return Some(last_in_list);
        };
        // `>=` so equal times resolve to the later entry.
        if best.is_none_or(|(_, bt)| t >= bt) {
            best = Some((idx, t));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Overwrite each checkpoint's cost with an even nightly share of
/// `accommodation_cost`. The last day never hosts a night. With no checkpoint
/// anywhere, the budget stays undistributed and nothing is fabricated.
pub fn distribute_accommodation(plan: &Plan) -> Plan {
    let mut out = plan.clone();
    let total = plan.estimated_budget.breakdown.accommodation_cost;
    let nights = out.days.len().saturating_sub(1);

    let checkpoints: Vec<(usize, usize)> = out.days[..nights]
        .iter()
        .enumerate()
        .filter_map(|(d, day)| lodging_checkpoint(day).map(|i| (d, i)))
        .collect();

    if checkpoints.is_empty() {
        if total > 0 {
            warn!(
                plan_id = %plan.plan_id,
                accommodation = total,
                "no lodging checkpoint found; accommodation left undistributed"
            );
        }
        return out;
    }

    let per_night = div_round(total, checkpoints.len() as i64);
    debug!(
        plan_id = %plan.plan_id,
        checkpoints = checkpoints.len(),
        per_night,
        "distributing accommodation"
    );

    for (d, i) in checkpoints {
        out.days[d].items[i].cost = Some(per_night);
    }
    out
}
