//! Rebalance the budget around user-supplied real flight and lodging prices.
//!
//! Algorithm:
//! 1) validate inputs; reject when real costs exceed the original total
//! 2) remaining = original total - flight - accommodation
//! 3) ask the redistributor for a four-way split of `remaining`
//! 4) a split that overshoots beyond what contingency can give back is scaled
//!    to `remaining`; contingency then absorbs the rounding residual
//! 5) assemble the new budget; recompute daily costs from unchanged items

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::collaborators::{BudgetRedistributor, LocalSplit, RedistributionRequest};
use crate::daily_cost::aggregate_days;
use crate::error::{EngineError, Result};
use crate::money::{round_amount, scale_round, sum_amounts, MAX_AMOUNT};
use crate::plan::{Breakdown, Budget, Plan};

/// Residual beyond which a redistributor's split counts as inconsistent.
pub const DEFAULT_RESIDUAL_TOLERANCE: i64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebalancePolicy {
    pub residual_tolerance: i64,
}

impl Default for RebalancePolicy {
    fn default() -> Self {
        Self {
            residual_tolerance: DEFAULT_RESIDUAL_TOLERANCE,
        }
    }
}

/// Validated real prices entered by the traveler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealCosts {
    pub flight: i64,
    pub accommodation: i64,
}

impl RealCosts {
    pub fn new(flight: i64, accommodation: i64) -> Result<Self> {
        if flight < 0 {
            return Err(EngineError::validation("flight cost must be >= 0"));
        }
        if accommodation < 0 {
            return Err(EngineError::validation("accommodation cost must be >= 0"));
        }
        Ok(Self { flight, accommodation })
    }

    /// Parse raw form input such as `"1,250,000"`.
    pub fn parse(flight: &str, accommodation: &str) -> Result<Self> {
        Self::new(parse_amount("flight", flight)?, parse_amount("accommodation", accommodation)?)
    }
}

fn parse_amount(field: &str, raw: &str) -> Result<i64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',' && *c != '_').collect();
    if cleaned.is_empty() {
        return Err(EngineError::validation(format!("{field} cost is required")));
    }
    let value: f64 = cleaned
        .parse()
        .map_err(|_| EngineError::validation(format!("{field} cost '{raw}' is not a number")))?;
    round_amount(value).ok_or_else(|| {
        EngineError::validation(format!("{field} cost '{raw}' is not a finite amount up to {MAX_AMOUNT}"))
    })
}

/// Check preconditions and compute the remaining local budget.
pub fn remaining_local_budget(original: &Budget, real: RealCosts) -> Result<i64> {
    if original.total_amount < 0 {
        return Err(EngineError::validation("original budget total must be >= 0"));
    }
    let committed = real
        .flight
        .checked_add(real.accommodation)
        .ok_or_else(|| EngineError::validation("real flight + accommodation is out of range"))?;
    if committed > original.total_amount {
        return Err(EngineError::validation(format!(
            "real flight + accommodation ({committed}) exceed the original total ({})",
            original.total_amount
        )));
    }
    Ok(original.total_amount - committed)
}

/// Force the split to sum to `remaining`.
///
/// Contingency is credited or debited with the residual. When the split
/// overshoots by more than contingency holds (a redistributor that echoes the
/// original local figures), the four figures are first scaled to `remaining`
/// in their returned ratio.
pub fn absorb_residual(split: LocalSplit, remaining: i64, policy: RebalancePolicy) -> Result<LocalSplit> {
    if !split.all_non_negative() {
        return Err(EngineError::collaborator("redistribution returned a negative category"));
    }

    let mut corrected = split;
    let overshoot = split.sum().saturating_sub(remaining);
    if overshoot > split.contingency_and_misc {
        warn!(
            returned = split.sum(),
            remaining,
            "local split overshoots the remaining budget; scaling to fit"
        );
        corrected = carry_over_split(&local_breakdown(&split), remaining);
    }

    let residual = remaining.saturating_sub(corrected.sum());
    if residual.abs() > policy.residual_tolerance {
        warn!(residual, remaining, "local split outside tolerance; contingency corrected");
    } else if residual != 0 {
        debug!(residual, "rounding slack moved to contingency");
    }
    corrected.contingency_and_misc += residual;

    // Rounding can leave a unit or two owed when contingency scaled to 0.
    if corrected.contingency_and_misc < 0 {
        let owed = -corrected.contingency_and_misc;
        corrected.contingency_and_misc = 0;
        let largest = [
            &mut corrected.local_transport_cost,
            &mut corrected.food_and_drink_cost,
            &mut corrected.activities_and_tours_cost,
        ]
        .into_iter()
        .max_by_key(|v| **v);
        match largest {
            Some(v) if *v >= owed => *v -= owed,
            _ => {
                return Err(EngineError::collaborator(format!(
                    "local split cannot be fitted to remaining budget {remaining}"
                )));
            }
        }
    }
    Ok(corrected)
}

fn local_breakdown(split: &LocalSplit) -> Breakdown {
    Breakdown {
        local_transport_cost: split.local_transport_cost,
        food_and_drink_cost: split.food_and_drink_cost,
        activities_and_tours_cost: split.activities_and_tours_cost,
        contingency_and_misc: split.contingency_and_misc,
        ..Breakdown::default()
    }
}

/// Outcome of a committed rebalance.
#[derive(Debug, Clone, PartialEq)]
pub struct RebalanceOutcome {
    pub plan: Plan,
    pub remaining_local_budget: i64,
    /// New total minus the sum of daily costs; informational only.
    pub daily_residual: i64,
}

/// Carries the original four local figures over in their original ratio.
#[derive(Debug, Clone, Copy, Default)]
pub struct CarryOverRedistributor;

#[async_trait]
impl BudgetRedistributor for CarryOverRedistributor {
    async fn redistribute(&self, request: &RedistributionRequest) -> Result<LocalSplit> {
        Ok(carry_over_split(&request.original_budget.breakdown, request.remaining_local_budget))
    }
}

/// Scale the original local figures to `remaining`. With no local spend to
/// scale from, everything lands in contingency.
pub fn carry_over_split(original: &Breakdown, remaining: i64) -> LocalSplit {
    let base = original.local_sum();
    if base <= 0 {
        return LocalSplit {
            contingency_and_misc: remaining,
            ..LocalSplit::default()
        };
    }
    let scale = |v: i64| scale_round(v.max(0), remaining, base);
    LocalSplit {
        local_transport_cost: scale(original.local_transport_cost),
        food_and_drink_cost: scale(original.food_and_drink_cost),
        activities_and_tours_cost: scale(original.activities_and_tours_cost),
        contingency_and_misc: scale(original.contingency_and_misc),
    }
}

#[derive(Debug, Clone)]
pub struct BudgetRebalancer<R: BudgetRedistributor> {
    redistributor: R,
    policy: RebalancePolicy,
}

impl<R: BudgetRedistributor> BudgetRebalancer<R> {
    pub fn new(redistributor: R, policy: RebalancePolicy) -> Self {
        Self { redistributor, policy }
    }

    /// Produce a new plan with the rebalanced budget. Any failure leaves the
    /// caller's plan untouched; nothing is partially committed.
    pub async fn rebalance(&self, plan: &Plan, real: RealCosts) -> Result<RebalanceOutcome> {
        let original = &plan.estimated_budget;
        let remaining = remaining_local_budget(original, real)?;

        let request = RedistributionRequest {
            original_budget: original.clone(),
            real_flight_cost: real.flight,
            real_accommodation_cost: real.accommodation,
            remaining_local_budget: remaining,
        };
        let split = self.redistributor.redistribute(&request).await?;
        let split = absorb_residual(split, remaining, self.policy)?;

        let breakdown = Breakdown {
            flight_cost: real.flight,
            accommodation_cost: real.accommodation,
            local_transport_cost: split.local_transport_cost,
            food_and_drink_cost: split.food_and_drink_cost,
            activities_and_tours_cost: split.activities_and_tours_cost,
            contingency_and_misc: split.contingency_and_misc,
        };
        let budget = Budget::settled(breakdown, original.currency.clone());

        let mut out = aggregate_days(plan);
        out.estimated_budget = budget;

        let daily_total = sum_amounts(out.days.iter().map(|d| d.daily_estimated_cost));
        let daily_residual = out.estimated_budget.total_amount.saturating_sub(daily_total);

        info!(
            plan_id = %plan.plan_id,
            original_total = original.total_amount,
            remaining,
            daily_residual,
            "budget rebalanced"
        );

        Ok(RebalanceOutcome {
            plan: out,
            remaining_local_budget: remaining,
            daily_residual,
        })
    }
}
