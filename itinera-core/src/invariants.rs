//! Settled-plan invariants.

use std::fmt;

use crate::daily_cost::daily_cost;
use crate::plan::Plan;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    NoDays,
    BudgetTotal { total: i64, breakdown_sum: i64 },
    DailyCost { day: usize, recorded: i64, expected: i64 },
    DayOrder { day: usize },
    StartDate,
    EndDate,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::NoDays => write!(f, "plan has no days"),
            Violation::BudgetTotal { total, breakdown_sum } => {
                write!(f, "budget total {total} != breakdown sum {breakdown_sum}")
            }
            Violation::DailyCost { day, recorded, expected } => {
                write!(f, "days[{day}]: daily cost {recorded} != {expected}")
            }
            Violation::DayOrder { day } => write!(f, "days[{day}] is not after the previous day"),
            Violation::StartDate => write!(f, "startDate does not match the first day"),
            Violation::EndDate => write!(f, "endDate does not match the last day"),
        }
    }
}

/// Every invariant a settled plan must satisfy that `plan` violates.
pub fn check_invariants(plan: &Plan) -> Vec<Violation> {
    let mut out = Vec::new();

    let (Some(first), Some(last)) = (plan.first_day(), plan.last_day()) else {
        out.push(Violation::NoDays);
        return out;
    };
    if first.date != plan.start_date {
        out.push(Violation::StartDate);
    }
    if last.date != plan.end_date {
        out.push(Violation::EndDate);
    }
    for (idx, pair) in plan.days.windows(2).enumerate() {
        if pair[1].date <= pair[0].date {
            out.push(Violation::DayOrder { day: idx + 1 });
        }
    }

    let budget = &plan.estimated_budget;
    if !budget.is_settled() {
        out.push(Violation::BudgetTotal {
            total: budget.total_amount,
            breakdown_sum: budget.breakdown.sum(),
        });
    }

    for (idx, day) in plan.days.iter().enumerate() {
        let expected = daily_cost(day);
        if day.daily_estimated_cost != expected {
            out.push(Violation::DailyCost {
                day: idx,
                recorded: day.daily_estimated_cost,
                expected,
            });
        }
    }
    out
}
