//! itinera-ingest: generator output to validated plans (fence stripping, raw schema, coercion).

pub mod coerce;
pub mod extract;
pub mod plan_parser;
pub mod raw;

pub use extract::extract_json_object;
pub use plan_parser::{parse_plan, parse_plan_with, PlanContext};
pub use raw::{RawBudget, RawDay, RawItem, RawPlan};
