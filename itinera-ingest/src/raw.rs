//! Loosely typed mirror of the generator's plan JSON.
//!
//! Numeric fields stay as [`Value`] so one odd value never rejects the whole
//! plan; [`crate::plan_parser`] coerces them field by field.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPlan {
    #[serde(default, rename = "planId", alias = "plan_id")]
    pub plan_id: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default, rename = "startDate", alias = "start_date")]
    pub start_date: Option<String>,
    #[serde(default, rename = "endDate", alias = "end_date")]
    pub end_date: Option<String>,
    #[serde(default, rename = "arrivalTime", alias = "arrival_time")]
    pub arrival_time: Option<String>,
    #[serde(default, rename = "departureTime", alias = "departure_time")]
    pub departure_time: Option<String>,
    #[serde(default)]
    pub estimated_budget: Option<RawBudget>,
    #[serde(default)]
    pub summary: Value,
    #[serde(default)]
    pub days: Vec<RawDay>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBudget {
    #[serde(default)]
    pub total_amount: Value,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub breakdown: RawBreakdown,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBreakdown {
    #[serde(default)]
    pub flight_cost: Value,
    #[serde(default)]
    pub accommodation_cost: Value,
    #[serde(default)]
    pub local_transport_cost: Value,
    #[serde(default)]
    pub food_and_drink_cost: Value,
    #[serde(default)]
    pub activities_and_tours_cost: Value,
    #[serde(default)]
    pub contingency_and_misc: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDay {
    #[serde(default)]
    pub date: Value,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub daily_estimated_cost: Value,
    #[serde(default)]
    pub daily_transport_cost: Value,
    #[serde(default)]
    pub items: Vec<RawItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub time: Value,
    #[serde(default)]
    pub place: Value,
    #[serde(default)]
    pub activity: Value,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub cost: Value,
    #[serde(default)]
    pub next_move_duration: Option<String>,
    #[serde(default)]
    pub priority_score: Value,
    #[serde(default)]
    pub image_search_link: Option<String>,
    #[serde(default)]
    pub activity_image_query: Option<String>,
    #[serde(default)]
    pub official_website_link: Option<String>,
    #[serde(default)]
    pub purchase_search_link: Option<String>,
    #[serde(default)]
    pub milestone: Value,
}
