//! Trip plan types in their persisted JSON layout.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::ClockTime;
use crate::money::sum_amounts;

/// Priority assumed when the generator leaves `priority_score` out.
pub const DEFAULT_PRIORITY: u8 = 10;

/// One trip: dates, optional real flight clock times, days and the budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(rename = "planId")]
    pub plan_id: String,
    pub destination: String,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDate")]
    pub end_date: NaiveDate,
    #[serde(rename = "arrivalTime", default, skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<ClockTime>,
    #[serde(rename = "departureTime", default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<ClockTime>,
    pub estimated_budget: Budget,
    /// Free-form generator summary (tips, overview); opaque to the engine.
    #[serde(default)]
    pub summary: serde_json::Value,
    pub days: Vec<Day>,
}

impl Plan {
    pub fn first_day(&self) -> Option<&Day> {
        self.days.first()
    }

    pub fn last_day(&self) -> Option<&Day> {
        self.days.last()
    }

    /// Every item in the trip, with its stable cache key.
    pub fn items(&self) -> impl Iterator<Item = (ItemKey, &Item)> {
        self.days.iter().enumerate().flat_map(|(d, day)| {
            day.items
                .iter()
                .enumerate()
                .map(move |(i, item)| (ItemKey::new(d, i), item))
        })
    }

    pub fn item(&self, key: ItemKey) -> Option<&Item> {
        self.days.get(key.day)?.items.get(key.item)
    }
}

/// One calendar date of the trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    pub date: NaiveDate,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    /// Derived from the items plus local transport; never authoritative.
    #[serde(default)]
    pub daily_estimated_cost: i64,
    /// Day-level movement cost from the routing collaborator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_transport_cost: Option<i64>,
    pub items: Vec<Item>,
}

impl Day {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            title: String::new(),
            summary: String::new(),
            daily_estimated_cost: 0,
            daily_transport_cost: None,
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }

    pub fn with_transport_cost(mut self, cost: i64) -> Self {
        self.daily_transport_cost = Some(cost);
        self
    }

    pub fn transport_cost(&self) -> i64 {
        self.daily_transport_cost.unwrap_or(0)
    }

    /// Ordered, non-empty place names (the day's route).
    pub fn route(&self) -> Vec<String> {
        self.items
            .iter()
            .map(|i| i.place.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Stable sort by clock time; ties and unparseable times keep list order,
    /// with unparseable times after every parseable one.
    pub fn sort_items(&mut self) {
        sort_by_clock(&mut self.items);
    }
}

pub(crate) fn sort_by_clock(items: &mut [Item]) {
    items.sort_by_key(|item| match item.clock() {
        Some(t) => (0u8, t),
        None => (1u8, ClockTime::MIDNIGHT),
    });
}

/// Logistics entries the trimmer regenerates rather than keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    AirportArrival,
    AirportTransfer,
    CheckoutTransfer,
    AirportDeparture,
}

/// One scheduled entry within a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub time: String,
    #[serde(default)]
    pub place: String,
    #[serde(default)]
    pub activity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// `None` means "not yet estimated".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_move_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_search_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_image_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official_website_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_search_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<Milestone>,
}

impl Item {
    pub fn new(time: impl Into<String>, place: impl Into<String>, activity: impl Into<String>) -> Self {
        Self {
            time: time.into(),
            place: place.into(),
            activity: activity.into(),
            notes: None,
            cost: None,
            next_move_duration: None,
            priority_score: None,
            image_search_link: None,
            activity_image_query: None,
            official_website_link: None,
            purchase_search_link: None,
            milestone: None,
        }
    }

    pub fn with_cost(mut self, cost: i64) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority_score = Some(priority);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_milestone(mut self, milestone: Milestone) -> Self {
        self.milestone = Some(milestone);
        self
    }

    pub fn clock(&self) -> Option<ClockTime> {
        ClockTime::parse(&self.time)
    }

    pub fn set_clock(&mut self, time: ClockTime) {
        self.time = time.to_string();
    }

    pub fn priority(&self) -> u8 {
        self.priority_score.unwrap_or(DEFAULT_PRIORITY)
    }

    pub fn cost_or_zero(&self) -> i64 {
        self.cost.unwrap_or(0)
    }

    /// Drop enrichment links; used when an item becomes pure logistics.
    pub fn clear_enrichment(&mut self) {
        self.image_search_link = None;
        self.activity_image_query = None;
        self.official_website_link = None;
        self.purchase_search_link = None;
    }
}

/// The six budget categories, in breakdown order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetCategory {
    Flight,
    Accommodation,
    LocalTransport,
    FoodAndDrink,
    ActivitiesAndTours,
    ContingencyAndMisc,
}

impl BudgetCategory {
    pub const ALL: [BudgetCategory; 6] = [
        BudgetCategory::Flight,
        BudgetCategory::Accommodation,
        BudgetCategory::LocalTransport,
        BudgetCategory::FoodAndDrink,
        BudgetCategory::ActivitiesAndTours,
        BudgetCategory::ContingencyAndMisc,
    ];
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    #[serde(default)]
    pub flight_cost: i64,
    #[serde(default)]
    pub accommodation_cost: i64,
    #[serde(default)]
    pub local_transport_cost: i64,
    #[serde(default)]
    pub food_and_drink_cost: i64,
    #[serde(default)]
    pub activities_and_tours_cost: i64,
    #[serde(default)]
    pub contingency_and_misc: i64,
}

impl Breakdown {
    pub fn get(&self, category: BudgetCategory) -> i64 {
        match category {
            BudgetCategory::Flight => self.flight_cost,
            BudgetCategory::Accommodation => self.accommodation_cost,
            BudgetCategory::LocalTransport => self.local_transport_cost,
            BudgetCategory::FoodAndDrink => self.food_and_drink_cost,
            BudgetCategory::ActivitiesAndTours => self.activities_and_tours_cost,
            BudgetCategory::ContingencyAndMisc => self.contingency_and_misc,
        }
    }

    pub fn sum(&self) -> i64 {
        sum_amounts(BudgetCategory::ALL.iter().map(|c| self.get(*c)))
    }

    /// Sum of the four categories spent at the destination.
    pub fn local_sum(&self) -> i64 {
        sum_amounts([
            self.local_transport_cost,
            self.food_and_drink_cost,
            self.activities_and_tours_cost,
            self.contingency_and_misc,
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub total_amount: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub breakdown: Breakdown,
}

pub fn default_currency() -> String {
    "KRW".to_string()
}

impl Budget {
    /// Build a budget whose total is the exact sum of `breakdown`.
    pub fn settled(breakdown: Breakdown, currency: impl Into<String>) -> Self {
        Self {
            total_amount: breakdown.sum(),
            currency: currency.into(),
            breakdown,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.total_amount == self.breakdown.sum()
    }
}

/// Position of an item inside a plan; the key for per-item caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    pub day: usize,
    pub item: usize,
}

impl ItemKey {
    pub fn new(day: usize, item: usize) -> Self {
        Self { day, item }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_json_uses_persisted_field_names() {
        let item = Item::new("09:00", "Gyeongbokgung", "Palace tour")
            .with_cost(3000)
            .with_priority(85);
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"priority_score\":85"));
        assert!(json.contains("\"cost\":3000"));
        assert!(!json.contains("milestone"));

        let back: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn missing_priority_defaults_to_logistics_band() {
        let item = Item::new("12:00", "", "checkout");
        assert_eq!(item.priority(), DEFAULT_PRIORITY);
    }

    #[test]
    fn sort_is_stable_and_puts_bad_times_last() {
        let mut day = Day::new(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()).with_items(vec![
            Item::new("later", "x", "unknown time"),
            Item::new("10:00", "a", "first"),
            Item::new("09:00", "b", "early"),
            Item::new("10:00", "c", "second"),
        ]);
        day.sort_items();
        let order: Vec<_> = day.items.iter().map(|i| i.place.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c", "x"]);
    }

    #[test]
    fn breakdown_sums_all_six_categories() {
        let b = Breakdown {
            flight_cost: 1,
            accommodation_cost: 2,
            local_transport_cost: 3,
            food_and_drink_cost: 4,
            activities_and_tours_cost: 5,
            contingency_and_misc: 6,
        };
        assert_eq!(b.sum(), 21);
        assert_eq!(b.local_sum(), 18);
        assert!(Budget::settled(b, "KRW").is_settled());
    }
}
