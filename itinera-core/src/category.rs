//! Deterministic spending-category rules for itinerary items.
//!
//! Keyword tables cover the Korean and English phrasing the generator
//! produces. Matching is over lowercased place + activity + notes text only;
//! enrichment links never influence the category.

use serde::{Deserialize, Serialize};

use crate::plan::{Item, Milestone};

/// Spending bucket an item's cost belongs to. Local transport is never
/// assigned per item; it is a day-level figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemCategory {
    Lodging,
    FoodAndDrink,
    Activities,
}

const BREAKFAST: &[&str] = &["breakfast", "조식", "아침 식사", "아침식사", "brunch", "브런치"];

const DINING: &[&str] = &[
    "lunch",
    "dinner",
    "snack",
    "café",
    "cafe",
    "coffee",
    "restaurant",
    "dessert",
    "drink",
    "dining",
    "meal",
    "점심",
    "저녁 식사",
    "저녁식사",
    "석식",
    "식사",
    "간식",
    "카페",
    "커피",
    "레스토랑",
    "식당",
    "맛집",
    "디저트",
    "음료",
];

const LODGING: &[&str] = &[
    "hotel",
    "hostel",
    "guesthouse",
    "guest house",
    "resort",
    "check-in",
    "check in",
    "checkin",
    "check-out",
    "check out",
    "checkout",
    "accommodation",
    "stay",
    "호텔",
    "호스텔",
    "게스트하우스",
    "리조트",
    "체크인",
    "체크아웃",
    "숙소",
    "숙박",
];

const AIRPORT: &[&str] = &["airport", "공항"];
const ARRIVAL: &[&str] = &["arrival", "arrive", "landing", "도착"];
const DEPARTURE: &[&str] = &["departure", "depart", "take off", "출발", "출국", "탑승"];
const TRANSFER: &[&str] = &["transfer", "shuttle", "limousine", "express", "이동", "리무진", "공항철도"];

fn item_text(item: &Item) -> String {
    let mut text = String::with_capacity(item.place.len() + item.activity.len() + 2);
    text.push_str(&item.place);
    text.push(' ');
    text.push_str(&item.activity);
    if let Some(notes) = &item.notes {
        text.push(' ');
        text.push_str(notes);
    }
    text.to_lowercase()
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Classify an item. First match wins: breakfast, other dining, lodging,
/// then the activities catch-all. Breakfast precedes lodging so a hotel
/// breakfast counts as food.
pub fn classify(item: &Item) -> ItemCategory {
    let text = item_text(item);

    if contains_any(&text, BREAKFAST) {
        return ItemCategory::FoodAndDrink;
    }
    if contains_any(&text, DINING) {
        return ItemCategory::FoodAndDrink;
    }
    if contains_any(&text, LODGING) {
        return ItemCategory::Lodging;
    }
    ItemCategory::Activities
}

/// Airport milestone carried by an item: the explicit tag when present,
/// otherwise inferred from airport wording plus an arrival, departure or
/// transfer keyword.
pub fn airport_milestone(item: &Item) -> Option<Milestone> {
    if let Some(m) = item.milestone {
        return Some(m);
    }
    let text = item_text(item);
    if !contains_any(&text, AIRPORT) {
        return None;
    }
    if contains_any(&text, ARRIVAL) {
        return Some(Milestone::AirportArrival);
    }
    if contains_any(&text, DEPARTURE) {
        return Some(Milestone::AirportDeparture);
    }
    if contains_any(&text, TRANSFER) {
        return Some(Milestone::AirportTransfer);
    }
    None
}
