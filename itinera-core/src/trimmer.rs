//! Fit the first and last day around real flight clock times.
//!
//! Arrival day: nothing can happen before the traveler leaves the airport, so
//! every entry before `arrival + dwell` is dropped regardless of priority.
//!
//! Departure day: entries after the last usable minute are evicted by
//! priority (core entries are clamped, notable ones are clamped inside a
//! grace window, the rest go), a checkout/transfer entry closes the day, and
//! leftover time is offered to the gap-fill collaborator.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::category::airport_milestone;
use crate::clock::ClockTime;
use crate::collaborators::{
    ActivityRef, CostEstimator, CostRequest, GapRequest, GapScheduler, PlaceRef,
};
use crate::error::{EngineError, Result};
use crate::normalizer::settle;
use crate::plan::{Day, Item, Milestone, Plan, DEFAULT_PRIORITY};

/// Buffers and thresholds governing the trim, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimPolicy {
    /// Immigration and transfer allowance after landing.
    pub arrival_dwell_minutes: i32,
    /// Time at the airport before departure.
    pub checkin_buffer_minutes: i32,
    /// Checkout and transfer to the airport.
    pub checkout_buffer_minutes: i32,
    /// How far past the cutoff a notable entry may start and still be clamped.
    pub notable_grace_minutes: i32,
    /// Assumed duration of the last kept activity when measuring the gap.
    pub assumed_activity_minutes: i32,
    pub min_gap_minutes: i32,
    pub core_priority: u8,
    pub notable_priority: u8,
}

impl Default for TrimPolicy {
    fn default() -> Self {
        Self {
            arrival_dwell_minutes: 60,
            checkin_buffer_minutes: 180,
            checkout_buffer_minutes: 90,
            notable_grace_minutes: 30,
            assumed_activity_minutes: 60,
            min_gap_minutes: 60,
            core_priority: 80,
            notable_priority: 60,
        }
    }
}

impl TrimPolicy {
    pub fn feasible_start(&self, arrival: ClockTime) -> ClockTime {
        arrival.plus(self.arrival_dwell_minutes)
    }

    pub fn max_activity_time(&self, departure: ClockTime) -> ClockTime {
        departure
            .minus(self.checkin_buffer_minutes)
            .minus(self.checkout_buffer_minutes)
    }
}

/// Real flight clock times entered by the traveler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlightTimes {
    pub arrival: Option<ClockTime>,
    pub departure: Option<ClockTime>,
}

impl FlightTimes {
    pub fn parse(arrival: Option<&str>, departure: Option<&str>) -> Result<Self> {
        let times = Self {
            arrival: arrival.map(ClockTime::parse_input).transpose()?,
            departure: departure.map(ClockTime::parse_input).transpose()?,
        };
        if times.arrival.is_none() && times.departure.is_none() {
            return Err(EngineError::validation("an arrival or departure time is required"));
        }
        Ok(times)
    }
}

/// Unscheduled time left on the departure day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapWindow {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl GapWindow {
    pub fn minutes(&self) -> i32 {
        self.end.minutes_since(self.start)
    }

    pub fn contains(&self, t: ClockTime) -> bool {
        t >= self.start && t <= self.end
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    item: Item,
    inserted: bool,
}

/// A day being trimmed: surviving entries, which of them the trimmer
/// inserted, and what was evicted.
#[derive(Debug, Clone, PartialEq)]
pub struct DayTrim {
    day: Day,
    slots: Vec<Slot>,
    evicted: Vec<Item>,
    closes_with_checkout: bool,
}

fn logistics_item(time: ClockTime, place: &str, activity: &str, milestone: Milestone) -> Item {
    let mut item = Item::new(time.to_string(), place, activity)
        .with_priority(DEFAULT_PRIORITY)
        .with_milestone(milestone);
    item.clear_enrichment();
    item
}

impl DayTrim {
    pub fn new(day: &Day) -> Self {
        Self {
            day: day.clone(),
            slots: day
                .items
                .iter()
                .cloned()
                .map(|item| Slot { item, inserted: false })
                .collect(),
            evicted: Vec::new(),
            closes_with_checkout: false,
        }
    }

    pub fn evicted(&self) -> &[Item] {
        &self.evicted
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.slots.iter().map(|s| &s.item)
    }

    pub fn inserted_items(&self) -> impl Iterator<Item = &Item> {
        self.slots.iter().filter(|s| s.inserted).map(|s| &s.item)
    }

    fn sort(&mut self) {
        self.slots.sort_by_key(|slot| match slot.item.clock() {
            Some(t) => (0u8, t),
            None => (1u8, ClockTime::MIDNIGHT),
        });
    }

    fn push_inserted(&mut self, item: Item) {
        self.slots.push(Slot { item, inserted: true });
    }

    /// Arrival rule: regenerate airport milestones, evict everything before
    /// the feasible start.
    pub fn apply_arrival(mut self, arrival: ClockTime, policy: &TrimPolicy) -> Self {
        let feasible = policy.feasible_start(arrival);

        let mut kept = Vec::with_capacity(self.slots.len());
        for slot in std::mem::take(&mut self.slots) {
            if matches!(
                airport_milestone(&slot.item),
                Some(Milestone::AirportArrival | Milestone::AirportDeparture)
            ) {
                continue;
            }
            match slot.item.clock() {
                Some(t) if t < feasible => self.evicted.push(slot.item),
                _ => kept.push(slot),
            }
        }
        self.slots = kept;

        let has = |m: Milestone| self.slots.iter().any(|s| airport_milestone(&s.item) == Some(m));
        let mut synthesized = Vec::new();
        if !has(Milestone::AirportArrival) {
            synthesized.push(logistics_item(arrival, "Airport", "Airport arrival", Milestone::AirportArrival));
        }
        if !has(Milestone::AirportTransfer) {
            synthesized.push(logistics_item(
                feasible,
                "Airport",
                "Transfer from the airport into the city",
                Milestone::AirportTransfer,
            ));
        }
        // Front-loaded so logistics win ties against activities at the same minute.
        self.slots
            .splice(0..0, synthesized.into_iter().map(|item| Slot { item, inserted: true }));
        self.sort();

        debug!(
            date = %self.day.date,
            %feasible,
            evicted = self.evicted.len(),
            "arrival trim applied"
        );
        self
    }

    /// Departure rule: priority-based eviction past the cutoff, then a closing
    /// checkout/transfer entry. Returns the leftover gap, if any is worth
    /// filling.
    pub fn apply_departure(mut self, departure: ClockTime, policy: &TrimPolicy) -> (Self, Option<GapWindow>) {
        let max_activity = policy.max_activity_time(departure);
        let grace_limit = max_activity.plus(policy.notable_grace_minutes);

        let mut kept = Vec::with_capacity(self.slots.len());
        for mut slot in std::mem::take(&mut self.slots) {
            match airport_milestone(&slot.item) {
                Some(Milestone::AirportDeparture | Milestone::CheckoutTransfer) => continue,
                // Milestones this trim synthesized for a same-day arrival stay.
                Some(Milestone::AirportArrival) if !slot.inserted => continue,
                _ => {}
            }

            let Some(t) = slot.item.clock() else {
                kept.push(slot);
                continue;
            };
            if t <= max_activity {
                kept.push(slot);
                continue;
            }

            let priority = slot.item.priority();
            let clamp = priority >= policy.core_priority
                || (priority >= policy.notable_priority && t <= grace_limit);
            if clamp {
                slot.item.set_clock(max_activity);
                kept.push(slot);
            } else {
                self.evicted.push(slot.item);
            }
        }
        self.slots = kept;
        self.sort();

        let gap = self
            .slots
            .iter()
            .filter_map(|s| s.item.clock())
            .max()
            .and_then(|last| {
                let start = last.minutes() + policy.assumed_activity_minutes;
                let gap_minutes = max_activity.minutes() - start;
                (gap_minutes >= policy.min_gap_minutes).then(|| GapWindow {
                    start: ClockTime::from_minutes_saturating(start),
                    end: max_activity,
                })
            });

        self.push_inserted(logistics_item(
            max_activity,
            "",
            "Checkout and airport transfer",
            Milestone::CheckoutTransfer,
        ));
        self.closes_with_checkout = true;

        debug!(
            date = %self.day.date,
            %max_activity,
            evicted = self.evicted.len(),
            gap_minutes = gap.map(|g| g.minutes()),
            "departure trim applied"
        );
        (self, gap)
    }

    /// Insert gap-fill items, time-sorted, ahead of the closing checkout.
    pub fn insert_fillers(&mut self, mut fillers: Vec<Item>) {
        if fillers.is_empty() {
            return;
        }
        crate::plan::sort_by_clock(&mut fillers);
        let at = if self.closes_with_checkout {
            self.slots.len().saturating_sub(1)
        } else {
            self.slots.len()
        };
        let new_slots = fillers.into_iter().map(|item| Slot { item, inserted: true });
        self.slots.splice(at..at, new_slots);
    }

    /// Positions of inserted entries still lacking a cost estimate.
    pub fn uncosted_inserted(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.inserted && s.item.cost.unwrap_or(0) == 0)
            .map(|(i, _)| i)
            .collect()
    }

    fn set_cost(&mut self, position: usize, cost: i64) {
        if let Some(slot) = self.slots.get_mut(position) {
            slot.item.cost = Some(cost.max(0));
        }
    }

    pub fn into_day(self) -> Day {
        let mut day = self.day;
        day.items = self.slots.into_iter().map(|s| s.item).collect();
        day
    }
}

fn place_key(place: &str) -> String {
    place.trim().to_lowercase()
}

/// Places used anywhere in the trip, de-duplicated on place + activity.
pub fn places_in_use(plan: &Plan) -> Vec<PlaceRef> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for (_, item) in plan.items() {
        if item.place.trim().is_empty() {
            continue;
        }
        if seen.insert((item.place.clone(), item.activity.clone())) {
            out.push(PlaceRef {
                place: item.place.clone(),
                activity: item.activity.clone(),
                priority_score: item.priority(),
            });
        }
    }
    out
}

/// Keep filler items that fall inside the gap and visit a place not yet used.
pub fn accept_fillers(candidates: Vec<Item>, gap: GapWindow, used: &[PlaceRef]) -> Vec<Item> {
    let mut used: HashSet<String> = used.iter().map(|p| place_key(&p.place)).collect();
    let mut out = Vec::new();
    for item in candidates {
        let Some(t) = item.clock() else {
            warn!(time = %item.time, place = %item.place, "dropping gap filler with unreadable time");
            continue;
        };
        if !gap.contains(t) {
            warn!(%t, place = %item.place, "dropping gap filler outside the gap window");
            continue;
        }
        let key = place_key(&item.place);
        if !key.is_empty() && !used.insert(key) {
            debug!(place = %item.place, "dropping gap filler for an already visited place");
            continue;
        }
        out.push(item);
    }
    out
}

/// Outcome of applying flight times to a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimReport {
    pub plan: Plan,
    pub evicted: Vec<Item>,
    pub gap: Option<GapWindow>,
    pub gap_items: usize,
}

/// Applies real flight times, consulting the gap-fill and cost-estimation
/// collaborators. Collaborator failures degrade to an empty gap and zero
/// costs; the returned plan is always settled.
#[derive(Debug, Clone)]
pub struct TimeWindowTrimmer<G: GapScheduler, C: CostEstimator> {
    gaps: G,
    costs: C,
    policy: TrimPolicy,
}

impl<G: GapScheduler, C: CostEstimator> TimeWindowTrimmer<G, C> {
    pub fn new(gaps: G, costs: C, policy: TrimPolicy) -> Self {
        Self { gaps, costs, policy }
    }

    pub fn policy(&self) -> &TrimPolicy {
        &self.policy
    }

    pub async fn apply(&self, plan: &Plan, times: FlightTimes) -> Result<TrimReport> {
        if times.arrival.is_none() && times.departure.is_none() {
            return Err(EngineError::validation("an arrival or departure time is required"));
        }
        let last = plan
            .days
            .len()
            .checked_sub(1)
            .ok_or_else(|| EngineError::structural("plan has no days"))?;

        let mut out = plan.clone();
        if times.arrival.is_some() {
            out.arrival_time = times.arrival;
        }
        if times.departure.is_some() {
            out.departure_time = times.departure;
        }

        let mut first = times.arrival.map(|arrival| DayTrim::new(&plan.days[0]).apply_arrival(arrival, &self.policy));

        let mut final_day = None;
        let mut gap = None;
        if let Some(departure) = times.departure {
            let start = match (last, first.take()) {
                (0, Some(trimmed)) => trimmed,
                (_, pending) => {
                    first = pending;
                    DayTrim::new(&plan.days[last])
                }
            };
            let (trimmed, window) = start.apply_departure(departure, &self.policy);
            final_day = Some(trimmed);
            gap = window;
        }

        let mut gap_items = 0;
        if let (Some(window), Some(trimmed)) = (gap, final_day.as_mut()) {
            // De-duplicate against the trip as it will look after trimming.
            let mut snapshot = out.clone();
            if let Some(f) = &first {
                snapshot.days[0] = f.clone().into_day();
            }
            snapshot.days[last] = trimmed.clone().into_day();
            let fillers = self.fill_gap(&snapshot, last, trimmed, window).await;
            gap_items = fillers.len();
            trimmed.insert_fillers(fillers);
        }

        let mut evicted = Vec::new();
        for (index, trim) in [(0usize, first), (last, final_day)] {
            let Some(mut trim) = trim else { continue };
            self.estimate_inserted_costs(&out.destination, &mut trim).await;
            evicted.extend(trim.evicted().iter().cloned());
            out.days[index] = trim.into_day();
        }

        let settled = settle(&out);
        info!(
            plan_id = %plan.plan_id,
            evicted = evicted.len(),
            gap_items,
            total = settled.estimated_budget.total_amount,
            "flight times applied"
        );

        Ok(TrimReport {
            plan: settled,
            evicted,
            gap,
            gap_items,
        })
    }

    async fn fill_gap(&self, snapshot: &Plan, day_index: usize, trim: &DayTrim, gap: GapWindow) -> Vec<Item> {
        let all_places = places_in_use(snapshot);
        let existing_schedule: Vec<Item> = trim
            .items()
            .filter(|i| i.milestone != Some(Milestone::CheckoutTransfer))
            .cloned()
            .collect();
        let request = GapRequest {
            destination: snapshot.destination.clone(),
            gap_start_time: gap.start,
            gap_end_time: gap.end,
            date: snapshot.days[day_index].date,
            existing_schedule,
            all_places,
            budget: snapshot.estimated_budget.clone(),
        };

        match self.gaps.fill_gap(&request).await {
            Ok(response) => accept_fillers(response.items, gap, &request.all_places),
            Err(e) => {
                warn!(error = %e, "gap fill failed; leaving the gap empty");
                Vec::new()
            }
        }
    }

    async fn estimate_inserted_costs(&self, destination: &str, trim: &mut DayTrim) {
        let positions = trim.uncosted_inserted();
        if positions.is_empty() {
            return;
        }
        let items: Vec<&Item> = trim.items().collect();
        let request = CostRequest {
            destination: destination.to_string(),
            activities: positions.iter().map(|&p| ActivityRef::from(items[p])).collect(),
        };

        match self.costs.estimate(&request).await {
            Ok(response) => {
                for estimate in response.costs {
                    if let Some(&position) = positions.get(estimate.activity_index) {
                        trim.set_cost(position, estimate.cost);
                    }
                }
            }
            Err(e) => warn!(error = %e, "cost estimation failed; inserted items keep existing costs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(s: &str) -> ClockTime {
        ClockTime::parse(s).unwrap()
    }

    fn day(items: Vec<Item>) -> Day {
        Day::new(NaiveDate::from_ymd_opt(2026, 5, 3).unwrap()).with_items(items)
    }

    #[test]
    fn arrival_evicts_everything_before_feasible_start() {
        let d = day(vec![
            Item::new("09:00", "Gyeongbokgung", "Palace").with_priority(95),
            Item::new("20:30", "N Seoul Tower", "Night view").with_priority(90),
            Item::new("21:00", "Myeongdong", "Street food"),
            Item::new("22:00", "Hotel", "Check-in"),
        ]);
        let trimmed = DayTrim::new(&d).apply_arrival(t("20:00"), &TrimPolicy::default());

        assert_eq!(trimmed.evicted().len(), 2);
        for item in trimmed.items().filter(|i| i.milestone.is_none()) {
            assert!(item.clock().unwrap() >= t("21:00"), "{} survived", item.time);
        }
        let out = trimmed.into_day();
        assert_eq!(out.items[0].milestone, Some(Milestone::AirportArrival));
        assert_eq!(out.items[0].time, "20:00");
        assert_eq!(out.items[1].milestone, Some(Milestone::AirportTransfer));
        assert_eq!(out.items[1].time, "21:00");
        assert_eq!(out.items[2].place, "Myeongdong");
    }

    #[test]
    fn arrival_regenerates_existing_airport_milestones() {
        let d = day(vec![
            Item::new("23:00", "Incheon Airport", "Airport arrival"),
            Item::new("23:30", "AREX", "Airport express to the city"),
        ]);
        let out = DayTrim::new(&d).apply_arrival(t("14:00"), &TrimPolicy::default()).into_day();
        let arrivals: Vec<_> = out
            .items
            .iter()
            .filter(|i| airport_milestone(i) == Some(Milestone::AirportArrival))
            .collect();
        assert_eq!(arrivals.len(), 1);
        assert_eq!(arrivals[0].time, "14:00");
        // The surviving transfer suppresses a synthesized one.
        assert_eq!(out.items.len(), 2);
        assert_eq!(out.items[1].place, "AREX");
    }

    #[test]
    fn departure_applies_priority_rules() {
        let d = day(vec![
            Item::new("10:00", "Bukchon", "Walk").with_priority(45),
            Item::new("18:00", "Gyeongbokgung", "Palace").with_priority(85),
            Item::new("18:00", "Insadong", "Shopping").with_priority(50),
            Item::new("17:50", "Ikseondong", "Cafe street").with_priority(65),
            Item::new("18:30", "Cheonggyecheon", "Stream walk").with_priority(70),
            Item::new("21:30", "Incheon Airport", "Departure"),
        ]);
        let (trimmed, _) = DayTrim::new(&d).apply_departure(t("22:00"), &TrimPolicy::default());
        let evicted: Vec<_> = trimmed.evicted().iter().map(|i| i.place.as_str()).collect();
        assert_eq!(evicted, vec!["Insadong", "Cheonggyecheon"]);

        let out = trimmed.into_day();
        let palace = out.items.iter().find(|i| i.place == "Gyeongbokgung").unwrap();
        assert_eq!(palace.time, "17:30");
        let cafe = out.items.iter().find(|i| i.place == "Ikseondong").unwrap();
        assert_eq!(cafe.time, "17:30");

        let last = out.items.last().unwrap();
        assert_eq!(last.milestone, Some(Milestone::CheckoutTransfer));
        assert_eq!(last.time, "17:30");
        assert_eq!(last.priority_score, Some(10));
        assert!(last.image_search_link.is_none());
        assert!(!out.items.iter().any(|i| i.place == "Incheon Airport"));
    }

    #[test]
    fn notable_entry_at_end_of_grace_window_is_clamped() {
        let d = day(vec![
            Item::new("18:00", "Ikseondong", "Cafe street").with_priority(60),
            Item::new("18:01", "Insadong", "Tea house").with_priority(79),
            Item::new("18:00", "Jongmyo", "Shrine").with_priority(59),
        ]);
        let (trimmed, _) = DayTrim::new(&d).apply_departure(t("22:00"), &TrimPolicy::default());
        let evicted: Vec<_> = trimmed.evicted().iter().map(|i| i.place.as_str()).collect();
        assert_eq!(evicted, vec!["Insadong", "Jongmyo"]);

        let out = trimmed.into_day();
        let cafe = out.items.iter().find(|i| i.place == "Ikseondong").unwrap();
        assert_eq!(cafe.time, "17:30");
    }

    #[test]
    fn gap_threshold_is_inclusive_at_sixty_minutes() {
        let policy = TrimPolicy::default();
        let (_, gap) = DayTrim::new(&day(vec![Item::new("15:31", "Museum", "Visit")]))
            .apply_departure(t("22:00"), &policy);
        assert_eq!(gap, None);

        let (_, gap) = DayTrim::new(&day(vec![Item::new("15:30", "Museum", "Visit")]))
            .apply_departure(t("22:00"), &policy);
        assert_eq!(gap, Some(GapWindow { start: t("16:30"), end: t("17:30") }));
    }

    #[test]
    fn assumed_duration_is_configurable() {
        let policy = TrimPolicy {
            assumed_activity_minutes: 120,
            ..TrimPolicy::default()
        };
        let (_, gap) = DayTrim::new(&day(vec![Item::new("14:00", "Museum", "Visit")]))
            .apply_departure(t("22:00"), &policy);
        assert_eq!(gap.map(|g| g.start), Some(t("16:00")));
    }

    #[test]
    fn fillers_go_before_checkout() {
        let (mut trimmed, gap) = DayTrim::new(&day(vec![Item::new("12:00", "Museum", "Visit")]))
            .apply_departure(t("22:00"), &TrimPolicy::default());
        let gap = gap.unwrap();
        trimmed.insert_fillers(vec![
            Item::new("15:00", "Dongdaemun", "Design plaza"),
            Item::new("13:30", "Cafe Onion", "Coffee"),
        ]);
        let out = trimmed.into_day();
        let order: Vec<_> = out.items.iter().map(|i| i.time.as_str()).collect();
        assert_eq!(order, vec!["12:00", "13:30", "15:00", "17:30"]);
        assert_eq!(gap.end, t("17:30"));
    }

    #[test]
    fn fillers_outside_window_or_revisiting_are_dropped() {
        let gap = GapWindow { start: t("13:00"), end: t("17:30") };
        let used = vec![PlaceRef {
            place: "Gyeongbokgung".into(),
            activity: "Palace".into(),
            priority_score: 90,
        }];
        let accepted = accept_fillers(
            vec![
                Item::new("14:00", " gyeongbokgung ", "Again"),
                Item::new("18:00", "Lotte Tower", "Too late"),
                Item::new("soon", "Somewhere", "No time"),
                Item::new("15:00", "Seoul Forest", "Picnic"),
            ],
            gap,
            &used,
        );
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].place, "Seoul Forest");
    }

    #[test]
    fn flight_times_require_one_value() {
        assert!(FlightTimes::parse(None, None).is_err());
        assert!(FlightTimes::parse(Some("8pm"), None).is_err());
        let times = FlightTimes::parse(Some("20:00"), None).unwrap();
        assert_eq!(times.arrival, Some(t("20:00")));
    }
}
