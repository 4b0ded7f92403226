use chrono::NaiveDate;
use mockito::Matcher;
use serde_json::json;

use itinera_core::{
    ActivityRef, Breakdown, Budget, BudgetRebalancer, ClockTime, CostEstimator, CostRequest,
    Day, EngineError, GapRequest, GapScheduler, Item, Plan, RealCosts, RebalancePolicy,
    TransportCoster, TransportRequest,
};
use itinera_services::{HttpServices, ServiceConfig};

fn services(url: String) -> HttpServices {
    HttpServices::new(ServiceConfig {
        base_url: url,
        people: 2,
        timeout_secs: 5,
    })
    .unwrap()
}

fn budget() -> Budget {
    Budget::settled(
        Breakdown {
            flight_cost: 800_000,
            accommodation_cost: 500_000,
            local_transport_cost: 100_000,
            food_and_drink_cost: 300_000,
            activities_and_tours_cost: 200_000,
            contingency_and_misc: 100_000,
        },
        "KRW",
    )
}

fn one_day_plan() -> Plan {
    let date = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
    Plan {
        plan_id: "plan-http".into(),
        destination: "Seoul".into(),
        start_date: date,
        end_date: date,
        arrival_time: None,
        departure_time: None,
        estimated_budget: budget(),
        summary: serde_json::Value::Null,
        days: vec![Day::new(date)],
    }
}

#[tokio::test]
async fn estimate_sends_party_size_and_sanitizes() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/estimate-activity-cost")
        .match_body(Matcher::PartialJson(json!({ "destination": "Seoul", "people": 2 })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "costs": [
                    { "activity_index": 1, "cost": 27000.4 },
                    { "activity_index": 9, "cost": -5 }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let request = CostRequest {
        destination: "Seoul".into(),
        activities: vec![
            ActivityRef::from(&Item::new("10:00", "Lotte World", "Theme park")),
            ActivityRef::from(&Item::new("14:00", "COEX Aquarium", "Aquarium")),
        ],
    };
    let out = services(server.url()).estimate(&request).await.unwrap();

    mock.assert_async().await;
    assert_eq!(out.costs.len(), 2);
    assert_eq!(out.costs[0].activity_index, 1);
    assert_eq!(out.costs[0].cost, 27_000);
    assert_eq!(out.costs[1].activity_index, 1);
    assert_eq!(out.costs[1].cost, 0);
}

#[tokio::test]
async fn gap_request_carries_window_and_budget_hint() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/generate-gap-schedule")
        .match_body(Matcher::PartialJson(json!({
            "gapStartTime": "16:30",
            "gapEndTime": "17:30",
            "date": "2026-05-03",
            "availableBudget": 140000
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "items": [
                    { "time": "16:45", "place": "Seoul Forest", "activity": "Picnic", "cost": 0 },
                    { "time": "17:00", "activity": "No place" }
                ],
                "totalCost": 0
            })
            .to_string(),
        )
        .create_async()
        .await;

    let request = GapRequest {
        destination: "Seoul".into(),
        gap_start_time: ClockTime::from_hm(16, 30).unwrap(),
        gap_end_time: ClockTime::from_hm(17, 30).unwrap(),
        date: NaiveDate::from_ymd_opt(2026, 5, 3).unwrap(),
        existing_schedule: vec![Item::new("15:30", "National Museum", "Exhibition")],
        all_places: vec![],
        budget: budget(),
    };
    let out = services(server.url()).fill_gap(&request).await.unwrap();

    mock.assert_async().await;
    assert_eq!(out.items.len(), 1);
    assert_eq!(out.items[0].place, "Seoul Forest");
    assert_eq!(out.items[0].priority_score, Some(20));
}

#[tokio::test]
async fn server_error_is_a_collaborator_failure() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/calculate-transport-cost")
        .with_status(500)
        .with_body("upstream timeout")
        .create_async()
        .await;

    let svc = services(server.url());
    let request = TransportRequest {
        destination: "Seoul".into(),
        route: vec!["Myeongdong".into(), "Hongdae".into()],
    };
    let err = svc.route_cost(&request).await.unwrap_err();
    assert!(matches!(err, EngineError::Collaborator(_)));

    let short = TransportRequest {
        destination: "Seoul".into(),
        route: vec!["Myeongdong".into()],
    };
    assert!(svc.route_cost(&short).await.is_err());
}

#[tokio::test]
async fn rebalance_through_service_settles_total() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/rebalance-budget")
        .match_body(Matcher::PartialJson(json!({
            "realFlightCost": 900000,
            "realAccommodationCost": 600000
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "estimated_budget": {
                    "total_amount": 2000000,
                    "currency": "KRW",
                    "breakdown": {
                        "flight_cost": 900000,
                        "accommodation_cost": 600000,
                        "local_transport_cost": 70000,
                        "food_and_drink_cost": 215000,
                        "activities_and_tours_cost": 144500,
                        "contingency_and_misc": 70000
                    }
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let rebalancer = BudgetRebalancer::new(services(server.url()), RebalancePolicy::default());
    let out = rebalancer
        .rebalance(&one_day_plan(), RealCosts::new(900_000, 600_000).unwrap())
        .await
        .unwrap();

    mock.assert_async().await;
    let b = &out.plan.estimated_budget;
    assert_eq!(b.total_amount, 2_000_000);
    assert!(b.is_settled());
    assert_eq!(b.breakdown.contingency_and_misc, 70_500);
}

#[tokio::test]
async fn rebalance_scales_route_that_echoes_original_local_figures() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/rebalance-budget")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "estimated_budget": {
                    "total_amount": 2000000,
                    "currency": "KRW",
                    "breakdown": {
                        "flight_cost": 900000,
                        "accommodation_cost": 600000,
                        "local_transport_cost": 100000,
                        "food_and_drink_cost": 300000,
                        "activities_and_tours_cost": 200000,
                        "contingency_and_misc": 100000
                    }
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let rebalancer = BudgetRebalancer::new(services(server.url()), RebalancePolicy::default());
    let out = rebalancer
        .rebalance(&one_day_plan(), RealCosts::new(900_000, 600_000).unwrap())
        .await
        .unwrap();

    mock.assert_async().await;
    let b = &out.plan.estimated_budget;
    assert_eq!(out.remaining_local_budget, 500_000);
    assert_eq!(b.total_amount, 2_000_000);
    assert!(b.is_settled());
    assert_eq!(b.breakdown.local_sum(), 500_000);
    assert_eq!(b.breakdown.food_and_drink_cost, 214_286);
    assert_eq!(b.breakdown.contingency_and_misc, 71_428);
}
