//! HTTP gateway against an in-process backend
//!
//! An axum router stands in for the diet planner backend. Each test checks
//! what the gateway sends and how it classifies what comes back.

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use planner_core::gateway::{DoctorReminderRequest, LoginRequest};
use planner_core::{
    BackendGateway, CheckupFrequency, GatewayError, HttpGateway, MealSlot, Operation,
    SelectedFoods, UserId, Weekday,
};

fn oats() -> Value {
    json!({
        "food": "Oats",
        "calories": 150,
        "protein": 5,
        "carbs": 27,
        "fat": 3,
        "veg_type": "veg"
    })
}

fn backend() -> Router {
    Router::new()
        .route(
            "/login",
            post(|Json(body): Json<Value>| async move {
                if body["password"] == "pw" {
                    (
                        StatusCode::OK,
                        Json(json!({
                            "user_id": 7,
                            "has_active_plan": true,
                            "plan_is_current_week": false
                        })),
                    )
                } else {
                    (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({ "error": "Invalid credentials" })),
                    )
                }
            }),
        )
        .route(
            "/available_foods/:user_id",
            get(|Path(user_id): Path<u64>| async move {
                assert_eq!(user_id, 7);
                Json(json!({
                    "foods_by_meal": { "morning": [oats()], "afternoon": [], "dinner": [] }
                }))
            }),
        )
        .route(
            "/generate_weekly_meal_plan",
            post(|Json(body): Json<Value>| async move {
                let picked = body["selected_foods"]["morning"][0]["food"].clone();
                Json(json!({
                    "meal_plan": {
                        "Monday": {
                            "morning": [{
                                "food": picked,
                                "calories": 150,
                                "protein": 5,
                                "fat": 3,
                                "carbs": 27,
                                "veg_type": "veg",
                                "isUserSelected": true
                            }]
                        }
                    }
                }))
            }),
        )
        .route(
            "/get_saved_meal_plan/:user_id",
            get(|| async { Json(json!({ "message": "No saved plan" })) }),
        )
        .route(
            "/mark_consumed_for_date",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["meal_type"], "afternoon");
                assert_eq!(body["date"], "2024-03-04");
                assert_eq!(body["foods"].as_array().map(Vec::len), Some(1));
                Json(json!({
                    "success": true,
                    "message": "Meal marked as consumed",
                    "consumed": true
                }))
            }),
        )
        .route(
            "/get_consumption_status/:user_id",
            get(|| async {
                Json(json!({ "consumption_status": { "2024-03-04": { "morning": true } } }))
            }),
        )
        .route(
            "/get_day_completion_status/:user_id",
            get(|| async { "maintenance" }),
        )
        .route(
            "/health_dashboard/:user_id",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route(
            "/chat",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["user_id"], 7);
                assert_eq!(body["current_day"], "Monday");
                assert!(body["meal_plan"].is_null());
                Json(json!({ "response": format!("You asked: {}", body["message"].as_str().unwrap_or("")) }))
            }),
        )
        .route(
            "/test_push/:user_id",
            post(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": "No push subscription found" })),
                )
            }),
        )
        .route(
            "/check_reminders/:user_id",
            get(|Query(query): Query<HashMap<String, String>>| async move {
                if query.get("force_check").map(String::as_str) == Some("true") {
                    (
                        StatusCode::OK,
                        Json(json!({
                            "success": true,
                            "reminders": [{ "type": "meal" }],
                            "total_active_reminders": 3
                        })),
                    )
                } else {
                    (StatusCode::BAD_REQUEST, Json(json!({})))
                }
            }),
        )
        .route(
            "/setup_doctor_reminder",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["doctor_type"], "General Checkup");
                assert_eq!(body["frequency"], "yearly");
                Json(json!({
                    "success": true,
                    "next_reminder": "2025-01-10",
                    "frequency": "yearly"
                }))
            }),
        )
}

async fn serve() -> HttpGateway {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, backend()).await.unwrap();
    });
    HttpGateway::new(format!("http://{addr}"), Duration::from_secs(5))
}

fn login(password: &str) -> LoginRequest {
    LoginRequest {
        name: "asha".to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_login_success_and_plan_flags() {
    let gateway = serve().await;

    let response = gateway.login(&login("pw")).await.unwrap();
    assert_eq!(response.user_id, UserId(7));
    assert!(response.has_active_plan);
    assert!(!response.resumes_plan());
}

#[tokio::test]
async fn test_login_error_text_is_surfaced() {
    let gateway = serve().await;

    let err = gateway.login(&login("wrong")).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.user_message(), "Invalid credentials");
}

#[tokio::test]
async fn test_foods_and_generated_plan() {
    let gateway = serve().await;

    let foods = gateway.list_available_foods(UserId(7)).await.unwrap();
    let oats = foods.for_slot(MealSlot::Morning)[0].clone();
    assert_eq!(oats.food, "Oats");
    assert!(foods.for_slot(MealSlot::Dinner).is_empty());

    let mut selected = SelectedFoods::new();
    selected.toggle(MealSlot::Morning, oats);
    let plan = gateway
        .generate_weekly_plan(UserId(7), &selected)
        .await
        .unwrap();

    let monday = plan.meals(Weekday::Monday, MealSlot::Morning);
    assert_eq!(monday.len(), 1);
    assert_eq!(monday[0].food, "Oats");
    assert!(monday[0].is_user_selected);
    assert!(plan.meals(Weekday::Tuesday, MealSlot::Morning).is_empty());
}

#[tokio::test]
async fn test_missing_meal_plan_is_missing_field() {
    let gateway = serve().await;

    let err = gateway.load_saved_plan(UserId(7)).await.unwrap_err();
    assert_eq!(
        err,
        GatewayError::MissingField {
            operation: Operation::LoadSavedPlan,
            field: "meal_plan",
        }
    );
}

#[tokio::test]
async fn test_mark_consumed_sends_slot_date_and_foods() {
    let gateway = serve().await;
    let plan_foods = vec![planner_core::MealRecord {
        food: "Dal".to_string(),
        calories: 200.0,
        protein: 9.0,
        fat: 4.0,
        carbs: 30.0,
        veg_type: "veg".to_string(),
        is_user_selected: false,
    }];

    let response = gateway
        .mark_consumed(UserId(7), MealSlot::Afternoon, "2024-03-04", &plan_foods)
        .await
        .unwrap();
    assert!(response.success);
    assert_eq!(response.consumed, Some(true));

    let status = gateway.fetch_consumption_status(UserId(7)).await.unwrap();
    assert!(status.is_consumed("2024-03-04", MealSlot::Morning));
    assert!(!status.is_consumed("2024-03-04", MealSlot::Dinner));
}

#[tokio::test]
async fn test_non_json_body_is_decode_error() {
    let gateway = serve().await;

    let err = gateway.fetch_day_completion(UserId(7)).await.unwrap_err();
    assert!(matches!(err, GatewayError::Decode { .. }));
}

#[tokio::test]
async fn test_empty_error_body_uses_fallback() {
    let gateway = serve().await;

    let err = gateway.fetch_health_dashboard(UserId(7)).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.user_message(), "Failed to load dashboard");
}

#[tokio::test]
async fn test_chat_carries_day_and_user() {
    let gateway = serve().await;

    let reply = gateway
        .send_chat_message(Some(UserId(7)), "lunch?", Weekday::Monday, None)
        .await
        .unwrap();
    assert_eq!(reply, "You asked: lunch?");
}

#[tokio::test]
async fn test_test_push_not_found_keeps_status() {
    let gateway = serve().await;

    let err = gateway.trigger_test_push(UserId(7)).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.operation(), Operation::TriggerTestPush);
}

#[tokio::test]
async fn test_check_reminders_forces_check() {
    let gateway = serve().await;

    let response = gateway.check_reminders(UserId(7)).await.unwrap();
    assert!(response.success);
    assert_eq!(response.reminders.len(), 1);
    assert_eq!(response.total_active_reminders, 3);
}

#[tokio::test]
async fn test_doctor_reminder_round_trip() {
    let gateway = serve().await;

    let request = DoctorReminderRequest {
        user_id: UserId(7),
        doctor_type: "General Checkup",
        last_visit_date: "2024-01-10",
        frequency: CheckupFrequency::Yearly,
        reminder_time: "10:00",
    };
    let response = gateway.setup_doctor_reminder(&request).await.unwrap();
    assert!(response.success);
    assert_eq!(response.next_reminder, "2025-01-10");
    assert_eq!(response.error, None);
}
