//! In-process stand-in for the SymptoCare backend

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{Value, json};
use symptocare::Notifier;

async fn predict(Json(body): Json<Value>) -> Response {
    let symptoms: Vec<String> = body["symptoms"]
        .as_array()
        .map(|list| {
            list.iter()
                .filter_map(|s| s.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    if symptoms.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No symptoms given" })),
        )
            .into_response();
    }
    if symptoms.iter().any(|s| s == "fever") {
        return Json(json!({ "disease": "Flu" })).into_response();
    }
    if symptoms.iter().any(|s| s == "crash") {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Json(json!({ "echo": symptoms })).into_response()
}

fn places(city: &str, label: &str) -> Response {
    match city {
        "Bengaluru" => Json(json!({
            "results": [{ "name": format!("City {label}"), "lat": 12.34567, "lon": 77.12345 }]
        }))
        .into_response(),
        "Chennai" => Json(json!({
            "results": [{ "name": format!("Marina {label}"), "lat": "13.0827", "lon": "80.2707" }]
        }))
        .into_response(),
        "Atlantis" => Json(json!({ "results": [] })).into_response(),
        "Lemuria" => Json(json!({ "results": null })).into_response(),
        "Nowhere" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("Failed to fetch {label} data") })),
        )
            .into_response(),
        other => Json(json!({
            "results": [{ "name": format!("{label} in {other}"), "lat": 0.0, "lon": 0.0 }]
        }))
        .into_response(),
    }
}

async fn hospitals(Query(params): Query<HashMap<String, String>>) -> Response {
    places(params.get("city").map_or("", String::as_str), "Hospital")
}

async fn medical_shops(Query(params): Query<HashMap<String, String>>) -> Response {
    places(params.get("city").map_or("", String::as_str), "Pharmacy")
}

async fn precautions(Json(body): Json<Value>) -> Response {
    match body["disease"].as_str().unwrap_or_default() {
        "Flu" => Json(json!({ "precautions": "1. Rest 2. Drink fluids" })).into_response(),
        "boom" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => Json(json!({})).into_response(),
    }
}

/// Start the stub on an ephemeral port and return its base URL
pub async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/predict-disease", post(predict))
        .route("/find-hospitals", get(hospitals))
        .route("/find-medicalshops", get(medical_shops))
        .route("/precautions", post(precautions));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub backend");
    let addr = listener.local_addr().expect("stub backend address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub backend");
    });
    format!("http://{addr}")
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
