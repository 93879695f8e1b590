mod common;

use chrono::{Duration, TimeZone, Utc};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::net::SocketAddr;

use renewcast::api;
use renewcast::controller::AppState;
use renewcast::domain::{ForecastPoint, PredictionInput, PredictionResult};
use renewcast::storage::PredictionFileStore;

async fn spawn_server(state: AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, api::router(state)).await.unwrap();
    });
    addr
}

fn stored_result() -> PredictionResult {
    let start = Utc.with_ymd_and_hms(2023, 8, 19, 0, 0, 0).unwrap();
    PredictionResult {
        input: PredictionInput {
            country: "DE".into(),
            model: "DE_v1".into(),
            percent_renewable: vec![50; 3],
            start: "202308182100".into(),
            end: "202308182300".into(),
        },
        output: (0..3)
            .map(|h| ForecastPoint {
                start_time_utc: start + Duration::hours(h),
                percent_renewable_forecast: 50 + h,
            })
            .collect(),
    }
}

async fn setup() -> (tempfile::TempDir, SocketAddr) {
    let dir = tempfile::tempdir().unwrap();
    let cfg = common::test_config(dir.path(), None);
    PredictionFileStore::new(cfg.storage.predictions_dir.clone())
        .save(&stored_result())
        .unwrap();
    let addr = spawn_server(AppState::new(cfg)).await;
    (dir, addr)
}

#[tokio::test]
async fn test_get_predictions_returns_stored_points() {
    let (_dir, addr) = setup().await;
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/get_predictions"))
        .json(&json!({"country_code": "de"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["country"], "DE");
    assert_eq!(body["metadata"]["total_count"], 3);
    assert_eq!(
        body["data"]["predictions"][1],
        json!({"startTimeUTC": "202308190100", "percentRenewableForecast": 51})
    );
}

#[tokio::test]
async fn test_missing_country_code_is_bad_request() {
    let (_dir, addr) = setup().await;
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/get_predictions"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "BadRequest");

    let resp = client
        .post(format!("http://{addr}/get_predictions"))
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_or_empty_country() {
    let (_dir, addr) = setup().await;
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/get_predictions"))
        .json(&json!({"country_code": "FR"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .post(format!("http://{addr}/get_predictions"))
        .json(&json!({"country_code": "../etc/passwd"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_healthz() {
    let (_dir, addr) = setup().await;
    let resp = reqwest::get(format!("http://{addr}/healthz")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["predictions_dir"], true);
}
