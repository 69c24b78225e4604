#![cfg(feature = "web")]

mod common;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use common::{HEADERS, sample_records, write_csv};
use salesdash::app::{AppState, router};
use salesdash::config::DashboardConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn config_for(data_path: PathBuf) -> DashboardConfig {
    DashboardConfig {
        data_path,
        target: "127.0.0.1:0".to_string(),
        title: "Test Dashboard".to_string(),
        chart_width: 640,
        chart_height: 400,
    }
}

fn test_app() -> (TempDir, axum::Router) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.csv");
    write_csv(&path, &HEADERS, &sample_records()).unwrap();

    let config = config_for(path);
    (dir, router(Arc::new(AppState::new(&config))))
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8_lossy(&body).into_owned())
}

async fn rows_for(query: &str) -> u64 {
    let (_dir, app) = test_app();
    let (status, _, body) = get(app, &format!("/api/views{}", query)).await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["views"].as_array().unwrap().len(), 13);
    json["rows"].as_u64().unwrap()
}

#[tokio::test]
async fn dashboard_page_renders() {
    let (_dir, app) = test_app();
    let (status, content_type, body) = get(app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(body.contains("Test Dashboard"));
    assert_eq!(body.matches("<section class=\"panel\"").count(), 13);
}

#[tokio::test]
async fn filters_endpoint_lists_distinct_values() {
    let (_dir, app) = test_app();
    let (status, _, body) = get(app, "/api/filters").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["years"], serde_json::json!([2021, 2022]));
    assert_eq!(json["segments"], serde_json::json!(["Compact SUV", "Mid Size SUV"]));
    assert_eq!(json["engine_types"], serde_json::json!(["Diesel", "EV", "Petrol"]));
}

#[tokio::test]
async fn query_parameters_select_rows() {
    assert_eq!(rows_for("").await, 8);
    let query = "?applied=1&year=2022\
                 &segment=Compact%20SUV&segment=Mid%20Size%20SUV\
                 &engine=Diesel&engine=EV&engine=Petrol";
    assert_eq!(rows_for(query).await, 4);
    assert_eq!(rows_for("?segment=Compact%20SUV").await, 5);
    assert_eq!(rows_for("?year=2021&year=2022").await, 8);
}

#[tokio::test]
async fn submitted_form_with_nothing_checked_selects_nothing() {
    assert_eq!(rows_for("?applied=1").await, 0);
}

#[tokio::test]
async fn chart_endpoint_serves_svg() {
    let (_dir, app) = test_app();
    let (status, content_type, body) = get(app, "/chart/monthly-sales.svg?year=2021").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/svg+xml"));
    assert!(body.contains("<svg"));
    assert!(body.contains("Monthly Sales Trend"));
}

#[tokio::test]
async fn unknown_chart_is_not_found() {
    let (_dir, app) = test_app();
    let (status, _, _) = get(app, "/chart/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn csv_export_follows_filters() {
    let (_dir, app) = test_app();
    let (status, content_type, body) = get(app, "/export.csv?segment=Mid%20Size%20SUV").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/csv"));
    assert!(body.starts_with("Brand,Year,Month"));
    assert_eq!(body.lines().count(), 1 + 3);
}

#[tokio::test]
async fn missing_data_file_is_a_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(dir.path().join("absent.xlsx"));
    let app = router(Arc::new(AppState::new(&config)));
    let (status, _, body) = get(app, "/api/filters").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("Cannot open"));
}

#[tokio::test]
async fn state_reports_the_cached_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.csv");
    write_csv(&path, &HEADERS, &sample_records()).unwrap();

    let state = Arc::new(AppState::new(&config_for(path.clone())));
    assert!(state.source_path().is_none());

    let (status, _, _) = get(router(Arc::clone(&state)), "/api/filters").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.source_path(), Some(path.canonicalize().unwrap()));
}

#[tokio::test]
async fn scatter_points_carry_the_model_name() {
    let (_dir, app) = test_app();
    let (_, _, body) = get(app, "/api/views").await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();

    let scatter = json["views"]
        .as_array()
        .unwrap()
        .iter()
        .find(|v| v["id"] == "price-vs-share")
        .unwrap();
    assert_eq!(scatter["data"]["kind"], "scatter");
    let models: Vec<&str> = scatter["data"]["points"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["model"].as_str().unwrap())
        .collect();
    assert_eq!(models.len(), 8);
    assert!(models.contains(&"Scorpio N"));
}
