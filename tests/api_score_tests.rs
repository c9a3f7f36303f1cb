// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! `GET /api/calculate-score` tests.

use axum::http::StatusCode;
use tower::ServiceExt;

mod common;
use common::{body_json, create_test_app, request, AirQualityMode, FakeUpstream, WeatherMode};

#[tokio::test]
async fn test_calculate_score_success() {
    let (app, _, _) = create_test_app(FakeUpstream::paris()).await;

    let response = app
        .oneshot(request("GET", "/api/calculate-score?city=Paris", None, None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["city"], "Paris");
    assert_eq!(body["country"], "France");
    assert_eq!(body["population"], 2_138_551);
    assert_eq!(body["airQualityRaw"], 22.5);
    assert_eq!(body["airQualityUnit"], "µg/m³");
    assert_eq!(body["temperatureRaw"], 288.15);
}

#[tokio::test]
async fn test_missing_city_is_rejected_without_external_calls() {
    let (app, _, fake) = create_test_app(FakeUpstream::paris()).await;

    let response = app
        .oneshot(request("GET", "/api/calculate-score", None, None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "City parameter is required.");
    assert_eq!(fake.total_calls(), 0);
}

#[tokio::test]
async fn test_blank_city_is_rejected_without_external_calls() {
    let (app, _, fake) = create_test_app(FakeUpstream::paris()).await;

    let response = app
        .oneshot(request("GET", "/api/calculate-score?city=%20%20", None, None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(fake.total_calls(), 0);
}

#[tokio::test]
async fn test_air_quality_outage_still_returns_score_inputs() {
    let fake = FakeUpstream::paris().with_air_quality(AirQualityMode::Fail);
    let (app, _, _) = create_test_app(fake).await;

    let response = app
        .oneshot(request("GET", "/api/calculate-score?city=Paris", None, None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["airQualityRaw"], 15.0);
    assert_eq!(body["airQualityUnit"], "µg/m³");
}

#[tokio::test]
async fn test_weather_outage_returns_500_with_message() {
    let fake = FakeUpstream::paris().with_weather(WeatherMode::Fail);
    let (app, _, _) = create_test_app(fake).await;

    let response = app
        .oneshot(request("GET", "/api/calculate-score?city=Paris", None, None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Failed to fetch city data from external APIs.");
    assert_eq!(
        body["error"],
        "OpenWeatherMap Error: HTTP 500 Internal Server Error"
    );
    // The upstream reply body is not echoed to clients.
    assert!(!body.to_string().contains("upstream exploded"));
    assert!(body.get("city").is_none());
}

/// An unknown city is reported as a server error, like other aggregation
/// failures, rather than as 404.
#[tokio::test]
async fn test_unknown_city_returns_500() {
    let (app, _, _) = create_test_app(FakeUpstream::paris().without_cities()).await;

    let response = app
        .oneshot(request("GET", "/api/calculate-score?city=Atlantis", None, None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "GeoDB Error: City not found via GeoDB.");
}
