// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use city_wellbeing::config::Config;
use city_wellbeing::db::FirestoreDb;
use city_wellbeing::middleware::api_key::API_KEY_HEADER;
use city_wellbeing::middleware::auth::{create_session_token, SESSION_COOKIE};
use city_wellbeing::models::User;
use city_wellbeing::routes::create_router;
use city_wellbeing::AppState;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Barrier;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

// ─── Fake external APIs ──────────────────────────────────────

/// How the fake OpenAQ endpoint answers.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum AirQualityMode {
    Measurement(f64, &'static str),
    Empty,
    Fail,
}

/// How the fake OpenWeatherMap endpoint answers.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum WeatherMode {
    Temperature(f64),
    Fail,
}

/// GeoDB, OpenAQ and OpenWeatherMap stand-ins served from one listener.
pub struct FakeUpstream {
    pub cities: Vec<Value>,
    pub air_quality: AirQualityMode,
    pub weather: WeatherMode,
    /// When set, the air quality and weather handlers both wait on it, so a
    /// request only succeeds if the two calls are in flight together.
    pub enrichment_barrier: Option<Arc<Barrier>>,
    pub geo_calls: AtomicUsize,
    pub air_quality_calls: AtomicUsize,
    pub weather_calls: AtomicUsize,
    pub geo_queries: Mutex<Vec<(HashMap<String, String>, HeaderMap)>>,
    pub weather_queries: Mutex<Vec<HashMap<String, String>>>,
}

#[allow(dead_code)]
impl FakeUpstream {
    /// Paris with a 22.5 µg/m³ reading and 288.15 K.
    pub fn paris() -> Self {
        Self {
            cities: vec![json!({
                "name": "Paris",
                "country": "France",
                "latitude": 48.856944,
                "longitude": 2.351389,
                "population": 2_138_551
            })],
            air_quality: AirQualityMode::Measurement(22.5, "µg/m³"),
            weather: WeatherMode::Temperature(288.15),
            enrichment_barrier: None,
            geo_calls: AtomicUsize::new(0),
            air_quality_calls: AtomicUsize::new(0),
            weather_calls: AtomicUsize::new(0),
            geo_queries: Mutex::new(Vec::new()),
            weather_queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_air_quality(mut self, mode: AirQualityMode) -> Self {
        self.air_quality = mode;
        self
    }

    pub fn with_weather(mut self, mode: WeatherMode) -> Self {
        self.weather = mode;
        self
    }

    pub fn without_cities(mut self) -> Self {
        self.cities.clear();
        self
    }

    pub fn with_enrichment_barrier(mut self) -> Self {
        self.enrichment_barrier = Some(Arc::new(Barrier::new(2)));
        self
    }

    pub fn total_calls(&self) -> usize {
        self.geo_calls.load(Ordering::SeqCst)
            + self.air_quality_calls.load(Ordering::SeqCst)
            + self.weather_calls.load(Ordering::SeqCst)
    }

    async fn wait_for_sibling(&self) -> bool {
        match &self.enrichment_barrier {
            Some(barrier) => tokio::time::timeout(Duration::from_millis(800), barrier.wait())
                .await
                .is_ok(),
            None => true,
        }
    }
}

fn upstream_failure() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
}

async fn fake_geo(
    State(fake): State<Arc<FakeUpstream>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    fake.geo_calls.fetch_add(1, Ordering::SeqCst);
    fake.geo_queries.lock().unwrap().push((params, headers));
    Json(json!({ "data": fake.cities }))
}

async fn fake_air_quality(State(fake): State<Arc<FakeUpstream>>) -> Response {
    fake.air_quality_calls.fetch_add(1, Ordering::SeqCst);
    if !fake.wait_for_sibling().await {
        return upstream_failure();
    }

    match &fake.air_quality {
        AirQualityMode::Measurement(value, unit) => Json(json!({
            "results": [{
                "location": "Paris Centre",
                "measurements": [{ "parameter": "pm25", "value": value, "unit": unit }]
            }]
        }))
        .into_response(),
        AirQualityMode::Empty => Json(json!({ "results": [] })).into_response(),
        AirQualityMode::Fail => upstream_failure(),
    }
}

async fn fake_weather(
    State(fake): State<Arc<FakeUpstream>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    fake.weather_calls.fetch_add(1, Ordering::SeqCst);
    fake.weather_queries.lock().unwrap().push(params);
    if !fake.wait_for_sibling().await {
        return upstream_failure();
    }

    match &fake.weather {
        WeatherMode::Temperature(temp) => {
            Json(json!({ "main": { "temp": temp, "humidity": 60 } })).into_response()
        }
        WeatherMode::Fail => upstream_failure(),
    }
}

/// Serve `fake` on an ephemeral loopback port and return its base URL.
pub async fn spawn_upstream(fake: FakeUpstream) -> (String, Arc<FakeUpstream>) {
    let fake = Arc::new(fake);
    let app = Router::new()
        .route("/v1/geo/cities", get(fake_geo))
        .route("/v2/latest", get(fake_air_quality))
        .route("/data/2.5/weather", get(fake_weather))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), fake)
}

// ─── App harness ─────────────────────────────────────────────

/// Test config whose external APIs all point at `upstream_base`.
pub fn test_config(upstream_base: &str) -> Config {
    Config {
        geodb_base_url: upstream_base.to_string(),
        openaq_base_url: upstream_base.to_string(),
        openweather_base_url: upstream_base.to_string(),
        ..Config::test_default()
    }
}

/// Create a test app backed by the in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, FirestoreDb::new_in_memory()).unwrap());
    (create_router(state.clone()), state)
}

/// Test app with the fake upstream APIs running.
#[allow(dead_code)]
pub async fn create_test_app(fake: FakeUpstream) -> (Router, Arc<AppState>, Arc<FakeUpstream>) {
    let (base, fake) = spawn_upstream(fake).await;
    let (app, state) = create_test_app_with_config(test_config(&base));
    (app, state, fake)
}

/// Create (or find) a user and return it with a session cookie header value.
#[allow(dead_code)]
pub async fn login(state: &AppState, external_id: &str) -> (User, String) {
    let user = state
        .db
        .find_or_create_user(external_id, &format!("User {external_id}"), None)
        .await
        .unwrap();
    let secret = state.config.session_secret.as_deref().unwrap();
    let token = create_session_token(&user.id, secret).unwrap();
    (user, format!("{SESSION_COOKIE}={token}"))
}

/// The API key the test config expects.
#[allow(dead_code)]
pub fn api_key(state: &AppState) -> String {
    state.config.client_api_key.clone().unwrap()
}

/// Build a request with optional API key, session cookie and JSON body.
#[allow(dead_code)]
pub fn request(
    method: &str,
    uri: &str,
    api_key: Option<&str>,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = api_key {
        builder = builder.header(API_KEY_HEADER, key);
    }
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
