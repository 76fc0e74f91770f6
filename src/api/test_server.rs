//! In-process stand-in for the backend, used by the HTTP tests.
//!
//! Binds an axum router on 127.0.0.1:0, issues the XSRF cookie the way
//! Sanctum does, and records every request it sees.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use reqwest::Url;
use serde_json::{json, Value};

/// Decoded value of the cookie the test server issues.
pub const TEST_CSRF: &str = "test-token=";

/// Raw `Set-Cookie` value (percent-encoded, as Laravel sends it).
const SET_CSRF_COOKIE: &str = "XSRF-TOKEN=test-token%3D; Path=/";

/// Token returned by a successful login.
pub const TEST_BEARER: &str = "abc";

pub const TEST_PASSWORD: &str = "secret";

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub xsrf: Option<String>,
    pub requested_with: Option<String>,
}

#[derive(Clone)]
pub struct TestState {
    pub csrf_hits: Arc<AtomicUsize>,
    pub issue_cookie: Arc<AtomicBool>,
    pub fail_logout: Arc<AtomicBool>,
    pub fail_products: Arc<AtomicBool>,
    pub seen: Arc<Mutex<Vec<SeenRequest>>>,
    pub bodies: Arc<Mutex<Vec<Value>>>,
}

impl Default for TestState {
    fn default() -> Self {
        Self {
            csrf_hits: Arc::new(AtomicUsize::new(0)),
            issue_cookie: Arc::new(AtomicBool::new(true)),
            fail_logout: Arc::new(AtomicBool::new(false)),
            fail_products: Arc::new(AtomicBool::new(false)),
            seen: Arc::new(Mutex::new(Vec::new())),
            bodies: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl TestState {
    pub fn requests_to(&self, path: &str) -> Vec<SeenRequest> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    pub fn last_body(&self) -> Option<Value> {
        self.bodies.lock().unwrap().last().cloned()
    }
}

pub struct TestServer {
    pub base_url: String,
    pub state: TestState,
}

/// Start the server on an ephemeral port.
pub async fn spawn() -> TestServer {
    let state = TestState::default();

    let app = Router::new()
        .route("/sanctum/csrf-cookie", get(csrf_cookie))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/whoami", get(ok).post(ok))
        .route("/status/{code}", get(status_with_message))
        .route("/bare-status/{code}", get(bare_status))
        .route("/clients", get(list_clients).post(create_client))
        .route("/products", get(list_products).post(create_product))
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/{id}",
            get(show_order).put(update_order).delete(delete_order),
        )
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{}", addr),
        state,
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn record(State(state): State<TestState>, req: Request, next: Next) -> Response {
    let seen = SeenRequest {
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        authorization: header_str(req.headers(), "authorization"),
        xsrf: header_str(req.headers(), "x-xsrf-token"),
        requested_with: header_str(req.headers(), "x-requested-with"),
    };
    state.seen.lock().unwrap().push(seen);
    next.run(req).await
}

fn has_valid_csrf(headers: &HeaderMap) -> bool {
    header_str(headers, "x-xsrf-token").as_deref() == Some(TEST_CSRF)
}

fn session_expired() -> Response {
    (
        StatusCode::from_u16(419).unwrap(),
        Json(json!({"message": "CSRF token mismatch."})),
    )
        .into_response()
}

async fn csrf_cookie(State(state): State<TestState>) -> Response {
    state.csrf_hits.fetch_add(1, Ordering::SeqCst);
    if state.issue_cookie.load(Ordering::SeqCst) {
        ([(header::SET_COOKIE, SET_CSRF_COOKIE)], StatusCode::NO_CONTENT).into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

async fn login(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !has_valid_csrf(&headers) {
        return session_expired();
    }
    match body.get("password").and_then(|p| p.as_str()) {
        Some(TEST_PASSWORD) => Json(json!({"token": TEST_BEARER})).into_response(),
        Some("no-token") => Json(json!({"user": {"id": 1}})).into_response(),
        _ => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"message": "These credentials do not match our records."})),
        )
            .into_response(),
    }
}

async fn logout(State(state): State<TestState>, headers: HeaderMap) -> Response {
    if !has_valid_csrf(&headers) {
        return session_expired();
    }
    if state.fail_logout.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "Server Error"})),
        )
            .into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn ok() -> Json<Value> {
    Json(json!({}))
}

async fn status_with_message(Path(code): Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap();
    (
        status,
        Json(json!({"message": format!("status {} from test server", code)})),
    )
        .into_response()
}

async fn bare_status(Path(code): Path<u16>) -> Response {
    StatusCode::from_u16(code).unwrap().into_response()
}

fn client_json() -> Value {
    json!({"id": 1, "name": "Ana Souza", "email": "ana@example.com"})
}

fn order_json(id: u64) -> Value {
    json!({
        "id": id,
        "client": client_json(),
        "total": "26.00",
        "products": [
            {"id": 10, "name": "Widget", "price": "10.50",
             "pivot": {"quantity": 2, "unit_price": "10.50"}},
            {"id": 11, "name": "Gadget", "price": 5,
             "pivot": {"quantity": 1, "unit_price": 5}}
        ]
    })
}

async fn list_clients() -> Json<Value> {
    Json(json!([client_json()]))
}

async fn create_client(
    State(state): State<TestState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !has_valid_csrf(&headers) {
        return session_expired();
    }
    state.bodies.lock().unwrap().push(body.clone());
    let mut created = body;
    created["id"] = json!(2);
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn list_products(State(state): State<TestState>) -> Response {
    if state.fail_products.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "products unavailable"})),
        )
            .into_response();
    }
    Json(json!([
        {"id": 10, "name": "Widget", "price": "10.50"},
        {"id": 11, "name": "Gadget", "price": 5}
    ]))
    .into_response()
}

async fn create_product(
    State(state): State<TestState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !has_valid_csrf(&headers) {
        return session_expired();
    }
    state.bodies.lock().unwrap().push(body.clone());
    let mut created = body;
    created["id"] = json!(12);
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn list_orders() -> Json<Value> {
    Json(json!([order_json(1)]))
}

async fn show_order(Path(id): Path<u64>) -> Response {
    if id == 1 {
        Json(order_json(1)).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Order not found"})),
        )
            .into_response()
    }
}

async fn create_order(
    State(state): State<TestState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !has_valid_csrf(&headers) {
        return session_expired();
    }
    state.bodies.lock().unwrap().push(body);
    (StatusCode::CREATED, Json(order_json(7))).into_response()
}

async fn update_order(
    State(state): State<TestState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !has_valid_csrf(&headers) {
        return session_expired();
    }
    state.bodies.lock().unwrap().push(body);
    Json(order_json(id)).into_response()
}

async fn delete_order(headers: HeaderMap) -> Response {
    if !has_valid_csrf(&headers) {
        return session_expired();
    }
    StatusCode::NO_CONTENT.into_response()
}

/// Cookie store that always reports the same `Cookie` header and ignores
/// anything the server sets.
pub struct FixedCookies {
    header: HeaderValue,
}

impl FixedCookies {
    pub fn new(header: &'static str) -> Self {
        Self {
            header: HeaderValue::from_static(header),
        }
    }
}

impl CookieStore for FixedCookies {
    fn set_cookies(&self, _cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, _url: &Url) {}

    fn cookies(&self, _url: &Url) -> Option<HeaderValue> {
        Some(self.header.clone())
    }
}
