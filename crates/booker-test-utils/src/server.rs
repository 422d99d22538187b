//! In-process stand-in for the booking API.
//!
//! Mirrors the public service closely enough for offline end-to-end runs:
//! bad credentials still answer 200 with a `reason`, unauthenticated writes
//! get 403, writes to unknown ids get 405 and deletes answer 201.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use parking_lot::Mutex;
use rand::Rng;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::TestError;

pub const FAKE_USERNAME: &str = "admin";
pub const FAKE_PASSWORD: &str = "password123";

#[derive(Debug, Default)]
struct FakeState {
    bookings: BTreeMap<u64, Value>,
    next_id: u64,
    tokens: HashSet<String>,
}

impl FakeState {
    fn seeded() -> Self {
        let mut state = Self {
            next_id: 1,
            ..Self::default()
        };
        state.insert(json!({
            "firstname": "Jim",
            "lastname": "Brown",
            "totalprice": 111,
            "depositpaid": true,
            "bookingdates": {"checkin": "2018-01-01", "checkout": "2019-01-01"},
            "additionalneeds": "Breakfast"
        }));
        state.insert(json!({
            "firstname": "Sally",
            "lastname": "Jones",
            "totalprice": 340,
            "depositpaid": false,
            "bookingdates": {"checkin": "2024-05-01", "checkout": "2024-05-04"}
        }));
        state
    }

    fn insert(&mut self, booking: Value) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.bookings.insert(id, booking);
        id
    }
}

type SharedState = Arc<Mutex<FakeState>>;

/// A running fake booking API bound to an ephemeral local port
#[derive(Debug)]
pub struct FakeBooker {
    addr: SocketAddr,
    state: SharedState,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl FakeBooker {
    pub async fn start() -> Result<Self, TestError> {
        let state: SharedState = Arc::new(Mutex::new(FakeState::seeded()));
        let app = router(state.clone());

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let (shutdown, signal) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = signal.await;
            });
            if let Err(e) = server.await {
                error!("Fake booking server stopped: {}", e);
            }
        });

        info!("Fake booking API listening on {}", addr);
        Ok(Self {
            addr,
            state,
            shutdown: Some(shutdown),
            handle: Some(handle),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn booking_count(&self) -> usize {
        self.state.lock().bookings.len()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.state.lock().bookings.contains_key(&id)
    }

    /// Stop accepting connections and wait for the server task
    pub async fn stop(mut self) -> Result<(), TestError> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle
                .await
                .map_err(|e| TestError::Server(format!("server task failed: {e}")))?;
        }
        Ok(())
    }
}

impl Drop for FakeBooker {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/auth", post(create_token))
        .route("/booking", get(list_bookings).post(create_booking))
        .route(
            "/booking/:id",
            get(read_booking)
                .put(replace_booking)
                .patch(patch_booking)
                .delete(delete_booking),
        )
        .with_state(state)
}

fn plain(status: StatusCode) -> Response {
    (status, status.canonical_reason().unwrap_or_default()).into_response()
}

fn parse_body(body: &str) -> Result<Value, Response> {
    serde_json::from_str(body).map_err(|e| {
        debug!("Rejecting malformed body: {}", e);
        plain(StatusCode::BAD_REQUEST)
    })
}

/// First required field absent from a full booking
fn missing_field(booking: &Value) -> Option<&'static str> {
    for field in ["firstname", "lastname", "totalprice", "depositpaid", "bookingdates"] {
        if booking.get(field).is_none() {
            return Some(field);
        }
    }
    ["checkin", "checkout"]
        .into_iter()
        .find(|field| booking["bookingdates"].get(field).is_none())
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| pair.trim().strip_prefix("token=").map(str::to_string))
}

fn authorized(state: &FakeState, headers: &HeaderMap) -> bool {
    cookie_token(headers).is_some_and(|token| state.tokens.contains(&token))
}

/// Resolve `:id` for a write: 403 without a valid token, 405 for unknown ids
fn writable_id(state: &FakeState, headers: &HeaderMap, raw_id: &str) -> Result<u64, Response> {
    if !authorized(state, headers) {
        return Err(plain(StatusCode::FORBIDDEN));
    }
    match raw_id.parse::<u64>() {
        Ok(id) if state.bookings.contains_key(&id) => Ok(id),
        _ => Err(plain(StatusCode::METHOD_NOT_ALLOWED)),
    }
}

async fn create_token(State(state): State<SharedState>, body: String) -> Response {
    let credentials = match parse_body(&body) {
        Ok(credentials) => credentials,
        Err(response) => return response,
    };

    let valid = credentials["username"] == FAKE_USERNAME && credentials["password"] == FAKE_PASSWORD;
    if !valid {
        return Json(json!({"reason": "Bad credentials"})).into_response();
    }

    let token = format!("{:015x}", rand::thread_rng().gen::<u64>() & 0x0fff_ffff_ffff_ffff);
    state.lock().tokens.insert(token.clone());
    Json(json!({ "token": token })).into_response()
}

async fn list_bookings(
    State(state): State<SharedState>,
    Query(filters): Query<HashMap<String, String>>,
) -> Response {
    let state = state.lock();
    let text = |booking: &Value, field: &str| booking[field].as_str().map(str::to_string);
    let date = |booking: &Value, field: &str| {
        booking["bookingdates"][field].as_str().map(str::to_string)
    };

    let ids: Vec<Value> = state
        .bookings
        .iter()
        .filter(|(_, booking)| {
            filters.get("firstname").map_or(true, |v| text(booking, "firstname").as_ref() == Some(v))
                && filters.get("lastname").map_or(true, |v| text(booking, "lastname").as_ref() == Some(v))
                && filters
                    .get("checkin")
                    .map_or(true, |v| date(booking, "checkin").is_some_and(|d| d >= *v))
                && filters
                    .get("checkout")
                    .map_or(true, |v| date(booking, "checkout").is_some_and(|d| d >= *v))
        })
        .map(|(id, _)| json!({ "bookingid": id }))
        .collect();

    Json(Value::Array(ids)).into_response()
}

async fn create_booking(State(state): State<SharedState>, body: String) -> Response {
    let booking = match parse_body(&body) {
        Ok(booking) => booking,
        Err(response) => return response,
    };
    if let Some(field) = missing_field(&booking) {
        debug!("Rejecting booking without {}", field);
        return plain(StatusCode::BAD_REQUEST);
    }

    let id = state.lock().insert(booking.clone());
    Json(json!({ "bookingid": id, "booking": booking })).into_response()
}

async fn read_booking(State(state): State<SharedState>, Path(raw_id): Path<String>) -> Response {
    let state = state.lock();
    match raw_id.parse::<u64>().ok().and_then(|id| state.bookings.get(&id)) {
        Some(booking) => Json(booking.clone()).into_response(),
        None => plain(StatusCode::NOT_FOUND),
    }
}

async fn replace_booking(
    State(state): State<SharedState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let mut state = state.lock();
    let id = match writable_id(&state, &headers, &raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let booking = match parse_body(&body) {
        Ok(booking) => booking,
        Err(response) => return response,
    };
    if missing_field(&booking).is_some() {
        return plain(StatusCode::BAD_REQUEST);
    }

    state.bookings.insert(id, booking.clone());
    Json(booking).into_response()
}

async fn patch_booking(
    State(state): State<SharedState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let mut state = state.lock();
    let id = match writable_id(&state, &headers, &raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let patch = match parse_body(&body) {
        Ok(Value::Object(patch)) => patch,
        Ok(_) => return plain(StatusCode::BAD_REQUEST),
        Err(response) => return response,
    };

    let Some(booking) = state.bookings.get_mut(&id) else {
        return plain(StatusCode::METHOD_NOT_ALLOWED);
    };
    if let Value::Object(fields) = booking {
        fields.extend(patch);
    }
    Json(booking.clone()).into_response()
}

async fn delete_booking(
    State(state): State<SharedState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock();
    let id = match writable_id(&state, &headers, &raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    state.bookings.remove(&id);
    plain(StatusCode::CREATED)
}
