//! Integration test harness for Maison d'Assiettes.
//!
//! Spins up in-process stand-ins for the hosted backend (identity, row API,
//! object storage) and for the card processor, then wires the real clients to
//! them over loopback HTTP. The storefront and the payment proxy run their
//! production request paths; only the far end of each socket is fake.
//!
//! # Usage
//!
//! ```rust,ignore
//! let ctx = TestContext::start().await;
//! let user = ctx.backend.seed_customer("claire@example.com");
//! let mut app = ctx.app();
//! app.sign_in("claire@example.com", TEST_PASSWORD).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
// Harness code: a panic is the intended failure mode.
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::body::Bytes;
use axum::extract::{Form, Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, post, put};
use axum::{Json, Router};
use chrono::DateTime;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use uuid::Uuid;

use maison_payment_proxy::config::ProxyConfig;
use maison_payment_proxy::routes as proxy_routes;
use maison_payment_proxy::state::ProxyState;
use maison_storefront::app::App;
use maison_storefront::checkout::CheckoutPolicy;
use maison_storefront::config::{BackendConfig, StorefrontConfig};

/// Password every seeded account uses.
pub const TEST_PASSWORD: &str = "plates-forever";

/// Seconds-since-epoch base for deterministic row timestamps.
const CLOCK_BASE: i64 = 1_770_000_000;

// =============================================================================
// Mock hosted backend
// =============================================================================

#[derive(Clone)]
struct MockUser {
    id: Uuid,
    email: String,
    password: String,
    display_name: Option<String>,
    confirmed: bool,
}

struct BackendInner {
    users: Vec<MockUser>,
    tables: HashMap<String, Vec<Value>>,
    /// Tables whose next row request fails once, then behaves again.
    fail_once: Vec<String>,
    uploads: Vec<String>,
    auto_confirm: bool,
    next_id: i64,
    clock_seq: i64,
}

impl Default for BackendInner {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            tables: HashMap::new(),
            fail_once: Vec::new(),
            uploads: Vec::new(),
            auto_confirm: true,
            next_id: 0,
            clock_seq: 0,
        }
    }
}

impl BackendInner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn next_timestamp(&mut self) -> String {
        self.clock_seq += 1;
        DateTime::from_timestamp(CLOCK_BASE + self.clock_seq * 60, 0)
            .unwrap()
            .to_rfc3339()
    }
}

#[derive(Clone, Default)]
struct BackendState(Arc<Mutex<BackendInner>>);

impl BackendState {
    fn lock(&self) -> MutexGuard<'_, BackendInner> {
        self.0.lock().unwrap()
    }
}

/// In-process stand-in for the hosted auth + row + storage service.
pub struct MockBackend {
    /// Base URL to hand to [`BackendConfig`].
    pub base_url: String,
    state: BackendState,
}

impl MockBackend {
    /// Bind an ephemeral loopback port and start serving.
    pub async fn start() -> Self {
        let state = BackendState::default();
        let router = backend_router(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Register a confirmed account. Password is [`TEST_PASSWORD`].
    pub fn seed_user(&self, email: &str) -> Uuid {
        self.seed_user_with(email, true)
    }

    /// Register an account that still needs email confirmation.
    pub fn seed_unconfirmed_user(&self, email: &str) -> Uuid {
        self.seed_user_with(email, false)
    }

    fn seed_user_with(&self, email: &str, confirmed: bool) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().users.push(MockUser {
            id,
            email: email.to_string(),
            password: TEST_PASSWORD.to_string(),
            display_name: None,
            confirmed,
        });
        id
    }

    /// Insert a profile row directly, as if provisioned earlier.
    pub fn seed_profile(&self, id: Uuid, display_name: &str, role: &str) {
        let mut inner = self.state.lock();
        let created_at = inner.next_timestamp();
        inner.tables.entry("profiles".into()).or_default().push(json!({
            "id": id,
            "display_name": display_name,
            "email": format!("{}@example.com", display_name.to_lowercase()),
            "role": role,
            "created_at": created_at,
        }));
    }

    /// Confirmed account plus a customer profile row.
    pub fn seed_customer(&self, email: &str) -> Uuid {
        let id = self.seed_user(email);
        self.seed_profile(id, "Claire", "customer");
        id
    }

    /// Confirmed account plus an admin profile row.
    pub fn seed_admin(&self, email: &str) -> Uuid {
        let id = self.seed_user(email);
        self.seed_profile(id, "Margaux", "admin");
        id
    }

    /// Insert a catalog item; returns its row id.
    pub fn seed_item(&self, title: &str, price: i64) -> i64 {
        let mut inner = self.state.lock();
        let id = inner.next_id();
        inner.tables.entry("items".into()).or_default().push(json!({
            "id": id,
            "title": title,
            "price": price,
            "img": "/images/test-plate.png",
            "type": "Dinner Plate",
            "origin": "French (Limoges)",
            "era": 1900,
            "material": "Porcelain",
            "date": "Mar 1, 2026",
        }));
        id
    }

    /// Insert an order row for a user; returns its row id.
    pub fn seed_order(&self, user_id: Uuid, status: &str) -> i64 {
        let mut inner = self.state.lock();
        let id = inner.next_id();
        let placed_at = inner.next_timestamp();
        inner.tables.entry("orders".into()).or_default().push(json!({
            "id": id,
            "user_id": user_id,
            "subtotal": "250",
            "shipping": "150",
            "total": "400",
            "status": status,
            "shipping_address": { "address": "12 Rue des Plats, Lyon" },
            "payment_method": "cod",
            "notes": "",
            "placed_at": placed_at,
        }));
        id
    }

    /// Insert an unread notification for a user; returns its row id.
    pub fn seed_notification(&self, user_id: Uuid, title: &str) -> i64 {
        let mut inner = self.state.lock();
        let id = inner.next_id();
        let created_at = inner.next_timestamp();
        inner
            .tables
            .entry("notifications".into())
            .or_default()
            .push(json!({
                "id": id,
                "user_id": user_id,
                "title": title,
                "message": "Your order is on its way.",
                "is_read": false,
                "created_at": created_at,
            }));
        id
    }

    /// Snapshot of a table's rows.
    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state.lock().tables.get(table).cloned().unwrap_or_default()
    }

    /// Number of rows currently in a table.
    #[must_use]
    pub fn table_len(&self, table: &str) -> usize {
        self.rows(table).len()
    }

    /// Paths of every object uploaded so far, as `bucket/path`.
    #[must_use]
    pub fn uploads(&self) -> Vec<String> {
        self.state.lock().uploads.clone()
    }

    /// Make the next request touching `table` fail with a 500.
    pub fn fail_next(&self, table: &str) {
        self.state.lock().fail_once.push(table.to_string());
    }

    /// Toggle whether sign-up returns a session or asks for confirmation.
    pub fn set_auto_confirm(&self, on: bool) {
        self.state.lock().auto_confirm = on;
    }
}

fn backend_router(state: BackendState) -> Router {
    Router::new()
        .route("/auth/v1/token", post(auth_token))
        .route("/auth/v1/signup", post(auth_signup))
        .route("/auth/v1/logout", post(auth_no_content))
        .route("/auth/v1/user", put(auth_empty_ok))
        .route("/auth/v1/resend", post(auth_empty_ok))
        .route("/auth/v1/recover", post(auth_empty_ok))
        .route("/rest/v1/{table}", any(rest_table))
        .route("/storage/v1/object/{bucket}/{*path}", post(storage_upload))
        .with_state(state)
}

fn session_payload(user: &MockUser) -> Value {
    json!({
        "access_token": format!("access-{}", user.id),
        "refresh_token": format!("refresh-{}", user.id),
        "user": {
            "id": user.id,
            "email": user.email,
            "user_metadata": { "display_name": user.display_name },
            "identities": [{ "provider": "email" }],
        },
    })
}

fn auth_error(code: &str, msg: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error_code": code, "msg": msg })),
    )
        .into_response()
}

async fn auth_token(State(state): State<BackendState>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let inner = state.lock();
    let Some(user) = inner.users.iter().find(|u| u.email == email) else {
        return auth_error("invalid_credentials", "Invalid login credentials");
    };
    if user.password != password {
        return auth_error("invalid_credentials", "Invalid login credentials");
    }
    if !user.confirmed {
        return auth_error("email_not_confirmed", "Email not confirmed");
    }
    Json(session_payload(user)).into_response()
}

async fn auth_signup(State(state): State<BackendState>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();
    let display_name = body["data"]["display_name"]
        .as_str()
        .map(std::string::ToString::to_string);

    let mut inner = state.lock();
    if inner.users.iter().any(|u| u.email == email) {
        // The real service masks duplicates as a user with no identities.
        return Json(json!({ "id": Uuid::new_v4(), "email": email, "identities": [] }))
            .into_response();
    }
    let user = MockUser {
        id: Uuid::new_v4(),
        email,
        password,
        display_name,
        confirmed: inner.auto_confirm,
    };
    inner.users.push(user.clone());
    if user.confirmed {
        Json(session_payload(&user)).into_response()
    } else {
        Json(json!({
            "id": user.id,
            "email": user.email,
            "identities": [{ "provider": "email" }],
        }))
        .into_response()
    }
}

async fn auth_no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn auth_empty_ok() -> Json<Value> {
    Json(json!({}))
}

async fn storage_upload(
    State(state): State<BackendState>,
    Path((bucket, path)): Path<(String, String)>,
    _body: Bytes,
) -> Json<Value> {
    let key = format!("{bucket}/{path}");
    state.lock().uploads.push(key.clone());
    Json(json!({ "Key": key }))
}

/// Generic row endpoint: filters, ordering, embedding, and the four verbs.
async fn rest_table(
    State(state): State<BackendState>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut inner = state.lock();

    if let Some(pos) = inner.fail_once.iter().position(|t| *t == table) {
        inner.fail_once.remove(pos);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "injected failure" })),
        )
            .into_response();
    }

    let mut select = String::from("*");
    let mut order: Option<(String, bool)> = None;
    let mut filters: Vec<(String, String)> = Vec::new();
    for (key, value) in &params {
        match key.as_str() {
            "select" => select = value.clone(),
            "order" => {
                let (col, dir) = value.rsplit_once('.').unwrap_or((value.as_str(), "asc"));
                order = Some((col.to_string(), dir == "desc"));
            }
            _ => {
                if let Some(v) = value.strip_prefix("eq.") {
                    filters.push((key.clone(), v.to_string()));
                }
            }
        }
    }

    match method {
        Method::GET => {
            let mut rows: Vec<Value> = inner
                .tables
                .get(&table)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .filter(|row| matches_filters(row, &filters))
                .collect();
            if let Some((col, desc)) = order {
                sort_rows(&mut rows, &col, desc);
            }
            let shaped: Vec<Value> = rows
                .into_iter()
                .map(|row| shape_row(&inner.tables, row, &select))
                .collect();
            Json(shaped).into_response()
        }
        Method::POST => {
            let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
            let incoming = match payload {
                Value::Array(list) => list,
                object @ Value::Object(_) => vec![object],
                _ => Vec::new(),
            };
            let prefer = header_string(&headers, "prefer");
            let mut created: Vec<Value> = Vec::new();
            for mut row in incoming {
                autofill_row(&table, &mut row, &mut inner);
                let rows = inner.tables.entry(table.clone()).or_default();
                if prefer.contains("merge-duplicates") {
                    if let Some(existing) =
                        rows.iter_mut().find(|r| r.get("id") == row.get("id"))
                    {
                        merge_into(existing, &row);
                        created.push(existing.clone());
                        continue;
                    }
                }
                rows.push(row.clone());
                created.push(row);
            }
            if prefer.contains("return=representation") {
                if header_string(&headers, "accept").contains("vnd.pgrst.object") {
                    Json(created.into_iter().next().unwrap_or(Value::Null)).into_response()
                } else {
                    Json(created).into_response()
                }
            } else {
                StatusCode::CREATED.into_response()
            }
        }
        Method::PATCH => {
            let patch: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
            if let (Some(fields), Some(rows)) =
                (patch.as_object(), inner.tables.get_mut(&table))
            {
                for row in rows.iter_mut().filter(|r| matches_filters(r, &filters)) {
                    if let Some(target) = row.as_object_mut() {
                        for (key, value) in fields {
                            target.insert(key.clone(), value.clone());
                        }
                    }
                }
            }
            StatusCode::NO_CONTENT.into_response()
        }
        Method::DELETE => {
            let mut removed: Vec<Value> = Vec::new();
            if let Some(rows) = inner.tables.get_mut(&table) {
                rows.retain(|row| {
                    if matches_filters(row, &filters) {
                        removed.extend(row.get("id").cloned());
                        false
                    } else {
                        true
                    }
                });
            }
            // The hosted schema cascades item deletes to dependent rows.
            if table == "items" {
                for child in ["cart_items", "favorites", "seller_items"] {
                    if let Some(rows) = inner.tables.get_mut(child) {
                        rows.retain(|row| {
                            row.get("item_id").is_none_or(|id| !removed.contains(id))
                        });
                    }
                }
            }
            StatusCode::NO_CONTENT.into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Fill server-generated columns the way the hosted service would.
fn autofill_row(table: &str, row: &mut Value, inner: &mut BackendInner) {
    let id = inner.next_id();
    let timestamp = inner.next_timestamp();
    let Some(obj) = row.as_object_mut() else {
        return;
    };
    if !obj.contains_key("id") {
        obj.insert("id".into(), json!(id));
    }
    match table {
        "profiles" | "notifications" => {
            obj.entry("created_at").or_insert_with(|| json!(timestamp));
        }
        "orders" => {
            obj.entry("placed_at").or_insert_with(|| json!(timestamp));
        }
        _ => {}
    }
}

fn merge_into(existing: &mut Value, update: &Value) {
    if let (Some(target), Some(fields)) = (existing.as_object_mut(), update.as_object()) {
        for (key, value) in fields {
            target.insert(key.clone(), value.clone());
        }
    }
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn matches_filters(row: &Value, filters: &[(String, String)]) -> bool {
    filters
        .iter()
        .all(|(col, expected)| row.get(col).is_some_and(|v| scalar_string(v) == *expected))
}

fn sort_rows(rows: &mut [Value], col: &str, descending: bool) {
    rows.sort_by(|a, b| {
        let (a, b) = (a.get(col), b.get(col));
        let ord = match (a.and_then(Value::as_f64), b.and_then(Value::as_f64)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
            _ => scalar_string(a.unwrap_or(&Value::Null))
                .cmp(&scalar_string(b.unwrap_or(&Value::Null))),
        };
        if descending { ord.reverse() } else { ord }
    });
}

/// Resolve an `items(*)` embed against the items table.
fn shape_row(tables: &HashMap<String, Vec<Value>>, row: Value, select: &str) -> Value {
    if !select.contains("items(*)") {
        return row;
    }
    let item_id = row.get("item_id").cloned().unwrap_or(Value::Null);
    let item = tables
        .get("items")
        .and_then(|items| items.iter().find(|i| i.get("id") == Some(&item_id)))
        .cloned()
        .unwrap_or(Value::Null);
    let mut obj = row.as_object().cloned().unwrap_or_default();
    obj.remove("item_id");
    obj.insert("items".into(), item);
    Value::Object(obj)
}

// =============================================================================
// Mock card processor
// =============================================================================

#[derive(Default)]
struct ProcessorInner {
    payment_intents: i64,
    setup_intents: i64,
    customers: i64,
    payment_methods: i64,
    last_payment_intent: Option<HashMap<String, String>>,
    last_setup_intent: Option<HashMap<String, String>>,
    /// Stored cards keyed by customer id.
    cards: HashMap<String, Vec<Value>>,
    fail_message: Option<String>,
}

#[derive(Clone, Default)]
struct ProcessorState(Arc<Mutex<ProcessorInner>>);

impl ProcessorState {
    fn lock(&self) -> MutexGuard<'_, ProcessorInner> {
        self.0.lock().unwrap()
    }
}

/// In-process stand-in for the card processor's REST API.
pub struct MockProcessor {
    /// Base URL (including the version prefix) for the proxy's upstream.
    pub base_url: String,
    state: ProcessorState,
}

impl MockProcessor {
    /// Bind an ephemeral loopback port and start serving.
    pub async fn start() -> Self {
        let state = ProcessorState::default();
        let router = processor_router(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Self {
            base_url: format!("http://{addr}/v1"),
            state,
        }
    }

    /// Attach a card to a customer; returns the payment method id.
    pub fn seed_card(&self, customer_id: &str, brand: &str, last4: &str) -> String {
        let mut inner = self.state.lock();
        inner.payment_methods += 1;
        let id = format!("pm_{}", inner.payment_methods);
        inner
            .cards
            .entry(customer_id.to_string())
            .or_default()
            .push(json!({
                "id": id,
                "card": {
                    "brand": brand,
                    "last4": last4,
                    "exp_month": 4,
                    "exp_year": 2030,
                },
            }));
        id
    }

    /// Form fields of the most recent payment intent creation.
    #[must_use]
    pub fn last_payment_intent(&self) -> Option<HashMap<String, String>> {
        self.state.lock().last_payment_intent.clone()
    }

    /// Form fields of the most recent setup intent creation.
    #[must_use]
    pub fn last_setup_intent(&self) -> Option<HashMap<String, String>> {
        self.state.lock().last_setup_intent.clone()
    }

    /// Cards currently attached to a customer.
    #[must_use]
    pub fn card_count(&self, customer_id: &str) -> usize {
        self.state
            .lock()
            .cards
            .get(customer_id)
            .map_or(0, Vec::len)
    }

    /// Make the next create call fail with a card-declined style error.
    pub fn fail_next(&self, message: &str) {
        self.state.lock().fail_message = Some(message.to_string());
    }
}

fn processor_router(state: ProcessorState) -> Router {
    Router::new()
        .route("/v1/payment_intents", post(processor_payment_intent))
        .route("/v1/setup_intents", post(processor_setup_intent))
        .route("/v1/customers", post(processor_customer))
        .route("/v1/payment_methods", get(processor_list_cards))
        .route(
            "/v1/payment_methods/{id}/detach",
            post(processor_detach_card),
        )
        .with_state(state)
}

fn processor_declined(inner: &mut ProcessorInner) -> Option<Response> {
    inner.fail_message.take().map(|message| {
        (
            StatusCode::PAYMENT_REQUIRED,
            Json(json!({ "error": { "message": message } })),
        )
            .into_response()
    })
}

async fn processor_payment_intent(
    State(state): State<ProcessorState>,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    let mut inner = state.lock();
    if let Some(declined) = processor_declined(&mut inner) {
        return declined;
    }
    inner.payment_intents += 1;
    let n = inner.payment_intents;
    inner.last_payment_intent = Some(params);
    Json(json!({
        "id": format!("pi_{n}"),
        "client_secret": format!("pi_{n}_secret_test"),
    }))
    .into_response()
}

async fn processor_setup_intent(
    State(state): State<ProcessorState>,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    let mut inner = state.lock();
    if let Some(declined) = processor_declined(&mut inner) {
        return declined;
    }
    inner.setup_intents += 1;
    let n = inner.setup_intents;
    inner.last_setup_intent = Some(params);
    Json(json!({
        "id": format!("seti_{n}"),
        "client_secret": format!("seti_{n}_secret_test"),
    }))
    .into_response()
}

async fn processor_customer(
    State(state): State<ProcessorState>,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    let mut inner = state.lock();
    if let Some(declined) = processor_declined(&mut inner) {
        return declined;
    }
    inner.customers += 1;
    let n = inner.customers;
    Json(json!({
        "id": format!("cus_{n}"),
        "email": params.get("email"),
    }))
    .into_response()
}

async fn processor_list_cards(
    State(state): State<ProcessorState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let customer = params.get("customer").cloned().unwrap_or_default();
    let cards = state.lock().cards.get(&customer).cloned().unwrap_or_default();
    Json(json!({ "object": "list", "data": cards }))
}

async fn processor_detach_card(
    State(state): State<ProcessorState>,
    Path(id): Path<String>,
) -> Json<Value> {
    let needle = Value::String(id.clone());
    let mut inner = state.lock();
    for cards in inner.cards.values_mut() {
        cards.retain(|card| card.get("id") != Some(&needle));
    }
    drop(inner);
    Json(json!({ "id": id }))
}

// =============================================================================
// Test context
// =============================================================================

/// Both mocks plus the real payment proxy router, all on loopback ports.
pub struct TestContext {
    pub backend: MockBackend,
    pub processor: MockProcessor,
    /// Payment proxy base URL, including the `/api` prefix.
    pub payments_url: String,
}

impl TestContext {
    /// Start the mocks and serve the production proxy router against them.
    pub async fn start() -> Self {
        let backend = MockBackend::start().await;
        let processor = MockProcessor::start().await;
        let payments_url = spawn_payment_proxy(&processor.base_url).await;
        Self {
            backend,
            processor,
            payments_url,
        }
    }

    /// A storefront app wired to the mock services.
    #[must_use]
    pub fn app(&self) -> App {
        let config = StorefrontConfig {
            backend: BackendConfig {
                base_url: self.backend.base_url.clone(),
                api_key: SecretString::from("test-anon-key-123456"),
            },
            payments_url: self.payments_url.clone(),
            checkout: CheckoutPolicy::default(),
            image_bucket: "item-images".to_string(),
        };
        App::new(config).unwrap()
    }

    /// An app already signed in as the given seeded account.
    pub async fn signed_in_app(&self, email: &str) -> App {
        let mut app = self.app();
        app.sign_in(email, TEST_PASSWORD).await.unwrap();
        app
    }
}

/// Serve the real proxy router with its upstream pointed at the mock
/// processor; returns the base URL the storefront should use.
pub async fn spawn_payment_proxy(processor_base: &str) -> String {
    let config = ProxyConfig {
        stripe_secret_key: SecretString::from("sk_test_abc123def456"),
        host: IpAddr::from([127, 0, 0, 1]),
        port: 0,
        allowed_origin: None,
        stripe_api_base: processor_base.to_string(),
        sentry_dsn: None,
        sentry_environment: None,
    };
    let state = ProxyState::new(&config).unwrap();
    let router = proxy_routes::router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api")
}
