//! Integration tests for Shopfront.
//!
//! The client crates are exercised against [`FakeApi`], an in-process axum
//! server that speaks the remote store API's JSON dialect: `token` header
//! authentication, `status`/`message` envelopes, `productId`/`count` bodies
//! and populated cart lines on reads.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! # Test Hooks
//!
//! - every request is recorded (see [`FakeApi::request_count`])
//! - [`FakeApi::fail_next`] makes the next matching request fail
//! - [`FakeApi::gate_next_cart_read`] holds a cart read until released, to
//!   force out-of-order responses
//! - [`FakeApi::revoke_tokens`] expires every issued credential

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::{Notify, broadcast};
use tokio::task::JoinHandle;

use shopfront_client::models::{Credential, Session, SessionUser};
use shopfront_client::{ClientConfig, Notification, Storefront};
use shopfront_core::{Email, UserId};

/// Path prefix the fake serves under, like the real API's version segment.
pub const API_PREFIX: &str = "/api/v1";

/// Seeded product: 10.00, in stock.
pub const TEE: &str = "6428ebc6dc1175abc65ca0b9";
/// Seeded product: 25.00 reduced to 20.00, in stock.
pub const SHIRT: &str = "6428eb43dc1175abc65ca0b3";
/// Seeded product: 15.00, out of stock.
pub const SCARF: &str = "6428de2adc1175abc65ca05b";

pub const SHOPPER_ID: &str = "64a1f0c2e4b0a1b2c3d4e5f6";
pub const SHOPPER_NAME: &str = "Mona";
pub const SHOPPER_EMAIL: &str = "mona@example.com";
pub const SHOPPER_PASSWORD: &str = "hunter22";

/// The only reset code the fake accepts.
pub const RESET_CODE: &str = "246810";

const INVALID_TOKEN: &str = "Invalid Token. please login again";

type Shared = Arc<Mutex<FakeState>>;
type Reply = (StatusCode, Json<Value>);

// =============================================================================
// State
// =============================================================================

#[derive(Debug, Clone)]
struct FakeUser {
    id: String,
    name: String,
    email: String,
    password: String,
}

#[derive(Debug, Clone)]
struct FakeProduct {
    id: &'static str,
    title: &'static str,
    price: i64,
    sale: Option<i64>,
    stock: u32,
    category: (&'static str, &'static str),
    brand: (&'static str, &'static str),
}

impl FakeProduct {
    fn unit_price(&self) -> i64 {
        self.sale.unwrap_or(self.price)
    }

    fn to_json(&self) -> Value {
        let mut product = json!({
            "_id": self.id,
            "id": self.id,
            "title": self.title,
            "description": format!("{} in assorted sizes", self.title),
            "price": self.price,
            "imageCover": format!("https://img.example.com/{}.jpeg", self.id),
            "images": [],
            "category": named(self.category),
            "brand": named(self.brand),
            "ratingsAverage": 4.4,
            "ratingsQuantity": 18,
            "quantity": self.stock,
            "sold": 120,
        });
        if let (Some(sale), Some(fields)) = (self.sale, product.as_object_mut()) {
            fields.insert("priceAfterDiscount".to_string(), json!(sale));
        }
        product
    }
}

fn named((id, name): (&str, &str)) -> Value {
    json!({
        "_id": id,
        "name": name,
        "slug": name.to_lowercase().replace(' ', "-"),
        "image": format!("https://img.example.com/{id}.png"),
    })
}

#[derive(Debug, Clone)]
struct FakeLine {
    id: String,
    product_id: String,
    count: u32,
}

#[derive(Debug, Clone)]
struct FakeCart {
    id: String,
    lines: Vec<FakeLine>,
}

#[derive(Debug, Clone)]
struct FakeAddress {
    id: String,
    name: String,
    details: String,
    phone: String,
    city: String,
}

impl FakeAddress {
    fn to_json(&self) -> Value {
        json!({
            "_id": self.id,
            "name": self.name,
            "details": self.details,
            "phone": self.phone,
            "city": self.city,
        })
    }
}

/// A request the fake has seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path below [`API_PREFIX`], e.g. `/cart/abc`.
    pub path: String,
}

#[derive(Debug)]
struct Failure {
    method: Method,
    path: String,
    status: StatusCode,
    message: String,
}

struct FakeState {
    users: Vec<FakeUser>,
    products: Vec<FakeProduct>,
    tokens: HashMap<String, String>,
    carts: HashMap<String, FakeCart>,
    wishlists: HashMap<String, Vec<String>>,
    addresses: HashMap<String, Vec<FakeAddress>>,
    orders: HashMap<String, Vec<Value>>,
    requests: Vec<RecordedRequest>,
    failures: Vec<Failure>,
    cart_gates: VecDeque<Arc<Notify>>,
    next_id: u64,
    next_order_number: u64,
}

impl FakeState {
    fn seeded() -> Self {
        let mens = ("6439d5b90049ad0b52b90048", "Men's Fashion");
        let womens = ("6439d58a0049ad0b52b9003f", "Women's Fashion");
        let nile = ("64089bbe24b25627a253158b", "Nile");
        let delta = ("64089b3424b25627a2531585", "Delta");

        Self {
            users: vec![FakeUser {
                id: SHOPPER_ID.to_string(),
                name: SHOPPER_NAME.to_string(),
                email: SHOPPER_EMAIL.to_string(),
                password: SHOPPER_PASSWORD.to_string(),
            }],
            products: vec![
                FakeProduct {
                    id: TEE,
                    title: "Cotton Tee",
                    price: 10,
                    sale: None,
                    stock: 40,
                    category: mens,
                    brand: nile,
                },
                FakeProduct {
                    id: SHIRT,
                    title: "Linen Shirt",
                    price: 25,
                    sale: Some(20),
                    stock: 12,
                    category: mens,
                    brand: delta,
                },
                FakeProduct {
                    id: SCARF,
                    title: "Wool Scarf",
                    price: 15,
                    sale: None,
                    stock: 0,
                    category: womens,
                    brand: nile,
                },
            ],
            tokens: HashMap::new(),
            carts: HashMap::new(),
            wishlists: HashMap::new(),
            addresses: HashMap::new(),
            orders: HashMap::new(),
            requests: Vec::new(),
            failures: Vec::new(),
            cart_gates: VecDeque::new(),
            next_id: 0,
            next_order_number: 1000,
        }
    }

    fn object_id(&mut self) -> String {
        self.next_id += 1;
        format!("{:024x}", 0x6500_0000_0000_u64 + self.next_id)
    }

    fn issue_token(&mut self, user: &FakeUser) -> String {
        self.next_id += 1;
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let claims = json!({
            "id": user.id,
            "name": user.name,
            "role": "user",
            "iat": self.next_id,
        });
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        let token = format!("{header}.{payload}.fake-signature");
        self.tokens.insert(token.clone(), user.id.clone());
        token
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<String, Reply> {
        headers
            .get("token")
            .and_then(|value| value.to_str().ok())
            .and_then(|token| self.tokens.get(token))
            .cloned()
            .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, INVALID_TOKEN))
    }

    fn user_by_email(&self, email: &str) -> Option<&FakeUser> {
        self.users
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
    }

    fn product(&self, id: &str) -> Option<&FakeProduct> {
        self.products.iter().find(|product| product.id == id)
    }

    fn cart_mut(&mut self, user_id: &str) -> &mut FakeCart {
        let fresh_id = if self.carts.contains_key(user_id) {
            None
        } else {
            Some(self.object_id())
        };
        self.carts
            .entry(user_id.to_string())
            .or_insert_with(|| FakeCart {
                id: fresh_id.unwrap_or_default(),
                lines: Vec::new(),
            })
    }

    fn add_line(&mut self, user_id: &str, product_id: &str, count: u32) {
        let line_id = self.object_id();
        let cart = self.cart_mut(user_id);
        match cart.lines.iter_mut().find(|line| line.product_id == product_id) {
            Some(line) => line.count += count,
            None => cart.lines.push(FakeLine {
                id: line_id,
                product_id: product_id.to_string(),
                count,
            }),
        }
    }

    fn line_json(&self, line: &FakeLine) -> Option<(Value, i64)> {
        let product = self.product(&line.product_id)?;
        let value = json!({
            "count": line.count,
            "_id": line.id,
            "product": product.to_json(),
            "price": product.unit_price(),
        });
        Some((value, product.unit_price() * i64::from(line.count)))
    }

    fn cart_json(&mut self, user_id: &str) -> Value {
        let cart = self.cart_mut(user_id).clone();
        let (lines, totals): (Vec<Value>, Vec<i64>) = cart
            .lines
            .iter()
            .filter_map(|line| self.line_json(line))
            .unzip();

        json!({
            "status": "success",
            "numOfCartItems": lines.len(),
            "cartId": cart.id,
            "data": {
                "_id": cart.id,
                "cartOwner": user_id,
                "products": lines,
                "totalCartPrice": totals.iter().sum::<i64>(),
            },
        })
    }

    /// Mutation responses carry unpopulated product references.
    fn cart_mutation_json(&mut self, user_id: &str, message: &str) -> Value {
        let cart = self.cart_mut(user_id).clone();
        let lines: Vec<Value> = cart
            .lines
            .iter()
            .map(|line| {
                json!({
                    "count": line.count,
                    "_id": line.id,
                    "product": line.product_id,
                })
            })
            .collect();

        json!({
            "status": "success",
            "message": message,
            "numOfCartItems": lines.len(),
            "cartId": cart.id,
            "data": { "_id": cart.id, "products": lines },
        })
    }

    fn take_failure(&mut self, method: &Method, path: &str) -> Option<Failure> {
        let index = self
            .failures
            .iter()
            .position(|failure| &failure.method == method && failure.path == path)?;
        Some(self.failures.remove(index))
    }
}

fn lock(state: &Shared) -> MutexGuard<'_, FakeState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn ok(body: Value) -> Reply {
    (StatusCode::OK, Json(body))
}

fn fail(status: StatusCode, message: &str) -> Reply {
    (
        status,
        Json(json!({ "statusMsg": "fail", "message": message })),
    )
}

// =============================================================================
// Server
// =============================================================================

/// A running fake of the remote store API.
///
/// The server stops when the value is dropped.
pub struct FakeApi {
    base_url: String,
    state: Shared,
    server: JoinHandle<()>,
}

impl FakeApi {
    /// Bind to an ephemeral local port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(FakeState::seeded()));

        let api = Router::new()
            .route("/auth/signin", post(sign_in))
            .route("/auth/signup", post(sign_up))
            .route("/auth/forgotPasswords", post(forgot_password))
            .route("/auth/verifyResetCode", post(verify_reset_code))
            .route("/auth/resetPassword", put(reset_password))
            .route("/products", get(list_products))
            .route("/products/{id}", get(get_product))
            .route("/categories", get(list_categories))
            .route("/brands", get(list_brands))
            .route("/cart", get(get_cart).post(add_to_cart))
            .route("/cart/{product_id}", put(update_cart_item).delete(remove_cart_item))
            .route("/wishlist", get(get_wishlist).post(add_to_wishlist))
            .route("/wishlist/{product_id}", delete(remove_from_wishlist))
            .route("/addresses", get(get_addresses).post(add_address))
            .route("/addresses/{id}", delete(remove_address))
            .route("/orders/user/{user_id}", get(get_orders))
            .route("/orders/{cart_id}", post(create_cash_order))
            .with_state(Arc::clone(&state));

        let app = Router::new()
            .nest(API_PREFIX, api)
            .layer(middleware::from_fn_with_state(
                Arc::clone(&state),
                record_and_inject,
            ));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake API");
        let addr = listener
            .local_addr()
            .expect("Fake API listener has no address");

        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Fake API stopped");
            }
        });

        Self {
            base_url: format!("http://{addr}{API_PREFIX}"),
            state,
            server,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Client configuration pointing at this fake.
    ///
    /// # Panics
    ///
    /// Panics if the base URL is rejected, which would be a bug in the fake.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(&self.base_url).expect("Fake API URL is valid")
    }

    /// Fresh storefront state talking to this fake, with no session yet.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn storefront(&self) -> Storefront {
        Storefront::new(&self.config()).expect("Failed to build storefront")
    }

    /// Issue a credential for a seeded or registered user without a
    /// sign-in request, as if restored from an earlier run.
    ///
    /// # Panics
    ///
    /// Panics if no user has that email.
    #[must_use]
    pub fn session_for(&self, email: &str) -> Session {
        let mut state = lock(&self.state);
        let user = state
            .user_by_email(email)
            .cloned()
            .expect("No fake user with that email");
        let token = state.issue_token(&user);

        Session {
            credential: Credential::new(token),
            user: SessionUser {
                id: UserId::new(user.id),
                name: user.name,
                email: Email::parse(&user.email).expect("Fake user email is valid"),
            },
        }
    }

    /// Put units of a product in a user's cart directly, as another device
    /// would.
    pub fn add_to_server_cart(&self, user_id: &str, product_id: &str, count: u32) {
        lock(&self.state).add_line(user_id, product_id, count);
    }

    /// Total units of a product in a user's server-side cart.
    #[must_use]
    pub fn server_quantity(&self, user_id: &str, product_id: &str) -> u32 {
        lock(&self.state)
            .carts
            .get(user_id)
            .and_then(|cart| cart.lines.iter().find(|line| line.product_id == product_id))
            .map_or(0, |line| line.count)
    }

    /// Number of orders a user has placed.
    #[must_use]
    pub fn order_count(&self, user_id: &str) -> usize {
        lock(&self.state).orders.get(user_id).map_or(0, Vec::len)
    }

    /// Every credential issued so far stops working.
    pub fn revoke_tokens(&self) {
        lock(&self.state).tokens.clear();
    }

    /// Make the next `method` request to `path` fail with `status`.
    ///
    /// `path` is relative to [`API_PREFIX`], e.g. `/cart`.
    pub fn fail_next(&self, method: Method, path: &str, status: StatusCode, message: &str) {
        lock(&self.state).failures.push(Failure {
            method,
            path: path.to_string(),
            status,
            message: message.to_string(),
        });
    }

    /// Hold the next cart read until the returned handle is notified.
    ///
    /// The response body is captured when the request arrives, so a gated
    /// read returns the cart as it was then.
    #[must_use]
    pub fn gate_next_cart_read(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        lock(&self.state).cart_gates.push_back(Arc::clone(&gate));
        gate
    }

    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).requests.clone()
    }

    /// How many `method` requests to `path` the fake has seen.
    #[must_use]
    pub fn request_count(&self, method: &Method, path: &str) -> usize {
        lock(&self.state)
            .requests
            .iter()
            .filter(|request| &request.method == method && request.path == path)
            .count()
    }

    /// Wait until `count` matching requests have arrived.
    ///
    /// # Panics
    ///
    /// Panics after five seconds.
    pub async fn wait_for_requests(&self, method: &Method, path: &str, count: usize) {
        let waited = tokio::time::timeout(Duration::from_secs(5), async {
            while self.request_count(method, path) < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(
            waited.is_ok(),
            "Timed out waiting for {count} {method} {path} request(s)"
        );
    }
}

impl Drop for FakeApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Every notification received so far, oldest first.
pub fn drain(receiver: &mut broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut received = Vec::new();
    while let Ok(notification) = receiver.try_recv() {
        received.push(notification);
    }
    received
}

async fn record_and_inject(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let full_path = request.uri().path();
    let path = full_path
        .strip_prefix(API_PREFIX)
        .unwrap_or(full_path)
        .to_string();

    let failure = {
        let mut state = lock(&state);
        state.requests.push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
        });
        state.take_failure(&method, &path)
    };

    match failure {
        Some(failure) => fail(failure.status, &failure.message).into_response(),
        None => next.run(request).await,
    }
}

// =============================================================================
// Auth handlers
// =============================================================================

#[derive(Deserialize)]
struct SignInBody {
    email: String,
    password: String,
}

async fn sign_in(State(state): State<Shared>, Json(body): Json<SignInBody>) -> Reply {
    let mut state = lock(&state);
    let Some(user) = state
        .user_by_email(&body.email)
        .filter(|user| user.password == body.password)
        .cloned()
    else {
        return fail(StatusCode::UNAUTHORIZED, "Incorrect email or password");
    };

    let token = state.issue_token(&user);
    ok(json!({
        "message": "success",
        "user": { "name": user.name, "email": user.email, "role": "user" },
        "token": token,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpBody {
    name: String,
    email: String,
    password: String,
    re_password: String,
    #[allow(dead_code)]
    phone: String,
}

async fn sign_up(State(state): State<Shared>, Json(body): Json<SignUpBody>) -> Reply {
    let mut state = lock(&state);
    if body.password != body.re_password {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "message": "fail",
                "errors": { "param": "rePassword", "msg": "Password confirmation is incorrect" },
            })),
        );
    }
    if state.user_by_email(&body.email).is_some() {
        return fail(StatusCode::CONFLICT, "Account Already Exists");
    }

    let user = FakeUser {
        id: state.object_id(),
        name: body.name,
        email: body.email.to_lowercase(),
        password: body.password,
    };
    state.users.push(user.clone());
    let token = state.issue_token(&user);

    (
        StatusCode::CREATED,
        Json(json!({
            "message": "success",
            "user": { "name": user.name, "email": user.email, "role": "user" },
            "token": token,
        })),
    )
}

#[derive(Deserialize)]
struct ForgotPasswordBody {
    email: String,
}

async fn forgot_password(State(state): State<Shared>, Json(body): Json<ForgotPasswordBody>) -> Reply {
    if lock(&state).user_by_email(&body.email).is_none() {
        return fail(
            StatusCode::NOT_FOUND,
            "There is no user registered with this email address",
        );
    }
    ok(json!({ "statusMsg": "success", "message": "Reset code sent to your email" }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyResetCodeBody {
    reset_code: String,
}

async fn verify_reset_code(Json(body): Json<VerifyResetCodeBody>) -> Reply {
    if body.reset_code == RESET_CODE {
        ok(json!({ "status": "Success" }))
    } else {
        fail(StatusCode::BAD_REQUEST, "Reset code is invalid or has expired")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordBody {
    email: String,
    new_password: String,
}

async fn reset_password(State(state): State<Shared>, Json(body): Json<ResetPasswordBody>) -> Reply {
    let mut state = lock(&state);
    let Some(user) = state
        .users
        .iter_mut()
        .find(|user| user.email.eq_ignore_ascii_case(&body.email))
    else {
        return fail(
            StatusCode::NOT_FOUND,
            "There is no user registered with this email address",
        );
    };
    user.password = body.new_password;
    let user = user.clone();

    let token = state.issue_token(&user);
    ok(json!({ "token": token }))
}

// =============================================================================
// Catalog handlers
// =============================================================================

#[derive(Deserialize)]
struct PageQuery {
    page: Option<usize>,
    limit: Option<usize>,
}

async fn list_products(State(state): State<Shared>, Query(query): Query<PageQuery>) -> Reply {
    let state = lock(&state);
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(40).max(1);
    let total = state.products.len();
    let pages = total.div_ceil(limit).max(1);

    let items: Vec<Value> = state
        .products
        .iter()
        .skip((page - 1) * limit)
        .take(limit)
        .map(FakeProduct::to_json)
        .collect();

    ok(json!({
        "results": items.len(),
        "metadata": { "currentPage": page, "numberOfPages": pages, "limit": limit },
        "data": items,
    }))
}

async fn get_product(State(state): State<Shared>, Path(id): Path<String>) -> Reply {
    match lock(&state).product(&id) {
        Some(product) => ok(json!({ "data": product.to_json() })),
        None => fail(StatusCode::NOT_FOUND, "No product for this id"),
    }
}

async fn list_categories(State(state): State<Shared>) -> Reply {
    let state = lock(&state);
    let mut categories: Vec<(&str, &str)> = Vec::new();
    for product in &state.products {
        if !categories.contains(&product.category) {
            categories.push(product.category);
        }
    }
    let data: Vec<Value> = categories.into_iter().map(named).collect();
    ok(json!({ "results": data.len(), "data": data }))
}

async fn list_brands(State(state): State<Shared>) -> Reply {
    let state = lock(&state);
    let mut brands: Vec<(&str, &str)> = Vec::new();
    for product in &state.products {
        if !brands.contains(&product.brand) {
            brands.push(product.brand);
        }
    }
    let data: Vec<Value> = brands.into_iter().map(named).collect();
    ok(json!({ "results": data.len(), "data": data }))
}

// =============================================================================
// Cart handlers
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductIdBody {
    product_id: String,
}

#[derive(Deserialize)]
struct CountBody {
    count: i64,
}

async fn get_cart(State(state): State<Shared>, headers: HeaderMap) -> Result<Reply, Reply> {
    let (reply, gate) = {
        let mut state = lock(&state);
        let user_id = state.authenticate(&headers)?;
        let body = state.cart_json(&user_id);
        (ok(body), state.cart_gates.pop_front())
    };

    if let Some(gate) = gate {
        gate.notified().await;
    }
    Ok(reply)
}

async fn add_to_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<ProductIdBody>,
) -> Result<Reply, Reply> {
    let mut state = lock(&state);
    let user_id = state.authenticate(&headers)?;
    if state.product(&body.product_id).is_none() {
        return Err(fail(StatusCode::NOT_FOUND, "No product for this id"));
    }

    state.add_line(&user_id, &body.product_id, 1);
    Ok(ok(state.cart_mutation_json(
        &user_id,
        "Product added successfully to your cart",
    )))
}

async fn update_cart_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
    Json(body): Json<CountBody>,
) -> Result<Reply, Reply> {
    let mut state = lock(&state);
    let user_id = state.authenticate(&headers)?;
    let count = u32::try_from(body.count)
        .ok()
        .filter(|count| *count > 0)
        .ok_or_else(|| fail(StatusCode::BAD_REQUEST, "count must be a positive number"))?;

    let cart = state.cart_mut(&user_id);
    let line = cart
        .lines
        .iter_mut()
        .find(|line| line.product_id == product_id)
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "No product in your cart with this id"))?;
    line.count = count;

    Ok(ok(state.cart_mutation_json(&user_id, "success")))
}

async fn remove_cart_item(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
) -> Result<Reply, Reply> {
    let mut state = lock(&state);
    let user_id = state.authenticate(&headers)?;
    state
        .cart_mut(&user_id)
        .lines
        .retain(|line| line.product_id != product_id);

    Ok(ok(state.cart_mutation_json(&user_id, "success")))
}

// =============================================================================
// Wishlist handlers
// =============================================================================

async fn get_wishlist(State(state): State<Shared>, headers: HeaderMap) -> Result<Reply, Reply> {
    let state = lock(&state);
    let user_id = state.authenticate(&headers)?;
    let data: Vec<Value> = state
        .wishlists
        .get(&user_id)
        .into_iter()
        .flatten()
        .filter_map(|id| state.product(id))
        .map(FakeProduct::to_json)
        .collect();

    Ok(ok(json!({ "status": "success", "count": data.len(), "data": data })))
}

async fn add_to_wishlist(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<ProductIdBody>,
) -> Result<Reply, Reply> {
    let mut state = lock(&state);
    let user_id = state.authenticate(&headers)?;
    if state.product(&body.product_id).is_none() {
        return Err(fail(StatusCode::NOT_FOUND, "No product for this id"));
    }

    let ids = state.wishlists.entry(user_id).or_default();
    if !ids.contains(&body.product_id) {
        ids.push(body.product_id);
    }
    Ok(ok(json!({
        "status": "success",
        "message": "Product added successfully to your wishlist",
        "data": ids,
    })))
}

async fn remove_from_wishlist(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
) -> Result<Reply, Reply> {
    let mut state = lock(&state);
    let user_id = state.authenticate(&headers)?;
    let ids = state.wishlists.entry(user_id).or_default();
    ids.retain(|id| *id != product_id);

    Ok(ok(json!({
        "status": "success",
        "message": "Product removed successfully to your wishlist",
        "data": ids,
    })))
}

// =============================================================================
// Address handlers
// =============================================================================

#[derive(Deserialize)]
struct AddressBody {
    name: String,
    details: String,
    phone: String,
    city: String,
}

fn address_list(state: &FakeState, user_id: &str, message: Option<&str>) -> Value {
    let data: Vec<Value> = state
        .addresses
        .get(user_id)
        .into_iter()
        .flatten()
        .map(FakeAddress::to_json)
        .collect();

    let mut body = json!({ "results": data.len(), "status": "success", "data": data });
    if let (Some(message), Some(fields)) = (message, body.as_object_mut()) {
        fields.insert("message".to_string(), json!(message));
    }
    body
}

async fn get_addresses(State(state): State<Shared>, headers: HeaderMap) -> Result<Reply, Reply> {
    let state = lock(&state);
    let user_id = state.authenticate(&headers)?;
    Ok(ok(address_list(&state, &user_id, None)))
}

async fn add_address(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<AddressBody>,
) -> Result<Reply, Reply> {
    let mut state = lock(&state);
    let user_id = state.authenticate(&headers)?;
    let address = FakeAddress {
        id: state.object_id(),
        name: body.name,
        details: body.details,
        phone: body.phone,
        city: body.city,
    };
    state
        .addresses
        .entry(user_id.clone())
        .or_default()
        .push(address);

    Ok(ok(address_list(
        &state,
        &user_id,
        Some("Address added successfully"),
    )))
}

async fn remove_address(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Reply, Reply> {
    let mut state = lock(&state);
    let user_id = state.authenticate(&headers)?;
    state
        .addresses
        .entry(user_id.clone())
        .or_default()
        .retain(|address| address.id != id);

    Ok(ok(address_list(
        &state,
        &user_id,
        Some("Address removed successfully"),
    )))
}

// =============================================================================
// Order handlers
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CashOrderBody {
    shipping_address: Value,
}

async fn get_orders(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Reply, Reply> {
    let state = lock(&state);
    state.authenticate(&headers)?;
    let orders = state.orders.get(&user_id).cloned().unwrap_or_default();
    Ok(ok(Value::Array(orders)))
}

async fn create_cash_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(cart_id): Path<String>,
    Json(body): Json<CashOrderBody>,
) -> Result<Reply, Reply> {
    let mut state = lock(&state);
    let user_id = state.authenticate(&headers)?;

    let cart = state.cart_mut(&user_id).clone();
    if cart.id != cart_id {
        return Err(fail(
            StatusCode::NOT_FOUND,
            &format!("There is no such cart with id {cart_id}"),
        ));
    }
    if cart.lines.is_empty() {
        return Err(fail(StatusCode::BAD_REQUEST, "Your cart is empty"));
    }

    let (items, totals): (Vec<Value>, Vec<i64>) = cart
        .lines
        .iter()
        .filter_map(|line| state.line_json(line))
        .unzip();

    state.next_order_number += 1;
    let sequence = state.next_order_number;
    let order = json!({
        "_id": state.object_id(),
        "id": sequence,
        "user": user_id,
        "cartItems": items,
        "shippingAddress": body.shipping_address,
        "totalOrderPrice": totals.iter().sum::<i64>(),
        "paymentMethodType": "cash",
        "isPaid": false,
        "isDelivered": false,
        "createdAt": format!("2026-03-{:02}T10:00:00.000Z", (sequence % 28) + 1),
    });
    state
        .orders
        .entry(user_id.clone())
        .or_default()
        .push(order.clone());

    // The server deletes the ordered cart; the next read starts a new one
    state.carts.remove(&user_id);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "data": order })),
    ))
}
