//! Integration test support for Dapur.
//!
//! Spins up an in-process mock of the backend REST API so the storefront
//! library can be exercised end to end without a real server.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p dapur-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let backend = MockBackend::start(vec![product("A", "Kopi Susu", 18_000, "Minuman", 3)]).await;
//! let dir = tempfile::tempdir()?;
//! let mut state = AppState::new(backend.config(dir.path(), Some(TEST_TOKEN)))?;
//!
//! state.add_to_cart(&ProductId::new("A"), 1).await?;
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path as UrlPath, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use dapur_storefront::config::{BackendConfig, StorageConfig, StorefrontConfig};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// Bearer token the mock backend accepts.
pub const TEST_TOKEN: &str = "test-token";

/// Timestamp stamped on every order the mock creates.
const CREATED_AT: &str = "2026-10-19T08:00:00.000Z";

/// Build a product document the way the backend serves it.
#[must_use]
pub fn product(id: &str, name: &str, price: u64, category: &str, in_stock: u32) -> Value {
    json!({
        "_id": id,
        "name": name,
        "description": format!("{name} khas Dapur"),
        "price": price,
        "category": category,
        "inStock": in_stock,
        "featured": false,
        "image": format!("/uploads/{id}.jpg"),
        "createdAt": CREATED_AT,
        "__v": 0
    })
}

/// Same as [`product`], marked as featured.
#[must_use]
pub fn featured_product(id: &str, name: &str, price: u64, category: &str, in_stock: u32) -> Value {
    let mut value = product(id, name, price, category, in_stock);
    value["featured"] = Value::Bool(true);
    value
}

#[derive(Default)]
struct MockData {
    products: Vec<Value>,
    orders: Vec<Value>,
    submissions: Vec<Value>,
    authorization: Vec<Option<String>>,
    order_rejection: Option<(StatusCode, String)>,
    requests: HashMap<String, usize>,
}

/// Shared state of the mock backend.
#[derive(Clone, Default)]
struct MockState {
    inner: Arc<Mutex<MockData>>,
}

impl MockState {
    fn lock(&self) -> MutexGuard<'_, MockData> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn record(&self, path: String) {
        *self.lock().requests.entry(path).or_default() += 1;
    }
}

/// In-process mock of the backend REST API.
///
/// Serves until dropped.
pub struct MockBackend {
    addr: SocketAddr,
    state: MockState,
    handle: JoinHandle<()>,
}

impl MockBackend {
    /// Start a mock backend serving `products`.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start(products: Vec<Value>) -> Self {
        let state = MockState::default();
        state.lock().products = products;

        let app = Router::new()
            .route("/api/products", get(list_products))
            .route("/api/products/categories", get(categories))
            .route("/api/products/{id}", get(get_product))
            .route("/api/orders", post(create_order))
            .route("/api/orders/myorders", get(my_orders))
            .route("/api/orders/{id}", get(get_order))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener
            .local_addr()
            .expect("Mock backend has no local address");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL of the mock, without the `/api` suffix.
    ///
    /// # Panics
    ///
    /// Never in practice; the address is always a valid URL.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("Mock address is a valid URL")
    }

    /// Storefront configuration pointing at this mock, storing the cart in
    /// `data_dir`.
    #[must_use]
    pub fn config(&self, data_dir: &Path, token: Option<&str>) -> StorefrontConfig {
        let mut backend = BackendConfig::new(self.base_url());
        if let Some(token) = token {
            backend = backend.with_token(token);
        }
        StorefrontConfig {
            backend,
            storage: StorageConfig {
                data_dir: data_dir.to_path_buf(),
                ..StorageConfig::default()
            },
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Make subsequent order submissions fail with `status` and `message`.
    pub fn reject_orders(&self, status: StatusCode, message: &str) {
        self.state.lock().order_rejection = Some((status, message.to_string()));
    }

    /// Change a product's stock, as if another customer had ordered.
    pub fn set_stock(&self, id: &str, in_stock: u32) {
        let mut data = self.state.lock();
        if let Some(product) = data.products.iter_mut().find(|p| p["_id"] == id) {
            product["inStock"] = json!(in_stock);
        }
    }

    /// Order bodies received by `POST /api/orders`, accepted or not.
    #[must_use]
    pub fn submissions(&self) -> Vec<Value> {
        self.state.lock().submissions.clone()
    }

    /// `Authorization` headers seen on order endpoints.
    #[must_use]
    pub fn authorization_headers(&self) -> Vec<Option<String>> {
        self.state.lock().authorization.clone()
    }

    /// Number of requests received for `path`.
    #[must_use]
    pub fn requests(&self, path: &str) -> usize {
        self.state.lock().requests.get(path).copied().unwrap_or(0)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn ok(status: StatusCode, data: Value) -> Response {
    (status, Json(json!({ "success": true, "data": data }))).into_response()
}

fn fail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

/// Check the bearer token and record the header.
fn authorize(state: &MockState, headers: &HeaderMap) -> Result<(), Response> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let expected = format!("Bearer {TEST_TOKEN}");
    let accepted = value.as_deref() == Some(expected.as_str());
    state.lock().authorization.push(value);

    if accepted {
        Ok(())
    } else {
        Err(fail(StatusCode::UNAUTHORIZED, "Not authorized, token failed"))
    }
}

async fn list_products(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.record("/api/products".to_string());

    let search = params.get("search").map(|s| s.to_lowercase());
    let category = params.get("category");
    let featured = params.get("featured").map(|f| f == "true");
    let limit = params
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(usize::MAX);

    let products: Vec<Value> = state
        .lock()
        .products
        .iter()
        .filter(|p| {
            search.as_ref().is_none_or(|s| {
                p["name"]
                    .as_str()
                    .is_some_and(|name| name.to_lowercase().contains(s.as_str()))
            })
        })
        .filter(|p| category.is_none_or(|c| p["category"] == c.as_str()))
        .filter(|p| featured.is_none_or(|f| p["featured"] == f))
        .take(limit)
        .cloned()
        .collect();

    (
        StatusCode::OK,
        Json(json!({ "success": true, "count": products.len(), "data": products })),
    )
        .into_response()
}

async fn categories(State(state): State<MockState>) -> Response {
    state.record("/api/products/categories".to_string());

    let mut categories: Vec<String> = state
        .lock()
        .products
        .iter()
        .filter_map(|p| p["category"].as_str().map(str::to_string))
        .collect();
    categories.sort();
    categories.dedup();

    ok(StatusCode::OK, json!(categories))
}

async fn get_product(State(state): State<MockState>, UrlPath(id): UrlPath<String>) -> Response {
    state.record(format!("/api/products/{id}"));

    let product = state
        .lock()
        .products
        .iter()
        .find(|p| p["_id"] == id.as_str())
        .cloned();

    match product {
        Some(product) => ok(StatusCode::OK, product),
        None => fail(StatusCode::NOT_FOUND, "Produk tidak ditemukan"),
    }
}

async fn create_order(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("/api/orders".to_string());
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    let mut data = state.lock();
    data.submissions.push(body.clone());

    if let Some((status, message)) = &data.order_rejection {
        return fail(*status, message);
    }

    // Populate product details the way the backend does for order lines
    let items: Vec<Value> = body["orderItems"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|item| {
                    let product = data
                        .products
                        .iter()
                        .find(|p| p["_id"] == item["product"])
                        .map_or_else(
                            || item["product"].clone(),
                            |p| json!({ "_id": p["_id"], "name": p["name"], "image": p["image"] }),
                        );
                    json!({
                        "product": product,
                        "quantity": item["quantity"],
                        "price": item["price"]
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let order = json!({
        "_id": format!("order-{}", data.orders.len() + 1),
        "orderItems": items,
        "shippingAddress": body["shippingAddress"],
        "paymentMethod": body["paymentMethod"],
        "itemsPrice": body["itemsPrice"],
        "shippingPrice": body["shippingPrice"],
        "totalPrice": body["totalPrice"],
        "notes": body["notes"],
        "status": "pending",
        "createdAt": CREATED_AT
    });
    data.orders.push(order.clone());

    ok(StatusCode::CREATED, order)
}

async fn my_orders(State(state): State<MockState>, headers: HeaderMap) -> Response {
    state.record("/api/orders/myorders".to_string());
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    let orders = state.lock().orders.clone();
    ok(StatusCode::OK, json!(orders))
}

async fn get_order(
    State(state): State<MockState>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<String>,
) -> Response {
    state.record(format!("/api/orders/{id}"));
    if let Err(response) = authorize(&state, &headers) {
        return response;
    }

    let order = state
        .lock()
        .orders
        .iter()
        .find(|o| o["_id"] == id.as_str())
        .cloned();

    match order {
        Some(order) => ok(StatusCode::OK, order),
        None => fail(StatusCode::NOT_FOUND, "Pesanan tidak ditemukan"),
    }
}
