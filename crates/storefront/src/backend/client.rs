//! Backend REST client implementation.
//!
//! Uses `reqwest` for HTTP. Caches products and categories using `moka`
//! (TTL from configuration, 5 minutes by default).

use std::sync::Arc;

use dapur_core::{Order, OrderId, OrderSubmission, Product, ProductId};
use moka::future::Cache;
use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::BackendError;
use super::cache::{CacheKey, CacheValue};
use super::types::{ApiErrorBody, ApiResponse, ProductQuery};
use crate::config::BackendConfig;

/// How many related products are shown on a product page.
const RELATED_PRODUCTS_LIMIT: u32 = 4;

/// Longest error body excerpt kept in an error message.
const ERROR_BODY_EXCERPT: usize = 200;

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the backend REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<SecretString>,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("authenticated", &self.inner.api_token.is_some())
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the base URL
    /// cannot carry a path.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        if config.base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl(config.base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("dapur-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.product_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.clone(),
                api_token: config.api_token.clone(),
                cache,
            }),
        })
    }

    /// The backend base URL (used to resolve relative image paths).
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Returns `true` if a bearer token is configured.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.api_token.is_some()
    }

    /// Build `<base>/api/<segments...>`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.inner.base_url.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|()| BackendError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    /// Attach the bearer token, failing if none is configured.
    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, BackendError> {
        let token = self
            .inner
            .api_token
            .as_ref()
            .ok_or(BackendError::MissingToken)?;
        Ok(request.bearer_auth(token.expose_secret()))
    }

    /// Send a request and unwrap the response envelope.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&response_text)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| excerpt(&response_text));

            tracing::warn!(
                status = %status,
                path = %url,
                message = %message,
                "Backend returned non-success status"
            );

            if status == StatusCode::NOT_FOUND {
                return Err(BackendError::NotFound(if message.is_empty() {
                    url
                } else {
                    message
                }));
            }
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(BackendError::Unauthorized(message));
            }
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ApiResponse<T> = match serde_json::from_str(&response_text) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    path = %url,
                    body = %excerpt(&response_text),
                    "Failed to parse backend response"
                );
                return Err(BackendError::Parse(e));
            }
        };

        if envelope.success == Some(false) {
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: envelope.message.unwrap_or_default(),
            });
        }

        Ok(envelope.data)
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// List products matching `query`.
    ///
    /// Results are cached unless the query contains search text.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, BackendError> {
        let cache_key = CacheKey::Products(query.clone());

        if !query.is_search()
            && let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let mut url = self.endpoint(&["products"])?;
        query.apply(&mut url);

        let products: Vec<Product> = self.execute(self.inner.client.get(url)).await?;
        debug!(count = products.len(), "Fetched products");

        if !query.is_search() {
            self.inner
                .cache
                .insert(cache_key, CacheValue::Products(products.clone()))
                .await;
        }

        Ok(products)
    }

    /// List product categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>, BackendError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let url = self.endpoint(&["products", "categories"])?;
        let categories: Vec<String> = self.execute(self.inner.client.get(url)).await?;

        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] for an unknown ID, or an error if
    /// the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, BackendError> {
        let cache_key = CacheKey::Product(id.clone());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.endpoint(&["products", id.as_str()])?;
        let product: Product = self.execute(self.inner.client.get(url)).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get a product by ID, bypassing the cache.
    ///
    /// Use before adding to the cart so the stock snapshot is current.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_product`].
    pub async fn refresh_product(&self, id: &ProductId) -> Result<Product, BackendError> {
        self.inner
            .cache
            .invalidate(&CacheKey::Product(id.clone()))
            .await;
        self.get_product(id).await
    }

    /// Other products from the same category, excluding `product` itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn related_products(&self, product: &Product) -> Result<Vec<Product>, BackendError> {
        if product.category.is_empty() {
            return Ok(Vec::new());
        }

        // Ask for one extra in case the product itself is among the results
        let query = ProductQuery::new()
            .category(product.category.clone())
            .limit(RELATED_PRODUCTS_LIMIT + 1);

        let related = self
            .list_products(&query)
            .await?
            .into_iter()
            .filter(|p| p.id != product.id)
            .take(RELATED_PRODUCTS_LIMIT as usize)
            .collect();

        Ok(related)
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Submit an order.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::MissingToken`] without a configured token, or
    /// an error if the backend rejects the order.
    #[instrument(skip(self, submission), fields(items = submission.order_items.len(), total = submission.total_price.amount()))]
    pub async fn create_order(&self, submission: &OrderSubmission) -> Result<Order, BackendError> {
        let url = self.endpoint(&["orders"])?;
        let request = self.authorized(self.inner.client.post(url).json(submission))?;
        let order: Order = self.execute(request).await?;
        debug!(order_id = %order.id, "Order created");
        Ok(order)
    }

    /// Orders placed by the authenticated customer.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::MissingToken`] without a configured token, or
    /// an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn my_orders(&self) -> Result<Vec<Order>, BackendError> {
        let url = self.endpoint(&["orders", "myorders"])?;
        let request = self.authorized(self.inner.client.get(url))?;
        self.execute(request).await
    }

    /// A single order.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] for an unknown ID, or an error if
    /// the API request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: &OrderId) -> Result<Order, BackendError> {
        let url = self.endpoint(&["orders", id.as_str()])?;
        let request = self.authorized(self.inner.client.get(url))?;
        self.execute(request).await
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(ERROR_BODY_EXCERPT).collect()
}
