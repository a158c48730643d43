//! Catalog commands.
//!
//! # Usage
//!
//! ```bash
//! dapur products list --search "es teh"
//! dapur products list --featured --limit 4
//! dapur products show 665f1c2b9a
//! dapur products categories
//! ```

use dapur_core::{Product, ProductId};
use dapur_storefront::backend::ProductQuery;
use dapur_storefront::error::Result;
use dapur_storefront::state::AppState;
use tracing::info;

/// Filters accepted by `products list`.
pub struct ListFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub featured: bool,
    pub limit: Option<u32>,
}

impl ListFilter {
    fn into_query(self) -> ProductQuery {
        let mut query = ProductQuery::new();
        if let Some(search) = self.search {
            query = query.search(search);
        }
        if let Some(category) = self.category {
            query = query.category(category);
        }
        if self.featured {
            query = query.featured(true);
        }
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        query
    }
}

/// List products matching the filter.
///
/// # Errors
///
/// Returns an error if the backend request fails.
pub async fn list(state: &AppState, filter: ListFilter) -> Result<()> {
    let products = state.backend().list_products(&filter.into_query()).await?;

    if products.is_empty() {
        info!("No products found");
        return Ok(());
    }

    for product in &products {
        info!("{}", summary(product));
    }
    info!("{} product(s)", products.len());
    Ok(())
}

/// Show one product with its related products.
///
/// # Errors
///
/// Returns an error if the product does not exist or the backend request
/// fails.
pub async fn show(state: &AppState, id: &ProductId) -> Result<()> {
    let backend = state.backend();
    let product = backend.get_product(id).await?;

    info!("{}", product.name);
    info!("  ID:       {}", product.id);
    info!("  Price:    {}", product.price);
    info!("  Category: {}", product.category);
    info!("  Stock:    {}", stock_label(&product));
    info!("  Image:    {}", product.image_url(backend.base_url().as_str()));
    if !product.description.is_empty() {
        info!("  {}", product.description);
    }

    let in_cart = state.cart().cart().quantity_of(&product.id);
    if in_cart > 0 {
        info!("  In cart:  {in_cart}");
    }

    let related = backend.related_products(&product).await?;
    if !related.is_empty() {
        info!("Related:");
        for product in &related {
            info!("  {}", summary(product));
        }
    }
    Ok(())
}

/// List product categories.
///
/// # Errors
///
/// Returns an error if the backend request fails.
pub async fn categories(state: &AppState) -> Result<()> {
    for category in state.backend().categories().await? {
        info!("{category}");
    }
    Ok(())
}

fn summary(product: &Product) -> String {
    let featured = if product.featured { " *" } else { "" };
    format!(
        "{}  {}{featured}  {}  [{}]",
        product.id,
        product.name,
        product.price,
        stock_label(product)
    )
}

fn stock_label(product: &Product) -> String {
    if product.is_available() {
        format!("{} left", product.in_stock)
    } else {
        "Stok habis".to_string()
    }
}
