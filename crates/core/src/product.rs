//! Product snapshot as served by the backend.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Image shown when a product has no usable image reference.
pub const FALLBACK_IMAGE_URL: &str =
    "https://images.pexels.com/photos/4518843/pexels-photo-4518843.jpeg";

/// A product as returned by `GET /api/products`.
///
/// The backend owns products; the storefront treats a `Product` as an
/// immutable snapshot for the duration of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Backend document ID.
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Long description.
    #[serde(default)]
    pub description: String,
    /// Unit price in rupiah.
    pub price: Price,
    /// Category label (e.g. "Makanan", "Minuman").
    #[serde(default)]
    pub category: String,
    /// Units available for sale.
    #[serde(default)]
    pub in_stock: u32,
    /// Shown on the home page.
    #[serde(default)]
    pub featured: bool,
    /// Absolute URL or a path relative to the backend host.
    #[serde(default)]
    pub image: String,
}

impl Product {
    /// Returns `true` if at least one unit can be ordered.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.in_stock > 0
    }

    /// Resolve the image reference against the backend base URL.
    ///
    /// See [`resolve_image_url`].
    #[must_use]
    pub fn image_url(&self, api_base: &str) -> String {
        resolve_image_url(&self.image, api_base)
    }
}

/// Resolve an image reference to a URL a client can load.
///
/// Absolute `http(s)` URLs are returned unchanged, paths are joined to the
/// backend base URL, and an empty reference maps to [`FALLBACK_IMAGE_URL`].
///
/// ```
/// use dapur_core::product::resolve_image_url;
///
/// assert_eq!(
///     resolve_image_url("/uploads/nasi.jpg", "https://api.dapur.id/"),
///     "https://api.dapur.id/uploads/nasi.jpg"
/// );
/// ```
#[must_use]
pub fn resolve_image_url(image: &str, api_base: &str) -> String {
    let image = image.trim();
    if image.is_empty() {
        return FALLBACK_IMAGE_URL.to_string();
    }
    if image.starts_with("http://") || image.starts_with("https://") {
        return image.to_string();
    }
    let base = api_base.trim_end_matches('/');
    if image.starts_with('/') {
        format!("{base}{image}")
    } else {
        format!("{base}/{image}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_product() {
        let json = r#"{
            "_id": "p1",
            "name": "Nasi Goreng",
            "description": "Nasi goreng spesial",
            "price": 25000,
            "category": "Makanan",
            "inStock": 12,
            "featured": true,
            "image": "/uploads/nasi.jpg",
            "createdAt": "2024-05-01T10:00:00.000Z"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.price, Price::new(25_000));
        assert_eq!(product.in_stock, 12);
        assert!(product.featured);
        assert!(product.is_available());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{"_id": "p2", "name": "Es Teh", "price": 5000}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.in_stock, 0);
        assert!(!product.is_available());
        assert_eq!(
            product.image_url("http://localhost:5000"),
            FALLBACK_IMAGE_URL
        );
    }

    #[test]
    fn test_resolve_image_url() {
        assert_eq!(
            resolve_image_url("https://cdn.example.com/a.jpg", "http://api"),
            "https://cdn.example.com/a.jpg"
        );
        assert_eq!(
            resolve_image_url("uploads/a.jpg", "http://api"),
            "http://api/uploads/a.jpg"
        );
        assert_eq!(
            resolve_image_url("/uploads/a.jpg", "http://api/"),
            "http://api/uploads/a.jpg"
        );
    }
}
