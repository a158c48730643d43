//! Wire types for the backend REST API.

use serde::Deserialize;
use url::Url;

/// Standard response envelope: `{ "success": true, "data": ..., "message": ... }`.
#[derive(Debug, Deserialize)]
pub(super) struct ApiResponse<T> {
    #[serde(default)]
    pub success: Option<bool>,
    pub data: T,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body; only `message` is relied upon.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Filters for `GET /api/products`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    /// Free-text search on name/description.
    pub search: Option<String>,
    /// Exact category label.
    pub category: Option<String>,
    /// Only featured products.
    pub featured: Option<bool>,
    /// Maximum number of products returned.
    pub limit: Option<u32>,
}

impl ProductQuery {
    /// Query with no filters (all products).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by search text. Blank text is ignored.
    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into()).filter(|s| !s.trim().is_empty());
        self
    }

    /// Filter by category. A blank category is ignored.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into()).filter(|s| !s.trim().is_empty());
        self
    }

    /// Only featured products.
    #[must_use]
    pub const fn featured(mut self, featured: bool) -> Self {
        self.featured = Some(featured);
        self
    }

    /// Cap the number of results.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns `true` if the results depend on user-entered search text.
    #[must_use]
    pub const fn is_search(&self) -> bool {
        self.search.is_some()
    }

    /// Append the filters to `url` as query parameters.
    pub(super) fn apply(&self, url: &mut Url) {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(featured) = self.featured {
            pairs.push(("featured", featured.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }

        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_adds_nothing() {
        let mut url = Url::parse("http://localhost/api/products").unwrap();
        ProductQuery::new().apply(&mut url);
        assert_eq!(url.as_str(), "http://localhost/api/products");
    }

    #[test]
    fn test_query_encoding() {
        let mut url = Url::parse("http://localhost/api/products").unwrap();
        ProductQuery::new()
            .search("es teh")
            .category("Minuman")
            .featured(true)
            .limit(4)
            .apply(&mut url);
        assert_eq!(
            url.query(),
            Some("search=es+teh&category=Minuman&featured=true&limit=4")
        );
    }

    #[test]
    fn test_blank_filters_ignored() {
        let query = ProductQuery::new().search("  ").category("");
        assert!(!query.is_search());
        assert_eq!(query, ProductQuery::new());
    }

    #[test]
    fn test_envelope() {
        let body = r#"{"success": true, "count": 2, "data": ["Makanan", "Minuman"]}"#;
        let response: ApiResponse<Vec<String>> = serde_json::from_str(body).unwrap();
        assert_eq!(response.success, Some(true));
        assert_eq!(response.data.len(), 2);
        assert!(response.message.is_none());
    }
}
