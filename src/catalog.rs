//! Product catalog collaborator.
//!
//! Read-only lookups against the store API. The catalog is not part of
//! the cart's state; it only supplies the denormalized snapshot captured
//! when a product is added.

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{cart::ProductSnapshot, config::StoreConfig};

/// A catalog item as returned by the store API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Opaque product identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Current price in whole currency units.
    pub price: u64,

    /// Pre-discount price, when the product is on offer.
    #[serde(default)]
    pub original_price: Option<u64>,

    /// Image references, first one is the primary image.
    #[serde(default)]
    pub images: Vec<String>,

    /// Average review rating.
    #[serde(default)]
    pub rating: f64,

    /// Number of reviews behind the rating.
    #[serde(default)]
    pub reviews_count: u64,

    /// Marketing feature bullet points.
    #[serde(default)]
    pub features: Vec<String>,

    /// Available delivery options.
    #[serde(default)]
    pub delivery_options: Vec<String>,

    /// Long-form description.
    #[serde(default)]
    pub description: String,
}

impl Product {
    /// The denormalized details a cart line captures at add time.
    #[must_use]
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            name: self.name.clone(),
            unit_price: self.price,
            image: self.images.first().cloned(),
        }
    }
}

/// Sort order for catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Cheapest first.
    PriceAscending,

    /// Most expensive first.
    PriceDescending,

    /// Best rated first.
    Rating,
}

impl SortOrder {
    fn as_str(self) -> &'static str {
        match self {
            Self::PriceAscending => "price_asc",
            Self::PriceDescending => "price_desc",
            Self::Rating => "rating",
        }
    }
}

/// Filter and sort criteria for a catalog listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Restrict to these categories. Empty means all categories.
    pub categories: Vec<String>,

    /// Lowest acceptable price, inclusive.
    pub min_price: Option<u64>,

    /// Highest acceptable price, inclusive.
    pub max_price: Option<u64>,

    /// Restrict to products carrying all of these tags.
    pub tags: Vec<String>,

    /// Requested ordering of the listing.
    pub sort: Option<SortOrder>,
}

impl ProductFilter {
    /// Render the filter as API query parameters.
    ///
    /// Multi-valued criteria are comma-joined, matching the store API's
    /// query format.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if !self.categories.is_empty() {
            pairs.push(("category", self.categories.join(",")));
        }

        if let Some(min_price) = self.min_price {
            pairs.push(("min_price", min_price.to_string()));
        }

        if let Some(max_price) = self.max_price {
            pairs.push(("max_price", max_price.to_string()));
        }

        if !self.tags.is_empty() {
            pairs.push(("tags", self.tags.join(",")));
        }

        if let Some(sort) = self.sort {
            pairs.push(("sort", sort.as_str().to_owned()));
        }

        pairs
    }
}

/// Errors that can occur while querying the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// An HTTP transport or deserialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store API returned a non-2xx response.
    #[error("unexpected response from store api: {0}")]
    UnexpectedResponse(String),
}

/// Read-only product catalog lookups.
#[automock]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// List the available product categories.
    async fn categories(&self) -> Result<Vec<String>, CatalogError>;

    /// List products matching the given filter.
    async fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>, CatalogError>;
}

/// HTTP client for the store catalog endpoints.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    config: StoreConfig,
    http: Client,
}

impl HttpCatalogClient {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CategoriesResponse {
    categories: Vec<String>,
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn categories(&self) -> Result<Vec<String>, CatalogError> {
        let url = format!("{}/api/store/categories", self.config.api_base);

        let response = self
            .http
            .get(&url)
            .timeout(self.config.request_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(CatalogError::UnexpectedResponse(format!(
                "categories request failed with status {status}: {text}"
            )));
        }

        let parsed: CategoriesResponse = response.json().await?;

        Ok(parsed.categories)
    }

    async fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>, CatalogError> {
        let url = format!("{}/api/store/products", self.config.api_base);

        let response = self
            .http
            .get(&url)
            .query(&filter.query_pairs())
            .timeout(self.config.request_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(CatalogError::UnexpectedResponse(format!(
                "products request failed with status {status}: {text}"
            )));
        }

        let products: Vec<Product> = response.json().await?;

        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn snapshot_takes_first_image() {
        let product = Product {
            id: "A".to_owned(),
            name: "Router".to_owned(),
            price: 100,
            original_price: None,
            images: vec!["/a-front.jpg".to_owned(), "/a-back.jpg".to_owned()],
            rating: 4.5,
            reviews_count: 12,
            features: vec![],
            delivery_options: vec![],
            description: String::new(),
        };

        let snapshot = product.snapshot();

        assert_eq!(snapshot.name, "Router");
        assert_eq!(snapshot.unit_price, 100);
        assert_eq!(snapshot.image.as_deref(), Some("/a-front.jpg"));
    }

    #[test]
    fn empty_filter_produces_no_query_pairs() {
        assert!(ProductFilter::default().query_pairs().is_empty());
    }

    #[test]
    fn filter_joins_multi_valued_criteria_with_commas() {
        let filter = ProductFilter {
            categories: vec!["electronics".to_owned(), "appliances".to_owned()],
            min_price: Some(1000),
            max_price: Some(500_000),
            tags: vec!["wifi".to_owned(), "dual-band".to_owned()],
            sort: Some(SortOrder::PriceAscending),
        };

        assert_eq!(
            filter.query_pairs(),
            vec![
                ("category", "electronics,appliances".to_owned()),
                ("min_price", "1000".to_owned()),
                ("max_price", "500000".to_owned()),
                ("tags", "wifi,dual-band".to_owned()),
                ("sort", "price_asc".to_owned()),
            ]
        );
    }

    #[test]
    fn product_parses_with_missing_optional_fields() -> TestResult {
        let product: Product = serde_json::from_str(
            r#"{"id": "A", "name": "Router", "price": 100}"#,
        )?;

        assert_eq!(product.id, "A");
        assert!(product.original_price.is_none());
        assert!(product.images.is_empty());

        Ok(())
    }
}
