//! Catalog service: product display data and stock levels.
//!
//! # Architecture
//!
//! - The remote store is the source of truth for products and stock
//! - [`CatalogService`] is the seam the cart manager depends on
//! - [`HttpCatalog`] talks to the store's JSON REST API
//! - Product displays are cached in memory via `moka`; stock never is
//!
//! # Routes
//!
//! - `GET products` - all product displays
//! - `GET products/{id}` - one product display
//! - `GET stock/{id}` - available quantity for one product

mod cache;
mod client;

pub use client::HttpCatalog;

use async_trait::async_trait;
use rocketshoes_core::{ProductDisplay, ProductId, StockRecord};
use thiserror::Error;

/// Errors that can occur when talking to the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Catalog answered with an unexpected status code.
    #[error("Catalog returned HTTP {status} for {path}")]
    Status {
        /// Response status code.
        status: u16,
        /// Requested route.
        path: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Catalog answered with a different product than the one requested.
    #[error("Requested product {requested} but catalog returned {returned}")]
    UnexpectedProduct {
        /// Product that was asked for.
        requested: ProductId,
        /// Product the catalog sent back.
        returned: ProductId,
    },

    /// Request URL could not be built from the base URL.
    #[error("Invalid catalog URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Read-only access to the remote catalog.
///
/// Both lookups are idempotent; implementations may be slow or fail and the
/// cart manager tolerates either.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Display metadata for one product.
    async fn product(&self, id: ProductId) -> Result<ProductDisplay, CatalogError>;

    /// Current stock for one product.
    async fn stock(&self, id: ProductId) -> Result<StockRecord, CatalogError>;

    /// Every product in the catalog, for listing pages.
    async fn products(&self) -> Result<Vec<ProductDisplay>, CatalogError>;
}
