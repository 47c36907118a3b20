//! Catalog records returned by the remote store.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// Display metadata for a catalog product.
///
/// This is what the catalog returns for `products/{id}`; it carries no
/// quantity. A [`CartItem`](super::CartItem) is this record plus an amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDisplay {
    /// Catalog product identifier.
    pub id: ProductId,
    /// Product title.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Image URL.
    pub image: String,
}

/// Available quantity for a product, as reported by `stock/{id}`.
///
/// Transient: stock is always fetched fresh and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    /// Catalog product identifier.
    pub id: ProductId,
    /// Units currently available.
    pub amount: u32,
}

impl StockRecord {
    /// Whether `requested` units can be taken from this stock.
    ///
    /// Negative and zero requests always fit; callers treat them as no-ops
    /// before consulting stock.
    #[must_use]
    pub fn covers(&self, requested: i64) -> bool {
        requested <= i64::from(self.amount)
    }
}
