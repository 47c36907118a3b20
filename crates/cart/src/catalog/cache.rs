//! Cache types for catalog responses.
//!
//! Only display data is cached. Stock levels are always fetched fresh because
//! the stock guard must see the current availability.

use rocketshoes_core::{ProductDisplay, ProductId};

/// Cache key for catalog responses.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Products,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<ProductDisplay>),
    Products(Vec<ProductDisplay>),
}
