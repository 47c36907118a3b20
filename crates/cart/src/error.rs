//! Cart operation errors.
//!
//! Every mutating operation returns `Result<_, CartError>`. None of these are
//! fatal and none leave the cart half-changed: mutation and persistence only
//! happen after every check has passed. There is no retry; the caller simply
//! invokes the operation again.

use rocketshoes_core::{InvariantError, ProductId};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::notify::Notice;

/// Errors returned by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Product display lookup failed while adding a product.
    #[error("Failed to add product {id}: {source}")]
    AdditionFailed {
        /// Product being added.
        id: ProductId,
        /// Catalog failure.
        #[source]
        source: CatalogError,
    },

    /// The product is not in the cart.
    #[error("Failed to remove product {id}: not in cart")]
    RemovalFailed {
        /// Product being removed.
        id: ProductId,
    },

    /// Stock lookup failed while changing an amount.
    #[error("Failed to update amount of product {id}: {source}")]
    AmountUpdateFailed {
        /// Product being updated.
        id: ProductId,
        /// Catalog failure.
        #[source]
        source: CatalogError,
    },

    /// Requested amount exceeds available stock.
    #[error("Insufficient stock for product {id}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Product being updated.
        id: ProductId,
        /// Requested amount.
        requested: i64,
        /// Units in stock.
        available: u32,
    },

    /// A mutation was refused because it would break a cart invariant.
    #[error("Cart invariant violated: {0}")]
    Invariant(#[from] InvariantError),
}

impl CartError {
    /// Product the failed operation targeted.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        match self {
            Self::AdditionFailed { id, .. }
            | Self::RemovalFailed { id }
            | Self::AmountUpdateFailed { id, .. }
            | Self::InsufficientStock { id, .. }
            | Self::Invariant(
                InvariantError::DuplicateProduct(id)
                | InvariantError::ZeroAmount(id)
                | InvariantError::NotInCart(id),
            ) => *id,
        }
    }

    /// User-facing notice for this error.
    #[must_use]
    pub const fn notice(&self) -> Notice {
        match self {
            Self::AdditionFailed { .. } => Notice::AdditionFailed,
            Self::RemovalFailed { .. } => Notice::RemovalFailed,
            Self::AmountUpdateFailed { .. } => Notice::AmountUpdateFailed,
            Self::InsufficientStock { .. } => Notice::InsufficientStock,
            Self::Invariant(InvariantError::DuplicateProduct(_)) => Notice::AdditionFailed,
            Self::Invariant(InvariantError::ZeroAmount(_)) => Notice::AmountUpdateFailed,
            Self::Invariant(InvariantError::NotInCart(_)) => Notice::RemovalFailed,
        }
    }

    /// Whether the failure came from the catalog rather than cart policy.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::AdditionFailed { .. } | Self::AmountUpdateFailed { .. }
        )
    }
}
