//! Cart context shared across presentation code.

use std::collections::BTreeMap;
use std::sync::Arc;

use rocketshoes_core::{Cart, CartItem, ProductDisplay, ProductId};
use tracing::instrument;

use crate::catalog::{CatalogError, HttpCatalog};
use crate::config::CartConfig;
use crate::error::CartError;
use crate::manager::CartManager;
use crate::notify::{NotificationSink, TracingSink};
use crate::store::FileStore;

/// Cart manager paired with the sink its failures are reported to.
///
/// This struct is cheaply cloneable via `Arc`. Every mutating operation
/// forwards a failure's notice to the sink and still returns the error, so
/// callers can both show a toast and react programmatically.
#[derive(Clone)]
pub struct CartContext {
    inner: Arc<CartContextInner>,
}

struct CartContextInner {
    manager: CartManager,
    sink: Arc<dyn NotificationSink>,
}

impl std::fmt::Debug for CartContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartContext")
            .field("manager", &self.inner.manager)
            .finish_non_exhaustive()
    }
}

impl CartContext {
    /// Create a context from an already hydrated manager.
    #[must_use]
    pub fn new(manager: CartManager, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            inner: Arc::new(CartContextInner { manager, sink }),
        }
    }

    /// Wire the HTTP catalog, the file store and the tracing sink from
    /// configuration, then hydrate the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &CartConfig) -> Result<Self, CatalogError> {
        let catalog = HttpCatalog::new(&config.catalog)?;
        let store = FileStore::new(&config.store_dir);
        let manager = CartManager::hydrate(
            Arc::new(catalog),
            Arc::new(store),
            config.snapshot_key.clone(),
        );

        Ok(Self::new(manager, Arc::new(TracingSink)))
    }

    /// Get a reference to the cart manager.
    #[must_use]
    pub fn manager(&self) -> &CartManager {
        &self.inner.manager
    }

    /// A copy of the current cart.
    pub async fn cart(&self) -> Cart {
        self.inner.manager.cart().await
    }

    /// The item for `id`, if the product is in the cart.
    pub async fn item(&self, id: ProductId) -> Option<CartItem> {
        self.inner.manager.item(id).await
    }

    /// Product id to amount for every item in the cart.
    pub async fn amounts(&self) -> BTreeMap<ProductId, u32> {
        self.inner.manager.amounts().await
    }

    /// Every product in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be reached.
    pub async fn products(&self) -> Result<Vec<ProductDisplay>, CatalogError> {
        self.inner.manager.catalog().products().await
    }

    /// Add one unit of a product, notifying on failure.
    ///
    /// # Errors
    ///
    /// See [`CartManager::add_item`].
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn add_item(&self, id: ProductId) -> Result<CartItem, CartError> {
        self.report(self.inner.manager.add_item(id).await)
    }

    /// Remove a product's item, notifying on failure.
    ///
    /// # Errors
    ///
    /// See [`CartManager::remove_item`].
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove_item(&self, id: ProductId) -> Result<CartItem, CartError> {
        self.report(self.inner.manager.remove_item(id).await)
    }

    /// Set a product's amount, notifying on failure.
    ///
    /// # Errors
    ///
    /// See [`CartManager::update_amount`].
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn update_amount(
        &self,
        id: ProductId,
        amount: i64,
    ) -> Result<Option<CartItem>, CartError> {
        self.report(self.inner.manager.update_amount(id, amount).await)
    }

    fn report<T>(&self, result: Result<T, CartError>) -> Result<T, CartError> {
        if let Err(e) = &result {
            self.inner.sink.notify(e.notice().message());
        }
        result
    }
}
