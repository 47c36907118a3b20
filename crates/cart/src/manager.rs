//! Cart state manager.
//!
//! [`CartManager`] owns the authoritative in-memory [`Cart`] and is the only
//! writer of its durable snapshot. Every operation:
//!
//! 1. Takes the writer lock
//! 2. Consults the catalog (stock before any amount increase, display data
//!    before appending a new product)
//! 3. Mutates the cart only if every check passed
//! 4. Rewrites the full snapshot on a blocking thread
//!
//! The writer lock is held across the catalog round trip, so two operations
//! can never interleave and overwrite each other's results. The cart itself
//! sits behind a separate read-write lock that is only write-locked for the
//! mutation, so readers never wait on the network.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rocketshoes_core::{Cart, CartItem, ProductId};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

use crate::catalog::{CatalogError, CatalogService};
use crate::error::CartError;
use crate::snapshot;
use crate::store::DurableStore;

/// Authoritative cart state plus the catalog and store it depends on.
pub struct CartManager {
    catalog: Arc<dyn CatalogService>,
    store: Arc<dyn DurableStore>,
    snapshot_key: String,
    cart: RwLock<Cart>,
    writer: Mutex<()>,
}

impl fmt::Debug for CartManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartManager")
            .field("snapshot_key", &self.snapshot_key)
            .finish_non_exhaustive()
    }
}

impl CartManager {
    /// Create a manager, hydrating the cart from the snapshot under `snapshot_key`.
    ///
    /// A missing or malformed snapshot yields an empty cart.
    pub fn hydrate(
        catalog: Arc<dyn CatalogService>,
        store: Arc<dyn DurableStore>,
        snapshot_key: impl Into<String>,
    ) -> Self {
        let snapshot_key = snapshot_key.into();
        let cart = snapshot::load(store.as_ref(), &snapshot_key);
        info!(key = %snapshot_key, items = cart.len(), "Cart ready");

        Self {
            catalog,
            store,
            snapshot_key,
            cart: RwLock::new(cart),
            writer: Mutex::new(()),
        }
    }

    /// Key the snapshot is stored under.
    #[must_use]
    pub fn snapshot_key(&self) -> &str {
        &self.snapshot_key
    }

    /// Catalog this manager consults.
    #[must_use]
    pub fn catalog(&self) -> &Arc<dyn CatalogService> {
        &self.catalog
    }

    /// A copy of the current cart.
    pub async fn cart(&self) -> Cart {
        self.cart.read().await.clone()
    }

    /// The item for `id`, if the product is in the cart.
    pub async fn item(&self, id: ProductId) -> Option<CartItem> {
        self.cart.read().await.get(id).cloned()
    }

    /// Product id to amount for every item in the cart.
    pub async fn amounts(&self) -> BTreeMap<ProductId, u32> {
        self.cart.read().await.amounts()
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart goes through the amount update path with
    /// its current amount plus one, stock check included. A new product is
    /// appended with amount 1 after fetching its display data; stock is not
    /// consulted for the first unit.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AdditionFailed`] if display data cannot be
    /// fetched, or any error of [`update_amount`](Self::update_amount) for a
    /// product already in the cart.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn add_item(&self, id: ProductId) -> Result<CartItem, CartError> {
        let _writer = self.writer.lock().await;

        let current = self.cart.read().await.get(id).map(|item| item.amount);
        match current {
            Some(current) => self.update_locked(id, i64::from(current) + 1).await,
            None => self.append_locked(id).await,
        }
    }

    /// Remove a product's item entirely.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::RemovalFailed`] if the product is not in the cart.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove_item(&self, id: ProductId) -> Result<CartItem, CartError> {
        let _writer = self.writer.lock().await;

        let removed = self
            .commit(|cart| {
                cart.remove(id).ok_or_else(|| {
                    debug!("Product not in cart");
                    CartError::RemovalFailed { id }
                })
            })
            .await?;

        info!("Removed product from cart");
        Ok(removed)
    }

    /// Set a product's amount to an absolute value.
    ///
    /// Amounts of zero or below are ignored and return `Ok(None)` without
    /// touching the catalog. Otherwise stock is checked first. If the product
    /// is not in the cart yet it is added with amount 1 and the requested
    /// amount is discarded.
    ///
    /// # Errors
    ///
    /// - [`CartError::AmountUpdateFailed`] if stock cannot be fetched
    /// - [`CartError::InsufficientStock`] if `amount` exceeds stock
    /// - [`CartError::AdditionFailed`] if the product had to be added and its
    ///   display data cannot be fetched
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn update_amount(
        &self,
        id: ProductId,
        amount: i64,
    ) -> Result<Option<CartItem>, CartError> {
        if amount <= 0 {
            debug!("Ignoring non-positive amount");
            return Ok(None);
        }

        let _writer = self.writer.lock().await;
        self.update_locked(id, amount).await.map(Some)
    }

    /// Amount update path. Caller holds the writer lock.
    async fn update_locked(&self, id: ProductId, requested: i64) -> Result<CartItem, CartError> {
        let stock = self
            .catalog
            .stock(id)
            .await
            .map_err(|source| {
                warn!(error = %source, "Stock lookup failed");
                CartError::AmountUpdateFailed { id, source }
            })?;

        if stock.id != id {
            let returned = stock.id;
            warn!(%returned, "Catalog returned stock for a different product");
            return Err(CartError::AmountUpdateFailed {
                id,
                source: CatalogError::UnexpectedProduct {
                    requested: id,
                    returned,
                },
            });
        }

        let amount = match u32::try_from(requested) {
            Ok(amount) if stock.covers(requested) => amount,
            _ => {
                warn!(requested, available = stock.amount, "Insufficient stock");
                return Err(CartError::InsufficientStock {
                    id,
                    requested,
                    available: stock.amount,
                });
            }
        };

        let in_cart = self.cart.read().await.contains(id);
        if !in_cart {
            debug!(requested, "Product not in cart, adding a single unit instead");
            return self.append_locked(id).await;
        }

        let updated = self
            .commit(|cart| Ok(cart.set_amount(id, amount)?.clone()))
            .await?;
        info!(amount, "Updated product amount");
        Ok(updated)
    }

    /// Add path for a product not yet in the cart. Caller holds the writer lock.
    async fn append_locked(&self, id: ProductId) -> Result<CartItem, CartError> {
        let product = self
            .catalog
            .product(id)
            .await
            .map_err(|source| {
                warn!(error = %source, "Product lookup failed");
                CartError::AdditionFailed { id, source }
            })?;

        if product.id != id {
            let returned = product.id;
            warn!(%returned, "Catalog returned a different product");
            return Err(CartError::AdditionFailed {
                id,
                source: CatalogError::UnexpectedProduct {
                    requested: id,
                    returned,
                },
            });
        }

        let item = CartItem::new(product, 1);
        let added = item.clone();
        self.commit(move |cart| cart.push(item).map_err(CartError::from))
            .await?;
        info!("Added product to cart");
        Ok(added)
    }

    /// Apply `change` to the cart and persist the result.
    ///
    /// The write lock is released before the snapshot is written. A failed
    /// `change` leaves the cart and the snapshot untouched.
    async fn commit<T, F>(&self, change: F) -> Result<T, CartError>
    where
        T: Send,
        F: FnOnce(&mut Cart) -> Result<T, CartError> + Send,
    {
        let (value, encoded) = {
            let mut cart = self.cart.write().await;
            let value = change(&mut *cart)?;
            (value, snapshot::encode(&cart))
        };

        match encoded {
            Ok(bytes) => self.persist(bytes).await,
            Err(e) => error!(key = %self.snapshot_key, error = %e, "Failed to encode cart snapshot"),
        }
        Ok(value)
    }

    /// Write the snapshot off the async runtime. A failed write is logged and
    /// otherwise ignored; the in-memory cart stays authoritative for the rest
    /// of the session.
    async fn persist(&self, bytes: Vec<u8>) {
        let store = Arc::clone(&self.store);
        let key = self.snapshot_key.clone();

        match tokio::task::spawn_blocking(move || store.write(&key, &bytes)).await {
            Ok(Ok(())) => debug!("Persisted cart snapshot"),
            Ok(Err(e)) => {
                error!(key = %self.snapshot_key, error = %e, "Failed to persist cart snapshot");
            }
            Err(e) => {
                error!(key = %self.snapshot_key, error = %e, "Snapshot write task failed");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use rocketshoes_core::{Price, StockRecord};

    use super::*;
    use crate::store::{DurableStore, MemoryStore};
    use crate::testing::{FakeCatalog, ReadOnlyStore, shoe};

    const KEY: &str = "@RocketShoes:cart";

    fn setup(catalog: FakeCatalog) -> (CartManager, Arc<FakeCatalog>, Arc<MemoryStore>) {
        let catalog = Arc::new(catalog);
        let store = Arc::new(MemoryStore::new());
        let manager = CartManager::hydrate(catalog.clone(), store.clone(), KEY);
        (manager, catalog, store)
    }

    fn stored(store: &MemoryStore) -> Cart {
        let bytes = store.read(KEY).unwrap().unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn seven() -> FakeCatalog {
        FakeCatalog::new().with_product(shoe(7, "Shoe", Price::from_cents(9_990)), 5)
    }

    #[tokio::test]
    async fn test_add_new_product_skips_stock() {
        let (manager, catalog, store) = setup(seven());
        let id = ProductId::new(7);

        let item = manager.add_item(id).await.unwrap();

        assert_eq!(item.amount, 1);
        assert_eq!(item.title, "Shoe");
        assert_eq!(catalog.stock_calls(), 0);
        assert_eq!(stored(&store).get(id).unwrap().amount, 1);
    }

    #[tokio::test]
    async fn test_add_existing_product_checks_stock() {
        let (manager, catalog, _store) = setup(seven());
        let id = ProductId::new(7);

        manager.add_item(id).await.unwrap();
        let item = manager.add_item(id).await.unwrap();

        assert_eq!(item.amount, 2);
        assert_eq!(catalog.stock_calls(), 1);
        assert_eq!(catalog.product_calls(), 1);
    }

    #[tokio::test]
    async fn test_add_existing_product_at_stock_limit() {
        let (manager, catalog, store) = setup(seven());
        let id = ProductId::new(7);
        manager.add_item(id).await.unwrap();
        catalog.set_stock(id, 1);

        let err = manager.add_item(id).await.unwrap_err();

        assert!(matches!(
            err,
            CartError::InsufficientStock {
                requested: 2,
                available: 1,
                ..
            }
        ));
        assert_eq!(manager.item(id).await.unwrap().amount, 1);
        assert_eq!(stored(&store).get(id).unwrap().amount, 1);
    }

    #[tokio::test]
    async fn test_add_unknown_product_fails() {
        let (manager, _catalog, store) = setup(seven());

        let err = manager.add_item(ProductId::new(99)).await.unwrap_err();

        assert!(matches!(err, CartError::AdditionFailed { .. }));
        assert!(manager.cart().await.is_empty());
        assert!(store.read(KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_rejects_mismatched_display() {
        let catalog = FakeCatalog::new();
        catalog.serve_display(ProductId::new(7), shoe(8, "Boot", Price::from_cents(100)));
        let (manager, _catalog, _store) = setup(catalog);

        let err = manager.add_item(ProductId::new(7)).await.unwrap_err();

        assert!(matches!(
            err,
            CartError::AdditionFailed {
                source: CatalogError::UnexpectedProduct { .. },
                ..
            }
        ));
        assert!(manager.cart().await.is_empty());
    }

    #[tokio::test]
    async fn test_update_rejects_mismatched_stock() {
        let (manager, catalog, store) = setup(seven());
        let id = ProductId::new(7);
        manager.add_item(id).await.unwrap();
        catalog.serve_stock(
            id,
            StockRecord {
                id: ProductId::new(8),
                amount: 50,
            },
        );

        let err = manager.update_amount(id, 3).await.unwrap_err();

        assert!(matches!(
            err,
            CartError::AmountUpdateFailed {
                source: CatalogError::UnexpectedProduct { .. },
                ..
            }
        ));
        assert_eq!(manager.item(id).await.unwrap().amount, 1);
        assert_eq!(stored(&store).get(id).unwrap().amount, 1);
    }

    #[tokio::test]
    async fn test_reads_do_not_wait_for_catalog() {
        let (manager, catalog, _store) = setup(seven());
        let manager = Arc::new(manager);
        let id = ProductId::new(7);
        manager.add_item(id).await.unwrap();
        catalog.set_delay(Duration::from_millis(500));

        let pending = tokio::spawn({
            let manager = Arc::clone(&manager);
            async move { manager.add_item(id).await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let amounts = tokio::time::timeout(Duration::from_millis(100), manager.amounts())
            .await
            .unwrap();
        assert_eq!(amounts.get(&id), Some(&1));
        assert!(!pending.is_finished());

        assert_eq!(pending.await.unwrap().unwrap().amount, 2);
        assert_eq!(manager.item(id).await.unwrap().amount, 2);
    }

    #[tokio::test]
    async fn test_add_while_catalog_offline() {
        let (manager, catalog, _store) = setup(seven());
        catalog.set_offline(true);

        let err = manager.add_item(ProductId::new(7)).await.unwrap_err();

        assert!(err.is_remote());
        assert!(manager.cart().await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_item() {
        let catalog = seven().with_product(shoe(8, "Boot", Price::from_cents(12_000)), 2);
        let (manager, _catalog, store) = setup(catalog);
        manager.add_item(ProductId::new(7)).await.unwrap();
        manager.add_item(ProductId::new(8)).await.unwrap();

        let removed = manager.remove_item(ProductId::new(7)).await.unwrap();

        assert_eq!(removed.id, ProductId::new(7));
        let cart = stored(&store);
        assert_eq!(cart.len(), 1);
        assert!(cart.contains(ProductId::new(8)));
    }

    #[tokio::test]
    async fn test_remove_missing_item_fails() {
        let (manager, _catalog, store) = setup(seven());

        let err = manager.remove_item(ProductId::new(7)).await.unwrap_err();

        assert!(matches!(err, CartError::RemovalFailed { .. }));
        assert!(store.read(KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_amount_within_stock() {
        let (manager, _catalog, store) = setup(seven());
        let id = ProductId::new(7);
        manager.add_item(id).await.unwrap();

        let item = manager.update_amount(id, 5).await.unwrap().unwrap();

        assert_eq!(item.amount, 5);
        assert_eq!(stored(&store).get(id).unwrap().amount, 5);
    }

    #[tokio::test]
    async fn test_update_amount_beyond_stock() {
        let (manager, _catalog, _store) = setup(seven());
        let id = ProductId::new(7);
        manager.add_item(id).await.unwrap();
        manager.update_amount(id, 3).await.unwrap();

        let err = manager.update_amount(id, 10).await.unwrap_err();

        assert!(matches!(
            err,
            CartError::InsufficientStock {
                requested: 10,
                available: 5,
                ..
            }
        ));
        assert_eq!(manager.item(id).await.unwrap().amount, 3);
    }

    #[tokio::test]
    async fn test_update_amount_beyond_u32_is_insufficient() {
        let (manager, _catalog, _store) = setup(seven());
        let id = ProductId::new(7);
        manager.add_item(id).await.unwrap();

        let err = manager.update_amount(id, i64::MAX).await.unwrap_err();

        assert!(matches!(err, CartError::InsufficientStock { .. }));
    }

    #[tokio::test]
    async fn test_update_amount_non_positive_is_noop() {
        let (manager, catalog, store) = setup(seven());
        let id = ProductId::new(7);
        manager.add_item(id).await.unwrap();

        assert!(manager.update_amount(id, 0).await.unwrap().is_none());
        assert!(manager.update_amount(id, -3).await.unwrap().is_none());

        assert_eq!(catalog.stock_calls(), 0);
        assert_eq!(stored(&store).get(id).unwrap().amount, 1);
    }

    #[tokio::test]
    async fn test_update_amount_stock_lookup_failure() {
        let (manager, catalog, _store) = setup(seven());
        let id = ProductId::new(7);
        manager.add_item(id).await.unwrap();
        catalog.set_offline(true);

        let err = manager.update_amount(id, 2).await.unwrap_err();

        assert!(matches!(err, CartError::AmountUpdateFailed { .. }));
        assert_eq!(manager.item(id).await.unwrap().amount, 1);
    }

    #[tokio::test]
    async fn test_update_amount_on_missing_product_adds_one() {
        let (manager, catalog, _store) = setup(seven());
        let id = ProductId::new(7);

        let item = manager.update_amount(id, 4).await.unwrap().unwrap();

        assert_eq!(item.amount, 1);
        assert_eq!(catalog.stock_calls(), 1);
        assert_eq!(catalog.product_calls(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_position() {
        let catalog = seven()
            .with_product(shoe(8, "Boot", Price::from_cents(12_000)), 9)
            .with_product(shoe(9, "Sandal", Price::from_cents(4_500)), 9);
        let (manager, _catalog, _store) = setup(catalog);
        for id in [7, 8, 9] {
            manager.add_item(ProductId::new(id)).await.unwrap();
        }

        manager.update_amount(ProductId::new(8), 4).await.unwrap();

        let ids: Vec<i32> = manager
            .cart()
            .await
            .iter()
            .map(|item| item.id.as_i32())
            .collect();
        assert_eq!(ids, vec![7, 8, 9]);
    }

    #[tokio::test]
    async fn test_hydrates_from_existing_snapshot() {
        let catalog = Arc::new(seven());
        let store = Arc::new(MemoryStore::new());
        let first = CartManager::hydrate(catalog.clone(), store.clone(), KEY);
        first.add_item(ProductId::new(7)).await.unwrap();
        first.add_item(ProductId::new(7)).await.unwrap();

        let second = CartManager::hydrate(catalog, store, KEY);

        assert_eq!(second.cart().await, first.cart().await);
        assert_eq!(second.snapshot_key(), KEY);
    }

    #[tokio::test]
    async fn test_store_write_failure_keeps_memory_state() {
        let catalog = Arc::new(seven());
        let store = Arc::new(ReadOnlyStore::new());
        let manager = CartManager::hydrate(catalog, store.clone(), KEY);

        let item = manager.add_item(ProductId::new(7)).await.unwrap();

        assert_eq!(item.amount, 1);
        assert_eq!(manager.amounts().await.get(&ProductId::new(7)), Some(&1));
        assert_eq!(store.rejected_writes(), 1);
    }
}
