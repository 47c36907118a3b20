//! Test doubles for the catalog, the store and the notification sink.
//!
//! Available to this crate's unit tests and, through the `testing` feature,
//! to downstream integration tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rocketshoes_core::{Price, ProductDisplay, ProductId, StockRecord};

use crate::catalog::{CatalogError, CatalogService};
use crate::notify::NotificationSink;
use crate::store::{DurableStore, StoreError};

/// Build a product display with a predictable image URL.
#[must_use]
pub fn shoe(id: i32, title: &str, price: Price) -> ProductDisplay {
    ProductDisplay {
        id: ProductId::new(id),
        title: title.to_string(),
        price,
        image: format!("https://cdn.example/shoes/{id}.jpg"),
    }
}

// =============================================================================
// FakeCatalog
// =============================================================================

/// In-memory catalog with switchable failures and call counters.
#[derive(Debug, Default)]
pub struct FakeCatalog {
    products: Mutex<HashMap<ProductId, ProductDisplay>>,
    stock: Mutex<HashMap<ProductId, StockRecord>>,
    offline: AtomicBool,
    delay: Mutex<Option<Duration>>,
    product_calls: AtomicUsize,
    stock_calls: AtomicUsize,
}

impl FakeCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product with `stock` units available.
    #[must_use]
    pub fn with_product(self, display: ProductDisplay, stock: u32) -> Self {
        self.insert(display, stock);
        self
    }

    /// Add or replace a product and its stock.
    pub fn insert(&self, display: ProductDisplay, stock: u32) {
        let id = display.id;
        lock(&self.products).insert(id, display);
        lock(&self.stock).insert(id, StockRecord { id, amount: stock });
    }

    /// Answer display lookups for `id` with `display`, whatever its own id.
    pub fn serve_display(&self, id: ProductId, display: ProductDisplay) {
        lock(&self.products).insert(id, display);
    }

    /// Change the stock of a product.
    pub fn set_stock(&self, id: ProductId, amount: u32) {
        lock(&self.stock).insert(id, StockRecord { id, amount });
    }

    /// Answer stock lookups for `id` with `record`, whatever its own id.
    pub fn serve_stock(&self, id: ProductId, record: StockRecord) {
        lock(&self.stock).insert(id, record);
    }

    /// Make every lookup fail with a 503 until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Sleep this long inside every lookup.
    pub fn set_delay(&self, delay: Duration) {
        *lock(&self.delay) = Some(delay);
    }

    /// Number of product display lookups served.
    #[must_use]
    pub fn product_calls(&self) -> usize {
        self.product_calls.load(Ordering::SeqCst)
    }

    /// Number of stock lookups served.
    #[must_use]
    pub fn stock_calls(&self) -> usize {
        self.stock_calls.load(Ordering::SeqCst)
    }

    async fn respond(&self, path: String) -> Result<(), CatalogError> {
        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(CatalogError::Status { status: 503, path });
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogService for FakeCatalog {
    async fn product(&self, id: ProductId) -> Result<ProductDisplay, CatalogError> {
        self.product_calls.fetch_add(1, Ordering::SeqCst);
        let path = format!("products/{id}");
        self.respond(path.clone()).await?;
        lock(&self.products)
            .get(&id)
            .cloned()
            .ok_or(CatalogError::NotFound(path))
    }

    async fn stock(&self, id: ProductId) -> Result<StockRecord, CatalogError> {
        self.stock_calls.fetch_add(1, Ordering::SeqCst);
        let path = format!("stock/{id}");
        self.respond(path.clone()).await?;
        lock(&self.stock)
            .get(&id)
            .copied()
            .ok_or(CatalogError::NotFound(path))
    }

    async fn products(&self) -> Result<Vec<ProductDisplay>, CatalogError> {
        self.respond("products".to_string()).await?;
        let mut all: Vec<_> = lock(&self.products).values().cloned().collect();
        all.sort_by_key(|display| display.id);
        Ok(all)
    }
}

// =============================================================================
// RecordingSink
// =============================================================================

/// Sink that remembers every message it was given.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        lock(&self.messages).clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, message: &str) {
        lock(&self.messages).push(message.to_string());
    }
}

// =============================================================================
// ReadOnlyStore
// =============================================================================

/// Store whose writes always fail; reads see whatever it was seeded with.
#[derive(Debug, Default)]
pub struct ReadOnlyStore {
    seeded: HashMap<String, Vec<u8>>,
    rejected: AtomicUsize,
}

impl ReadOnlyStore {
    /// Create a store with nothing in it.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that serves `bytes` under `key`.
    #[must_use]
    pub fn seeded(key: &str, bytes: &[u8]) -> Self {
        Self {
            seeded: HashMap::from([(key.to_string(), bytes.to_vec())]),
            rejected: AtomicUsize::new(0),
        }
    }

    /// Number of writes refused.
    #[must_use]
    pub fn rejected_writes(&self) -> usize {
        self.rejected.load(Ordering::SeqCst)
    }
}

impl DurableStore for ReadOnlyStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.seeded.get(key).cloned())
    }

    fn write(&self, key: &str, _bytes: &[u8]) -> Result<(), StoreError> {
        self.rejected.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Io {
            path: key.into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only store"),
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
