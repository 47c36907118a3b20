//! Integration tests for the RocketShoes cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_operations` - add, update and remove through the cart context
//! - `persistence` - snapshots on disk and hydration into a fresh manager
//! - `concurrency` - overlapping operations on one cart
//!
//! Every test runs against [`FakeCatalog`] and a [`FileStore`] in a
//! temporary directory; no network or external service is needed.

use std::path::Path;
use std::sync::Arc;

use rocketshoes_cart::testing::{FakeCatalog, RecordingSink, shoe};
use rocketshoes_cart::{CartContext, CartManager, DurableStore, FileStore};
use rocketshoes_core::{Cart, Price};
use tempfile::TempDir;

/// Snapshot key used by every harness.
pub const SNAPSHOT_KEY: &str = "@RocketShoes:cart";

/// A cart context wired to fakes, with its store on disk.
pub struct Harness {
    /// Catalog the cart consults.
    pub catalog: Arc<FakeCatalog>,
    /// Every notice shown to the shopper.
    pub sink: Arc<RecordingSink>,
    /// Store backing the snapshot.
    pub store: Arc<FileStore>,
    /// Context under test.
    pub ctx: CartContext,
    _dir: TempDir,
}

impl Harness {
    /// Harness over the default catalog: product 7 "Shoe" at 99.90 with 5 in stock.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self::with_catalog(default_catalog())
    }

    /// Harness over `catalog`, starting from an empty store.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn with_catalog(catalog: FakeCatalog) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = Arc::new(FileStore::new(dir.path()));
        let catalog = Arc::new(catalog);
        let sink = Arc::new(RecordingSink::new());
        let ctx = context(&catalog, &store, &sink);

        Self {
            catalog,
            sink,
            store,
            ctx,
            _dir: dir,
        }
    }

    /// A fresh context over the same catalog and store, as after a restart.
    #[must_use]
    pub fn reopen(&self) -> CartContext {
        context(&self.catalog, &self.store, &Arc::new(RecordingSink::new()))
    }

    /// Directory the store writes into.
    #[must_use]
    pub fn store_dir(&self) -> &Path {
        self.store.dir()
    }

    /// The cart as currently written to disk, or `None` before the first write.
    ///
    /// # Panics
    ///
    /// Panics if the snapshot exists but cannot be read or parsed.
    #[must_use]
    pub fn stored_cart(&self) -> Option<Cart> {
        let bytes = self.store.read(SNAPSHOT_KEY).expect("read snapshot")?;
        Some(serde_json::from_slice(&bytes).expect("parse snapshot"))
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// Catalog holding product 7 "Shoe" at 99.90 with 5 units in stock.
#[must_use]
pub fn default_catalog() -> FakeCatalog {
    FakeCatalog::new().with_product(shoe(7, "Shoe", Price::from_cents(9_990)), 5)
}

fn context(
    catalog: &Arc<FakeCatalog>,
    store: &Arc<FileStore>,
    sink: &Arc<RecordingSink>,
) -> CartContext {
    let manager = CartManager::hydrate(catalog.clone(), store.clone(), SNAPSHOT_KEY);
    CartContext::new(manager, sink.clone())
}
