//! RocketShoes cart state manager.
//!
//! Keeps the shopper's cart in memory, consults the remote catalog for
//! product data and stock before changing it, and mirrors every successful
//! change to a local durable store so the cart survives restarts.
//!
//! # Layout
//!
//! - [`manager`] - the authoritative cart and its three operations
//! - [`context`] - cloneable handle that reports failures to a sink
//! - [`catalog`] - catalog trait and HTTP client
//! - [`store`] / [`snapshot`] - durable storage and the JSON snapshot
//! - [`notify`] - user-facing notices and sinks
//! - [`config`] - environment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod manager;
pub mod notify;
pub mod snapshot;
pub mod store;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use catalog::{CatalogError, CatalogService, HttpCatalog};
pub use config::{CartConfig, CatalogConfig, ConfigError};
pub use context::CartContext;
pub use error::CartError;
pub use manager::CartManager;
pub use notify::{NotificationSink, Notice, TracingSink};
pub use store::{DurableStore, FileStore, MemoryStore, StoreError};
