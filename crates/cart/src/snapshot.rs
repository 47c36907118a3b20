//! Cart snapshot hydration and persistence.
//!
//! The whole cart is stored as one JSON array under a single key. There is
//! no incremental persistence and no format version: every successful
//! mutation rewrites the full snapshot.

use rocketshoes_core::Cart;
use tracing::{debug, warn};

use crate::store::{DurableStore, StoreError};

/// Load the cart stored under `key`.
///
/// A missing, unreadable or malformed snapshot yields an empty cart; startup
/// never fails because of bad local data.
pub fn load(store: &dyn DurableStore, key: &str) -> Cart {
    let bytes = match store.read(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            debug!(key, "No cart snapshot, starting empty");
            return Cart::new();
        }
        Err(e) => {
            warn!(key, error = %e, "Cart snapshot unreadable, starting empty");
            return Cart::new();
        }
    };

    match serde_json::from_slice::<Cart>(&bytes) {
        Ok(cart) => {
            debug!(key, items = cart.len(), "Hydrated cart from snapshot");
            cart
        }
        Err(e) => {
            warn!(key, error = %e, "Cart snapshot malformed, starting empty");
            Cart::new()
        }
    }
}

/// Serialize the full cart into snapshot bytes.
///
/// # Errors
///
/// Returns an error if the cart cannot be encoded.
pub fn encode(cart: &Cart) -> Result<Vec<u8>, StoreError> {
    Ok(serde_json::to_vec(cart)?)
}

/// Serialize the full cart and overwrite the snapshot under `key`.
///
/// # Errors
///
/// Returns an error if the cart cannot be encoded or the store rejects the write.
pub fn save(store: &dyn DurableStore, key: &str, cart: &Cart) -> Result<(), StoreError> {
    store.write(key, &encode(cart)?)
}
