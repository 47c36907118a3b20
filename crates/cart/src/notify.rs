//! User-facing notifications.
//!
//! The cart manager never talks to the user; it returns [`CartError`]s.
//! Presentation code maps them to a [`Notice`] and hands the message to a
//! [`NotificationSink`] (a toast, a terminal line, a log event).
//!
//! [`CartError`]: crate::CartError

use std::fmt;

/// The distinct messages a shopper can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    /// Adding a product failed.
    AdditionFailed,
    /// Removing a product failed.
    RemovalFailed,
    /// Changing a product amount failed.
    AmountUpdateFailed,
    /// Requested amount exceeds stock.
    InsufficientStock,
}

impl Notice {
    /// Message shown to the shopper.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::AdditionFailed => "Failed to add product",
            Self::RemovalFailed => "Failed to remove product",
            Self::AmountUpdateFailed => "Failed to update product amount",
            Self::InsufficientStock => "Requested amount is out of stock",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Fire-and-forget destination for user-facing messages.
pub trait NotificationSink: Send + Sync {
    /// Surface `message` to the shopper.
    fn notify(&self, message: &str);
}

/// Sink that emits each message as a `warn` tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, message: &str) {
        tracing::warn!(target: "rocketshoes_cart::notice", "{message}");
    }
}
