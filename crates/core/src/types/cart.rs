//! The cart collection and its items.
//!
//! [`Cart`] is an ordered, product-unique sequence of [`CartItem`]s:
//!
//! - At most one item per [`ProductId`]
//! - Every item has `amount >= 1` (an item that would reach zero is removed instead)
//! - Insertion order is preserved; in-place updates keep their index and
//!   removals never reorder the survivors
//!
//! The collection serializes as a bare JSON array of items. Deserialization
//! re-checks the invariants, so a snapshot with duplicate ids or zero amounts
//! is rejected rather than loaded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

use super::{Price, ProductDisplay, ProductId};

/// Errors raised when a mutation would break a cart invariant.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantError {
    /// The product already has an item in the cart.
    #[error("product {0} is already in the cart")]
    DuplicateProduct(ProductId),
    /// Items must carry at least one unit.
    #[error("product {0} cannot have an amount of zero")]
    ZeroAmount(ProductId),
    /// The product has no item in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),
}

/// A product the shopper intends to buy, with its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Catalog product identifier.
    pub id: ProductId,
    /// Product title.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Image URL.
    pub image: String,
    /// Quantity, always at least one.
    pub amount: u32,
}

impl CartItem {
    /// Build an item from catalog display data and a quantity.
    #[must_use]
    pub fn new(display: ProductDisplay, amount: u32) -> Self {
        Self {
            id: display.id,
            title: display.title,
            price: display.price,
            image: display.image,
            amount,
        }
    }

    /// The display data without the quantity.
    #[must_use]
    pub fn display(&self) -> ProductDisplay {
        ProductDisplay {
            id: self.id,
            title: self.title.clone(),
            price: self.price,
            image: self.image.clone(),
        }
    }

    /// Price of this line (unit price times amount).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.line_total(self.amount)
    }
}

/// Ordered, product-unique collection of cart items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Iterate over items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    /// Index of the item for `id`, if present.
    #[must_use]
    pub fn position(&self, id: ProductId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// The item for `id`, if present.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Whether the cart holds an item for `id`.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Append a new item at the end of the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is already present or the amount is zero.
    pub fn push(&mut self, item: CartItem) -> Result<(), InvariantError> {
        if item.amount == 0 {
            return Err(InvariantError::ZeroAmount(item.id));
        }
        if self.contains(item.id) {
            return Err(InvariantError::DuplicateProduct(item.id));
        }
        self.items.push(item);
        Ok(())
    }

    /// Change the amount of an existing item, keeping its position.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not in the cart or the amount is zero.
    pub fn set_amount(&mut self, id: ProductId, amount: u32) -> Result<&CartItem, InvariantError> {
        if amount == 0 {
            return Err(InvariantError::ZeroAmount(id));
        }
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(InvariantError::NotInCart(id))?;
        item.amount = amount;
        Ok(item)
    }

    /// Remove the item for `id`, preserving the order of the rest.
    pub fn remove(&mut self, id: ProductId) -> Option<CartItem> {
        let index = self.position(id)?;
        Some(self.items.remove(index))
    }

    /// Product id to amount, for quantity badges.
    #[must_use]
    pub fn amounts(&self) -> BTreeMap<ProductId, u32> {
        self.items.iter().map(|item| (item.id, item.amount)).collect()
    }

    /// Total number of units across all items.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

impl TryFrom<Vec<CartItem>> for Cart {
    type Error = InvariantError;

    fn try_from(items: Vec<CartItem>) -> Result<Self, Self::Error> {
        let mut cart = Self::new();
        for item in items {
            cart.push(item)?;
        }
        Ok(cart)
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
