//! Cart commands: show, add, remove, update.

use std::fmt::Write as _;

use rocketshoes_cart::{CartContext, CartError};
use rocketshoes_core::{Cart, CartItem, ProductId};

/// Print the cart.
#[allow(clippy::print_stdout)]
pub async fn show(ctx: &CartContext) {
    print!("{}", render_cart(&ctx.cart().await));
}

/// Add one unit of `id` and print the resulting line.
///
/// # Errors
///
/// Returns the cart error after it has been reported to the shopper.
#[allow(clippy::print_stdout)]
pub async fn add(ctx: &CartContext, id: ProductId) -> Result<(), CartError> {
    let item = ctx.add_item(id).await?;
    println!("{}", render_item(&item));
    Ok(())
}

/// Remove `id` from the cart.
///
/// # Errors
///
/// Returns the cart error after it has been reported to the shopper.
#[allow(clippy::print_stdout)]
pub async fn remove(ctx: &CartContext, id: ProductId) -> Result<(), CartError> {
    let item = ctx.remove_item(id).await?;
    println!("Removed {}", item.title);
    Ok(())
}

/// Set the amount of `id` and print the resulting line.
///
/// # Errors
///
/// Returns the cart error after it has been reported to the shopper.
#[allow(clippy::print_stdout)]
pub async fn update(ctx: &CartContext, id: ProductId, amount: i64) -> Result<(), CartError> {
    match ctx.update_amount(id, amount).await? {
        Some(item) => println!("{}", render_item(&item)),
        None => tracing::info!(%id, amount, "Amount must be at least 1, cart unchanged"),
    }
    Ok(())
}

fn render_item(item: &CartItem) -> String {
    format!(
        "{:>4}  {:<40} {:>3} x R$ {} = R$ {}",
        item.id,
        item.title,
        item.amount,
        item.price,
        item.line_total()
    )
}

fn render_cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let mut out = String::new();
    for item in cart {
        let _ = writeln!(out, "{}", render_item(item));
    }
    let _ = writeln!(
        out,
        "{} item(s), subtotal R$ {}",
        cart.item_count(),
        cart.subtotal()
    );
    out
}
