//! Catalog listing.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use rocketshoes_cart::{CartContext, CatalogError};
use rocketshoes_core::{ProductDisplay, ProductId};

/// Print every catalog product with the amount already in the cart.
///
/// # Errors
///
/// Returns an error if the catalog cannot be reached.
#[allow(clippy::print_stdout)]
pub async fn list(ctx: &CartContext) -> Result<(), CatalogError> {
    let products = ctx.products().await?;
    let amounts = ctx.amounts().await;
    print!("{}", render_products(&products, &amounts));
    Ok(())
}

fn render_products(products: &[ProductDisplay], amounts: &BTreeMap<ProductId, u32>) -> String {
    let mut out = String::new();
    for product in products {
        let in_cart = amounts.get(&product.id).copied().unwrap_or(0);
        let _ = writeln!(
            out,
            "{:>4}  {:<40} R$ {:>8}  [{in_cart} in cart]",
            product.id,
            product.title,
            product.price.to_string()
        );
    }
    out
}
