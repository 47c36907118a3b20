//! Overlapping operations on one cart.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use rocketshoes_cart::testing::shoe;
use rocketshoes_core::{Price, ProductId};
use rocketshoes_integration_tests::{Harness, default_catalog};

fn slow_harness() -> Harness {
    let h = Harness::with_catalog(
        default_catalog()
            .with_product(shoe(8, "Boot", Price::from_cents(12_000)), 9)
            .with_product(shoe(9, "Sandal", Price::from_cents(4_500)), 9),
    );
    h.catalog.set_delay(Duration::from_millis(20));
    h
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_of_distinct_products_all_survive() {
    let h = slow_harness();

    let tasks: Vec<_> = [7, 8, 9]
        .into_iter()
        .map(|id| {
            let ctx = h.ctx.clone();
            tokio::spawn(async move { ctx.add_item(ProductId::new(id)).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let amounts = h.ctx.amounts().await;
    assert_eq!(amounts.len(), 3);
    assert!(amounts.values().all(|&amount| amount == 1));

    let stored = h.stored_cart().unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(h.reopen().cart().await, h.ctx.cart().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_of_same_product_accumulate() {
    let h = slow_harness();
    let id = ProductId::new(7);

    let (a, b, c) = tokio::join!(h.ctx.add_item(id), h.ctx.add_item(id), h.ctx.add_item(id));
    a.unwrap();
    b.unwrap();
    c.unwrap();

    assert_eq!(h.ctx.item(id).await.unwrap().amount, 3);
    assert_eq!(h.stored_cart().unwrap().get(id).unwrap().amount, 3);
    assert_eq!(h.catalog.product_calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_update_and_remove_leave_consistent_state() {
    let h = slow_harness();
    let id = ProductId::new(7);
    h.ctx.add_item(id).await.unwrap();

    let (update, remove) = tokio::join!(h.ctx.update_amount(id, 4), h.ctx.remove_item(id));
    remove.unwrap();
    update.unwrap();

    // Whichever ran second decides the outcome; memory and disk must agree.
    assert_eq!(h.stored_cart().unwrap(), h.ctx.cart().await);
}
