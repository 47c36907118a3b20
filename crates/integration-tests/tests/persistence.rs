//! Snapshots on disk and hydration after a restart.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use rocketshoes_cart::testing::{ReadOnlyStore, RecordingSink, shoe};
use rocketshoes_cart::{CartContext, CartManager, DurableStore};
use rocketshoes_core::{Price, ProductId};
use rocketshoes_integration_tests::{Harness, SNAPSHOT_KEY, default_catalog};

#[tokio::test]
async fn test_restart_restores_items_amounts_and_order() {
    let h = Harness::with_catalog(
        default_catalog()
            .with_product(shoe(3, "Sandal", Price::from_cents(4_500)), 9)
            .with_product(shoe(1, "Runner", Price::from_cents(17_990)), 9),
    );
    for id in [3, 7, 1] {
        h.ctx.add_item(ProductId::new(id)).await.unwrap();
    }
    h.ctx.update_amount(ProductId::new(7), 4).await.unwrap();

    let reopened = h.reopen();
    let cart = reopened.cart().await;

    assert_eq!(cart, h.ctx.cart().await);
    let ids: Vec<i32> = cart.iter().map(|item| item.id.as_i32()).collect();
    assert_eq!(ids, vec![3, 7, 1]);
    assert_eq!(cart.get(ProductId::new(7)).unwrap().amount, 4);
}

#[tokio::test]
async fn test_snapshot_is_a_json_array_with_numeric_prices() {
    let h = Harness::new();
    h.ctx.add_item(ProductId::new(7)).await.unwrap();

    let bytes = h.store.read(SNAPSHOT_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(
        value,
        serde_json::json!([{
            "id": 7,
            "title": "Shoe",
            "price": 99.9,
            "image": "https://cdn.example/shoes/7.jpg",
            "amount": 1
        }])
    );
}

#[tokio::test]
async fn test_malformed_snapshot_hydrates_empty_and_is_replaced() {
    let h = Harness::new();
    h.store.write(SNAPSHOT_KEY, b"[{\"id\": 7").unwrap();

    let ctx = h.reopen();
    assert!(ctx.cart().await.is_empty());

    ctx.add_item(ProductId::new(7)).await.unwrap();
    assert_eq!(h.stored_cart().unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_ids_in_snapshot_hydrate_empty() {
    let h = Harness::new();
    let item = r#"{"id":7,"title":"Shoe","price":99.9,"image":"x","amount":1}"#;
    h.store
        .write(SNAPSHOT_KEY, format!("[{item},{item}]").as_bytes())
        .unwrap();

    assert!(h.reopen().cart().await.is_empty());
}

#[tokio::test]
async fn test_snapshot_lives_in_store_dir() {
    let h = Harness::new();
    h.ctx.add_item(ProductId::new(7)).await.unwrap();

    let files: Vec<_> = std::fs::read_dir(h.store_dir())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(files, vec![std::ffi::OsString::from("%40RocketShoes%3Acart.json")]);
}

#[tokio::test]
async fn test_failed_writes_do_not_fail_operations() {
    let seeded = br#"[{"id":7,"title":"Shoe","price":99.9,"image":"x","amount":2}]"#;
    let store = Arc::new(ReadOnlyStore::seeded(SNAPSHOT_KEY, seeded));
    let sink = Arc::new(RecordingSink::new());
    let manager = CartManager::hydrate(Arc::new(default_catalog()), store.clone(), SNAPSHOT_KEY);
    let ctx = CartContext::new(manager, sink.clone());

    assert_eq!(ctx.add_item(ProductId::new(7)).await.unwrap().amount, 3);
    ctx.remove_item(ProductId::new(7)).await.unwrap();

    assert_eq!(store.rejected_writes(), 2);
    assert!(sink.messages().is_empty());
    assert!(ctx.cart().await.is_empty());
}
