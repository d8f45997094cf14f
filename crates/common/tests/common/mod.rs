//! Shared test utilities for inventory integration tests
#![allow(dead_code)]

use std::sync::Arc;

use ::common::bucket::BucketKind;
use ::common::inventory::Inventory;
use ::common::store::JsonFileStore;
use ::common::token::Token;
use tempfile::TempDir;

/// Set up an inventory backed by a JSON file store in a fresh directory.
pub async fn setup_inventory() -> (Inventory, Arc<JsonFileStore>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(JsonFileStore::new(temp_dir.path().join("registry.json")));
    let inventory = Inventory::open(store.clone()).await.unwrap();
    (inventory, store, temp_dir)
}

/// Reopen an inventory from the same store, the way a new process would.
pub async fn reopen(store: &Arc<JsonFileStore>) -> Inventory {
    Inventory::open(store.clone()).await.unwrap()
}

pub fn plain_token(code: &str) -> Token {
    Token::new(code.to_string(), None, None, None)
}

/// Create a bucket and fill it with plain tokens.
pub async fn seeded_bucket(inventory: &Inventory, name: &str, kind: BucketKind, codes: &[&str]) {
    inventory.create(name, kind).await.unwrap();
    for code in codes {
        inventory
            .push(name, plain_token(code), false)
            .await
            .unwrap();
    }
}
