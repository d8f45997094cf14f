//! Integration tests for CSV import through the inventory

mod common;

use std::fs::File;
use std::io::Write;

use ::common::bucket::BucketKind;

#[tokio::test]
async fn test_import_from_file_and_reopen() {
    let (inventory, store, temp) = common::setup_inventory().await;
    inventory.create("pool", BucketKind::Generic).await.unwrap();
    inventory
        .push("pool", common::plain_token("DUP"), false)
        .await
        .unwrap();

    let csv_path = temp.path().join("batch.csv");
    let mut file = File::create(&csv_path).unwrap();
    writeln!(file, "code,value,expiry,label").unwrap();
    writeln!(file, "FRESH,30,2031-01-01,promo").unwrap();
    writeln!(file, "DUP,30,,").unwrap();
    writeln!(file, ",30,,").unwrap();
    drop(file);

    let summary = inventory
        .import("pool", File::open(&csv_path).unwrap())
        .await
        .unwrap();
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.duplicate, 1);
    assert_eq!(summary.invalid, 1);

    let reopened = common::reopen(&store).await;
    assert_eq!(reopened.stats("pool").await.unwrap().total, 2);
}

#[tokio::test]
async fn test_reimporting_the_same_file_changes_nothing() {
    let (inventory, _store, temp) = common::setup_inventory().await;
    inventory.create("pool", BucketKind::Generic).await.unwrap();

    let csv_path = temp.path().join("batch.csv");
    let mut file = File::create(&csv_path).unwrap();
    writeln!(file, "code").unwrap();
    writeln!(file, "A").unwrap();
    writeln!(file, "B").unwrap();
    drop(file);

    let first = inventory
        .import("pool", File::open(&csv_path).unwrap())
        .await
        .unwrap();
    assert_eq!(first.completed, 2);

    let second = inventory
        .import("pool", File::open(&csv_path).unwrap())
        .await
        .unwrap();
    assert_eq!(second.completed, 0);
    assert_eq!(second.duplicate, 2);
    assert_eq!(inventory.stats("pool").await.unwrap().total, 2);
}

#[tokio::test]
async fn test_import_into_missing_bucket_fails() {
    let (inventory, _store, _temp) = common::setup_inventory().await;
    let result = inventory.import("nowhere", "code\nA\n".as_bytes()).await;
    assert!(result.is_err());
}
