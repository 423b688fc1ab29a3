use super::*;

fn lead(token: &str) -> NewClaim {
    NewClaim {
        reveal_token: token.to_string(),
        name: "Anu Thomas".to_string(),
        phone: "9876543210".to_string(),
        kseb_consumer: "1156230045678".to_string(),
        kseb_phone: "9446001122".to_string(),
        location: "Kochi".to_string(),
    }
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn reveal_counter_is_monotonic() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let first = storage.next_reveal_count().await.expect("first");
    let second = storage.next_reveal_count().await.expect("second");
    let third = storage.next_reveal_count().await.expect("third");
    assert_eq!(first, RevealCount(1));
    assert_eq!(second, RevealCount(2));
    assert_eq!(third, RevealCount(3));
}

#[tokio::test]
async fn records_and_finds_reveals_by_token() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let count = storage.next_reveal_count().await.expect("count");
    storage
        .record_reveal("rvl_abc", 15_000, count)
        .await
        .expect("record");

    let found = storage
        .find_reveal("rvl_abc")
        .await
        .expect("lookup")
        .expect("reveal exists");
    assert_eq!(found.prize, 15_000);
    assert_eq!(found.reveal_count, count);

    let missing = storage.find_reveal("rvl_missing").await.expect("lookup");
    assert!(missing.is_none());
}

#[tokio::test]
async fn duplicate_reveal_tokens_are_rejected() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let count = storage.next_reveal_count().await.expect("count");
    storage
        .record_reveal("rvl_dup", 5_000, count)
        .await
        .expect("first record");
    let duplicate = storage.record_reveal("rvl_dup", 5_000, count).await;
    assert!(duplicate.is_err());
}

#[tokio::test]
async fn stores_claim_leads_verbatim() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let claim_id = storage
        .insert_claim(&lead("rvl_xyz"))
        .await
        .expect("insert");
    assert!(claim_id.0 > 0);

    let stored = storage
        .claims_for_token("rvl_xyz")
        .await
        .expect("claims for token");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Anu Thomas");
    assert_eq!(stored[0].phone, "9876543210");
    assert_eq!(stored[0].kseb_phone, "9446001122");
    assert_eq!(stored[0].location, "Kochi");
    assert_eq!(storage.count_claims().await.expect("count"), 1);
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("promo_storage_test_{suffix}"));
    let db_path = temp_root.join("nested").join("storage.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    std::fs::remove_dir_all(temp_root).expect("cleanup");
}
