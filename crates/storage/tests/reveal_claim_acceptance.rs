use shared::domain::RevealCount;
use storage::{NewClaim, Storage};

#[tokio::test]
async fn reveal_then_claim_round_trip_acceptance() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");

    let count = storage.next_reveal_count().await.expect("counter");
    assert_eq!(count, RevealCount(1));
    storage
        .record_reveal("rvl_acceptance", 10_000, count)
        .await
        .expect("record reveal");

    let reveal = storage
        .find_reveal("rvl_acceptance")
        .await
        .expect("lookup")
        .expect("reveal stored");
    assert_eq!(reveal.prize, 10_000);

    let claim_id = storage
        .insert_claim(&NewClaim {
            reveal_token: reveal.token.clone(),
            name: "Meera Nair".to_string(),
            phone: "8089012345".to_string(),
            kseb_consumer: "1174560098123".to_string(),
            kseb_phone: "9947112233".to_string(),
            location: "Thrissur".to_string(),
        })
        .await
        .expect("insert claim");
    assert!(claim_id.0 > 0);

    let claims = storage
        .claims_for_token("rvl_acceptance")
        .await
        .expect("claims");
    assert_eq!(claims.len(), 1);
    assert_eq!(claims[0].reveal_token, "rvl_acceptance");
}
