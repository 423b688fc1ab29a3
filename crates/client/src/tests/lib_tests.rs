use super::*;

use std::sync::{Arc, Mutex};

use axum::{extract::State, routing::post, Json, Router};
use shared::protocol::REVEAL_TOKEN_TTL_SECONDS;
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct RecordedClaims {
    requests: Arc<Mutex<Vec<ClaimRequest>>>,
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("listener");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

async fn test_reveal() -> Json<RevealResponse> {
    Json(RevealResponse {
        success: true,
        prize: 15_000,
        reveal_token: "rvl_test_token".to_string(),
        expires_in: REVEAL_TOKEN_TTL_SECONDS,
        message: "🎉 You've unlocked ₹15,000!".to_string(),
    })
}

async fn test_claim(
    State(state): State<RecordedClaims>,
    Json(request): Json<ClaimRequest>,
) -> Json<ClaimResponse> {
    let reference_id = request.reveal_token.clone().unwrap_or_default();
    state.requests.lock().expect("claims").push(request);
    Json(ClaimResponse {
        success: true,
        message: "accepted".to_string(),
        reference_id,
    })
}

#[tokio::test]
async fn reveal_decodes_the_prize_payload() {
    let app = Router::new().route("/api/reveal", post(test_reveal));
    let base_url = serve(app).await;

    let client = PromoClient::new(&base_url).expect("client");
    let response = client.reveal().await.expect("reveal");
    assert!(response.success);
    assert_eq!(response.prize, 15_000);
    assert_eq!(response.reveal_token, "rvl_test_token");
    assert_eq!(response.expires_in, REVEAL_TOKEN_TTL_SECONDS);
}

#[tokio::test]
async fn claim_posts_the_lead_and_echoes_the_token() {
    let recorded = RecordedClaims::default();
    let app = Router::new()
        .route("/api/claim", post(test_claim))
        .with_state(recorded.clone());
    let base_url = serve(app).await;

    let client = PromoClient::new(&base_url).expect("client");
    let request = ClaimRequest {
        reveal_token: Some("rvl_echo".to_string()),
        name: Some("Anu Thomas".to_string()),
        phone: Some("9876543210".to_string()),
        kseb_consumer: Some("1156230045678".to_string()),
        kseb_phone: Some("9446001122".to_string()),
        location: Some("Kochi".to_string()),
    };
    let response = client.claim(&request).await.expect("claim");
    assert!(response.success);
    assert_eq!(response.reference_id, "rvl_echo");

    let seen = recorded.requests.lock().expect("claims");
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].name.as_deref(), Some("Anu Thomas"));
}

#[tokio::test]
async fn error_envelopes_surface_their_message() {
    use axum::http::StatusCode;
    use shared::error::ErrorCode;

    let app = Router::new().route(
        "/api/claim",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiError::new(ErrorCode::Validation, "All fields are required")),
            )
        }),
    );
    let base_url = serve(app).await;

    let client = PromoClient::new(&base_url).expect("client");
    let err = client
        .claim(&ClaimRequest::default())
        .await
        .expect_err("should fail");
    assert!(err.to_string().contains("All fields are required"));
}

#[tokio::test]
async fn invalid_base_url_is_rejected() {
    assert!(PromoClient::new("not a url").is_err());
}
