use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{ClaimRequest, ClaimResponse, RevealResponse, REVEAL_TOKEN_TTL_SECONDS},
};
use storage::{NewClaim, Storage};
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

/// Draws the next shared reveal count, picks the prize tier for it, and
/// issues a fresh opaque token the claim endpoint will echo back.
pub async fn reveal(ctx: &ApiContext) -> Result<RevealResponse, ApiError> {
    let count = ctx.storage.next_reveal_count().await.map_err(internal)?;
    let prize = prize_for_count(count.0);
    let token = mint_reveal_token();
    ctx.storage
        .record_reveal(&token, prize, count)
        .await
        .map_err(internal)?;

    info!(token = %token, prize, count = count.0, "reveal issued");

    Ok(RevealResponse {
        success: true,
        prize,
        reveal_token: token,
        expires_in: REVEAL_TOKEN_TTL_SECONDS,
        message: format!("🎉 You've unlocked ₹{}!", format_rupees(prize)),
    })
}

pub async fn claim(ctx: &ApiContext, request: ClaimRequest) -> Result<ClaimResponse, ApiError> {
    let reveal_token = required(request.reveal_token)?;
    let name = required(request.name)?;
    let phone = required(request.phone)?;
    let kseb_consumer = required(request.kseb_consumer)?;
    let kseb_phone = required(request.kseb_phone)?;
    let location = required(request.location)?;

    if !is_valid_mobile(&phone) {
        return Err(ApiError::validation(
            "Please enter a valid 10-digit mobile number",
        ));
    }
    if !is_valid_mobile(&kseb_phone) {
        return Err(ApiError::validation(
            "Please enter a valid KSEB registered phone number",
        ));
    }

    let lead = NewClaim {
        reveal_token: reveal_token.clone(),
        name,
        phone,
        kseb_consumer,
        kseb_phone,
        location,
    };
    let claim_id = ctx.storage.insert_claim(&lead).await.map_err(internal)?;

    info!(
        claim_id = claim_id.0,
        reveal_token = %lead.reveal_token,
        name = %lead.name,
        location = %lead.location,
        "claim lead stored"
    );

    Ok(ClaimResponse {
        success: true,
        message: "🎉 Claim submitted successfully! We will contact you within 24 hours.".to_string(),
        reference_id: reveal_token,
    })
}

/// Prize tier table over the shared reveal count. Tiers are checked from
/// rarest to most common; the 5,000 tier is the default.
pub fn prize_for_count(count: i64) -> i64 {
    if count % 75 == 0 {
        25_000
    } else if count % 40 == 0 {
        20_000
    } else if count % 25 == 0 {
        15_000
    } else if count % 10 == 0 {
        10_000
    } else {
        5_000
    }
}

/// Exactly 10 digits starting 6-9 after stripping everything non-numeric.
pub fn is_valid_mobile(raw: &str) -> bool {
    let digits: Vec<char> = raw.chars().filter(char::is_ascii_digit).collect();
    digits.len() == 10 && matches!(digits[0], '6'..='9')
}

fn mint_reveal_token() -> String {
    format!("rvl_{}", URL_SAFE_NO_PAD.encode(Uuid::new_v4().as_bytes()))
}

fn format_rupees(amount: i64) -> String {
    let raw = amount.to_string();
    if raw.len() <= 3 {
        return raw;
    }
    let (head, tail) = raw.split_at(raw.len() - 3);
    format!("{head},{tail}")
}

fn required(field: Option<String>) -> Result<String, ApiError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ApiError::new(
            ErrorCode::Validation,
            "All fields are required",
        )),
    }
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}
