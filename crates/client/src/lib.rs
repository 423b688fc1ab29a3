use anyhow::{anyhow, Result};
use reqwest::{Client, Response};
use shared::{
    error::{ApiError, ApiException},
    protocol::{ClaimRequest, ClaimResponse, RevealResponse},
};
use tracing::debug;
use url::Url;

/// Typed HTTP client for the reveal/claim promotional flow.
pub struct PromoClient {
    http: Client,
    base_url: Url,
}

impl PromoClient {
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    pub async fn reveal(&self) -> Result<RevealResponse> {
        let url = self.base_url.join("/api/reveal")?;
        let response = check(self.http.post(url).send().await?)
            .await?
            .json::<RevealResponse>()
            .await?;
        debug!(prize = response.prize, "reveal received");
        Ok(response)
    }

    pub async fn claim(&self, request: &ClaimRequest) -> Result<ClaimResponse> {
        let url = self.base_url.join("/api/claim")?;
        let response = check(self.http.post(url).json(request).send().await?)
            .await?
            .json::<ClaimResponse>()
            .await?;
        debug!(reference_id = %response.reference_id, "claim accepted");
        Ok(response)
    }
}

/// Surfaces the server's error envelope as a typed exception when the body
/// carries one, falling back to the bare status otherwise.
async fn check(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    match response.json::<ApiError>().await {
        Ok(error) => Err(ApiException::new(error.code, error.message).into()),
        Err(_) => Err(anyhow!("request failed with status {status}")),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
