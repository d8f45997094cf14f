use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use url::Url;

/// Production voucher submission endpoint.
pub const DEFAULT_SUBMIT_URL: &str = "https://mullvad.net/en/account/voucher/submit/";

const SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum RedeemError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("HTTP status {0}: {1}")]
    Status(StatusCode, String),
}

#[derive(Debug, Serialize)]
struct SubmitForm<'a> {
    account: &'a str,
    code: &'a str,
}

/// One-shot voucher submission. A hung endpoint surfaces as a timeout error
/// after ten seconds; there are no retries, the caller decides whether the
/// token goes back on offer.
#[derive(Debug, Clone)]
pub struct RedemptionClient {
    submit_url: Url,
    client: reqwest::Client,
}

impl RedemptionClient {
    pub fn new() -> Result<Self, RedeemError> {
        Self::with_base_url(Url::parse(DEFAULT_SUBMIT_URL)?)
    }

    pub fn with_base_url(submit_url: Url) -> Result<Self, RedeemError> {
        let client = reqwest::Client::builder().timeout(SUBMIT_TIMEOUT).build()?;
        Ok(Self { submit_url, client })
    }

    pub fn submit_url(&self) -> &Url {
        &self.submit_url
    }

    /// Submit `code` against `account` as a form POST. HTTP 200 is the only
    /// success; the response body is logged at debug level, never parsed.
    pub async fn submit(&self, account: &str, code: &str) -> Result<(), RedeemError> {
        let form = SubmitForm { account, code };
        let response = self
            .client
            .post(self.submit_url.clone())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status == StatusCode::OK {
            tracing::debug!("voucher submission accepted: {}", body);
            Ok(())
        } else {
            tracing::debug!("voucher submission rejected ({}): {}", status, body);
            Err(RedeemError::Status(status, body))
        }
    }
}
