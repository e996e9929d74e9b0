//! Login CAPTCHA verification against a Turnstile-compatible siteverify
//! endpoint.

use serde::{Deserialize, Serialize};

const DEFAULT_VERIFY_URL: &str = "https://challenges.cloudflare.com/turnstile/v0/siteverify";

#[derive(Debug, Clone)]
pub struct CaptchaConfig {
    pub secret: String,
    pub verify_url: String,
}

impl CaptchaConfig {
    /// | Env Var              | Default                     |
    /// |----------------------|-----------------------------|
    /// | `CAPTCHA_SECRET`     | unset: verification skipped |
    /// | `CAPTCHA_VERIFY_URL` | Turnstile siteverify        |
    pub fn from_env() -> Option<Self> {
        let secret = std::env::var("CAPTCHA_SECRET")
            .ok()
            .filter(|s| !s.is_empty())?;
        let verify_url =
            std::env::var("CAPTCHA_VERIFY_URL").unwrap_or_else(|_| DEFAULT_VERIFY_URL.into());
        Some(Self { secret, verify_url })
    }
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    secret: &'a str,
    response: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    remoteip: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Ask the provider whether `token` is a solved challenge.
pub async fn verify_captcha(
    client: &reqwest::Client,
    config: &CaptchaConfig,
    token: &str,
    remote_ip: Option<&str>,
) -> Result<bool, reqwest::Error> {
    let response: VerifyResponse = client
        .post(&config.verify_url)
        .json(&VerifyRequest {
            secret: &config.secret,
            response: token,
            remoteip: remote_ip,
        })
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    if !response.success {
        tracing::info!(error_codes = ?response.error_codes, "CAPTCHA verification rejected");
    }
    Ok(response.success)
}
