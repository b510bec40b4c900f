//! Captcha verification boundary
//!
//! The third-party verification service is an external collaborator;
//! this module defines only the seam the gen handler calls through.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("captcha verification failed: {0}")]
pub struct CaptchaError(pub String);

#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// Whether `token`, submitted from `remote_ip`, passes verification.
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> Result<bool, CaptchaError>;
}

/// Accepts every token. Wired when `[captcha]` is disabled.
pub struct AllowAll;

#[async_trait]
impl CaptchaVerifier for AllowAll {
    async fn verify(&self, _token: &str, _remote_ip: Option<&str>) -> Result<bool, CaptchaError> {
        Ok(true)
    }
}
