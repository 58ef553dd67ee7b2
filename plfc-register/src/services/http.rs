use async_trait::async_trait;
use reqwest::Response;
use serde::Deserialize;

/// Information about an unsuccessful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotSuccessResponseInfo {
    pub status_code: u16,
    pub text: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl NotSuccessResponseInfo {
    /// The `message` field of a JSON error body, falling back to the raw text.
    pub fn message(&self) -> String {
        serde_json::from_str::<ErrorBody>(&self.text)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| self.text.clone())
    }
}

#[async_trait]
pub trait ResponseExt {
    async fn check_success(self) -> Result<Self, NotSuccessResponseInfo>
    where
        Self: Sized;
}

#[async_trait]
impl ResponseExt for Response {
    async fn check_success(self) -> Result<Self, NotSuccessResponseInfo> {
        let status = self.status();
        if !status.is_success() {
            return Err(NotSuccessResponseInfo {
                status_code: status.as_u16(),
                text: self
                    .text()
                    .await
                    .unwrap_or_else(|_| "Failed to read response text".to_string()),
            });
        }
        Ok(self)
    }
}
