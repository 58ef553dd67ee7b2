use async_trait::async_trait;
use plfc::{roster::RosterResponse, TeamRegistrationInput, TeamSummary};
use reqwest::{Method, RequestBuilder};

use super::api::*;
use crate::services::http::ResponseExt;

/// The league backend: order creation, payment verification and the team roster.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /api/order`
    async fn create_order(
        &self,
        amount: u64,
        team: &TeamRegistrationInput,
    ) -> Result<OrderIntent, BackendError>;

    /// `POST /api/verify`
    async fn verify_payment(
        &self,
        references: &PaymentReferences,
        team: &TeamRegistrationInput,
    ) -> Result<VerifiedTeam, BackendError>;

    /// `GET /api/teams`
    async fn list_teams(&self) -> Result<Vec<TeamSummary>, BackendError>;
}

/// JSON-over-HTTPS client for the league backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = format!("{}/api/{}", self.base_url, endpoint.trim_start_matches('/'));
        tracing::debug!("Backend request: {} {}", method, url);
        self.http.request(method, &url)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn create_order(
        &self,
        amount: u64,
        team: &TeamRegistrationInput,
    ) -> Result<OrderIntent, BackendError> {
        let response = self
            .request(Method::POST, "order")
            .json(&OrderRequest { amount, team })
            .send()
            .await?
            .check_success()
            .await?;

        let order: OrderResponse = response.json().await.map_err(|e| {
            BackendError::InvalidResponse(format!("Failed to parse order response: {}", e))
        })?;
        order.into_intent(amount)
    }

    async fn verify_payment(
        &self,
        references: &PaymentReferences,
        team: &TeamRegistrationInput,
    ) -> Result<VerifiedTeam, BackendError> {
        let response = self
            .request(Method::POST, "verify")
            .json(&VerifyRequest { references, team })
            .send()
            .await?
            .check_success()
            .await?;

        let verified: VerifyResponse = response.json().await.map_err(|e| {
            BackendError::InvalidResponse(format!("Failed to parse verify response: {}", e))
        })?;
        verified.into_team()
    }

    async fn list_teams(&self) -> Result<Vec<TeamSummary>, BackendError> {
        let response = self
            .request(Method::GET, "teams")
            .send()
            .await?
            .check_success()
            .await?;

        let roster: RosterResponse = response.json().await.map_err(|e| {
            BackendError::InvalidResponse(format!("Failed to parse teams response: {}", e))
        })?;
        Ok(roster.into_teams())
    }
}
