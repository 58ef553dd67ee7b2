use plfc::TeamRegistrationInput;
use serde::{Deserialize, Serialize};

use crate::services::http::NotSuccessResponseInfo;

/// League backend error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP error [{0:?}]: {1}")]
    Http(Option<u16>, String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http(code, _) => *code,
            Self::InvalidResponse(_) => None,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::InvalidResponse(error.to_string())
        } else {
            Self::Http(error.status().map(|s| s.as_u16()), error.to_string())
        }
    }
}

impl From<NotSuccessResponseInfo> for BackendError {
    fn from(info: NotSuccessResponseInfo) -> Self {
        Self::Http(Some(info.status_code), info.message())
    }
}

/// Body of `POST /api/order`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest<'a> {
    pub amount: u64,
    pub team: &'a TeamRegistrationInput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: Option<String>,
    pub payment_session_id: Option<String>,
    pub amount: Option<f64>,
}

/// A payment attempt issued by the backend. Lives for one checkout only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderIntent {
    pub order_id: Option<String>,
    pub payment_session_id: Option<String>,
    pub amount: u64,
}

impl OrderResponse {
    /// Check the response carries an identifier. A missing amount echo falls back to
    /// the requested amount.
    pub fn into_intent(self, requested_amount: u64) -> Result<OrderIntent, BackendError> {
        let order_id = self.order_id.filter(|id| !id.is_empty());
        let payment_session_id = self.payment_session_id.filter(|id| !id.is_empty());
        if order_id.is_none() && payment_session_id.is_none() {
            return Err(BackendError::InvalidResponse(
                "Missing orderId and paymentSessionId".to_string(),
            ));
        }
        let amount = match self.amount {
            Some(amount) if amount.is_finite() && amount >= 0.0 => amount.round() as u64,
            Some(amount) => {
                return Err(BackendError::InvalidResponse(format!(
                    "Invalid amount {}",
                    amount
                )))
            }
            None => requested_amount,
        };
        Ok(OrderIntent {
            order_id,
            payment_session_id,
            amount,
        })
    }
}

/// Provider-issued references proving a completed payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaymentReferences {
    Razorpay {
        razorpay_order_id: String,
        razorpay_payment_id: String,
        razorpay_signature: String,
    },
    Cashfree {
        #[serde(rename = "orderId")]
        order_id: String,
    },
}

impl PaymentReferences {
    /// The backend order these references settle.
    pub fn order_id(&self) -> &str {
        match self {
            Self::Razorpay {
                razorpay_order_id, ..
            } => razorpay_order_id,
            Self::Cashfree { order_id } => order_id,
        }
    }
}

/// Body of `POST /api/verify`.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyRequest<'a> {
    #[serde(flatten)]
    pub references: &'a PaymentReferences,
    pub team: &'a TeamRegistrationInput,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    pub team: Option<VerifiedTeamBody>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedTeamBody {
    pub team_name: Option<String>,
    pub code: Option<String>,
}

/// The team record confirmed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedTeam {
    pub team_name: String,
    pub code: String,
}

impl VerifyResponse {
    pub fn into_team(self) -> Result<VerifiedTeam, BackendError> {
        let team = self
            .team
            .ok_or_else(|| BackendError::InvalidResponse("Missing team".to_string()))?;
        match (team.team_name, team.code) {
            (Some(team_name), Some(code)) if !team_name.is_empty() && !code.is_empty() => {
                Ok(VerifiedTeam { team_name, code })
            }
            _ => Err(BackendError::InvalidResponse(
                "Missing team.teamName or team.code".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn order_response_needs_an_identifier() {
        let response: OrderResponse = serde_json::from_value(json!({"amount": 289900})).unwrap();
        assert!(matches!(
            response.into_intent(289900),
            Err(BackendError::InvalidResponse(_))
        ));

        let response: OrderResponse =
            serde_json::from_value(json!({"orderId": "", "amount": 289900})).unwrap();
        assert!(response.into_intent(289900).is_err());
    }

    #[test]
    fn order_response_into_intent() {
        let response: OrderResponse =
            serde_json::from_value(json!({"orderId": "order_9A33XWu170gUtm", "amount": 289900}))
                .unwrap();
        assert_eq!(
            response.into_intent(1).unwrap(),
            OrderIntent {
                order_id: Some("order_9A33XWu170gUtm".to_string()),
                payment_session_id: None,
                amount: 289900,
            }
        );

        let response: OrderResponse = serde_json::from_value(
            json!({"orderId": "plfc_1", "paymentSessionId": "session_abc", "amount": 2899.0}),
        )
        .unwrap();
        let intent = response.into_intent(1).unwrap();
        assert_eq!(intent.payment_session_id.as_deref(), Some("session_abc"));
        assert_eq!(intent.amount, 2899);

        let response: OrderResponse =
            serde_json::from_value(json!({"paymentSessionId": "session_abc"})).unwrap();
        assert_eq!(response.into_intent(2899).unwrap().amount, 2899);
    }

    #[test]
    fn verify_request_flattens_references() {
        let team = TeamRegistrationInput {
            team_name: "Eagles".to_string(),
            captain_name: "Ravi".to_string(),
            phone: "9876543210".to_string(),
            email: "ravi@example.com".to_string(),
            players_count: 9,
        };
        let references = PaymentReferences::Razorpay {
            razorpay_order_id: "order_1".to_string(),
            razorpay_payment_id: "pay_1".to_string(),
            razorpay_signature: "sig".to_string(),
        };
        let body = serde_json::to_value(VerifyRequest {
            references: &references,
            team: &team,
        })
        .unwrap();
        assert_eq!(body["razorpay_order_id"], "order_1");
        assert_eq!(body["razorpay_payment_id"], "pay_1");
        assert_eq!(body["razorpay_signature"], "sig");
        assert_eq!(body["team"]["teamName"], "Eagles");

        let references = PaymentReferences::Cashfree {
            order_id: "plfc_1".to_string(),
        };
        let body = serde_json::to_value(VerifyRequest {
            references: &references,
            team: &team,
        })
        .unwrap();
        assert_eq!(body["orderId"], "plfc_1");
        assert_eq!(body["team"]["playersCount"], 9);
    }

    #[test]
    fn verify_response_requires_name_and_code() {
        let response: VerifyResponse =
            serde_json::from_value(json!({"team": {"teamName": "Eagles", "code": "PLFC-07"}}))
                .unwrap();
        assert_eq!(
            response.into_team().unwrap(),
            VerifiedTeam {
                team_name: "Eagles".to_string(),
                code: "PLFC-07".to_string(),
            }
        );

        for body in [
            json!({}),
            json!({"team": {"teamName": "Eagles"}}),
            json!({"team": {"code": "PLFC-07"}}),
        ] {
            let response: VerifyResponse = serde_json::from_value(body).unwrap();
            assert!(response.into_team().is_err());
        }
    }
}
