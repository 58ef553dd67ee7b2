//! Cashfree hosted checkout: the user leaves for the provider's page and comes back
//! to the registration page with an `order_id` query parameter.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use plfc::TeamRegistrationInput;

use super::{
    required_param, settle, Checkout, CheckoutSession, CheckoutSurface, PaymentError,
    PaymentOutcome, PaymentProvider, ProviderKind,
};
use crate::{
    config::CashfreeConfig,
    services::backend::{OrderIntent, PaymentReferences},
};

pub struct CashfreeProvider {
    config: CashfreeConfig,
    surface: Arc<dyn CheckoutSurface>,
}

impl CashfreeProvider {
    pub fn new(config: CashfreeConfig, surface: Arc<dyn CheckoutSurface>) -> Self {
        Self { config, surface }
    }

    fn checkout_url(&self, payment_session_id: &str) -> Result<String, PaymentError> {
        let mut url = url::Url::parse(&self.config.checkout_url).map_err(|e| {
            PaymentError::InvalidCheckoutUrl(format!("{}: {}", self.config.checkout_url, e))
        })?;
        url.query_pairs_mut()
            .append_pair("payment_session_id", payment_session_id);
        Ok(url.to_string())
    }
}

#[async_trait]
impl PaymentProvider for CashfreeProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Cashfree
    }

    fn amount(&self) -> u64 {
        self.config.amount
    }

    fn create_session(
        &self,
        intent: &OrderIntent,
        _team: &TeamRegistrationInput,
    ) -> Result<CheckoutSession, PaymentError> {
        let payment_session_id = intent
            .payment_session_id
            .as_deref()
            .ok_or(PaymentError::MissingIdentifier("paymentSessionId"))?;
        let order_id = intent
            .order_id
            .clone()
            .ok_or(PaymentError::MissingIdentifier("orderId"))?;

        Ok(CheckoutSession {
            order_id,
            checkout: Checkout::Redirect {
                url: self.checkout_url(payment_session_id)?,
            },
        })
    }

    async fn invoke(&self, session: CheckoutSession) -> Result<PaymentOutcome, PaymentError> {
        tracing::info!(
            "Redirecting to Cashfree checkout for order {}",
            session.order_id
        );
        let event = self.surface.present(session.checkout).await?;
        settle(self, event)
    }

    fn references_from_params(
        &self,
        params: &BTreeMap<String, String>,
    ) -> Result<PaymentReferences, PaymentError> {
        Ok(PaymentReferences::Cashfree {
            order_id: required_param(params, "order_id")?,
        })
    }
}
