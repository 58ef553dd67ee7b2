//! Razorpay Standard Checkout: an overlay on the registration page, completed
//! through its success handler.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use plfc::TeamRegistrationInput;
use serde::Serialize;

use super::{
    required_param, settle, Checkout, CheckoutSession, CheckoutSurface, PaymentError,
    PaymentOutcome, PaymentProvider, ProviderKind,
};
use crate::{
    config::RazorpayConfig,
    services::backend::{OrderIntent, PaymentReferences},
};

/// Options handed to the Razorpay checkout overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlayOptions {
    pub key: String,
    pub amount: u64,
    pub currency: String,
    pub name: String,
    pub description: String,
    pub order_id: String,
    pub theme: Theme,
    pub prefill: Prefill,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

pub struct RazorpayProvider {
    config: RazorpayConfig,
    surface: Arc<dyn CheckoutSurface>,
}

impl RazorpayProvider {
    pub fn new(config: RazorpayConfig, surface: Arc<dyn CheckoutSurface>) -> Self {
        Self { config, surface }
    }
}

#[async_trait]
impl PaymentProvider for RazorpayProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Razorpay
    }

    fn amount(&self) -> u64 {
        self.config.amount
    }

    fn create_session(
        &self,
        intent: &OrderIntent,
        team: &TeamRegistrationInput,
    ) -> Result<CheckoutSession, PaymentError> {
        let order_id = intent
            .order_id
            .clone()
            .ok_or(PaymentError::MissingIdentifier("orderId"))?;

        let options = OverlayOptions {
            key: self.config.key_id.clone(),
            amount: intent.amount,
            currency: self.config.currency.clone(),
            name: self.config.merchant_name.clone(),
            description: self.config.description.clone(),
            order_id: order_id.clone(),
            theme: Theme {
                color: self.config.theme_color.clone(),
            },
            prefill: Prefill {
                name: team.captain_name.clone(),
                email: team.email.clone(),
                contact: format!("{}{}", self.config.phone_prefix, team.phone),
            },
        };

        Ok(CheckoutSession {
            order_id,
            checkout: Checkout::Overlay(options),
        })
    }

    async fn invoke(&self, session: CheckoutSession) -> Result<PaymentOutcome, PaymentError> {
        tracing::info!("Opening Razorpay checkout for order {}", session.order_id);
        let event = self.surface.present(session.checkout).await?;
        settle(self, event)
    }

    fn references_from_params(
        &self,
        params: &BTreeMap<String, String>,
    ) -> Result<PaymentReferences, PaymentError> {
        Ok(PaymentReferences::Razorpay {
            razorpay_order_id: required_param(params, "razorpay_order_id")?,
            razorpay_payment_id: required_param(params, "razorpay_payment_id")?,
            razorpay_signature: required_param(params, "razorpay_signature")?,
        })
    }
}
