//! Payment providers and the checkout surfaces they hand off to.
//!
//! A provider turns a backend [`OrderIntent`] into a [`CheckoutSession`], presents it on
//! a [`CheckoutSurface`] and translates what comes back (an in-page callback or a
//! redirect back to the registration page) into [`PaymentReferences`].

pub mod cashfree;
pub mod razorpay;

use std::{collections::BTreeMap, fmt, sync::Arc};

use async_trait::async_trait;
use plfc::{Location, TeamRegistrationInput};
use serde::{Deserialize, Serialize};

use crate::{
    config::PaymentConfig,
    services::backend::{OrderIntent, PaymentReferences},
};

pub use cashfree::CashfreeProvider;
pub use razorpay::{OverlayOptions, RazorpayProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Razorpay,
    Cashfree,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Razorpay => "razorpay",
            ProviderKind::Cashfree => "cashfree",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("Order is missing the '{0}' identifier required by the provider")]
    MissingIdentifier(&'static str),
    #[error("Provider completion is missing '{0}'")]
    IncompleteCompletion(&'static str),
    #[error("Invalid checkout URL: {0}")]
    InvalidCheckoutUrl(String),
    #[error("Checkout surface failed: {0}")]
    Surface(String),
}

/// What gets presented to the user to pay.
#[derive(Debug, Clone, PartialEq)]
pub enum Checkout {
    /// Provider overlay opened on top of the current page.
    Overlay(OverlayOptions),
    /// Full-page navigation to the provider's hosted checkout.
    Redirect { url: String },
}

/// How a presented checkout ended, as reported by the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutEvent {
    /// The overlay invoked its success handler with these parameters.
    Callback(BTreeMap<String, String>),
    /// The provider redirected back to this location.
    Returned(Location),
    /// The user closed the checkout without paying.
    Dismissed,
    /// The page was left for the provider; completion arrives with a later activation.
    NavigatedAway,
}

/// The external UI hosting the provider checkout.
#[async_trait]
pub trait CheckoutSurface: Send + Sync {
    async fn present(&self, checkout: Checkout) -> Result<CheckoutEvent, PaymentError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    pub order_id: String,
    pub checkout: Checkout,
}

impl CheckoutSession {
    /// Whether presenting this session navigates away from the registration page.
    pub fn leaves_page(&self) -> bool {
        matches!(self.checkout, Checkout::Redirect { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Completed(PaymentReferences),
    Dismissed,
    Redirected,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Registration fee, in the unit the provider expects.
    fn amount(&self) -> u64;

    fn create_session(
        &self,
        intent: &OrderIntent,
        team: &TeamRegistrationInput,
    ) -> Result<CheckoutSession, PaymentError>;

    async fn invoke(&self, session: CheckoutSession) -> Result<PaymentOutcome, PaymentError>;

    /// Extract completion references from callback or return parameters.
    fn references_from_params(
        &self,
        params: &BTreeMap<String, String>,
    ) -> Result<PaymentReferences, PaymentError>;

    /// Completion references carried by a redirect back to `location`, if any.
    fn references_from_return(&self, location: &Location) -> Option<PaymentReferences> {
        if !location.has_query() {
            return None;
        }
        self.references_from_params(&params_of(location)).ok()
    }
}

pub fn params_of(location: &Location) -> BTreeMap<String, String> {
    location
        .params()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn required_param(
    params: &BTreeMap<String, String>,
    name: &'static str,
) -> Result<String, PaymentError> {
    params
        .get(name)
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or(PaymentError::IncompleteCompletion(name))
}

/// Translate the surface's report into a payment outcome.
fn settle(
    provider: &dyn PaymentProvider,
    event: CheckoutEvent,
) -> Result<PaymentOutcome, PaymentError> {
    match event {
        CheckoutEvent::Callback(params) => provider
            .references_from_params(&params)
            .map(PaymentOutcome::Completed),
        CheckoutEvent::Returned(location) => provider
            .references_from_params(&params_of(&location))
            .map(PaymentOutcome::Completed),
        CheckoutEvent::Dismissed => Ok(PaymentOutcome::Dismissed),
        CheckoutEvent::NavigatedAway => Ok(PaymentOutcome::Redirected),
    }
}

pub fn provider_from_config(
    config: &PaymentConfig,
    surface: Arc<dyn CheckoutSurface>,
) -> Arc<dyn PaymentProvider> {
    match config {
        PaymentConfig::Razorpay(razorpay) => {
            Arc::new(RazorpayProvider::new(razorpay.clone(), surface))
        }
        PaymentConfig::Cashfree(cashfree) => {
            Arc::new(CashfreeProvider::new(cashfree.clone(), surface))
        }
    }
}
