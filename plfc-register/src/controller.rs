//! The registration flow: page activation, the registration gate, submission,
//! payment hand-off, verification and persistence.

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use plfc::{
    record::{
        clear_pending_checkout, load_pending_checkout, load_registration, save_pending_checkout,
        save_registration,
    },
    ConfirmedRegistration, KeyValueStore, Location, Page, PendingCheckout, RawTeamForm,
    RosterView, StoreError, TeamRegistrationInput, ValidationError,
};

use crate::{
    services::{
        backend::{Backend, BackendError, PaymentReferences},
        payment::{params_of, PaymentError, PaymentOutcome, PaymentProvider},
    },
    views,
};

pub const ORDER_FAILED_MESSAGE: &str = "Could not create payment order. Please try again.";
pub const CHECKOUT_FAILED_MESSAGE: &str = "Could not open the payment window. Please try again.";
pub const VERIFICATION_FAILED_MESSAGE: &str =
    "Payment received but your registration could not be confirmed. Please contact the organizer.";
pub const IN_FLIGHT_MESSAGE: &str = "Your registration is already being processed. Please wait.";
pub const ALREADY_REGISTERED_MESSAGE: &str = "A team is already registered from this device.";

/// Failure classes, by what happened to the user's money.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Caught locally, nothing was sent. Fix and resubmit.
    Input,
    /// No money moved. Safe to retry.
    Order,
    /// Money may have moved but the registration is not recorded. Needs the organizer.
    Verification,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("Invalid registration form: {0}")]
    Validation(#[from] ValidationError),
    #[error("A submission is already in progress")]
    InFlight,
    #[error("A team is already registered")]
    AlreadyRegistered,
    #[error("Order creation failed: {0}")]
    OrderCreation(BackendError),
    #[error("Checkout failed: {0}")]
    Checkout(PaymentError),
    #[error("Failed to save the pending checkout: {0}")]
    PendingCheckout(StoreError),
    #[error("Payment completion is unusable: {0}")]
    MissingReferences(PaymentError),
    #[error("No pending checkout to complete")]
    NoPendingCheckout,
    #[error("Returned order '{returned}' does not match pending order '{pending}'")]
    OrderMismatch { returned: String, pending: String },
    #[error("Payment verification failed: {0}")]
    Verification(BackendError),
    #[error("Failed to store the confirmed registration: {0}")]
    Persistence(StoreError),
}

impl SubmitError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(_) | Self::InFlight | Self::AlreadyRegistered => ErrorClass::Input,
            Self::OrderCreation(_) | Self::Checkout(_) | Self::PendingCheckout(_) => {
                ErrorClass::Order
            }
            Self::MissingReferences(_)
            | Self::NoPendingCheckout
            | Self::OrderMismatch { .. }
            | Self::Verification(_)
            | Self::Persistence(_) => ErrorClass::Verification,
        }
    }

    /// The one message shown to the user for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.user_message(),
            Self::InFlight => IN_FLIGHT_MESSAGE,
            Self::AlreadyRegistered => ALREADY_REGISTERED_MESSAGE,
            Self::Checkout(_) => CHECKOUT_FAILED_MESSAGE,
            _ => match self.class() {
                ErrorClass::Order => ORDER_FAILED_MESSAGE,
                _ => VERIFICATION_FAILED_MESSAGE,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Payment verified and recorded. `redirect` is the thank-you page to navigate to.
    Registered {
        registration: ConfirmedRegistration,
        redirect: String,
    },
    /// The user closed the checkout. The form stays usable.
    Dismissed,
    /// The user left for the provider's page. Completion comes back through
    /// [`RegistrationController::activate`] on the registration page.
    Redirected,
}

/// What a page shows once activated.
pub enum Activation<'a> {
    /// The location matches no known page.
    Idle,
    /// A registration is stored. The form is hidden and cannot be submitted.
    AlreadyRegistered { team_name: String },
    /// The form is shown and accepts submissions.
    Form(RegistrationForm<'a>),
    /// The provider redirected back to the registration page.
    Resumed(Result<SubmitOutcome, SubmitError>),
    Thanks { team_name: String },
    Roster { view: RosterView },
}

/// Handle to an open registration form. Only obtained when no registration is stored.
pub struct RegistrationForm<'a> {
    controller: &'a RegistrationController,
}

impl fmt::Debug for RegistrationForm<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationForm").finish()
    }
}

impl RegistrationForm<'_> {
    pub async fn submit(&self, form: &RawTeamForm) -> Result<SubmitOutcome, SubmitError> {
        self.controller.submit(form).await
    }
}

/// Clears the in-flight flag when the submission settles.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct RegistrationController {
    backend: Arc<dyn Backend>,
    provider: Arc<dyn PaymentProvider>,
    store: Arc<dyn KeyValueStore>,
    in_flight: AtomicBool,
}

impl RegistrationController {
    pub fn new(
        backend: Arc<dyn Backend>,
        provider: Arc<dyn PaymentProvider>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            backend,
            provider,
            store,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Run the behavior of the page at `location`. At most one behavior runs.
    pub async fn activate(&self, location: &Location) -> Activation<'_> {
        let page = match location.page() {
            Some(page) => page,
            None => {
                tracing::debug!("No behavior for '{}'", location.path());
                return Activation::Idle;
            }
        };
        tracing::info!("Activating {}", page);

        match page {
            Page::Register => self.activate_register(location).await,
            Page::Thanks => Activation::Thanks {
                team_name: views::thanks_team_name(self.store.as_ref(), location),
            },
            Page::Teams => Activation::Roster {
                view: views::roster_view(self.backend.as_ref()).await,
            },
        }
    }

    async fn activate_register(&self, location: &Location) -> Activation<'_> {
        if let Some(registration) = self.registration() {
            tracing::info!(
                "Team '{}' is already registered, locking the form",
                registration.team_name
            );
            return Activation::AlreadyRegistered {
                team_name: registration.team_name,
            };
        }

        if self.provider.references_from_return(location).is_some() {
            return Activation::Resumed(self.resume_from_redirect(location).await);
        }

        Activation::Form(RegistrationForm { controller: self })
    }

    /// The stored registration. An unreadable store counts as no registration.
    pub fn registration(&self) -> Option<ConfirmedRegistration> {
        load_registration(self.store.as_ref()).unwrap_or_else(|e| {
            tracing::error!("Failed to read stored registration: {}", e);
            None
        })
    }

    fn begin(&self) -> Result<InFlightGuard<'_>, SubmitError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlightGuard(&self.in_flight))
            .map_err(|_| {
                tracing::warn!("Ignoring submission while another one is in flight");
                SubmitError::InFlight
            })
    }

    async fn submit(&self, form: &RawTeamForm) -> Result<SubmitOutcome, SubmitError> {
        let _guard = self.begin()?;

        let team = form.validate().map_err(|e| {
            tracing::warn!("Registration form rejected: {}", e);
            SubmitError::from(e)
        })?;

        if self.registration().is_some() {
            tracing::warn!("Submission refused, a registration is already stored");
            return Err(SubmitError::AlreadyRegistered);
        }

        let amount = self.provider.amount();
        tracing::info!(
            "Creating {} order of {} for team '{}'",
            self.provider.kind(),
            amount,
            team.team_name
        );
        let intent = self
            .backend
            .create_order(amount, &team)
            .await
            .map_err(|e| {
                tracing::error!("Order creation failed: {}", e);
                SubmitError::OrderCreation(e)
            })?;

        let session = self
            .provider
            .create_session(&intent, &team)
            .map_err(|e| {
                tracing::error!("Cannot build checkout session: {}", e);
                SubmitError::Checkout(e)
            })?;

        let leaves_page = session.leaves_page();
        let order_id = session.order_id.clone();
        if leaves_page {
            let pending = PendingCheckout::new(
                team.clone(),
                session.order_id.clone(),
                self.provider.kind().to_string(),
            );
            save_pending_checkout(self.store.as_ref(), &pending).map_err(|e| {
                tracing::error!("Failed to save pending checkout: {}", e);
                SubmitError::PendingCheckout(e)
            })?;
        }

        match self.provider.invoke(session).await {
            Ok(PaymentOutcome::Completed(references)) => {
                if references.order_id() != order_id {
                    tracing::error!(
                        "Provider completed order '{}', checkout was opened for '{}'",
                        references.order_id(),
                        order_id
                    );
                    return Err(SubmitError::OrderMismatch {
                        returned: references.order_id().to_string(),
                        pending: order_id,
                    });
                }
                let outcome = self.verify_and_persist(&references, &team).await?;
                if leaves_page {
                    self.forget_pending_checkout();
                }
                Ok(outcome)
            }
            Ok(PaymentOutcome::Dismissed) => {
                tracing::info!("Checkout dismissed by the user");
                if leaves_page {
                    self.forget_pending_checkout();
                }
                Ok(SubmitOutcome::Dismissed)
            }
            Ok(PaymentOutcome::Redirected) => {
                tracing::info!("Left for the provider checkout, waiting for its return");
                Ok(SubmitOutcome::Redirected)
            }
            Err(e @ PaymentError::IncompleteCompletion(_)) => {
                tracing::error!("Provider reported completion without references: {}", e);
                Err(SubmitError::MissingReferences(e))
            }
            Err(e) => {
                tracing::error!("Checkout failed: {}", e);
                if leaves_page {
                    self.forget_pending_checkout();
                }
                Err(SubmitError::Checkout(e))
            }
        }
    }

    /// Complete a checkout the provider redirected back from.
    pub async fn resume_from_redirect(
        &self,
        location: &Location,
    ) -> Result<SubmitOutcome, SubmitError> {
        let _guard = self.begin()?;

        let references = self
            .provider
            .references_from_params(&params_of(location))
            .map_err(|e| {
                tracing::error!("Provider return without usable references: {}", e);
                SubmitError::MissingReferences(e)
            })?;

        let pending = load_pending_checkout(self.store.as_ref())
            .unwrap_or_else(|e| {
                tracing::error!("Failed to read pending checkout: {}", e);
                None
            })
            .ok_or_else(|| {
                tracing::error!(
                    "Provider returned for order '{}' but no checkout is pending",
                    references.order_id()
                );
                SubmitError::NoPendingCheckout
            })?;

        if references.order_id() != pending.order_id {
            tracing::error!(
                "Provider returned for order '{}', pending order is '{}'",
                references.order_id(),
                pending.order_id
            );
            return Err(SubmitError::OrderMismatch {
                returned: references.order_id().to_string(),
                pending: pending.order_id,
            });
        }

        let outcome = self.verify_and_persist(&references, &pending.team).await?;
        self.forget_pending_checkout();
        Ok(outcome)
    }

    async fn verify_and_persist(
        &self,
        references: &PaymentReferences,
        team: &TeamRegistrationInput,
    ) -> Result<SubmitOutcome, SubmitError> {
        tracing::info!("Verifying payment for order '{}'", references.order_id());
        let verified = self
            .backend
            .verify_payment(references, team)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Verification of order '{}' failed after payment: {}",
                    references.order_id(),
                    e
                );
                SubmitError::Verification(e)
            })?;

        let registration = ConfirmedRegistration::new(verified.team_name, verified.code);
        save_registration(self.store.as_ref(), &registration).map_err(|e| {
            tracing::error!(
                "Team '{}' verified with code '{}' but could not be stored: {}",
                registration.team_name,
                registration.code,
                e
            );
            SubmitError::Persistence(e)
        })?;

        tracing::info!(
            "Team '{}' registered with code '{}'",
            registration.team_name,
            registration.code
        );
        Ok(SubmitOutcome::Registered {
            redirect: registration.thanks_url(),
            registration,
        })
    }

    fn forget_pending_checkout(&self) {
        if let Err(e) = clear_pending_checkout(self.store.as_ref()) {
            tracing::warn!("Failed to clear pending checkout: {}", e);
        }
    }
}
