use std::{
    collections::{BTreeMap, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use plfc::{RawTeamForm, TeamRegistrationInput, TeamSummary};
use tokio::sync::Notify;

use crate::services::{
    backend::{Backend, BackendError, OrderIntent, PaymentReferences, VerifiedTeam},
    payment::{Checkout, CheckoutEvent, CheckoutSurface, PaymentError},
};

pub fn test_form() -> RawTeamForm {
    RawTeamForm {
        team_name: "Eagles".to_string(),
        captain_name: "Ravi Kumar".to_string(),
        phone: "9876543210".to_string(),
        email: "ravi@example.com".to_string(),
        players_count: "9".to_string(),
    }
}

pub fn test_team() -> TeamRegistrationInput {
    TeamRegistrationInput {
        team_name: "Eagles".to_string(),
        captain_name: "Ravi Kumar".to_string(),
        phone: "9876543210".to_string(),
        email: "ravi@example.com".to_string(),
        players_count: 9,
    }
}

/// Success handler parameters of a completed Razorpay overlay.
pub fn razorpay_callback(order_id: &str) -> CheckoutEvent {
    let mut params = BTreeMap::new();
    params.insert("razorpay_order_id".to_string(), order_id.to_string());
    params.insert("razorpay_payment_id".to_string(), "pay_1".to_string());
    params.insert("razorpay_signature".to_string(), "sig_1".to_string());
    CheckoutEvent::Callback(params)
}

/// Ordered log of the calls made to the mocks.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: &str) {
        self.0.lock().unwrap().push(entry.to_string());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

pub struct MockBackend {
    order: Mutex<Result<OrderIntent, BackendError>>,
    verify: Mutex<Result<VerifiedTeam, BackendError>>,
    teams: Mutex<Result<Vec<TeamSummary>, BackendError>>,
    order_requests: Mutex<Vec<(u64, TeamRegistrationInput)>>,
    verify_requests: Mutex<Vec<(PaymentReferences, TeamRegistrationInput)>>,
    order_calls: AtomicUsize,
    verify_calls: AtomicUsize,
    teams_calls: AtomicUsize,
    order_gate: Mutex<Option<Arc<Notify>>>,
    journal: Journal,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            order: Mutex::new(Ok(OrderIntent {
                order_id: Some("order_1".to_string()),
                payment_session_id: Some("session_1".to_string()),
                amount: 289900,
            })),
            verify: Mutex::new(Ok(VerifiedTeam {
                team_name: "Eagles".to_string(),
                code: "PLFC-07".to_string(),
            })),
            teams: Mutex::new(Ok(Vec::new())),
            order_requests: Mutex::new(Vec::new()),
            verify_requests: Mutex::new(Vec::new()),
            order_calls: AtomicUsize::new(0),
            verify_calls: AtomicUsize::new(0),
            teams_calls: AtomicUsize::new(0),
            order_gate: Mutex::new(None),
            journal: Journal::default(),
        }
    }

    pub fn set_order(&self, result: Result<OrderIntent, BackendError>) {
        *self.order.lock().unwrap() = result;
    }

    pub fn set_verify(&self, result: Result<VerifiedTeam, BackendError>) {
        *self.verify.lock().unwrap() = result;
    }

    pub fn set_teams(&self, result: Result<Vec<TeamSummary>, BackendError>) {
        *self.teams.lock().unwrap() = result;
    }

    /// Make `create_order` wait until the returned gate is notified.
    pub fn hold_orders(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.order_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn order_calls(&self) -> usize {
        self.order_calls.load(Ordering::SeqCst)
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    pub fn teams_calls(&self) -> usize {
        self.teams_calls.load(Ordering::SeqCst)
    }

    pub fn order_requests(&self) -> Vec<(u64, TeamRegistrationInput)> {
        self.order_requests.lock().unwrap().clone()
    }

    pub fn verify_requests(&self) -> Vec<(PaymentReferences, TeamRegistrationInput)> {
        self.verify_requests.lock().unwrap().clone()
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.entries()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn create_order(
        &self,
        amount: u64,
        team: &TeamRegistrationInput,
    ) -> Result<OrderIntent, BackendError> {
        self.order_calls.fetch_add(1, Ordering::SeqCst);
        self.journal.record("create_order");
        self.order_requests
            .lock()
            .unwrap()
            .push((amount, team.clone()));
        let gate = self.order_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.order.lock().unwrap().clone()
    }

    async fn verify_payment(
        &self,
        references: &PaymentReferences,
        team: &TeamRegistrationInput,
    ) -> Result<VerifiedTeam, BackendError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.journal.record("verify_payment");
        self.verify_requests
            .lock()
            .unwrap()
            .push((references.clone(), team.clone()));
        self.verify.lock().unwrap().clone()
    }

    async fn list_teams(&self) -> Result<Vec<TeamSummary>, BackendError> {
        self.teams_calls.fetch_add(1, Ordering::SeqCst);
        self.journal.record("list_teams");
        self.teams.lock().unwrap().clone()
    }
}

/// Checkout surface replaying scripted user actions. Reports a dismissal once the
/// script runs out.
#[derive(Default)]
pub struct ScriptedSurface {
    events: Mutex<VecDeque<CheckoutEvent>>,
    presented: Mutex<Vec<Checkout>>,
    failure: Mutex<Option<PaymentError>>,
    journal: Mutex<Option<Journal>>,
}

impl ScriptedSurface {
    pub fn new(events: Vec<CheckoutEvent>) -> Self {
        Self {
            events: Mutex::new(events.into()),
            ..Default::default()
        }
    }

    /// Record presentations in the backend's journal.
    pub fn share_journal(&self, backend: &MockBackend) {
        *self.journal.lock().unwrap() = Some(backend.journal.clone());
    }

    pub fn fail_with(&self, error: PaymentError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    pub fn presented(&self) -> Vec<Checkout> {
        self.presented.lock().unwrap().clone()
    }
}

#[async_trait]
impl CheckoutSurface for ScriptedSurface {
    async fn present(&self, checkout: Checkout) -> Result<CheckoutEvent, PaymentError> {
        if let Some(journal) = self.journal.lock().unwrap().as_ref() {
            journal.record("present");
        }
        self.presented.lock().unwrap().push(checkout);
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self
            .events
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(CheckoutEvent::Dismissed))
    }
}
