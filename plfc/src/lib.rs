//! Core of the P.League FC team registration flow.
//!
//! Everything here is free of network access: form validation, the records kept in
//! the local store, page identity and the markup of the teams listing.

pub mod page;
pub mod record;
pub mod registration;
pub mod roster;
pub mod store;
pub mod thanks;

pub use page::{thanks_url, Location, Page};
pub use record::{ConfirmedRegistration, PendingCheckout};
pub use registration::{RawTeamForm, TeamRegistrationInput, ValidationError};
pub use roster::{RosterView, TeamSummary};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
