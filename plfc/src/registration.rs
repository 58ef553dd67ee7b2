//! Team registration form and its validation.

use serde::{Deserialize, Serialize};

pub const MIN_PLAYERS: u8 = 7;
pub const MAX_PLAYERS: u8 = 11;
pub const PHONE_DIGITS: usize = 10;

/// The single message shown for any invalid form submission.
pub const VALIDATION_MESSAGE: &str =
    "Please fill all fields correctly (phone = 10 digits, players 7-11).";

/// Field values as typed into the registration form, before any checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTeamForm {
    pub team_name: String,
    pub captain_name: String,
    pub phone: String,
    pub email: String,
    pub players_count: String,
}

/// A registration that passed validation. Built anew on every submit attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRegistrationInput {
    pub team_name: String,
    pub captain_name: String,
    pub phone: String,
    pub email: String,
    pub players_count: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("team name is empty")]
    EmptyTeamName,
    #[error("captain name is empty")]
    EmptyCaptainName,
    #[error("phone '{0}' is not exactly 10 digits")]
    InvalidPhone(String),
    #[error("email is empty")]
    EmptyEmail,
    #[error("players count '{0}' is not an integer between 7 and 11")]
    InvalidPlayersCount(String),
}

impl ValidationError {
    pub fn user_message(&self) -> &'static str {
        VALIDATION_MESSAGE
    }
}

fn is_valid_phone(phone: &str) -> bool {
    phone.len() == PHONE_DIGITS && phone.bytes().all(|b| b.is_ascii_digit())
}

fn parse_players_count(raw: &str) -> Option<u8> {
    raw.parse::<u8>()
        .ok()
        .filter(|n| (MIN_PLAYERS..=MAX_PLAYERS).contains(n))
}

impl RawTeamForm {
    /// Check every field and build the validated input. Pure: no side effects.
    pub fn validate(&self) -> Result<TeamRegistrationInput, ValidationError> {
        let team_name = self.team_name.trim();
        if team_name.is_empty() {
            return Err(ValidationError::EmptyTeamName);
        }

        let captain_name = self.captain_name.trim();
        if captain_name.is_empty() {
            return Err(ValidationError::EmptyCaptainName);
        }

        let phone = self.phone.trim();
        if !is_valid_phone(phone) {
            return Err(ValidationError::InvalidPhone(phone.to_string()));
        }

        let email = self.email.trim();
        if email.is_empty() {
            return Err(ValidationError::EmptyEmail);
        }

        let players = self.players_count.trim();
        let players_count = parse_players_count(players)
            .ok_or_else(|| ValidationError::InvalidPlayersCount(players.to_string()))?;

        Ok(TeamRegistrationInput {
            team_name: team_name.to_string(),
            captain_name: captain_name.to_string(),
            phone: phone.to_string(),
            email: email.to_string(),
            players_count,
        })
    }
}
