//! Terminal front-end: prompts for the registration form, prints or opens the
//! provider checkout and reads back what the provider reported.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use plfc::{Location, RawTeamForm};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader},
    sync::Mutex,
};

use crate::services::payment::{Checkout, CheckoutEvent, CheckoutSurface, PaymentError};

/// Line reader shared by every prompt, so buffered input is never dropped between
/// two reads.
pub struct Prompter {
    input: Mutex<Box<dyn AsyncBufRead + Unpin + Send>>,
}

impl Prompter {
    pub fn new(input: Box<dyn AsyncBufRead + Unpin + Send>) -> Self {
        Self {
            input: Mutex::new(input),
        }
    }

    pub fn stdin() -> Self {
        Self::new(Box::new(BufReader::new(tokio::io::stdin())))
    }

    /// Next line, trimmed. Empty at end of input.
    pub async fn read_line(&self) -> std::io::Result<String> {
        let mut line = String::new();
        self.input.lock().await.read_line(&mut line).await?;
        Ok(line.trim().to_string())
    }

    async fn read_surface_line(&self) -> Result<String, PaymentError> {
        self.read_line()
            .await
            .map_err(|e| PaymentError::Surface(format!("Reading standard input: {}", e)))
    }

    async fn prompt(&self, label: &str) -> std::io::Result<String> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(format!("{}: ", label).as_bytes()).await?;
        stdout.flush().await?;
        self.read_line().await
    }

    /// Ask for each registration field in turn.
    pub async fn prompt_form(&self) -> std::io::Result<RawTeamForm> {
        Ok(RawTeamForm {
            team_name: self.prompt("Team name").await?,
            captain_name: self.prompt("Captain name").await?,
            phone: self.prompt("Phone (10 digits)").await?,
            email: self.prompt("Email").await?,
            players_count: self.prompt("Number of players (7-11)").await?,
        })
    }
}

pub struct TerminalCheckout {
    open_browser: bool,
    prompter: Arc<Prompter>,
}

impl TerminalCheckout {
    pub fn new(open_browser: bool, prompter: Arc<Prompter>) -> Self {
        Self {
            open_browser,
            prompter,
        }
    }
}

/// Success handler parameters, as a JSON object or `key=value&...` pairs.
pub fn parse_callback(input: &str) -> Result<BTreeMap<String, String>, PaymentError> {
    let input = input.trim();
    if input.starts_with('{') {
        let values: BTreeMap<String, serde_json::Value> = serde_json::from_str(input)
            .map_err(|e| PaymentError::Surface(format!("Invalid callback JSON: {}", e)))?;
        return Ok(values
            .into_iter()
            .map(|(k, v)| match v {
                serde_json::Value::String(s) => (k, s),
                other => (k, other.to_string()),
            })
            .collect());
    }

    Ok(url::form_urlencoded::parse(input.replace(char::is_whitespace, "&").as_bytes())
        .filter(|(k, _)| !k.is_empty())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect())
}

/// The location the provider sent the user back to. Empty input means the user has
/// not come back yet.
pub fn parse_return(input: &str) -> CheckoutEvent {
    let input = input.trim();
    if input.is_empty() {
        CheckoutEvent::NavigatedAway
    } else {
        CheckoutEvent::Returned(Location::parse(input))
    }
}

#[async_trait]
impl CheckoutSurface for TerminalCheckout {
    async fn present(&self, checkout: Checkout) -> Result<CheckoutEvent, PaymentError> {
        match checkout {
            Checkout::Overlay(options) => {
                let options = serde_json::to_string_pretty(&options)
                    .map_err(|e| PaymentError::Surface(e.to_string()))?;
                println!("Open the Razorpay checkout with these options:\n{}", options);
                println!("Paste the success handler response (JSON or key=value pairs).");
                println!("Press Enter to cancel:");
                let line = self.prompter.read_surface_line().await?;
                if line.is_empty() {
                    return Ok(CheckoutEvent::Dismissed);
                }
                parse_callback(&line).map(CheckoutEvent::Callback)
            }
            Checkout::Redirect { url } => {
                if self.open_browser {
                    if let Err(e) = open::that_detached(&url) {
                        tracing::warn!("Could not open browser: {}", e);
                    }
                }
                println!("Complete the payment at:\n{}", url);
                println!("Paste the address you were sent back to, or press Enter to finish later");
                println!("with `plfc-register open <ADDRESS>`:");
                Ok(parse_return(&self.prompter.read_surface_line().await?))
            }
        }
    }
}
