use std::{path::PathBuf, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use tracing_subscriber::filter::LevelFilter;

pub const DEFAULT_API_BASE: &str = "https://patnaleaguefc-backend.onrender.com";
pub const CONFIG_FILENAME: &str = "plfc.toml";

fn deserialize_fromstr<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let string = String::deserialize(deserializer)?;
    T::from_str(&string)
        .map_err(|e| de::Error::custom(format!("Error parsing '{}': {}", string, e)))
}

pub fn serialize_to_string<T: std::fmt::Display, S: Serializer>(
    field: T,
    s: S,
) -> Result<S::Ok, S::Error> {
    s.serialize_str(&field.to_string())
}

fn default_loglevel() -> LevelFilter {
    LevelFilter::INFO
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_razorpay_amount() -> u64 {
    289900
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_merchant_name() -> String {
    "P.League FC".to_string()
}

fn default_description() -> String {
    "Team Registration".to_string()
}

fn default_theme_color() -> String {
    "#7AF8C6".to_string()
}

fn default_phone_prefix() -> String {
    "+91".to_string()
}

fn default_cashfree_amount() -> u64 {
    2899
}

/// Settings of the Razorpay overlay checkout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RazorpayConfig {
    /// Public key id from the Razorpay dashboard.
    pub key_id: String,
    /// Registration fee in paise.
    #[serde(default = "default_razorpay_amount")]
    pub amount: u64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_merchant_name")]
    pub merchant_name: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_theme_color")]
    pub theme_color: String,
    /// Prepended to the 10-digit phone number to prefill the contact field.
    #[serde(default = "default_phone_prefix")]
    pub phone_prefix: String,
}

impl Default for RazorpayConfig {
    fn default() -> Self {
        Self {
            key_id: String::new(),
            amount: default_razorpay_amount(),
            currency: default_currency(),
            merchant_name: default_merchant_name(),
            description: default_description(),
            theme_color: default_theme_color(),
            phone_prefix: default_phone_prefix(),
        }
    }
}

/// Settings of the Cashfree redirect checkout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CashfreeConfig {
    /// Hosted checkout page. The payment session id is appended as a query parameter.
    pub checkout_url: String,
    /// Registration fee in rupees.
    #[serde(default = "default_cashfree_amount")]
    pub amount: u64,
}

impl Default for CashfreeConfig {
    fn default() -> Self {
        Self {
            checkout_url: String::new(),
            amount: default_cashfree_amount(),
        }
    }
}

/// Payment provider selection, one table in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum PaymentConfig {
    #[serde(rename = "razorpay_config")]
    Razorpay(RazorpayConfig),
    #[serde(rename = "cashfree_config")]
    Cashfree(CashfreeConfig),
}

/// Static informations we require to operate
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Base URL of the league backend
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// An optional custom data directory
    pub data_dir: Option<PathBuf>,
    /// What messages to log
    #[serde(
        deserialize_with = "deserialize_fromstr",
        serialize_with = "serialize_to_string",
        default = "default_loglevel"
    )]
    pub log_level: LevelFilter,
    /// Settings of the payment provider
    #[serde(flatten)]
    pub payment: PaymentConfig,
}

impl Config {
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(config_folder_path)
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not locate the configuration directory.")]
    DatadirNotFound,
    #[error("Could not locate the configuration file.")]
    FileNotFound,
    #[error("Failed to read configuration file: {0}")]
    ReadingFile(String),
    #[error("Configuration error: {0}")]
    Unexpected(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound,
            _ => Self::ReadingFile(e.to_string()),
        }
    }
}

/// Get the absolute path to the plfc configuration folder.
///
/// It's a "Plfc" directory in the XDG standard configuration directory for all OSes but
/// Linux-based ones, for which it's `~/.plfc`.
pub fn config_folder_path() -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    let configs_dir = dirs::home_dir();

    #[cfg(not(target_os = "linux"))]
    let configs_dir = dirs::config_dir();

    if let Some(mut path) = configs_dir {
        #[cfg(target_os = "linux")]
        path.push(".plfc");

        #[cfg(not(target_os = "linux"))]
        path.push("Plfc");

        return Some(path);
    }

    None
}

fn config_file_path() -> Option<PathBuf> {
    config_folder_path().map(|mut path| {
        path.push(CONFIG_FILENAME);
        path
    })
}

/// The provider tables are mutually exclusive.
fn check_single_provider(raw: &toml::Value) -> Result<(), ConfigError> {
    let tables = ["razorpay_config", "cashfree_config"]
        .into_iter()
        .filter(|table| raw.get(*table).is_some())
        .count();
    if tables > 1 {
        return Err(ConfigError::Unexpected(
            "Only one of razorpay_config and cashfree_config may be set".to_string(),
        ));
    }
    Ok(())
}

impl Config {
    /// Read the configuration out of a mandatory configuration file.
    pub fn from_file(custom_path: Option<PathBuf>) -> Result<Config, ConfigError> {
        let config_file = match custom_path {
            Some(path) => path,
            None => config_file_path().ok_or(ConfigError::DatadirNotFound)?,
        };

        let content = std::fs::read(config_file)?;
        let raw = toml::from_slice::<toml::Value>(&content)
            .map_err(|e| ConfigError::ReadingFile(format!("Parsing configuration file: {}", e)))?;
        check_single_provider(&raw)?;
        let config = toml::from_slice::<Config>(&content)
            .map_err(|e| ConfigError::ReadingFile(format!("Parsing configuration file: {}", e)))?;
        config.check()?;

        Ok(config)
    }

    /// Make sure the settings are sane.
    pub fn check(&self) -> Result<(), ConfigError> {
        let api_base = url::Url::parse(&self.api_base).map_err(|e| {
            ConfigError::Unexpected(format!("Invalid api_base '{}': {}", self.api_base, e))
        })?;
        if !matches!(api_base.scheme(), "http" | "https") {
            return Err(ConfigError::Unexpected(format!(
                "api_base '{}' must be an http(s) URL",
                self.api_base
            )));
        }

        match &self.payment {
            PaymentConfig::Razorpay(razorpay) => {
                if razorpay.key_id.trim().is_empty() {
                    return Err(ConfigError::Unexpected(
                        "razorpay_config.key_id must not be empty".to_string(),
                    ));
                }
            }
            PaymentConfig::Cashfree(cashfree) => {
                url::Url::parse(&cashfree.checkout_url).map_err(|e| {
                    ConfigError::Unexpected(format!(
                        "Invalid cashfree_config.checkout_url '{}': {}",
                        cashfree.checkout_url, e
                    ))
                })?;
            }
        }

        Ok(())
    }
}
