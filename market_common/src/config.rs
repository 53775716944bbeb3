//! Process configuration, constructed once at startup.
//!
//! All environment access lives here: `Config::from_env` loads `.env` and
//! `.env.local` (existing process variables win over file entries) and
//! collects everything the binaries need. The core modules never read the
//! environment; they receive the struct, or pieces of it, explicitly.
use crate::error::FetchError;
use crate::result::Result;

/// Quote-vendor login credentials.
#[derive(Debug, Clone)]
pub struct QuoteCredentials {
    /// Vendor account name.
    pub username: String,
    /// Vendor account password.
    pub password: String,
}

/// Default quote-bridge endpoint.
pub const DEFAULT_BRIDGE_URL: &str = "http://127.0.0.1:8611";
/// Default data-service endpoint.
pub const DEFAULT_DATA_API_URL: &str = "http://api.tushare.pro";

/// Full process configuration for both vendor clients.
#[derive(Debug, Clone)]
pub struct Config {
    /// Quote-vendor credentials, when present in the environment.
    pub quote: Option<QuoteCredentials>,
    /// Base URL of the local quote bridge.
    pub bridge_url: String,
    /// Data-service token, when present.
    pub data_token: Option<String>,
    /// Base URL of the data service.
    pub data_api_url: String,
    /// Trade-date override (`YYYY-MM-DD`).
    pub trade_date: Option<String>,
}

impl Config {
    /// Load configuration from `.env`/`.env.local` files and the process
    /// environment.
    pub fn from_env() -> Config {
        let _ = dotenvy::dotenv();
        let _ = dotenvy::from_filename(".env.local");
        let quote = match (var("EMQ_USERNAME"), var("EMQ_PASSWORD")) {
            (Some(username), Some(password)) => Some(QuoteCredentials { username, password }),
            _ => None,
        };
        Config {
            quote,
            bridge_url: var("CHOICE_BRIDGE_URL").unwrap_or_else(|| DEFAULT_BRIDGE_URL.to_string()),
            data_token: var("TUSHARE_TOKEN"),
            data_api_url: var("TUSHARE_API_URL")
                .unwrap_or_else(|| DEFAULT_DATA_API_URL.to_string()),
            trade_date: var("CHOICE_TRADE_DATE").or_else(|| var("SPOT_TRADE_DATE")),
        }
    }

    /// Quote credentials, or the credential-missing failure.
    pub fn require_quote(&self) -> Result<&QuoteCredentials> {
        self.quote
            .as_ref()
            .ok_or_else(|| FetchError::MissingCredentials("EMQ_USERNAME/EMQ_PASSWORD".to_string()))
    }

    /// Data-service token, or the credential-missing failure.
    pub fn require_data_token(&self) -> Result<&str> {
        self.data_token
            .as_deref()
            .ok_or_else(|| FetchError::MissingCredentials("TUSHARE_TOKEN".to_string()))
    }
}

/// Read one environment variable, trimming whitespace and matching quotes.
/// Empty values count as unset.
fn var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| {
            value
                .trim()
                .trim_matches('"')
                .trim_matches('\'')
                .to_string()
        })
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_carry_distinct_exit_codes() {
        let config = Config {
            quote: None,
            bridge_url: DEFAULT_BRIDGE_URL.to_string(),
            data_token: None,
            data_api_url: DEFAULT_DATA_API_URL.to_string(),
            trade_date: None,
        };
        assert_eq!(config.require_quote().unwrap_err().exit_code(), 2);
        assert_eq!(config.require_data_token().unwrap_err().exit_code(), 2);
    }
}
