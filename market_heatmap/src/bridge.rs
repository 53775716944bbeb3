//! HTTP client for the local quote bridge.
//!
//! The terminal vendor SDK runs behind a small bridge process on the same
//! host that exposes its blocking calls as JSON over HTTP. This module
//! wraps that bridge and implements `QuoteSession` on top of it. Connection
//! failures surface as `FetchError::Unavailable` (the bridge is not
//! running), everything else transport-related as `FetchError::Transport`.
use log::{debug, info};
use market_common::payload::QuotePayload;
use market_common::session::{QuoteSession, SessionOptions};
use market_common::{FetchError, Result};
use serde::Deserialize;
use serde_json::json;

/// Vendor status envelope returned by the start/stop endpoints.
#[derive(Debug, Deserialize)]
struct SessionStatus {
    #[serde(alias = "ErrorCode", default)]
    error_code: i64,
    #[serde(alias = "ErrorMsg", default)]
    error_msg: Option<String>,
}

/// Blocking HTTP session against the quote bridge.
pub struct BridgeSession {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl BridgeSession {
    /// Create a client for the bridge at `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("POST {}", url);
        let response = self.http.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                FetchError::Unavailable(format!("quote bridge at {}: {}", self.base_url, e))
            } else {
                FetchError::Transport(e.to_string())
            }
        })?;
        response
            .json::<T>()
            .map_err(|e| FetchError::Transport(e.to_string()))
    }
}

impl QuoteSession for BridgeSession {
    fn start(&mut self, options: &SessionOptions) -> Result<()> {
        let status: SessionStatus =
            self.post("api/start", json!({ "options": options.render() }))?;
        if status.error_code != 0 {
            return Err(FetchError::Login {
                code: status.error_code,
                msg: status.error_msg.unwrap_or_else(|| "unknown".to_string()),
            });
        }
        info!("Quote session started");
        Ok(())
    }

    fn snapshot(&mut self, codes: &str, fields: &str, options: &str) -> Result<QuotePayload> {
        self.post(
            "api/css",
            json!({ "codes": codes, "fields": fields, "options": options }),
        )
    }

    fn daily_series(
        &mut self,
        code: &str,
        field: &str,
        start: &str,
        end: &str,
        options: &str,
    ) -> Result<QuotePayload> {
        self.post(
            "api/csd",
            json!({
                "codes": code,
                "fields": field,
                "start": start,
                "end": end,
                "options": options
            }),
        )
    }

    fn stop(&mut self) {
        if let Err(e) = self.post::<SessionStatus>("api/stop", json!({})) {
            debug!("Quote session stop failed: {}", e);
        }
    }
}
