//! Blocking client for the REST data service.
//!
//! Every query is one POST of `{api_name, token, params, fields}` against
//! the service base URL; the answer is `{code, msg, data: {fields, items}}`.
//! A nonzero `code` becomes `FetchError::Query` so callers can decide
//! whether the query is fatal or a probe that may degrade.
use log::{debug, warn};
use market_common::{FetchError, Result};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::frame::TableFrame;

/// Data-service response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<TableFrame>,
}

/// Blocking HTTP client for the data service.
pub struct DataServiceClient {
    http: reqwest::blocking::Client,
    base_url: String,
    token: String,
}

impl DataServiceClient {
    /// Create a client for the service at `base_url` with the account token.
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Run one API query and decode the table frame.
    pub fn query(&self, api_name: &str, params: Value, fields: &str) -> Result<TableFrame> {
        debug!("data-service query {} {}", api_name, params);
        let body = json!({
            "api_name": api_name,
            "token": self.token,
            "params": params,
            "fields": fields
        });
        let response = self.http.post(&self.base_url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                FetchError::Unavailable(format!("data service at {}: {}", self.base_url, e))
            } else {
                FetchError::Transport(e.to_string())
            }
        })?;
        let decoded: ApiResponse = response
            .json()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        if decoded.code != 0 {
            warn!(
                "{} rejected: {}",
                api_name,
                decoded.msg.as_deref().unwrap_or("unknown")
            );
            return Err(FetchError::Query {
                api: api_name.to_string(),
                code: decoded.code,
            });
        }
        Ok(decoded.data.unwrap_or_default())
    }
}
