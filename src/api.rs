//! The slice of the Sailthru API this crate depends on.
//!
//! `CampaignService` only ever talks to Sailthru through [`SailthruApi`], so
//! the HTTP client in `sailthru_client` can be swapped for an in-memory
//! double in tests.

use crate::errors::AppError;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Error code and message reported by Sailthru for a failed call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiErrorDetail {
    pub code: i64,
    pub message: String,
}

/// A parsed Sailthru response.
///
/// Sailthru reports most failures with a 2xx status and an `error` /
/// `errormsg` pair in the body, so success needs both checks.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    status: u16,
    json: Value,
}

impl ApiResponse {
    pub fn new(status: u16, json: Value) -> Self {
        Self { status, json }
    }

    /// Successful response carrying `json`.
    pub fn ok(json: Value) -> Self {
        Self::new(200, json)
    }

    /// Failed response as Sailthru would send it.
    pub fn error(code: i64, message: &str) -> Self {
        Self::new(
            400,
            serde_json::json!({ "error": code, "errormsg": message }),
        )
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status) && self.json.get("error").is_none()
    }

    /// The reported failure, or `None` when the call succeeded.
    pub fn error_detail(&self) -> Option<ApiErrorDetail> {
        if self.is_ok() {
            return None;
        }
        // Codes that are not integers fall back to the HTTP status.
        let code = match self.json.get("error") {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
        .unwrap_or_else(|| i64::from(self.status));
        let message = self
            .json
            .get("errormsg")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP status {}", self.status));
        Some(ApiErrorDetail { code, message })
    }

    pub fn json(&self) -> &Value {
        &self.json
    }

    pub fn into_json(self) -> Value {
        self.json
    }

    pub fn set_json(&mut self, json: Value) {
        self.json = json;
    }
}

/// Returns the response unchanged, or the uniform API error when Sailthru
/// reported a failure.
pub fn raise_for_error(response: ApiResponse) -> Result<ApiResponse, AppError> {
    match response.error_detail() {
        None => Ok(response),
        Some(ApiErrorDetail { code, message }) => {
            tracing::warn!("Sailthru API error {}: {}", code, message);
            Err(AppError::api(code, message))
        }
    }
}

/// Sailthru capabilities consumed by `CampaignService`.
#[async_trait]
pub trait SailthruApi: Send + Sync {
    /// GET `action` with `params` as the request's JSON payload.
    async fn api_get(&self, action: &str, params: Map<String, Value>)
        -> Result<ApiResponse, AppError>;

    /// Stats for one blast. `options` holds extra report flags.
    async fn stats_blast(
        &self,
        blast_id: i64,
        options: Map<String, Value>,
    ) -> Result<ApiResponse, AppError>;

    /// Look up a user profile by id (email, sid, ...).
    async fn get_user(
        &self,
        id: &str,
        options: Option<Map<String, Value>>,
    ) -> Result<ApiResponse, AppError>;
}
