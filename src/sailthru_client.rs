use crate::api::{ApiResponse, SailthruApi};
use crate::config::Config;
use crate::errors::AppError;
use async_trait::async_trait;
use md5::{Digest, Md5};
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::time::Duration;

/// Client for the Sailthru REST API.
///
/// Every call is a signed request carrying `api_key`, `format=json`, the
/// parameters serialized under `json`, and `sig`.
#[derive(Clone)]
pub struct SailthruClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    secret: String,
}

impl SailthruClient {
    /// Creates a new `SailthruClient`.
    ///
    /// # Arguments
    ///
    /// * `api_url` - Base URL of the API, without trailing slash.
    /// * `api_key` - Account API key.
    /// * `secret` - Shared secret used to sign requests.
    /// * `timeout` - Per-request timeout.
    pub fn new(
        api_url: String,
        api_key: String,
        secret: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create Sailthru client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            secret,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            config.api_url.clone(),
            config.api_key.clone(),
            config.api_secret.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Builds the signed query parameters for `data`.
    fn signed_payload(&self, data: &Map<String, Value>) -> Result<Vec<(String, String)>, AppError> {
        let json = serde_json::to_string(data)?;
        let mut payload = vec![
            ("api_key".to_string(), self.api_key.clone()),
            ("format".to_string(), "json".to_string()),
            ("json".to_string(), json),
        ];
        let values: Vec<&str> = payload.iter().map(|(_, v)| v.as_str()).collect();
        let sig = signature_hash(&values, &self.secret);
        payload.push(("sig".to_string(), sig));
        Ok(payload)
    }

    async fn get(&self, action: &str, data: &Map<String, Value>) -> Result<ApiResponse, AppError> {
        let payload = self.signed_payload(data)?;
        let url = reqwest::Url::parse_with_params(&format!("{}/{}", self.api_url, action), &payload)
            .map_err(|e| AppError::Config(format!("Failed to build URL: {}", e)))?;

        // The query string carries the signature, so only the action is logged.
        tracing::debug!("Sailthru GET /{}", action);

        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::error!("Sailthru request to /{} failed: {}", action, e);
            AppError::from(e)
        })?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let json = parse_body(&bytes)?;

        Ok(ApiResponse::new(status, json))
    }
}

/// Sailthru request signature: MD5 of the secret followed by the sorted
/// parameter values, hex encoded.
pub fn signature_hash(values: &[&str], secret: &str) -> String {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let mut hasher = Md5::new();
    hasher.update(secret.as_bytes());
    for value in sorted {
        hasher.update(value.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Rewrites `\uXXXX` surrogate escapes that do not form a high+low pair to
/// `\uFFFD`. Escaped backslashes are matched first so `\\uD800` stays literal.
pub fn replace_lone_surrogates(text: &str) -> Cow<'_, str> {
    if !text.contains("\\u") {
        return Cow::Borrowed(text);
    }
    let re = Regex::new(
        r"(?i)\\\\|\\ud[89ab][0-9a-f]{2}(?:\\ud[c-f][0-9a-f]{2})?|\\ud[c-f][0-9a-f]{2}",
    )
    .unwrap();
    re.replace_all(text, |caps: &Captures| {
        let escape = &caps[0];
        // An escaped backslash is 2 bytes, a valid pair 12.
        if escape.len() == 2 || escape.len() == 12 {
            escape.to_string()
        } else {
            "\\uFFFD".to_string()
        }
    })
}

/// Decodes a response body, replacing invalid UTF-8 and unpaired surrogate
/// escapes rather than failing.
fn parse_body(bytes: &[u8]) -> Result<Value, AppError> {
    let text = String::from_utf8_lossy(bytes);
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&replace_lone_surrogates(&text)).map_err(|e| {
        AppError::InvalidResponse(format!("Failed to parse Sailthru response: {}", e))
    })
}

#[async_trait]
impl SailthruApi for SailthruClient {
    async fn api_get(
        &self,
        action: &str,
        params: Map<String, Value>,
    ) -> Result<ApiResponse, AppError> {
        self.get(action, &params).await
    }

    async fn stats_blast(
        &self,
        blast_id: i64,
        options: Map<String, Value>,
    ) -> Result<ApiResponse, AppError> {
        let mut data = options;
        data.insert("stat".to_string(), Value::from("blast"));
        data.insert("blast_id".to_string(), Value::from(blast_id));
        self.get("stats", &data).await
    }

    async fn get_user(
        &self,
        id: &str,
        options: Option<Map<String, Value>>,
    ) -> Result<ApiResponse, AppError> {
        let mut data = options.unwrap_or_default();
        data.insert("id".to_string(), Value::from(id));
        self.get("user", &data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = SailthruClient::new(
            "https://api.sailthru.com/".to_string(),
            "key".to_string(),
            "secret".to_string(),
            Duration::from_secs(5),
        );
        assert!(client.is_ok());
        assert_eq!(client.unwrap().api_url, "https://api.sailthru.com");
    }

    #[test]
    fn test_signature_sorts_values() {
        // md5("secret" + "a" + "b" + "c")
        let expected = hex::encode(Md5::digest(b"secretabc"));
        assert_eq!(signature_hash(&["c", "a", "b"], "secret"), expected);
        assert_eq!(signature_hash(&["b", "c", "a"], "secret"), expected);
    }

    #[test]
    fn test_parse_body_is_lossy() {
        let body = b"{\"subject\": \"caf\xe9\"}";
        let value = parse_body(body).unwrap();
        assert_eq!(value["subject"], "caf\u{FFFD}");
    }

    #[test]
    fn test_lone_surrogates_are_replaced() {
        assert_eq!(
            replace_lone_surrogates(r#""BREAKING \ud83d news""#),
            r#""BREAKING \uFFFD news""#
        );
        assert_eq!(replace_lone_surrogates(r#""\uDE00x""#), r#""\uFFFDx""#);
        // High surrogate followed by another high one.
        assert_eq!(
            replace_lone_surrogates(r#""\uD83D\uD83D\uDE00""#),
            r#""\uFFFD\uD83D\uDE00""#
        );
    }

    #[test]
    fn test_valid_escapes_are_untouched() {
        for text in [
            r#""\ud83d\ude00""#,
            r#""caf\u00e9""#,
            r#""C:\\ud83d""#,
            r#""plain text""#,
        ] {
            assert_eq!(replace_lone_surrogates(text), text);
        }
        let value = parse_body(br#"{"subject": "\ud83d\ude00 \\ud83d"}"#).unwrap();
        assert_eq!(value["subject"], "\u{1F600} \\ud83d");
    }

    #[test]
    fn test_parse_body_replaces_lone_surrogate() {
        let value = parse_body(br#"{"subject": "BREAKING \ud83d news"}"#).unwrap();
        assert_eq!(value["subject"], "BREAKING \u{FFFD} news");
    }

    #[test]
    fn test_parse_body_empty_and_invalid() {
        assert_eq!(parse_body(b"  ").unwrap(), Value::Null);
        assert!(matches!(
            parse_body(b"<html>"),
            Err(AppError::InvalidResponse(_))
        ));
    }
}
