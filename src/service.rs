//! Campaign queries with Industry Dive concepts layered on top of Sailthru.
//!
//! All operations:
//! 1. Call Sailthru through the injected [`SailthruApi`]
//! 2. Raise `AppError::Api` when Sailthru reports a failure
//! 3. Enrich or normalize the payload where the operation calls for it
use crate::api::{raise_for_error, ApiResponse, SailthruApi};
use crate::classifier::{decode_subject, infer_brand, infer_email_type};
use crate::errors::AppError;
use crate::models::{user_defaults, Campaign, DateWindow, StatsOptions};
use crate::normalize::{is_truthy, merge_value};
use chrono::{Duration, NaiveDate};
use serde_json::{json, Map, Value};

/// Sailthru cannot return large numbers of campaigns in one request, so
/// range queries are split into pages of at most this many days.
pub const PAGE_SIZE_IN_DAYS: i64 = 30;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Splits `[start, end)` into consecutive windows of at most
/// [`PAGE_SIZE_IN_DAYS`], the last one clipped to `end`.
pub fn date_windows(start: NaiveDate, end: NaiveDate) -> Vec<DateWindow> {
    let mut windows = Vec::new();
    let mut page_start = start;
    while page_start < end {
        let page_end = (page_start + Duration::days(PAGE_SIZE_IN_DAYS)).min(end);
        windows.push(DateWindow {
            start: page_start,
            end: page_end,
        });
        page_start = page_end;
    }
    windows
}

/// Attaches `dive_email_type` and `dive_brand` and rewrites the subject as
/// permissively decoded text.
pub fn enrich_campaign(mut campaign: Campaign) -> Campaign {
    let email_type = infer_email_type(&campaign);
    let brand = infer_brand(&campaign);
    let subject = decode_subject(campaign.subject_text().as_bytes()).into_owned();

    campaign.set_email_type(email_type);
    campaign.set_brand(brand);
    campaign.set_subject(subject);
    campaign
}

/// Sailthru client wrapper that adds dive brand, dive email type and easier
/// ways to query campaigns.
pub struct CampaignService<A> {
    api: A,
}

impl<A: SailthruApi> CampaignService<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Sent campaign metadata for `[start_date, end_date)`, oldest first,
    /// optionally limited to sends to one named list.
    ///
    /// Each campaign gets `dive_email_type` and `dive_brand`. A failure on
    /// any page fails the whole query.
    pub async fn get_campaigns_in_range(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        list_name: Option<&str>,
    ) -> Result<Vec<Campaign>, AppError> {
        let windows = date_windows(start_date, end_date);
        tracing::info!(
            "Fetching sent campaigns {} to {} in {} page(s){}",
            start_date,
            end_date,
            windows.len(),
            list_name
                .map(|l| format!(" for list '{}'", l))
                .unwrap_or_default()
        );

        let mut campaigns = Vec::new();
        for window in &windows {
            let page = self.fetch_window(window, list_name).await?;
            campaigns.extend(page);
        }

        tracing::info!("Fetched {} campaigns", campaigns.len());
        Ok(campaigns)
    }

    async fn fetch_window(
        &self,
        window: &DateWindow,
        list_name: Option<&str>,
    ) -> Result<Vec<Campaign>, AppError> {
        let mut params = Map::new();
        params.insert("status".to_string(), json!("sent"));
        params.insert(
            "start_date".to_string(),
            json!(window.start.format(DATE_FORMAT).to_string()),
        );
        params.insert(
            "end_date".to_string(),
            json!(window.end.format(DATE_FORMAT).to_string()),
        );
        if let Some(list) = list_name {
            params.insert("list".to_string(), json!(list));
        }

        tracing::debug!(
            "Requesting blasts {} to {} ({} days)",
            window.start,
            window.end,
            window.days()
        );
        let response = raise_for_error(self.api.api_get("blast", params).await?)?;

        let blasts = match response.into_json() {
            Value::Object(mut body) => match body.remove("blasts") {
                Some(Value::Array(blasts)) => blasts,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };

        // Sailthru returns newest first; each page is flipped so the
        // concatenation stays ascending.
        Ok(blasts
            .into_iter()
            .rev()
            .map(|b| enrich_campaign(Campaign::from_value(b)))
            .collect())
    }

    /// Blast stats (opens, clicks, ...) for `blast_id`, with the optional
    /// sections selected by `options`. The payload is returned as Sailthru
    /// sent it.
    pub async fn get_campaign_stats(
        &self,
        blast_id: i64,
        options: StatsOptions,
    ) -> Result<Value, AppError> {
        tracing::debug!("Fetching stats for blast {}", blast_id);
        let response = raise_for_error(self.api.stats_blast(blast_id, options.to_flags()).await?)?;
        Ok(response.into_json())
    }

    /// Content (`content_html`, `content_text`) and send metadata for one
    /// blast.
    pub async fn get_campaign_data(&self, blast_id: i64) -> Result<Value, AppError> {
        let mut params = Map::new();
        params.insert("blast_id".to_string(), json!(blast_id));
        let response = raise_for_error(self.api.api_get("blast", params).await?)?;
        Ok(response.into_json())
    }

    /// User lookup whose body always has every key of [`user_defaults`].
    pub async fn get_user(
        &self,
        id: &str,
        options: Option<Map<String, Value>>,
    ) -> Result<ApiResponse, AppError> {
        let response = self.api.get_user(id, options).await?;
        normalized_response(response, &user_defaults())
    }
}

/// Error-checks `response` and merges its body with `defaults`.
///
/// An empty body is replaced by the defaults outright.
pub fn normalized_response(
    response: ApiResponse,
    defaults: &Map<String, Value>,
) -> Result<ApiResponse, AppError> {
    let mut response = raise_for_error(response)?;

    if is_truthy(response.json()) && !response.json().is_object() {
        tracing::warn!("Unexpected non-object response body, keeping it as-is");
    }
    let merged = merge_value(response.json(), &Value::Object(defaults.clone()));
    response.set_json(merged);

    Ok(response)
}
