use crate::classifier::DiveEmailType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

// ============ Campaign Models ============

/// Metadata for one sent campaign ("blast" in Sailthru language).
///
/// The payload shape belongs to Sailthru, so the record keeps every field it
/// was given and only offers typed accessors for the fields we classify on.
/// Accessors never fail: a missing or wrongly typed field reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Campaign(Map<String, Value>);

impl Campaign {
    /// Wraps any JSON value. Non-objects become an empty record.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn blast_id(&self) -> Option<i64> {
        self.0.get("blast_id").and_then(Value::as_i64)
    }

    /// String labels attached in Sailthru. Non-string entries are skipped.
    pub fn labels(&self) -> Vec<&str> {
        self.0
            .get("labels")
            .and_then(Value::as_array)
            .map(|labels| labels.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.str_field("name")
    }

    /// Name of the list the campaign was sent to.
    pub fn list(&self) -> &str {
        self.str_field("list")
    }

    /// Subject line as text. Non-string subjects are rendered as JSON.
    pub fn subject_text(&self) -> String {
        match self.0.get("subject") {
            Some(Value::String(s)) => s.clone(),
            None | Some(Value::Null) => String::new(),
            Some(other) => other.to_string(),
        }
    }

    pub fn start_time(&self) -> Option<&str> {
        self.0.get("start_time").and_then(Value::as_str)
    }

    /// `dive_email_type`, once the campaign has been classified.
    pub fn email_type(&self) -> Option<DiveEmailType> {
        self.0
            .get("dive_email_type")
            .and_then(Value::as_str)
            .and_then(DiveEmailType::from_tag)
    }

    /// `dive_brand`, once the campaign has been classified.
    pub fn brand(&self) -> Option<&str> {
        self.0.get("dive_brand").and_then(Value::as_str)
    }

    pub fn set_email_type(&mut self, email_type: DiveEmailType) {
        self.0
            .insert("dive_email_type".to_string(), json!(email_type.as_str()));
    }

    pub fn set_brand(&mut self, brand: Option<String>) {
        self.0.insert("dive_brand".to_string(), json!(brand));
    }

    pub fn set_subject(&mut self, subject: String) {
        self.0.insert("subject".to_string(), Value::String(subject));
    }

    fn str_field(&self, key: &str) -> &str {
        self.0.get(key).and_then(Value::as_str).unwrap_or("")
    }
}

// ============ Query Models ============

/// One page of a campaign range query: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Optional sections of a blast stats report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsOptions {
    pub include_clickmap: bool,
    pub include_subject: bool,
    pub include_click_times: bool,
    pub include_urls: bool,
    pub include_device: bool,
}

impl StatsOptions {
    /// Sailthru option flags for the enabled sections only.
    pub fn to_flags(&self) -> Map<String, Value> {
        let mut flags = Map::new();
        let toggles = [
            ("clickmap", self.include_clickmap),
            ("click_times", self.include_click_times),
            ("device", self.include_device),
            ("subject", self.include_subject),
            ("urls", self.include_urls),
        ];
        for (flag, enabled) in toggles {
            if enabled {
                flags.insert(flag.to_string(), json!("1"));
            }
        }
        flags
    }
}

// ============ Default Shapes ============

/// Expected shape of a `user` API response.
pub fn user_defaults() -> Map<String, Value> {
    match json!({
        "keys": {
            "sid": "",
            "cookie": "",
            "email": ""
        },
        "activity": "",
        "vars": {},
        "lists": {},
        "engagement": "",
        "optout_email": ""
    }) {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
