//! Industry Dive classification of Sailthru campaigns.
//!
//! Sailthru has no notion of our newsletter types or publication brands, so
//! both are guessed from the labels, name, list and subject of each blast.
//! Every function here is total: missing or oddly typed fields degrade to
//! `DiveEmailType::Unknown` or no brand.

use crate::models::Campaign;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;

/// Standard email types we use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiveEmailType {
    #[serde(rename = "blast")]
    Blast,
    #[serde(rename = "welcome")]
    WelcomeSeries,
    #[serde(rename = "newsletter")]
    Newsletter,
    #[serde(rename = "weekender")]
    Weekender,
    #[serde(rename = "breaking")]
    BreakingNews,
    #[serde(rename = "unknown")]
    Unknown,
}

impl DiveEmailType {
    /// Wire tag stored in `dive_email_type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiveEmailType::Blast => "blast",
            DiveEmailType::WelcomeSeries => "welcome",
            DiveEmailType::Newsletter => "newsletter",
            DiveEmailType::Weekender => "weekender",
            DiveEmailType::BreakingNews => "breaking",
            DiveEmailType::Unknown => "unknown",
        }
    }

    /// Inverse of [`DiveEmailType::as_str`].
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "blast" => Some(DiveEmailType::Blast),
            "welcome" => Some(DiveEmailType::WelcomeSeries),
            "newsletter" => Some(DiveEmailType::Newsletter),
            "weekender" => Some(DiveEmailType::Weekender),
            "breaking" => Some(DiveEmailType::BreakingNews),
            "unknown" => Some(DiveEmailType::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for DiveEmailType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// List-name patterns for brand inference, compiled once and shared by every
/// campaign in a range query.
struct ListPatterns {
    blast_list_suffix: Regex,
    weekender_suffix: Regex,
    dive_section: Regex,
}

static LIST_PATTERNS: OnceLock<ListPatterns> = OnceLock::new();

fn list_patterns() -> &'static ListPatterns {
    LIST_PATTERNS.get_or_init(|| ListPatterns {
        blast_list_suffix: Regex::new(r"(?i) blast list$").unwrap(),
        weekender_suffix: Regex::new(r"(?i) weekender$").unwrap(),
        dive_section: Regex::new(r"^[A-Za-z]+ Dive: [a-zA-Z]+").unwrap(),
    })
}

/// Decodes subject bytes, replacing invalid UTF-8 sequences with U+FFFD.
///
/// Sailthru has been seen to hand back subjects in mixed encodings.
pub fn decode_subject(raw: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(raw)
}

/// Categorizes a campaign in terms we understand.
///
/// Rules are checked in priority order and the first match wins.
pub fn infer_email_type(campaign: &Campaign) -> DiveEmailType {
    let labels = campaign.labels();
    let name = campaign.name();
    let list = campaign.list();
    let subject = campaign.subject_text();
    let has_label = |label: &str| labels.iter().any(|l| *l == label);

    if has_label("Blast") || name.contains("-blast-") {
        return DiveEmailType::Blast;
    }
    if has_label("Welcome Series") {
        return DiveEmailType::WelcomeSeries;
    }
    if list.ends_with("Weekender") || name.starts_with("Newsletter Weekly Roundup") {
        return DiveEmailType::Weekender;
    }
    if has_label("newsletter") || name.starts_with("Issue: ") {
        return DiveEmailType::Newsletter;
    }
    // Case-insensitive, unlike the name check above.
    if list.to_lowercase().ends_with("blast list") {
        return DiveEmailType::Blast;
    }
    if decode_subject(subject.as_bytes()).starts_with("BREAKING") {
        return DiveEmailType::BreakingNews;
    }
    DiveEmailType::Unknown
}

/// Guesses the Dive publication brand (like "Healthcare Dive") from the list
/// a campaign was sent to.
pub fn infer_brand(campaign: &Campaign) -> Option<String> {
    let list = campaign.list();
    let lowered = list.to_lowercase();
    let patterns = list_patterns();

    if lowered.ends_with("blast list") {
        return Some(patterns.blast_list_suffix.replace(list, "").into_owned());
    }
    if lowered.ends_with("weekender") {
        return Some(patterns.weekender_suffix.replace(list, "").into_owned());
    }
    // " Dive" is case-sensitive here even though the checks above are not.
    if list.ends_with(" Dive") || patterns.dive_section.is_match(list) {
        return Some(list.to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn campaign(value: serde_json::Value) -> Campaign {
        Campaign::from_value(value)
    }

    #[test]
    fn test_blast_label_wins_over_everything() {
        let c = campaign(json!({
            "labels": ["Blast", "Welcome Series", "newsletter"],
            "name": "Issue: 42",
            "list": "Retail Dive Weekender",
            "subject": "BREAKING: news"
        }));
        assert_eq!(infer_email_type(&c), DiveEmailType::Blast);
    }

    #[test]
    fn test_blast_name_marker() {
        let c = campaign(json!({"name": "ABB Survey recruitment-blast-UD Solar-Aug6"}));
        assert_eq!(infer_email_type(&c), DiveEmailType::Blast);
    }

    #[test]
    fn test_welcome_series() {
        let c = campaign(json!({"labels": ["Welcome Series"], "list": "Waste Dive"}));
        assert_eq!(infer_email_type(&c), DiveEmailType::WelcomeSeries);
    }

    #[test]
    fn test_weekender_by_list_or_name() {
        let c = campaign(json!({"list": "Healthcare Dive Weekender"}));
        assert_eq!(infer_email_type(&c), DiveEmailType::Weekender);

        let c = campaign(json!({"name": "Newsletter Weekly Roundup 2015-08-08"}));
        assert_eq!(infer_email_type(&c), DiveEmailType::Weekender);

        // Case-sensitive on the list suffix.
        let c = campaign(json!({"list": "Healthcare Dive weekender"}));
        assert_eq!(infer_email_type(&c), DiveEmailType::Unknown);
    }

    #[test]
    fn test_weekender_beats_newsletter() {
        let c = campaign(json!({
            "labels": ["newsletter"],
            "list": "Utility Dive Weekender"
        }));
        assert_eq!(infer_email_type(&c), DiveEmailType::Weekender);
    }

    #[test]
    fn test_newsletter() {
        let c = campaign(json!({"labels": ["newsletter"]}));
        assert_eq!(infer_email_type(&c), DiveEmailType::Newsletter);

        let c = campaign(json!({"name": "Issue: 2015-08-06 Utility Dive"}));
        assert_eq!(infer_email_type(&c), DiveEmailType::Newsletter);

        let c = campaign(json!({"name": "Issue:missing space"}));
        assert_eq!(infer_email_type(&c), DiveEmailType::Unknown);
    }

    #[test]
    fn test_blast_list_is_case_insensitive() {
        let c = campaign(json!({"list": "FOO BLAST LIST"}));
        assert_eq!(infer_email_type(&c), DiveEmailType::Blast);
    }

    #[test]
    fn test_breaking_news() {
        let c = campaign(json!({"subject": "BREAKING: Merger announced"}));
        assert_eq!(infer_email_type(&c), DiveEmailType::BreakingNews);

        let c = campaign(json!({"subject": "Breaking: lowercase does not count"}));
        assert_eq!(infer_email_type(&c), DiveEmailType::Unknown);
    }

    #[test]
    fn test_unknown_for_empty_campaign() {
        let c = campaign(json!({}));
        assert_eq!(infer_email_type(&c), DiveEmailType::Unknown);
        assert_eq!(infer_brand(&c), None);
    }

    #[test]
    fn test_malformed_fields_degrade() {
        let c = campaign(json!({
            "labels": "Blast",
            "name": 12,
            "list": null,
            "subject": ["BREAKING"]
        }));
        assert_eq!(infer_email_type(&c), DiveEmailType::Unknown);
        assert_eq!(infer_brand(&c), None);
    }

    #[test]
    fn test_brand_from_blast_list() {
        let c = campaign(json!({"list": "Utility Dive: Solar blast list"}));
        assert_eq!(infer_brand(&c).as_deref(), Some("Utility Dive: Solar"));

        let c = campaign(json!({"list": "Retail Dive Blast List"}));
        assert_eq!(infer_brand(&c).as_deref(), Some("Retail Dive"));

        let c = campaign(json!({"list": "FOO BLAST LIST"}));
        assert_eq!(infer_brand(&c).as_deref(), Some("FOO"));
    }

    #[test]
    fn test_brand_without_separating_space_is_unchanged() {
        let c = campaign(json!({"list": "Supply Chain Diveblast list"}));
        assert_eq!(
            infer_brand(&c).as_deref(),
            Some("Supply Chain Diveblast list")
        );
    }

    #[test]
    fn test_brand_from_weekender() {
        let c = campaign(json!({"list": "Healthcare Dive Weekender"}));
        assert_eq!(infer_brand(&c).as_deref(), Some("Healthcare Dive"));

        let c = campaign(json!({"list": "Healthcare Dive weekender"}));
        assert_eq!(infer_brand(&c).as_deref(), Some("Healthcare Dive"));
    }

    #[test]
    fn test_brand_from_dive_list() {
        let c = campaign(json!({"list": "Education Dive"}));
        assert_eq!(infer_brand(&c).as_deref(), Some("Education Dive"));

        let c = campaign(json!({"list": "Education Dive: Higher Ed"}));
        assert_eq!(infer_brand(&c).as_deref(), Some("Education Dive: Higher Ed"));

        // " Dive" suffix is case-sensitive.
        assert_eq!(infer_brand(&campaign(json!({"list": "Education dive"}))), None);
        assert_eq!(infer_brand(&campaign(json!({"list": "Marketing list"}))), None);
    }

    #[test]
    fn test_brand_independent_of_type() {
        let c = campaign(json!({
            "labels": [],
            "name": "Monthly promo",
            "list": "Waste Dive",
            "subject": "Hello"
        }));
        assert_eq!(infer_email_type(&c), DiveEmailType::Unknown);
        assert_eq!(infer_brand(&c).as_deref(), Some("Waste Dive"));
    }

    #[test]
    fn test_decode_subject_replaces_invalid_bytes() {
        let raw = b"BREAKING \xff news";
        assert_eq!(decode_subject(raw), "BREAKING \u{FFFD} news");
    }

    #[test]
    fn test_tags_round_trip() {
        for t in [
            DiveEmailType::Blast,
            DiveEmailType::WelcomeSeries,
            DiveEmailType::Newsletter,
            DiveEmailType::Weekender,
            DiveEmailType::BreakingNews,
            DiveEmailType::Unknown,
        ] {
            assert_eq!(DiveEmailType::from_tag(t.as_str()), Some(t));
            assert_eq!(serde_json::to_value(t).unwrap(), json!(t.as_str()));
        }
    }
}
