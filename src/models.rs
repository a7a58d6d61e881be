//! Defines the core data structures used in the lead-sleuth application.

use serde::{Deserialize, Serialize};

/// Smallest number of leads a single hunt may request.
pub(crate) const MIN_LEAD_COUNT: usize = 5;
/// Largest number of leads a single hunt may request.
pub(crate) const MAX_LEAD_COUNT: usize = 50;

/// A named channel focus that biases site scoping and seed keywords.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub(crate) enum Strategy {
    #[default]
    SocialMedia,
    LocalPlatforms,
    Events,
    ContactPages,
    CompetitorMonitor,
}

impl Strategy {
    /// Stable string code used in query synthesis logs and API payloads.
    pub(crate) fn code(&self) -> &'static str {
        match self {
            Strategy::SocialMedia => "social_media",
            Strategy::LocalPlatforms => "local_platforms",
            Strategy::Events => "events",
            Strategy::ContactPages => "contact_pages",
            Strategy::CompetitorMonitor => "competitor_monitor",
        }
    }
}

/// Which contact signal a candidate lead was extracted with.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum LeadType {
    WithPhone,
    WithEmail,
    Potential,
}

/// One hunt invocation as supplied by the caller (CLI flag set, batch file
/// entry, or API request body).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct HuntRequest {
    /// Free-text business/service description ("أنا دكتور أسنان", ...).
    pub description: String,
    /// Target locality (city or area name).
    pub locality: String,
    /// Requested number of leads, clamped into `MIN_LEAD_COUNT..=MAX_LEAD_COUNT`.
    #[serde(default = "default_count")]
    pub count: usize,
    /// Hunting channel strategy.
    #[serde(default)]
    pub strategy: Strategy,
    /// Explicit country override (country code); resolved from locality if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Whether contact-less results showing customer intent are kept.
    #[serde(default = "default_true")]
    pub include_potential: bool,
}

fn default_count() -> usize {
    20
}

fn default_true() -> bool {
    true
}

impl HuntRequest {
    pub(crate) fn new(description: impl Into<String>, locality: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            locality: locality.into(),
            count: default_count(),
            strategy: Strategy::default(),
            country: None,
            include_potential: true,
        }
    }

    /// Clamps the requested count into the supported range before the
    /// request enters the pipeline.
    pub(crate) fn clamp_count(&mut self) {
        self.count = self.count.clamp(MIN_LEAD_COUNT, MAX_LEAD_COUNT);
    }
}

/// Raw title/snippet/URL triple as returned by a search backend.
/// Transient: produced by the provider, consumed immediately by extraction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawSearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
    /// Name of the backend that produced this result.
    pub source: String,
}

/// A candidate lead extracted from search results.
///
/// All fields are always present (empty string for absent signals); the
/// `lead_type` discriminant says which contact signal was found.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct CandidateLead {
    /// Display name derived from the result title.
    pub name: String,
    /// Normalized phone digits, possibly empty.
    pub phone: String,
    /// Lowercased email address, possibly empty.
    pub email: String,
    /// URL of the page the lead was extracted from.
    pub source: String,
    /// Truncated snippet kept as context for the sales follow-up.
    pub notes: String,
    /// Always "new" at creation; later transitions belong to the caller.
    pub status: String,
    /// Country detected from the phone prefix, or the search country.
    pub country: String,
    pub lead_type: LeadType,
}

/// Outcome of a full hunt execution, used for batch output and API replies.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct HuntReport {
    #[serde(flatten)]
    pub request: HuntRequest,
    /// Country code the locality resolved to.
    pub resolved_country: String,
    pub leads: Vec<CandidateLead>,
    pub lead_count: usize,
    /// Total search queries issued across all tiers.
    pub queries_issued: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_clamped_into_range() {
        let mut req = HuntRequest::new("سباك", "القاهرة");
        req.count = 3;
        req.clamp_count();
        assert_eq!(req.count, MIN_LEAD_COUNT);

        req.count = 500;
        req.clamp_count();
        assert_eq!(req.count, MAX_LEAD_COUNT);

        req.count = 20;
        req.clamp_count();
        assert_eq!(req.count, 20);
    }

    #[test]
    fn test_request_defaults_from_json() {
        let req: HuntRequest =
            serde_json::from_str(r#"{"description":"محامي","locality":"جدة"}"#).unwrap();
        assert_eq!(req.count, 20);
        assert_eq!(req.strategy, Strategy::SocialMedia);
        assert!(req.include_potential);
        assert!(req.country.is_none());
    }

    #[test]
    fn test_lead_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&LeadType::WithPhone).unwrap(),
            "\"with_phone\""
        );
        assert_eq!(
            serde_json::to_string(&Strategy::LocalPlatforms).unwrap(),
            "\"local_platforms\""
        );
    }
}
