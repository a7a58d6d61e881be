//! Converts raw search results into candidate leads: per-locale phone
//! matching, generic email matching and customer-intent detection.

use crate::config::CONFIG;
use crate::dedup;
use crate::locale::{CATCH_ALL_PHONE_PATTERNS, LocaleProfile};
use crate::models::{CandidateLead, LeadType, RawSearchResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Fixed phrases expressing demand for a service rather than an offer of
/// one. A contact-less result containing any of them is still worth keeping.
const CUSTOMER_INTENT_KEYWORDS: &[&str] = &[
    "محتاج",
    "عايز",
    "ابحث عن",
    "مين يعرف",
    "دلوني على",
    "يا ريت حد",
    "حد يرشحلي",
    "حد يعرف",
    "تجربتكم مع",
    "حد جرب",
];

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
        .expect("static email pattern must compile")
});

/// Trailing separator-delimited suffix of a result title ("... - فيسبوك").
static NAME_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*[-|–].*").expect("static name suffix pattern must compile"));

const NAME_MAX_CHARS: usize = 60;
const NOTES_MAX_CHARS: usize = 300;
const DEFAULT_LEAD_NAME: &str = "عميل محتمل";

/// True if the text blob contains any customer-intent phrase.
pub(crate) fn has_customer_intent(text: &str) -> bool {
    CUSTOMER_INTENT_KEYWORDS.iter().any(|kw| text.contains(kw))
}

fn clean_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

fn display_name(title: &str) -> String {
    let stripped = NAME_SUFFIX_RE.replace(title, "");
    let name: String = stripped.trim().chars().take(NAME_MAX_CHARS).collect();
    if name.is_empty() {
        DEFAULT_LEAD_NAME.to_string()
    } else {
        name
    }
}

/// Extracts candidate leads from one batch of raw results.
///
/// Pure apart from `seen_urls`, which the orchestrator threads through the
/// whole run so a contact-less URL contributes at most one potential lead.
/// Phone dedup within the call is by construction: the first unseen
/// normalized phone wins, later duplicates in the same batch are dropped.
pub(crate) fn extract_leads(
    results: &[RawSearchResult],
    locale: &LocaleProfile,
    include_potential: bool,
    seen_urls: &mut HashSet<String>,
) -> Vec<CandidateLead> {
    let mut leads = Vec::new();
    let mut seen_phones: HashSet<String> = HashSet::new();

    for result in results {
        let text = format!("{} {}", result.title, result.snippet);
        let url = &result.link;

        let mut phones: Vec<String> = Vec::new();
        for pattern in locale
            .phone_patterns
            .iter()
            .chain(CATCH_ALL_PHONE_PATTERNS.iter())
        {
            for m in pattern.find_iter(&text) {
                let phone = clean_phone(m.as_str());
                if phone.len() >= CONFIG.min_phone_digits && !seen_phones.contains(&phone) {
                    seen_phones.insert(phone.clone());
                    phones.push(phone);
                }
            }
        }

        let email = EMAIL_RE
            .find(&text)
            .map(|m| m.as_str().to_lowercase())
            .unwrap_or_default();

        let has_intent = has_customer_intent(&text);

        let should_include = !phones.is_empty()
            || !email.is_empty()
            || (include_potential && has_intent && !seen_urls.contains(url));

        if !should_include {
            continue;
        }

        let phone = phones.first().cloned().unwrap_or_default();
        let country = if phone.is_empty() {
            locale.code.to_string()
        } else {
            dedup::detect_phone_country(&phone).to_string()
        };

        let lead_type = if !phone.is_empty() {
            LeadType::WithPhone
        } else if !email.is_empty() {
            LeadType::WithEmail
        } else {
            LeadType::Potential
        };

        leads.push(CandidateLead {
            name: display_name(&result.title),
            phone,
            email,
            source: url.clone(),
            notes: result.snippet.chars().take(NOTES_MAX_CHARS).collect(),
            status: "new".to_string(),
            country,
            lead_type,
        });
        seen_urls.insert(url.clone());
    }

    tracing::debug!(
        target: "extract",
        "Extracted {} leads from {} results",
        leads.len(),
        results.len()
    );
    leads
}
