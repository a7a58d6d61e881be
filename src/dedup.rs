//! Phone/email normalization and duplicate filtering across a hunt run.

use crate::models::CandidateLead;
use std::collections::HashSet;

/// Normalizes a phone number for comparison: strips separators, then the
/// legacy Egyptian international prefixes, then any remaining plus sign.
pub(crate) fn normalize_phone(phone: &str) -> String {
    let stripped: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();

    if let Some(rest) = stripped.strip_prefix("+2") {
        // "+2" followed by a mobile prefix, not a "+20..." country form.
        if rest.starts_with("01") {
            return rest.to_string();
        }
    }
    if let Some(rest) = stripped.strip_prefix("002") {
        return rest.to_string();
    }
    stripped
        .strip_prefix('+')
        .map(str::to_string)
        .unwrap_or(stripped)
}

/// Detects the country a phone number belongs to from its prefix.
pub(crate) fn detect_phone_country(phone: &str) -> &'static str {
    let clean: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '+'))
        .collect();

    if clean.starts_with("20") || clean.starts_with("01") {
        "egypt"
    } else if clean.starts_with("966") || clean.starts_with("05") {
        "saudi"
    } else if clean.starts_with("971") {
        "uae"
    } else if clean.starts_with("965") {
        "kuwait"
    } else {
        "unknown"
    }
}

/// Accepted contact signals for one hunt run, seeded from the externally
/// supplied existing contacts and grown monotonically as tiers complete.
#[derive(Debug, Default)]
pub(crate) struct DedupState {
    phones: HashSet<String>,
    emails: HashSet<String>,
}

impl DedupState {
    pub(crate) fn seeded(
        existing_phones: impl IntoIterator<Item = String>,
        existing_emails: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            phones: existing_phones
                .into_iter()
                .map(|p| normalize_phone(&p))
                .collect(),
            emails: existing_emails
                .into_iter()
                .map(|e| e.trim().to_lowercase())
                .collect(),
        }
    }

    /// Filters one batch of candidates against everything accepted so far.
    ///
    /// A candidate with a phone is kept only if its normalized phone is
    /// unseen; a phone-less candidate with an email follows the same rule
    /// on its lowercased email; a candidate with neither is dropped.
    pub(crate) fn filter(&mut self, candidates: Vec<CandidateLead>) -> Vec<CandidateLead> {
        let total = candidates.len();
        let mut unique = Vec::new();

        for mut lead in candidates {
            if !lead.phone.is_empty() {
                lead.phone = normalize_phone(&lead.phone);
            }
            lead.email = lead.email.trim().to_lowercase();

            if !lead.phone.is_empty() {
                if !self.phones.insert(lead.phone.clone()) {
                    tracing::debug!(target: "dedup", "Duplicate phone skipped: {}", lead.phone);
                    continue;
                }
            } else if !lead.email.is_empty() {
                if !self.emails.insert(lead.email.clone()) {
                    tracing::debug!(target: "dedup", "Duplicate email skipped: {}", lead.email);
                    continue;
                }
            }

            unique.push(lead);
        }

        tracing::debug!(target: "dedup", "Filtered: {} -> {} unique leads", total, unique.len());
        unique
    }
}
