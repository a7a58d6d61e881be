//! Synthesizes search queries: the golden query plus the tiered fallback
//! variants, each tier strictly broader in constraints than the last.

use crate::config::CONFIG;
use crate::locale::LocaleProfile;
use crate::models::Strategy;
use crate::strategy;

/// Leading self-identification prefixes stripped off the business
/// description. First match wins; unmatched text passes through unchanged.
const SERVICE_PREFIXES: &[&str] = &["أنا ", "انا ", "أعمل كـ ", "اعمل ك", "عندي ", "لدي "];

/// Fixed exclusion clause appended to the golden query: job postings,
/// company listings and a known noise domain.
const EXCLUSIONS: &str = "-site:youtube.com -\"وظيفة\" -\"مطلوب\" -\"شركة\"";

/// Derives the bare service/profession from the user's description.
pub(crate) fn extract_service(description: &str) -> String {
    for prefix in SERVICE_PREFIXES {
        if let Some(rest) = description.strip_prefix(prefix) {
            return rest.trim().to_string();
        }
    }
    description.trim().to_string()
}

/// Customer-intent phrase templates interpolating the service, ordered by
/// how strongly they signal demand. The golden query uses the first
/// `golden_intent_phrases` of these.
pub(crate) fn intent_phrases(service: &str) -> Vec<String> {
    vec![
        format!("محتاج {}", service),
        format!("عايز {}", service),
        format!("مين يعرف {}", service),
        format!("دلوني على {}", service),
        format!("ابحث عن {}", service),
        format!("يا ريت حد يرشحلي {}", service),
        format!("حد يعرف {} كويس", service),
    ]
}

/// Builds the single most tightly scoped query, issued first.
///
/// Assembled from the strategy's site scope, a disjunction of the top
/// intent phrases, an exact-phrase locality, the country's phone-prefix
/// disjunction and the fixed exclusion clause. Never fails: degenerate
/// input falls back to [`minimal_query`].
pub(crate) fn golden_query(
    description: &str,
    city: &str,
    strat: Strategy,
    locale: &LocaleProfile,
) -> String {
    let service = extract_service(description);
    if service.is_empty() || city.trim().is_empty() {
        return minimal_query(&service, city, locale);
    }

    let profile = strategy::profile(strat);
    let phrases = intent_phrases(&service);
    let keywords = phrases
        .iter()
        .take(CONFIG.golden_intent_phrases)
        .map(|kw| format!("\"{}\"", kw))
        .collect::<Vec<_>>()
        .join(" OR ");

    let query = format!(
        "{} ({}) \"{}\" {} {}",
        profile.sites, keywords, city, locale.query_phone_patterns, EXCLUSIONS
    );
    tracing::debug!(target: "query_synth", "Golden query ({}/{}): {}", locale.code, strat.code(), query);
    query
}

/// Minimal deterministic fallback query used when golden-query assembly
/// has nothing to work with.
pub(crate) fn minimal_query(service: &str, city: &str, locale: &LocaleProfile) -> String {
    format!(
        "site:facebook.com \"{}\" \"{}\" {}",
        service.trim(),
        city.trim(),
        locale.query_phone_patterns
    )
}

/// Tier 2: site-scoped, phone-biased variants per channel. Fixed list,
/// tried in order, each gated on the quota.
pub(crate) fn phone_heavy_queries(
    description: &str,
    city: &str,
    locale: &LocaleProfile,
) -> Vec<String> {
    let s = extract_service(description);
    let pp = locale.query_phone_patterns;
    vec![
        format!("site:facebook.com (\"محتاج {s}\" OR \"عايز {s}\") \"{city}\" {pp}"),
        format!("site:facebook.com (\"مين يعرف {s}\" OR \"دلوني على {s}\") \"{city}\" {pp}"),
        format!("site:instagram.com (\"محتاج {s}\" OR \"ابحث عن {s}\") {city} {pp}"),
        format!("\"يا ريت حد يرشحلي {s}\" OR \"حد يعرف {s} كويس\" {city}"),
        format!("\"{city}\" (\"محتاج {s} ضروري\" OR \"عايز {s} كويس\") {pp}"),
        format!("\"حد جرب {s}\" OR \"تجربتكم مع {s}\" {city} {pp}"),
    ]
}

/// Tier 3: broader variants with looser site scoping; the locality keeps
/// its exact-phrase form only where the channel demands it.
pub(crate) fn fallback_queries(
    description: &str,
    city: &str,
    locale: &LocaleProfile,
) -> Vec<String> {
    let s = extract_service(description);
    let pp = locale.query_phone_patterns;
    vec![
        format!(
            "site:facebook.com (\"محتاج {s}\" OR \"عايز {s}\" OR \"مين يعرف {s}\") \"{city}\" {pp}"
        ),
        format!("site:facebook.com (\"دلوني على {s}\" OR \"يا ريت حد يرشحلي {s}\") \"{city}\""),
        format!("site:instagram.com (\"محتاج {s}\" OR \"ابحث عن {s}\") {city} {pp}"),
        format!("\"حد جرب {s}\" OR \"تجربتكم مع {s}\" {city} {pp}"),
        format!("(\"محتاج {s} ضروري\" OR \"عايز {s} كويس\") {city}"),
    ]
}

/// Tier 4: country-level variants dropping the locality constraint
/// entirely. Last resort before the hunt gives up.
pub(crate) fn generic_queries(
    description: &str,
    city: &str,
    locale: &LocaleProfile,
) -> Vec<String> {
    let s = extract_service(description);
    let pp = locale.query_phone_patterns;
    let country = locale.name;
    vec![
        format!("\"محتاج {s}\" {country} {pp}"),
        format!("\"عايز {s}\" {city} {pp}"),
        format!("\"مين يعرف {s} كويس\" {city}"),
        format!("\"ابحث عن {s}\" {city} {pp}"),
        format!("\"حد يرشحلي {s}\" {country}"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale;

    #[test]
    fn test_extract_service_strips_prefixes() {
        assert_eq!(extract_service("أنا دكتور أسنان"), "دكتور أسنان");
        assert_eq!(extract_service("انا محامي"), "محامي");
        assert_eq!(extract_service("عندي مطعم"), "مطعم");
        assert_eq!(extract_service("لدي شركة نقل"), "شركة نقل");
    }

    #[test]
    fn test_extract_service_passthrough_without_prefix() {
        assert_eq!(extract_service("سمسار عقارات"), "سمسار عقارات");
        assert_eq!(extract_service("  مدرس خصوصي  "), "مدرس خصوصي");
    }

    #[test]
    fn test_golden_query_structure() {
        let saudi = locale::by_code("saudi").unwrap();
        let q = golden_query("طبيب أسنان", "الرياض", Strategy::SocialMedia, saudi);

        // Strategy site scope, exact-phrase city, phone disjunction, exclusions.
        assert!(q.starts_with("(site:facebook.com"));
        assert!(q.contains("\"الرياض\""));
        assert!(q.contains(saudi.query_phone_patterns));
        assert!(q.contains("-site:youtube.com"));
        assert!(q.contains("-\"وظيفة\""));
        // Interpolated intent phrases.
        assert!(q.contains("\"محتاج طبيب أسنان\""));
        assert!(q.contains("\"دلوني على طبيب أسنان\""));
    }

    #[test]
    fn test_golden_query_respects_strategy_scope() {
        let egypt = locale::default_locale();
        let q = golden_query("سباك", "القاهرة", Strategy::LocalPlatforms, egypt);
        assert!(q.contains("site:olx.com.eg"));
        assert!(q.contains("site:opensooq.com"));
    }

    #[test]
    fn test_golden_query_degenerate_input_uses_minimal_form() {
        let egypt = locale::default_locale();
        let q = golden_query("", "القاهرة", Strategy::SocialMedia, egypt);
        assert_eq!(q, minimal_query("", "القاهرة", egypt));
        assert!(q.starts_with("site:facebook.com"));
    }

    #[test]
    fn test_tier_lists_have_fixed_lengths() {
        let egypt = locale::default_locale();
        assert_eq!(phone_heavy_queries("سباك", "الجيزة", egypt).len(), 6);
        assert_eq!(fallback_queries("سباك", "الجيزة", egypt).len(), 5);
        assert_eq!(generic_queries("سباك", "الجيزة", egypt).len(), 5);
    }

    #[test]
    fn test_generic_tier_drops_locality_for_country() {
        let kuwait = locale::by_code("kuwait").unwrap();
        let queries = generic_queries("كهربائي", "حولي", kuwait);
        assert!(queries[0].contains("الكويت"));
        assert!(!queries[0].contains("حولي"));
        assert!(queries[4].contains("الكويت"));
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let egypt = locale::default_locale();
        let a = golden_query("أنا محامي", "طنطا", Strategy::Events, egypt);
        let b = golden_query("أنا محامي", "طنطا", Strategy::Events, egypt);
        assert_eq!(a, b);
    }
}
