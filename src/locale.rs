//! Static per-country locale profiles and locality-to-country resolution.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Static per-country configuration: known cities, phone-number patterns,
/// site bias and search-engine region code. Loaded once, never mutated.
#[derive(Debug)]
pub(crate) struct LocaleProfile {
    /// Country code used as identity ("egypt", "saudi", ...).
    pub code: &'static str,
    /// Display name in Arabic, used in country-level fallback queries.
    pub name: &'static str,
    /// Known city names, checked for containment in either direction.
    pub cities: &'static [&'static str],
    /// Country-specific phone patterns, applied before the catch-all set.
    pub phone_patterns: Vec<Regex>,
    /// Boolean phone-prefix disjunction interpolated into search queries.
    pub query_phone_patterns: &'static str,
    /// Preferred site-scope expression for this market.
    pub sites: &'static str,
    /// Search-engine region code (Serper `gl`).
    pub gl: &'static str,
    /// Second-pass keyword heuristics when no city matches.
    keywords: &'static [&'static str],
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("static phone pattern must compile"))
        .collect()
}

/// Supported countries, in insertion order. The first entry is the
/// deterministic default when resolution finds nothing.
pub(crate) static LOCALES: Lazy<Vec<LocaleProfile>> = Lazy::new(|| {
    vec![
        LocaleProfile {
            code: "egypt",
            name: "مصر",
            cities: &[
                "القاهرة",
                "الإسكندرية",
                "الجيزة",
                "المنصورة",
                "طنطا",
                "أسوان",
                "الأقصر",
                "شرم الشيخ",
            ],
            phone_patterns: compile(&[
                r"(?:\+?2)?01[0125]\d{8}",
                r"01[0125]\d{8}",
                r"01[0125][-\s]?\d{4}[-\s]?\d{4}",
                r"\+20\s?1[0125]\d{8}",
            ]),
            query_phone_patterns: r#"("010" OR "011" OR "012" OR "015")"#,
            sites: "site:olx.com.eg OR site:facebook.com OR site:instagram.com",
            gl: "eg",
            keywords: &["مصر", "القاهرة", "الاسكندرية"],
        },
        LocaleProfile {
            code: "saudi",
            name: "السعودية",
            cities: &[
                "الرياض",
                "جدة",
                "مكة",
                "المدينة",
                "الدمام",
                "الخبر",
                "الطائف",
                "تبوك",
                "أبها",
            ],
            phone_patterns: compile(&[
                r"(?:\+?966)?0?5[0-9]\d{7}",
                r"05[0-9]\d{7}",
                r"05[0-9][-\s]?\d{3}[-\s]?\d{4}",
                r"\+966\s?5[0-9]\d{7}",
                r"9665[0-9]\d{7}",
            ]),
            query_phone_patterns: r#"("05" OR "9665" OR "966")"#,
            sites: "site:opensooq.com OR site:facebook.com OR site:instagram.com OR site:linkedin.com/in",
            gl: "sa",
            keywords: &["الرياض", "جدة", "مكة", "السعودية"],
        },
        LocaleProfile {
            code: "uae",
            name: "الإمارات",
            cities: &["دبي", "أبوظبي", "الشارقة", "عجمان", "العين", "رأس الخيمة"],
            phone_patterns: compile(&[
                r"(?:\+?971)?0?5[0-9]\d{7}",
                r"05[0-9]\d{7}",
                r"\+971\s?5[0-9]\d{7}",
                r"9715[0-9]\d{7}",
            ]),
            query_phone_patterns: r#"("050" OR "055" OR "056" OR "9714")"#,
            sites: "site:dubizzle.com OR site:facebook.com OR site:instagram.com OR site:linkedin.com/in",
            gl: "ae",
            keywords: &["دبي", "أبوظبي", "الشارقة", "الإمارات"],
        },
        LocaleProfile {
            code: "kuwait",
            name: "الكويت",
            cities: &["الكويت", "حولي", "الفروانية", "الأحمدي", "الجهراء"],
            phone_patterns: compile(&[
                r"(?:\+?965)?[569]\d{7}",
                r"[569]\d{7}",
                r"\+965\s?[569]\d{7}",
            ]),
            query_phone_patterns: r#"("965" OR "9" OR "5" OR "6")"#,
            sites: "site:opensooq.com OR site:facebook.com OR site:instagram.com",
            gl: "kw",
            keywords: &["الكويت", "حولي"],
        },
    ]
});

/// Catch-all phone patterns applied after the country-specific set, so a
/// lead carrying a foreign-format number is still captured.
pub(crate) static CATCH_ALL_PHONE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?:\+?2)?01[0125]\d{8}",
        r"01[0125]\d{8}",
        r"(?:\+?966)?0?5[0-9]\d{7}",
        r"05[0-9]\d{7}",
        r"(?:\+?971)?0?5[0-9]\d{7}",
        r"(?:\+?965)?[569]\d{7}",
    ])
});

/// The configured default country when nothing matches.
pub(crate) fn default_locale() -> &'static LocaleProfile {
    &LOCALES[0]
}

/// Looks up a profile by its country code.
pub(crate) fn by_code(code: &str) -> Option<&'static LocaleProfile> {
    LOCALES.iter().find(|l| l.code == code)
}

/// Maps a free-text locality to a locale profile. Never fails.
///
/// An explicit, known country override wins. Otherwise each profile's city
/// list is scanned for containment in either direction in table order, then
/// a small keyword heuristic pass runs, then the default applies.
pub(crate) fn resolve(locality: &str, explicit: Option<&str>) -> &'static LocaleProfile {
    if let Some(code) = explicit {
        if let Some(profile) = by_code(code) {
            return profile;
        }
        tracing::warn!(
            "Unknown explicit country '{}', falling back to locality resolution",
            code
        );
    }

    let locality = locality.trim();

    for profile in LOCALES.iter() {
        for city in profile.cities {
            if locality.contains(city) || city.contains(locality) {
                return profile;
            }
        }
    }

    for profile in LOCALES.iter() {
        if profile.keywords.iter().any(|kw| locality.contains(kw)) {
            return profile;
        }
    }

    default_locale()
}

/// Client-safe country listing entry for the API surface.
#[derive(Serialize, Debug)]
pub(crate) struct CountryInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub cities: &'static [&'static str],
}

pub(crate) fn available_countries() -> Vec<CountryInfo> {
    LOCALES
        .iter()
        .map(|l| CountryInfo {
            id: l.code,
            name: l.name,
            cities: l.cities,
        })
        .collect()
}
