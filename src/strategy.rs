//! Static hunting-strategy profiles (channel focus for query synthesis).

use crate::models::Strategy;
use serde::Serialize;

/// Immutable per-strategy configuration: human label, site-scope expression
/// and seed keywords biasing the synthesized queries.
#[derive(Debug)]
pub(crate) struct StrategyProfile {
    pub code: Strategy,
    /// Display label in Arabic.
    pub name: &'static str,
    /// Client-safe one-line description.
    pub description: &'static str,
    /// Site-scope expression placed at the front of the golden query.
    pub sites: &'static str,
    /// Seed keywords characteristic of this channel.
    pub keywords: &'static [&'static str],
}

static STRATEGIES: &[StrategyProfile] = &[
    StrategyProfile {
        code: Strategy::SocialMedia,
        name: "سوشيال ميديا",
        description: "البحث في فيسبوك وإنستجرام وتويتر ولينكدإن",
        sites: "(site:facebook.com OR site:instagram.com OR site:twitter.com OR site:linkedin.com/in)",
        keywords: &["محتاج", "عايز", "ابحث عن", "مين يعرف", "دلوني على"],
    },
    StrategyProfile {
        code: Strategy::LocalPlatforms,
        name: "منصات محلية",
        description: "البحث في OLX وOpenSooq وDubizzle",
        sites: "(site:olx.com.eg OR site:opensooq.com OR site:dubizzle.com)",
        keywords: &["للتواصل", "اتصل", "واتساب", "رقم"],
    },
    StrategyProfile {
        code: Strategy::Events,
        name: "مناسبات وأحداث",
        description: "البحث عن أرقام من التهاني والمناسبات",
        sites: "(site:facebook.com OR site:instagram.com)",
        keywords: &["تهاني", "تهنئة", "مبروك", "الف مبروك", "عقبال"],
    },
    StrategyProfile {
        code: Strategy::ContactPages,
        name: "صفحات التواصل",
        description: "البحث في صفحات اتصل بنا",
        sites: r#"("contact us" OR "اتصل بنا" OR "تواصل معنا")"#,
        keywords: &["هاتف", "موبايل", "واتس", "للاستفسار"],
    },
    StrategyProfile {
        code: Strategy::CompetitorMonitor,
        name: "مراقبة المنافسين",
        description: "مراقبة تعليقات وآراء العملاء",
        sites: "(site:facebook.com OR site:instagram.com)",
        keywords: &["تعليق", "رأيكم", "تجربتكم", "حد جرب"],
    },
];

/// Looks up the profile for a strategy. Total over the enum, so no default
/// branch is needed.
pub(crate) fn profile(strategy: Strategy) -> &'static StrategyProfile {
    STRATEGIES
        .iter()
        .find(|s| s.code == strategy)
        .unwrap_or(&STRATEGIES[0])
}

/// Client-safe strategy listing entry for the API surface.
#[derive(Serialize, Debug)]
pub(crate) struct StrategyInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub(crate) fn available_strategies() -> Vec<StrategyInfo> {
    STRATEGIES
        .iter()
        .map(|s| StrategyInfo {
            id: s.code.code(),
            name: s.name,
            description: s.description,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_strategy_has_a_profile() {
        for strategy in [
            Strategy::SocialMedia,
            Strategy::LocalPlatforms,
            Strategy::Events,
            Strategy::ContactPages,
            Strategy::CompetitorMonitor,
        ] {
            let p = profile(strategy);
            assert_eq!(p.code, strategy);
            assert!(!p.sites.is_empty());
            assert!(!p.keywords.is_empty());
        }
    }

    #[test]
    fn test_listing_is_complete() {
        let listing = available_strategies();
        assert_eq!(listing.len(), 5);
        assert!(listing.iter().any(|s| s.id == "social_media"));
        assert!(listing.iter().any(|s| s.id == "competitor_monitor"));
    }
}
