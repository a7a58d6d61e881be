//! Core cascade logic: drives a hunt through successive query tiers until
//! the quota is met or every tier is exhausted.

use crate::config::{CONFIG, get_random_sleep_duration};
use crate::dedup::DedupState;
use crate::error::Result;
use crate::extract;
use crate::locale::{self, LocaleProfile};
use crate::models::{CandidateLead, HuntRequest};
use crate::query;
use crate::search::SearchProvider;
use crate::store::ExistingContactSet;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::sleep;

/// Result of one hunt execution.
#[derive(Debug)]
pub(crate) struct HuntOutcome {
    /// Accepted leads in acceptance order, truncated to the request count.
    pub leads: Vec<CandidateLead>,
    /// Total search queries issued across all tiers.
    pub queries_issued: usize,
    /// Country code the locality resolved to.
    pub country: &'static str,
}

pub(crate) struct LeadHunter {
    provider: SearchProvider,
}

impl LeadHunter {
    /// Creates a hunter with the production backend chain and a shared
    /// HTTP client.
    pub(crate) fn new() -> Result<Self> {
        let client = Arc::new(
            Client::builder()
                .user_agent(&CONFIG.user_agent)
                .timeout(CONFIG.request_timeout)
                .build()?,
        );
        Ok(Self {
            provider: SearchProvider::from_config(client),
        })
    }

    pub(crate) fn with_provider(provider: SearchProvider) -> Self {
        Self { provider }
    }

    /// Runs the full cascade for one request. Never fails: provider
    /// failures contribute zero candidates and the loop moves on, so the
    /// worst case is an empty list.
    ///
    /// Expects a request whose count is already clamped; the caller-facing
    /// surfaces enforce that before the pipeline is entered.
    pub(crate) async fn hunt(
        &self,
        request: &HuntRequest,
        existing: &ExistingContactSet,
    ) -> HuntOutcome {
        let locale = locale::resolve(&request.locality, request.country.as_deref());
        let count = request.count;

        tracing::info!(
            target: "hunt",
            "Hunting {} leads for '{}' in '{}' ({}/{})",
            count,
            request.description,
            request.locality,
            locale.code,
            request.strategy.code()
        );

        let mut state = DedupState::seeded(
            existing.phones.iter().cloned(),
            existing.emails.iter().cloned(),
        );
        let mut seen_urls: HashSet<String> = HashSet::new();
        let mut accepted: Vec<CandidateLead> = Vec::new();
        let mut queries_issued = 0usize;

        // Tier 1: the golden query, with a generous result window.
        let golden = query::golden_query(
            &request.description,
            &request.locality,
            request.strategy,
            locale,
        );
        accepted.extend(
            self.run_query(
                &golden,
                locale,
                count * 3,
                request.include_potential,
                &mut seen_urls,
                &mut state,
            )
            .await,
        );
        queries_issued += 1;

        // Tiers 2-4, each strictly broader than the last. Every query is
        // gated on the quota so the golden wave alone can finish the hunt.
        let tiers = [
            query::phone_heavy_queries(&request.description, &request.locality, locale),
            query::fallback_queries(&request.description, &request.locality, locale),
            query::generic_queries(&request.description, &request.locality, locale),
        ];

        'tiers: for (tier_index, tier) in tiers.iter().enumerate() {
            for search_query in tier {
                if accepted.len() >= count {
                    break 'tiers;
                }

                tracing::debug!(
                    target: "hunt",
                    "Tier {} query: {}",
                    tier_index + 2,
                    search_query
                );
                sleep(get_random_sleep_duration()).await;

                accepted.extend(
                    self.run_query(
                        search_query,
                        locale,
                        count,
                        request.include_potential,
                        &mut seen_urls,
                        &mut state,
                    )
                    .await,
                );
                queries_issued += 1;
            }
        }

        accepted.truncate(count);
        tracing::info!(
            target: "hunt",
            "Found {} leads (requested: {}) after {} queries",
            accepted.len(),
            count,
            queries_issued
        );

        HuntOutcome {
            leads: accepted,
            queries_issued,
            country: locale.code,
        }
    }

    /// One search-extract-dedup pass for a single query.
    async fn run_query(
        &self,
        search_query: &str,
        locale: &LocaleProfile,
        limit: usize,
        include_potential: bool,
        seen_urls: &mut HashSet<String>,
        state: &mut DedupState,
    ) -> Vec<CandidateLead> {
        let results = self.provider.search(search_query, locale, limit).await;
        let candidates = extract::extract_leads(&results, locale, include_potential, seen_urls);
        state.filter(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TtlCache;
    use crate::models::{LeadType, RawSearchResult, Strategy};
    use crate::search::SearchBackend;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Serves a scripted sequence of responses, one per query, counting
    /// how many queries it receives. An exhausted script returns nothing.
    struct ScriptedBackend {
        responses: Mutex<VecDeque<Vec<RawSearchResult>>>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SearchBackend for ScriptedBackend {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn query(&self, _t: &str, _r: &str, _l: usize) -> Vec<RawSearchResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default()
        }
    }

    fn hunter_with_script(
        responses: Vec<Vec<RawSearchResult>>,
    ) -> (LeadHunter, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = ScriptedBackend {
            responses: Mutex::new(responses.into()),
            calls: calls.clone(),
        };
        let provider = SearchProvider::new(
            vec![Box::new(backend)],
            TtlCache::new(Duration::from_secs(60), 100),
        );
        (LeadHunter::with_provider(provider), calls)
    }

    fn phone_result(i: usize) -> RawSearchResult {
        RawSearchResult {
            title: format!("عميل رقم {}", i),
            link: format!("https://facebook.com/post/{}", i),
            snippet: format!("محتاج سباك ضروري، للتواصل 010123456{:02}", i),
            source: "scripted".to_string(),
        }
    }

    fn request(count: usize) -> HuntRequest {
        let mut req = HuntRequest::new("أنا سباك", "القاهرة");
        req.count = count;
        req
    }

    #[tokio::test(start_paused = true)]
    async fn test_golden_wave_meets_quota_without_fallbacks() {
        let batch: Vec<_> = (0..7).map(phone_result).collect();
        let (hunter, calls) = hunter_with_script(vec![batch]);

        let outcome = hunter
            .hunt(&request(5), &ExistingContactSet::default())
            .await;

        assert_eq!(outcome.leads.len(), 5);
        assert_eq!(outcome.queries_issued, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // Acceptance order is preserved: the first five results win.
        for (i, lead) in outcome.leads.iter().enumerate() {
            assert_eq!(lead.phone, format!("010123456{:02}", i));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cascade_advances_through_tiers() {
        // Golden wave empty, first phone-heavy query delivers one lead,
        // everything after stays empty.
        let (hunter, calls) = hunter_with_script(vec![vec![], vec![phone_result(0)]]);

        let outcome = hunter
            .hunt(&request(5), &ExistingContactSet::default())
            .await;

        assert_eq!(outcome.leads.len(), 1);
        assert_eq!(outcome.leads[0].lead_type, LeadType::WithPhone);
        // Quota never met, so every tier query was issued: 1 golden +
        // 6 phone-heavy + 5 fallback + 5 generic.
        assert_eq!(outcome.queries_issued, 17);
        assert_eq!(calls.load(Ordering::SeqCst), 17);
    }

    #[tokio::test(start_paused = true)]
    async fn test_existing_contacts_seed_the_dedup() {
        let batch = vec![phone_result(0), phone_result(1)];
        let (hunter, _) = hunter_with_script(vec![batch]);

        let existing = ExistingContactSet {
            phones: ["01012345600".to_string()].into_iter().collect(),
            emails: HashSet::new(),
        };
        let outcome = hunter.hunt(&request(5), &existing).await;

        assert!(outcome.leads.iter().all(|l| l.phone != "01012345600"));
        assert!(outcome.leads.iter().any(|l| l.phone == "01012345601"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_phone_across_tiers_accepted_once() {
        let (hunter, _) =
            hunter_with_script(vec![vec![phone_result(0)], vec![phone_result(0)]]);

        let outcome = hunter
            .hunt(&request(5), &ExistingContactSet::default())
            .await;

        let matching = outcome
            .leads
            .iter()
            .filter(|l| l.phone == "01012345600")
            .count();
        assert_eq!(matching, 1);
    }

    fn intent_result() -> RawSearchResult {
        RawSearchResult {
            title: "سؤال في جروب القاهرة".to_string(),
            link: "https://facebook.com/groups/cairo/post/42".to_string(),
            snippet: "محتاج سباك شاطر يا جماعة".to_string(),
            source: "scripted".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_intent_url_surfaces_once_across_tiers() {
        // The same contact-less intent post comes back from the golden wave
        // and again from the first phone-heavy query.
        let (hunter, calls) =
            hunter_with_script(vec![vec![intent_result()], vec![intent_result()]]);

        let outcome = hunter
            .hunt(&request(5), &ExistingContactSet::default())
            .await;

        assert_eq!(outcome.leads.len(), 1);
        assert_eq!(outcome.leads[0].lead_type, LeadType::Potential);
        assert_eq!(outcome.leads[0].source, intent_result().link);
        // The quota was never met, so the repeat really was served and
        // rejected rather than the tier being skipped.
        assert_eq!(calls.load(Ordering::SeqCst), 17);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_backends_empty_returns_empty_list() {
        let (hunter, calls) = hunter_with_script(vec![]);

        let outcome = hunter
            .hunt(&request(10), &ExistingContactSet::default())
            .await;

        assert!(outcome.leads.is_empty());
        // Still bounded by the fixed tier-query total.
        assert_eq!(calls.load(Ordering::SeqCst), 17);
    }

    #[tokio::test(start_paused = true)]
    async fn test_country_resolution_flows_into_outcome() {
        let (hunter, _) = hunter_with_script(vec![]);

        let mut req = HuntRequest::new("طبيب أسنان", "الرياض");
        req.count = 10;
        req.strategy = Strategy::SocialMedia;
        let outcome = hunter.hunt(&req, &ExistingContactSet::default()).await;

        assert_eq!(outcome.country, "saudi");
        assert!(outcome.leads.len() <= 10);
    }
}
