//! Glue for running individual hunt requests against the store.

use crate::error::{AppError, Result};
use crate::hunter::LeadHunter;
use crate::models::{HuntReport, HuntRequest, MAX_LEAD_COUNT, MIN_LEAD_COUNT};
use crate::store::{JsonLeadStore, LeadStore};
use futures::{StreamExt, stream};
use indicatif::ProgressBar;
use std::sync::{Arc, Mutex};

/// Runs one hunt end to end: contract check, existing-contacts lookup,
/// cascade, persistence. The count check is the only way this can fail;
/// the hunt itself always produces a (possibly empty) lead list.
pub(crate) async fn process_request(
    hunter: Arc<LeadHunter>,
    store: Arc<Mutex<JsonLeadStore>>,
    user: &str,
    request: HuntRequest,
) -> Result<HuntReport> {
    if request.count < MIN_LEAD_COUNT || request.count > MAX_LEAD_COUNT {
        return Err(AppError::InvalidRequest(format!(
            "count must be between {} and {}, got {}",
            MIN_LEAD_COUNT, MAX_LEAD_COUNT, request.count
        )));
    }

    let existing = {
        let store = store.lock().map_err(|_| {
            AppError::Task("lead store lock poisoned".to_string())
        })?;
        store.lookup(user)
    };

    tracing::debug!(
        target: "process",
        "Seeding dedup with {} phones and {} emails for user '{}'",
        existing.phones.len(),
        existing.emails.len(),
        user
    );

    let outcome = hunter.hunt(&request, &existing).await;

    if outcome.leads.is_empty() {
        tracing::info!(target: "process", "No leads found for user '{}', nothing persisted", user);
    } else {
        let mut store = store.lock().map_err(|_| {
            AppError::Task("lead store lock poisoned".to_string())
        })?;
        store.append(user, &outcome.leads)?;
    }

    Ok(HuntReport {
        resolved_country: outcome.country.to_string(),
        lead_count: outcome.leads.len(),
        leads: outcome.leads,
        queries_issued: outcome.queries_issued,
        request,
    })
}

/// Runs a batch of hunts with bounded concurrency, ticking the progress
/// bar as each one completes. Results come back in completion order; one
/// failed hunt never aborts the rest.
pub(crate) async fn process_batch(
    hunter: Arc<LeadHunter>,
    store: Arc<Mutex<JsonLeadStore>>,
    user: &str,
    requests: Vec<HuntRequest>,
    workers: usize,
    progress: ProgressBar,
) -> Vec<Result<HuntReport>> {
    stream::iter(requests)
        .map(|request| {
            let hunter = hunter.clone();
            let store = store.clone();
            let progress = progress.clone();
            async move {
                let result = process_request(hunter, store, user, request).await;
                progress.inc(1);
                result
            }
        })
        .buffer_unordered(workers.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TtlCache;
    use crate::search::SearchProvider;
    use std::time::Duration;

    fn empty_chain_hunter() -> Arc<LeadHunter> {
        let provider =
            SearchProvider::new(Vec::new(), TtlCache::new(Duration::from_secs(60), 10));
        Arc::new(LeadHunter::with_provider(provider))
    }

    fn temp_store(tag: &str) -> Arc<Mutex<JsonLeadStore>> {
        let path = std::env::temp_dir().join(format!(
            "lead-sleuth-proc-test-{}-{}.json",
            tag,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        Arc::new(Mutex::new(JsonLeadStore::open(path).unwrap()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_count_rejected_before_pipeline() {
        let mut request = HuntRequest::new("سباك", "القاهرة");
        request.count = 3;

        let result =
            process_request(empty_chain_hunter(), temp_store("reject"), "user1", request).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_runs_every_request_despite_failures() {
        let store = temp_store("batch");
        let mut bad = HuntRequest::new("سباك", "القاهرة");
        bad.count = 3;
        let requests = vec![
            HuntRequest::new("سباك", "القاهرة"),
            bad,
            HuntRequest::new("محامي", "جدة"),
        ];

        let results = process_batch(
            empty_chain_hunter(),
            store,
            "user1",
            requests,
            2,
            ProgressBar::hidden(),
        )
        .await;

        assert_eq!(results.len(), 3);
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 2);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(AppError::InvalidRequest(_))))
                .count(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_hunt_yields_empty_report_and_no_write() {
        let store = temp_store("empty");
        let request = HuntRequest::new("سباك", "القاهرة");

        let report = process_request(empty_chain_hunter(), store.clone(), "user1", request)
            .await
            .unwrap();

        assert_eq!(report.lead_count, 0);
        assert!(report.leads.is_empty());
        assert_eq!(report.resolved_country, "egypt");
        assert!(store.lock().unwrap().leads_for("user1").is_empty());
    }
}
