//! Bounded scatter/gather over search queries.
//!
//! Queries fan out onto a `JoinSet`, throttled by a semaphore. The gather side
//! stops at the stage deadline and keeps whatever has already come back.

use std::sync::Arc;

use killswitch_core::obs::emit_query_failed;
use killswitch_core::TextItem;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cache::QueryCache;
use crate::settings::ProviderSettings;
use crate::traits::CorpusRetrieval;

pub type SearchCache = QueryCache<Vec<TextItem>>;

/// Items gathered for one stage, in query order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GatheredCorpus {
    pub items: Vec<TextItem>,
    pub queries_total: usize,
    pub queries_succeeded: usize,
    pub queries_failed: usize,
    pub cache_hits: usize,
    /// True when the stage deadline cut the fan-out short.
    pub timed_out: bool,
}

impl GatheredCorpus {
    pub fn queries_missing(&self) -> usize {
        self.queries_total - self.queries_succeeded - self.queries_failed
    }
}

struct QueryOutcome {
    index: usize,
    items: Option<Vec<TextItem>>,
    cached: bool,
}

/// Run every query against `retrieval` and gather the results.
///
/// Failed queries (after retries) contribute nothing and are logged. When the
/// stage deadline elapses the remaining tasks are aborted and the partial
/// corpus is returned.
pub async fn gather_corpus(
    retrieval: Arc<dyn CorpusRetrieval>,
    cache: Option<Arc<SearchCache>>,
    queries: &[String],
    settings: &ProviderSettings,
) -> GatheredCorpus {
    let deadline = Instant::now() + settings.stage_deadline();
    let semaphore = Arc::new(Semaphore::new(settings.max_concurrent_queries.max(1)));
    let mut tasks = JoinSet::new();

    for (index, query) in queries.iter().enumerate() {
        let retrieval = Arc::clone(&retrieval);
        let cache = cache.clone();
        let semaphore = Arc::clone(&semaphore);
        let query = query.clone();
        let retry = settings.retry.clone();
        let limit = settings.result_limit;

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            let namespace = retrieval.name();

            if let Some(cache) = &cache {
                if let Some(items) = cache.get(namespace, &query).await {
                    return QueryOutcome {
                        index,
                        items: Some(items),
                        cached: true,
                    };
                }
            }

            let result = retry
                .run(&format!("search '{query}'"), || {
                    let retrieval = Arc::clone(&retrieval);
                    let query = query.clone();
                    async move { retrieval.search(&query, limit).await }
                })
                .await;

            match result {
                Ok(items) => {
                    if let Some(cache) = &cache {
                        cache.insert(namespace, &query, items.clone()).await;
                    }
                    QueryOutcome {
                        index,
                        items: Some(items),
                        cached: false,
                    }
                }
                Err(e) => {
                    emit_query_failed(&query, &e);
                    QueryOutcome {
                        index,
                        items: None,
                        cached: false,
                    }
                }
            }
        });
    }

    let mut slots: Vec<Option<Vec<TextItem>>> = vec![None; queries.len()];
    let mut gathered = GatheredCorpus {
        queries_total: queries.len(),
        ..GatheredCorpus::default()
    };

    loop {
        match tokio::time::timeout_at(deadline, tasks.join_next()).await {
            Ok(Some(Ok(outcome))) => {
                if outcome.cached {
                    gathered.cache_hits += 1;
                }
                match outcome.items {
                    Some(items) => {
                        gathered.queries_succeeded += 1;
                        slots[outcome.index] = Some(items);
                    }
                    None => gathered.queries_failed += 1,
                }
            }
            Ok(Some(Err(join_err))) => {
                warn!(error = %join_err, "retrieval task did not complete");
                gathered.queries_failed += 1;
            }
            Ok(None) => break,
            Err(_elapsed) => {
                gathered.timed_out = true;
                tasks.abort_all();
                warn!(
                    pending = tasks.len(),
                    deadline_ms = settings.stage_deadline_ms,
                    "retrieval deadline reached, continuing with partial corpus"
                );
                break;
            }
        }
    }

    gathered.items = slots.into_iter().flatten().flatten().collect();
    debug!(
        queries = gathered.queries_total,
        succeeded = gathered.queries_succeeded,
        failed = gathered.queries_failed,
        items = gathered.items.len(),
        "corpus gathered"
    );
    gathered
}
