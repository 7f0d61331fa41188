//! Crawl driver - the main fetch loop
//!
//! One page is processed at a time:
//! - The scheduler picks a pending page at the minimum pending depth
//! - The fetcher retrieves it, following redirects
//! - Discovered links are enqueued with their depth cost
//! - The page is marked fetched or failed exactly once
//!
//! Throughput comes from running several processes against one frontier; the
//! store's `(tag, url)` uniqueness constraint keeps them from duplicating work.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::{ChildLink, LinkExtractor};
use crate::crawler::scheduler::Scheduler;
use crate::crawler::seen::SeenCache;
use crate::storage::{EnqueueOutcome, FrontierStore, PageRecord, StoreError};
use crate::url::parse_seed;
use crate::CrawlError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Counters accumulated over a crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages_fetched: u64,
    pub pages_failed: u64,
    pub links_enqueued: u64,
    pub store_errors: u64,
}

impl CrawlSummary {
    /// Pages that reached a terminal state
    pub fn pages_processed(&self) -> u64 {
        self.pages_fetched + self.pages_failed
    }
}

/// Result of a single driver iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The page was stored with its content; `links_enqueued` new rows were created
    Fetched { id: i64, links_enqueued: usize },

    /// The page was marked failed with `error`
    Failed { id: i64, error: String },

    /// A store operation failed; the iteration was abandoned
    StoreError,

    /// No pending pages remain
    Empty,
}

/// The crawl driver
pub struct Crawler<S: FrontierStore> {
    store: Arc<S>,
    scheduler: Scheduler,
    fetcher: Fetcher,
    extractor: LinkExtractor,
    seen: SeenCache,
    retry_delay: Duration,
    summary: CrawlSummary,
}

impl<S: FrontierStore> Crawler<S> {
    /// Creates a crawler over `store`
    ///
    /// # Arguments
    ///
    /// * `config` - Crawler settings (limits, timeouts, user agent, extractor)
    /// * `store` - The frontier store, shared with the caller
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to seed and run
    /// * `Err(CrawlError)` - The HTTP client could not be built
    pub fn new(config: &CrawlerConfig, store: Arc<S>) -> Result<Self, CrawlError> {
        Ok(Self {
            store,
            scheduler: Scheduler::new(config.candidate_limit),
            fetcher: Fetcher::new(config)?,
            extractor: LinkExtractor::from_kind(config.link_extractor),
            seen: SeenCache::with_limit(config.seen_cache_limit),
            retry_delay: Duration::from_millis(config.store_retry_delay_ms),
            summary: CrawlSummary::default(),
        })
    }

    /// Replaces the scheduler, e.g. with a fixed-seed one
    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn seen(&self) -> &SeenCache {
        &self.seen
    }

    pub fn summary(&self) -> CrawlSummary {
        self.summary
    }

    /// Queues seed URLs at depth 0 under `tag`
    ///
    /// A seed that already exists is re-primed to depth 0 if it is still
    /// pending. Invalid URLs are logged and skipped.
    ///
    /// # Returns
    ///
    /// The number of seeds that are now queued or already present
    pub fn seed(&mut self, tag: &str, urls: &[String]) -> usize {
        let mut queued = 0;

        for raw in urls {
            let url = raw.trim();
            if let Err(e) = parse_seed(url) {
                tracing::warn!("Skipping seed {:?}: {}", raw, e);
                continue;
            }

            match self.store.enqueue(None, url, tag, 0) {
                Ok(EnqueueOutcome::Created(id)) => {
                    tracing::debug!("Seeded {} as page {}", url, id);
                }
                Ok(EnqueueOutcome::AlreadyExists) => match self.store.reprioritize_seed(url, tag, 0) {
                    Ok(true) => tracing::debug!("Re-primed existing seed {}", url),
                    Ok(false) => tracing::debug!("Seed {} already queued", url),
                    Err(e) => {
                        tracing::error!("Failed to re-prime seed {}: {}", url, e);
                        self.summary.store_errors += 1;
                        continue;
                    }
                },
                Err(e) => {
                    tracing::error!("Failed to queue seed {}: {}", url, e);
                    self.summary.store_errors += 1;
                    continue;
                }
            }

            self.seen.insert(tag, url);
            queued += 1;
        }

        tracing::info!("Queued {} urls with tag: {}", queued, tag);
        queued
    }

    /// Runs the crawl loop until the frontier is empty
    ///
    /// Failures of single pages or store calls never end the loop. After a
    /// store error the driver waits for the configured retry delay.
    pub async fn run(&mut self) -> CrawlSummary {
        let start_time = Instant::now();
        let mut iterations: u64 = 0;

        loop {
            match self.step().await {
                StepOutcome::Empty => {
                    tracing::info!("Queue is empty");
                    break;
                }
                StepOutcome::StoreError => {
                    tokio::time::sleep(self.retry_delay).await;
                }
                StepOutcome::Fetched { .. } | StepOutcome::Failed { .. } => {}
            }

            iterations += 1;
            if iterations % 100 == 0 {
                let elapsed = start_time.elapsed();
                tracing::info!(
                    "Progress: {} fetched, {} failed, {} links queued, {:.2} pages/sec",
                    self.summary.pages_fetched,
                    self.summary.pages_failed,
                    self.summary.links_enqueued,
                    self.summary.pages_processed() as f64 / elapsed.as_secs_f64()
                );
            }
        }

        tracing::info!(
            "Crawl drained: {} pages processed in {:?}",
            self.summary.pages_processed(),
            start_time.elapsed()
        );

        self.summary
    }

    /// Performs one scheduling, fetch and store iteration
    pub async fn step(&mut self) -> StepOutcome {
        let page = match self.scheduler.next_candidate(self.store.as_ref()) {
            Ok(Some(page)) => page,
            Ok(None) => return StepOutcome::Empty,
            Err(e) => {
                tracing::error!("Failed to pick next page: {}", e);
                self.summary.store_errors += 1;
                return StepOutcome::StoreError;
            }
        };

        self.process(page).await
    }

    async fn process(&mut self, page: PageRecord) -> StepOutcome {
        let url = match Url::parse(&page.url) {
            Ok(url) => url,
            Err(e) => return self.fail(&page, e.to_string()),
        };

        let fetched = match self.fetcher.fetch(&url).await {
            Ok(fetched) => fetched,
            Err(e) => return self.fail(&page, e.to_string()),
        };

        let links = self
            .extractor
            .extract_links_from(&fetched.html, &fetched.final_url, &url);

        tracing::info!("GET {} [{}] - adding {} urls.", page.url, page.depth, links.len());

        let mut enqueued = 0;
        for link in links {
            if self.enqueue_child(&page, link) {
                enqueued += 1;
            }
        }

        match self.store.mark_fetched(page.id, &fetched.html) {
            Ok(()) => {
                self.summary.pages_fetched += 1;
            }
            Err(StoreError::AlreadyTerminal(id)) => {
                tracing::debug!("Page {} was completed by another process", id);
            }
            Err(e) => {
                tracing::error!("Failed to mark {} fetched: {}", page.url, e);
                self.summary.store_errors += 1;
                return StepOutcome::StoreError;
            }
        }

        StepOutcome::Fetched {
            id: page.id,
            links_enqueued: enqueued,
        }
    }

    /// Enqueues one child of `parent`, returning true if a new row was created
    fn enqueue_child(&mut self, parent: &PageRecord, link: ChildLink) -> bool {
        let url = link.url.as_str();
        if self.seen.contains(&parent.tag, url) {
            return false;
        }

        let depth = parent.depth.saturating_add(link.depth_increment);
        match self.store.enqueue(Some(parent.id), url, &parent.tag, depth) {
            Ok(outcome) => {
                self.seen.insert(&parent.tag, url);
                if outcome.is_created() {
                    self.summary.links_enqueued += 1;
                }
                outcome.is_created()
            }
            Err(e) => {
                tracing::error!("Failed to enqueue {}: {}", url, e);
                self.summary.store_errors += 1;
                false
            }
        }
    }

    fn fail(&mut self, page: &PageRecord, error: String) -> StepOutcome {
        tracing::warn!("GET {} [{}] - failed: {}", page.url, page.depth, error);

        match self.store.mark_failed(page.id, &error) {
            Ok(()) => {
                self.summary.pages_failed += 1;
            }
            Err(StoreError::AlreadyTerminal(id)) => {
                tracing::debug!("Page {} was completed by another process", id);
            }
            Err(e) => {
                tracing::error!("Failed to mark {} failed: {}", page.url, e);
                self.summary.store_errors += 1;
                return StepOutcome::StoreError;
            }
        }

        StepOutcome::Failed { id: page.id, error }
    }
}
