//! Sitemap-driven crawl orchestration.

use crate::config::CrawlConfig;
use crate::extract::{ContentExtractor, ExtractError};
use crate::page::{Page, PageMetadata};
use crate::render::{PageRenderer, RenderError};
use crate::sitemap::extract_locations;
use crc32fast::Hasher as Crc32;
use futures_util::future::join_all;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::{sleep, timeout};
use tracing::{info, warn};
use url::Url;

/// Fatal crawl failures. Per-page problems are logged and skipped instead.
#[derive(Debug)]
pub enum CrawlError {
    /// The sitemap could not be fetched; nothing was scheduled.
    Sitemap(RenderError),
}

impl fmt::Display for CrawlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sitemap(err) => write!(f, "sitemap fetch failed: {err}"),
        }
    }
}

impl std::error::Error for CrawlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sitemap(err) => Some(err),
        }
    }
}

#[derive(Debug)]
enum PageError {
    Render(RenderError),
    Url(url::ParseError),
    Extract(ExtractError),
    Timeout,
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Render(err) => write!(f, "render failed: {err}"),
            Self::Url(err) => write!(f, "url parse failed: {err}"),
            Self::Extract(err) => write!(f, "extraction failed: {err}"),
            Self::Timeout => write!(f, "page deadline exceeded"),
        }
    }
}

/// Counters accumulated over one crawl run.
#[derive(Default)]
pub struct CrawlMetrics {
    pages_fetched: AtomicUsize,
    pages_skipped: AtomicUsize,
    urls_filtered: AtomicUsize,
    duplicates_dropped: AtomicUsize,
}

impl CrawlMetrics {
    fn record_page_fetched(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    fn record_page_skipped(&self) {
        self.pages_skipped.fetch_add(1, Ordering::Relaxed);
    }

    fn record_url_filtered(&self) {
        self.urls_filtered.fetch_add(1, Ordering::Relaxed);
    }

    fn record_duplicate(&self) {
        self.duplicates_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Pages successfully fetched and extracted.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched.load(Ordering::Relaxed)
    }

    /// Pages dropped after a per-page failure.
    pub fn pages_skipped(&self) -> usize {
        self.pages_skipped.load(Ordering::Relaxed)
    }

    /// Sitemap entries rejected by domain or pattern filters.
    pub fn urls_filtered(&self) -> usize {
        self.urls_filtered.load(Ordering::Relaxed)
    }

    /// Sitemap entries dropped as already visited.
    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped.load(Ordering::Relaxed)
    }

    /// Logs a summary of the run.
    pub fn report(&self) {
        info!(
            pages_fetched = self.pages_fetched(),
            pages_skipped = self.pages_skipped(),
            urls_filtered = self.urls_filtered(),
            duplicates_dropped = self.duplicates_dropped(),
            "crawl complete"
        );
    }
}

/// Visited-URL set and accumulated pages for one crawl invocation.
///
/// Sessions are explicit objects scoped to a single run; reusing one across
/// runs extends deduplication across them.
#[derive(Default)]
pub struct CrawlSession {
    visited: HashSet<String>,
    pages: Vec<Page>,
}

impl CrawlSession {
    /// Builds an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a URL as visited, returning true the first time it is seen.
    pub fn mark_visited(&mut self, url: &str) -> bool {
        self.visited.insert(url.to_string())
    }

    /// Whether the URL has been seen before.
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Appends an extracted page.
    pub fn push_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Pages accumulated so far.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Number of URLs marked visited.
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Consumes the session, yielding its pages.
    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}

/// Sitemap-driven crawler, generic over the page renderer.
pub struct Crawler<R> {
    config: CrawlConfig,
    renderer: Arc<R>,
    extractor: ContentExtractor,
    metrics: Arc<CrawlMetrics>,
}

impl<R: PageRenderer + 'static> Crawler<R> {
    /// Builds a crawler from a config and renderer.
    pub fn new(config: CrawlConfig, renderer: R) -> Self {
        Self {
            config,
            renderer: Arc::new(renderer),
            extractor: ContentExtractor::new(),
            metrics: Arc::new(CrawlMetrics::default()),
        }
    }

    /// Run counters, live while the crawl executes.
    pub fn metrics(&self) -> &CrawlMetrics {
        &self.metrics
    }

    /// Runs the crawl to completion and returns every extracted page.
    pub async fn crawl(&self) -> Result<Vec<Page>, CrawlError> {
        let mut session = CrawlSession::new();
        self.crawl_into(&mut session).await?;
        Ok(session.into_pages())
    }

    /// Runs the crawl, accumulating pages into an existing session.
    ///
    /// URL admission, deduplication, and truncation all happen here in the
    /// coordinating context before any fetch task is spawned.
    pub async fn crawl_into(&self, session: &mut CrawlSession) -> Result<(), CrawlError> {
        let sitemap_url = self.config.sitemap_url();
        let body = self
            .renderer
            .render(&sitemap_url)
            .await
            .map_err(CrawlError::Sitemap)?;
        let locations = extract_locations(&body);
        info!(sitemap = %sitemap_url, entries = locations.len(), "sitemap loaded");

        let mut candidates = Vec::new();
        for location in locations {
            if !self.config.url_allowed(&location) {
                self.metrics.record_url_filtered();
                continue;
            }
            if !session.mark_visited(&location) {
                self.metrics.record_duplicate();
                continue;
            }
            candidates.push(location);
        }

        let max_pages = self.config.max_pages();
        if candidates.len() > max_pages {
            warn!(
                candidates = candidates.len(),
                max_pages, "truncating crawl to the page cap"
            );
            candidates.truncate(max_pages);
        }

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency()));
        let mut handles = Vec::with_capacity(candidates.len());
        for (index, url) in candidates.into_iter().enumerate() {
            if index > 0 {
                sleep(self.config.delay()).await;
            }
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };

            let renderer = Arc::clone(&self.renderer);
            let extractor = self.extractor.clone();
            let metrics = Arc::clone(&self.metrics);
            let deadline = self.config.timeout();
            handles.push(tokio::spawn(async move {
                let _permit = permit;
                let outcome =
                    match timeout(deadline, fetch_page(renderer.as_ref(), &extractor, &url)).await
                    {
                        Ok(result) => result,
                        Err(_) => Err(PageError::Timeout),
                    };
                match outcome {
                    Ok(page) => {
                        metrics.record_page_fetched();
                        Some(page)
                    }
                    Err(err) => {
                        warn!(url = %url, error = %err, "skipping page");
                        metrics.record_page_skipped();
                        None
                    }
                }
            }));
        }

        for joined in join_all(handles).await {
            match joined {
                Ok(Some(page)) => session.push_page(page),
                Ok(None) => {}
                Err(err) => warn!(error = %err, "page task panicked"),
            }
        }

        self.metrics.report();
        Ok(())
    }
}

async fn fetch_page<R: PageRenderer + ?Sized>(
    renderer: &R,
    extractor: &ContentExtractor,
    url: &str,
) -> Result<Page, PageError> {
    let parsed = Url::parse(url).map_err(PageError::Url)?;
    let markup = renderer.render(url).await.map_err(PageError::Render)?;

    let mut hasher = Crc32::new();
    hasher.update(markup.as_bytes());
    let checksum = hasher.finalize();

    let extracted = extractor
        .extract(&markup, &parsed)
        .map_err(PageError::Extract)?;

    let mut metadata = PageMetadata::new().with_checksum(checksum);
    metadata.description = extracted.description;
    metadata.headings = extracted.headings;
    metadata.internal_links = extracted.internal_links;
    metadata.external_links = extracted.external_links;

    Ok(
        Page::new(url.to_string(), extracted.title, extracted.content)
            .with_links(extracted.links)
            .with_metadata(metadata),
    )
}
