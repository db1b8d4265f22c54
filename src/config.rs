//! Crawl and chunking configuration shared across the pipeline.

use clap::Args;
use std::time::Duration;
use url::Url;

/// Tunable knobs that bound a single crawl invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrawlConfig {
    base_url: String,
    sitemap_url: Option<String>,
    max_depth: usize,
    max_pages: usize,
    allowed_domains: Vec<String>,
    exclude_patterns: Vec<String>,
    delay: Duration,
    timeout: Duration,
    respect_robots_txt: bool,
    concurrency: usize,
}

impl CrawlConfig {
    /// Constructs a config for the given documentation root with defaults.
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            sitemap_url: None,
            max_depth: 3,
            max_pages: 500,
            allowed_domains: Vec::new(),
            exclude_patterns: Vec::new(),
            delay: Duration::from_millis(200),
            timeout: Duration::from_millis(30_000),
            respect_robots_txt: true,
            concurrency: 3,
        }
    }

    /// Overrides the sitemap location.
    pub fn with_sitemap_url(mut self, sitemap_url: String) -> Self {
        self.sitemap_url = Some(sitemap_url);
        self
    }

    /// Overrides the maximum crawl depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Overrides the page cap.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Replaces the domain allowlist.
    pub fn with_allowed_domains(mut self, allowed_domains: Vec<String>) -> Self {
        self.allowed_domains = allowed_domains;
        self
    }

    /// Replaces the URL exclusion substrings.
    pub fn with_exclude_patterns(mut self, exclude_patterns: Vec<String>) -> Self {
        self.exclude_patterns = exclude_patterns;
        self
    }

    /// Overrides the minimum interval between dispatched fetches.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Overrides the per-page fetch deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the robots.txt toggle.
    pub fn with_respect_robots_txt(mut self, respect: bool) -> Self {
        self.respect_robots_txt = respect;
        self
    }

    /// Overrides the worker bound.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Documentation root URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sitemap location, defaulting to `<base>/sitemap.xml`.
    pub fn sitemap_url(&self) -> String {
        match &self.sitemap_url {
            Some(url) => url.clone(),
            None => format!("{}/sitemap.xml", self.base_url.trim_end_matches('/')),
        }
    }

    /// Maximum crawl depth. Accepted for configuration parity; the crawl is
    /// sitemap-driven and never follows links deeper.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Hard cap on the number of pages fetched per run.
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Domain allowlist; empty allows every host.
    pub fn allowed_domains(&self) -> &[String] {
        &self.allowed_domains
    }

    /// URL exclusion substrings.
    pub fn exclude_patterns(&self) -> &[String] {
        &self.exclude_patterns
    }

    /// Minimum interval between dispatched fetches.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Per-page fetch deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Robots.txt toggle. Accepted for configuration parity; the sitemap is
    /// treated as the authoritative page list.
    pub fn respect_robots_txt(&self) -> bool {
        self.respect_robots_txt
    }

    /// Number of fetches allowed in flight at once.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Determines whether the host passes the allowlist. A host matches when
    /// it equals an allowed domain or is a subdomain of one.
    pub fn is_domain_allowed(&self, host: &str) -> bool {
        if self.allowed_domains.is_empty() {
            return true;
        }
        self.allowed_domains.iter().any(|allowed| {
            host == allowed || host.ends_with(&format!(".{allowed}"))
        })
    }

    /// Determines whether the URL contains any exclusion substring.
    pub fn is_excluded(&self, url: &str) -> bool {
        self.exclude_patterns
            .iter()
            .any(|pattern| !pattern.is_empty() && url.contains(pattern.as_str()))
    }

    /// Full admission check for a candidate URL: parseable, allowed host,
    /// not excluded.
    pub fn url_allowed(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        self.is_domain_allowed(host) && !self.is_excluded(url)
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// Chunking knobs. Lengths are measured in characters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkConfig {
    max_chunk_size: usize,
    overlap: usize,
    separators: Vec<String>,
}

impl ChunkConfig {
    /// Constructs a chunk config with the given size bound.
    pub fn new(max_chunk_size: usize, overlap: usize) -> Self {
        Self {
            max_chunk_size: max_chunk_size.max(1),
            overlap,
            separators: default_separators(),
        }
    }

    /// Replaces the separator descent list, coarsest first.
    pub fn with_separators(mut self, separators: Vec<String>) -> Self {
        self.separators = separators;
        self
    }

    /// Upper bound on chunk length before the overlap pass.
    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    /// Number of trailing characters repeated at the head of the next chunk.
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Separator descent list, coarsest first.
    pub fn separators(&self) -> &[String] {
        &self.separators
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self::new(1000, 200)
    }
}

fn default_separators() -> Vec<String> {
    vec![
        "\n\n".to_string(),
        "\n".to_string(),
        ". ".to_string(),
        " ".to_string(),
        String::new(),
    ]
}

/// Crawl arguments shared by the binary.
#[derive(Args, Debug, Clone)]
pub struct CrawlArgs {
    /// Documentation root URL
    #[arg(long, env = "DOCSIFT_BASE_URL")]
    pub base_url: String,

    /// Sitemap URL (defaults to <base-url>/sitemap.xml)
    #[arg(long, env = "DOCSIFT_SITEMAP_URL")]
    pub sitemap_url: Option<String>,

    /// Maximum crawl depth
    #[arg(long, env = "DOCSIFT_MAX_DEPTH", default_value_t = 3)]
    pub max_depth: usize,

    /// Maximum pages fetched per run
    #[arg(long, env = "DOCSIFT_MAX_PAGES", default_value_t = 500)]
    pub max_pages: usize,

    /// Domain allowlist, comma separated (empty allows all)
    #[arg(long, env = "DOCSIFT_DOMAINS", default_value = "")]
    pub allowed_domains: String,

    /// URL substrings to exclude, comma separated
    #[arg(long, env = "DOCSIFT_EXCLUDE", default_value = "")]
    pub exclude_patterns: String,

    /// Milliseconds to wait between dispatched fetches
    #[arg(long, env = "DOCSIFT_DELAY_MS", default_value_t = 200)]
    pub delay_ms: u64,

    /// Per-page fetch deadline in milliseconds
    #[arg(long, env = "DOCSIFT_TIMEOUT_MS", default_value_t = 30_000)]
    pub timeout_ms: u64,

    /// Honor robots.txt
    #[arg(long, env = "DOCSIFT_RESPECT_ROBOTS", default_value_t = true)]
    pub respect_robots_txt: bool,

    /// Number of concurrent page fetches
    #[arg(long, env = "DOCSIFT_CONCURRENCY", default_value_t = 3)]
    pub concurrency: usize,
}

impl CrawlArgs {
    /// Converts the parsed arguments into a `CrawlConfig`.
    pub fn build_config(&self) -> CrawlConfig {
        let mut config = CrawlConfig::new(self.base_url.clone())
            .with_max_depth(self.max_depth)
            .with_max_pages(self.max_pages)
            .with_allowed_domains(split_list(&self.allowed_domains))
            .with_exclude_patterns(split_list(&self.exclude_patterns))
            .with_delay(Duration::from_millis(self.delay_ms))
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_respect_robots_txt(self.respect_robots_txt)
            .with_concurrency(self.concurrency);
        if let Some(sitemap) = &self.sitemap_url {
            config = config.with_sitemap_url(sitemap.clone());
        }
        config
    }
}

/// Chunking arguments shared by the binary.
#[derive(Args, Debug, Clone)]
pub struct ChunkArgs {
    /// Maximum chunk length in characters
    #[arg(long, env = "DOCSIFT_MAX_CHUNK_SIZE", default_value_t = 1000)]
    pub max_chunk_size: usize,

    /// Characters of trailing context repeated into the next chunk
    #[arg(long, env = "DOCSIFT_CHUNK_OVERLAP", default_value_t = 200)]
    pub overlap: usize,
}

impl ChunkArgs {
    /// Converts the parsed arguments into a `ChunkConfig`.
    pub fn build_config(&self) -> ChunkConfig {
        ChunkConfig::new(self.max_chunk_size, self.overlap)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
