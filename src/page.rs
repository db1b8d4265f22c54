//! Data model for ingested documentation pages, chunks, and documents.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// A link discovered inside a page's content region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRef {
    /// Absolute URL the link resolves to.
    pub url: String,
    /// Visible link text.
    pub text: String,
}

/// Metadata captured alongside a page's extracted content.
#[derive(Debug, Clone, Serialize)]
pub struct PageMetadata {
    /// Meta description, empty when the source carries none.
    pub description: String,
    /// Heading texts in document order.
    pub headings: Vec<String>,
    /// Links whose host matches the documentation host.
    pub internal_links: Vec<LinkRef>,
    /// Links pointing at other hosts.
    pub external_links: Vec<LinkRef>,
    /// Timestamp when the page was ingested.
    pub scraped_at: DateTime<Utc>,
    /// CRC32 checksum of the raw source markup, when available.
    pub checksum: Option<u32>,
    /// Origin-specific fields (dump markers, spec fragment ids).
    pub extra: BTreeMap<String, Value>,
}

impl PageMetadata {
    /// Builds empty metadata stamped with the current time.
    pub fn new() -> Self {
        Self {
            description: String::new(),
            headings: Vec::new(),
            internal_links: Vec::new(),
            external_links: Vec::new(),
            scraped_at: Utc::now(),
            checksum: None,
            extra: BTreeMap::new(),
        }
    }

    /// Attaches a raw-content checksum.
    pub fn with_checksum(mut self, checksum: u32) -> Self {
        self.checksum = Some(checksum);
        self
    }
}

impl Default for PageMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// One unit of source documentation, immutable after creation.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// Canonical URL identifying the page.
    pub url: String,
    /// Page title, may be empty when the source carries none.
    pub title: String,
    /// Normalized text content.
    pub content: String,
    /// All content-region link URLs in document order.
    pub links: Vec<String>,
    /// Captured metadata.
    pub metadata: PageMetadata,
}

impl Page {
    /// Builds a page with empty links and fresh metadata.
    pub fn new(url: String, title: String, content: String) -> Self {
        Self {
            url,
            title,
            content,
            links: Vec::new(),
            metadata: PageMetadata::new(),
        }
    }

    /// Replaces the link list.
    pub fn with_links(mut self, links: Vec<String>) -> Self {
        self.links = links;
        self
    }

    /// Replaces the metadata.
    pub fn with_metadata(mut self, metadata: PageMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A size-bounded fragment of a page's content.
///
/// Indices within one page form the contiguous range `[0, total_chunks - 1]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Fragment text, including any overlap prefix.
    pub content: String,
    /// Position of this chunk within its page.
    pub chunk_index: usize,
    /// Number of chunks the page produced.
    pub total_chunks: usize,
    /// Section heading the chunk belongs to, when known.
    pub section: Option<String>,
}

/// Vector-store-ready record assembled from one chunk and its page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Chunk text.
    pub content: String,
    /// Page title, defaulted when the source had none.
    pub title: String,
    /// Source page URL.
    pub url: String,
    /// Classified product version label.
    pub version: String,
    /// Classified framework label.
    pub framework: String,
    /// Classified documentation category.
    pub doc_type: String,
    /// Lowercased heading keywords.
    pub keywords: Vec<String>,
    /// Merged chunk-position and page-level metadata.
    pub metadata: serde_json::Map<String, Value>,
}
