//! Documentation ingestion core: crawl, chunk, and classify docs for
//! vector search.
//!
//! The pipeline fetches a sitemap, extracts boilerplate-free page content,
//! splits it into overlap-preserving chunks, classifies each page, and
//! hands assembled documents to a [`DocumentSink`]. Pre-formatted dumps and
//! OpenAPI specifications enter the same pipeline through the
//! [`adapters`] module.

#![warn(missing_docs)]

pub mod adapters;
pub mod assemble;
pub mod chunker;
pub mod classify;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod page;
pub mod render;
pub mod sitemap;

pub use adapters::dump::split_dump;
pub use adapters::openapi::{import_spec, SpecError};
pub use assemble::{assemble_and_import, assemble_page, DocumentSink, ImportReport, JsonlSink};
pub use chunker::chunk_text;
pub use classify::{classify, markdown_headings, Classification};
pub use config::{ChunkArgs, ChunkConfig, CrawlArgs, CrawlConfig};
pub use crawler::{CrawlError, CrawlMetrics, CrawlSession, Crawler};
pub use extract::{ContentExtractor, ExtractError, ExtractedPage};
pub use page::{Chunk, Document, LinkRef, Page, PageMetadata};
pub use render::{HttpRenderer, PageRenderer, RenderError};
pub use sitemap::extract_locations;
