//! Chunk assembly and batch hand-off to the document sink.

use crate::chunker::chunk_text;
use crate::classify::classify;
use crate::config::ChunkConfig;
use crate::page::{Document, Page};
use anyhow::Context;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Outcome counts reported by a sink after importing a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Documents accepted by the sink.
    pub successful: usize,
    /// Documents the sink rejected or failed to persist.
    pub errors: usize,
}

/// Destination for assembled documents.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Imports one batch of documents, reporting per-document outcomes.
    async fn import_batch(&self, documents: Vec<Document>) -> anyhow::Result<ImportReport>;
}

/// Turns one page into classified, chunked documents.
///
/// Classification runs once per page and every chunk inherits it. Chunk
/// bookkeeping (`chunkIndex`, `totalChunks`, `section`) and the page's
/// extraction metadata land in each document's metadata bag.
pub fn assemble_page(page: &Page, config: &ChunkConfig) -> Vec<Document> {
    let classification = classify(&page.url, &page.content);
    let chunks = chunk_text(&page.content, config);
    let title = if page.title.is_empty() {
        "Untitled".to_string()
    } else {
        page.title.clone()
    };

    let mut documents = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        if chunk.content.is_empty() {
            warn!(
                url = %page.url,
                chunk_index = chunk.chunk_index,
                "dropping empty chunk"
            );
            continue;
        }
        let section = chunk
            .section
            .clone()
            .unwrap_or_else(|| classification.section.clone());

        let mut metadata = Map::new();
        metadata.insert("chunkIndex".to_string(), Value::from(chunk.chunk_index));
        metadata.insert("totalChunks".to_string(), Value::from(chunk.total_chunks));
        if !section.is_empty() {
            metadata.insert("section".to_string(), Value::String(section));
        }
        if !page.metadata.description.is_empty() {
            metadata.insert(
                "description".to_string(),
                Value::String(page.metadata.description.clone()),
            );
        }
        if !page.metadata.headings.is_empty() {
            metadata.insert(
                "headings".to_string(),
                Value::from(page.metadata.headings.clone()),
            );
        }
        if !page.metadata.internal_links.is_empty() {
            let urls: Vec<String> = page
                .metadata
                .internal_links
                .iter()
                .map(|link| link.url.clone())
                .collect();
            metadata.insert("internalLinks".to_string(), Value::from(urls));
        }
        if !page.metadata.external_links.is_empty() {
            let urls: Vec<String> = page
                .metadata
                .external_links
                .iter()
                .map(|link| link.url.clone())
                .collect();
            metadata.insert("externalLinks".to_string(), Value::from(urls));
        }
        metadata.insert(
            "scrapedAt".to_string(),
            Value::String(page.metadata.scraped_at.to_rfc3339()),
        );
        if let Some(checksum) = page.metadata.checksum {
            metadata.insert("checksum".to_string(), Value::from(checksum));
        }
        for (key, value) in &page.metadata.extra {
            metadata.insert(key.clone(), value.clone());
        }

        documents.push(Document {
            content: chunk.content,
            title: title.clone(),
            url: page.url.clone(),
            version: classification.version.clone(),
            framework: classification.framework.clone(),
            doc_type: classification.doc_type.clone(),
            keywords: classification.keywords.clone(),
            metadata,
        });
    }
    documents
}

/// Assembles every page and hands the combined batch to the sink.
pub async fn assemble_and_import<S: DocumentSink + ?Sized>(
    pages: &[Page],
    config: &ChunkConfig,
    sink: &S,
) -> anyhow::Result<ImportReport> {
    let mut documents = Vec::new();
    for page in pages {
        documents.extend(assemble_page(page, config));
    }
    let total = documents.len();
    let report = sink.import_batch(documents).await?;
    info!(
        documents = total,
        successful = report.successful,
        errors = report.errors,
        "batch imported"
    );
    if report.errors > 0 {
        warn!(errors = report.errors, "sink rejected documents");
    }
    Ok(report)
}

/// Sink that appends documents to a JSON Lines file.
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Creates a sink writing to `path`, creating the file on first import.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl DocumentSink for JsonlSink {
    async fn import_batch(&self, documents: Vec<Document>) -> anyhow::Result<ImportReport> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("failed to open {}", self.path.display()))?;

        let mut report = ImportReport::default();
        let mut buffer = Vec::new();
        for document in &documents {
            match serde_json::to_vec(document) {
                Ok(line) => {
                    buffer.extend_from_slice(&line);
                    buffer.push(b'\n');
                    report.successful += 1;
                }
                Err(error) => {
                    warn!(url = %document.url, %error, "failed to serialize document");
                    report.errors += 1;
                }
            }
        }
        file.write_all(&buffer)
            .await
            .context("failed to write documents")?;
        file.flush().await.context("failed to flush documents")?;
        Ok(report)
    }
}
