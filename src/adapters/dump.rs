//! Splitting pre-formatted documentation dumps into pages.

use super::slugify;
use crate::classify::markdown_headings;
use crate::page::{Page, PageMetadata};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

static MARKER_PATTERN: OnceLock<Regex> = OnceLock::new();

fn marker_pattern() -> &'static Regex {
    MARKER_PATTERN.get_or_init(|| {
        Regex::new(r"^(URL|COLLECTION|NAV_PATH|DOC_PATH):[ \t]*(\S.*)$").expect("marker pattern")
    })
}

/// Splits a full-text documentation dump into pages at top-level heading
/// boundaries.
///
/// Each `# ` line outside a code fence starts a new section; the heading
/// text becomes the page title. `URL:` marker lines override the derived
/// URL, and `COLLECTION:`/`NAV_PATH:`/`DOC_PATH:` markers are stripped into
/// page metadata. A dump with no headings becomes a single untitled page.
/// Preamble text before the first heading is dropped.
pub fn split_dump(raw: &str, base_url: &str) -> Vec<Page> {
    let sections = split_sections(raw);
    if sections.is_empty() {
        let body = raw.trim();
        if body.is_empty() {
            return Vec::new();
        }
        return vec![build_page(String::new(), body, base_url)];
    }
    sections
        .into_iter()
        .map(|(title, body)| build_page(title, &body, base_url))
        .collect()
}

fn split_sections(raw: &str) -> Vec<(String, String)> {
    let mut sections: Vec<(String, Vec<&str>)> = Vec::new();
    let mut in_fence = false;
    for line in raw.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        } else if !in_fence {
            if let Some(title) = line.strip_prefix("# ") {
                sections.push((title.trim().to_string(), vec![line]));
                continue;
            }
        }
        if let Some((_, body)) = sections.last_mut() {
            body.push(line);
        }
    }
    sections
        .into_iter()
        .map(|(title, lines)| (title, lines.join("\n")))
        .collect()
}

fn build_page(title: String, body: &str, base_url: &str) -> Page {
    let mut url = None;
    let mut metadata = PageMetadata::new();
    let mut kept = Vec::new();
    let mut in_fence = false;

    for line in body.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            kept.push(line);
            continue;
        }
        if !in_fence {
            if let Some(caps) = marker_pattern().captures(line) {
                let value = caps[2].trim().to_string();
                match &caps[1] {
                    "URL" => url = Some(value),
                    "COLLECTION" => {
                        metadata
                            .extra
                            .insert("collection".to_string(), Value::String(value));
                    }
                    "NAV_PATH" => {
                        metadata
                            .extra
                            .insert("navPath".to_string(), Value::String(value));
                    }
                    "DOC_PATH" => {
                        metadata
                            .extra
                            .insert("docPath".to_string(), Value::String(value));
                    }
                    _ => {}
                }
                continue;
            }
        }
        kept.push(line);
    }

    let content = kept.join("\n").trim().to_string();
    metadata.headings = markdown_headings(&content);
    let url = url.unwrap_or_else(|| section_url(base_url, &title));
    Page::new(url, title, content).with_metadata(metadata)
}

fn section_url(base_url: &str, title: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let slug = slugify(title);
    if slug.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{slug}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BASE: &str = "https://docs.example.com";

    #[test]
    fn splits_at_top_level_headings() {
        let raw = "ignored preamble\n\
                   # First Section\nBody one.\n\n\
                   # Second Section\nBody two.\n## Nested\nMore.";
        let pages = split_dump(raw, BASE);

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].title, "First Section");
        assert_eq!(pages[0].content, "# First Section\nBody one.");
        assert_eq!(pages[1].title, "Second Section");
        assert!(pages[1].content.contains("## Nested"));
        assert_eq!(
            pages[1].metadata.headings,
            vec!["Second Section".to_string(), "Nested".to_string()]
        );
    }

    #[test]
    fn url_marker_overrides_the_derived_slug() {
        let raw = "# Install Guide\nURL: https://docs.example.com/setup/install\nBody.";
        let pages = split_dump(raw, BASE);

        assert_eq!(pages[0].url, "https://docs.example.com/setup/install");
        assert!(!pages[0].content.contains("URL:"));
    }

    #[test]
    fn derived_urls_slug_the_title() {
        let raw = "# Getting Started: Basics\nBody.";
        let pages = split_dump(raw, BASE);
        assert_eq!(pages[0].url, "https://docs.example.com/getting-started-basics");
    }

    #[test]
    fn markers_land_in_metadata_and_leave_the_content() {
        let raw = "# Config\nCOLLECTION: core-docs\nNAV_PATH: Guides > Config\nDOC_PATH: guides/config.md\nBody text.";
        let pages = split_dump(raw, BASE);

        let extra = &pages[0].metadata.extra;
        assert_eq!(extra["collection"], Value::String("core-docs".to_string()));
        assert_eq!(extra["navPath"], Value::String("Guides > Config".to_string()));
        assert_eq!(extra["docPath"], Value::String("guides/config.md".to_string()));
        assert_eq!(pages[0].content, "# Config\nBody text.");
    }

    #[test]
    fn fenced_heading_lines_do_not_split() {
        let raw = "# Only Section\n```sh\n# comment, not a heading\nURL: not-a-marker\n```\nAfter.";
        let pages = split_dump(raw, BASE);

        assert_eq!(pages.len(), 1);
        assert!(pages[0].content.contains("# comment, not a heading"));
        assert!(pages[0].content.contains("URL: not-a-marker"));
        assert!(pages[0].metadata.extra.is_empty());
    }

    #[test]
    fn headingless_dump_becomes_a_single_untitled_page() {
        let pages = split_dump("Just some text.\nNo headings anywhere.", BASE);

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title, "");
        assert_eq!(pages[0].url, BASE);
    }

    #[test]
    fn empty_dump_yields_nothing() {
        assert!(split_dump("", BASE).is_empty());
        assert!(split_dump("   \n  ", BASE).is_empty());
    }
}
