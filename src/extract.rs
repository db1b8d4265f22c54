//! Boilerplate removal and content extraction from page markup.

use crate::page::LinkRef;
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use url::Url;

const BOILERPLATE_SELECTORS: &[&str] = &[
    "nav",
    "header",
    "footer",
    "aside",
    "script",
    "style",
    "noscript",
    "template",
    ".sidebar",
    ".navigation",
    ".feedback",
];

// First match wins.
const CONTENT_CANDIDATES: &[&str] = &["main", "article", "#content", ".content", "body"];

/// Errors surfaced while extracting page content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// No candidate region produced any text.
    MissingContentRegion,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingContentRegion => write!(f, "no extractable content region in markup"),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Everything pulled out of one page's markup.
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// Page title from `<title>`, falling back to the first heading.
    pub title: String,
    /// Normalized text content with markdown-style structure.
    pub content: String,
    /// Meta description, empty when absent.
    pub description: String,
    /// Heading texts in document order.
    pub headings: Vec<String>,
    /// All content-region link URLs in document order.
    pub links: Vec<String>,
    /// Links on the page's own host.
    pub internal_links: Vec<LinkRef>,
    /// Links pointing elsewhere.
    pub external_links: Vec<LinkRef>,
}

/// Stateless markup-to-text extraction service.
#[derive(Clone)]
pub struct ContentExtractor {
    boilerplate: Vec<Selector>,
    candidates: Vec<Selector>,
    title: Selector,
    meta_description: Selector,
    anchors: Selector,
}

impl ContentExtractor {
    /// Builds an extractor with the standard selector sets.
    pub fn new() -> Self {
        Self {
            boilerplate: BOILERPLATE_SELECTORS
                .iter()
                .map(|raw| Selector::parse(raw).expect("boilerplate selector"))
                .collect(),
            candidates: CONTENT_CANDIDATES
                .iter()
                .map(|raw| Selector::parse(raw).expect("content selector"))
                .collect(),
            title: Selector::parse("title").expect("title selector"),
            meta_description: Selector::parse("meta[name=\"description\"]")
                .expect("meta description selector"),
            anchors: Selector::parse("a[href]").expect("anchor selector"),
        }
    }

    /// Extracts normalized content, metadata, and links from page markup.
    ///
    /// Boilerplate nodes are detached before the content region is picked,
    /// so navigation links never leak into the result.
    pub fn extract(&self, markup: &str, page_url: &Url) -> Result<ExtractedPage, ExtractError> {
        let mut document = Html::parse_document(markup);
        for selector in &self.boilerplate {
            let ids: Vec<_> = document.select(selector).map(|el| el.id()).collect();
            for id in ids {
                if let Some(mut node) = document.tree.get_mut(id) {
                    node.detach();
                }
            }
        }

        let title_tag = document
            .select(&self.title)
            .next()
            .map(|el| collapse_whitespace(&element_text(&el)))
            .unwrap_or_default();
        let description = document
            .select(&self.meta_description)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        let region = self
            .candidates
            .iter()
            .find_map(|selector| document.select(selector).next())
            .unwrap_or_else(|| document.root_element());

        let mut renderer = BlockRenderer::default();
        renderer.walk(region);
        let BlockRenderer { blocks, headings } = renderer;
        let content = blocks.join("\n\n");
        if content.trim().is_empty() {
            return Err(ExtractError::MissingContentRegion);
        }

        let (links, internal_links, external_links) =
            collect_links(region, &self.anchors, page_url);

        let title = if title_tag.is_empty() {
            headings.first().cloned().unwrap_or_default()
        } else {
            title_tag
        };

        Ok(ExtractedPage {
            title,
            content,
            description,
            headings,
            links,
            internal_links,
            external_links,
        })
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct BlockRenderer {
    blocks: Vec<String>,
    headings: Vec<String>,
}

impl BlockRenderer {
    fn walk(&mut self, root: ElementRef<'_>) {
        for element in root.descendent_elements() {
            self.maybe_record(element);
        }
    }

    fn maybe_record(&mut self, element: ElementRef<'_>) {
        let tag = element.value().name();
        let block = match tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = (tag.as_bytes()[1] - b'0') as usize;
                let text = collapse_whitespace(&element_text(&element));
                if text.is_empty() {
                    return;
                }
                self.headings.push(text.clone());
                format!("{} {text}", "#".repeat(level))
            }
            "p" => {
                // Parent blocks already carry this text.
                if nested_in(&element, &["li", "blockquote", "figure"]) {
                    return;
                }
                let text = collapse_whitespace(&element_text(&element));
                if text.is_empty() {
                    return;
                }
                text
            }
            "li" => {
                if nested_in(&element, &["li"]) {
                    return;
                }
                let text = collapse_whitespace(&element_text(&element));
                if text.is_empty() {
                    return;
                }
                format!("- {text}")
            }
            "blockquote" => {
                if nested_in(&element, &["blockquote", "li"]) {
                    return;
                }
                let text = collapse_whitespace(&element_text(&element));
                if text.is_empty() {
                    return;
                }
                format!("> {text}")
            }
            "pre" => {
                let text = collapse_newlines(&element_text(&element));
                if text.is_empty() {
                    return;
                }
                let language = code_language(&element).unwrap_or_default();
                format!("```{language}\n{text}\n```")
            }
            _ => return,
        };
        self.blocks.push(block);
    }
}

fn nested_in(element: &ElementRef<'_>, tags: &[&str]) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| tags.contains(&ancestor.value().name()))
}

fn code_language(element: &ElementRef<'_>) -> Option<String> {
    std::iter::once(*element)
        .chain(element.descendent_elements())
        .find_map(|el| {
            el.value().attr("class").and_then(|classes| {
                classes.split_whitespace().find_map(|token| {
                    token
                        .strip_prefix("language-")
                        .or_else(|| token.strip_prefix("lang-"))
                        .map(|language| language.to_string())
                })
            })
        })
}

fn collect_links(
    region: ElementRef<'_>,
    anchors: &Selector,
    page_url: &Url,
) -> (Vec<String>, Vec<LinkRef>, Vec<LinkRef>) {
    let mut all = Vec::new();
    let mut internal = Vec::new();
    let mut external = Vec::new();
    let page_host = page_url.host_str().unwrap_or_default();

    for anchor in region.select(anchors) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = page_url.join(href) else {
            continue;
        };
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }
        let link = LinkRef {
            url: resolved.to_string(),
            text: collapse_whitespace(&element_text(&anchor)),
        };
        all.push(link.url.clone());
        if resolved.host_str().unwrap_or_default() == page_host {
            internal.push(link);
        } else {
            external.push(link);
        }
    }

    (all, internal, external)
}

fn element_text(element: &ElementRef<'_>) -> String {
    let mut raw = String::new();
    for piece in element.text() {
        raw.push_str(piece);
    }
    raw
}

fn collapse_whitespace(input: &str) -> String {
    let mut buf = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_space && !buf.is_empty() {
                buf.push(' ');
            }
            last_space = true;
        } else {
            buf.push(ch);
            last_space = false;
        }
    }
    buf.trim().to_string()
}

fn collapse_newlines(input: &str) -> String {
    let mut lines = Vec::new();
    for line in input.lines() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            continue;
        }
        lines.push(trimmed.to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(markup: &str) -> ExtractedPage {
        let url = Url::parse("https://docs.example.com/guide/intro").expect("url");
        ContentExtractor::new()
            .extract(markup, &url)
            .expect("extract")
    }

    #[test]
    fn strips_boilerplate_and_picks_main() {
        let markup = r#"
            <html><head><title>Intro Guide</title></head><body>
              <nav><a href="/everywhere">Nav link</a></nav>
              <main>
                <h1>Introduction</h1>
                <p>Welcome to the docs.</p>
              </main>
              <footer>copyright</footer>
            </body></html>
        "#;
        let page = extract(markup);
        assert_eq!(page.title, "Intro Guide");
        assert_eq!(page.content, "# Introduction\n\nWelcome to the docs.");
        assert!(page.links.is_empty());
        assert!(!page.content.contains("copyright"));
    }

    #[test]
    fn renders_lists_quotes_and_fenced_code() {
        let markup = r#"
            <html><body><main>
              <h2>Usage</h2>
              <ul><li>First step</li><li>Second step</li></ul>
              <blockquote>Keep configs small.</blockquote>
              <pre><code class="language-js">const x = 1;
console.log(x);</code></pre>
            </main></body></html>
        "#;
        let page = extract(markup);
        assert_eq!(
            page.content,
            "## Usage\n\n- First step\n\n- Second step\n\n> Keep configs small.\n\n\
             ```js\nconst x = 1;\nconsole.log(x);\n```"
        );
        assert_eq!(page.headings, vec!["Usage".to_string()]);
    }

    #[test]
    fn partitions_links_by_host() {
        let markup = r#"
            <html><body><main>
              <p>See <a href="/guide/next">next page</a> and
                 <a href="https://github.com/example/repo">the repo</a>.</p>
              <p><a href="mailto:docs@example.com">mail us</a></p>
            </main></body></html>
        "#;
        let page = extract(markup);
        assert_eq!(page.links.len(), 2);
        assert_eq!(page.internal_links.len(), 1);
        assert_eq!(
            page.internal_links[0].url,
            "https://docs.example.com/guide/next"
        );
        assert_eq!(page.external_links.len(), 1);
        assert_eq!(page.external_links[0].text, "the repo");
    }

    #[test]
    fn title_falls_back_to_first_heading() {
        let markup = "<html><body><main><h1>Fallback Title</h1><p>body</p></main></body></html>";
        let page = extract(markup);
        assert_eq!(page.title, "Fallback Title");
    }

    #[test]
    fn reads_meta_description() {
        let markup = r#"
            <html><head><meta name="description" content="  A short summary.  "></head>
            <body><main><p>text</p></main></body></html>
        "#;
        let page = extract(markup);
        assert_eq!(page.description, "A short summary.");
    }

    #[test]
    fn empty_region_is_an_error() {
        let url = Url::parse("https://docs.example.com/empty").expect("url");
        let err = ContentExtractor::new()
            .extract("<html><body><main></main></body></html>", &url)
            .expect_err("missing content");
        assert_eq!(err, ExtractError::MissingContentRegion);
    }

    #[test]
    fn ordered_candidates_prefer_main_over_body() {
        let markup = r#"
            <html><body>
              <p>outside</p>
              <main><p>inside</p></main>
            </body></html>
        "#;
        let page = extract(markup);
        assert_eq!(page.content, "inside");
    }
}
