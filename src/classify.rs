//! URL and content heuristics for documentation classification.

/// Labels attached to every assembled document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Product version label.
    pub version: String,
    /// Framework label.
    pub framework: String,
    /// Documentation category.
    pub doc_type: String,
    /// Lowercased heading keywords, at most ten.
    pub keywords: Vec<String>,
    /// First heading text, empty when the page has none.
    pub section: String,
}

/// Classifies a page from its URL and normalized content.
///
/// Pure and total: every input yields a classification, unknown inputs fall
/// back to the default labels.
pub fn classify(url: &str, content: &str) -> Classification {
    let url_lower = url.to_lowercase();
    let content_lower = content.to_lowercase();
    let headings = markdown_headings(content);

    Classification {
        version: detect_version(&url_lower),
        framework: detect_framework(&url_lower, &content_lower),
        doc_type: detect_doc_type(&url_lower),
        keywords: headings
            .iter()
            .take(10)
            .map(|heading| heading.to_lowercase())
            .collect(),
        section: headings.first().cloned().unwrap_or_default(),
    }
}

fn detect_version(url_lower: &str) -> String {
    if url_lower.contains("/v3/") {
        "3.x".to_string()
    } else {
        "4.x".to_string()
    }
}

// Order matters: astro wins over vue, and nunjucks is URL-only.
fn detect_framework(url_lower: &str, content_lower: &str) -> String {
    if url_lower.contains("astro") || content_lower.contains("astro") {
        "astro".to_string()
    } else if url_lower.contains("vue") || content_lower.contains("vue") {
        "vue".to_string()
    } else if url_lower.contains("nunjucks") {
        "nunjucks".to_string()
    } else {
        "core".to_string()
    }
}

fn detect_doc_type(url_lower: &str) -> String {
    if url_lower.contains("/reference/") || url_lower.contains("/api/") {
        "reference".to_string()
    } else if url_lower.contains("/tutorial/") {
        "tutorial".to_string()
    } else if url_lower.contains("/migration/") {
        "migration".to_string()
    } else {
        "guide".to_string()
    }
}

/// Collects heading texts from markdown-style content in document order.
///
/// Lines inside fenced code blocks are ignored so shell comments do not
/// register as headings.
pub fn markdown_headings(content: &str) -> Vec<String> {
    let mut headings = Vec::new();
    let mut in_fence = false;
    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence || !trimmed.starts_with('#') {
            continue;
        }
        let text = trimmed.trim_start_matches('#').trim();
        if !text.is_empty() {
            headings.push(text.to_string());
        }
    }
    headings
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_apply_to_unremarkable_pages() {
        let result = classify("https://docs.example.com/start", "plain text");
        assert_eq!(result.version, "4.x");
        assert_eq!(result.framework, "core");
        assert_eq!(result.doc_type, "guide");
        assert!(result.keywords.is_empty());
        assert_eq!(result.section, "");
    }

    #[test]
    fn v3_path_segment_selects_the_legacy_version() {
        let result = classify("https://docs.example.com/v3/guide", "");
        assert_eq!(result.version, "3.x");
        let result = classify("https://docs.example.com/v3x/guide", "");
        assert_eq!(result.version, "4.x");
    }

    #[test]
    fn astro_outranks_vue_when_both_appear() {
        let result = classify(
            "https://docs.example.com/guide",
            "Using Vue components inside Astro islands",
        );
        assert_eq!(result.framework, "astro");
    }

    #[test]
    fn vue_is_detected_from_content_alone() {
        let result = classify("https://docs.example.com/guide", "A Vue integration");
        assert_eq!(result.framework, "vue");
    }

    #[test]
    fn nunjucks_is_url_only() {
        let result = classify("https://docs.example.com/nunjucks/filters", "");
        assert_eq!(result.framework, "nunjucks");
        let result = classify("https://docs.example.com/guide", "nunjucks templates");
        assert_eq!(result.framework, "core");
    }

    #[test]
    fn doc_type_follows_path_segments() {
        assert_eq!(classify("https://d/reference/cli", "").doc_type, "reference");
        assert_eq!(classify("https://d/api/config", "").doc_type, "reference");
        assert_eq!(classify("https://d/tutorial/first", "").doc_type, "tutorial");
        assert_eq!(classify("https://d/migration/v4", "").doc_type, "migration");
        assert_eq!(classify("https://d/concepts", "").doc_type, "guide");
    }

    #[test]
    fn keywords_take_the_first_ten_headings_lowercased() {
        let content = (1..=12)
            .map(|n| format!("# Heading {n}\nbody"))
            .collect::<Vec<_>>()
            .join("\n");
        let result = classify("https://docs.example.com/guide", &content);
        assert_eq!(result.keywords.len(), 10);
        assert_eq!(result.keywords[0], "heading 1");
        assert_eq!(result.section, "Heading 1");
    }

    #[test]
    fn fenced_code_lines_are_not_headings() {
        let content = "# Real Heading\n```sh\n# just a comment\n```\n## Second";
        assert_eq!(
            markdown_headings(content),
            vec!["Real Heading".to_string(), "Second".to_string()]
        );
    }
}
