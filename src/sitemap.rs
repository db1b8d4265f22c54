//! Tolerant location extraction from sitemap payloads.

use regex::Regex;
use std::sync::OnceLock;

static LOC_PATTERN: OnceLock<Regex> = OnceLock::new();

fn loc_pattern() -> &'static Regex {
    LOC_PATTERN.get_or_init(|| Regex::new(r"(?is)<loc>\s*(.*?)\s*</loc>").expect("loc pattern"))
}

/// Extracts `<loc>` values from sitemap markup in document order.
///
/// Pattern-based rather than a strict XML parse, so superficially malformed
/// sitemaps still yield their locations. Empty entries are dropped.
pub fn extract_locations(body: &str) -> Vec<String> {
    loc_pattern()
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|loc| loc.as_str().trim().to_string())
        .filter(|loc| !loc.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_locations_in_order() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://docs.example.com/</loc></url>
  <url><loc>https://docs.example.com/guide</loc></url>
</urlset>"#;
        assert_eq!(
            extract_locations(body),
            vec![
                "https://docs.example.com/".to_string(),
                "https://docs.example.com/guide".to_string(),
            ]
        );
    }

    #[test]
    fn tolerates_malformed_markup() {
        let body = "<urlset><url><loc>\n  https://docs.example.com/a\n</loc>\
                    <url><LOC>https://docs.example.com/b</LOC>";
        assert_eq!(
            extract_locations(body),
            vec![
                "https://docs.example.com/a".to_string(),
                "https://docs.example.com/b".to_string(),
            ]
        );
    }

    #[test]
    fn drops_empty_entries() {
        let body = "<loc></loc><loc>   </loc><loc>https://docs.example.com/x</loc>";
        assert_eq!(
            extract_locations(body),
            vec!["https://docs.example.com/x".to_string()]
        );
    }

    #[test]
    fn no_locations_yields_empty_list() {
        assert!(extract_locations("<html><body>not a sitemap</body></html>").is_empty());
    }
}
