//! Non-crawl ingestion adapters: documentation dumps and API specifications.

pub mod dump;
pub mod openapi;

/// Lowercases and collapses non-alphanumerics to single dashes.
pub(crate) fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_collapse_punctuation_runs() {
        assert_eq!(slugify("Getting Started: The Basics!"), "getting-started-the-basics");
        assert_eq!(slugify("  /pets/{petId}  "), "pets-petid");
        assert_eq!(slugify("___"), "");
    }
}
