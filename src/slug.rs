//! URL-safe identifiers derived from titles/names.
//!
//! Uniqueness is not this module's concern: colliding slugs surface as a
//! unique-constraint violation from the store, with no auto-suffixing.

pub const ARTICLE_SLUG_MAX: usize = 220;
pub const CATEGORY_SLUG_MAX: usize = 150;
pub const THREAD_SLUG_MAX: usize = 300;

/// Lowercase the source, collapse every run of non-alphanumeric characters
/// into a single hyphen, strip edge hyphens, and cap at `max_len`. The cap
/// is applied before the trailing-hyphen strip on purpose: a truncated slug
/// must never end in a hyphen either.
/// Already-normalized input passes through unchanged apart from truncation.
pub fn slugify(source: &str, max_len: usize) -> String {
    let mut out = String::with_capacity(source.len().min(max_len));
    let mut pending_separator = false;
    for ch in source.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !out.is_empty() {
                out.push('-');
            }
            pending_separator = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    if out.len() > max_len {
        out.truncate(max_len);
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_punctuation_runs() {
        assert_eq!(
            slugify("Hello, World!  Bees & Honey", ARTICLE_SLUG_MAX),
            "hello-world-bees-honey"
        );
    }

    #[test]
    fn trims_edge_separators() {
        assert_eq!(slugify("--Rust 2026--", ARTICLE_SLUG_MAX), "rust-2026");
    }

    #[test]
    fn idempotent_on_normalized_input() {
        let once = slugify("A Deep Dive into Lifetimes", ARTICLE_SLUG_MAX);
        assert_eq!(slugify(&once, ARTICLE_SLUG_MAX), once);
    }

    #[test]
    fn truncates_without_trailing_hyphen() {
        let long = "word ".repeat(100);
        let slug = slugify(&long, 12);
        assert_eq!(slug, "word-word-wo");
        let slug = slugify(&long, 10);
        assert_eq!(slug, "word-word");
    }

    #[test]
    fn non_ascii_only_input_yields_empty() {
        assert_eq!(slugify("日本語のタイトル", ARTICLE_SLUG_MAX), "");
    }
}
