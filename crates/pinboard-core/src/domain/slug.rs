//! Deterministic slug derivation.
//!
//! Slugs are computed once, at post creation, and never recomputed. There
//! is no collision retry: a duplicate slug is rejected by the store's
//! unique constraint and surfaces to the caller as a conflict.

/// Derive a URL-safe slug from a title.
///
/// Whitespace runs become single hyphens, the result is lowercased, and
/// every character outside `[a-z0-9-]` is stripped. A title with no
/// slug-safe characters yields an empty string; callers must treat that
/// as a validation failure rather than persist it.
pub fn generate_slug(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}
