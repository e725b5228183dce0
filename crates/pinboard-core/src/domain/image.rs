//! Image reference resolution.
//!
//! A post always carries a resolvable `image` URL. The value is chosen by
//! an ordered candidate list rather than nested branching, so the
//! precedence is auditable in one place:
//!
//! 1. a file uploaded in this request (its stored URL),
//! 2. an explicit `image` URL supplied in the request body,
//! 3. the post's current value (updates only),
//! 4. the fixed default fallback.

/// Fallback image used when a post has no upload and no explicit URL.
pub const DEFAULT_POST_IMAGE: &str =
    "https://images.static-collegedunia.com/public/college_data/images/campusimage/151937286431.JPG";

/// Resolve the final `image` value for a post. First non-empty candidate
/// wins; empty strings count as absent.
pub fn resolve_image(
    uploaded: Option<String>,
    provided: Option<String>,
    existing: Option<String>,
) -> String {
    [uploaded, provided, existing]
        .into_iter()
        .flatten()
        .find(|candidate| !candidate.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_POST_IMAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn creation_with_nothing_falls_back_to_default() {
        assert_eq!(resolve_image(None, None, None), DEFAULT_POST_IMAGE);
    }

    #[test]
    fn explicit_url_is_preserved_when_no_upload() {
        assert_eq!(
            resolve_image(None, s("https://cdn.example.com/pic.png"), None),
            "https://cdn.example.com/pic.png"
        );
    }

    #[test]
    fn upload_wins_over_explicit_url() {
        assert_eq!(
            resolve_image(
                s("https://api.example.com/uploads/pic-17.png"),
                s("https://cdn.example.com/pic.png"),
                None
            ),
            "https://api.example.com/uploads/pic-17.png"
        );
    }

    #[test]
    fn update_without_new_image_keeps_existing() {
        assert_eq!(
            resolve_image(None, None, s("https://cdn.example.com/old.png")),
            "https://cdn.example.com/old.png"
        );
    }

    #[test]
    fn empty_candidates_are_skipped() {
        assert_eq!(
            resolve_image(None, s("  "), s("https://cdn.example.com/old.png")),
            "https://cdn.example.com/old.png"
        );
        assert_eq!(resolve_image(s(""), s(""), None), DEFAULT_POST_IMAGE);
    }
}
