/// Current UTC time in epoch milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Fallback slug when a name contains no ASCII alphanumerics.
pub const DEFAULT_SLUG: &str = "category";

/// Derive a URL-safe slug from a human-readable name.
///
/// ASCII letters and digits are kept (lower-cased); every other run of
/// characters collapses into a single `-`. Leading and trailing separators
/// are dropped.
///
/// ```
/// assert_eq!(shared::util::slugify("Phones & Tablets"), "phones-tablets");
/// assert_eq!(shared::util::slugify("  --Hi--  "), "hi");
/// ```
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Same as [`slugify`] but never returns an empty string.
pub fn slugify_or_default(input: &str) -> String {
    let slug = slugify(input);
    if slug.is_empty() {
        DEFAULT_SLUG.to_string()
    } else {
        slug
    }
}
