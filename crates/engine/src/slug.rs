//! URL slugs for category labels and participant names.

/// Builds a URL-safe slug: lowercase, runs of anything that is not a letter
/// or digit become a single `-`, leading/trailing `-` trimmed.
///
/// Unicode letters survive (no transliteration), so a slug can be turned back
/// into a display name by replacing `-` with spaces and re-normalizing.
///
/// # Examples
///
/// ```rust
/// use engine::slug::slugify;
///
/// assert_eq!(slugify("Trasporti "), "trasporti");
/// assert_eq!(slugify("Cibo & Bevande"), "cibo-bevande");
/// assert_eq!(slugify("Città visitate"), "città-visitate");
/// ```
#[must_use]
pub fn slugify(label: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;

    for ch in label.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            for lower in ch.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_dash = true;
        }
    }

    slug
}
