use crate::url::ReferenceScope;
use url::Url;

/// Resolves an in-document reference against the base URL
///
/// Returns None if the reference is out of scope:
/// - empty or fragment-only references (same page anchors)
/// - under [`ReferenceScope::Prefix`], anything carrying its own scheme
///   (`https:`, `data:`, `mailto:`, ...)
/// - under [`ReferenceScope::SameOrigin`], anything that resolves to a
///   different origin than the base
pub fn resolve_reference(reference: &str, base_url: &Url, scope: ReferenceScope) -> Option<Url> {
    let reference = reference.trim();

    if reference.is_empty() || reference.starts_with('#') {
        return None;
    }

    match scope {
        ReferenceScope::Prefix => {
            if has_explicit_scheme(reference) {
                return None;
            }
            base_url.join(reference).ok()
        }
        ReferenceScope::SameOrigin => {
            let resolved = base_url.join(reference).ok()?;
            if resolved.origin() == base_url.origin() {
                Some(resolved)
            } else {
                None
            }
        }
    }
}

/// A reference that parses without a base carries its own scheme
fn has_explicit_scheme(reference: &str) -> bool {
    Url::parse(reference).is_ok()
}

/// Archive name for a fetched resource
///
/// Taken from the final path segment of the reference as written in the
/// document, so `css/main.css` and `vendor/main.css` share the name
/// `main.css`. Query and fragment are dropped. When that segment is not a
/// usable file name (empty, `.`, `..`, or containing a backslash) the
/// resolved URL's last non-empty segment is used instead.
pub fn leaf_name(reference: &str, resolved: &Url) -> Option<String> {
    let path = reference
        .trim()
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    match path.rsplit('/').next() {
        Some(leaf) if is_file_name(leaf) => Some(leaf.to_string()),
        _ => resolved
            .path_segments()?
            .filter(|segment| is_file_name(segment))
            .last()
            .map(str::to_string),
    }
}

/// A single flat archive member name
fn is_file_name(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".." && !segment.contains('\\')
}
