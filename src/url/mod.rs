//! URL helpers for Story-Harvest
//!
//! This module resolves scraped hrefs, derives item identifiers from
//! locators, and expands the listing/chapter URL templates.

use url::Url;

/// Derives an item identifier from the last non-empty path segment of a locator
///
/// Query strings and fragments are ignored.
///
/// # Examples
///
/// ```
/// use story_harvest::url::derive_item_id;
///
/// assert_eq!(
///     derive_item_id("https://example.com/manga/one-piece/"),
///     Some("one-piece".to_string())
/// );
/// assert_eq!(derive_item_id("https://example.com/"), None);
/// ```
pub fn derive_item_id(locator: &str) -> Option<String> {
    let path = match Url::parse(locator) {
        Ok(url) => url.path().to_string(),
        Err(_) => locator
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    path.split('/')
        .rev()
        .find(|segment| !segment.is_empty())
        .map(|segment| segment.to_string())
}

/// Resolves an href against a base URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

/// Expands the listing URL template for one page
pub fn listing_url(template: &str, page: u32) -> String {
    template.replace("{page}", &page.to_string())
}

/// Expands the chapter URL template for one item and chapter index
///
/// `{item}` is replaced by the item locator without its trailing slash.
pub fn chapter_url(template: &str, locator: &str, index: u32) -> String {
    template
        .replace("{item}", locator.trim_end_matches('/'))
        .replace("{index}", &index.to_string())
}

/// Returns true for site chrome that shows up among chapter images
///
/// Only whole path segments are inspected: an `icon(s)`/`logo(s)` directory,
/// or a file named `logo*` or `favicon*`. Item slugs that merely contain
/// these words are kept.
pub fn is_decorative_image(url: &str) -> bool {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_lowercase(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_lowercase(),
    };

    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let Some(file) = segments.pop() else {
        return false;
    };

    let decorative_dir = segments
        .iter()
        .any(|dir| matches!(*dir, "icon" | "icons" | "logo" | "logos"));

    decorative_dir || file.starts_with("logo") || file.starts_with("favicon")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/manga/solo").unwrap()
    }

    #[test]
    fn test_derive_id_strips_query() {
        assert_eq!(
            derive_item_id("https://example.com/manga/solo?ref=home#top"),
            Some("solo".to_string())
        );
    }

    #[test]
    fn test_derive_id_from_relative_path() {
        assert_eq!(derive_item_id("/manga/solo/"), Some("solo".to_string()));
        assert_eq!(derive_item_id(""), None);
    }

    #[test]
    fn test_resolve_relative_link() {
        assert_eq!(
            resolve_link("/manga/other", &base_url()),
            Some("https://example.com/manga/other".to_string())
        );
    }

    #[test]
    fn test_resolve_protocol_relative_link() {
        assert_eq!(
            resolve_link("//cdn.example.com/1.jpg", &base_url()),
            Some("https://cdn.example.com/1.jpg".to_string())
        );
    }

    #[test]
    fn test_skip_special_schemes() {
        assert_eq!(resolve_link("javascript:void(0)", &base_url()), None);
        assert_eq!(resolve_link("mailto:a@example.com", &base_url()), None);
        assert_eq!(resolve_link("data:image/png;base64,AAAA", &base_url()), None);
        assert_eq!(resolve_link("#chapters", &base_url()), None);
        assert_eq!(resolve_link("   ", &base_url()), None);
    }

    #[test]
    fn test_listing_url() {
        assert_eq!(
            listing_url("https://example.com/list/{page}/?sort=new", 7),
            "https://example.com/list/7/?sort=new"
        );
    }

    #[test]
    fn test_chapter_url() {
        assert_eq!(
            chapter_url("{item}/chapter-{index}", "https://example.com/manga/solo/", 3),
            "https://example.com/manga/solo/chapter-3"
        );
    }

    #[test]
    fn test_decorative_images() {
        assert!(is_decorative_image("https://example.com/static/logo.png"));
        assert!(is_decorative_image("https://example.com/favicon.ico"));
        assert!(is_decorative_image("https://example.com/icons/star.svg"));
        assert!(!is_decorative_image("https://cdn.example.com/solo/1/001.jpg"));
    }

    #[test]
    fn test_slugs_containing_marker_words_are_kept() {
        assert!(!is_decorative_image(
            "https://cdn.example.com/silicon-valley/1/001.jpg"
        ));
        assert!(!is_decorative_image("https://cdn.example.com/iconic-hero/2/003.png"));
        assert!(!is_decorative_image("https://cdn.example.com/logo-ninja/1/001.jpg"));
        assert!(is_decorative_image("https://cdn.example.com/Static/Logo-Dark.PNG"));
        assert!(is_decorative_image("/assets/logos/site.png"));
    }
}
