//! Title and product-image extraction from untrusted product-page HTML.
//!
//! Matching is regex-based and tolerant: malformed markup yields `None` or an
//! empty title, never an error. Callers treat a miss as "try the next candidate".

use std::sync::LazyLock;

use regex::Regex;

use crate::client::extract_origin;

static IMG_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<img\b[^>]*>").expect("valid regex"));
static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid regex"));
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title>").expect("valid regex"));
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("valid attr regex")
});
static NUMERIC_ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&#(?:[xX]([0-9a-fA-F]{1,6})|([0-9]{1,7}));").expect("valid entity regex")
});

/// Class-name fragments that mark an `<img>` as the product shot.
const IMAGE_CLASS_KEYWORDS: [&str; 5] = ["product", "main", "image", "photo", "picture"];

/// Pulls a title and a product image out of a page.
///
/// Implementations must be pure and safe to share across requests.
pub trait PageExtractor: Send + Sync {
    /// Returns `""` when the page has no usable title.
    fn extract_title(&self, html: &str) -> String;

    /// Returns an absolute (or protocol-relative) image URL, resolved against
    /// `page_url`, or `None` when nothing image-like is found.
    fn extract_image(&self, html: &str, page_url: &str) -> Option<String>;
}

/// Default [`PageExtractor`]: Open Graph tags first, markup fallbacks second.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexExtractor;

impl PageExtractor for RegexExtractor {
    fn extract_title(&self, html: &str) -> String {
        find_meta_content(html, "og:title")
            .or_else(|| {
                TITLE_RE
                    .captures(html)
                    .and_then(|c| c.get(1))
                    .map(|m| decode_entities(m.as_str()))
            })
            .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default()
    }

    fn extract_image(&self, html: &str, page_url: &str) -> Option<String> {
        let raw = find_meta_content(html, "og:image").or_else(|| find_product_img_src(html))?;
        resolve_image_url(page_url, &raw)
    }
}

fn find_product_img_src(html: &str) -> Option<String> {
    IMG_TAG_RE.find_iter(html).find_map(|m| {
        let tag = m.as_str();
        let class = extract_attr(tag, "class")?.to_lowercase();
        if !IMAGE_CLASS_KEYWORDS.iter().any(|k| class.contains(k)) {
            return None;
        }
        extract_attr(tag, "src")
            .filter(|s| !s.is_empty())
            .or_else(|| extract_attr(tag, "data-src").filter(|s| !s.is_empty()))
    })
}

/// Finds `<meta property|name="{key}" content="...">`.
fn find_meta_content(html: &str, key: &str) -> Option<String> {
    META_TAG_RE.find_iter(html).find_map(|m| {
        let tag = m.as_str();
        let matches_key = ["property", "name"]
            .iter()
            .filter_map(|attr| extract_attr(tag, attr))
            .any(|v| v.eq_ignore_ascii_case(key));
        if matches_key {
            extract_attr(tag, "content").filter(|c| !c.is_empty())
        } else {
            None
        }
    })
}

/// Reads a quoted attribute value from a single tag, entity-decoded and trimmed.
pub(crate) fn extract_attr(tag: &str, attr: &str) -> Option<String> {
    ATTR_RE.captures_iter(tag).find_map(|c| {
        let name = c.get(1)?.as_str();
        if !name.eq_ignore_ascii_case(attr) {
            return None;
        }
        let value = c.get(2).or_else(|| c.get(3))?.as_str();
        Some(decode_entities(value).trim().to_string())
    })
}

pub(crate) fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let named = s
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ");
    // `&amp;` last so `&amp;#233;` stays a literal `&#233;`.
    NUMERIC_ENTITY_RE
        .replace_all(&named, |c: &regex::Captures<'_>| {
            let code = match (c.get(1), c.get(2)) {
                (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
                (None, Some(dec)) => dec.as_str().parse::<u32>().ok(),
                (None, None) => None,
            };
            code.and_then(char::from_u32)
                .map_or_else(|| c[0].to_string(), String::from)
        })
        .replace("&amp;", "&")
}

/// Makes an extracted image URL usable from outside the page.
///
/// Absolute and protocol-relative URLs pass through unchanged. Root-relative
/// paths are prefixed with the page origin; other relative paths are joined
/// against the page URL.
#[must_use]
pub fn resolve_image_url(page_url: &str, raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with("//") || reqwest::Url::parse(raw).is_ok() {
        return Some(raw.to_string());
    }
    if raw.starts_with('/') {
        return extract_origin(page_url).map(|origin| format!("{origin}{raw}"));
    }
    let base = reqwest::Url::parse(page_url).ok()?;
    base.join(raw).ok().map(|u| u.to_string())
}
