//! Asset locator for finding subresource references in a document
//!
//! This module scans a parsed HTML document for:
//! - Stylesheet links (`<link rel="stylesheet" href>`)
//! - Scripts (`<script src>`)
//! - Images and media sources (`<img src>`, `<source src>`, `<audio src>`, `<video src>`)
//! - Vector graphic references (`href` on `<svg>`, `<svg><image>`, `<svg><use>`)
//! - Icons (`<link rel="icon" href>`)
//!
//! and resolves the in-scope references against the base URL.

use crate::bundler::fetcher::BodyKind;
use crate::url::{resolve_reference, ReferenceScope};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Category of a located subresource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Stylesheet,
    Script,
    Image,
    MediaSource,
    VectorGraphic,
    Icon,
}

/// Collection bucket an asset lands in once fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Html,
    Css,
    Js,
    Binary,
}

impl AssetKind {
    /// Returns the bucket a fetched asset of this kind is appended to
    pub fn bucket(&self) -> Bucket {
        match self {
            Self::Stylesheet => Bucket::Css,
            Self::Script => Bucket::Js,
            Self::Image | Self::MediaSource | Self::VectorGraphic | Self::Icon => Bucket::Binary,
        }
    }

    /// Returns how the response body should be read
    pub fn body_kind(&self) -> BodyKind {
        match self.bucket() {
            Bucket::Html | Bucket::Css | Bucket::Js => BodyKind::Text,
            Bucket::Binary => BodyKind::Binary,
        }
    }

    /// Name used when the reference has no usable final path segment
    pub fn fallback_name(&self) -> &'static str {
        match self {
            Self::Stylesheet => "style.css",
            Self::Script => "script.js",
            Self::Image | Self::MediaSource | Self::VectorGraphic | Self::Icon => "asset",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stylesheet => "stylesheet",
            Self::Script => "script",
            Self::Image => "image",
            Self::MediaSource => "media",
            Self::VectorGraphic => "svg",
            Self::Icon => "icon",
        }
    }
}

/// A subresource reference found in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedAsset {
    pub kind: AssetKind,

    /// The attribute value as written in the document
    pub reference: String,

    /// The reference resolved against the base URL
    pub url: Url,
}

/// One selector/attribute pair the locator scans for
struct LocatorRule {
    selector: &'static str,
    attribute: &'static str,
    kind: AssetKind,
    /// Required token in the element's `rel` attribute
    rel: Option<&'static str>,
}

const RULES: &[LocatorRule] = &[
    LocatorRule {
        selector: "link[href]",
        attribute: "href",
        kind: AssetKind::Stylesheet,
        rel: Some("stylesheet"),
    },
    LocatorRule {
        selector: "script[src]",
        attribute: "src",
        kind: AssetKind::Script,
        rel: None,
    },
    LocatorRule {
        selector: "img[src]",
        attribute: "src",
        kind: AssetKind::Image,
        rel: None,
    },
    LocatorRule {
        selector: "source[src], audio[src], video[src]",
        attribute: "src",
        kind: AssetKind::MediaSource,
        rel: None,
    },
    // Matched by local name so both `href` and `xlink:href` are found
    LocatorRule {
        selector: "svg, svg image, svg use",
        attribute: "href",
        kind: AssetKind::VectorGraphic,
        rel: None,
    },
    LocatorRule {
        selector: "link[href]",
        attribute: "href",
        kind: AssetKind::Icon,
        rel: Some("icon"),
    },
];

/// Parses HTML content and locates the subresources to fetch
///
/// Results are grouped by category (stylesheets, scripts, images, media,
/// vector graphics, icons) and in document order within each category.
/// The order carries no meaning downstream.
///
/// # Example
///
/// ```
/// use web_code_bundler::bundler::{locate_assets, AssetKind};
/// use web_code_bundler::ReferenceScope;
/// use url::Url;
///
/// let html = r#"<link rel="stylesheet" href="css/site.css"><script src="https://cdn.test/x.js"></script>"#;
/// let base = Url::parse("https://example.com/").unwrap();
/// let assets = locate_assets(html, &base, ReferenceScope::Prefix);
/// assert_eq!(assets.len(), 1);
/// assert_eq!(assets[0].kind, AssetKind::Stylesheet);
/// assert_eq!(assets[0].url.as_str(), "https://example.com/css/site.css");
/// ```
pub fn locate_assets(html: &str, base_url: &Url, scope: ReferenceScope) -> Vec<LocatedAsset> {
    let document = Html::parse_document(html);
    let mut assets = Vec::new();

    for rule in RULES {
        let selector = match Selector::parse(rule.selector) {
            Ok(selector) => selector,
            Err(e) => {
                tracing::error!("Invalid selector '{}': {:?}", rule.selector, e);
                continue;
            }
        };

        for element in document.select(&selector) {
            if let Some(token) = rule.rel {
                if !has_rel_token(&element, token) {
                    continue;
                }
            }

            let Some(reference) = attribute_value(&element, rule.attribute) else {
                continue;
            };

            match resolve_reference(reference, base_url, scope) {
                Some(url) => assets.push(LocatedAsset {
                    kind: rule.kind,
                    reference: reference.trim().to_string(),
                    url,
                }),
                None => {
                    tracing::debug!("Skipping out-of-scope {} reference: {}", rule.kind.as_str(), reference);
                }
            }
        }
    }

    assets
}

/// Looks an attribute up by local name, ignoring its namespace
fn attribute_value<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    element
        .value()
        .attrs()
        .find(|(attr, _)| *attr == name)
        .map(|(_, value)| value)
}

/// Checks the space-separated `rel` attribute for a token
fn has_rel_token(element: &ElementRef<'_>, token: &str) -> bool {
    element
        .value()
        .attr("rel")
        .map(|rel| {
            rel.split_ascii_whitespace()
                .any(|t| t.eq_ignore_ascii_case(token))
        })
        .unwrap_or(false)
}
