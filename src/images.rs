//! Picking a picture for an item.
//!
//! Lookup never fails: a name rule wins, then (for [`RemoteImageLookup`]) an
//! Unsplash search, then the category image, then the generic "Other" image.
//! The UI falls back to [`placeholder`] when a picture cannot be shown.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::Result;

pub trait ImageLookup {
    fn lookup(&self, name: &str, category: &str) -> String;
}

const UNSPLASH: &str = "https://images.unsplash.com/photo-";
const SIZING: &str = "?auto=format&fit=crop&w=500&q=80";

/// (pattern, photo id) in priority order.
const NAME_RULES: &[(&str, &str)] = &[
    (r"\b(diamond|ring|jewel|jewellery|jewelry)\b", "1617038220319-276d3cfab638"),
    (r"\bbuttons?\b", "1598033129183-c4f50c736f10"),
    (r"mobile cover|phone cover|phone case|case", "1601593346740-925612772716"),
    (r"bouquet|flower|floral", "1520763185298-1b434c919102"),
    (r"iphone|phone|mobile", "1603891128711-11b4b03bb138"),
    (r"monitor|display|screen", "1527443224154-c4a3942d3acf"),
    (r"study table|table|desk", "1518455027359-f3f8164ba6bd"),
    (r"chair", "1503602642458-232111445657"),
    (r"denim|jacket", "1548883354-94bcfe321cbb"),
    (r"shoes?|sneaker", "1542291026-7eec264c27ff"),
    (r"bicycle|bike|cycle", "1507035895480-2b3156c31fc8"),
    (r"book", "1495446815901-a7297e633e8d"),
    (r"speaker", "1589003077984-894e133dabab"),
    (r"cricket|kit", "1624526267942-ab0ff8a3e972"),
    (r"disk|hdd|ssd|drive", "1518770660439-4636190af475"),
    (r"dabba|box|storage|container", "1588854337236-6889d631faa8"),
];

const CATEGORY_IMAGES: &[(&str, &str)] = &[
    ("Electronics", "1550009158-9ebf69173e03"),
    ("Furniture", "1555041469-a586c61ea9bc"),
    ("Fashion", "1445205170230-053b83016050"),
    ("Books", "1481627834876-b7833e8f5570"),
    ("Sports", "1461896836934-ffe607ba8211"),
    ("Other", "1556742049-0cfed4f6a45d"),
];

static RULES: LazyLock<Vec<(Regex, String)>> = LazyLock::new(|| {
    NAME_RULES
        .iter()
        .map(|(pattern, photo)| {
            let re = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .expect("static image rule must compile");
            (re, photo_url(photo))
        })
        .collect()
});

fn photo_url(photo: &str) -> String {
    format!("{UNSPLASH}{photo}{SIZING}")
}

/// Image chosen from the static rule tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleImageLookup;

impl ImageLookup for RuleImageLookup {
    fn lookup(&self, name: &str, category: &str) -> String {
        rule_image(name).unwrap_or_else(|| category_image(category))
    }
}

/// Curated picture for the first name rule that matches.
pub fn rule_image(name: &str) -> Option<String> {
    RULES.iter().find(|(re, _)| re.is_match(name)).map(|(_, url)| url.clone())
}

pub const UNSPLASH_RANDOM_URL: &str = "https://api.unsplash.com/photos/random";

#[derive(Debug, Deserialize)]
struct RandomPhoto {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    small: Option<String>,
    regular: Option<String>,
    thumb: Option<String>,
}

/// Asks the Unsplash random-photo endpoint when no name rule matches. Any
/// network or decode failure degrades to [`RuleImageLookup`].
pub struct RemoteImageLookup {
    client: reqwest::blocking::Client,
    endpoint: String,
    access_key: String,
}

impl RemoteImageLookup {
    pub fn new(endpoint: impl Into<String>, access_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(RemoteImageLookup {
            client,
            endpoint: endpoint.into(),
            access_key: access_key.into(),
        })
    }

    fn search(&self, query: &str) -> Result<Option<String>> {
        let photo: RandomPhoto = self
            .client
            .get(&self.endpoint)
            .query(&[("query", query), ("orientation", "squarish"), ("content_filter", "high")])
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .header("Accept-Version", "v1")
            .send()?
            .error_for_status()?
            .json()?;
        let urls = photo.urls;
        Ok(urls.small.or(urls.regular).or(urls.thumb))
    }
}

impl ImageLookup for RemoteImageLookup {
    fn lookup(&self, name: &str, category: &str) -> String {
        if let Some(url) = rule_image(name) {
            return url;
        }
        let query = search_query(name, category);
        match self.search(&query) {
            Ok(Some(url)) => url,
            Ok(None) => {
                debug!(%query, "image search returned no usable url");
                category_image(category)
            }
            Err(e) => {
                warn!(%query, error = %e, "image search failed, using built-in picture");
                category_image(category)
            }
        }
    }
}

/// Search terms for the remote lookup: the trimmed name and category.
pub fn search_query(name: &str, category: &str) -> String {
    let query = [name.trim(), category.trim()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    if query.is_empty() {
        "product".to_string()
    } else {
        query
    }
}

pub fn category_image(category: &str) -> String {
    let photo = CATEGORY_IMAGES
        .iter()
        .find(|(c, _)| *c == category)
        .or_else(|| CATEGORY_IMAGES.last())
        .map(|(_, p)| *p)
        .unwrap_or_default();
    photo_url(photo)
}

/// Whether `url` is one of the curated pictures rather than something the user
/// supplied.
pub fn is_generic(url: &str) -> bool {
    RULES.iter().any(|(_, u)| u == url) || CATEGORY_IMAGES.iter().any(|(_, p)| photo_url(p) == url)
}

/// The picture to show for an item: its own URL when custom, otherwise the
/// rule lookup.
pub fn display_url(name: &str, category: &str, image_url: &str) -> String {
    if !image_url.is_empty() && !is_generic(image_url) {
        image_url.to_string()
    } else {
        RuleImageLookup.lookup(name, category)
    }
}

pub fn category_icon(category: &str) -> &'static str {
    match category {
        "Electronics" => "💻",
        "Furniture" => "🪑",
        "Fashion" => "👕",
        "Books" => "📚",
        "Sports" => "🏅",
        _ => "📦",
    }
}

/// Inline SVG tile with the category icon, as a data URI.
pub fn placeholder(name: &str, category: &str) -> String {
    let label: String = if name.is_empty() { "Item" } else { name }.chars().take(20).collect();
    let label = label.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;");
    let svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="96" height="96" viewBox="0 0 96 96" role="img" aria-label="{label}"><rect x="2" y="2" width="92" height="92" rx="18" fill="#ecf6ff" stroke="#cfdcf0" stroke-width="2"/><text x="48" y="54" text-anchor="middle" font-size="34">{icon}</text></svg>"##,
        icon = category_icon(category),
    );
    format!("data:image/svg+xml;utf8,{}", utf8_percent_encode(&svg, NON_ALPHANUMERIC))
}
