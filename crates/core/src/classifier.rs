//! Route selection for submitted URLs.
//!
//! Classification is a pure function and never fails: anything that cannot be
//! parsed as an absolute URL is treated as a single article, the least
//! presumptuous route.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::types::UrlKind;

static VIDEO_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(
            r"(?:youtube\.com/watch\?(?:[^#]*&)?v=|youtu\.be/|youtube\.com/embed/)([a-zA-Z0-9_-]{11})",
        )
        .expect("valid video url regex"),
        Regex::new(r"youtube\.com/(?:v|shorts)/([a-zA-Z0-9_-]{11})")
            .expect("valid video url regex"),
    ]
});

static NUMERIC_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\d").expect("valid numeric segment regex"));

pub const NEWS_DOMAINS: &[&str] = &[
    "bbc.com",
    "cnn.com",
    "prothomalo.com",
    "thedailystar.net",
    "news24bd.tv",
];

pub const SECTION_INDICATORS: &[&str] = &[
    "/news",
    "/politics",
    "/world",
    "/business",
    "/technology",
];

const ARTICLE_MARKERS: &[&str] = &["/article/", "/story/"];

/// Extract the 11-character video id from any accepted video URL form.
pub fn extract_video_id(raw: &str) -> Option<String> {
    let raw = raw.trim();
    VIDEO_PATTERNS
        .iter()
        .find_map(|re| re.captures(raw))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Canonical watch URL for a video id.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

pub fn classify(raw: &str) -> UrlKind {
    let raw = raw.trim();

    if extract_video_id(raw).is_some() {
        return UrlKind::Youtube;
    }

    let Ok(parsed) = Url::parse(raw) else {
        return UrlKind::Single;
    };
    let Some(host) = parsed.host_str() else {
        return UrlKind::Single;
    };

    if is_portal(&host.to_lowercase(), parsed.path()) {
        UrlKind::Portal
    } else {
        UrlKind::Single
    }
}

fn is_portal(host: &str, path: &str) -> bool {
    if NEWS_DOMAINS.iter().any(|d| host.contains(d)) {
        return true;
    }

    if SECTION_INDICATORS.iter().any(|i| path.contains(i)) {
        return true;
    }

    let has_article_id = NUMERIC_SEGMENT.is_match(path);
    let has_article_marker = ARTICLE_MARKERS.iter().any(|m| path.contains(m));
    !has_article_id && !has_article_marker
}

/// Slug heuristic for telling an article page from a listing page.
///
/// Walks the URL backwards (ignoring trailing slashes); a digit found before
/// reaching `/`, `?` or `#` marks a single article.
pub fn is_single_article_slug(raw: &str) -> bool {
    for c in raw.trim().trim_matches('/').chars().rev() {
        if c.is_ascii_digit() {
            return true;
        }
        if matches!(c, '/' | '?' | '#') {
            break;
        }
    }
    false
}
