use serde::Serialize;
use tracing::info;
use url::Url;

use crate::{
    aggregator::ContentStore,
    api::{PortalRequest, ScopeApi},
    classifier,
    config::{DEFAULT_LANGUAGE, DEFAULT_MAX_ARTICLES},
    error::{Result, ScopeError},
    types::{ContentStats, UrlKind},
};

pub const INVALID_YOUTUBE_URL: &str = "Invalid YouTube URL";
pub const MISSING_SCHEME: &str = "Please include http:// or https://";

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Ask the server to classify instead of using the local rules.
    pub remote_classification: bool,
    pub max_articles: u32,
    /// `false` keeps portal results headline-only.
    pub extract_full_content: bool,
    pub language: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            remote_classification: false,
            max_articles: DEFAULT_MAX_ARTICLES,
            extract_full_content: true,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReport {
    pub route: UrlKind,
    pub added: usize,
    pub stats: ContentStats,
}

/// Validates a URL, picks the extraction route and appends results to the
/// injected store.
#[derive(Clone)]
pub struct Extractor {
    api: ScopeApi,
}

impl Extractor {
    pub fn new(api: ScopeApi) -> Self {
        Self { api }
    }

    pub async fn quick_extract(
        &self,
        store: &mut ContentStore,
        url: &str,
        options: &ExtractOptions,
    ) -> Result<ExtractionReport> {
        let url = require_url(url)?;

        let route = if options.remote_classification {
            self.api.analyze_url(url).await?
        } else {
            classifier::classify(url)
        };
        info!(url, %route, "extracting");

        match route {
            UrlKind::Youtube => self.extract_youtube(store, url, &options.language).await,
            UrlKind::Portal => {
                self.scrape_portal(store, url, options.max_articles, options.extract_full_content)
                    .await
            }
            UrlKind::Single => self.extract_single(store, url).await,
        }
    }

    pub async fn scrape_portal(
        &self,
        store: &mut ContentStore,
        url: &str,
        max_articles: u32,
        extract_full_content: bool,
    ) -> Result<ExtractionReport> {
        let url = require_url(url)?;
        let articles = self
            .api
            .scrape_portal(&PortalRequest {
                url: url.to_string(),
                max_articles,
                extract_full_content,
            })
            .await?;
        let added = articles.len();
        store.append_articles(UrlKind::Portal, articles);
        Ok(report(store, UrlKind::Portal, added))
    }

    pub async fn extract_single(
        &self,
        store: &mut ContentStore,
        url: &str,
    ) -> Result<ExtractionReport> {
        let url = require_url(url)?;
        let article = self.api.extract_article(url).await?;
        store.append_article(article);
        Ok(report(store, UrlKind::Single, 1))
    }

    pub async fn extract_youtube(
        &self,
        store: &mut ContentStore,
        url: &str,
        language: &str,
    ) -> Result<ExtractionReport> {
        let url = require_url(url)?;
        let video_id = classifier::extract_video_id(url)
            .ok_or_else(|| ScopeError::validation(INVALID_YOUTUBE_URL))?;
        let language = if language.trim().is_empty() {
            DEFAULT_LANGUAGE
        } else {
            language.trim()
        };

        let transcript = self
            .api
            .extract_transcript(&classifier::watch_url(&video_id), &video_id, language)
            .await?;
        store.append_transcript(transcript);
        Ok(report(store, UrlKind::Youtube, 1))
    }
}

fn require_url(url: &str) -> Result<&str> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ScopeError::validation("Please enter a URL"));
    }
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some() => {
            Ok(url)
        }
        _ => Err(ScopeError::validation(MISSING_SCHEME)),
    }
}

fn report(store: &ContentStore, route: UrlKind, added: usize) -> ExtractionReport {
    ExtractionReport {
        route,
        added,
        stats: store.stats(),
    }
}
