use std::sync::Arc;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::debug;

use crate::{
    auth::{AuthResponse, SignInForm, SignUpForm},
    client::{Backend, Endpoint},
    error::{Result, ScopeError},
    types::{Article, Paragraph, SentimentResult, SummaryResult, Transcript, UrlKind},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalRequest {
    pub url: String,
    pub max_articles: u32,
    pub extract_full_content: bool,
}

#[derive(Deserialize)]
struct PortalBody {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptBody {
    video_id: Option<String>,
    language: Option<String>,
    #[serde(default)]
    paragraphs: Vec<Paragraph>,
}

#[derive(Deserialize)]
struct AnalyzeUrlBody {
    #[serde(rename = "type")]
    kind: UrlKind,
}

/// Typed calls over a [`Backend`], one method per endpoint.
#[derive(Clone)]
pub struct ScopeApi {
    backend: Arc<dyn Backend>,
}

impl ScopeApi {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub async fn analyze_sentiment(&self, content: &str) -> Result<SentimentResult> {
        let body = self
            .backend
            .request(Endpoint::AnalyzeSentiment, json!({ "content": content }))
            .await?;
        field(Endpoint::AnalyzeSentiment, body, "sentiment")
    }

    pub async fn generate_summary(&self, content: &str) -> Result<SummaryResult> {
        let body = self
            .backend
            .request(Endpoint::GenerateSummary, json!({ "content": content }))
            .await?;
        field(Endpoint::GenerateSummary, body, "summary")
    }

    /// Server-side classification of a URL.
    pub async fn analyze_url(&self, url: &str) -> Result<UrlKind> {
        let body = self
            .backend
            .request(Endpoint::AnalyzeUrl, json!({ "url": url }))
            .await?;
        Ok(decode::<AnalyzeUrlBody>(Endpoint::AnalyzeUrl, body)?.kind)
    }

    pub async fn scrape_portal(&self, request: &PortalRequest) -> Result<Vec<Article>> {
        let body = self
            .backend
            .request(Endpoint::ScrapePortal, serde_json::to_value(request)?)
            .await?;
        let articles = decode::<PortalBody>(Endpoint::ScrapePortal, body)?.articles;
        debug!(count = articles.len(), url = %request.url, "portal scraped");
        Ok(articles)
    }

    pub async fn extract_article(&self, url: &str) -> Result<Article> {
        let body = self
            .backend
            .request(Endpoint::ExtractArticle, json!({ "url": url }))
            .await?;
        decode(Endpoint::ExtractArticle, body)
    }

    /// `video_id` fills in the transcript when the server omits it.
    pub async fn extract_transcript(
        &self,
        url: &str,
        video_id: &str,
        language: &str,
    ) -> Result<Transcript> {
        let body = self
            .backend
            .request(
                Endpoint::ExtractTranscript,
                json!({ "url": url, "language": language }),
            )
            .await?;
        let body: TranscriptBody = decode(Endpoint::ExtractTranscript, body)?;
        Ok(Transcript {
            video_id: body.video_id.unwrap_or_else(|| video_id.to_string()),
            language: body.language.unwrap_or_else(|| language.to_string()),
            paragraphs: body.paragraphs,
        })
    }

    pub async fn sign_in(&self, form: &SignInForm) -> Result<AuthResponse> {
        form.validate()?;
        let body = self
            .backend
            .request(Endpoint::SignIn, serde_json::to_value(form)?)
            .await?;
        decode(Endpoint::SignIn, body)
    }

    pub async fn sign_up(&self, form: &SignUpForm) -> Result<AuthResponse> {
        form.validate()?;
        let body = self
            .backend
            .request(Endpoint::SignUp, serde_json::to_value(form)?)
            .await?;
        decode(Endpoint::SignUp, body)
    }

    /// Queue a saved headline for analysis. The response names the page that
    /// shows it.
    pub async fn analyze_headline(&self, document_id: &str) -> Result<AuthResponse> {
        let document_id = document_id.trim();
        if document_id.is_empty() {
            return Err(ScopeError::validation("Document id is required"));
        }
        let body = self
            .backend
            .request(Endpoint::AnalyzeContent, json!({ "document_id": document_id }))
            .await?;
        decode(Endpoint::AnalyzeContent, body)
    }

    /// Delete every saved headline for the signed-in user.
    pub async fn clear_headlines(&self) -> Result<AuthResponse> {
        let body = self
            .backend
            .request(Endpoint::ClearHeadlines, json!({}))
            .await?;
        decode(Endpoint::ClearHeadlines, body)
    }
}

fn malformed(endpoint: Endpoint, detail: impl std::fmt::Display) -> ScopeError {
    ScopeError::Application {
        endpoint: endpoint.path().to_string(),
        message: format!("Malformed response: {detail}"),
    }
}

fn decode<T: DeserializeOwned>(endpoint: Endpoint, body: Value) -> Result<T> {
    serde_json::from_value(body).map_err(|e| malformed(endpoint, e))
}

fn field<T: DeserializeOwned>(endpoint: Endpoint, mut body: Value, key: &str) -> Result<T> {
    match body.get_mut(key).map(Value::take) {
        Some(value) if !value.is_null() => decode(endpoint, value),
        _ => Err(malformed(endpoint, format!("missing `{key}`"))),
    }
}
