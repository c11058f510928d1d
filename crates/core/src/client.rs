use std::{fmt, sync::RwLock};

use async_trait::async_trait;
use reqwest::{StatusCode, Url, header};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    config::ClientConfig,
    csrf,
    error::{Result, ScopeError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    AnalyzeSentiment,
    GenerateSummary,
    AnalyzeUrl,
    ScrapePortal,
    ExtractArticle,
    ExtractTranscript,
    SignIn,
    SignUp,
    AnalyzeContent,
    ClearHeadlines,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::AnalyzeSentiment => "/api/analyze-sentiment/",
            Endpoint::GenerateSummary => "/api/generate-summary/",
            Endpoint::AnalyzeUrl => "/api/analyze-url",
            Endpoint::ScrapePortal => "/api/scrape-portal",
            Endpoint::ExtractArticle => "/api/extract-article",
            Endpoint::ExtractTranscript => "/api/extract-transcript",
            Endpoint::SignIn => "/signin/",
            Endpoint::SignUp => "/signup/",
            Endpoint::AnalyzeContent => "/analyze-content/",
            Endpoint::ClearHeadlines => "/clear-headlines/",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Transport seam: one JSON POST per call.
///
/// Implementations return the decoded body on success and classify every
/// failure as either [`ScopeError::Network`] or [`ScopeError::Application`].
#[async_trait]
pub trait Backend: Send + Sync {
    async fn request(&self, endpoint: Endpoint, payload: Value) -> Result<Value>;
}

/// Turn a decoded response into either its body or an application error.
///
/// A non-2xx status, `success: false`, or a non-empty `error` string all count
/// as the server refusing the request.
pub fn check_response(endpoint: Endpoint, status: u16, body: Value) -> Result<Value> {
    let server_message = || {
        ["error", "message"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
    };

    if !(200..300).contains(&status) {
        let message = server_message().unwrap_or_else(|| {
            StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .map(|reason| format!("{status} {reason}"))
                .unwrap_or_else(|| format!("HTTP {status}"))
        });
        return Err(application(endpoint, message));
    }

    if let Some(error) = body
        .get("error")
        .and_then(Value::as_str)
        .filter(|e| !e.trim().is_empty())
    {
        return Err(application(endpoint, error.to_string()));
    }

    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = server_message().unwrap_or_else(|| "Request failed".to_string());
        return Err(application(endpoint, message));
    }

    Ok(body)
}

fn application(endpoint: Endpoint, message: String) -> ScopeError {
    ScopeError::Application {
        endpoint: endpoint.path().to_string(),
        message,
    }
}

fn network(endpoint: &str, err: impl fmt::Display) -> ScopeError {
    ScopeError::Network {
        endpoint: endpoint.to_string(),
        reason: err.to_string(),
    }
}

/// `reqwest`-backed [`Backend`] talking to a running SentiScope server.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
    csrf_token: RwLock<Option<String>>,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url).map_err(|e| {
            ScopeError::InvalidConfig(format!("base URL {:?} is not valid: {e}", config.base_url))
        })?;
        // Endpoint paths resolve below any mount prefix only under a trailing slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ScopeError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            csrf_token: RwLock::new(config.csrf_token.clone()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn csrf_token(&self) -> Option<String> {
        self.csrf_token.read().ok().and_then(|t| t.clone())
    }

    pub fn set_csrf_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.csrf_token.write() {
            *slot = token.filter(|t| !t.is_empty());
        }
    }

    /// GET a page and remember the first CSRF token found in its cookies or
    /// markup. Returns whether a token is now known.
    pub async fn prime_csrf(&self, path: &str) -> Result<bool> {
        let url = self.join(path)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| network(path, e))?;

        let cookies: Vec<String> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let html = response.text().await.map_err(|e| network(path, e))?;

        match csrf::discover(cookies.iter().map(String::as_str), Some(&html)) {
            Some(token) => {
                debug!(path, "csrf token discovered");
                self.set_csrf_token(Some(token));
                Ok(true)
            }
            None => {
                debug!(path, "no csrf token on page");
                Ok(self.csrf_token().is_some())
            }
        }
    }

    fn join(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ScopeError::InvalidConfig(format!("cannot build URL for {path}: {e}")))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn request(&self, endpoint: Endpoint, payload: Value) -> Result<Value> {
        let url = self.join(endpoint.path())?;

        let mut request = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&payload);
        if let Some(token) = self.csrf_token() {
            request = request.header(csrf::CSRF_HEADER, token);
        }

        debug!(%endpoint, "sending request");
        let response = request.send().await.map_err(|e| {
            warn!(%endpoint, error = %e, "request failed");
            network(endpoint.path(), e)
        })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| network(endpoint.path(), e))?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str::<Value>(&text) {
                Ok(body) => body,
                // Error pages are often HTML; the status alone decides then.
                Err(_) if !(200..300).contains(&status) => Value::Null,
                Err(e) => {
                    let reason = format!("unreadable response body: {e}");
                    return Err(network(endpoint.path(), reason));
                }
            }
        };

        check_response(endpoint, status, body)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn success_body_passes_through() {
        let body = json!({"success": true, "sentiment": {"label": "positive"}});
        assert_eq!(
            check_response(Endpoint::AnalyzeSentiment, 200, body.clone()).unwrap(),
            body
        );
    }

    #[test]
    fn success_false_uses_server_message() {
        let err = check_response(
            Endpoint::GenerateSummary,
            200,
            json!({"success": false, "message": "No content provided"}),
        )
        .unwrap_err();
        assert!(err.is_application());
        assert_eq!(err.to_string(), "No content provided");
    }

    #[test]
    fn error_field_is_an_application_error() {
        let err = check_response(
            Endpoint::ExtractTranscript,
            200,
            json!({"error": "Transcripts are disabled for this video"}),
        )
        .unwrap_err();
        assert_eq!(err.user_message(), "Transcripts are disabled for this video");
    }

    #[test]
    fn null_error_field_is_ignored() {
        let body = json!({"error": null, "type": "single"});
        assert!(check_response(Endpoint::AnalyzeUrl, 200, body).is_ok());
    }

    #[test]
    fn non_2xx_without_body_uses_status_text() {
        let err = check_response(Endpoint::ScrapePortal, 502, Value::Null).unwrap_err();
        assert_eq!(err.to_string(), "502 Bad Gateway");
        assert!(!err.is_network());
    }

    #[test]
    fn csrf_token_is_only_kept_when_non_empty() {
        let backend = HttpBackend::new(&ClientConfig::default()).unwrap();
        assert_eq!(backend.csrf_token(), None);
        backend.set_csrf_token(Some(String::new()));
        assert_eq!(backend.csrf_token(), None);
        backend.set_csrf_token(Some("tok".into()));
        assert_eq!(backend.csrf_token().as_deref(), Some("tok"));
    }

    #[test]
    fn endpoint_paths_keep_the_base_prefix() {
        for base_url in ["http://host/sentiscope", "http://host/sentiscope/"] {
            let backend = HttpBackend::new(&ClientConfig {
                base_url: base_url.into(),
                ..ClientConfig::default()
            })
            .unwrap();
            assert_eq!(
                backend.join(Endpoint::GenerateSummary.path()).unwrap().as_str(),
                "http://host/sentiscope/api/generate-summary/"
            );
            assert_eq!(
                backend.join("/signin/").unwrap().as_str(),
                "http://host/sentiscope/signin/"
            );
        }
    }

    #[test]
    fn bare_host_joins_at_root() {
        let backend = HttpBackend::new(&ClientConfig {
            base_url: "http://localhost:5000".into(),
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(
            backend.join(Endpoint::ClearHeadlines.path()).unwrap().as_str(),
            "http://localhost:5000/clear-headlines/"
        );
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let config = ClientConfig {
            base_url: "not a url".into(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            HttpBackend::new(&config),
            Err(ScopeError::InvalidConfig(_))
        ));
    }
}
