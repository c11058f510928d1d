//! Two-phase analysis pipeline: sentiment first, then summary.
//!
//! Each run walks an explicit state machine
//!
//! ```text
//! Idle -> ExtractingContent -> AnalyzingSentiment -> Summarizing -> Complete
//!              \                      \                   \
//!               +----------------------+-------------------+--> Failed
//! ```
//!
//! and publishes an [`AnalysisPhaseChanged`] for every transition. At most one
//! run is in flight per content target.

use std::{
    collections::HashMap,
    fmt,
    future::Future,
    sync::{Arc, Mutex},
};

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    api::ScopeApi,
    error::{Result, ScopeError},
    events::{
        AnalysisFailed, AnalysisPhaseChanged, Event, EventBus, SentimentAnalyzed, SummaryGenerated,
    },
    types::{Article, SentimentResult, SummaryResult, Transcript},
};

pub const NO_CONTENT_MESSAGE: &str = "No content available for analysis";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisState {
    Idle,
    ExtractingContent,
    AnalyzingSentiment,
    Summarizing,
    Complete,
    Failed,
}

impl AnalysisState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisState::Idle => "idle",
            AnalysisState::ExtractingContent => "extracting_content",
            AnalysisState::AnalyzingSentiment => "analyzing_sentiment",
            AnalysisState::Summarizing => "summarizing",
            AnalysisState::Complete => "complete",
            AnalysisState::Failed => "failed",
        }
    }

    pub fn status_text(&self) -> &'static str {
        match self {
            AnalysisState::Idle => "",
            AnalysisState::ExtractingContent => "Preparing content...",
            AnalysisState::AnalyzingSentiment => "Analyzing sentiment...",
            AnalysisState::Summarizing => "Generating summary...",
            AnalysisState::Complete => "Analysis complete!",
            AnalysisState::Failed => "Analysis failed",
        }
    }

    pub fn button_label(&self) -> &'static str {
        match self {
            AnalysisState::Idle | AnalysisState::Failed => "Analyze with AI",
            AnalysisState::ExtractingContent | AnalysisState::AnalyzingSentiment => "Analyzing...",
            AnalysisState::Summarizing => "Summarizing...",
            AnalysisState::Complete => "Analysis Complete!",
        }
    }

    /// Whether the analyze button is live, i.e. a new run may start.
    pub fn accepts_new_run(&self) -> bool {
        matches!(
            self,
            AnalysisState::Idle | AnalysisState::Complete | AnalysisState::Failed
        )
    }

    pub fn can_transition_to(&self, next: AnalysisState) -> bool {
        use AnalysisState::*;
        match (self, next) {
            (Idle, ExtractingContent) => true,
            (ExtractingContent, AnalyzingSentiment) => true,
            (AnalyzingSentiment, Summarizing) => true,
            (Summarizing, Complete) => true,
            (ExtractingContent | AnalyzingSentiment | Summarizing, Failed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for AnalysisState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What is currently on screen and could be analyzed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayedContent {
    pub target_id: String,
    pub article_body: Option<String>,
    pub transcript_segments: Vec<String>,
    pub manual_text: Option<String>,
}

impl DisplayedContent {
    pub fn from_article(article: &Article) -> Self {
        Self {
            target_id: article.id.clone(),
            article_body: article.body.clone(),
            ..Self::default()
        }
    }

    pub fn from_transcript(transcript: &Transcript) -> Self {
        Self {
            target_id: transcript.video_id.clone(),
            transcript_segments: transcript.paragraphs.iter().map(|p| p.text.clone()).collect(),
            ..Self::default()
        }
    }

    pub fn manual(target_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            manual_text: Some(text.into()),
            ..Self::default()
        }
    }

    /// First non-empty source wins: article body, transcript, manual text.
    pub fn resolve(&self) -> Option<String> {
        let non_empty = |s: &str| {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        if let Some(body) = self.article_body.as_deref().and_then(non_empty) {
            return Some(body);
        }

        let joined = self
            .transcript_segments
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !joined.is_empty() {
            return Some(joined);
        }

        self.manual_text.as_deref().and_then(non_empty)
    }
}

/// Final state of a run. `error` is set exactly when `state` is `Failed`.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub run_id: Uuid,
    pub target: String,
    pub state: AnalysisState,
    pub sentiment: Option<SentimentResult>,
    pub summary: Option<SummaryResult>,
    pub error: Option<ScopeError>,
}

impl AnalysisOutcome {
    pub fn is_complete(&self) -> bool {
        self.state == AnalysisState::Complete
    }
}

/// One pass through the state machine.
pub struct AnalysisRun {
    run_id: Uuid,
    target: String,
    state: AnalysisState,
    sentiment: Option<SentimentResult>,
    summary: Option<SummaryResult>,
    error: Option<ScopeError>,
    last_event: Option<Uuid>,
    bus: Option<EventBus>,
}

impl AnalysisRun {
    pub fn new(target: impl Into<String>, bus: Option<EventBus>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            target: target.into(),
            state: AnalysisState::Idle,
            sentiment: None,
            summary: None,
            error: None,
            last_event: None,
            bus,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn state(&self) -> AnalysisState {
        self.state
    }

    pub fn advance(&mut self, next: AnalysisState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(ScopeError::InvalidTransition {
                from: self.state.as_str(),
                to: next.as_str(),
            });
        }
        let from = self.state;
        self.state = next;
        debug!(run_id = %self.run_id, target = %self.target, %from, to = %next, "analysis phase");
        self.emit(AnalysisPhaseChanged::new(
            self.last_event,
            self.run_id,
            &self.target,
            from,
            next,
        ));
        Ok(())
    }

    pub fn record_sentiment(&mut self, sentiment: SentimentResult) {
        self.emit(SentimentAnalyzed::new(
            self.last_event,
            self.run_id,
            &self.target,
            sentiment.clone(),
        ));
        self.sentiment = Some(sentiment);
    }

    pub fn record_summary(&mut self, summary: SummaryResult) {
        self.emit(SummaryGenerated::new(
            self.last_event,
            self.run_id,
            &self.target,
            summary.clone(),
        ));
        self.summary = Some(summary);
    }

    /// Move to `Failed`, keeping `error` as the run's last error.
    pub fn fail(&mut self, error: ScopeError) -> Result<()> {
        let stage = self.state;
        self.advance(AnalysisState::Failed)?;
        warn!(
            run_id = %self.run_id,
            target = %self.target,
            %stage,
            error = %error,
            "analysis failed"
        );
        self.emit(AnalysisFailed::new(
            self.last_event,
            self.run_id,
            &self.target,
            stage,
            error.user_message(),
            error.is_network(),
        ));
        self.error = Some(error);
        Ok(())
    }

    pub fn into_outcome(self) -> AnalysisOutcome {
        AnalysisOutcome {
            run_id: self.run_id,
            target: self.target,
            state: self.state,
            sentiment: self.sentiment,
            summary: self.summary,
            error: self.error,
        }
    }

    fn emit<E: Event>(&mut self, event: E) {
        self.last_event = Some(event.event_id());
        if let Some(bus) = &self.bus {
            bus.publish(Arc::new(event));
        }
    }
}

type InFlight = Mutex<HashMap<String, CancellationToken>>;

/// Removes the target from the in-flight registry when the run ends, however
/// it ends.
struct InFlightGuard<'a> {
    registry: &'a InFlight,
    target: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut registry = self.registry.lock().unwrap_or_else(|p| p.into_inner());
        registry.remove(&self.target);
    }
}

/// Runs the sentiment and summary pipeline against a [`ScopeApi`].
pub struct Analyzer {
    api: ScopeApi,
    bus: Option<EventBus>,
    in_flight: InFlight,
}

impl Analyzer {
    pub fn new(api: ScopeApi) -> Self {
        Self {
            api,
            bus: None,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn is_running(&self, target: &str) -> bool {
        let registry = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        registry.contains_key(target)
    }

    /// Cancel the in-flight run for `target`. Returns `false` if none was running.
    pub fn cancel(&self, target: &str) -> bool {
        let registry = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        match registry.get(target) {
            Some(token) => {
                info!(target, "cancelling analysis");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Run the full pipeline for `content`.
    ///
    /// Pipeline failures end up in the returned outcome as `Failed`; the only
    /// error returned directly is [`ScopeError::RunInProgress`].
    pub async fn analyze(&self, content: &DisplayedContent) -> Result<AnalysisOutcome> {
        let (token, _guard) = self.claim(&content.target_id)?;
        let mut run = AnalysisRun::new(content.target_id.clone(), self.bus.clone());
        info!(run_id = %run.run_id(), target = %content.target_id, "analysis started");

        run.advance(AnalysisState::ExtractingContent)?;
        let Some(text) = content.resolve() else {
            run.fail(ScopeError::validation(NO_CONTENT_MESSAGE))?;
            return Ok(run.into_outcome());
        };

        run.advance(AnalysisState::AnalyzingSentiment)?;
        match until_cancelled(&token, self.api.analyze_sentiment(&text)).await {
            Ok(sentiment) => run.record_sentiment(sentiment),
            Err(e) => {
                run.fail(e)?;
                return Ok(run.into_outcome());
            }
        }

        run.advance(AnalysisState::Summarizing)?;
        match until_cancelled(&token, self.api.generate_summary(&text)).await {
            Ok(summary) => run.record_summary(summary),
            Err(e) => {
                run.fail(e)?;
                return Ok(run.into_outcome());
            }
        }

        run.advance(AnalysisState::Complete)?;
        info!(run_id = %run.run_id(), target = %content.target_id, "analysis complete");
        Ok(run.into_outcome())
    }

    fn claim(&self, target: &str) -> Result<(CancellationToken, InFlightGuard<'_>)> {
        let mut registry = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        if registry.contains_key(target) {
            debug!(target, "analysis already in flight");
            return Err(ScopeError::RunInProgress {
                target: target.to_string(),
            });
        }
        let token = CancellationToken::new();
        registry.insert(target.to_string(), token.clone());
        Ok((
            token,
            InFlightGuard {
                registry: &self.in_flight,
                target: target.to_string(),
            },
        ))
    }
}

async fn until_cancelled<T>(
    token: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(ScopeError::Cancelled),
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Paragraph;

    #[test]
    fn only_forward_transitions_are_allowed() {
        use AnalysisState::*;
        assert!(Idle.can_transition_to(ExtractingContent));
        assert!(Summarizing.can_transition_to(Complete));
        assert!(AnalyzingSentiment.can_transition_to(Failed));
        assert!(!Idle.can_transition_to(Summarizing));
        assert!(!Complete.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(ExtractingContent));
        assert!(!Idle.can_transition_to(Failed));
    }

    #[test]
    fn complete_and_failed_render_differently() {
        use AnalysisState::*;
        assert_ne!(Complete.status_text(), Failed.status_text());
        assert_ne!(Complete.button_label(), Failed.button_label());
        assert!(Complete.accepts_new_run() && Failed.accepts_new_run());
        assert!(!Summarizing.accepts_new_run());
    }

    #[test]
    fn illegal_advance_is_rejected() {
        let mut run = AnalysisRun::new("t", None);
        let err = run.advance(AnalysisState::Complete).unwrap_err();
        assert!(matches!(
            err,
            ScopeError::InvalidTransition {
                from: "idle",
                to: "complete",
            }
        ));
        assert_eq!(run.state(), AnalysisState::Idle);
    }

    #[test]
    fn article_body_wins_over_other_sources() {
        let content = DisplayedContent {
            target_id: "t".into(),
            article_body: Some("  body text ".into()),
            transcript_segments: vec!["segment".into()],
            manual_text: Some("manual".into()),
        };
        assert_eq!(content.resolve().as_deref(), Some("body text"));
    }

    #[test]
    fn blank_body_falls_through_to_transcript() {
        let transcript = Transcript {
            video_id: "dQw4w9WgXcQ".into(),
            language: "en".into(),
            paragraphs: vec![
                Paragraph {
                    timestamp: "00:00".into(),
                    text: "first".into(),
                },
                Paragraph {
                    timestamp: "00:03".into(),
                    text: "  ".into(),
                },
                Paragraph {
                    timestamp: "00:06".into(),
                    text: "second".into(),
                },
            ],
        };
        let mut content = DisplayedContent::from_transcript(&transcript);
        content.article_body = Some("   ".into());
        assert_eq!(content.resolve().as_deref(), Some("first second"));
    }

    #[test]
    fn nothing_to_resolve() {
        assert_eq!(DisplayedContent::manual("t", "\n ").resolve(), None);
        assert_eq!(DisplayedContent::default().resolve(), None);
    }
}
