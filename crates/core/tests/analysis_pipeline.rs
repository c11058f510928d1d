mod common;

use std::sync::Arc;

use common::{ScriptedBackend, positive_sentiment, short_summary};
use sentiscope_core::{
    AnalysisState, Analyzer, DisplayedContent, ScopeApi, ScopeError, SentimentLabel,
    client::Endpoint,
    events::{AnalysisFailed, AnalysisPhaseChanged, EventBus, SentimentAnalyzed, downcast_ref},
    queues::QueueKind,
};
use serde_json::json;

fn analyzer(backend: &Arc<ScriptedBackend>) -> Analyzer {
    Analyzer::new(ScopeApi::new(backend.clone()))
}

#[tokio::test]
async fn successful_run_calls_sentiment_then_summary() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .reply(Endpoint::AnalyzeSentiment, positive_sentiment())
            .reply(Endpoint::GenerateSummary, short_summary()),
    );

    let outcome = analyzer(&backend)
        .analyze(&DisplayedContent::manual("note", "Stocks climbed to a record high today."))
        .await
        .unwrap();

    assert!(outcome.is_complete());
    assert!(outcome.error.is_none());
    assert_eq!(
        backend.endpoints(),
        vec![Endpoint::AnalyzeSentiment, Endpoint::GenerateSummary]
    );

    let sentiment = outcome.sentiment.unwrap();
    assert_eq!(sentiment.label, SentimentLabel::Positive);
    assert_eq!(sentiment.confidence, 0.92);
    assert_eq!(sentiment.scores.neutral, 0.15);
    assert_eq!(outcome.summary.unwrap().compression_ratio, 0.25);

    let calls = backend.calls();
    assert_eq!(calls[0].1, json!({"content": "Stocks climbed to a record high today."}));
    assert_eq!(calls[0].1, calls[1].1);
}

#[tokio::test]
async fn nothing_to_analyze_fails_without_network() {
    let backend = Arc::new(ScriptedBackend::new());
    let content = DisplayedContent {
        target_id: "empty".into(),
        article_body: Some("   ".into()),
        transcript_segments: vec![String::new()],
        manual_text: None,
    };

    let outcome = analyzer(&backend).analyze(&content).await.unwrap();

    assert_eq!(outcome.state, AnalysisState::Failed);
    assert!(matches!(outcome.error, Some(ScopeError::Validation(_))));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn sentiment_failure_skips_summary() {
    let backend = Arc::new(ScriptedBackend::new().reply(
        Endpoint::AnalyzeSentiment,
        json!({"success": false, "message": "Model unavailable"}),
    ));

    let outcome = analyzer(&backend)
        .analyze(&DisplayedContent::manual("t", "some words"))
        .await
        .unwrap();

    assert_eq!(outcome.state, AnalysisState::Failed);
    assert!(outcome.sentiment.is_none());
    let error = outcome.error.unwrap();
    assert!(error.is_application());
    assert_eq!(error.user_message(), "Model unavailable");
    assert_eq!(backend.endpoints(), vec![Endpoint::AnalyzeSentiment]);
}

#[tokio::test]
async fn summary_network_failure_keeps_sentiment() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .reply(Endpoint::AnalyzeSentiment, positive_sentiment())
            .unreachable(Endpoint::GenerateSummary),
    );

    let outcome = analyzer(&backend)
        .analyze(&DisplayedContent::manual("t", "some words"))
        .await
        .unwrap();

    assert_eq!(outcome.state, AnalysisState::Failed);
    assert!(outcome.sentiment.is_some());
    assert!(outcome.summary.is_none());
    assert!(outcome.error.unwrap().is_network());
}

#[tokio::test]
async fn retry_after_failure_starts_a_fresh_run() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .unreachable(Endpoint::AnalyzeSentiment)
            .reply(Endpoint::AnalyzeSentiment, positive_sentiment())
            .reply(Endpoint::GenerateSummary, short_summary()),
    );
    let analyzer = analyzer(&backend);
    let content = DisplayedContent::manual("t", "some words");

    let first = analyzer.analyze(&content).await.unwrap();
    let second = analyzer.analyze(&content).await.unwrap();

    assert_eq!(first.state, AnalysisState::Failed);
    assert!(second.is_complete());
    assert_ne!(first.run_id, second.run_id);
}

#[tokio::test]
async fn second_run_for_same_target_is_rejected() {
    let backend = Arc::new(ScriptedBackend::new().hang(Endpoint::AnalyzeSentiment));
    let analyzer = Arc::new(analyzer(&backend));
    let content = DisplayedContent::manual("story-1", "some words");

    let first = tokio::spawn({
        let analyzer = analyzer.clone();
        let content = content.clone();
        async move { analyzer.analyze(&content).await }
    });
    backend.requested.notified().await;

    let err = analyzer.analyze(&content).await.unwrap_err();
    assert!(matches!(err, ScopeError::RunInProgress { ref target } if target == "story-1"));

    // A different target is independent.
    assert!(analyzer.is_running("story-1"));
    assert!(!analyzer.is_running("story-2"));

    assert!(analyzer.cancel("story-1"));
    let outcome = first.await.unwrap().unwrap();
    assert!(matches!(outcome.error, Some(ScopeError::Cancelled)));
    assert!(!analyzer.is_running("story-1"));
}

#[tokio::test]
async fn cancelling_before_summary_issues_one_request() {
    let backend = Arc::new(ScriptedBackend::new().hang(Endpoint::AnalyzeSentiment));
    let analyzer = Arc::new(analyzer(&backend));

    let run = tokio::spawn({
        let analyzer = analyzer.clone();
        async move {
            analyzer
                .analyze(&DisplayedContent::manual("t", "some words"))
                .await
        }
    });
    backend.requested.notified().await;
    assert!(analyzer.cancel("t"));

    let outcome = run.await.unwrap().unwrap();
    assert_eq!(outcome.state, AnalysisState::Failed);
    assert!(matches!(outcome.error, Some(ScopeError::Cancelled)));
    assert_eq!(backend.endpoints(), vec![Endpoint::AnalyzeSentiment]);
    assert!(!analyzer.cancel("t"));
}

#[tokio::test]
async fn phases_are_published_in_order() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .reply(Endpoint::AnalyzeSentiment, positive_sentiment())
            .reply(Endpoint::GenerateSummary, short_summary()),
    );
    let bus = EventBus::default();
    let phases = bus.subscribe(
        "test.phases",
        &[AnalysisPhaseChanged::EVENT_TYPE],
        QueueKind::FifoDropOldest { capacity: 16 },
    );
    let results = bus.subscribe(
        "test.results",
        &[SentimentAnalyzed::EVENT_TYPE],
        QueueKind::Latest1,
    );

    let outcome = analyzer(&backend)
        .with_bus(bus.clone())
        .analyze(&DisplayedContent::manual("t", "some words"))
        .await
        .unwrap();

    let seen: Vec<_> = phases
        .drain()
        .iter()
        .map(|e| {
            let phase = downcast_ref::<AnalysisPhaseChanged>(&e.event).unwrap();
            assert_eq!(phase.run_id, outcome.run_id);
            (phase.state, phase.status_text, phase.button_enabled)
        })
        .collect();
    assert_eq!(
        seen,
        vec![
            (AnalysisState::ExtractingContent, "Preparing content...", false),
            (AnalysisState::AnalyzingSentiment, "Analyzing sentiment...", false),
            (AnalysisState::Summarizing, "Generating summary...", false),
            (AnalysisState::Complete, "Analysis complete!", true),
        ]
    );

    let sentiment = results.try_recv().unwrap();
    let sentiment = downcast_ref::<SentimentAnalyzed>(&sentiment.event).unwrap();
    assert_eq!(sentiment.sentiment.label, SentimentLabel::Positive);
}

#[tokio::test]
async fn failure_event_names_the_stage() {
    let backend = Arc::new(ScriptedBackend::new().unreachable(Endpoint::AnalyzeSentiment));
    let bus = EventBus::default();
    let failures = bus.subscribe(
        "test.failures",
        &[AnalysisFailed::EVENT_TYPE],
        QueueKind::FifoDropOldest { capacity: 4 },
    );

    analyzer(&backend)
        .with_bus(bus.clone())
        .analyze(&DisplayedContent::manual("t", "words"))
        .await
        .unwrap();

    let event = failures.try_recv().unwrap();
    let failed = downcast_ref::<AnalysisFailed>(&event.event).unwrap();
    assert_eq!(failed.stage, AnalysisState::AnalyzingSentiment);
    assert!(failed.network);
    assert!(failed.message.contains("try again"));
}
