use serde::Serialize;
use uuid::Uuid;

use crate::{
    analysis::AnalysisState,
    events::{EventHeader, event::impl_event},
    types::{SentimentResult, SummaryResult},
};

/// The run moved to a new state. Carries the affordances a presenter shows.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisPhaseChanged {
    pub header: EventHeader,
    pub run_id: Uuid,
    pub target: String,
    pub from: AnalysisState,
    pub state: AnalysisState,
    pub status_text: &'static str,
    pub button_label: &'static str,
    pub button_enabled: bool,
}

impl AnalysisPhaseChanged {
    pub fn new(
        parent: Option<Uuid>,
        run_id: Uuid,
        target: &str,
        from: AnalysisState,
        state: AnalysisState,
    ) -> Self {
        Self {
            header: EventHeader::after(parent),
            run_id,
            target: target.to_string(),
            from,
            state,
            status_text: state.status_text(),
            button_label: state.button_label(),
            button_enabled: state.accepts_new_run(),
        }
    }
}

impl_event!(AnalysisPhaseChanged, "analysis.phase_changed");

#[derive(Debug, Clone, Serialize)]
pub struct SentimentAnalyzed {
    pub header: EventHeader,
    pub run_id: Uuid,
    pub target: String,
    pub sentiment: SentimentResult,
}

impl SentimentAnalyzed {
    pub fn new(
        parent: Option<Uuid>,
        run_id: Uuid,
        target: &str,
        sentiment: SentimentResult,
    ) -> Self {
        Self {
            header: EventHeader::after(parent),
            run_id,
            target: target.to_string(),
            sentiment,
        }
    }
}

impl_event!(SentimentAnalyzed, "analysis.sentiment_analyzed");

#[derive(Debug, Clone, Serialize)]
pub struct SummaryGenerated {
    pub header: EventHeader,
    pub run_id: Uuid,
    pub target: String,
    pub summary: SummaryResult,
}

impl SummaryGenerated {
    pub fn new(
        parent: Option<Uuid>,
        run_id: Uuid,
        target: &str,
        summary: SummaryResult,
    ) -> Self {
        Self {
            header: EventHeader::after(parent),
            run_id,
            target: target.to_string(),
            summary,
        }
    }
}

impl_event!(SummaryGenerated, "analysis.summary_generated");

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisFailed {
    pub header: EventHeader,
    pub run_id: Uuid,
    pub target: String,
    /// State the run was in when it failed.
    pub stage: AnalysisState,
    pub message: String,
    pub network: bool,
}

impl AnalysisFailed {
    pub fn new(
        parent: Option<Uuid>,
        run_id: Uuid,
        target: &str,
        stage: AnalysisState,
        message: String,
        network: bool,
    ) -> Self {
        Self {
            header: EventHeader::after(parent),
            run_id,
            target: target.to_string(),
            stage,
            message,
            network,
        }
    }
}

impl_event!(AnalysisFailed, "analysis.failed");
