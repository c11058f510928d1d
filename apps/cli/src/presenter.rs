use std::sync::Arc;

use console::style;
use indicatif::ProgressBar;
use sentiscope_core::{
    events::{
        AnalysisFailed, AnalysisPhaseChanged, ContentAppended, EnrichedEvent, EventBus,
        SentimentAnalyzed, SummaryGenerated, downcast_ref, to_json,
    },
    format::{format_stats, percent},
    queues::QueueKind,
};
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::warn;

pub const SUBSCRIBER_ID: &str = "cli.presenter";

const EVENT_TYPES: &[&str] = &[
    AnalysisPhaseChanged::EVENT_TYPE,
    SentimentAnalyzed::EVENT_TYPE,
    SummaryGenerated::EVENT_TYPE,
    AnalysisFailed::EVENT_TYPE,
    ContentAppended::EVENT_TYPE,
];

/// Renders pipeline events onto a spinner, or as JSON lines with `--events`.
pub struct Presenter {
    spinner: ProgressBar,
    json_events: bool,
}

pub struct PresenterHandle {
    shutdown_tx: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

impl PresenterHandle {
    /// Flush whatever is still queued and stop.
    pub async fn finish(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            warn!(error = %e, "presenter task ended abnormally");
        }
    }
}

impl Presenter {
    pub fn new(spinner: ProgressBar, json_events: bool) -> Self {
        Self {
            spinner,
            json_events,
        }
    }

    pub fn spawn(self, bus: &EventBus) -> PresenterHandle {
        let subscription = bus.subscribe(
            SUBSCRIBER_ID,
            EVENT_TYPES,
            QueueKind::FifoDropOldest { capacity: 64 },
        );
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = subscription.recv() => self.handle(&event),
                    _ = shutdown_rx.recv() => {
                        for event in subscription.drain() {
                            self.handle(&event);
                        }
                        break;
                    }
                }
            }
        });

        PresenterHandle { shutdown_tx, task }
    }

    fn handle(&self, event: &Arc<EnrichedEvent>) {
        if self.json_events {
            match to_json(event.event.as_ref()) {
                Ok(line) => self.spinner.println(line),
                Err(e) => warn!(error = %e, "event not serializable"),
            }
        }

        if let Some(phase) = downcast_ref::<AnalysisPhaseChanged>(&event.event) {
            if !phase.status_text.is_empty() {
                self.spinner.set_message(phase.status_text);
            }
        } else if let Some(sentiment) = downcast_ref::<SentimentAnalyzed>(&event.event) {
            self.spinner.println(format!(
                "{} Sentiment: {} {}",
                style("✓").green().bold(),
                style(sentiment.sentiment.label.display_name()).yellow(),
                style(format!("({}%)", percent(sentiment.sentiment.confidence))).dim()
            ));
        } else if let Some(summary) = downcast_ref::<SummaryGenerated>(&event.event) {
            self.spinner.println(format!(
                "{} Summary: {} → {} words",
                style("✓").green().bold(),
                summary.summary.original_length,
                summary.summary.summary_length
            ));
        } else if let Some(failed) = downcast_ref::<AnalysisFailed>(&event.event) {
            self.spinner.println(format!(
                "{} {} during {}",
                style("✗").red().bold(),
                failed.message,
                style(failed.stage).dim()
            ));
        } else if let Some(appended) = downcast_ref::<ContentAppended>(&event.event) {
            self.spinner.println(format!(
                "{} {} +{} {}",
                style("✓").green().bold(),
                appended.source,
                appended.added,
                style(format!("[{}]", format_stats(&appended.stats))).dim()
            ));
        }
    }
}
