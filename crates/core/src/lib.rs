pub mod aggregator;
pub mod analysis;
pub mod api;
pub mod auth;
pub mod classifier;
pub mod client;
pub mod config;
pub mod csrf;
pub mod error;
pub mod events;
pub mod export;
pub mod extraction;
pub mod format;
pub mod queues;
pub mod types;
pub mod view;

pub use aggregator::ContentStore;
pub use analysis::{AnalysisOutcome, AnalysisState, Analyzer, DisplayedContent};
pub use api::{PortalRequest, ScopeApi};
pub use auth::{AuthResponse, SignInForm, SignUpForm};
pub use classifier::{classify, extract_video_id};
pub use client::{Backend, Endpoint, HttpBackend};
pub use config::ClientConfig;
pub use error::{Result, ScopeError};
pub use export::{ExportKind, export_to_dir, parse_extracted};
pub use extraction::{ExtractOptions, ExtractionReport, Extractor};
pub use format::{format_outcome_readable, format_stats, format_transcript_with_timestamps};
pub use types::{
    Article, ContentStats, ExtractedContent, Paragraph, SentimentLabel, SentimentResult,
    SentimentScores, SummaryResult, Transcript, UrlKind,
};
