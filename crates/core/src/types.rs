use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate an opaque item id in the `item_xxxxxxxxx` form the backend uses.
pub fn generate_item_id() -> String {
    let raw = Uuid::new_v4().simple().to_string();
    format!("item_{}", &raw[..9])
}

/// Count whitespace-separated words. Blank text counts as zero.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default = "generate_item_id")]
    pub id: String,
    pub headline: String,
    pub url: String,
    /// `None` means only the headline was extracted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Article {
    pub fn new(headline: impl Into<String>, url: impl Into<String>, body: Option<String>) -> Self {
        Self {
            id: generate_item_id(),
            headline: headline.into(),
            url: url.into(),
            body,
        }
    }

    pub fn word_count(&self) -> usize {
        self.body.as_deref().map(word_count).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub timestamp: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub video_id: String,
    pub language: String,
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
}

impl Transcript {
    pub fn word_count(&self) -> usize {
        self.paragraphs.iter().map(|p| word_count(&p.text)).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }

    /// Capitalized form used on result cards.
    pub fn display_name(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub confidence: f64,
    pub scores: SentimentScores,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    pub original_length: u64,
    pub summary_length: u64,
    pub compression_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlKind {
    Youtube,
    Portal,
    Single,
}

impl UrlKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrlKind::Youtube => "youtube",
            UrlKind::Portal => "portal",
            UrlKind::Single => "single",
        }
    }
}

impl fmt::Display for UrlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything extracted during one session.
///
/// `total_words` is derived: it is recomputed after every mutation and
/// recomputed again when the structure is deserialized, so it can never drift
/// from the articles and transcripts it summarizes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ExtractedContentRepr")]
pub struct ExtractedContent {
    articles: Vec<Article>,
    transcripts: Vec<Transcript>,
    total_words: usize,
}

#[derive(Deserialize)]
struct ExtractedContentRepr {
    #[serde(default)]
    articles: Vec<Article>,
    #[serde(default)]
    transcripts: Vec<Transcript>,
}

impl From<ExtractedContentRepr> for ExtractedContent {
    fn from(repr: ExtractedContentRepr) -> Self {
        let mut content = Self {
            articles: repr.articles,
            transcripts: repr.transcripts,
            total_words: 0,
        };
        content.recount();
        content
    }
}

impl ExtractedContent {
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn transcripts(&self) -> &[Transcript] {
        &self.transcripts
    }

    pub fn total_words(&self) -> usize {
        self.total_words
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty() && self.transcripts.is_empty()
    }

    pub(crate) fn push_articles(&mut self, articles: impl IntoIterator<Item = Article>) {
        self.articles.extend(articles);
        self.recount();
    }

    pub(crate) fn push_transcript(&mut self, transcript: Transcript) {
        self.transcripts.push(transcript);
        self.recount();
    }

    fn recount(&mut self) {
        let article_words: usize = self.articles.iter().map(Article::word_count).sum();
        let transcript_words: usize = self.transcripts.iter().map(Transcript::word_count).sum();
        self.total_words = article_words + transcript_words;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStats {
    pub article_count: usize,
    pub transcript_count: usize,
    pub total_words: usize,
}
