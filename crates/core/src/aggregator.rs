use std::sync::Arc;

use tracing::debug;

use crate::{
    events::{ContentAppended, EventBus},
    types::{Article, ContentStats, ExtractedContent, Transcript, UrlKind},
};

/// Session-scoped store of everything extracted so far.
///
/// Append-only and order-preserving. Re-extracting a URL appends a second
/// entry.
#[derive(Default)]
pub struct ContentStore {
    content: ExtractedContent,
    bus: Option<EventBus>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bus(bus: EventBus) -> Self {
        Self {
            content: ExtractedContent::default(),
            bus: Some(bus),
        }
    }

    pub fn append_article(&mut self, article: Article) {
        self.append_articles(UrlKind::Single, [article]);
    }

    /// Append a batch with a single word-count pass.
    pub fn append_articles(
        &mut self,
        source: UrlKind,
        articles: impl IntoIterator<Item = Article>,
    ) {
        let before = self.content.articles().len();
        self.content.push_articles(articles);
        let added = self.content.articles().len() - before;
        self.announce(source, added);
    }

    pub fn append_transcript(&mut self, transcript: Transcript) {
        self.content.push_transcript(transcript);
        self.announce(UrlKind::Youtube, 1);
    }

    pub fn stats(&self) -> ContentStats {
        ContentStats {
            article_count: self.content.articles().len(),
            transcript_count: self.content.transcripts().len(),
            total_words: self.content.total_words(),
        }
    }

    pub fn latest_article(&self) -> Option<&Article> {
        self.content.articles().last()
    }

    pub fn latest_transcript(&self) -> Option<&Transcript> {
        self.content.transcripts().last()
    }

    pub fn find_article(&self, id: &str) -> Option<&Article> {
        self.content.articles().iter().find(|a| a.id == id)
    }

    pub fn portal_articles(&self) -> &[Article] {
        self.content.articles()
    }

    /// Plain-text rendition of an article for copying.
    pub fn clipboard_text(&self, id: &str) -> Option<String> {
        self.find_article(id).map(|article| {
            let body = article
                .body
                .as_deref()
                .filter(|b| !b.trim().is_empty())
                .unwrap_or("No content available");
            format!("{}\n\n{}\n\nSource: {}", article.headline, body, article.url)
        })
    }

    pub fn snapshot(&self) -> &ExtractedContent {
        &self.content
    }

    fn announce(&self, source: UrlKind, added: usize) {
        let stats = self.stats();
        debug!(%source, added, total_words = stats.total_words, "content appended");
        if let Some(bus) = &self.bus {
            bus.publish(Arc::new(ContentAppended::new(source, added, stats)));
        }
    }
}
