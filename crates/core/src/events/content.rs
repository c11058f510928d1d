use serde::Serialize;

use crate::{
    events::{EventHeader, event::impl_event},
    types::{ContentStats, UrlKind},
};

#[derive(Debug, Clone, Serialize)]
pub struct ContentAppended {
    pub header: EventHeader,
    pub source: UrlKind,
    pub added: usize,
    pub stats: ContentStats,
}

impl ContentAppended {
    pub fn new(source: UrlKind, added: usize, stats: ContentStats) -> Self {
        Self {
            header: EventHeader::root(),
            source,
            added,
            stats,
        }
    }
}

impl_event!(ContentAppended, "content.appended");
