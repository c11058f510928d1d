use std::{any::Any, sync::Arc, time::SystemTime};

use erased_serde::Serialize as ErasedSerialize;
use serde::Serialize;
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::Result;

pub trait Event: Send + Sync + ErasedSerialize + 'static {
    fn event_id(&self) -> Uuid;
    fn parent_ids(&self) -> &[Uuid];
    fn event_type(&self) -> &'static str;
    fn timestamp(&self) -> SystemTime;

    fn as_any(&self) -> &dyn Any;
}

erased_serde::serialize_trait_object!(Event);

#[derive(Clone, Debug, Serialize)]
pub struct EventHeader {
    pub event_id: Uuid,
    pub parent_ids: Vec<Uuid>,
    pub timestamp: SystemTime,
}

impl EventHeader {
    pub fn root() -> Self {
        Self {
            event_id: Uuid::new_v4(),
            parent_ids: Vec::new(),
            timestamp: SystemTime::now(),
        }
    }

    pub fn child_of(parent: Uuid) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            parent_ids: vec![parent],
            timestamp: SystemTime::now(),
        }
    }

    /// Child of `parent` when there is one, otherwise a root.
    pub fn after(parent: Option<Uuid>) -> Self {
        parent.map(Self::child_of).unwrap_or_else(Self::root)
    }
}

pub struct EnrichedEvent {
    pub event: Arc<dyn Event>,
    pub ingest_seq: u64,
    pub session_id: Uuid,
    pub ingested_at: Instant,
}

pub fn downcast_ref<T: 'static>(e: &Arc<dyn Event>) -> Option<&T> {
    e.as_any().downcast_ref::<T>()
}

/// Serialize any event to JSON, e.g. for a `--json` event log.
pub fn to_json(event: &dyn Event) -> Result<String> {
    Ok(serde_json::to_string(event)?)
}

macro_rules! impl_event {
    ($ty:ty, $event_type:literal) => {
        impl $ty {
            pub const EVENT_TYPE: &'static str = $event_type;
        }

        impl $crate::events::Event for $ty {
            fn event_id(&self) -> uuid::Uuid {
                self.header.event_id
            }

            fn parent_ids(&self) -> &[uuid::Uuid] {
                &self.header.parent_ids
            }

            fn event_type(&self) -> &'static str {
                Self::EVENT_TYPE
            }

            fn timestamp(&self) -> std::time::SystemTime {
                self.header.timestamp
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self as &dyn std::any::Any
            }
        }
    };
}

pub(crate) use impl_event;
