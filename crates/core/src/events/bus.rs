use std::{
    collections::HashMap,
    sync::{
        Arc, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

use tokio::{sync::Notify, time::Instant};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::{
    events::{EnrichedEvent, Event},
    queues::{FifoDropOldestQueue, Latest1Queue, QueueKind},
};

pub struct BusConfig {
    pub session_id: Uuid,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            session_id: Uuid::new_v4(),
        }
    }
}

#[derive(Default)]
pub struct BusMetrics {
    pub published_total: AtomicU64,
    pub unrouted_publish_total: AtomicU64,
    pub drops_total: AtomicU64,
}

enum RouteInbox {
    Latest1(Arc<Latest1Queue<Arc<EnrichedEvent>>>),
    FifoDropOldest(Arc<FifoDropOldestQueue<Arc<EnrichedEvent>>>),
}

impl RouteInbox {
    /// Returns `true` when delivering displaced an undelivered event.
    fn deliver(&self, event: Arc<EnrichedEvent>) -> bool {
        match self {
            RouteInbox::Latest1(q) => q.set(event),
            RouteInbox::FifoDropOldest(q) => q.push_overwrite(event),
        }
    }
}

struct Route {
    subscriber_id: &'static str,
    inbox: Arc<RouteInbox>,
}

/// In-process fan-out of pipeline events to presenters.
///
/// Cheap to clone; every clone publishes into the same routing table.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

struct EventBusInner {
    session_id: Uuid,
    next_ingest_seq: AtomicU64,
    routes: RwLock<HashMap<&'static str, Vec<Route>>>,
    metrics: BusMetrics,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

impl EventBus {
    pub fn new(cfg: BusConfig) -> Self {
        Self {
            inner: Arc::new(EventBusInner {
                session_id: cfg.session_id,
                next_ingest_seq: AtomicU64::new(0),
                routes: RwLock::new(HashMap::new()),
                metrics: BusMetrics::default(),
            }),
        }
    }

    /// Register a subscriber for the given event types. All types share one inbox.
    pub fn subscribe(
        &self,
        subscriber_id: &'static str,
        event_types: &[&'static str],
        queue_kind: QueueKind,
    ) -> Subscription {
        let notify = Arc::new(Notify::new());
        let inbox = Arc::new(match queue_kind {
            QueueKind::Latest1 => {
                RouteInbox::Latest1(Arc::new(Latest1Queue::new(Arc::clone(&notify))))
            }
            QueueKind::FifoDropOldest { capacity } => RouteInbox::FifoDropOldest(Arc::new(
                FifoDropOldestQueue::new(capacity.max(1), Arc::clone(&notify)),
            )),
        });

        let mut routes = self.inner.routes.write().expect("event routes poisoned");
        for event_type in event_types {
            routes.entry(*event_type).or_default().push(Route {
                subscriber_id,
                inbox: Arc::clone(&inbox),
            });
        }
        debug!(subscriber_id, ?event_types, "subscriber registered");

        Subscription {
            subscriber_id,
            inbox,
            notify,
        }
    }

    pub fn publish(&self, event: Arc<dyn Event>) {
        let ingest_seq = self.inner.next_ingest_seq.fetch_add(1, Ordering::Relaxed);
        self.inner.metrics.published_total.fetch_add(1, Ordering::Relaxed);

        let enriched_event = Arc::new(EnrichedEvent {
            event,
            session_id: self.inner.session_id,
            ingest_seq,
            ingested_at: Instant::now(),
        });

        let routes = self.inner.routes.read().expect("event routes poisoned");
        let event_type = enriched_event.event.event_type();
        let Some(routes) = routes.get(event_type) else {
            self.inner
                .metrics
                .unrouted_publish_total
                .fetch_add(1, Ordering::Relaxed);
            trace!(event_type, "no subscribers for event");
            return;
        };

        for route in routes {
            if route.inbox.deliver(Arc::clone(&enriched_event)) {
                self.inner.metrics.drops_total.fetch_add(1, Ordering::Relaxed);
                trace!(
                    event_type,
                    subscriber_id = route.subscriber_id,
                    "undelivered event displaced"
                );
            }
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.inner.session_id
    }

    pub fn metrics(&self) -> &BusMetrics {
        &self.inner.metrics
    }
}

pub struct Subscription {
    subscriber_id: &'static str,
    inbox: Arc<RouteInbox>,
    notify: Arc<Notify>,
}

impl Subscription {
    pub fn subscriber_id(&self) -> &'static str {
        self.subscriber_id
    }

    pub fn try_recv(&self) -> Option<Arc<EnrichedEvent>> {
        match self.inbox.as_ref() {
            RouteInbox::Latest1(q) => q.try_recv(),
            RouteInbox::FifoDropOldest(q) => q.try_recv(),
        }
    }

    /// Wait for the next event.
    pub async fn recv(&self) -> Arc<EnrichedEvent> {
        loop {
            if let Some(event) = self.try_recv() {
                return event;
            }
            self.notify.notified().await;
        }
    }

    /// Everything currently queued, oldest first.
    pub fn drain(&self) -> Vec<Arc<EnrichedEvent>> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
