use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use tokio::sync::Notify;

/// Bounded FIFO inbox that evicts the oldest entry when full.
pub struct FifoDropOldestQueue<T> {
    buf: Mutex<VecDeque<T>>,
    capacity: usize,
    notify: Arc<Notify>,
}

impl<T> FifoDropOldestQueue<T> {
    pub fn new(capacity: usize, notify: Arc<Notify>) -> Self {
        assert!(capacity > 0);

        Self {
            buf: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            notify,
        }
    }

    /// Push `value`, returning `true` when the oldest entry had to be dropped.
    pub fn push_overwrite(&self, value: T) -> bool {
        let mut buf = self.buf.lock().expect("FifoDropOldestQueue poisoned");
        let dropped = if buf.len() >= self.capacity {
            buf.pop_front().is_some()
        } else {
            false
        };
        buf.push_back(value);
        drop(buf);
        self.notify.notify_one();
        dropped
    }

    pub fn try_recv(&self) -> Option<T> {
        self.buf
            .lock()
            .expect("FifoDropOldestQueue poisoned")
            .pop_front()
    }

    pub fn len(&self) -> usize {
        self.buf.lock().expect("FifoDropOldestQueue poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
