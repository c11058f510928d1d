use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

/// Single-slot inbox: a new value replaces whatever was not yet taken.
pub struct Latest1Queue<T> {
    slot: Mutex<Option<T>>,
    notify: Arc<Notify>,
}

impl<T> Latest1Queue<T> {
    pub fn new(notify: Arc<Notify>) -> Self {
        Self {
            slot: Mutex::new(None),
            notify,
        }
    }

    /// Store `value`, returning `true` when an untaken value was overwritten.
    pub fn set(&self, value: T) -> bool {
        let replaced = self
            .slot
            .lock()
            .expect("Latest1Queue poisoned")
            .replace(value)
            .is_some();
        self.notify.notify_one();
        replaced
    }

    pub fn try_recv(&self) -> Option<T> {
        self.slot.lock().expect("Latest1Queue poisoned").take()
    }
}
