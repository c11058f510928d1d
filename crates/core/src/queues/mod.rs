pub mod fifo_drop_oldest_queue;
pub mod latest1_queue;

pub use fifo_drop_oldest_queue::*;
pub use latest1_queue::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    /// Only the most recent event matters (status lines).
    Latest1,
    /// Every event in order, bounded.
    FifoDropOldest { capacity: usize },
}
