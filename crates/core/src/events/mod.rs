pub mod analysis;
pub mod bus;
pub mod content;
pub mod event;

pub use analysis::*;
pub use bus::*;
pub use content::*;
pub use event::{EnrichedEvent, Event, EventHeader, downcast_ref, to_json};
