//! The event system: the taxonomy, the data that rides with a dispatch,
//! and the handler contract.

pub mod event;
pub mod handler;

pub use event::{EventData, EventMap, EventPayload, EventType};
pub use handler::{EventHandler, PendingTrigger};
