//! Pointer capture and pointer event routing.
//!
//! Raw mouse and touch input is normalized into pointer events, delivered through the host's
//! [`EventDispatcher`](events::EventDispatcher), and retargeted to whatever element captured the
//! pointer. Capture requests stay pending until the next event for that pointer settles them.

pub mod document;
mod error;
pub mod events;
mod handler;
mod options;
pub mod registry;
pub mod remote;
mod spoofing;
mod statics;
#[cfg(test)]
mod test_support;

pub use error::PointerError;
pub use handler::PointerEventHandler;
pub use options::{PointerOptions, ProcessKind};
pub use spoofing::SpoofedPointerId;
pub use statics::{initialize_statics, pointer_event_handler, release_statics, try_pointer_event_handler};
