//! Logging facade shared by the craft crates.
//!
//! Crates log through these re-exports so the backing `tracing` version is pinned in one place.

pub use tracing::{Level, debug, error, info, span, trace, warn};
