use std::cell::OnceCell;

use crate::events::{InputSource, PointerId};

/// Remembers the pointer id used in place of real ids for documents that resist fingerprinting.
///
/// The first pointer seen from the spoofed input source wins. The id is never cleared.
#[derive(Debug, Default)]
pub struct SpoofedPointerId {
    pointer_id: OnceCell<PointerId>,
}

impl SpoofedPointerId {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn maybe_cache(&self, input_source: InputSource, spoofed_input_source: InputSource, pointer_id: PointerId) {
        if input_source != spoofed_input_source {
            return;
        }
        let _ = self.pointer_id.set(pointer_id);
    }

    pub fn get(&self) -> Option<PointerId> {
        self.pointer_id.get().copied()
    }

    /// The spoofed id, or the mouse pointer id while none has been observed.
    pub fn for_resist_fingerprinting(&self) -> PointerId {
        self.get().unwrap_or(PointerId::MOUSE)
    }
}
