use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::document::DocumentId;
use crate::remote::RemoteCaptureChannel;

/// Stores the document-level state the pointer handler consults: fingerprinting policy,
/// teardown status, pointer lock and the channel to the parent process.
pub struct Document {
    id: DocumentId,
    resist_fingerprinting: Cell<bool>,
    /// Set once the presentation of this document starts tearing down.
    destroying: Cell<bool>,
    pointer_locked: Cell<bool>,
    /// Mouse input is being turned into touch input by a responsive design simulator.
    simulating_touch: Cell<bool>,
    remote_channel: RefCell<Option<Rc<dyn RemoteCaptureChannel>>>,
}

impl Document {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            id: DocumentId::next(),
            resist_fingerprinting: Cell::new(false),
            destroying: Cell::new(false),
            pointer_locked: Cell::new(false),
            simulating_touch: Cell::new(false),
            remote_channel: RefCell::new(None),
        })
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Whether pointer identities exposed to this document should be collapsed.
    pub fn should_resist_fingerprinting(&self) -> bool {
        self.resist_fingerprinting.get()
    }

    pub fn set_resist_fingerprinting(&self, resist: bool) {
        self.resist_fingerprinting.set(resist);
    }

    pub fn is_destroying(&self) -> bool {
        self.destroying.get()
    }

    /// Marks the document as being torn down. Events are no longer delivered to it.
    pub fn begin_destroy(&self) {
        self.destroying.set(true);
    }

    pub fn has_pointer_lock(&self) -> bool {
        self.pointer_locked.get()
    }

    pub fn set_pointer_lock(&self, locked: bool) {
        self.pointer_locked.set(locked);
    }

    pub fn is_simulating_touch(&self) -> bool {
        self.simulating_touch.get()
    }

    pub fn set_simulating_touch(&self, simulating: bool) {
        self.simulating_touch.set(simulating);
    }

    /// The channel to the parent process, when this document lives in a content process.
    pub fn remote_channel(&self) -> Option<Rc<dyn RemoteCaptureChannel>> {
        self.remote_channel.borrow().clone()
    }

    pub fn set_remote_channel(&self, channel: Option<Rc<dyn RemoteCaptureChannel>>) {
        *self.remote_channel.borrow_mut() = channel;
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("resist_fingerprinting", &self.resist_fingerprinting.get())
            .field("destroying", &self.destroying.get())
            .finish_non_exhaustive()
    }
}
