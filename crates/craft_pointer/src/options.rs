use crate::events::InputSource;

/// Which side of a multi-process deployment this handler lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessKind {
    /// Owns the widgets and brokers capture between remote endpoints.
    #[default]
    Parent,
    /// Renders content for a single remote endpoint.
    Content,
}

/// Configuration options for the pointer event handler.
///
/// These mirror the preferences a host exposes for pointer events. They are read once when the
/// handler is created.
#[derive(Debug, Clone)]
pub struct PointerOptions {
    /// Capture the pointer on the pointerdown target for touch input.
    ///
    /// Defaults to `true`.
    pub implicit_capture_for_touch: bool,
    /// Collapse pointer ids into a single spoofed id for documents that resist fingerprinting.
    ///
    /// Defaults to `false`.
    pub resist_fingerprinting: bool,
    /// Defaults to [`ProcessKind::Parent`].
    pub process_kind: ProcessKind,
    /// The input source whose first pointer id becomes the spoofed pointer id.
    ///
    /// Defaults to [`InputSource::Mouse`].
    pub spoofed_input_source: InputSource,
    /// The platform delivers pen input as native pointer messages. Those don't support drag and drop.
    pub dispatch_by_pointer_messages: bool,
}

impl Default for PointerOptions {
    fn default() -> Self {
        Self {
            implicit_capture_for_touch: true,
            resist_fingerprinting: false,
            process_kind: ProcessKind::Parent,
            spoofed_input_source: InputSource::Mouse,
            dispatch_by_pointer_messages: false,
        }
    }
}

impl PointerOptions {
    /// Options for a content process.
    pub fn content() -> Self {
        Self {
            process_kind: ProcessKind::Content,
            ..Default::default()
        }
    }

    pub fn implicit_capture_for_touch(mut self, enabled: bool) -> Self {
        self.implicit_capture_for_touch = enabled;
        self
    }

    pub fn resist_fingerprinting(mut self, enabled: bool) -> Self {
        self.resist_fingerprinting = enabled;
        self
    }

    pub fn process_kind(mut self, process_kind: ProcessKind) -> Self {
        self.process_kind = process_kind;
        self
    }

    pub fn spoofed_input_source(mut self, input_source: InputSource) -> Self {
        self.spoofed_input_source = input_source;
        self
    }

    pub fn dispatch_by_pointer_messages(mut self, enabled: bool) -> Self {
        self.dispatch_by_pointer_messages = enabled;
        self
    }

    pub fn is_parent_process(&self) -> bool {
        self.process_kind == ProcessKind::Parent
    }
}
