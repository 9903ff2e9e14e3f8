use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use ui_events::pointer::PointerType;

use crate::document::{Document, Node, same_node};
use crate::events::{InputSource, PointerId};

fn same_target(a: Option<&Rc<dyn Node>>, b: Option<&Rc<dyn Node>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => same_node(a, b),
        (None, None) => true,
        _ => false,
    }
}

fn owned_by(target: &Rc<dyn Node>, document: &Rc<Document>) -> bool {
    target.owner_document().is_some_and(|owner| Rc::ptr_eq(&owner, document))
}

/// The capture state of a single pointer.
///
/// `pending` is the most recent capture request, `override` is the element actually capturing. They
/// differ between a request (or release) and the next event that settles the state.
#[derive(Clone, Default)]
pub struct CaptureEntry {
    pending: Option<Rc<dyn Node>>,
    override_target: Option<Rc<dyn Node>>,
}

impl CaptureEntry {
    pub fn pending_target(&self) -> Option<&Rc<dyn Node>> {
        self.pending.as_ref()
    }

    pub fn override_target(&self) -> Option<&Rc<dyn Node>> {
        self.override_target.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_none() && self.override_target.is_none()
    }

    /// No capture change is waiting for the next event.
    pub fn is_settled(&self) -> bool {
        same_target(self.pending.as_ref(), self.override_target.as_ref())
    }
}

impl std::fmt::Debug for CaptureEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureEntry")
            .field("pending", &self.pending.as_ref().map(|target| target.id()))
            .field("override", &self.override_target.as_ref().map(|target| target.id()))
            .finish()
    }
}

/// The result of settling a capture entry: the element that loses capture and the one that gets it.
#[derive(Clone, Default)]
pub struct CaptureTransition {
    pub lost: Option<Rc<dyn Node>>,
    pub got: Option<Rc<dyn Node>>,
}

/// What the handler knows about a pointer that entered the widget or went down.
#[derive(Debug, Clone)]
pub struct PointerInfo {
    pub pointer_id: PointerId,
    pub input_source: InputSource,
    /// The pointer has at least one button (or contact) down.
    pub active: bool,
    pub is_primary: bool,
    pub from_touch_event: bool,
    pub active_document: Option<Weak<Document>>,
    /// Content prevented the default of the primary pointerdown. Compatibility mouse events are
    /// suppressed until the matching pointerup.
    pub prevent_mouse_events_by_content: bool,
}

impl PointerInfo {
    pub fn new(pointer_id: PointerId, input_source: InputSource) -> Self {
        Self {
            pointer_id,
            input_source,
            active: false,
            is_primary: true,
            from_touch_event: false,
            active_document: None,
            prevent_mouse_events_by_content: false,
        }
    }

    pub fn pointer_type(&self) -> PointerType {
        self.input_source.pointer_type()
    }

    pub fn active_document(&self) -> Option<Rc<Document>> {
        self.active_document.as_ref().and_then(Weak::upgrade)
    }

    fn is_active_in(&self, document: &Rc<Document>) -> bool {
        self.active_document
            .as_ref()
            .is_some_and(|active| std::ptr::eq(active.as_ptr(), Rc::as_ptr(document)))
    }
}

/// Process-wide pointer tables: capture ownership and active pointers.
///
/// The registry holds strong references to capturing elements. Hosts must call
/// [`PointerRegistry::purge_for_document`] before a document goes away.
#[derive(Default)]
pub struct PointerRegistry {
    captures: FxHashMap<PointerId, CaptureEntry>,
    pointers: FxHashMap<PointerId, PointerInfo>,
}

impl PointerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a capture request. The current override target is left alone.
    pub fn set_pending_capture(&mut self, pointer_id: PointerId, target: Rc<dyn Node>) {
        self.captures.entry(pointer_id).or_default().pending = Some(target);
    }

    pub fn capture_entry(&self, pointer_id: PointerId) -> Option<&CaptureEntry> {
        self.captures.get(&pointer_id)
    }

    /// Clears the pending target and returns it. Unknown pointer ids are ignored.
    pub fn release_pending_capture(&mut self, pointer_id: PointerId) -> Option<Rc<dyn Node>> {
        let entry = self.captures.get_mut(&pointer_id)?;
        let released = entry.pending.take();
        if entry.is_empty() {
            self.captures.remove(&pointer_id);
        }
        released
    }

    /// Releases every pending capture and returns the pointers that had one.
    pub fn release_all_pending_captures(&mut self) -> Vec<(PointerId, Rc<dyn Node>)> {
        let mut released = Vec::new();
        for (pointer_id, entry) in self.captures.iter_mut() {
            if let Some(pending) = entry.pending.take() {
                released.push((*pointer_id, pending));
            }
        }
        self.captures.retain(|_, entry| !entry.is_empty());
        released
    }

    /// Pointers whose pending capture target matches `predicate`.
    pub fn pending_captures_matching(&self, predicate: impl Fn(&Rc<dyn Node>) -> bool) -> Vec<PointerId> {
        self.captures
            .iter()
            .filter(|(_, entry)| entry.pending.as_ref().is_some_and(&predicate))
            .map(|(pointer_id, _)| *pointer_id)
            .collect()
    }

    /// Promotes the pending target of `pointer_id` to the override target.
    ///
    /// Returns `None` when there is nothing to settle. The entry is dropped once both targets are
    /// empty. The returned transition holds its own references, so listeners may mutate the registry
    /// while it is dispatched.
    pub fn settle(&mut self, pointer_id: PointerId) -> Option<CaptureTransition> {
        let entry = self.captures.get_mut(&pointer_id)?;
        if entry.is_settled() {
            return None;
        }

        let transition = CaptureTransition {
            lost: entry.override_target.clone(),
            got: entry.pending.clone(),
        };
        entry.override_target = entry.pending.clone();
        if entry.is_empty() {
            self.captures.remove(&pointer_id);
        }
        Some(transition)
    }

    pub fn capture_count(&self) -> usize {
        self.captures.len()
    }

    pub fn upsert_pointer_info(&mut self, info: PointerInfo) {
        self.pointers.insert(info.pointer_id, info);
    }

    pub fn remove_pointer_info(&mut self, pointer_id: PointerId) -> Option<PointerInfo> {
        self.pointers.remove(&pointer_id)
    }

    pub fn pointer_info(&self, pointer_id: PointerId) -> Option<&PointerInfo> {
        self.pointers.get(&pointer_id)
    }

    pub fn pointer_info_mut(&mut self, pointer_id: PointerId) -> Option<&mut PointerInfo> {
        self.pointers.get_mut(&pointer_id)
    }

    /// Any touch-originated pointer is known. Used to pick the primary touch contact.
    pub fn has_active_touch_pointer(&self) -> bool {
        self.pointers.values().any(|info| info.from_touch_event)
    }

    /// Drops every reference into `document`. Must run before the document is torn down.
    pub fn purge_for_document(&mut self, document: &Rc<Document>) {
        self.captures.retain(|_, entry| {
            if entry.pending.as_ref().is_some_and(|target| owned_by(target, document)) {
                entry.pending = None;
            }
            if entry.override_target.as_ref().is_some_and(|target| owned_by(target, document)) {
                entry.override_target = None;
            }
            !entry.is_empty()
        });
        self.pointers.retain(|_, info| !info.is_active_in(document));
    }

    /// Drops every entry. Used when the process-wide handler shuts down.
    pub fn clear(&mut self) {
        self.captures.clear();
        self.pointers.clear();
    }
}
