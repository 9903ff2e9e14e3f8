use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

use craft_logging::{debug, warn};

use crate::PointerError;
use crate::document::{Document, Node, is_inclusive_descendant_of, same_node};
use crate::events::{
    EventFlags, EventReason, InputSource, MouseEvent, MouseMessage, PointerEvent, PointerId, PointerMessage,
    WidgetEvent,
};
use crate::options::PointerOptions;
use crate::registry::{CaptureEntry, PointerInfo, PointerRegistry};
use crate::remote::{CaptureArbiter, EndpointId, RemoteEndpoint, RemoteRejectReason, notify_release_all};
use crate::spoofing::SpoofedPointerId;

pub(crate) struct HandlerState {
    pub(crate) options: PointerOptions,
    pub(crate) registry: RefCell<PointerRegistry>,
    pub(crate) spoofed_pointer_id: SpoofedPointerId,
    /// Only present in the parent process.
    pub(crate) arbiter: Option<RefCell<CaptureArbiter>>,
}

/// Routes pointer events and tracks pointer capture.
///
/// This is a cheap handle. Clones share the same tables, which lets listener code hold one
/// and request or release capture while the handler is dispatching.
#[derive(Clone)]
pub struct PointerEventHandler {
    pub(crate) inner: Rc<HandlerState>,
}

impl PointerEventHandler {
    pub fn new(options: PointerOptions) -> Self {
        let arbiter = options.is_parent_process().then(|| RefCell::new(CaptureArbiter::new()));
        Self {
            inner: Rc::new(HandlerState {
                options,
                registry: RefCell::new(PointerRegistry::new()),
                spoofed_pointer_id: SpoofedPointerId::new(),
                arbiter,
            }),
        }
    }

    pub fn options(&self) -> &PointerOptions {
        &self.inner.options
    }

    /// Read access to the pointer tables. Don't hold the guard across a dispatch.
    pub fn registry(&self) -> Ref<'_, PointerRegistry> {
        self.inner.registry.borrow()
    }

    pub(crate) fn registry_mut(&self) -> RefMut<'_, PointerRegistry> {
        self.inner.registry.borrow_mut()
    }

    pub(crate) fn downgrade(&self) -> Weak<HandlerState> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(state: &Weak<HandlerState>) -> Option<Self> {
        state.upgrade().map(|inner| Self { inner })
    }

    /// Drops every capture and pointer record. Called when the process-wide handler shuts down.
    pub fn shutdown(&self) {
        self.registry_mut().clear();
        if let Some(arbiter) = &self.inner.arbiter {
            *arbiter.borrow_mut() = CaptureArbiter::new();
        }
    }

    pub fn spoofed_pointer_id(&self) -> Option<PointerId> {
        self.inner.spoofed_pointer_id.get()
    }

    pub fn spoofed_pointer_id_for_resist_fingerprinting(&self) -> PointerId {
        self.inner.spoofed_pointer_id.for_resist_fingerprinting()
    }

    pub fn maybe_cache_spoofed_pointer_id(&self, input_source: InputSource, pointer_id: PointerId) {
        self.inner
            .spoofed_pointer_id
            .maybe_cache(input_source, self.inner.options.spoofed_input_source, pointer_id);
    }

    /// Keeps the active pointer table in sync with the pointer's lifecycle.
    ///
    /// Accepts mouse enter/exit widget events and pointer down/up/cancel events.
    pub fn update_active_pointer_state(&self, event: &WidgetEvent, target: Option<&Rc<dyn Node>>) {
        match event {
            WidgetEvent::Mouse(mouse) => self.update_active_pointer_state_for_mouse(mouse),
            WidgetEvent::Pointer(pointer) => self.update_active_pointer_state_for_pointer(pointer, target),
            WidgetEvent::Touch(_) => debug_assert!(false, "event has invalid type"),
        }
    }

    fn update_active_pointer_state_for_mouse(&self, mouse: &MouseEvent) {
        match mouse.message {
            MouseMessage::EnterIntoWidget => {
                self.registry_mut()
                    .upsert_pointer_info(PointerInfo::new(mouse.pointer_id, mouse.input_source));
                self.maybe_cache_spoofed_pointer_id(mouse.input_source, mouse.pointer_id);
            }
            MouseMessage::ExitFromWidget => {
                self.registry_mut().remove_pointer_info(mouse.pointer_id);
            }
            _ => debug_assert!(false, "event has invalid type"),
        }
    }

    pub(crate) fn update_active_pointer_state_for_pointer(&self, pointer: &PointerEvent, target: Option<&Rc<dyn Node>>) {
        match pointer.message {
            PointerMessage::Down => {
                let mut info = PointerInfo::new(pointer.pointer_id, pointer.input_source);
                info.active = true;
                info.is_primary = pointer.is_primary;
                info.from_touch_event = pointer.from_touch_event;
                info.active_document = target
                    .and_then(|target| target.owner_document())
                    .map(|document| Rc::downgrade(&document));
                self.registry_mut().upsert_pointer_info(info);
                self.maybe_cache_spoofed_pointer_id(pointer.input_source, pointer.pointer_id);
            }
            // A cancelled pointer is unlikely to produce more events, so it is treated like an up.
            PointerMessage::Up | PointerMessage::Cancel => {
                let mut registry = self.registry_mut();
                if pointer.input_source != InputSource::Touch {
                    let mut info = PointerInfo::new(pointer.pointer_id, pointer.input_source);
                    info.is_primary = pointer.is_primary;
                    info.from_touch_event = pointer.from_touch_event;
                    registry.upsert_pointer_info(info);
                } else {
                    registry.remove_pointer_info(pointer.pointer_id);
                }
            }
            _ => debug_assert!(false, "event has invalid type"),
        }
    }

    /// Requests capture and, from a content process, asks the parent to route the pointer here.
    ///
    /// The local request applies immediately. It is rolled back if the parent refuses.
    pub fn request_pointer_capture_by_id(&self, pointer_id: PointerId, element: &Rc<dyn Node>) {
        self.set_pointer_capture_by_id(pointer_id, element);

        let Some(document) = element.owner_document() else {
            return;
        };
        let Some(channel) = document.remote_channel() else {
            return;
        };

        let handler = self.downgrade();
        let document = Rc::downgrade(&document);
        channel.send_request_pointer_capture(
            pointer_id,
            Box::new(move |response: Result<bool, RemoteRejectReason>| match response {
                Ok(true) => {}
                Ok(false) => {
                    // The handler or the document may be gone by the time the parent answers.
                    if document.upgrade().is_none() {
                        return;
                    }
                    if let Some(handler) = PointerEventHandler::upgrade(&handler) {
                        debug!("parent refused capture of pointer {pointer_id}");
                        handler.release_pointer_capture_by_id(pointer_id);
                    }
                }
                Err(reason) => warn!("capture request for pointer {pointer_id} was rejected: {reason:?}"),
            }),
        );
    }

    pub fn set_pointer_capture_by_id(&self, pointer_id: PointerId, element: &Rc<dyn Node>) {
        debug_assert!(element.is_element(), "only elements can capture a pointer");
        debug!("pointer {pointer_id} capture requested by node {}", element.id());
        self.registry_mut().set_pending_capture(pointer_id, Rc::clone(element));
    }

    pub fn capture_entry(&self, pointer_id: PointerId) -> Option<CaptureEntry> {
        self.registry().capture_entry(pointer_id).cloned()
    }

    /// Clears the pending capture of `pointer_id`. The change applies on the next settle.
    pub fn release_pointer_capture_by_id(&self, pointer_id: PointerId) {
        let released = self.registry_mut().release_pending_capture(pointer_id);
        if let Some(pending) = released {
            notify_remote_release(pointer_id, &pending);
        }
    }

    pub fn release_all_pointer_capture(&self) {
        let released = self.registry_mut().release_all_pending_captures();
        for (pointer_id, pending) in released {
            notify_remote_release(pointer_id, &pending);
        }
    }

    /// The element currently capturing `pointer_id`.
    pub fn pointer_capturing_element(&self, pointer_id: PointerId) -> Option<Rc<dyn Node>> {
        self.registry()
            .capture_entry(pointer_id)
            .and_then(|entry| entry.override_target().cloned())
    }

    /// The element `event` must be retargeted to, if its pointer is captured.
    ///
    /// Capture applies to mouse and pointer events except the down events. Synthesized moves that
    /// replay boundary events after a release ignore the capturing element.
    pub fn capturing_element_for_event(&self, event: &WidgetEvent) -> Option<Rc<dyn Node>> {
        let pointer_id = match event {
            WidgetEvent::Mouse(mouse) if mouse.message == MouseMessage::Down => return None,
            WidgetEvent::Pointer(pointer) if pointer.message == PointerMessage::Down => return None,
            WidgetEvent::Mouse(mouse) => mouse.pointer_id,
            WidgetEvent::Pointer(pointer) => pointer.pointer_id,
            WidgetEvent::Touch(_) => return None,
        };

        if event.flags().contains(EventFlags::IGNORE_CAPTURING_CONTENT) {
            return None;
        }

        self.pointer_capturing_element(pointer_id)
    }

    /// Releases capture for every pointer whose pending target lives under `node`. Called before
    /// `node` is removed from the tree.
    pub fn release_if_captured_by_descendant(&self, node: &Rc<dyn Node>) {
        let captured = self
            .registry()
            .pending_captures_matching(|pending| is_inclusive_descendant_of(pending, node));
        for pointer_id in captured {
            self.release_pointer_capture_by_id(pointer_id);
        }
    }

    pub fn pointer_info(&self, pointer_id: PointerId) -> Option<PointerInfo> {
        self.registry().pointer_info(pointer_id).cloned()
    }

    pub fn pointer_type(&self, pointer_id: PointerId) -> InputSource {
        self.registry()
            .pointer_info(pointer_id)
            .map_or(InputSource::Unknown, |info| info.input_source)
    }

    pub fn pointer_primary_state(&self, pointer_id: PointerId) -> bool {
        self.registry().pointer_info(pointer_id).is_some_and(|info| info.is_primary)
    }

    pub fn has_active_touch_pointer(&self) -> bool {
        self.registry().has_active_touch_pointer()
    }

    /// Drops every capture target and active pointer bound to `document`.
    ///
    /// Hosts must call this when the document's presentation is torn down, before the document
    /// itself goes away.
    pub fn notify_destroy_document(&self, document: &Rc<Document>) {
        debug!("purging pointer state of {}", document.id());
        self.registry_mut().purge_for_document(document);
    }

    /// Whether `mouse` may start a drag session.
    pub fn is_drag_and_drop_enabled(&self, mouse: &MouseEvent) -> bool {
        // A synthesized event can't be turned into the pointercancel a drag needs.
        if !mouse.is_real() {
            return false;
        }
        if self.inner.options.dispatch_by_pointer_messages {
            return mouse.input_source != InputSource::Pen && mouse.reason != EventReason::Synthesized;
        }
        true
    }

    /// Element `setPointerCapture()`.
    pub fn set_pointer_capture(&self, element: &Rc<dyn Node>, pointer_id: PointerId) -> Result<(), PointerError> {
        let document = element
            .owner_document()
            .ok_or(PointerError::InvalidState("element has no document"))?;

        // Content of a resisting document only ever sees the spoofed id.
        if document.should_resist_fingerprinting() && pointer_id != self.spoofed_pointer_id_for_resist_fingerprinting()
        {
            return Err(PointerError::PointerNotFound(pointer_id));
        }

        let info = self.pointer_info(pointer_id).ok_or(PointerError::PointerNotFound(pointer_id))?;

        if !element.is_connected() {
            return Err(PointerError::InvalidState("element is not connected"));
        }
        if document.has_pointer_lock() {
            return Err(PointerError::InvalidState("document has a locked element"));
        }

        let is_active_document = info
            .active_document()
            .is_some_and(|active| Rc::ptr_eq(&active, &document));
        if !info.active || !is_active_document {
            return Ok(());
        }

        self.request_pointer_capture_by_id(pointer_id, element);
        Ok(())
    }

    /// Element `releasePointerCapture()`.
    pub fn release_pointer_capture(&self, element: &Rc<dyn Node>, pointer_id: PointerId) -> Result<(), PointerError> {
        if self.registry().pointer_info(pointer_id).is_none() {
            return Err(PointerError::PointerNotFound(pointer_id));
        }
        if !self.has_pointer_capture(element, pointer_id) {
            return Ok(());
        }
        self.release_pointer_capture_by_id(pointer_id);
        Ok(())
    }

    /// Element `hasPointerCapture()`: whether `element` is the pending capture target.
    pub fn has_pointer_capture(&self, element: &Rc<dyn Node>, pointer_id: PointerId) -> bool {
        self.registry()
            .capture_entry(pointer_id)
            .and_then(CaptureEntry::pending_target)
            .is_some_and(|pending| same_node(pending, element))
    }

    fn arbiter_cell(&self) -> &RefCell<CaptureArbiter> {
        self.inner
            .arbiter
            .as_ref()
            .expect("remote pointer capture is only tracked in the parent process")
    }

    fn arbiter(&self) -> Ref<'_, CaptureArbiter> {
        self.arbiter_cell().borrow()
    }

    fn arbiter_mut(&self) -> RefMut<'_, CaptureArbiter> {
        self.arbiter_cell().borrow_mut()
    }

    /// Routes `pointer_id` to `endpoint`. See [`CaptureArbiter::claim_remote_capture`].
    pub fn set_pointer_capture_remote_target(&self, pointer_id: PointerId, endpoint: &Rc<dyn RemoteEndpoint>) -> bool {
        self.arbiter_mut().claim_remote_capture(pointer_id, endpoint)
    }

    pub fn release_pointer_capture_remote_target(&self, pointer_id: PointerId) {
        self.arbiter_mut().release_remote_capture(pointer_id);
    }

    pub fn release_pointer_capture_remote_targets_for(&self, endpoint_id: EndpointId) {
        self.arbiter_mut().release_remote_captures_for(endpoint_id);
    }

    pub fn pointer_capturing_remote_target(&self, pointer_id: PointerId) -> Option<Rc<dyn RemoteEndpoint>> {
        self.arbiter().remote_owner(pointer_id)
    }

    /// Asks every owning endpoint to release its captures. Endpoints may call back into the
    /// handler while they are notified.
    pub fn release_all_pointer_capture_remote_target(&self) {
        let owners = self.arbiter_mut().take_all_owners();
        notify_release_all(owners);
    }

    pub fn set_pointer_lock_remote_target(&self, owner: Option<EndpointId>) {
        self.arbiter_mut().set_pointer_lock_owner(owner);
    }
}

/// Tells the parent process that a content-side capture went away.
fn notify_remote_release(pointer_id: PointerId, pending: &Rc<dyn Node>) {
    if let Some(channel) = pending.owner_document().and_then(|document| document.remote_channel()) {
        channel.send_release_pointer_capture(pointer_id);
    }
}
