use std::rc::Rc;

use craft_logging::{Level, span, trace};

use crate::document::{Document, Node};
use crate::events::input::{
    pointer_event_from_mouse, pointer_event_from_touch, should_convert_touch_to_pointer, to_pointer_message,
};
use crate::events::pointer_capture_dispatch::synthesize_move_to_dispatch_boundary_events;
use crate::events::{
    EventDispatcher, EventFlags, MouseMessage, PointerEvent, PointerMessage, TouchMessage, WidgetEvent,
};
use crate::handler::PointerEventHandler;

impl PointerEventHandler {
    /// Runs one raw mouse or touch event through the pointer pipeline: settle pending capture,
    /// dispatch the pointer events it produces, then replay boundary events if capture was lost.
    ///
    /// `target` is the hit-tested target of a mouse event. Touch contacts carry their own.
    pub fn handle_input_event(
        &self,
        document: &Rc<Document>,
        target: Option<&Rc<dyn Node>>,
        event: &mut WidgetEvent,
        dispatcher: &mut dyn EventDispatcher,
    ) {
        let boundary = match event {
            WidgetEvent::Mouse(mouse) => Some(mouse.message),
            _ => None,
        };

        if boundary == Some(MouseMessage::EnterIntoWidget) {
            self.update_active_pointer_state(event, target);
        }

        self.maybe_process_pointer_capture(event, dispatcher);
        self.dispatch_pointer_from_mouse_or_touch(document, target, event, dispatcher);

        if boundary == Some(MouseMessage::ExitFromWidget) {
            self.update_active_pointer_state(event, target);
        }

        if event.should_synthesize_move_after_dispatch() {
            synthesize_move_to_dispatch_boundary_events(event, dispatcher);
        }
    }

    /// Dispatches the pointer events a mouse or touch event produces.
    ///
    /// Each touch contact that changed produces its own pointer event. Source events that were
    /// already converted are left alone.
    pub fn dispatch_pointer_from_mouse_or_touch(
        &self,
        document: &Rc<Document>,
        target: Option<&Rc<dyn Node>>,
        event: &mut WidgetEvent,
        dispatcher: &mut dyn EventDispatcher,
    ) {
        let span = span!(Level::INFO, "dispatch pointer event");
        let _enter = span.enter();

        let message = to_pointer_message(event);
        if message == PointerMessage::None {
            return;
        }
        let capturing = self.capturing_element_for_event(event);

        match event {
            WidgetEvent::Mouse(mouse) => {
                // Touch simulation turns mouse input into touch events, which convert on their own.
                if document.is_simulating_touch() {
                    return;
                }
                if !mouse.flags.contains(EventFlags::CONVERT_TO_POINTER) {
                    return;
                }
                mouse.flags.remove(EventFlags::CONVERT_TO_POINTER);

                let mut pointer = pointer_event_from_mouse(mouse, message);
                pointer.flags.remove(EventFlags::CONVERT_TO_POINTER);

                self.pre_handle_pointer_events_prevent_default(&pointer, &mut mouse.flags);
                self.dispatch_pointer_event(&mut pointer, capturing.as_ref().or(target), dispatcher);
                self.post_handle_pointer_events_prevent_default(&pointer, &mut mouse.flags);

                if pointer.should_synthesize_move_after_dispatch() {
                    mouse.flags.insert(EventFlags::SYNTHESIZE_MOVE_AFTER_DISPATCH);
                }
            }
            WidgetEvent::Touch(touch_event) => {
                for index in 0..touch_event.touches.len() {
                    if !should_convert_touch_to_pointer(&touch_event.touches[index], touch_event) {
                        continue;
                    }

                    let mut pointer =
                        pointer_event_from_touch(&self.registry(), touch_event, &touch_event.touches[index], message);
                    pointer.flags.remove(EventFlags::CONVERT_TO_POINTER);
                    touch_event.touches[index].convert_to_pointer = false;

                    let target = if touch_event.message == TouchMessage::Start {
                        let Some(target) = touch_event.touches[index].target.clone() else {
                            trace!("touch {} started without a target", pointer.pointer_id);
                            continue;
                        };
                        Some(target)
                    } else {
                        self.pointer_capturing_element(pointer.pointer_id)
                    };

                    self.pre_handle_pointer_events_prevent_default(&pointer, &mut touch_event.flags);
                    self.dispatch_pointer_event(&mut pointer, target.as_ref(), dispatcher);
                    self.post_handle_pointer_events_prevent_default(&pointer, &mut touch_event.flags);

                    if pointer.should_synthesize_move_after_dispatch() {
                        touch_event.flags.insert(EventFlags::SYNTHESIZE_MOVE_AFTER_DISPATCH);
                    }
                }
            }
            WidgetEvent::Pointer(_) => {}
        }
    }

    /// Delivers one pointer event and keeps the pointer bookkeeping around it.
    ///
    /// A pointer becomes active before its pointerdown so listeners can capture it, and touch
    /// pointers are implicitly captured before any listener runs. Capture is released right after
    /// the pointerup or pointercancel.
    fn dispatch_pointer_event(
        &self,
        pointer: &mut PointerEvent,
        target: Option<&Rc<dyn Node>>,
        dispatcher: &mut dyn EventDispatcher,
    ) {
        if pointer.message == PointerMessage::Down {
            self.update_active_pointer_state_for_pointer(pointer, target);
            self.implicitly_capture_pointer(target, pointer);
        }

        match target {
            Some(target) => dispatcher.dispatch_with_target(pointer, target),
            None => dispatcher.dispatch_hit_tested(pointer),
        }

        if matches!(pointer.message, PointerMessage::Up | PointerMessage::Cancel) {
            self.implicitly_release_pointer_capture(pointer, dispatcher);
            self.update_active_pointer_state_for_pointer(pointer, target);
        }
    }

    /// Suppresses the compatibility mouse or touch event while content prevents the default of
    /// the primary pointer's pointerdown. The suppression ends with the pointerup.
    pub fn pre_handle_pointer_events_prevent_default(&self, pointer: &PointerEvent, source_flags: &mut EventFlags) {
        if !pointer.is_primary || pointer.message == PointerMessage::Down {
            return;
        }

        let mut registry = self.registry_mut();
        let Some(info) = registry.pointer_info_mut(pointer.pointer_id) else {
            return;
        };
        if !info.prevent_mouse_events_by_content {
            return;
        }

        source_flags.insert(EventFlags::DEFAULT_PREVENTED | EventFlags::ONLY_CHROME_DISPATCH);
        if pointer.message == PointerMessage::Up {
            info.prevent_mouse_events_by_content = false;
        }
    }

    /// Records that content prevented the default of the primary pointer's pointerdown and
    /// suppresses the compatibility event that follows it.
    pub fn post_handle_pointer_events_prevent_default(&self, pointer: &PointerEvent, source_flags: &mut EventFlags) {
        if !pointer.is_primary || pointer.message != PointerMessage::Down {
            return;
        }
        if !pointer.default_prevented_by_content() {
            return;
        }

        let mut registry = self.registry_mut();
        let Some(info) = registry.pointer_info_mut(pointer.pointer_id) else {
            debug_assert!(false, "pointerdown without an active pointer record");
            return;
        };
        info.prevent_mouse_events_by_content = true;
        source_flags.insert(EventFlags::DEFAULT_PREVENTED | EventFlags::ONLY_CHROME_DISPATCH);
    }
}
