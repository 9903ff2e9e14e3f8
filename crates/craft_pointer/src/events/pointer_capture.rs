use std::rc::Rc;

use craft_logging::{debug, trace, warn};

use crate::document::{Node, nearest_element};
use crate::events::input::{
    pointer_event_from_mouse, pointer_event_from_touch, should_convert_touch_to_pointer,
    should_generate_pointer_event_from_mouse, to_pointer_message,
};
use crate::events::pointer_capture_dispatch::dispatch_got_or_lost_pointer_capture_event;
use crate::events::{
    EventDispatcher, EventFlags, MouseEvent, PointerEvent, PointerId, PointerMessage, TouchEvent, WidgetEvent,
};
use crate::handler::PointerEventHandler;

impl PointerEventHandler {
    /// An entry that exists and already agrees with its request needs no settling. A missing entry
    /// still goes through [`Self::check_pointer_capture_state`], which may redirect to the
    /// spoofed pointer.
    fn is_capture_settled(&self, pointer_id: PointerId) -> bool {
        self.registry()
            .capture_entry(pointer_id)
            .is_some_and(|entry| entry.is_settled())
    }

    /// Process pending pointer capture.
    ///
    /// Promotes the pending capture target of the event's pointer, then fires `lostpointercapture`
    /// at the old target and `gotpointercapture` at the new one, in that order. Listeners may
    /// request or release capture again; those requests stay pending until the next event.
    pub fn check_pointer_capture_state(&self, event: &mut PointerEvent, dispatcher: &mut dyn EventDispatcher) {
        let transition = {
            let mut registry = self.registry_mut();
            let mut pointer_id = event.pointer_id;

            let spoofed_id = self.spoofed_pointer_id_for_resist_fingerprinting();
            if self.options().resist_fingerprinting
                && pointer_id != spoofed_id
                && registry.capture_entry(pointer_id).is_none()
            {
                // Content of a resisting document can only capture the spoofed pointer, so the
                // real pointer's capture lives under the spoofed id.
                let redirect = registry
                    .capture_entry(spoofed_id)
                    .and_then(|entry| entry.pending_target())
                    .and_then(|pending| pending.owner_document())
                    .is_some_and(|document| document.should_resist_fingerprinting());
                if !redirect {
                    return;
                }
                pointer_id = spoofed_id;
            }

            registry.settle(pointer_id)
        };

        let Some(transition) = transition else {
            return;
        };

        debug!(
            "pointer {} capture moves from {:?} to {:?}",
            event.pointer_id,
            transition.lost.as_ref().map(|node| node.id()),
            transition.got.as_ref().map(|node| node.id())
        );

        if let Some(lost) = &transition.lost {
            dispatch_got_or_lost_pointer_capture_event(false, event, lost, dispatcher);
        }
        if let Some(got) = &transition.got {
            dispatch_got_or_lost_pointer_capture_event(true, event, got, dispatcher);
        }

        // Boundary events were suppressed while captured, so replay them with a move once the
        // capture is gone. A pointer that can't hover is not over anything after going up.
        if transition.lost.is_some()
            && transition.got.is_none()
            && event.message != PointerMessage::Cancel
            && (event.message != PointerMessage::Up || event.input_source.supports_hover())
        {
            event.flags.insert(EventFlags::SYNTHESIZE_MOVE_AFTER_DISPATCH);
        }
    }

    pub fn process_pointer_capture_for_mouse(&self, mouse: &mut MouseEvent, dispatcher: &mut dyn EventDispatcher) {
        if !should_generate_pointer_event_from_mouse(mouse) {
            return;
        }
        if self.is_capture_settled(mouse.pointer_id) {
            return;
        }

        let mut local = pointer_event_from_mouse(mouse, PointerMessage::None);
        self.check_pointer_capture_state(&mut local, dispatcher);
        if local.should_synthesize_move_after_dispatch() {
            mouse.flags.insert(EventFlags::SYNTHESIZE_MOVE_AFTER_DISPATCH);
        }
    }

    pub fn process_pointer_capture_for_touch(&self, touch_event: &mut TouchEvent, dispatcher: &mut dyn EventDispatcher) {
        for index in 0..touch_event.touches.len() {
            let touch = touch_event.touches[index].clone();
            if !should_convert_touch_to_pointer(&touch, touch_event) {
                continue;
            }
            if self.is_capture_settled(touch.identifier) {
                continue;
            }

            let mut local = pointer_event_from_touch(&self.registry(), touch_event, &touch, PointerMessage::None);
            self.check_pointer_capture_state(&mut local, dispatcher);
            if local.should_synthesize_move_after_dispatch() {
                touch_event.flags.insert(EventFlags::SYNTHESIZE_MOVE_AFTER_DISPATCH);
            }
        }
    }

    /// Settles pending captures before a mouse or touch event is dispatched.
    ///
    /// Down events are skipped: a pointer that just went down can't have a capture change yet,
    /// and its implicit capture must stay pending until the next event.
    pub fn maybe_process_pointer_capture(&self, event: &mut WidgetEvent, dispatcher: &mut dyn EventDispatcher) {
        if to_pointer_message(event) == PointerMessage::Down {
            return;
        }
        self.process_pointer_capture(event, dispatcher);
    }

    fn process_pointer_capture(&self, event: &mut WidgetEvent, dispatcher: &mut dyn EventDispatcher) {
        match event {
            WidgetEvent::Mouse(mouse) => self.process_pointer_capture_for_mouse(mouse, dispatcher),
            WidgetEvent::Touch(touch_event) => self.process_pointer_capture_for_touch(touch_event, dispatcher),
            WidgetEvent::Pointer(_) => {}
        }
    }

    /// Settles captures released by an up or cancel that never reached pointer event dispatch.
    pub fn maybe_implicitly_release_pointer_capture(&self, event: &mut WidgetEvent, dispatcher: &mut dyn EventDispatcher) {
        let message = to_pointer_message(event);
        if message != PointerMessage::Up && message != PointerMessage::Cancel {
            return;
        }
        self.process_pointer_capture(event, dispatcher);
    }

    /// Touch pointers are captured by the element they went down on.
    pub fn implicitly_capture_pointer(&self, target: Option<&Rc<dyn Node>>, event: &PointerEvent) {
        debug_assert_eq!(event.message, PointerMessage::Down);

        let Some(target) = target else {
            return;
        };
        if !self.options().implicit_capture_for_touch {
            return;
        }
        if !event.from_touch_event {
            trace!("pointer {} is not a touch, skipping implicit capture", event.pointer_id);
            return;
        }

        let Some(element) = nearest_element(target) else {
            warn!("pointer {} went down outside any element", event.pointer_id);
            return;
        };
        self.request_pointer_capture_by_id(event.pointer_id, &element);
    }

    /// A pointer that goes up or is cancelled loses its capture right away.
    pub fn implicitly_release_pointer_capture(&self, event: &mut PointerEvent, dispatcher: &mut dyn EventDispatcher) {
        if event.message != PointerMessage::Up && event.message != PointerMessage::Cancel {
            return;
        }
        self.release_pointer_capture_by_id(event.pointer_id);
        self.check_pointer_capture_state(event, dispatcher);
    }
}
