use std::rc::Rc;

use craft_logging::warn;

use crate::document::Node;
use crate::events::{
    EventDispatcher, EventFlags, EventReason, MouseEvent, MouseMessage, PointerEvent, PointerMessage, WidgetEvent,
};

/// Fires `gotpointercapture` or `lostpointercapture` for `event`'s pointer at `target`.
///
/// A target that was removed from its document can't receive `lostpointercapture` anymore, so
/// the event goes to the document instead.
pub(crate) fn dispatch_got_or_lost_pointer_capture_event(
    is_got: bool,
    event: &PointerEvent,
    target: &Rc<dyn Node>,
    dispatcher: &mut dyn EventDispatcher,
) {
    let Some(document) = target.owner_document() else {
        warn!("capture target {} has no document", target.id());
        return;
    };
    if document.is_destroying() {
        warn!("capture target {} belongs to a document being destroyed", target.id());
        return;
    }

    if !is_got && !target.is_connected() {
        let mut lost = PointerEvent::new(PointerMessage::LostCapture, event.pointer_id, event.input_source);
        lost.is_primary = event.is_primary;
        lost.from_touch_event = event.from_touch_event;
        lost.flags = EventFlags::BUBBLES | EventFlags::COMPOSED | (event.flags & EventFlags::TRUSTED);
        dispatcher.dispatch_at_document(&mut lost, &document);
        return;
    }

    let mut local = event.clone();
    local.message = if is_got {
        PointerMessage::GotCapture
    } else {
        PointerMessage::LostCapture
    };
    local.flags = EventFlags::BUBBLES | (event.flags & EventFlags::TRUSTED);
    dispatcher.dispatch_with_target(&mut local, target);
}

/// Feeds a move back through the widget after capture was released so the pointer gets its
/// boundary events at whatever it is over now.
///
/// The move bypasses the capturing element and is not converted to a pointer event again.
pub fn synthesize_move_to_dispatch_boundary_events(event: &WidgetEvent, dispatcher: &mut dyn EventDispatcher) {
    let for_tests = event.flags() & EventFlags::SYNTHESIZED_FOR_TESTS;
    let synthesized = match event {
        WidgetEvent::Mouse(source) => {
            let mut mouse = MouseEvent::new(MouseMessage::Move, source.pointer_id, source.input_source);
            mouse.reason = EventReason::Synthesized;
            mouse.ref_point = source.ref_point;
            mouse.buttons = source.buttons;
            mouse.modifiers = source.modifiers;
            mouse.details = source.details;
            mouse.flags.remove(EventFlags::CONVERT_TO_POINTER);
            mouse.flags |= EventFlags::IGNORE_CAPTURING_CONTENT | for_tests;
            WidgetEvent::Mouse(mouse)
        }
        WidgetEvent::Pointer(source) => {
            let mut pointer = PointerEvent::new(PointerMessage::Move, source.pointer_id, source.input_source);
            pointer.reason = EventReason::Synthesized;
            pointer.ref_point = source.ref_point;
            pointer.buttons = source.buttons;
            pointer.modifiers = source.modifiers;
            pointer.details = source.details;
            pointer.is_primary = source.is_primary;
            pointer.from_touch_event = source.from_touch_event;
            pointer.width = source.width;
            pointer.height = source.height;
            pointer.flags |= EventFlags::IGNORE_CAPTURING_CONTENT | for_tests;
            WidgetEvent::Pointer(pointer)
        }
        WidgetEvent::Touch(_) => {
            debug_assert!(false, "touch events never need a boundary move");
            return;
        }
    };

    dispatcher.dispatch_to_widget(synthesized);
}
