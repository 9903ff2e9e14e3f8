//! Turns mouse and touch input into pointer events.

use craft_logging::trace;
use ui_events::pointer::PointerButton;

use crate::events::{
    ButtonsFlags, EventFlags, InputSource, MouseEvent, MouseMessage, PointerEvent, PointerMessage, Touch, TouchEvent,
    TouchMessage, WidgetEvent,
};
use crate::registry::PointerRegistry;

pub fn should_generate_pointer_event_from_mouse(event: &MouseEvent) -> bool {
    match event.message {
        MouseMessage::Down | MouseMessage::Up | MouseMessage::ExitFromWidget => true,
        MouseMessage::Move => event.is_real(),
        MouseMessage::EnterIntoWidget => false,
    }
}

/// Every touch message has a pointer counterpart, so only the contact decides. A touchmove
/// only produces a pointermove for the contacts that actually moved.
pub fn should_convert_touch_to_pointer(touch: &Touch, event: &TouchEvent) -> bool {
    if !touch.convert_to_pointer {
        return false;
    }
    event.message != TouchMessage::Move || touch.changed
}

/// Maps a mouse or touch message to the pointer message it produces.
///
/// A mouseup while other buttons are still held and a mousedown while other buttons were
/// already held are moves for the pointer. Messages without a pointer counterpart map to
/// [`PointerMessage::None`].
pub fn to_pointer_message(event: &WidgetEvent) -> PointerMessage {
    match event {
        WidgetEvent::Mouse(mouse) => match mouse.message {
            MouseMessage::Move => PointerMessage::Move,
            MouseMessage::Up => {
                if mouse.buttons.is_empty() {
                    PointerMessage::Up
                } else {
                    PointerMessage::Move
                }
            }
            MouseMessage::Down => {
                let other_buttons = mouse.buttons - ButtonsFlags::for_button(mouse.button);
                if other_buttons.is_empty() {
                    PointerMessage::Down
                } else {
                    PointerMessage::Move
                }
            }
            MouseMessage::EnterIntoWidget | MouseMessage::ExitFromWidget => PointerMessage::None,
        },
        WidgetEvent::Touch(touch) => match touch.message {
            TouchMessage::Start => PointerMessage::Down,
            TouchMessage::Move => PointerMessage::Move,
            TouchMessage::End => PointerMessage::Up,
            TouchMessage::Cancel | TouchMessage::PointerCancel => PointerMessage::Cancel,
        },
        WidgetEvent::Pointer(_) => PointerMessage::None,
    }
}

/// Builds the pointer event for a mouse event.
///
/// A mousemove never reports a changed button. Pressure falls back to half pressure while a
/// button is held.
pub fn pointer_event_from_mouse(mouse: &MouseEvent, message: PointerMessage) -> PointerEvent {
    let mut event = PointerEvent::from_mouse_fields(mouse);
    event.message = message;
    event.button = if mouse.message == MouseMessage::Move { None } else { mouse.button };
    event.buttons = mouse.buttons;
    event.pressure = mouse.compute_mouse_button_pressure();
    event
}

/// Builds the pointer event for one contact of a touch event.
///
/// Only the first touch contact becomes the primary pointer. Later events of the same contact
/// keep the primary state recorded in `registry`.
pub fn pointer_event_from_touch(
    registry: &PointerRegistry,
    touch_event: &TouchEvent,
    touch: &Touch,
    message: PointerMessage,
) -> PointerEvent {
    // Pen input routed through touch events carries its own button state.
    let button = match (touch_event.message, touch_event.button) {
        (TouchMessage::Move, _) => None,
        (_, Some(button)) => Some(button),
        (_, None) => Some(PointerButton::Primary),
    };
    let buttons = match (touch_event.message, touch_event.button) {
        (TouchMessage::End, _) => ButtonsFlags::empty(),
        (_, Some(_)) => touch_event.buttons,
        (_, None) => ButtonsFlags::PRIMARY,
    };

    let mut event = PointerEvent::new(message, touch.identifier, touch_event.input_source);

    // Multiple pens are not told apart, so only touch input picks a primary pointer here.
    if touch_event.input_source == InputSource::Touch {
        event.is_primary = if touch_event.message == TouchMessage::Start {
            !registry.has_active_touch_pointer()
        } else {
            registry.pointer_info(touch.identifier).is_some_and(|info| info.is_primary)
        };
    }

    event.ref_point = touch.ref_point;
    event.modifiers = touch_event.modifiers;
    event.width = touch.radius_x;
    event.height = touch.radius_y;
    event.details.tilt_x = touch.tilt_x;
    event.details.tilt_y = touch.tilt_y;
    event.details.twist = touch.twist;
    event.time_stamp = touch_event.time_stamp;
    event.flags = touch_event.flags;
    event.button = button;
    event.buttons = buttons;
    event.from_touch_event = true;
    event.pressure = touch.force;

    trace!(
        "touch {} -> {:?} (primary: {})",
        touch.identifier, event.message, event.is_primary
    );
    event
}

/// Builds the companion event used to report a batched move. It neither bubbles nor can be
/// cancelled.
pub fn init_coalesced_event_from_pointer_event(source: &PointerEvent) -> PointerEvent {
    let mut coalesced = PointerEvent::new(source.message, source.pointer_id, source.input_source);
    coalesced.flags = source.flags & EventFlags::TRUSTED;

    coalesced.time_stamp = source.time_stamp;
    coalesced.ref_point = source.ref_point;
    coalesced.modifiers = source.modifiers;

    coalesced.button = source.button;
    coalesced.buttons = source.buttons;
    coalesced.pressure = source.pressure;
    coalesced.details = source.details;

    coalesced.width = source.width;
    coalesced.height = source.height;
    coalesced.is_primary = source.is_primary;
    coalesced.from_touch_event = source.from_touch_event;
    coalesced
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::*;
    use crate::events::PointerId;
    use crate::registry::PointerInfo;

    fn mouse(message: MouseMessage, button: Option<PointerButton>, buttons: ButtonsFlags) -> MouseEvent {
        MouseEvent::new(message, PointerId::MOUSE, InputSource::Mouse).with_button(button, buttons)
    }

    fn touch_message(message: TouchMessage) -> PointerMessage {
        to_pointer_message(&WidgetEvent::Touch(TouchEvent::new(message)))
    }

    #[test]
    fn mouse_messages_map_to_pointer_messages() {
        let mouse_message = |event: MouseEvent| to_pointer_message(&WidgetEvent::Mouse(event));

        assert_eq!(mouse_message(mouse(MouseMessage::Move, None, ButtonsFlags::empty())), PointerMessage::Move);
        assert_eq!(
            mouse_message(mouse(MouseMessage::Up, Some(PointerButton::Primary), ButtonsFlags::empty())),
            PointerMessage::Up
        );
        assert_eq!(
            mouse_message(mouse(MouseMessage::Up, Some(PointerButton::Primary), ButtonsFlags::SECONDARY)),
            PointerMessage::Move,
            "Releasing one of two held buttons only moves the pointer."
        );
        assert_eq!(
            mouse_message(mouse(MouseMessage::Down, Some(PointerButton::Primary), ButtonsFlags::PRIMARY)),
            PointerMessage::Down
        );
        assert_eq!(
            mouse_message(mouse(
                MouseMessage::Down,
                Some(PointerButton::Secondary),
                ButtonsFlags::PRIMARY | ButtonsFlags::SECONDARY
            )),
            PointerMessage::Move,
            "Pressing a second button only moves the pointer."
        );
        assert_eq!(
            mouse_message(mouse(MouseMessage::EnterIntoWidget, None, ButtonsFlags::empty())),
            PointerMessage::None
        );
    }

    #[test]
    fn touch_messages_map_to_pointer_messages() {
        assert_eq!(touch_message(TouchMessage::Start), PointerMessage::Down);
        assert_eq!(touch_message(TouchMessage::Move), PointerMessage::Move);
        assert_eq!(touch_message(TouchMessage::End), PointerMessage::Up);
        assert_eq!(touch_message(TouchMessage::Cancel), PointerMessage::Cancel);
        assert_eq!(touch_message(TouchMessage::PointerCancel), PointerMessage::Cancel);
    }

    #[test]
    fn mouse_move_reports_no_button() {
        let mut event = mouse(MouseMessage::Move, Some(PointerButton::Primary), ButtonsFlags::PRIMARY);
        event.ref_point = Point::new(4.0, 2.0);

        let pointer = pointer_event_from_mouse(&event, PointerMessage::Move);
        assert_eq!(pointer.button, None);
        assert_eq!(pointer.buttons, ButtonsFlags::PRIMARY);
        assert_eq!(pointer.pressure, 0.5);
        assert_eq!(pointer.ref_point, Point::new(4.0, 2.0));
        assert!(pointer.is_primary);
    }

    #[test]
    fn mouse_pressure_prefers_the_reported_value() {
        let mut event = mouse(MouseMessage::Down, Some(PointerButton::Primary), ButtonsFlags::PRIMARY);
        event.pressure = 0.8;
        assert_eq!(pointer_event_from_mouse(&event, PointerMessage::Down).pressure, 0.8);

        let released = mouse(MouseMessage::Up, Some(PointerButton::Primary), ButtonsFlags::empty());
        assert_eq!(pointer_event_from_mouse(&released, PointerMessage::Up).pressure, 0.0);
    }

    #[test]
    fn first_touch_is_primary() {
        let mut registry = PointerRegistry::new();
        let mut contact = Touch::new(PointerId::new(1), Point::new(1.0, 1.0));
        contact.radius_x = 3.0;
        contact.radius_y = 4.0;
        contact.force = 0.25;
        let touch_start = TouchEvent::new(TouchMessage::Start).push_touch(contact.clone());

        let first = pointer_event_from_touch(&registry, &touch_start, &contact, PointerMessage::Down);
        assert!(first.is_primary);
        assert!(first.from_touch_event);
        assert_eq!(first.button, Some(PointerButton::Primary));
        assert_eq!(first.buttons, ButtonsFlags::PRIMARY);
        assert_eq!((first.width, first.height), (3.0, 4.0));
        assert_eq!(first.pressure, 0.25);

        let mut info = PointerInfo::new(PointerId::new(1), InputSource::Touch);
        info.from_touch_event = true;
        info.active = true;
        registry.upsert_pointer_info(info);

        let second_contact = Touch::new(PointerId::new(2), Point::new(5.0, 5.0));
        let second_start = TouchEvent::new(TouchMessage::Start).push_touch(second_contact.clone());
        let second = pointer_event_from_touch(&registry, &second_start, &second_contact, PointerMessage::Down);
        assert!(!second.is_primary);
    }

    #[test]
    fn later_touch_messages_inherit_the_primary_state() {
        let mut registry = PointerRegistry::new();
        let mut info = PointerInfo::new(PointerId::new(1), InputSource::Touch);
        info.from_touch_event = true;
        info.is_primary = true;
        registry.upsert_pointer_info(info);

        let contact = Touch::new(PointerId::new(1), Point::ZERO);
        let touch_move = TouchEvent::new(TouchMessage::Move).push_touch(contact.clone());
        let moved = pointer_event_from_touch(&registry, &touch_move, &contact, PointerMessage::Move);
        assert!(moved.is_primary);
        assert_eq!(moved.button, None);
        assert_eq!(moved.buttons, ButtonsFlags::PRIMARY);

        let unknown = Touch::new(PointerId::new(8), Point::ZERO);
        let touch_end = TouchEvent::new(TouchMessage::End).push_touch(unknown.clone());
        let ended = pointer_event_from_touch(&registry, &touch_end, &unknown, PointerMessage::Up);
        assert!(!ended.is_primary);
        assert_eq!(ended.button, Some(PointerButton::Primary));
        assert_eq!(ended.buttons, ButtonsFlags::empty());
    }

    #[test]
    fn stationary_touches_do_not_produce_pointer_moves() {
        let mut contact = Touch::new(PointerId::new(1), Point::ZERO);
        contact.changed = false;
        let touch_move = TouchEvent::new(TouchMessage::Move);
        let touch_end = TouchEvent::new(TouchMessage::End);

        assert!(!should_convert_touch_to_pointer(&contact, &touch_move));
        assert!(should_convert_touch_to_pointer(&contact, &touch_end));

        contact.convert_to_pointer = false;
        assert!(!should_convert_touch_to_pointer(&contact, &touch_end));
    }

    #[test]
    fn synthesized_mouse_moves_do_not_generate_pointer_events() {
        let mut event = mouse(MouseMessage::Move, None, ButtonsFlags::empty());
        assert!(should_generate_pointer_event_from_mouse(&event));

        event.reason = crate::events::EventReason::Synthesized;
        assert!(!should_generate_pointer_event_from_mouse(&event));
    }

    #[test]
    fn coalesced_events_neither_bubble_nor_cancel() {
        let mut source = PointerEvent::new(PointerMessage::Move, PointerId::new(3), InputSource::Pen);
        source.details.tilt_x = 30;
        source.details.twist = 90;
        source.pressure = 0.7;
        source.is_primary = false;
        source.time_stamp = 1234;

        let coalesced = init_coalesced_event_from_pointer_event(&source);
        assert!(!coalesced.flags.contains(EventFlags::BUBBLES));
        assert!(!coalesced.flags.contains(EventFlags::CANCELABLE));
        assert!(coalesced.is_trusted());
        assert_eq!(coalesced.pointer_id, PointerId::new(3));
        assert_eq!(coalesced.details, source.details);
        assert_eq!(coalesced.pressure, 0.7);
        assert_eq!(coalesced.time_stamp, 1234);
        assert!(!coalesced.is_primary);
    }
}
