use std::rc::Rc;

use kurbo::Point;
use smallvec::SmallVec;
use ui_events::keyboard::Modifiers;
use ui_events::pointer::PointerButton;

use crate::document::Node;
use crate::events::{
    ButtonsFlags, EventFlags, EventReason, InputSource, MouseMessage, PointerId, PointerMessage, TouchMessage,
};

/// Pointer data shared by mouse and pointer events.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerDetails {
    pub tilt_x: i32,
    pub tilt_y: i32,
    pub twist: i32,
    pub tangential_pressure: f32,
}

/// A raw mouse event as reported by the widget.
#[derive(Debug, Clone)]
pub struct MouseEvent {
    pub message: MouseMessage,
    pub pointer_id: PointerId,
    pub input_source: InputSource,
    /// Position relative to the widget.
    pub ref_point: Point,
    pub modifiers: Modifiers,
    pub time_stamp: u64,
    /// The button that changed state. `None` means no button is pressed.
    pub button: Option<PointerButton>,
    pub buttons: ButtonsFlags,
    /// Reported pressure. Zero when the device doesn't report any.
    pub pressure: f32,
    pub details: PointerDetails,
    pub reason: EventReason,
    pub flags: EventFlags,
}

impl MouseEvent {
    pub fn new(message: MouseMessage, pointer_id: PointerId, input_source: InputSource) -> Self {
        Self {
            message,
            pointer_id,
            input_source,
            ref_point: Point::ZERO,
            modifiers: Modifiers::default(),
            time_stamp: 0,
            button: None,
            buttons: ButtonsFlags::empty(),
            pressure: 0.0,
            details: PointerDetails::default(),
            reason: EventReason::Real,
            flags: EventFlags::TRUSTED
                | EventFlags::BUBBLES
                | EventFlags::CANCELABLE
                | EventFlags::CONVERT_TO_POINTER,
        }
    }

    pub fn with_position(mut self, ref_point: Point) -> Self {
        self.ref_point = ref_point;
        self
    }

    pub fn with_button(mut self, button: Option<PointerButton>, buttons: ButtonsFlags) -> Self {
        self.button = button;
        self.buttons = buttons;
        self
    }

    pub fn is_real(&self) -> bool {
        self.reason == EventReason::Real
    }

    /// The pressure exposed on the pointer event. Devices without pressure report half
    /// pressure while any button is down.
    pub fn compute_mouse_button_pressure(&self) -> f32 {
        if self.pressure > 0.0 {
            return self.pressure;
        }
        if self.buttons.is_empty() { 0.0 } else { 0.5 }
    }
}

/// One contact of a touch event.
#[derive(Clone)]
pub struct Touch {
    pub identifier: PointerId,
    pub ref_point: Point,
    pub radius_x: f64,
    pub radius_y: f64,
    pub tilt_x: i32,
    pub tilt_y: i32,
    pub twist: i32,
    pub force: f32,
    /// The contact changed since the previous touch event.
    pub changed: bool,
    pub convert_to_pointer: bool,
    /// The hit-tested target, known for touchstart.
    pub target: Option<Rc<dyn Node>>,
}

impl Touch {
    pub fn new(identifier: PointerId, ref_point: Point) -> Self {
        Self {
            identifier,
            ref_point,
            radius_x: 1.0,
            radius_y: 1.0,
            tilt_x: 0,
            tilt_y: 0,
            twist: 0,
            force: 0.0,
            changed: true,
            convert_to_pointer: true,
            target: None,
        }
    }

    pub fn with_target(mut self, target: Rc<dyn Node>) -> Self {
        self.target = Some(target);
        self
    }
}

impl std::fmt::Debug for Touch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Touch")
            .field("identifier", &self.identifier)
            .field("ref_point", &self.ref_point)
            .field("changed", &self.changed)
            .field("convert_to_pointer", &self.convert_to_pointer)
            .field("target", &self.target.as_ref().map(|target| target.id()))
            .finish_non_exhaustive()
    }
}

/// A raw touch event carrying every contact the widget reported.
#[derive(Debug, Clone)]
pub struct TouchEvent {
    pub message: TouchMessage,
    pub input_source: InputSource,
    pub modifiers: Modifiers,
    pub time_stamp: u64,
    /// Pen input routed through touch sets a button, touch input leaves it `None`.
    pub button: Option<PointerButton>,
    pub buttons: ButtonsFlags,
    pub touches: SmallVec<[Touch; 4]>,
    pub flags: EventFlags,
}

impl TouchEvent {
    pub fn new(message: TouchMessage) -> Self {
        Self {
            message,
            input_source: InputSource::Touch,
            modifiers: Modifiers::default(),
            time_stamp: 0,
            button: None,
            buttons: ButtonsFlags::empty(),
            touches: SmallVec::new(),
            flags: EventFlags::TRUSTED | EventFlags::BUBBLES | EventFlags::CANCELABLE,
        }
    }

    pub fn push_touch(mut self, touch: Touch) -> Self {
        self.touches.push(touch);
        self
    }
}

/// The unified pointer event produced from mouse and touch input.
#[derive(Debug, Clone)]
pub struct PointerEvent {
    pub message: PointerMessage,
    pub pointer_id: PointerId,
    pub input_source: InputSource,
    pub ref_point: Point,
    pub modifiers: Modifiers,
    pub time_stamp: u64,
    pub button: Option<PointerButton>,
    pub buttons: ButtonsFlags,
    pub pressure: f32,
    pub width: f64,
    pub height: f64,
    pub details: PointerDetails,
    pub is_primary: bool,
    pub from_touch_event: bool,
    pub reason: EventReason,
    pub flags: EventFlags,
}

impl PointerEvent {
    pub fn new(message: PointerMessage, pointer_id: PointerId, input_source: InputSource) -> Self {
        Self {
            message,
            pointer_id,
            input_source,
            ref_point: Point::ZERO,
            modifiers: Modifiers::default(),
            time_stamp: 0,
            button: None,
            buttons: ButtonsFlags::empty(),
            pressure: 0.0,
            width: 1.0,
            height: 1.0,
            details: PointerDetails::default(),
            is_primary: true,
            from_touch_event: false,
            reason: EventReason::Real,
            flags: EventFlags::TRUSTED | EventFlags::BUBBLES | EventFlags::CANCELABLE,
        }
    }

    /// Copies every field of `mouse` that a pointer event shares with it.
    pub(crate) fn from_mouse_fields(mouse: &MouseEvent) -> Self {
        Self {
            message: PointerMessage::None,
            pointer_id: mouse.pointer_id,
            input_source: mouse.input_source,
            ref_point: mouse.ref_point,
            modifiers: mouse.modifiers,
            time_stamp: mouse.time_stamp,
            button: mouse.button,
            buttons: mouse.buttons,
            pressure: mouse.pressure,
            width: 1.0,
            height: 1.0,
            details: mouse.details,
            is_primary: true,
            from_touch_event: false,
            reason: mouse.reason,
            flags: mouse.flags,
        }
    }

    pub fn is_trusted(&self) -> bool {
        self.flags.contains(EventFlags::TRUSTED)
    }

    pub fn default_prevented_by_content(&self) -> bool {
        self.flags.contains(EventFlags::DEFAULT_PREVENTED_BY_CONTENT)
    }

    pub fn should_synthesize_move_after_dispatch(&self) -> bool {
        self.flags.contains(EventFlags::SYNTHESIZE_MOVE_AFTER_DISPATCH)
    }
}
