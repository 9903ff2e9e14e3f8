mod event_dispatch;
mod input;
mod pointer_capture;
mod pointer_capture_dispatch;
mod pointer_dispatch;
mod widget_events;

use std::fmt;

use bitflags::bitflags;
pub use ui_events;
use ui_events::pointer::{PointerButton, PointerType};

pub use event_dispatch::EventDispatcher;
pub use input::{
    init_coalesced_event_from_pointer_event, pointer_event_from_mouse, pointer_event_from_touch,
    should_convert_touch_to_pointer, should_generate_pointer_event_from_mouse, to_pointer_message,
};
pub use pointer_capture_dispatch::synthesize_move_to_dispatch_boundary_events;
pub use widget_events::{MouseEvent, PointerDetails, PointerEvent, Touch, TouchEvent};

/// Identifies a physical or synthesized pointer.
///
/// The mouse uses [`PointerId::MOUSE`], every touch contact gets its own id and pens use the id assigned
/// by the device. An id is never reused while its pointer is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PointerId(u32);

impl PointerId {
    pub const MOUSE: PointerId = PointerId(0);

    pub const fn new(id: u32) -> Self {
        PointerId(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PointerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The device class that produced an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputSource {
    #[default]
    Unknown,
    Mouse,
    Pen,
    Eraser,
    Cursor,
    Touch,
    Keyboard,
}

impl InputSource {
    /// Whether the device keeps reporting a position while no button is pressed.
    pub fn supports_hover(self) -> bool {
        matches!(self, InputSource::Mouse | InputSource::Pen | InputSource::Eraser)
    }

    pub fn pointer_type(self) -> PointerType {
        match self {
            InputSource::Mouse => PointerType::Mouse,
            InputSource::Pen | InputSource::Eraser => PointerType::Pen,
            InputSource::Touch => PointerType::Touch,
            InputSource::Unknown | InputSource::Cursor | InputSource::Keyboard => PointerType::Unknown,
        }
    }

    /// The `pointerType` string exposed to content.
    pub fn pointer_type_name(self) -> &'static str {
        match self {
            InputSource::Mouse => "mouse",
            InputSource::Pen => "pen",
            InputSource::Touch => "touch",
            _ => "",
        }
    }
}

impl From<InputSource> for PointerType {
    fn from(input_source: InputSource) -> Self {
        input_source.pointer_type()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseMessage {
    Move,
    Up,
    Down,
    EnterIntoWidget,
    ExitFromWidget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchMessage {
    Start,
    Move,
    End,
    Cancel,
    /// The platform cancelled the pointer stream but keeps delivering touch events.
    PointerCancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerMessage {
    /// The source event has no pointer counterpart and must not be forwarded.
    #[default]
    None,
    Move,
    Up,
    Down,
    Cancel,
    GotCapture,
    LostCapture,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventReason {
    #[default]
    Real,
    Synthesized,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EventFlags: u32 {
        const TRUSTED = 1 << 0;
        const BUBBLES = 1 << 1;
        const CANCELABLE = 1 << 2;
        const COMPOSED = 1 << 3;
        const DEFAULT_PREVENTED = 1 << 4;
        const DEFAULT_PREVENTED_BY_CONTENT = 1 << 5;
        /// Only chrome listeners may see the event.
        const ONLY_CHROME_DISPATCH = 1 << 6;
        const SYNTHESIZED_FOR_TESTS = 1 << 7;
        /// A mouse or touch event that still has to produce its pointer event.
        const CONVERT_TO_POINTER = 1 << 8;
        /// Pointer capture was released. A move has to follow so boundary events are fired.
        const SYNTHESIZE_MOVE_AFTER_DISPATCH = 1 << 9;
        const IGNORE_CAPTURING_CONTENT = 1 << 10;
    }
}

bitflags! {
    /// The `buttons` bitmask of a mouse or pointer event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ButtonsFlags: u16 {
        const PRIMARY = 0x01;
        const SECONDARY = 0x02;
        const AUXILIARY = 0x04;
        const FOURTH = 0x08;
        const FIFTH = 0x10;
        const ERASER = 0x20;
    }
}

impl ButtonsFlags {
    pub fn for_button(button: Option<PointerButton>) -> ButtonsFlags {
        match button {
            None => ButtonsFlags::empty(),
            Some(PointerButton::Primary) => ButtonsFlags::PRIMARY,
            Some(PointerButton::Secondary) => ButtonsFlags::SECONDARY,
            Some(PointerButton::Auxiliary) => ButtonsFlags::AUXILIARY,
            Some(PointerButton::X1) => ButtonsFlags::FOURTH,
            Some(PointerButton::X2) => ButtonsFlags::FIFTH,
            Some(_) => ButtonsFlags::empty(),
        }
    }
}

/// The closed set of event shapes the handler understands.
#[derive(Debug, Clone)]
pub enum WidgetEvent {
    Mouse(MouseEvent),
    Touch(TouchEvent),
    Pointer(PointerEvent),
}

impl WidgetEvent {
    pub fn flags(&self) -> EventFlags {
        match self {
            WidgetEvent::Mouse(event) => event.flags,
            WidgetEvent::Touch(event) => event.flags,
            WidgetEvent::Pointer(event) => event.flags,
        }
    }

    pub fn flags_mut(&mut self) -> &mut EventFlags {
        match self {
            WidgetEvent::Mouse(event) => &mut event.flags,
            WidgetEvent::Touch(event) => &mut event.flags,
            WidgetEvent::Pointer(event) => &mut event.flags,
        }
    }

    pub fn should_synthesize_move_after_dispatch(&self) -> bool {
        self.flags().contains(EventFlags::SYNTHESIZE_MOVE_AFTER_DISPATCH)
    }
}

impl From<MouseEvent> for WidgetEvent {
    fn from(event: MouseEvent) -> Self {
        WidgetEvent::Mouse(event)
    }
}

impl From<TouchEvent> for WidgetEvent {
    fn from(event: TouchEvent) -> Self {
        WidgetEvent::Touch(event)
    }
}

impl From<PointerEvent> for WidgetEvent {
    fn from(event: PointerEvent) -> Self {
        WidgetEvent::Pointer(event)
    }
}
