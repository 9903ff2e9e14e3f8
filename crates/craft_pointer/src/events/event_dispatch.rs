use std::rc::Rc;

use crate::document::{Document, Node};
use crate::events::{PointerEvent, WidgetEvent};

/// Delivers the events the pointer handler produces.
///
/// Implemented by the host's presentation layer. Listener code runs inside these calls and may
/// call back into the handler, so the handler never holds a borrow of its tables across them.
pub trait EventDispatcher {
    /// Dispatches `event` at `target` without hit-testing. Listeners may flag the event, e.g. with
    /// [`EventFlags::DEFAULT_PREVENTED_BY_CONTENT`](crate::events::EventFlags::DEFAULT_PREVENTED_BY_CONTENT).
    fn dispatch_with_target(&mut self, event: &mut PointerEvent, target: &Rc<dyn Node>);

    /// Hit-tests the event position and dispatches at the resulting target. Only used for
    /// pointers that are not captured.
    fn dispatch_hit_tested(&mut self, event: &mut PointerEvent);

    /// Dispatches a bubbling, composed event at `document` itself.
    fn dispatch_at_document(&mut self, event: &mut PointerEvent, document: &Rc<Document>);

    /// Feeds a synthesized event back through the widget as if it were input.
    fn dispatch_to_widget(&mut self, event: WidgetEvent);
}
