//! The per-thread pointer event handler.
//!
//! Hosts install it once at startup and tear it down at shutdown. Everything in between reaches it
//! through [`pointer_event_handler`]. Using it outside that window is a host bug and panics.

use std::cell::RefCell;

use craft_logging::info;

use crate::handler::PointerEventHandler;
use crate::options::PointerOptions;

thread_local! {
    /// The handler serving every document on this thread.
    static POINTER_EVENT_HANDLER: RefCell<Option<PointerEventHandler>> = const { RefCell::new(None) };
}

/// Installs the handler for this thread.
///
/// # Panics
///
/// Panics if the handler is already installed.
pub fn initialize_statics(options: PointerOptions) -> PointerEventHandler {
    POINTER_EVENT_HANDLER.with_borrow_mut(|slot| {
        assert!(slot.is_none(), "pointer event handler is already initialized");
        info!("initializing pointer event handler ({:?})", options.process_kind);
        let handler = PointerEventHandler::new(options);
        *slot = Some(handler.clone());
        handler
    })
}

/// Drops every capture and pointer record and uninstalls the handler.
///
/// # Panics
///
/// Panics if the handler was never installed.
pub fn release_statics() {
    let handler = POINTER_EVENT_HANDLER
        .with_borrow_mut(Option::take)
        .expect("pointer event handler was never initialized");
    handler.shutdown();
    info!("pointer event handler released");
}

/// The handler installed on this thread.
///
/// # Panics
///
/// Panics if called before [`initialize_statics`] or after [`release_statics`].
pub fn pointer_event_handler() -> PointerEventHandler {
    try_pointer_event_handler().expect("pointer event handler used before initialize_statics")
}

pub fn try_pointer_event_handler() -> Option<PointerEventHandler> {
    POINTER_EVENT_HANDLER.with_borrow(Option::clone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_lives_between_initialize_and_release() {
        assert!(try_pointer_event_handler().is_none());

        let handler = initialize_statics(PointerOptions::default());
        let installed = pointer_event_handler();
        assert!(std::rc::Rc::ptr_eq(&handler.inner, &installed.inner));

        release_statics();
        assert!(try_pointer_event_handler().is_none());
    }

    #[test]
    #[should_panic(expected = "before initialize_statics")]
    fn using_the_handler_before_initializing_panics() {
        pointer_event_handler();
    }

    #[test]
    #[should_panic(expected = "already initialized")]
    fn initializing_twice_panics() {
        let _first = initialize_statics(PointerOptions::default());
        let _second = initialize_statics(PointerOptions::default());
    }

    #[test]
    #[should_panic(expected = "never initialized")]
    fn releasing_without_initializing_panics() {
        release_statics();
    }
}
