use thiserror::Error;

use crate::events::PointerId;

/// Errors raised by the element-facing pointer capture API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointerError {
    /// The pointer id does not match any active pointer.
    #[error("no active pointer with id {0}")]
    PointerNotFound(PointerId),
    /// The element or its document is in a state that forbids the request.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_pointer() {
        let error = PointerError::PointerNotFound(PointerId::new(7));
        assert_eq!(error.to_string(), "no active pointer with id 7");

        let error = PointerError::InvalidState("element is not connected");
        assert_eq!(error.to_string(), "invalid state: element is not connected");
    }

    #[test]
    fn pointer_errors_are_std_errors() {
        let error: Box<dyn std::error::Error> = Box::new(PointerError::PointerNotFound(PointerId::MOUSE));
        assert!(error.source().is_none());
        assert_eq!(error.to_string(), "no active pointer with id 0");
    }
}
