use std::cell::Cell;
use std::fmt;

thread_local! {
    static THREAD_LOCAL_DOCUMENT_ID: Cell<u64> = const { Cell::new(0) };
}

/// Identifies a document for the lifetime of the thread that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    pub(crate) fn next() -> Self {
        THREAD_LOCAL_DOCUMENT_ID.with(|counter| {
            let id = counter.get();
            counter.set(id + 1);
            DocumentId(id)
        })
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "document#{}", self.0)
    }
}
