mod document;
mod document_id;
mod node;

pub use document::Document;
pub use document_id::DocumentId;
pub use node::{Node, NodeId, is_inclusive_descendant_of, nearest_element, same_node};
