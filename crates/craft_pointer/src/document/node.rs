use std::rc::Rc;

use crate::document::Document;

pub type NodeId = u64;

/// A node of the host's DOM tree.
///
/// The pointer handler never owns the tree. It only needs enough of a node to walk to its
/// ancestors, find its document, and tell whether it is still attached.
pub trait Node {
    fn id(&self) -> NodeId;

    /// Text and other character data nodes return `false`.
    fn is_element(&self) -> bool;

    fn parent(&self) -> Option<Rc<dyn Node>>;

    /// The document this node belongs to, as long as that document is alive.
    fn owner_document(&self) -> Option<Rc<Document>>;

    /// Whether the node is attached to a live (composed) document tree.
    fn is_connected(&self) -> bool;
}

/// Compares two nodes by identity.
pub fn same_node(a: &Rc<dyn Node>, b: &Rc<dyn Node>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

pub fn is_inclusive_descendant_of(node: &Rc<dyn Node>, ancestor: &Rc<dyn Node>) -> bool {
    let mut current = Some(Rc::clone(node));
    while let Some(candidate) = current {
        if same_node(&candidate, ancestor) {
            return true;
        }
        current = candidate.parent();
    }
    false
}

/// Walks up from `node` to the first element, including `node` itself.
pub fn nearest_element(node: &Rc<dyn Node>) -> Option<Rc<dyn Node>> {
    let mut current = Some(Rc::clone(node));
    while let Some(candidate) = current {
        if candidate.is_element() {
            return Some(candidate);
        }
        current = candidate.parent();
    }
    None
}
