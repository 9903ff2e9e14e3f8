use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::document::{Document, Node, NodeId};
use crate::events::{EventDispatcher, PointerEvent, WidgetEvent};

thread_local! {
    static NEXT_NODE_ID: Cell<NodeId> = const { Cell::new(1) };
}

pub(crate) struct TestNode {
    id: NodeId,
    element: bool,
    document: Weak<Document>,
    parent: Option<Rc<dyn Node>>,
    attached: Cell<bool>,
}

impl TestNode {
    fn create(document: &Rc<Document>, element: bool, parent: Option<Rc<dyn Node>>) -> Rc<TestNode> {
        let id = NEXT_NODE_ID.with(|next| next.replace(next.get() + 1));
        Rc::new(TestNode {
            id,
            element,
            document: Rc::downgrade(document),
            parent,
            attached: Cell::new(true),
        })
    }

    pub(crate) fn new_element(document: &Rc<Document>) -> Rc<TestNode> {
        Self::create(document, true, None)
    }

    pub(crate) fn element(document: &Rc<Document>) -> Rc<dyn Node> {
        Self::new_element(document)
    }

    pub(crate) fn text_child(document: &Rc<Document>, parent: &Rc<dyn Node>) -> Rc<dyn Node> {
        Self::create(document, false, Some(Rc::clone(parent)))
    }

    pub(crate) fn detach(&self) {
        self.attached.set(false);
    }
}

impl Node for TestNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn is_element(&self) -> bool {
        self.element
    }

    fn parent(&self) -> Option<Rc<dyn Node>> {
        self.parent.clone()
    }

    fn owner_document(&self) -> Option<Rc<Document>> {
        self.document.upgrade()
    }

    fn is_connected(&self) -> bool {
        self.attached.get() && self.parent.as_ref().is_none_or(|parent| parent.is_connected())
    }
}

#[derive(Default)]
pub(crate) struct RecordingDispatcher {
    pub(crate) with_target: Vec<(PointerEvent, Rc<dyn Node>)>,
    pub(crate) hit_tested: Vec<PointerEvent>,
    pub(crate) at_document: Vec<PointerEvent>,
    pub(crate) to_widget: Vec<WidgetEvent>,
}

impl EventDispatcher for RecordingDispatcher {
    fn dispatch_with_target(&mut self, event: &mut PointerEvent, target: &Rc<dyn Node>) {
        self.with_target.push((event.clone(), Rc::clone(target)));
    }

    fn dispatch_hit_tested(&mut self, event: &mut PointerEvent) {
        self.hit_tested.push(event.clone());
    }

    fn dispatch_at_document(&mut self, event: &mut PointerEvent, _document: &Rc<Document>) {
        self.at_document.push(event.clone());
    }

    fn dispatch_to_widget(&mut self, event: WidgetEvent) {
        self.to_widget.push(event);
    }
}
