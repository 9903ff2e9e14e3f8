#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use craft_pointer::document::{Document, Node, NodeId};
use craft_pointer::events::{EventDispatcher, PointerEvent, PointerId, PointerMessage, WidgetEvent};
use craft_pointer::remote::{CaptureResponse, EndpointId, RemoteCaptureChannel, RemoteEndpoint};

thread_local! {
    static NEXT_NODE_ID: Cell<NodeId> = const { Cell::new(1) };
}

/// Routes `tracing` output to the test harness. Safe to call from every test.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::TRACE)
        .with_test_writer()
        .try_init();
}

/// A minimal DOM node. Children keep their parent alive.
pub struct TestNode {
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

    pub fn element(document: &Rc<Document>) -> Rc<TestNode> {
        Self::create(document, true, None)
    }

    pub fn child_element(document: &Rc<Document>, parent: &Rc<dyn Node>) -> Rc<TestNode> {
        Self::create(document, true, Some(Rc::clone(parent)))
    }

    pub fn text(document: &Rc<Document>, parent: &Rc<dyn Node>) -> Rc<TestNode> {
        Self::create(document, false, Some(Rc::clone(parent)))
    }

    pub fn detach(&self) {
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

pub fn as_node(node: &Rc<TestNode>) -> Rc<dyn Node> {
    node.clone()
}

/// One delivery made through [`RecordingDispatcher`].
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    AtTarget(PointerMessage, PointerId, NodeId),
    HitTested(PointerMessage, PointerId),
    AtDocument(PointerMessage, PointerId),
    ToWidget,
}

type Listener = Box<dyn FnMut(&mut PointerEvent, &Rc<dyn Node>)>;

/// Records every delivery in order. An optional listener runs for targeted dispatches, the way
/// content listeners would.
#[derive(Default)]
pub struct RecordingDispatcher {
    pub log: Vec<Dispatched>,
    pub events: Vec<PointerEvent>,
    pub widget_events: Vec<WidgetEvent>,
    listener: Option<Listener>,
}

impl RecordingDispatcher {
    pub fn with_listener(listener: impl FnMut(&mut PointerEvent, &Rc<dyn Node>) + 'static) -> Self {
        Self {
            listener: Some(Box::new(listener)),
            ..Self::default()
        }
    }

    /// Got and lost capture notifications only.
    pub fn capture_log(&self) -> Vec<Dispatched> {
        self.log
            .iter()
            .filter(|entry| {
                matches!(
                    entry,
                    Dispatched::AtTarget(PointerMessage::GotCapture | PointerMessage::LostCapture, ..)
                        | Dispatched::AtDocument(PointerMessage::GotCapture | PointerMessage::LostCapture, ..)
                )
            })
            .cloned()
            .collect()
    }

    pub fn clear(&mut self) {
        self.log.clear();
        self.events.clear();
        self.widget_events.clear();
    }
}

impl EventDispatcher for RecordingDispatcher {
    fn dispatch_with_target(&mut self, event: &mut PointerEvent, target: &Rc<dyn Node>) {
        if let Some(listener) = self.listener.as_mut() {
            listener(event, target);
        }
        self.log
            .push(Dispatched::AtTarget(event.message, event.pointer_id, target.id()));
        self.events.push(event.clone());
    }

    fn dispatch_hit_tested(&mut self, event: &mut PointerEvent) {
        self.log.push(Dispatched::HitTested(event.message, event.pointer_id));
        self.events.push(event.clone());
    }

    fn dispatch_at_document(&mut self, event: &mut PointerEvent, _document: &Rc<Document>) {
        self.log.push(Dispatched::AtDocument(event.message, event.pointer_id));
        self.events.push(event.clone());
    }

    fn dispatch_to_widget(&mut self, event: WidgetEvent) {
        self.log.push(Dispatched::ToWidget);
        self.widget_events.push(event);
    }
}

/// A content-side channel that holds capture requests until the test answers them.
#[derive(Default)]
pub struct RecordingChannel {
    pending: RefCell<Vec<(PointerId, CaptureResponse)>>,
    pub requested: RefCell<Vec<PointerId>>,
    pub released: RefCell<Vec<PointerId>>,
}

impl RecordingChannel {
    /// Answers the oldest outstanding request.
    pub fn respond(&self, response: Result<bool, craft_pointer::remote::RemoteRejectReason>) {
        let (_, on_response) = self.pending.borrow_mut().remove(0);
        on_response(response);
    }
}

impl RemoteCaptureChannel for RecordingChannel {
    fn send_request_pointer_capture(&self, pointer_id: PointerId, on_response: CaptureResponse) {
        self.requested.borrow_mut().push(pointer_id);
        self.pending.borrow_mut().push((pointer_id, on_response));
    }

    fn send_release_pointer_capture(&self, pointer_id: PointerId) {
        self.released.borrow_mut().push(pointer_id);
    }
}

/// A parent-side endpoint that counts release-all notifications.
pub struct TestEndpoint {
    id: EndpointId,
    pub release_all_calls: Cell<usize>,
}

impl TestEndpoint {
    pub fn new(id: u64) -> Rc<TestEndpoint> {
        Rc::new(TestEndpoint {
            id: EndpointId(id),
            release_all_calls: Cell::new(0),
        })
    }
}

impl RemoteEndpoint for TestEndpoint {
    fn endpoint_id(&self) -> EndpointId {
        self.id
    }

    fn send_release_all_pointer_capture(&self) {
        self.release_all_calls.set(self.release_all_calls.get() + 1);
    }
}
