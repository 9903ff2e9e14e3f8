use std::fmt;
use std::rc::Rc;

use craft_logging::debug;
use rustc_hash::FxHashMap;

use crate::events::PointerId;

/// Why a remote request never got an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteRejectReason {
    /// The channel closed before the response arrived.
    ChannelClosed,
    /// The other side failed to handle the request.
    HandlerRejected,
}

/// Called once with the parent's verdict on a capture request.
pub type CaptureResponse = Box<dyn FnOnce(Result<bool, RemoteRejectReason>)>;

/// The content-process end of the connection to the parent process.
pub trait RemoteCaptureChannel {
    /// Asks the parent to route `pointer_id` to this endpoint. `on_response` runs later, with
    /// `Ok(false)` if another endpoint already owns the pointer.
    fn send_request_pointer_capture(&self, pointer_id: PointerId, on_response: CaptureResponse);

    fn send_release_pointer_capture(&self, pointer_id: PointerId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EndpointId(pub u64);

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "endpoint#{}", self.0)
    }
}

/// The parent-process handle of a remote rendering endpoint.
pub trait RemoteEndpoint {
    fn endpoint_id(&self) -> EndpointId;

    /// Tells the endpoint to release all pointer captures on its side.
    fn send_release_all_pointer_capture(&self);
}

/// Decides which remote endpoint receives the events of a captured pointer.
///
/// Only exists in the parent process.
#[derive(Default)]
pub struct CaptureArbiter {
    owners: FxHashMap<PointerId, Rc<dyn RemoteEndpoint>>,
    pointer_lock_owner: Option<EndpointId>,
}

impl CaptureArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer_lock_owner(&self) -> Option<EndpointId> {
        self.pointer_lock_owner
    }

    pub fn set_pointer_lock_owner(&mut self, owner: Option<EndpointId>) {
        self.pointer_lock_owner = owner;
    }

    /// Records `endpoint` as the owner of `pointer_id`.
    ///
    /// Fails without changing anything when another endpoint holds the pointer lock or already
    /// owns the pointer. Claiming again from the owning endpoint succeeds.
    pub fn claim_remote_capture(&mut self, pointer_id: PointerId, endpoint: &Rc<dyn RemoteEndpoint>) -> bool {
        let endpoint_id = endpoint.endpoint_id();

        if self.pointer_lock_owner.is_some_and(|owner| owner != endpoint_id) {
            return false;
        }

        if let Some(current) = self.owners.get(&pointer_id)
            && current.endpoint_id() != endpoint_id
        {
            return false;
        }

        debug!("{endpoint_id} captures pointer {pointer_id}");
        self.owners.insert(pointer_id, Rc::clone(endpoint));
        true
    }

    pub fn release_remote_capture(&mut self, pointer_id: PointerId) {
        self.owners.remove(&pointer_id);
    }

    /// Releases every pointer owned by `endpoint_id`, e.g. when the endpoint disconnects.
    pub fn release_remote_captures_for(&mut self, endpoint_id: EndpointId) {
        self.owners.retain(|_, owner| owner.endpoint_id() != endpoint_id);
    }

    pub fn remote_owner(&self, pointer_id: PointerId) -> Option<Rc<dyn RemoteEndpoint>> {
        self.owners.get(&pointer_id).cloned()
    }

    /// Empties the table and returns what it held.
    pub fn take_all_owners(&mut self) -> Vec<(PointerId, Rc<dyn RemoteEndpoint>)> {
        self.owners.drain().collect()
    }

    /// Asks every owning endpoint to release its captures and empties the table.
    pub fn release_all_remote_captures(&mut self) {
        notify_release_all(self.take_all_owners());
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// Endpoints may call back into whoever owns the arbiter, so no borrow of it may be held here.
pub(crate) fn notify_release_all(owners: Vec<(PointerId, Rc<dyn RemoteEndpoint>)>) {
    for (pointer_id, owner) in owners {
        debug!("{} releases pointer {pointer_id}", owner.endpoint_id());
        owner.send_release_all_pointer_capture();
    }
}
