//! Request identifiers for latest-only async results.

/// Opaque, monotonically increasing id matching a result to its request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Tracks the latest issued request; results for anything older are stale.
#[derive(Debug, Default)]
pub struct LatestOnly {
    next: u64,
    active: Option<RequestId>,
}

impl LatestOnly {
    /// Issues a new id and makes it the only active one.
    pub fn begin(&mut self) -> RequestId {
        let id = RequestId(self.next);
        self.next = self.next.wrapping_add(1);
        self.active = Some(id);
        id
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }

    pub fn is_active(&self, id: RequestId) -> bool {
        self.active == Some(id)
    }

    pub fn has_active(&self) -> bool {
        self.active.is_some()
    }

    /// Finishes the request if it's still active; false means the result is stale.
    pub fn finish_if_active(&mut self, id: RequestId) -> bool {
        if self.is_active(id) {
            self.active = None;
            true
        } else {
            false
        }
    }
}
