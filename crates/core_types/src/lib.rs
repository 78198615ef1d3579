pub type TabId = u64;
pub type RequestId = u64;

/// Monotonic id source for request/response correlation on one channel.
#[derive(Debug)]
pub struct RequestIds {
    next: RequestId,
}

impl RequestIds {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> RequestId {
        let id = self.next;
        self.next = self.next.wrapping_add(1).max(1);
        id
    }
}

impl Default for RequestIds {
    fn default() -> Self {
        Self::new()
    }
}
