/// Task slots in the pool's handoff queue.
pub const RING_CAPACITY: usize = 256;

/// A fixed-capacity circular buffer of tasks.
///
/// The ring carries no synchronization of its own — the thread pool wraps it
/// in a mutex and a pair of counting semaphores. Pushing into a full ring
/// silently drops the task: a caller that pushes without holding a free-slot
/// permit has already broken the protocol, and the ring stays trivial rather
/// than trying to report it. Do not "fix" this by rejecting the push; the
/// semaphore protocol is the safety net.
#[derive(Debug)]
pub struct Ring<T> {
    slots: Vec<Option<T>>,
    size: usize,
    inbound: usize,
    outbound: usize,
}

impl<T> Ring<T> {
    pub fn new(capacity: usize) -> Ring<T> {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Ring { slots, size: 0, inbound: 0, outbound: 0 }
    }

    /// O(1); no-op (dropping the task) when the ring is full.
    pub fn push(&mut self, task: T) {
        if self.size == self.slots.len() {
            return;
        }

        self.slots[self.inbound] = Some(task);
        self.inbound = (self.inbound + 1) % self.slots.len();
        self.size += 1;
    }

    /// O(1); `None` when the ring is empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.size == 0 {
            return None;
        }

        let task = self.slots[self.outbound].take();
        self.outbound = (self.outbound + 1) % self.slots.len();
        self.size -= 1;

        task
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
