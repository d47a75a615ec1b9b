//! Scene-scoped identifier allocation.

/// Identifier of an item inside one scene. Zero means "not yet assigned".
pub type ItemId = u64;

/// Identifier of a connection between two links.
pub type ConnectionId = u64;

/// Monotonic id source owned by a scene.
///
/// Ids are never handed out twice by the same allocator, even after the
/// item that carried one has been removed. Ids coming from outside (a loaded
/// document, an undo snapshot) are reported through [`IdAllocator::observe`]
/// so later allocations stay above them.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    last: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id.
    pub fn next_id(&mut self) -> u64 {
        self.last += 1;
        self.last
    }

    /// Record an externally supplied id.
    pub fn observe(&mut self, id: u64) {
        if id > self.last {
            self.last = id;
        }
    }

    /// The most recently allocated or observed id.
    pub fn last(&self) -> u64 {
        self.last
    }
}
