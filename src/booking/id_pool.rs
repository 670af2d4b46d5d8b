use crate::model::BookingId;

/// Recycles released booking ids before issuing fresh ones.
///
/// Released ids are reused last-in first-out. Fresh ids start at 1 and only
/// advance when the pool is empty.
#[derive(Debug, Clone)]
pub struct FreeIdPool {
    free: Vec<BookingId>,
    next_fresh: BookingId,
}

impl Default for FreeIdPool {
    fn default() -> Self {
        Self::new()
    }
}

impl FreeIdPool {
    pub fn new() -> Self {
        Self {
            free: Vec::new(),
            next_fresh: 1,
        }
    }

    pub fn acquire(&mut self) -> BookingId {
        if let Some(id) = self.free.pop() {
            return id;
        }
        let id = self.next_fresh;
        self.next_fresh += 1;
        id
    }

    /// Return `id` to the pool. The caller guarantees it is no longer in use.
    pub fn release(&mut self, id: BookingId) {
        debug_assert!(id < self.next_fresh, "released id {id} was never issued");
        debug_assert!(!self.free.contains(&id), "id {id} released twice");
        self.free.push(id);
    }

    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// The id `acquire` would issue if the pool were empty.
    pub fn next_fresh(&self) -> BookingId {
        self.next_fresh
    }
}
