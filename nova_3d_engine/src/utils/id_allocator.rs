/// Allocates and recycles unique `u32` identifiers.
///
/// One allocator is owned by each `SceneManager` and handed to the systems
/// that mint identifiers (material ids, instancing batch ids), so id
/// generation is deterministic per instance instead of hidden behind
/// process-wide counters. Freed ids are recycled on subsequent allocations.
///
/// # Example
///
/// ```ignore
/// let mut ids = IdAllocator::new();
/// let a = ids.alloc();  // 0
/// let b = ids.alloc();  // 1
/// ids.free(a);          // 0 is now available
/// let c = ids.alloc();  // 0 (recycled)
/// ```
pub struct IdAllocator {
    free_list: Vec<u32>,
    next_id: u32,
    len: u32,
}

impl IdAllocator {
    /// Create a new empty allocator
    pub fn new() -> Self {
        Self {
            free_list: Vec::new(),
            next_id: 0,
            len: 0,
        }
    }

    /// Allocate the next available id
    pub fn alloc(&mut self) -> u32 {
        self.len += 1;
        self.free_list.pop().unwrap_or_else(|| {
            let id = self.next_id;
            self.next_id += 1;
            id
        })
    }

    /// Return an id to the pool for reuse
    pub fn free(&mut self, id: u32) {
        debug_assert!(id < self.next_id, "freeing an unallocated id: {}", id);
        self.len -= 1;
        self.free_list.push(id);
    }

    /// Highest id ever allocated + 1
    pub fn high_water_mark(&self) -> u32 {
        self.next_id
    }

    /// Number of currently allocated ids
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether no ids are currently allocated
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "id_allocator_tests.rs"]
mod tests;
