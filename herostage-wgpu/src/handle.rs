use std::collections::HashMap;

/// Handle store mapping opaque u64 handles to GPU resources.
/// The runtime holds the handles; the renderer owns the resources.
pub struct HandleStore<T> {
    items: HashMap<u64, T>,
    next: u64,
}

impl<T> HandleStore<T> {
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            next: 1,
        }
    }

    /// Insert an item and return its opaque handle.
    pub fn insert(&mut self, item: T) -> u64 {
        let handle = self.next;
        self.next += 1;
        self.items.insert(handle, item);
        handle
    }

    pub fn get(&self, handle: u64) -> Option<&T> {
        self.items.get(&handle)
    }

}

impl<T> Default for HandleStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
