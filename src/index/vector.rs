//! Growable, position-addressed object sequence.

/// Initial allocation; most containers hold few children.
pub const DEFAULT_ALLOC: usize = 7;

/// Growable sequence with doubling growth and compacting removal.
#[derive(Clone, Debug)]
pub struct DynamicVector<T> {
    items: Vec<T>,
}

impl<T> Default for DynamicVector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DynamicVector<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Create with room for `capacity` items (0 selects the default).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = if capacity == 0 { DEFAULT_ALLOC } else { capacity };
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Append and return the new item's position.
    pub fn append(&mut self, item: T) -> usize {
        if self.items.len() == self.items.capacity() {
            let grow = self.items.capacity().max(DEFAULT_ALLOC);
            self.items.reserve_exact(grow);
        }
        self.items.push(item);
        self.items.len() - 1
    }

    #[inline]
    pub fn get(&self, position: usize) -> Option<&T> {
        self.items.get(position)
    }

    #[inline]
    pub fn get_mut(&mut self, position: usize) -> Option<&mut T> {
        self.items.get_mut(position)
    }

    /// Remove the item at `position`, shifting later items down by one.
    pub fn remove_at(&mut self, position: usize) -> Option<T> {
        if position < self.items.len() {
            Some(self.items.remove(position))
        } else {
            None
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

}

impl<T: Clone> DynamicVector<T> {
    /// Snapshot of the contents, independent of later structural changes.
    pub fn dup(&self) -> Vec<T> {
        self.items.clone()
    }
}

impl<'a, T> IntoIterator for &'a DynamicVector<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
