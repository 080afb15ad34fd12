//! Name + declaration-order index ("listmap").
//!
//! A [`DynamicVector`] keeps objects in declaration order and an
//! [`OpenHashTable`] maps each current name to its position. After every
//! public operation each live object has exactly one table entry and each
//! entry resolves to an object carrying that name.

use tracing::{debug, trace};

use super::{hash_key, DynamicVector, Indexed, KeySource, OpenHashTable, Sort};
use crate::util::{Error, Result};

impl<T: Indexed> KeySource for DynamicVector<T> {
    #[inline]
    fn key_at(&self, position: usize) -> Option<&str> {
        self.get(position).map(|o| o.name())
    }
}

/// Ordered collection of named objects with O(1) lookup by name or position.
#[derive(Clone, Debug)]
pub struct ListIndex<T> {
    items: DynamicVector<T>,
    table: OpenHashTable,
}

impl<T: Indexed> Default for ListIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Indexed> ListIndex<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create sized for `capacity` objects (0 selects the default).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: DynamicVector::with_capacity(capacity),
            table: OpenHashTable::new(capacity),
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

    /// Objects in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Mutable access for non-name fields. Renaming must go through [`Self::rename`].
    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Current names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|o| o.name())
    }

    /// Append `obj`; fails if its name is already live.
    pub fn add(&mut self, obj: T) -> Result<usize> {
        if self.position(obj.name()).is_some() {
            return Err(Error::NameConflict(obj.name().to_string()));
        }
        let position = self.items.append(obj);
        let name = self
            .items
            .get(position)
            .map(|o| o.name())
            .ok_or_else(|| Error::internal("appended object vanished"))?;
        self.table.insert(name, position, &self.items);
        Ok(position)
    }

    /// Position of the object named `name`.
    #[inline]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.table.lookup(name, &self.items)
    }

    pub fn lookup(&self, name: &str) -> Option<&T> {
        self.position(name).and_then(|p| self.items.get(p))
    }

    pub(crate) fn lookup_mut(&mut self, name: &str) -> Option<&mut T> {
        let position = self.position(name)?;
        self.items.get_mut(position)
    }

    /// Object at declaration position `i`.
    #[inline]
    pub fn ith(&self, i: usize) -> Option<&T> {
        self.items.get(i)
    }

    pub(crate) fn ith_mut(&mut self, i: usize) -> Option<&mut T> {
        self.items.get_mut(i)
    }

    /// Position of the object carrying numeric id `id`.
    pub fn find_id(&self, id: usize) -> Option<usize> {
        self.items.iter().position(|o| o.id() == id)
    }

    /// Rename `old` to `new` in place; position and id are unchanged.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<usize> {
        if self.position(new).is_some() {
            return Err(Error::NameConflict(new.to_string()));
        }
        let position = self
            .table
            .remove(old, &self.items)
            .ok_or_else(|| Error::NotFound(old.to_string()))?;
        let obj = self
            .items
            .get_mut(position)
            .ok_or_else(|| Error::internal(format!("hash entry {old:?} points past the vector")))?;
        obj.header_mut().set_name(new.to_string());
        self.table.insert(new, position, &self.items);
        trace!(old, new, position, "renamed");
        Ok(position)
    }

    /// Remove the object named `name`.
    ///
    /// Only attribute indexes allow removal. Every object numbered above the
    /// removed one moves down by one, then the table is rebuilt.
    pub fn remove(&mut self, name: &str) -> Result<T> {
        let position = self
            .position(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        let sort = self.items.get(position).map(|o| o.header().sort);
        if sort != Some(Sort::Attribute) {
            return Err(Error::NotAllowed(format!("cannot remove {name:?} from a non-attribute index")));
        }
        let removed = self
            .items
            .remove_at(position)
            .ok_or_else(|| Error::internal("remove position out of range"))?;
        let removed_id = removed.id();
        for obj in self.items.iter_mut() {
            let hdr = obj.header_mut();
            if hdr.id > removed_id {
                hdr.id -= 1;
            }
        }
        self.rebuild();
        debug!(name, position, remaining = self.items.len(), "removed from index");
        Ok(removed)
    }

    /// Discard the table and rebuild it from the vector.
    pub fn rebuild(&mut self) {
        let mut table = OpenHashTable::new(self.items.len());
        for (position, obj) in self.items.iter().enumerate() {
            table.insert(obj.name(), position, &self.items);
        }
        self.table = table;
    }

    /// Check that table and vector agree in both directions.
    pub fn verify(&self) -> Result<()> {
        if self.table.len() != self.items.len() {
            return Err(Error::internal(format!(
                "{} hash entries for {} objects",
                self.table.len(),
                self.items.len()
            )));
        }
        let mut seen = vec![0usize; self.items.len()];
        for slot in self.table.entries() {
            let name = self.items.key_at(slot.position).ok_or_else(|| {
                Error::internal(format!("hash entry points at missing position {}", slot.position))
            })?;
            if hash_key(name) != slot.hash {
                return Err(Error::internal(format!("stale hash for {name:?} at {}", slot.position)));
            }
            seen[slot.position] += 1;
        }
        if let Some(position) = seen.iter().position(|&n| n != 1) {
            return Err(Error::internal(format!(
                "object at {position} has {} hash entries",
                seen[position]
            )));
        }
        for (position, obj) in self.items.iter().enumerate() {
            if self.position(obj.name()) != Some(position) {
                return Err(Error::internal(format!("{:?} does not resolve to {position}", obj.name())));
            }
        }
        Ok(())
    }
}

impl<T: Indexed + Clone> ListIndex<T> {
    /// Snapshot of the objects, safe to walk while the index changes.
    pub fn dup(&self) -> Vec<T> {
        self.items.dup()
    }
}

impl<'a, T> IntoIterator for &'a ListIndex<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
