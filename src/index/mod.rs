//! Indexing layer - ordered, name-addressable object collections.
//!
//! - [`DynamicVector`] - growable sequence in declaration order
//! - [`OpenHashTable`] - linear-probing name table with tombstones
//! - [`ListIndex`] - both combined, with rename and renumbering removal
//! - [`NcObject`] - sort, name and id carried by every catalog object

mod object;
mod vector;
mod hashmap;
mod listmap;

pub use object::{Indexed, NcObject, Sort};
pub use vector::{DynamicVector, DEFAULT_ALLOC};
pub use hashmap::{hash_key, HashSlot, KeySource, OpenHashTable, SlotState, DEFAULT_TABLE_SIZE};
pub use listmap::ListIndex;
