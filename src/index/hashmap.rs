//! Open-addressing name table with linear probing.
//!
//! Slots never own a key. Each active slot stores the position of its object
//! and the cached hash of the object's name; the name itself is read through
//! a [`KeySource`] whenever a comparison is needed.
//!
//! Deleted slots become tombstones. Probes for other keys walk past them, and
//! only a rehash turns them back into empty slots.

use tracing::trace;

use super::DEFAULT_ALLOC;

/// Default table size: a small prime.
pub const DEFAULT_TABLE_SIZE: usize = DEFAULT_ALLOC;

/// Resolves a stored position to the current name of the object there.
pub trait KeySource {
    fn key_at(&self, position: usize) -> Option<&str>;
}

/// Hash used for every key.
#[inline]
pub fn hash_key(key: &str) -> u32 {
    murmur3::hash_str(key)
}

/// State of one slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SlotState {
    #[default]
    Empty,
    Active,
    Tombstone,
}

/// One table slot: state, back-reference to the owning object and cached hash.
#[derive(Clone, Copy, Debug, Default)]
pub struct HashSlot {
    pub state: SlotState,
    pub position: usize,
    pub hash: u32,
}

/// Outcome of a probe sequence.
enum Probe {
    Found(usize),
    Vacant(usize),
    Exhausted,
}

/// Name to position map with tombstone deletion.
#[derive(Clone, Debug)]
pub struct OpenHashTable {
    slots: Vec<HashSlot>,
    active: usize,
    deleted: usize,
}

impl Default for OpenHashTable {
    fn default() -> Self {
        Self::new(0)
    }
}

impl OpenHashTable {
    /// Create a table able to hold at least `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        let size = next_prime(capacity.max(DEFAULT_TABLE_SIZE));
        Self {
            slots: vec![HashSlot::default(); size],
            active: 0,
            deleted: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of active entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.active
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    #[inline]
    pub fn tombstones(&self) -> usize {
        self.deleted
    }

    /// Active slots, in table order.
    pub fn entries(&self) -> impl Iterator<Item = &HashSlot> {
        self.slots.iter().filter(|s| s.state == SlotState::Active)
    }

    /// Walk the probe sequence for `key`.
    ///
    /// Tombstones never stop the walk; only an empty slot proves absence.
    fn probe<K: KeySource + ?Sized>(&self, key: &str, hash: u32, keys: &K) -> Probe {
        let cap = self.slots.len();
        let mut idx = hash as usize % cap;
        for _ in 0..cap {
            let slot = &self.slots[idx];
            match slot.state {
                SlotState::Empty => return Probe::Vacant(idx),
                SlotState::Tombstone => {}
                SlotState::Active => {
                    if slot.hash == hash && keys.key_at(slot.position) == Some(key) {
                        return Probe::Found(idx);
                    }
                }
            }
            idx = (idx + 1) % cap;
        }
        Probe::Exhausted
    }

    /// Map `key` to `position`.
    ///
    /// Returns true if the key was new, false if an existing entry was
    /// repointed. `keys` must already resolve `position` to `key`.
    pub fn insert<K: KeySource + ?Sized>(&mut self, key: &str, position: usize, keys: &K) -> bool {
        if (self.active + self.deleted + 1) * 4 > self.slots.len() * 3 {
            self.rehash(self.active + 1);
        }
        let hash = hash_key(key);
        match self.probe(key, hash, keys) {
            Probe::Found(idx) => {
                self.slots[idx].position = position;
                false
            }
            Probe::Vacant(idx) => {
                self.slots[idx] = HashSlot {
                    state: SlotState::Active,
                    position,
                    hash,
                };
                self.active += 1;
                true
            }
            Probe::Exhausted => {
                // Unreachable under the load factor, but never lose an entry.
                self.rehash(self.slots.len() * 2);
                self.insert(key, position, keys)
            }
        }
    }

    /// Position stored for `key`, if present.
    pub fn lookup<K: KeySource + ?Sized>(&self, key: &str, keys: &K) -> Option<usize> {
        match self.probe(key, hash_key(key), keys) {
            Probe::Found(idx) => Some(self.slots[idx].position),
            _ => None,
        }
    }

    /// Remove `key`, leaving a tombstone. Returns the stored position.
    pub fn remove<K: KeySource + ?Sized>(&mut self, key: &str, keys: &K) -> Option<usize> {
        match self.probe(key, hash_key(key), keys) {
            Probe::Found(idx) => Some(self.bury(idx)),
            _ => None,
        }
    }

    fn bury(&mut self, idx: usize) -> usize {
        let slot = &mut self.slots[idx];
        slot.state = SlotState::Tombstone;
        self.active -= 1;
        self.deleted += 1;
        slot.position
    }

    /// Rebuild into a fresh table sized for at least `min_entries`,
    /// dropping every tombstone.
    pub fn rehash(&mut self, min_entries: usize) {
        let wanted = (min_entries.max(self.active) * 2).max(DEFAULT_TABLE_SIZE);
        let size = next_prime(wanted);
        let old = std::mem::replace(&mut self.slots, vec![HashSlot::default(); size]);
        trace!(from = old.len(), to = size, active = self.active, tombstones = self.deleted, "rehash");
        self.deleted = 0;
        for slot in old.into_iter().filter(|s| s.state == SlotState::Active) {
            // Keys are unique, so the first empty slot is the right one.
            let mut idx = slot.hash as usize % size;
            while self.slots[idx].state != SlotState::Empty {
                idx = (idx + 1) % size;
            }
            self.slots[idx] = slot;
        }
    }
}

/// Smallest prime `>= n`.
fn next_prime(n: usize) -> usize {
    let mut candidate = n.max(2);
    loop {
        if is_prime(candidate) {
            return candidate;
        }
        candidate += 1;
    }
}

fn is_prime(n: usize) -> bool {
    if n < 4 {
        return n >= 2;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}
