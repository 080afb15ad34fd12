//! Library provenance record.
//!
//! Provenance is a list of key-value pairs of strings rendered as
//! `version=2,key=value,...` and exposed as the virtual `_NCProperties`
//! attribute of the root group.

use parking_lot::{const_rwlock, RwLock};
use smallvec::SmallVec;
use std::fmt;

/// Current provenance format version.
pub const PROVENANCE_VERSION: u32 = 2;

const VERSION_KEY: &str = "version";

/// Provenance storage - format version plus ordered key-value pairs.
///
/// Version 0 means the dataset carries no provenance.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProvenanceInfo {
    pub version: u32,
    entries: SmallVec<[(String, String); 4]>,
}

impl ProvenanceInfo {
    /// Empty provenance at the current format version.
    pub fn new() -> Self {
        Self {
            version: PROVENANCE_VERSION,
            entries: SmallVec::new(),
        }
    }

    /// Provenance naming this library.
    pub fn library() -> Self {
        let mut info = Self::new();
        info.set(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        info
    }

    /// Set a value, replacing an existing one with the same key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        for (k, v) in &mut self.entries {
            if k == &key {
                *v = value;
                return;
            }
        }
        self.entries.push((key, value));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as `version=N,key=value,...`.
    pub fn serialize(&self) -> String {
        let mut result = format!("{VERSION_KEY}={}", self.version);
        for (k, v) in &self.entries {
            result.push(',');
            result.push_str(&escape(k));
            result.push('=');
            result.push_str(&escape(v));
        }
        result
    }

    /// Parse the rendered form. A missing or malformed version yields 0.
    pub fn parse(s: &str) -> Self {
        let mut info = Self {
            version: 0,
            entries: SmallVec::new(),
        };
        for part in split_unescaped(s, b',') {
            let Some(eq) = find_unescaped(part, b'=') else {
                continue;
            };
            let key = unescape(&part[..eq]);
            let value = unescape(&part[eq + 1..]);
            if key == VERSION_KEY {
                info.version = value.parse().unwrap_or(0);
            } else if !key.is_empty() {
                info.set(key, value);
            }
        }
        info
    }
}

impl fmt::Debug for ProvenanceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvenanceInfo")
            .field("version", &self.version)
            .field("entries", &self.entries)
            .finish()
    }
}

// === Process-wide record ===

static GLOBAL: RwLock<Option<ProvenanceInfo>> = const_rwlock(None);

/// Provenance stamped on datasets created without an explicit record.
pub fn global_provenance() -> ProvenanceInfo {
    if let Some(info) = GLOBAL.read().as_ref() {
        return info.clone();
    }
    GLOBAL.write().get_or_insert_with(ProvenanceInfo::library).clone()
}

/// Replace the process-wide provenance record. Datasets created afterwards
/// without their own record report it through `_NCProperties`.
pub fn set_global_provenance(info: ProvenanceInfo) {
    *GLOBAL.write() = Some(info);
}

fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            ',' => result.push_str("\\,"),
            '=' => result.push_str("\\="),
            _ => result.push(c),
        }
    }
    result
}

fn unescape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('\\', Some(&next)) if matches!(next, '\\' | ',' | '=') => {
                result.push(next);
                chars.next();
            }
            _ => result.push(c),
        }
    }
    result
}

/// True if the byte at `i` is preceded by an even number of backslashes.
fn unescaped_at(bytes: &[u8], i: usize) -> bool {
    bytes[..i].iter().rev().take_while(|&&b| b == b'\\').count() % 2 == 0
}

fn find_unescaped(s: &str, ch: u8) -> Option<usize> {
    let bytes = s.as_bytes();
    (0..bytes.len()).find(|&i| bytes[i] == ch && unescaped_at(bytes, i))
}

fn split_unescaped(s: &str, sep: u8) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    for i in 0..bytes.len() {
        if bytes[i] == sep && unescaped_at(bytes, i) {
            parts.push(&s[start..i]);
            start = i + 1;
        }
    }
    if start < s.len() {
        parts.push(&s[start..]);
    }
    parts
}
