//! Collaborator interfaces.
//!
//! The catalog owns names, ids and attribute payloads. Persistence, name
//! rules, definition-mode state and the type catalog belong to the
//! surrounding session and are reached through these traits.

use crate::attr::{AttributeRecord, Container};
use crate::util::{NcType, Result, TypeInfo};

// ============================================================================
// Persistence
// ============================================================================

/// Object-storage backend that persists attributes.
pub trait Backend: Send {
    /// Write a dirty record. The catalog marks it committed on success.
    fn flush(&mut self, record: &AttributeRecord) -> Result<()>;

    /// Delete a previously persisted attribute.
    fn remove_from_store(&mut self, container: Container, name: &str) -> Result<()>;
}

// ============================================================================
// Names
// ============================================================================

/// Checks a raw name and returns its canonical form.
pub trait NameValidator: Send + Sync {
    fn normalize(&self, raw: &str) -> Result<String>;
}

// ============================================================================
// Definition mode
// ============================================================================

/// Document-wide definition-mode state.
pub trait DefineMode: Send {
    fn in_define_mode(&self) -> bool;

    /// Enter definition mode. Entering while already inside is a no-op.
    fn enter_define_mode(&mut self) -> Result<()>;

    /// Leave definition mode.
    fn leave_define_mode(&mut self) -> Result<()>;
}

// ============================================================================
// Types
// ============================================================================

/// Resolves a type tag to its memory size and class.
pub trait TypeOracle {
    fn type_info(&self, t: NcType) -> Result<TypeInfo>;

    /// Memory size of one element of `t`.
    fn type_size(&self, t: NcType) -> Result<usize> {
        self.type_info(t).map(|info| info.size)
    }
}
