//! Core layer - collaborator traits and value plumbing.
//!
//! This module provides:
//! - [`Backend`], [`NameValidator`], [`DefineMode`], [`TypeOracle`] - seams to the surrounding session
//! - [`convert`] - element-wise numeric conversion with range reporting
//! - [`ProvenanceInfo`] - library provenance record
//! - Default collaborators ([`NullBackend`], [`MemoryBackend`], [`ClassicNameValidator`], [`DefineFlag`])

mod traits;
mod convert;
mod define;
mod names;
mod backend;
mod provenance;
pub mod fill;

pub use traits::{Backend, DefineMode, NameValidator, TypeOracle};
pub use convert::{convert, is_byte_pair, is_char_alias, Converted};
pub use define::DefineFlag;
pub use names::{ClassicNameValidator, MAX_NAME};
pub use backend::{BackendLog, MemoryBackend, NullBackend};
pub use provenance::{global_provenance, set_global_provenance, ProvenanceInfo, PROVENANCE_VERSION};
