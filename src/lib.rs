//! # nc4meta
//!
//! In-memory metadata catalog for netCDF-4 style datasets: groups,
//! dimensions, variables, user-defined types and, above all, attributes.
//!
//! Objects of each kind live in a [`ListIndex`](index::ListIndex), which
//! keeps declaration order and answers name lookups through an
//! open-addressing hash table. Attributes carry typed payloads that are
//! converted between numeric types on read and write, with out-of-range
//! values reported as a [`RangeWarning`](util::RangeWarning) instead of an
//! error.
//!
//! ## Modules
//!
//! - [`util`] - Type tags, errors, logging setup
//! - [`index`] - Ordered name indexes (vector + hash table)
//! - [`core`] - Collaborator traits, type conversion, provenance, fill values
//! - [`attr`] - Attribute records and the attribute operations
//! - [`catalog`] - The [`Dataset`](catalog::Dataset) and its groups, dimensions, variables and types
//!
//! ## Example
//!
//! ```ignore
//! use nc4meta::prelude::*;
//!
//! let mut ds = Dataset::create("obs.nc", DatasetOptions::default());
//! let global = Container::Group(ROOT_GROUP);
//! ds.put_att_text(global, "title", "surface observations")?;
//! ds.put_att_values(global, "version", NcType::Int, &[3i32])?;
//!
//! let (v, warning) = ds.get_att_values::<i8>(global, "version")?;
//! assert!(warning.is_none());
//! ```

pub mod util;
pub mod index;
pub mod core;
pub mod attr;
pub mod catalog;

// Re-export commonly used types
pub use util::{Error, NcType, RangeWarning, Result};
pub use catalog::{Dataset, DatasetOptions};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, NcPod, NcType, RangeWarning, Result, TypeClass, TypeInfo};
    pub use crate::attr::{AttrData, AttrValue, Container, PutOutcome, Vlen};
    pub use crate::catalog::{Dataset, DatasetOptions, ROOT_GROUP};
    pub use crate::core::{Backend, DefineMode, NameValidator, TypeOracle};
}
