//! Utility types shared across the crate.
//!
//! - [`NcType`] / [`TypeInfo`] - type tags and their sizes
//! - [`Error`] / [`Result`] - error handling
//! - [`init_tracing`] / [`init_test_tracing`] - optional log subscriber

mod nc_type;
mod error;
mod logging;

pub use nc_type::*;
pub use error::*;
pub use logging::*;
