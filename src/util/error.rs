//! Error types for the metadata catalog.

use thiserror::Error;

use super::NcType;

/// Main error type for catalog operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Name or position does not resolve to a live object
    #[error("Not found: {0}")]
    NotFound(String),

    /// Variable id is not defined in the group
    #[error("Variable not found: {0}")]
    NotVar(usize),

    /// Group id does not exist
    #[error("Group not found: {0}")]
    BadGroup(usize),

    /// Dimension id or name does not exist
    #[error("Dimension not found: {0}")]
    BadDim(String),

    /// Name is already used by a live object or a reserved attribute
    #[error("Name already in use: {0}")]
    NameInUse(String),

    /// Index insertion collided with a live name
    #[error("Name conflict in index: {0}")]
    NameConflict(String),

    /// Name rejected by the name validator
    #[error("Invalid name: {0:?}")]
    BadName(String),

    /// Name longer than the maximum name length
    #[error("Name exceeds {max} bytes: {len}")]
    MaxName { len: usize, max: usize },

    /// Type is unknown or cannot be used for the operation
    #[error("Bad type: {0}")]
    BadType(String),

    /// Attempt to convert between text and non-text types
    #[error("Cannot convert between {stored} and {requested}")]
    CharTypeMismatch { stored: NcType, requested: NcType },

    /// Operation requires definition mode
    #[error("Operation requires definition mode")]
    NotInDefineMode,

    /// Type is not allowed by the strict legacy model
    #[error("Type {0} is not allowed in the classic model")]
    StrictModeViolation(NcType),

    /// Fill value set after data was written to the variable
    #[error("Fill value of {0:?} cannot change after data was written")]
    LateFillValue(String),

    /// Attribute value rejected
    #[error("Bad value: {0}")]
    BadValue(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    Invalid(String),

    /// Allocation for an attribute payload failed
    #[error("Out of memory allocating {0} bytes")]
    OutOfMemory(usize),

    /// Dataset was opened read-only
    #[error("Dataset is read-only")]
    Permission,

    /// Operation is not permitted on this object
    #[error("Operation not allowed: {0}")]
    NotAllowed(String),

    /// Attribute has no numeric id (virtual attribute)
    #[error("Attribute {0:?} has no id")]
    AttMeta(String),

    /// Persistence collaborator failed
    #[error("Backend error: {0}")]
    Backend(String),

    /// Index invariant violated
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a backend error from a string.
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create an invalid argument error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Non-fatal conversion overflow.
///
/// Returned next to converted data; `count` elements did not fit the
/// destination type and hold the best-effort value.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeWarning {
    pub count: usize,
}
