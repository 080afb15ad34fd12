//! Attribute store.
//!
//! Attributes live in per-container [`ListIndex`](crate::index::ListIndex)es
//! owned by the [`Dataset`](crate::catalog::Dataset). The operations in
//! `store` are methods on the dataset; `reserved` serves the virtual
//! root-group attributes that are synthesized on read and never stored.

mod record;
mod reserved;
mod store;

pub use record::{AttrData, AttrState, AttrValue, AttributeRecord, Container, Payload, PutOutcome, Vlen};
pub use reserved::{
    is_reserved, IS_NETCDF4_ATT, NC_PROPERTIES_ATT, RESERVED_NAMES, SUPERBLOCK_VERSION_ATT,
};
pub use store::{FILL_VALUE_ATT, MAX_ATT_LEN};
