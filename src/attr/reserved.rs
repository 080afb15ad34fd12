//! Virtual attributes of the root group.
//!
//! These names are answered from dataset state on every read and can never
//! be written, renamed or deleted through the attribute API.

use tracing::trace;

use super::{AttrData, AttrValue, Container};
use crate::catalog::{Dataset, ROOT_GROUP};
use crate::util::{Error, NcType, Result};

/// Library provenance, as text.
pub const NC_PROPERTIES_ATT: &str = "_NCProperties";
/// 1 if the dataset uses the extended data model.
pub const IS_NETCDF4_ATT: &str = "_IsNetcdf4";
/// Superblock version of the backing file.
pub const SUPERBLOCK_VERSION_ATT: &str = "_SuperblockVersion";

pub const RESERVED_NAMES: [&str; 3] = [NC_PROPERTIES_ATT, IS_NETCDF4_ATT, SUPERBLOCK_VERSION_ATT];

/// True if `name` is reserved in `container`. Only root-group global
/// attributes are affected.
pub fn is_reserved(container: Container, name: &str) -> bool {
    container == Container::Group(ROOT_GROUP) && RESERVED_NAMES.contains(&name)
}

/// Encode one integer as `t`.
fn int_as(value: i64, t: NcType) -> Result<Vec<u8>> {
    let bytes = match t {
        NcType::Byte => (value as i8).to_ne_bytes().to_vec(),
        NcType::UByte => (value as u8).to_ne_bytes().to_vec(),
        NcType::Short => (value as i16).to_ne_bytes().to_vec(),
        NcType::UShort => (value as u16).to_ne_bytes().to_vec(),
        NcType::Int => (value as i32).to_ne_bytes().to_vec(),
        NcType::UInt => (value as u32).to_ne_bytes().to_vec(),
        NcType::Int64 => value.to_ne_bytes().to_vec(),
        NcType::UInt64 => (value as u64).to_ne_bytes().to_vec(),
        NcType::Char => {
            return Err(Error::CharTypeMismatch {
                stored: NcType::Int,
                requested: t,
            })
        }
        // Integer flags only; a floating read is a type error rather than a
        // range error since no value is ever out of range.
        other => return Err(Error::BadType(format!("{other} for an integer attribute"))),
    };
    Ok(bytes)
}

impl Dataset {
    /// Synthesize a reserved attribute.
    pub(crate) fn get_reserved_att(&self, name: &str, requested: Option<NcType>) -> Result<AttrValue> {
        trace!(name, ?requested, "reserved attribute");
        match name {
            NC_PROPERTIES_ATT => {
                let provenance = self.provenance();
                if provenance.version == 0 {
                    return Err(Error::NotFound(name.to_string()));
                }
                let mem = requested.unwrap_or(NcType::Char);
                if mem != NcType::Char {
                    return Err(Error::CharTypeMismatch {
                        stored: NcType::Char,
                        requested: mem,
                    });
                }
                let text = provenance.serialize();
                Ok(AttrValue {
                    xtype: NcType::Char,
                    len: text.len(),
                    mem_type: NcType::Char,
                    data: AttrData::text(&text),
                    range_warning: None,
                })
            }
            IS_NETCDF4_ATT | SUPERBLOCK_VERSION_ATT => {
                let value = if name == IS_NETCDF4_ATT {
                    i64::from(self.is_netcdf4())
                } else {
                    i64::from(self.superblock_version())
                };
                let mem = requested.unwrap_or(NcType::Int);
                Ok(AttrValue {
                    xtype: NcType::Int,
                    len: 1,
                    mem_type: mem,
                    data: AttrData::Raw(int_as(value, mem)?),
                    range_warning: None,
                })
            }
            other => Err(Error::NotFound(other.to_string())),
        }
    }
}
