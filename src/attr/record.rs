//! Attribute records and their payloads.

use std::fmt;

use crate::index::{Indexed, NcObject, Sort};
use crate::util::{Error, NcPod, NcType, RangeWarning, Result};

/// Owner of an attribute list: a group's global attributes or a variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Container {
    /// Global attributes of group `gid`.
    Group(usize),
    /// Attributes of variable `varid` in group `gid`.
    Var(usize, usize),
}

impl Container {
    /// Group owning the container.
    #[inline]
    pub const fn group(self) -> usize {
        match self {
            Self::Group(gid) | Self::Var(gid, _) => gid,
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(gid) => write!(f, "group {gid}"),
            Self::Var(gid, varid) => write!(f, "group {gid} variable {varid}"),
        }
    }
}

/// One element of a variable-length array: `len` base-type values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Vlen {
    pub len: usize,
    pub data: Vec<u8>,
}

impl Vlen {
    pub fn new(len: usize, data: Vec<u8>) -> Self {
        Self { len, data }
    }

    pub fn from_values<T: NcPod>(values: &[T]) -> Self {
        Self {
            len: values.len(),
            data: bytemuck::cast_slice(values).to_vec(),
        }
    }
}

/// Attribute values exchanged with callers.
///
/// Raw buffers hold packed native-order elements of the memory type.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrData {
    Raw(Vec<u8>),
    Strings(Vec<Option<String>>),
    VarLen(Vec<Vlen>),
}

impl AttrData {
    pub fn from_values<T: NcPod>(values: &[T]) -> Self {
        Self::Raw(bytemuck::cast_slice(values).to_vec())
    }

    pub fn text(text: &str) -> Self {
        Self::Raw(text.as_bytes().to_vec())
    }

    pub fn strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Strings(items.into_iter().map(|s| Some(s.into())).collect())
    }

    /// Reinterpret a raw buffer as values of `T`.
    ///
    /// Only the size is checked: the buffer carries no element type, so
    /// `None` means the data is not raw or its length is not a multiple of
    /// `T`. Use [`AttrValue::values`] for a type-checked read.
    pub fn to_values<T: NcPod>(&self) -> Option<Vec<T>> {
        match self {
            Self::Raw(bytes) if bytes.len() % std::mem::size_of::<T>() == 0 => {
                Some(bytemuck::pod_collect_to_vec(bytes))
            }
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_strings(&self) -> Option<&[Option<String>]> {
        match self {
            Self::Strings(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_vlens(&self) -> Option<&[Vlen]> {
        match self {
            Self::VarLen(items) => Some(items),
            _ => None,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Raw(_) => "raw bytes",
            Self::Strings(_) => "strings",
            Self::VarLen(_) => "vlen elements",
        }
    }
}

/// Payload owned by a record; exactly one representation per type class.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Payload {
    /// Zero-length attribute.
    #[default]
    None,
    /// Numeric, character, opaque, compound and enum values.
    RawBytes(Vec<u8>),
    StringArray(Vec<Option<String>>),
    VarLenArray(Vec<Vlen>),
}

impl Payload {
    /// Deep copy into caller-owned data.
    pub fn to_data(&self) -> Option<AttrData> {
        match self {
            Self::None => None,
            Self::RawBytes(bytes) => Some(AttrData::Raw(bytes.clone())),
            Self::StringArray(items) => Some(AttrData::Strings(items.clone())),
            Self::VarLenArray(items) => Some(AttrData::VarLen(items.clone())),
        }
    }
}

/// Persistence state of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttrState {
    /// Created or modified since the last flush.
    Uncommitted,
    /// Persisted and clean.
    Committed,
}

/// A named, typed attribute value in one container.
#[derive(Clone, Debug)]
pub struct AttributeRecord {
    hdr: NcObject,
    container: Container,
    xtype: NcType,
    len: usize,
    payload: Payload,
    dirty: bool,
    persisted: bool,
}

impl AttributeRecord {
    pub(crate) fn new(name: String, id: usize, container: Container) -> Self {
        Self {
            hdr: NcObject::new(Sort::Attribute, name, id),
            container,
            xtype: NcType::Char,
            len: 0,
            payload: Payload::None,
            dirty: true,
            persisted: false,
        }
    }

    #[inline]
    pub fn container(&self) -> Container {
        self.container
    }

    /// Type of the stored values.
    #[inline]
    pub fn xtype(&self) -> NcType {
        self.xtype
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    pub fn state(&self) -> AttrState {
        if self.dirty {
            AttrState::Uncommitted
        } else {
            AttrState::Committed
        }
    }

    /// Replace type, length and payload. The previous payload is dropped.
    pub(crate) fn store(&mut self, xtype: NcType, len: usize, payload: Payload) {
        self.xtype = xtype;
        self.len = len;
        self.payload = payload;
        self.dirty = true;
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn mark_committed(&mut self) {
        self.dirty = false;
        self.persisted = true;
    }

    /// Forget the persisted copy; the next flush creates it afresh.
    pub(crate) fn mark_unpersisted(&mut self) {
        self.persisted = false;
        self.dirty = true;
    }
}

impl Indexed for AttributeRecord {
    fn header(&self) -> &NcObject {
        &self.hdr
    }

    fn header_mut(&mut self) -> &mut NcObject {
        &mut self.hdr
    }
}

/// Result of reading an attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct AttrValue {
    /// Type of the attribute in the file.
    pub xtype: NcType,
    pub len: usize,
    /// Memory type of `data`: the requested type, or `xtype` when none was.
    pub mem_type: NcType,
    /// Values in `mem_type`.
    pub data: AttrData,
    /// Set when some values did not fit the requested type.
    pub range_warning: Option<RangeWarning>,
}

impl AttrValue {
    /// Values as `T`. Fails unless `T` matches the memory type; text may be
    /// read as bytes.
    pub fn values<T: NcPod>(&self) -> Result<Vec<T>> {
        let matches = T::NC_TYPE == self.mem_type
            || (self.mem_type == NcType::Char && T::NC_TYPE.is_byte_sized_int());
        if !matches {
            return Err(Error::BadType(format!("{} cannot be read as {}", self.mem_type, T::NC_TYPE)));
        }
        self.data
            .to_values()
            .ok_or_else(|| Error::BadType(format!("{} cannot be read as {}", self.data.kind(), T::NC_TYPE)))
    }
}

/// Result of writing an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PutOutcome {
    /// Id of the attribute within its container.
    pub id: usize,
    /// Set when some values did not fit the file type.
    pub range_warning: Option<RangeWarning>,
}
