//! Type tags - the atomic types plus handles to user-defined types.

use bytemuck::Pod;
use std::fmt;

/// First id handed out to a user-defined type.
pub const FIRST_USER_TYPE_ID: u32 = 32;

/// Type of an attribute or variable as stored in the file.
///
/// The atomic variants carry the classic numbering (`byte` = 1 through
/// `string` = 12). User-defined types are referenced by their global id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NcType {
    /// Signed 8-bit integer
    Byte,
    /// 8-bit character (text)
    Char,
    /// Signed 16-bit integer
    Short,
    /// Signed 32-bit integer
    Int,
    /// 32-bit floating point
    Float,
    /// 64-bit floating point
    Double,
    /// Unsigned 8-bit integer
    UByte,
    /// Unsigned 16-bit integer
    UShort,
    /// Unsigned 32-bit integer
    UInt,
    /// Signed 64-bit integer
    Int64,
    /// Unsigned 64-bit integer
    UInt64,
    /// Variable-length string
    String,
    /// User-defined type (opaque, compound, enum or vlen)
    User(u32),
}

impl NcType {
    /// All atomic types in id order.
    pub const ATOMIC: [NcType; 12] = [
        Self::Byte,
        Self::Char,
        Self::Short,
        Self::Int,
        Self::Float,
        Self::Double,
        Self::UByte,
        Self::UShort,
        Self::UInt,
        Self::Int64,
        Self::UInt64,
        Self::String,
    ];

    /// Numeric type id.
    pub const fn id(self) -> u32 {
        match self {
            Self::Byte => 1,
            Self::Char => 2,
            Self::Short => 3,
            Self::Int => 4,
            Self::Float => 5,
            Self::Double => 6,
            Self::UByte => 7,
            Self::UShort => 8,
            Self::UInt => 9,
            Self::Int64 => 10,
            Self::UInt64 => 11,
            Self::String => 12,
            Self::User(id) => id,
        }
    }

    /// Convert from a numeric type id. Ids 0 and 13..32 name no type.
    pub const fn from_id(id: u32) -> Option<Self> {
        match id {
            1 => Some(Self::Byte),
            2 => Some(Self::Char),
            3 => Some(Self::Short),
            4 => Some(Self::Int),
            5 => Some(Self::Float),
            6 => Some(Self::Double),
            7 => Some(Self::UByte),
            8 => Some(Self::UShort),
            9 => Some(Self::UInt),
            10 => Some(Self::Int64),
            11 => Some(Self::UInt64),
            12 => Some(Self::String),
            id if id >= FIRST_USER_TYPE_ID => Some(Self::User(id)),
            _ => None,
        }
    }

    /// CDL name of the type.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Float => "float",
            Self::Double => "double",
            Self::UByte => "ubyte",
            Self::UShort => "ushort",
            Self::UInt => "uint",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::String => "string",
            Self::User(_) => "user",
        }
    }

    /// In-memory size of one element of an atomic type.
    ///
    /// Strings are held as one handle per element.
    pub const fn atomic_size(self) -> Option<usize> {
        match self {
            Self::Byte | Self::Char | Self::UByte => Some(1),
            Self::Short | Self::UShort => Some(2),
            Self::Int | Self::UInt | Self::Float => Some(4),
            Self::Double | Self::Int64 | Self::UInt64 => Some(8),
            Self::String => Some(std::mem::size_of::<usize>()),
            Self::User(_) => None,
        }
    }

    /// Type information for atomic types; `None` for user types.
    pub const fn atomic_info(self) -> Option<TypeInfo> {
        let class = match self {
            Self::Char => TypeClass::Character,
            Self::String => TypeClass::String,
            Self::User(_) => return None,
            _ => TypeClass::Numeric,
        };
        match self.atomic_size() {
            Some(size) => Some(TypeInfo { size, class, base: None }),
            None => None,
        }
    }

    #[inline]
    pub const fn is_atomic(self) -> bool {
        !matches!(self, Self::User(_))
    }

    /// Types of the classic format (`byte` through `double`).
    #[inline]
    pub const fn is_classic(self) -> bool {
        matches!(
            self,
            Self::Byte | Self::Char | Self::Short | Self::Int | Self::Float | Self::Double
        )
    }

    #[inline]
    pub const fn is_char(self) -> bool {
        matches!(self, Self::Char)
    }

    #[inline]
    pub const fn is_string(self) -> bool {
        matches!(self, Self::String)
    }

    /// Signed or unsigned 8-bit integer.
    #[inline]
    pub const fn is_byte_sized_int(self) -> bool {
        matches!(self, Self::Byte | Self::UByte)
    }
}

impl fmt::Display for NcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user type {id}"),
            other => f.write_str(other.name()),
        }
    }
}

/// Class of a type as reported by the type oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeClass {
    Numeric,
    Character,
    String,
    VariableLength,
    Opaque,
    Compound,
    Enum,
}

impl TypeClass {
    /// Classes whose values are copied byte for byte, never converted.
    #[inline]
    pub const fn is_raw(self) -> bool {
        matches!(self, Self::Opaque | Self::Compound | Self::Enum)
    }
}

/// Memory size and class of a type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeInfo {
    /// Bytes per element in memory.
    pub size: usize,
    pub class: TypeClass,
    /// Element type of a vlen, integer type of an enum.
    pub base: Option<NcType>,
}

// === Typed access ===

/// Rust types that map onto an atomic numeric type.
pub trait NcPod: Pod + Default {
    /// The corresponding atomic type.
    const NC_TYPE: NcType;
}

impl NcPod for i8 {
    const NC_TYPE: NcType = NcType::Byte;
}

impl NcPod for u8 {
    const NC_TYPE: NcType = NcType::UByte;
}

impl NcPod for i16 {
    const NC_TYPE: NcType = NcType::Short;
}

impl NcPod for u16 {
    const NC_TYPE: NcType = NcType::UShort;
}

impl NcPod for i32 {
    const NC_TYPE: NcType = NcType::Int;
}

impl NcPod for u32 {
    const NC_TYPE: NcType = NcType::UInt;
}

impl NcPod for i64 {
    const NC_TYPE: NcType = NcType::Int64;
}

impl NcPod for u64 {
    const NC_TYPE: NcType = NcType::UInt64;
}

impl NcPod for f32 {
    const NC_TYPE: NcType = NcType::Float;
}

impl NcPod for f64 {
    const NC_TYPE: NcType = NcType::Double;
}
