//! Default fill values of the atomic types.

use crate::util::NcType;

pub const FILL_BYTE: i8 = -127;
pub const FILL_CHAR: u8 = 0;
pub const FILL_SHORT: i16 = -32767;
pub const FILL_INT: i32 = -2147483647;
pub const FILL_FLOAT: f32 = 9.969_209_968_386_869e36;
pub const FILL_DOUBLE: f64 = 9.969_209_968_386_869e36;
pub const FILL_UBYTE: u8 = 255;
pub const FILL_USHORT: u16 = 65535;
pub const FILL_UINT: u32 = 4294967295;
pub const FILL_INT64: i64 = -9223372036854775806;
pub const FILL_UINT64: u64 = 18446744073709551614;
pub const FILL_STRING: &str = "";

/// Native-order bytes of the default fill for a numeric or character type.
///
/// `None` for strings and user types, which have no fixed-size default.
pub fn default_fill_bytes(t: NcType) -> Option<Vec<u8>> {
    let bytes = match t {
        NcType::Byte => FILL_BYTE.to_ne_bytes().to_vec(),
        NcType::Char => vec![FILL_CHAR],
        NcType::Short => FILL_SHORT.to_ne_bytes().to_vec(),
        NcType::Int => FILL_INT.to_ne_bytes().to_vec(),
        NcType::Float => FILL_FLOAT.to_ne_bytes().to_vec(),
        NcType::Double => FILL_DOUBLE.to_ne_bytes().to_vec(),
        NcType::UByte => vec![FILL_UBYTE],
        NcType::UShort => FILL_USHORT.to_ne_bytes().to_vec(),
        NcType::UInt => FILL_UINT.to_ne_bytes().to_vec(),
        NcType::Int64 => FILL_INT64.to_ne_bytes().to_vec(),
        NcType::UInt64 => FILL_UINT64.to_ne_bytes().to_vec(),
        NcType::String | NcType::User(_) => return None,
    };
    Some(bytes)
}
