//! Element-wise conversion between atomic numeric types.
//!
//! Buffers hold values in native byte order, packed at the element size of
//! their type. Characters convert as unsigned bytes. Values that do not fit
//! the destination are still written (integer sources wrap, floating
//! sources saturate) and counted in a [`RangeWarning`].

use byteorder::{ByteOrder, NativeEndian};
use tracing::trace;

use crate::util::{Error, NcType, RangeWarning, Result};

/// A decoded element, wide enough for every atomic numeric type.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Number {
    Signed(i64),
    Unsigned(u64),
    Real(f64),
}

/// Output of a conversion.
#[derive(Clone, Debug, PartialEq)]
pub struct Converted {
    pub data: Vec<u8>,
    pub range_warning: Option<RangeWarning>,
}

/// True if `stored` read as `requested` is a plain byte copy: a character
/// request against 8-bit integer storage.
#[inline]
pub fn is_char_alias(stored: NcType, requested: NcType) -> bool {
    requested == NcType::Char && stored.is_byte_sized_int()
}

/// True for conversions whose range errors the strict model ignores.
#[inline]
pub fn is_byte_pair(a: NcType, b: NcType) -> bool {
    a.is_byte_sized_int() && b.is_byte_sized_int()
}

fn element_size(t: NcType) -> Result<usize> {
    match t {
        NcType::String | NcType::User(_) => Err(Error::BadType(format!("cannot convert {t}"))),
        other => other
            .atomic_size()
            .ok_or_else(|| Error::BadType(format!("cannot convert {other}"))),
    }
}

/// Convert `len` elements of `src_type` in `src` to `dst_type`.
///
/// In the strict model, out-of-range values between `byte` and `ubyte`
/// are not reported.
pub fn convert(src: &[u8], src_type: NcType, dst_type: NcType, len: usize, strict: bool) -> Result<Converted> {
    let src_size = element_size(src_type)?;
    let dst_size = element_size(dst_type)?;
    let needed = src_size
        .checked_mul(len)
        .ok_or_else(|| Error::invalid("element count overflows"))?;
    if src.len() < needed {
        return Err(Error::invalid(format!(
            "{len} {src_type} values need {needed} bytes, got {}",
            src.len()
        )));
    }

    let out_len = dst_size
        .checked_mul(len)
        .ok_or_else(|| Error::invalid("element count overflows"))?;
    let mut data = Vec::new();
    data.try_reserve_exact(out_len)
        .map_err(|_| Error::OutOfMemory(out_len))?;
    data.resize(out_len, 0);

    let quiet = strict && is_byte_pair(src_type, dst_type);
    let mut bad = 0usize;
    for (from, to) in src[..needed]
        .chunks_exact(src_size)
        .zip(data.chunks_exact_mut(dst_size))
    {
        let value = read(from, src_type);
        if !write(to, dst_type, value) && !quiet {
            bad += 1;
        }
    }

    if bad > 0 {
        trace!(%src_type, %dst_type, len, bad, "conversion out of range");
    }
    Ok(Converted {
        data,
        range_warning: (bad > 0).then_some(RangeWarning { count: bad }),
    })
}

fn read(buf: &[u8], t: NcType) -> Number {
    match t {
        NcType::Byte => Number::Signed(buf[0] as i8 as i64),
        NcType::UByte | NcType::Char => Number::Unsigned(buf[0] as u64),
        NcType::Short => Number::Signed(NativeEndian::read_i16(buf) as i64),
        NcType::UShort => Number::Unsigned(NativeEndian::read_u16(buf) as u64),
        NcType::Int => Number::Signed(NativeEndian::read_i32(buf) as i64),
        NcType::UInt => Number::Unsigned(NativeEndian::read_u32(buf) as u64),
        NcType::Int64 => Number::Signed(NativeEndian::read_i64(buf)),
        NcType::UInt64 => Number::Unsigned(NativeEndian::read_u64(buf)),
        NcType::Float => Number::Real(NativeEndian::read_f32(buf) as f64),
        NcType::Double => Number::Real(NativeEndian::read_f64(buf)),
        // Rejected by element_size before any element is read.
        NcType::String | NcType::User(_) => Number::Unsigned(0),
    }
}

/// Narrow `$n` into `$t`; yields (value, fits).
macro_rules! narrow {
    ($n:expr, $t:ty) => {
        match $n {
            Number::Signed(v) => (
                v as $t,
                (<$t>::MIN as i128) <= v as i128 && v as i128 <= <$t>::MAX as i128,
            ),
            Number::Unsigned(v) => (v as $t, (v as u128) <= <$t>::MAX as u128),
            // MAX rounds up to a power of two for 64-bit targets, so the
            // upper bound is exclusive and built from MAX / 2 + 1.
            Number::Real(f) => (
                f as $t,
                f >= <$t>::MIN as f64 && f < 2.0 * ((<$t>::MAX / 2 + 1) as f64),
            ),
        }
    };
}

/// Encode `value` as `t` into `out`; false if it did not fit.
fn write(out: &mut [u8], t: NcType, value: Number) -> bool {
    match t {
        NcType::Byte => {
            let (v, ok) = narrow!(value, i8);
            out[0] = v as u8;
            ok
        }
        NcType::UByte | NcType::Char => {
            let (v, ok) = narrow!(value, u8);
            out[0] = v;
            ok
        }
        NcType::Short => {
            let (v, ok) = narrow!(value, i16);
            NativeEndian::write_i16(out, v);
            ok
        }
        NcType::UShort => {
            let (v, ok) = narrow!(value, u16);
            NativeEndian::write_u16(out, v);
            ok
        }
        NcType::Int => {
            let (v, ok) = narrow!(value, i32);
            NativeEndian::write_i32(out, v);
            ok
        }
        NcType::UInt => {
            let (v, ok) = narrow!(value, u32);
            NativeEndian::write_u32(out, v);
            ok
        }
        NcType::Int64 => {
            let (v, ok) = narrow!(value, i64);
            NativeEndian::write_i64(out, v);
            ok
        }
        NcType::UInt64 => {
            let (v, ok) = narrow!(value, u64);
            NativeEndian::write_u64(out, v);
            ok
        }
        NcType::Float => {
            let (v, ok) = match value {
                Number::Signed(v) => (v as f32, true),
                Number::Unsigned(v) => (v as f32, true),
                Number::Real(f) => (f as f32, !(f > f32::MAX as f64 || f < f32::MIN as f64)),
            };
            NativeEndian::write_f32(out, v);
            ok
        }
        NcType::Double => {
            let v = match value {
                Number::Signed(v) => v as f64,
                Number::Unsigned(v) => v as f64,
                Number::Real(f) => f,
            };
            NativeEndian::write_f64(out, v);
            true
        }
        NcType::String | NcType::User(_) => false,
    }
}
