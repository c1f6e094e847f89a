//! Tagged-value ("variant") codec.
//!
//! Every property value on the wire is a variant: a 16-bit type tag, two
//! reserved bytes, then type-specific data. The type system is closed (a
//! fixed set of scalar codes plus two distinguished wrapper bits for vectors
//! and safe arrays), so it is modeled as exhaustive enums rather than
//! open-ended runtime dispatch.
//!
//! # Example
//!
//! ```
//! use wsp_client::codec::{Value, Variant, VType};
//!
//! let v = Variant::Scalar(Value::I4(7));
//! let bytes = v.encode().unwrap();
//! assert_eq!(&bytes[0..2], &(VType::I4.code()).to_le_bytes());
//! assert_eq!(&bytes[4..8], &7i32.to_le_bytes());
//! ```

use serde::Deserialize;
use uuid::Uuid;

use super::writer::MessageWriter;
use crate::error::{Result, WspError};

/// Wrapper bit marking a vector of the base type.
pub const VT_VECTOR: u16 = 0x1000;

/// Wrapper bit marking a safe array of the base type.
/// Mutually exclusive with [`VT_VECTOR`].
pub const VT_ARRAY: u16 = 0x2000;

/// Addressing mode negotiated for the session; fixed per deployment.
///
/// Only the size of a nested variant depends on it: 24 bytes under 64-bit
/// addressing, 16 under 32-bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressingMode {
    Bits32,
    Bits64,
}

impl Default for AddressingMode {
    fn default() -> Self {
        AddressingMode::Bits64
    }
}

/// Closed enumeration of base variant type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum VType {
    Empty = 0x0000,
    Null = 0x0001,
    I2 = 0x0002,
    I4 = 0x0003,
    R4 = 0x0004,
    R8 = 0x0005,
    Cy = 0x0006,
    Date = 0x0007,
    Bstr = 0x0008,
    Error = 0x000A,
    Bool = 0x000B,
    Variant = 0x000C,
    Decimal = 0x000E,
    I1 = 0x0010,
    Ui1 = 0x0011,
    Ui2 = 0x0012,
    Ui4 = 0x0013,
    I8 = 0x0014,
    Ui8 = 0x0015,
    Int = 0x0016,
    Uint = 0x0017,
    Lpwstr = 0x001F,
    Filetime = 0x0040,
    Clsid = 0x0048,
}

impl VType {
    /// The raw 16-bit type code.
    #[inline]
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Look up a base type code, rejecting anything outside the closed set.
    pub fn from_code(code: u16) -> Result<Self> {
        let ty = match code {
            0x0000 => VType::Empty,
            0x0001 => VType::Null,
            0x0002 => VType::I2,
            0x0003 => VType::I4,
            0x0004 => VType::R4,
            0x0005 => VType::R8,
            0x0006 => VType::Cy,
            0x0007 => VType::Date,
            0x0008 => VType::Bstr,
            0x000A => VType::Error,
            0x000B => VType::Bool,
            0x000C => VType::Variant,
            0x000E => VType::Decimal,
            0x0010 => VType::I1,
            0x0011 => VType::Ui1,
            0x0012 => VType::Ui2,
            0x0013 => VType::Ui4,
            0x0014 => VType::I8,
            0x0015 => VType::Ui8,
            0x0016 => VType::Int,
            0x0017 => VType::Uint,
            0x001F => VType::Lpwstr,
            0x0040 => VType::Filetime,
            0x0048 => VType::Clsid,
            other => return Err(WspError::UnsupportedType(other)),
        };
        Ok(ty)
    }

    /// Storage size in bytes of a value of this type, as used for column
    /// binding value sizes. Variable-length types (strings) report 0.
    ///
    /// CLSID reports 8 to match the original protocol size table, even
    /// though a GUID occupies 16 bytes on the wire.
    pub fn size(self, mode: AddressingMode) -> u16 {
        match self {
            VType::Empty | VType::Null | VType::Bstr | VType::Lpwstr => 0,
            VType::I1 | VType::Ui1 => 1,
            VType::I2 | VType::Ui2 | VType::Bool => 2,
            VType::I4 | VType::Ui4 | VType::Int | VType::Uint | VType::Error | VType::R4 => 4,
            VType::I8
            | VType::Ui8
            | VType::Cy
            | VType::R8
            | VType::Date
            | VType::Clsid
            | VType::Filetime => 8,
            VType::Decimal => 12,
            VType::Variant => match mode {
                AddressingMode::Bits64 => 24,
                AddressingMode::Bits32 => 16,
            },
        }
    }
}

/// 12-byte decimal storage value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decimal {
    pub hi32: u32,
    pub lo64: u64,
}

/// A single typed scalar value. The Rust payload carries the data, so a
/// scalar can never disagree with its type tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Empty,
    Null,
    I1(i8),
    Ui1(u8),
    I2(i16),
    Ui2(u16),
    I4(i32),
    Ui4(u32),
    Int(i32),
    Uint(u32),
    I8(i64),
    Ui8(u64),
    R4(f32),
    R8(f64),
    Bool(bool),
    ErrorCode(u32),
    Cy(i64),
    Date(f64),
    Filetime(u64),
    Decimal(Decimal),
    Bstr(String),
    Lpwstr(String),
    Clsid(Uuid),
}

impl Value {
    /// The base type code for this value.
    pub fn vtype(&self) -> VType {
        match self {
            Value::Empty => VType::Empty,
            Value::Null => VType::Null,
            Value::I1(_) => VType::I1,
            Value::Ui1(_) => VType::Ui1,
            Value::I2(_) => VType::I2,
            Value::Ui2(_) => VType::Ui2,
            Value::I4(_) => VType::I4,
            Value::Ui4(_) => VType::Ui4,
            Value::Int(_) => VType::Int,
            Value::Uint(_) => VType::Uint,
            Value::I8(_) => VType::I8,
            Value::Ui8(_) => VType::Ui8,
            Value::R4(_) => VType::R4,
            Value::R8(_) => VType::R8,
            Value::Bool(_) => VType::Bool,
            Value::ErrorCode(_) => VType::Error,
            Value::Cy(_) => VType::Cy,
            Value::Date(_) => VType::Date,
            Value::Filetime(_) => VType::Filetime,
            Value::Decimal(_) => VType::Decimal,
            Value::Bstr(_) => VType::Bstr,
            Value::Lpwstr(_) => VType::Lpwstr,
            Value::Clsid(_) => VType::Clsid,
        }
    }

    /// Write the data portion (no tag header).
    fn encode_data(&self, w: &mut MessageWriter) {
        match self {
            Value::Empty | Value::Null => {}
            Value::I1(v) => w.put_u8(*v as u8),
            Value::Ui1(v) => w.put_u8(*v),
            Value::I2(v) => w.put_u16(*v as u16),
            Value::Ui2(v) => w.put_u16(*v),
            Value::I4(v) | Value::Int(v) => w.put_i32(*v),
            Value::Ui4(v) | Value::Uint(v) | Value::ErrorCode(v) => w.put_u32(*v),
            Value::I8(v) | Value::Cy(v) => w.put_i64(*v),
            Value::Ui8(v) | Value::Filetime(v) => w.put_u64(*v),
            Value::R4(v) => w.put_f32(*v),
            Value::R8(v) | Value::Date(v) => w.put_f64(*v),
            // VARIANT_BOOL: all bits set for true.
            Value::Bool(v) => w.put_u16(if *v { 0xFFFF } else { 0x0000 }),
            Value::Decimal(d) => {
                w.put_u32(d.hi32);
                w.put_u64(d.lo64);
            }
            // Counted string: character count including the terminator,
            // then null-terminated UTF-16LE code units.
            Value::Lpwstr(s) => {
                let cc = s.encode_utf16().count() as u32 + 1;
                w.put_u32(cc);
                w.put_unicode_z(s);
            }
            // BSTR: byte length, then UTF-16LE code units.
            Value::Bstr(s) => {
                let cb = s.encode_utf16().count() as u32 * 2;
                w.put_u32(cb);
                w.put_unicode(s);
            }
            Value::Clsid(g) => w.put_guid(g),
        }
    }

    /// Byte length of the data portion as encoded.
    fn encoded_data_len(&self) -> usize {
        let mut w = MessageWriter::new();
        self.encode_data(&mut w);
        w.len()
    }
}

/// Base types allowed as vector elements. The original builder only ever
/// produces I4 and LPWSTR vectors.
fn vector_element_supported(ty: VType) -> bool {
    matches!(ty, VType::I4 | VType::Lpwstr)
}

/// Base types allowed as safe-array elements.
fn array_element_supported(ty: VType) -> bool {
    matches!(ty, VType::I4 | VType::Bstr)
}

/// A tagged wire value: scalar, vector, or self-describing safe array.
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    Scalar(Value),
    Vector {
        ty: VType,
        elems: Vec<Value>,
    },
    Array {
        ty: VType,
        features: u16,
        lower_bound: i32,
        elems: Vec<Value>,
    },
}

impl Variant {
    /// The full 16-bit tag, wrapper bit included.
    pub fn tag(&self) -> u16 {
        match self {
            Variant::Scalar(v) => v.vtype().code(),
            Variant::Vector { ty, .. } => ty.code() | VT_VECTOR,
            Variant::Array { ty, .. } => ty.code() | VT_ARRAY,
        }
    }

    /// Validate element/type agreement before any byte is written.
    fn validate(&self) -> Result<()> {
        match self {
            Variant::Scalar(_) => Ok(()),
            Variant::Vector { ty, elems } => {
                if !vector_element_supported(*ty) {
                    return Err(WspError::UnsupportedType(ty.code() | VT_VECTOR));
                }
                for e in elems {
                    if e.vtype() != *ty {
                        return Err(WspError::Build(format!(
                            "vector of {:?} contains a {:?} element",
                            ty,
                            e.vtype()
                        )));
                    }
                }
                Ok(())
            }
            Variant::Array { ty, elems, .. } => {
                if !array_element_supported(*ty) {
                    return Err(WspError::UnsupportedType(ty.code() | VT_ARRAY));
                }
                for e in elems {
                    if e.vtype() != *ty {
                        return Err(WspError::Build(format!(
                            "safe array of {:?} contains a {:?} element",
                            ty,
                            e.vtype()
                        )));
                    }
                }
                Ok(())
            }
        }
    }

    /// Encode the full wire form into `w`: tag, two reserved bytes, data.
    ///
    /// Fails before writing anything, so no partial bytes ever land in the
    /// output on error.
    pub fn encode_into(&self, w: &mut MessageWriter) -> Result<()> {
        self.validate()?;
        w.put_u16(self.tag());
        w.put_u8(0);
        w.put_u8(0);
        match self {
            Variant::Scalar(v) => v.encode_data(w),
            Variant::Vector { elems, .. } => {
                w.put_u32(elems.len() as u32);
                for e in elems {
                    e.encode_data(w);
                }
            }
            Variant::Array {
                ty,
                features,
                lower_bound,
                elems,
            } => {
                // Single-dimension safe array: cDims, fFeatures, cbElements,
                // then the (count, lower bound) pair and the element data.
                // A zero-element array still emits the full structure.
                w.put_u16(1);
                w.put_u16(*features);
                let cb_elements = match elems.first() {
                    Some(e) => e.encoded_data_len() as u32,
                    None => u32::from(ty.size(AddressingMode::Bits64)),
                };
                w.put_u32(cb_elements);
                w.put_u32(elems.len() as u32);
                w.put_i32(*lower_bound);
                for e in elems {
                    e.encode_data(w);
                }
            }
        }
        Ok(())
    }

    /// Encode into a fresh buffer. Convenience for tests and callers that
    /// need standalone bytes rather than an in-place write.
    pub fn encode(&self) -> Result<bytes::Bytes> {
        let mut w = MessageWriter::new();
        self.encode_into(&mut w)?;
        Ok(w.into_bytes())
    }
}
