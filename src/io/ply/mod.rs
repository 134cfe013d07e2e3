//! Reading PLY files (ASCII, binary little endian and binary big endian).
//!
//! Only the `vertex` element (`x`, `y` and `z` properties of any scalar type)
//! and the `face` element (a list property called `vertex_indices` or
//! `vertex_index`) are used. All other elements and properties are parsed
//! and skipped.

use std::{fmt, str::FromStr};

use smallvec::SmallVec;


mod read;

#[cfg(test)]
mod tests;


pub use self::read::{read, read_header};


/// The encoding of the body of a PLY file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    Ascii,
    BinaryBigEndian,
    BinaryLittleEndian,
}

/// The parsed header of a PLY file.
#[derive(Debug, Clone)]
pub struct Header {
    pub encoding: Encoding,
    pub comments: Vec<String>,
    pub elements: Vec<ElementDef>,
}

/// The header definition of one element group.
#[derive(Debug, Clone)]
pub struct ElementDef {
    pub name: String,

    /// Number of elements in this group.
    pub count: u64,

    /// Definitions for all properties of elements in this group.
    pub property_defs: Vec<PropertyDef>,
}

/// The header definition of one property of an element.
#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub ty: PropertyType,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Scalar(ScalarType),
    List {
        len_type: ScalarType,
        scalar_type: ScalarType,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Float,
    Double,
}

impl ScalarType {
    /// Returns `true` if and only if the type is one of `uchar`, `ushort` or
    /// `uint`.
    pub fn is_unsigned_integer(&self) -> bool {
        match self {
            ScalarType::UChar | ScalarType::UShort | ScalarType::UInt => true,
            _ => false,
        }
    }

    pub fn is_floating_point(&self) -> bool {
        *self == ScalarType::Float || *self == ScalarType::Double
    }
}

/// The error emitted when the `FromStr` implementation for `ScalarType` cannot
/// parse the given string.
#[derive(Debug)]
pub struct ScalarTypeParseError(String);

impl fmt::Display for ScalarTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\" is not a valid PLY scalar type", self.0)
    }
}

impl FromStr for ScalarType {
    type Err = ScalarTypeParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The alternative names like `float32` are used by some exporters.
        match s {
            "char" | "int8" => Ok(ScalarType::Char),
            "uchar" | "uint8" => Ok(ScalarType::UChar),
            "short" | "int16" => Ok(ScalarType::Short),
            "ushort" | "uint16" => Ok(ScalarType::UShort),
            "int" | "int32" => Ok(ScalarType::Int),
            "uint" | "uint32" => Ok(ScalarType::UInt),
            "float" | "float32" => Ok(ScalarType::Float),
            "double" | "float64" => Ok(ScalarType::Double),
            other => Err(ScalarTypeParseError(other.to_string())),
        }
    }
}

/// One property value of some PLY type.
///
/// The most common list, the three-tuple `vertex_indices`, fits inline.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Scalar(Scalar),
    List(SmallVec<[Scalar; 4]>),
}

/// One scalar value of some PLY type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Char(i8),
    UChar(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Float(f32),
    Double(f64),
}

impl Scalar {
    /// Returns the value as integer, or `None` if it does not have an
    /// integer type.
    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            Scalar::Char(v) => Some(v.into()),
            Scalar::UChar(v) => Some(v.into()),
            Scalar::Short(v) => Some(v.into()),
            Scalar::UShort(v) => Some(v.into()),
            Scalar::Int(v) => Some(v.into()),
            Scalar::UInt(v) => Some(v.into()),
            _ => None,
        }
    }

    /// Converts the value to `f64`, whatever its type.
    pub fn to_f64(&self) -> f64 {
        match *self {
            Scalar::Float(v) => v.into(),
            Scalar::Double(v) => v,
            // Every PLY integer fits into `f64` exactly.
            _ => self.as_integer().map(|i| i as f64).unwrap_or(f64::NAN),
        }
    }
}
