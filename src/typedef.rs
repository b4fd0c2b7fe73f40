//! This module contains the element types a label volume may be stored
//! with. Only `Uint32` is accepted by the remapper; the remaining types
//! exist so that volumes read from disk can be described, and rejected,
//! with precision.

use crate::error::{RemapError, Result};

/// Data type of the elements in a label volume.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum LabelType {
    /// unsigned char.
    Uint8,
    /// signed char.
    Int8,
    /// unsigned short.
    Uint16,
    /// signed short.
    Int16,
    /// unsigned int. The label type of the remapper.
    Uint32,
    /// signed int.
    Int32,
    /// unsigned long long.
    Uint64,
    /// signed long long.
    Int64,
    /// 32 bit float.
    Float32,
    /// 64 bit float = double.
    Float64,
}

impl LabelType {
    /// Retrieve the size of an element of this data type, in bytes.
    pub fn size_of(self) -> usize {
        use LabelType::*;
        match self {
            Int8 | Uint8 => 1,
            Int16 | Uint16 => 2,
            Int32 | Uint32 | Float32 => 4,
            Int64 | Uint64 | Float64 => 8,
        }
    }

    /// Obtain the data type from the value of a NRRD `type` field.
    /// All aliases admitted by the NRRD format are recognized.
    ///
    /// # Errors
    ///
    /// - `RemapError::UnsupportedField` if the name is not a known
    ///   NRRD type, or is one without a label representation (`block`).
    pub fn from_nrrd_name(name: &str) -> Result<Self> {
        use LabelType::*;
        let t = match name.trim() {
            "signed char" | "int8" | "int8_t" => Int8,
            "uchar" | "unsigned char" | "uint8" | "uint8_t" => Uint8,
            "short" | "short int" | "signed short" | "signed short int" | "int16"
            | "int16_t" => Int16,
            "ushort" | "unsigned short" | "unsigned short int" | "uint16" | "uint16_t" => Uint16,
            "int" | "signed int" | "int32" | "int32_t" => Int32,
            "uint" | "unsigned int" | "uint32" | "uint32_t" => Uint32,
            "longlong" | "long long" | "long long int" | "signed long long"
            | "signed long long int" | "int64" | "int64_t" => Int64,
            "ulonglong" | "unsigned long long" | "unsigned long long int" | "uint64"
            | "uint64_t" => Uint64,
            "float" => Float32,
            "double" => Float64,
            other => return Err(RemapError::UnsupportedField("type", other.to_string())),
        };
        Ok(t)
    }

    /// The canonical NRRD name of this data type.
    pub fn nrrd_name(self) -> &'static str {
        use LabelType::*;
        match self {
            Int8 => "int8",
            Uint8 => "uint8",
            Int16 => "int16",
            Uint16 => "uint16",
            Int32 => "int32",
            Uint32 => "uint32",
            Int64 => "int64",
            Uint64 => "uint64",
            Float32 => "float",
            Float64 => "double",
        }
    }
}
