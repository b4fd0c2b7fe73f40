//! This module defines the label element API, which enables label volume
//! implementations to read, write and convert data elements.
use crate::typedef::LabelType;
use super::DynLabelVolume;
use byteordered::{ByteOrdered, Endian};
use ndarray::ArrayD;
use num_traits::AsPrimitive;
use std::fmt::{Debug, Display};
use std::io::{Read, Result as IoResult, Write};
use std::str::FromStr;

/// Trait type for characterizing a label volume element, implemented for
/// the primitive numeric types which a volume can be stored with.
pub trait LabelElement:
    'static + Sized + Copy + Debug + Display + FromStr + AsPrimitive<u32> + AsPrimitive<f32>
{
    /// The data type mapped to this type.
    const DATA_TYPE: LabelType;

    /// Read a single element from the given byte source.
    fn read_raw<R, E>(src: R, endianness: E) -> IoResult<Self>
    where
        R: Read,
        E: Endian;

    /// Write a single element to the given byte sink.
    fn write_raw<W, E>(self, dst: W, endianness: E) -> IoResult<()>
    where
        W: Write,
        E: Endian;

    /// Wrap an array of this type into a dynamically typed volume.
    fn into_dyn_volume(array: ArrayD<Self>) -> DynLabelVolume;
}

impl LabelElement for u8 {
    const DATA_TYPE: LabelType = LabelType::Uint8;
    fn read_raw<R, E>(src: R, _: E) -> IoResult<Self>
    where
        R: Read,
        E: Endian,
    {
        ByteOrdered::native(src).read_u8()
    }
    fn write_raw<W, E>(self, dst: W, _: E) -> IoResult<()>
    where
        W: Write,
        E: Endian,
    {
        ByteOrdered::native(dst).write_u8(self)
    }
    fn into_dyn_volume(array: ArrayD<Self>) -> DynLabelVolume {
        DynLabelVolume::Uint8(array)
    }
}

impl LabelElement for i8 {
    const DATA_TYPE: LabelType = LabelType::Int8;
    fn read_raw<R, E>(src: R, _: E) -> IoResult<Self>
    where
        R: Read,
        E: Endian,
    {
        ByteOrdered::native(src).read_i8()
    }
    fn write_raw<W, E>(self, dst: W, _: E) -> IoResult<()>
    where
        W: Write,
        E: Endian,
    {
        ByteOrdered::native(dst).write_i8(self)
    }
    fn into_dyn_volume(array: ArrayD<Self>) -> DynLabelVolume {
        DynLabelVolume::Int8(array)
    }
}

/// Implements `LabelElement` for the multi-byte primitives, whose byte
/// order is decided at run time.
macro_rules! impl_multi_byte_element {
    ($t:ty, $data_type:ident, $read:ident, $write:ident) => {
        impl LabelElement for $t {
            const DATA_TYPE: LabelType = LabelType::$data_type;
            fn read_raw<R, E>(src: R, e: E) -> IoResult<Self>
            where
                R: Read,
                E: Endian,
            {
                e.$read(src)
            }
            fn write_raw<W, E>(self, dst: W, e: E) -> IoResult<()>
            where
                W: Write,
                E: Endian,
            {
                e.$write(dst, self)
            }
            fn into_dyn_volume(array: ArrayD<Self>) -> DynLabelVolume {
                DynLabelVolume::$data_type(array)
            }
        }
    };
}

impl_multi_byte_element!(u16, Uint16, read_u16, write_u16);
impl_multi_byte_element!(i16, Int16, read_i16, write_i16);
impl_multi_byte_element!(u32, Uint32, read_u32, write_u32);
impl_multi_byte_element!(i32, Int32, read_i32, write_i32);
impl_multi_byte_element!(u64, Uint64, read_u64, write_u64);
impl_multi_byte_element!(i64, Int64, read_i64, write_i64);
impl_multi_byte_element!(f32, Float32, read_f32, write_f32);
impl_multi_byte_element!(f64, Float64, read_f64, write_f64);
