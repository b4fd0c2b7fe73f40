//! This module defines the label volume types. Statically typed volumes
//! are plain `ndarray` arrays; [`DynLabelVolume`] holds a volume whose
//! element type is only known at run time, such as one read from a file.
//!
//! [`DynLabelVolume`]: ./enum.DynLabelVolume.html

pub mod element;
pub(crate) mod util;

pub use self::element::LabelElement;

use crate::error::{RemapError, Result};
use crate::typedef::LabelType;
use ndarray::{Array, ArrayD, ArrayViewD, ErrorKind, IxDyn, ShapeBuilder, ShapeError};
use num_traits::AsPrimitive;

/// A label volume of any supported element type.
#[derive(Debug, Clone, PartialEq)]
pub enum DynLabelVolume {
    /// Volume of `u8` elements.
    Uint8(ArrayD<u8>),
    /// Volume of `i8` elements.
    Int8(ArrayD<i8>),
    /// Volume of `u16` elements.
    Uint16(ArrayD<u16>),
    /// Volume of `i16` elements.
    Int16(ArrayD<i16>),
    /// Volume of `u32` elements, the label type.
    Uint32(ArrayD<u32>),
    /// Volume of `i32` elements.
    Int32(ArrayD<i32>),
    /// Volume of `u64` elements.
    Uint64(ArrayD<u64>),
    /// Volume of `i64` elements.
    Int64(ArrayD<i64>),
    /// Volume of `f32` elements.
    Float32(ArrayD<f32>),
    /// Volume of `f64` elements.
    Float64(ArrayD<f64>),
}

macro_rules! dispatch {
    ($volume:expr, $a:ident => $e:expr) => {
        match $volume {
            DynLabelVolume::Uint8($a) => $e,
            DynLabelVolume::Int8($a) => $e,
            DynLabelVolume::Uint16($a) => $e,
            DynLabelVolume::Int16($a) => $e,
            DynLabelVolume::Uint32($a) => $e,
            DynLabelVolume::Int32($a) => $e,
            DynLabelVolume::Uint64($a) => $e,
            DynLabelVolume::Int64($a) => $e,
            DynLabelVolume::Float32($a) => $e,
            DynLabelVolume::Float64($a) => $e,
        }
    };
}

impl DynLabelVolume {
    /// Create a volume from a shape and its elements in standard (row
    /// major) order.
    ///
    /// # Errors
    ///
    /// - `RemapError::NotAVolume` if the number of elements does not match
    ///   the shape.
    ///
    /// # Example
    ///
    /// ```
    /// # use deepatlas::{DynLabelVolume, LabelType};
    /// let volume = DynLabelVolume::from_shape_vec(&[2, 2], vec![1u32, 2, 3, 4])?;
    /// assert_eq!(volume.data_type(), LabelType::Uint32);
    /// assert!(DynLabelVolume::from_shape_vec(&[2, 2], vec![1u32]).is_err());
    /// # Ok::<(), deepatlas::RemapError>(())
    /// ```
    pub fn from_shape_vec<T>(shape: &[usize], data: Vec<T>) -> Result<Self>
    where
        T: LabelElement,
    {
        check_element_count(shape, data.len())?;
        let array = Array::from_shape_vec(IxDyn(shape), data)?;
        Ok(T::into_dyn_volume(array))
    }

    /// Create a volume from a shape and its elements in column major
    /// order, fastest axis first, as stored by most volume file formats.
    ///
    /// # Errors
    ///
    /// - `RemapError::NotAVolume` if the number of elements does not match
    ///   the shape.
    pub fn from_shape_vec_f<T>(shape: &[usize], data: Vec<T>) -> Result<Self>
    where
        T: LabelElement,
    {
        check_element_count(shape, data.len())?;
        let array = Array::from_shape_vec(IxDyn(shape).f(), data)?;
        Ok(T::into_dyn_volume(array))
    }

    /// Get this volume's element type.
    pub fn data_type(&self) -> LabelType {
        match self {
            DynLabelVolume::Uint8(_) => LabelType::Uint8,
            DynLabelVolume::Int8(_) => LabelType::Int8,
            DynLabelVolume::Uint16(_) => LabelType::Uint16,
            DynLabelVolume::Int16(_) => LabelType::Int16,
            DynLabelVolume::Uint32(_) => LabelType::Uint32,
            DynLabelVolume::Int32(_) => LabelType::Int32,
            DynLabelVolume::Uint64(_) => LabelType::Uint64,
            DynLabelVolume::Int64(_) => LabelType::Int64,
            DynLabelVolume::Float32(_) => LabelType::Float32,
            DynLabelVolume::Float64(_) => LabelType::Float64,
        }
    }

    /// Get the shape of the volume.
    pub fn shape(&self) -> &[usize] {
        dispatch!(self, a => a.shape())
    }

    /// Get the total number of elements in the volume.
    pub fn len(&self) -> usize {
        dispatch!(self, a => a.len())
    }

    /// Whether the volume has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the volume as an array of labels.
    ///
    /// # Errors
    ///
    /// - `RemapError::UnsupportedDataType` if the elements are not `u32`.
    pub fn as_labels(&self) -> Result<ArrayViewD<'_, u32>> {
        match self {
            DynLabelVolume::Uint32(a) => Ok(a.view()),
            other => Err(RemapError::UnsupportedDataType(other.data_type())),
        }
    }

    /// Convert the volume into an array of labels. No conversion between
    /// element types is ever made.
    ///
    /// # Errors
    ///
    /// - `RemapError::UnsupportedDataType` if the elements are not `u32`.
    pub fn into_labels(self) -> Result<ArrayD<u32>> {
        match self {
            DynLabelVolume::Uint32(a) => Ok(a),
            other => Err(RemapError::UnsupportedDataType(other.data_type())),
        }
    }

    /// Cast every element to single precision, as expected by intensity
    /// based processing such as registration.
    pub fn to_float(&self) -> ArrayD<f32> {
        dispatch!(self, a => a.mapv(AsPrimitive::<f32>::as_))
    }
}

impl<T> From<ArrayD<T>> for DynLabelVolume
where
    T: LabelElement,
{
    fn from(array: ArrayD<T>) -> Self {
        T::into_dyn_volume(array)
    }
}

fn check_element_count(shape: &[usize], got: usize) -> Result<()> {
    let expected = shape
        .iter()
        .try_fold(1usize, |acc, &s| acc.checked_mul(s))
        .ok_or_else(|| ShapeError::from_kind(ErrorKind::Overflow))?;
    if expected != got {
        return Err(RemapError::NotAVolume(expected, got));
    }
    Ok(())
}
