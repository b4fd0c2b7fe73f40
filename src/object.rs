//! Module for handling and retrieving complete NRRD label volumes, header
//! and data, from files or streams.

use crate::error::{RemapError, Result};
use crate::header::{Encoding, NrrdHeader};
use crate::typedef::LabelType;
use crate::volume::{DynLabelVolume, LabelElement};
use byteordered::Endianness;
use flate2::bufread::GzDecoder;
use log::debug;
use ndarray::ArrayD;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// A NRRD volume, along with its header, fully loaded in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct NrrdObject {
    header: NrrdHeader,
    volume: DynLabelVolume,
}

impl NrrdObject {
    /// Retrieve a NRRD object from a file in the file system. Only files
    /// with attached data are supported.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<NrrdObject> {
        let path = path.as_ref();
        debug!("reading NRRD file {}", path.display());
        let file = BufReader::new(File::open(path)?);
        NrrdObject::from_stream(file)
    }

    /// Retrieve a NRRD object from a stream of data, starting at the
    /// magic line.
    ///
    /// # Errors
    ///
    /// - Any header error, see `NrrdHeader::from_stream`.
    /// - `RemapError::IncompatibleLength` if the stream ends before all
    ///   elements are read.
    pub fn from_stream<R: BufRead>(mut source: R) -> Result<NrrdObject> {
        let header = NrrdHeader::from_stream(&mut source)?;
        let volume = match header.data_type {
            LabelType::Uint8 => read_volume::<u8, _>(&header, source)?,
            LabelType::Int8 => read_volume::<i8, _>(&header, source)?,
            LabelType::Uint16 => read_volume::<u16, _>(&header, source)?,
            LabelType::Int16 => read_volume::<i16, _>(&header, source)?,
            LabelType::Uint32 => read_volume::<u32, _>(&header, source)?,
            LabelType::Int32 => read_volume::<i32, _>(&header, source)?,
            LabelType::Uint64 => read_volume::<u64, _>(&header, source)?,
            LabelType::Int64 => read_volume::<i64, _>(&header, source)?,
            LabelType::Float32 => read_volume::<f32, _>(&header, source)?,
            LabelType::Float64 => read_volume::<f64, _>(&header, source)?,
        };
        debug!(
            "read {:?} volume of sizes {:?} ({:?} encoding)",
            header.data_type, header.sizes, header.encoding
        );

        Ok(NrrdObject { header, volume })
    }

    /// Retrieve the header of this object.
    pub fn header(&self) -> &NrrdHeader {
        &self.header
    }

    /// Retrieve the volume of this object.
    pub fn volume(&self) -> &DynLabelVolume {
        &self.volume
    }

    /// Consume the object, keeping only the volume.
    pub fn into_volume(self) -> DynLabelVolume {
        self.volume
    }

    /// Consume the object into its header and volume.
    pub fn into_parts(self) -> (NrrdHeader, DynLabelVolume) {
        (self.header, self.volume)
    }
}

/// Load a volume if the path exists.
///
/// # Errors
///
/// - `RemapError::MissingFile` when the path does not exist.
/// - Any error from reading the NRRD file.
pub fn check_and_load<P: AsRef<Path>>(path: P) -> Result<DynLabelVolume> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RemapError::MissingFile(path.to_path_buf()));
    }
    Ok(NrrdObject::from_file(path)?.into_volume())
}

/// Load a volume if the path exists, with its values converted to single
/// precision and rescaled to lie between 0 and 1. A constant volume is
/// loaded as all zeros.
///
/// # Errors
///
/// Same as `check_and_load`.
pub fn check_and_load_normalized<P: AsRef<Path>>(path: P) -> Result<ArrayD<f32>> {
    let mut volume = check_and_load(path)?.to_float();
    let (min, max) = volume
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if max > min {
        let range = max - min;
        volume.mapv_inplace(|v| (v - min) / range);
    } else {
        volume.fill(0.);
    }
    Ok(volume)
}

fn read_volume<T, R>(header: &NrrdHeader, source: R) -> Result<DynLabelVolume>
where
    T: LabelElement,
    R: BufRead,
{
    let count = header.element_count()?;
    let data: Vec<T> = match header.encoding {
        Encoding::Raw => read_raw(source, count, header.endianness)?,
        Encoding::Gzip => read_raw(GzDecoder::new(source), count, header.endianness)?,
        Encoding::Ascii => read_ascii(source, count)?,
    };
    DynLabelVolume::from_shape_vec_f(&header.sizes, data)
}

fn read_raw<T, R>(source: R, count: usize, endianness: Endianness) -> Result<Vec<T>>
where
    T: LabelElement,
    R: Read,
{
    let size = T::DATA_TYPE.size_of();
    let nbytes = count.checked_mul(size).ok_or_else(|| {
        RemapError::InvalidHeader(format!("{} elements are too many to read", count))
    })?;
    // grows with the data actually present, never with the claimed size
    let mut raw = Vec::new();
    let _ = source.take(nbytes as u64).read_to_end(&mut raw)?;
    if raw.len() < nbytes {
        return Err(RemapError::IncompatibleLength(count, raw.len() / size));
    }

    let mut cursor: &[u8] = &raw;
    (0..count)
        .map(|_| T::read_raw(&mut cursor, endianness).map_err(From::from))
        .collect()
}

fn read_ascii<T, R>(mut source: R, count: usize) -> Result<Vec<T>>
where
    T: LabelElement,
    R: Read,
{
    let mut text = String::new();
    let _ = source.read_to_string(&mut text)?;
    let data = text
        .split_whitespace()
        .take(count)
        .map(|token| {
            token.parse::<T>().map_err(|_| {
                RemapError::Io(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("`{}` is not a valid {:?} value", token, T::DATA_TYPE),
                ))
            })
        })
        .collect::<Result<Vec<T>>>()?;
    if data.len() < count {
        return Err(RemapError::IncompatibleLength(count, data.len()));
    }
    Ok(data)
}
