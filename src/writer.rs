//! Utility functions to write NRRD label volumes.

use crate::error::{RemapError, Result};
use crate::header::{format_vector, Encoding, NrrdHeader, MAGIC_LINE};
use crate::volume::LabelElement;
use byteordered::Endianness;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;
use ndarray::{ArrayBase, Data, Dimension};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write a NRRD file with attached data.
///
/// The `reference` header provides every field except `type`, `dimension`
/// and `sizes`, which depend only on `data`. Elements are written fastest
/// axis first, i.e. the first axis of `data` varies fastest.
///
/// # Errors
///
/// - `RemapError::InvalidHeader` if `data` has no axes, or the reference
///   space directions do not match its number of axes.
/// - `RemapError::Io` on any I/O failure.
pub fn write_file<P, T, S, D>(path: P, data: &ArrayBase<S, D>, reference: &NrrdHeader) -> Result<()>
where
    P: AsRef<Path>,
    T: LabelElement,
    S: Data<Elem = T>,
    D: Dimension,
{
    let path = path.as_ref();
    debug!("writing NRRD file {}", path.display());
    let file = BufWriter::new(File::create(path)?);
    write_to(file, data, reference)
}

/// Write a NRRD header and attached data to the given byte sink. See
/// `write_file`.
pub fn write_to<W, T, S, D>(mut writer: W, data: &ArrayBase<S, D>, reference: &NrrdHeader) -> Result<()>
where
    W: Write,
    T: LabelElement,
    S: Data<Elem = T>,
    D: Dimension,
{
    let header = NrrdHeader {
        data_type: T::DATA_TYPE,
        sizes: data.shape().to_vec(),
        // All other fields are copied from reference header
        ..reference.clone()
    };
    if header.dimension() == 0 {
        return Err(RemapError::InvalidHeader("volume has no axes".to_string()));
    }
    if let Some(directions) = &header.space_directions {
        if directions.len() != header.dimension() {
            return Err(RemapError::InvalidHeader(format!(
                "{} space directions for {} axes",
                directions.len(),
                header.dimension()
            )));
        }
    }

    write_header(&mut writer, &header)?;
    match header.encoding {
        Encoding::Raw => write_raw(&mut writer, data, header.endianness)?,
        Encoding::Gzip => {
            let mut e = GzEncoder::new(&mut writer, Compression::default());
            write_raw(&mut e, data, header.endianness)?;
            let _ = e.finish()?;
        }
        Encoding::Ascii => write_ascii(&mut writer, data)?,
    }
    writer.flush()?;
    Ok(())
}

fn write_header<W: Write>(writer: &mut W, header: &NrrdHeader) -> Result<()> {
    writeln!(writer, "{}", MAGIC_LINE)?;
    writeln!(writer, "# Complete NRRD file format specification at:")?;
    writeln!(writer, "# http://teem.sourceforge.net/nrrd/format.html")?;
    writeln!(writer, "type: {}", header.data_type.nrrd_name())?;
    writeln!(writer, "dimension: {}", header.dimension())?;
    if let Some(space) = &header.space {
        writeln!(writer, "space: {}", space)?;
    } else if let Some(space_dimension) = header.space_dimension {
        writeln!(writer, "space dimension: {}", space_dimension)?;
    }
    let sizes: Vec<String> = header.sizes.iter().map(|s| s.to_string()).collect();
    writeln!(writer, "sizes: {}", sizes.join(" "))?;
    if let Some(directions) = &header.space_directions {
        let directions: Vec<String> = directions
            .iter()
            .map(|d| match d {
                Some(v) => format_vector(v),
                None => "none".to_string(),
            })
            .collect();
        writeln!(writer, "space directions: {}", directions.join(" "))?;
    }
    for (field, value) in &header.fields {
        writeln!(writer, "{}: {}", field, value)?;
    }
    if header.data_type.size_of() > 1 && header.encoding != Encoding::Ascii {
        let endian = match header.endianness {
            Endianness::Little => "little",
            Endianness::Big => "big",
        };
        writeln!(writer, "endian: {}", endian)?;
    }
    writeln!(writer, "encoding: {}", header.encoding.nrrd_name())?;
    if let Some(origin) = &header.space_origin {
        writeln!(writer, "space origin: {}", format_vector(origin))?;
    }
    for (key, value) in &header.key_values {
        writeln!(writer, "{}:={}", key, value)?;
    }
    writeln!(writer)?;
    Ok(())
}

fn write_raw<W, T, S, D>(writer: &mut W, data: &ArrayBase<S, D>, endianness: Endianness) -> Result<()>
where
    W: Write,
    T: LabelElement,
    S: Data<Elem = T>,
    D: Dimension,
{
    // the transposed view iterates in column major order of `data`
    for &v in data.t().iter() {
        v.write_raw(&mut *writer, endianness)?;
    }
    Ok(())
}

fn write_ascii<W, T, S, D>(writer: &mut W, data: &ArrayBase<S, D>) -> Result<()>
where
    W: Write,
    T: LabelElement,
    S: Data<Elem = T>,
    D: Dimension,
{
    let row = data.shape().first().cloned().unwrap_or(1).max(1);
    for (i, v) in data.t().iter().enumerate() {
        let sep = if (i + 1) % row == 0 { '\n' } else { ' ' };
        write!(writer, "{}{}", v, sep)?;
    }
    Ok(())
}
