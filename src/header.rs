//! This module defines the `NrrdHeader` struct, which describes a label
//! volume stored in the NRRD format: a text header followed by the
//! volume's elements, fastest axis first.

use crate::error::{RemapError, Result};
use crate::typedef::LabelType;
use byteordered::Endianness;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Prefix of the magic line of every NRRD file, followed by a version
/// digit.
pub const MAGIC_PREFIX: &str = "NRRD000";

/// The magic line written by this crate.
pub const MAGIC_LINE: &str = "NRRD0004";

/// Encoding of the volume data following the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Raw bytes, in the header's byte order.
    Raw,
    /// Raw bytes compressed in a GZip stream.
    Gzip,
    /// Whitespace separated decimal values.
    Ascii,
}

impl Encoding {
    /// Obtain the encoding from the value of a NRRD `encoding` field.
    pub fn from_nrrd_name(name: &str) -> Result<Self> {
        match name.trim() {
            "raw" => Ok(Encoding::Raw),
            "gzip" | "gz" => Ok(Encoding::Gzip),
            "ascii" | "text" | "txt" => Ok(Encoding::Ascii),
            other => Err(RemapError::UnsupportedField("encoding", other.to_string())),
        }
    }

    /// The canonical NRRD name of this encoding.
    pub fn nrrd_name(self) -> &'static str {
        match self {
            Encoding::Raw => "raw",
            Encoding::Gzip => "gzip",
            Encoding::Ascii => "ascii",
        }
    }
}

/// The NRRD header data type.
///
/// The fields which are relevant to label volumes are parsed into typed
/// values, any other field is kept verbatim in `fields`, so that it is
/// written back as is.
///
/// # Examples
///
/// ```no_run
/// use deepatlas::NrrdHeader;
/// # use deepatlas::Result;
///
/// # fn run() -> Result<()> {
/// let hdr = NrrdHeader::from_file("annotation_25.nrrd")?;
/// println!("{:?} volume of sizes {:?}", hdr.data_type, hdr.sizes);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NrrdHeader {
    /// Element type (`type`)
    pub data_type: LabelType,
    /// Size of each axis, fastest first (`sizes`). The `dimension` field
    /// is its length.
    pub sizes: Vec<usize>,
    /// Byte order of binary data (`endian`)
    pub endianness: Endianness,
    /// Data encoding (`encoding`)
    pub encoding: Encoding,
    /// Named world space (`space`)
    pub space: Option<String>,
    /// Dimension of an unnamed world space (`space dimension`)
    pub space_dimension: Option<usize>,
    /// One vector per axis, `None` for non-spatial axes
    /// (`space directions`)
    pub space_directions: Option<Vec<Option<Vec<f64>>>>,
    /// Position of the first sample (`space origin`)
    pub space_origin: Option<Vec<f64>>,
    /// Other fields, in order of appearance
    pub fields: Vec<(String, String)>,
    /// Key/value pairs (`key:=value`)
    pub key_values: Vec<(String, String)>,
}

impl Default for NrrdHeader {
    fn default() -> NrrdHeader {
        NrrdHeader {
            data_type: LabelType::Uint8,
            sizes: Vec::new(),
            endianness: Endianness::native(),
            encoding: Encoding::Raw,
            space: None,
            space_dimension: None,
            space_directions: None,
            space_origin: None,
            fields: Vec::new(),
            key_values: Vec::new(),
        }
    }
}

impl NrrdHeader {
    /// The header of a 3D brain annotation volume: `uint32` labels,
    /// isotropic voxels of the given size, little endian, GZip encoding
    /// and origin at zero. Sizes are taken from the volume when writing.
    pub fn annotation(voxel_size: f64) -> NrrdHeader {
        NrrdHeader {
            data_type: LabelType::Uint32,
            endianness: Endianness::Little,
            encoding: Encoding::Gzip,
            space_dimension: Some(3),
            space_directions: Some(vec![
                Some(vec![voxel_size, 0., 0.]),
                Some(vec![0., voxel_size, 0.]),
                Some(vec![0., 0., voxel_size]),
            ]),
            space_origin: Some(vec![0.; 3]),
            ..NrrdHeader::default()
        }
    }

    /// The number of axes of the volume.
    pub fn dimension(&self) -> usize {
        self.sizes.len()
    }

    /// The number of elements in the volume.
    ///
    /// # Errors
    ///
    /// - `RemapError::InvalidHeader` if the volume would hold more bytes
    ///   than can be addressed.
    pub fn element_count(&self) -> Result<usize> {
        let too_large = || RemapError::InvalidHeader(format!("sizes {:?} are too large", self.sizes));
        let count = self
            .sizes
            .iter()
            .try_fold(1usize, |acc, &s| acc.checked_mul(s))
            .ok_or_else(too_large)?;
        let _ = count
            .checked_mul(self.data_type.size_of())
            .ok_or_else(too_large)?;
        Ok(count)
    }

    /// Retrieve a NRRD header from a file in the file system. Volume data
    /// is not read.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<NrrdHeader> {
        let mut file = BufReader::new(File::open(path)?);
        NrrdHeader::from_stream(&mut file)
    }

    /// Read a NRRD header from the given stream, up to and including the
    /// blank line which separates it from the volume data.
    ///
    /// # Errors
    ///
    /// - `RemapError::InvalidHeader` if the magic line is missing, a line
    ///   is malformed, a required field is missing, or fields disagree.
    /// - `RemapError::UnsupportedField` for detached data files, skipped
    ///   bytes or lines, and unknown types or encodings.
    pub fn from_stream<R: BufRead>(input: &mut R) -> Result<NrrdHeader> {
        parse_header(input)
    }
}

fn parse_header<R: BufRead>(input: &mut R) -> Result<NrrdHeader> {
    let mut line = String::new();
    let _ = input.read_line(&mut line)?;
    if !line.starts_with(MAGIC_PREFIX) {
        return Err(RemapError::InvalidHeader("missing NRRD magic line".to_string()));
    }

    let mut h = NrrdHeader::default();
    let mut data_type = None;
    let mut dimension = None;
    let mut sizes = None;
    let mut encoding = None;
    let mut endianness = None;

    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let l = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
        if l.is_empty() {
            break;
        }
        if l.starts_with('#') {
            continue;
        }

        match split_line(l) {
            Some(Line::KeyValue(key, value)) => {
                h.key_values.push((key.to_string(), value.to_string()));
            }
            Some(Line::Field(field, value)) => match field {
                "type" => data_type = Some(LabelType::from_nrrd_name(value)?),
                "dimension" => dimension = Some(parse_usize("dimension", value)?),
                "sizes" => {
                    sizes = Some(
                        value
                            .split_whitespace()
                            .map(|s| parse_usize("sizes", s))
                            .collect::<Result<Vec<_>>>()?,
                    )
                }
                "endian" => {
                    endianness = Some(match value.trim() {
                        "little" => Endianness::Little,
                        "big" => Endianness::Big,
                        other => {
                            return Err(RemapError::UnsupportedField("endian", other.to_string()))
                        }
                    })
                }
                "encoding" => encoding = Some(Encoding::from_nrrd_name(value)?),
                "space" => h.space = Some(value.trim().to_string()),
                "space dimension" => {
                    h.space_dimension = Some(parse_usize("space dimension", value)?)
                }
                "space directions" => h.space_directions = Some(parse_vector_list(value)?),
                "space origin" => h.space_origin = Some(parse_vector(value)?),
                "data file" | "datafile" => {
                    return Err(RemapError::UnsupportedField("data file", value.to_string()))
                }
                "byte skip" | "byteskip" | "line skip" | "lineskip" => {
                    if value.trim() != "0" {
                        return Err(RemapError::UnsupportedField("skip", value.to_string()));
                    }
                }
                other => h.fields.push((other.to_string(), value.to_string())),
            },
            None => {
                return Err(RemapError::InvalidHeader(format!("malformed line `{}`", l)));
            }
        }
    }

    h.data_type = data_type.ok_or_else(|| missing("type"))?;
    h.sizes = sizes.ok_or_else(|| missing("sizes"))?;
    h.encoding = encoding.ok_or_else(|| missing("encoding"))?;
    let dimension = dimension.ok_or_else(|| missing("dimension"))?;
    if dimension == 0 || dimension != h.sizes.len() {
        return Err(RemapError::InvalidHeader(format!(
            "dimension {} does not match sizes {:?}",
            dimension, h.sizes
        )));
    }
    let _ = h.element_count()?;
    h.endianness = match endianness {
        Some(e) => e,
        None if h.data_type.size_of() == 1 || h.encoding == Encoding::Ascii => Endianness::native(),
        None => return Err(missing("endian")),
    };
    if let Some(directions) = &h.space_directions {
        if directions.len() != dimension {
            return Err(RemapError::InvalidHeader(format!(
                "{} space directions for {} axes",
                directions.len(),
                dimension
            )));
        }
    }
    if let (Some(origin), Some(space_dimension)) = (&h.space_origin, h.space_dimension) {
        if origin.len() != space_dimension {
            return Err(RemapError::InvalidHeader(format!(
                "space origin {:?} in a space of dimension {}",
                origin, space_dimension
            )));
        }
    }

    Ok(h)
}

enum Line<'a> {
    Field(&'a str, &'a str),
    KeyValue(&'a str, &'a str),
}

/// Split a header line into a field (`field: value`) or a key/value pair
/// (`key:=value`), whichever separator comes first.
fn split_line(l: &str) -> Option<Line<'_>> {
    match (l.find(":="), l.find(": ")) {
        (Some(kv), Some(f)) if f < kv => Some(Line::Field(&l[..f], &l[f + 2..])),
        (Some(kv), _) => Some(Line::KeyValue(&l[..kv], &l[kv + 2..])),
        (None, Some(f)) => Some(Line::Field(&l[..f], &l[f + 2..])),
        (None, None) => None,
    }
}

fn missing(field: &str) -> RemapError {
    RemapError::InvalidHeader(format!("missing required field `{}`", field))
}

fn parse_usize(field: &str, value: &str) -> Result<usize> {
    value.trim().parse().map_err(|_| {
        RemapError::InvalidHeader(format!("invalid value `{}` for field `{}`", value, field))
    })
}

fn parse_vector(value: &str) -> Result<Vec<f64>> {
    let value = value.trim();
    let inner = value
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
        .ok_or_else(|| RemapError::InvalidHeader(format!("invalid vector `{}`", value)))?;
    inner
        .split(',')
        .map(|c| {
            c.trim()
                .parse::<f64>()
                .map_err(|_| RemapError::InvalidHeader(format!("invalid vector `{}`", value)))
        })
        .collect()
}

fn parse_vector_list(value: &str) -> Result<Vec<Option<Vec<f64>>>> {
    let mut out = Vec::new();
    let mut rest = value.trim();
    while !rest.is_empty() {
        if let Some(r) = rest.strip_prefix("none") {
            out.push(None);
            rest = r.trim_start();
        } else if rest.starts_with('(') {
            let end = rest.find(')').ok_or_else(|| {
                RemapError::InvalidHeader(format!("unterminated vector in `{}`", value))
            })?;
            out.push(Some(parse_vector(&rest[..=end])?));
            rest = rest[end + 1..].trim_start();
        } else {
            return Err(RemapError::InvalidHeader(format!("invalid vector list `{}`", value)));
        }
    }
    Ok(out)
}

/// Format a vector the way NRRD headers expect it, e.g. `(25,0,0)`.
pub(crate) fn format_vector(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| x.to_string()).collect();
    format!("({})", parts.join(","))
}
