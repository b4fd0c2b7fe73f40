//! Types for error handling go here.
use crate::typedef::LabelType;
use ndarray::ShapeError;
use quick_error::quick_error;
use std::io::Error as IOError;
use std::path::PathBuf;

quick_error! {
    /// Error type for all error kinds originated by this crate.
    #[derive(Debug)]
    pub enum RemapError {
        /// The remapper was built from an empty sequence of volumes.
        NoVolume {
            display("No volume provided")
        }
        /// The given raw parts do not describe an N-dimensional array.
        NotAVolume(expected: usize, got: usize) {
            display("Not a label volume: shape holds {} elements, but {} were given", expected, got)
        }
        /// The volume's element type is not the unsigned 32-bit label type.
        UnsupportedDataType(t: LabelType) {
            display("The element type of the volumes needs to be Uint32, got {:?}", t)
        }
        /// Attempted to access a volume outside the remapper's boundaries.
        OutOfBounds(index: usize, len: usize) {
            display("Volume index {} out of bounds for a remapper of {} volume(s)", index, len)
        }
        /// A dense label outside of the established label space.
        UnknownLabel(value: u32, count: usize) {
            display("Dense label {} is not part of the label space of {} label(s)", value, count)
        }
        /// A floating point value which cannot stand for a dense label.
        InvalidDenseValue(value: f32) {
            display("Value {} is not a valid dense label", value)
        }
        /// The label space cannot be represented exactly in single precision.
        TooManyLabels(count: usize) {
            display("Too many distinct labels ({}) for an exact floating point representation", count)
        }
        /// The requested file does not exist.
        MissingFile(path: PathBuf) {
            display("The specified path {} does not exist", path.display())
        }
        /// Malformed NRRD header.
        InvalidHeader(reason: String) {
            display("Invalid NRRD header: {}", reason)
        }
        /// A NRRD field holds a value that is not supported.
        UnsupportedField(field: &'static str, value: String) {
            display("Unsupported value `{}` for NRRD field `{}`", value, field)
        }
        /// The volume data is shorter than what the header describes.
        IncompatibleLength(expected: usize, got: usize) {
            display("Expected {} data elements, but got {}", expected, got)
        }
        /// Failed to shape the output array.
        Shape(err: ShapeError) {
            from()
            source(err)
            display("Array shape error: {}", err)
        }
        /// I/O Error
        Io(err: IOError) {
            from()
            source(err)
            display("I/O error: {}", err)
        }
    }
}

/// Alias type for results originated from this crate.
pub type Result<T> = ::std::result::Result<T, RemapError>;
