//! Label remapping and label volume I/O for brain atlas registration
//! pipelines.
//!
//! Annotation volumes of different atlases label the same brain regions
//! with different, sparse integer codes. Before two of them can be
//! registered, or a label volume can be processed numerically, their
//! labels need to share one dense space of consecutive integers. The
//! [`LabelRemapper`] builds that space over any number of `u32` label
//! volumes and maps volumes into it and back.
//!
//! Volumes are `ndarray` arrays. Label volumes stored as NRRD files can be
//! read into a [`DynLabelVolume`], whose element type is only known at run
//! time, and written back with [`writer::write_file`]. The
//! [`align`] module sequences remapping around an external registration
//! engine.
//!
//! # Example
//!
//! ```no_run
//! use deepatlas::{check_and_load, LabelRemapper};
//! # use deepatlas::Result;
//! # fn run() -> Result<()> {
//! let ccfv2 = check_and_load("annotation_ccfv2.nrrd")?;
//! let ccfv3 = check_and_load("annotation_ccfv3.nrrd")?;
//! let remapper = LabelRemapper::from_dyn(&[ccfv3, ccfv2])?;
//! let dense_ccfv2 = remapper.remap_old_to_new(1)?;
//! // ... transform `dense_ccfv2` ...
//! let ccfv2 = remapper.remap_new_to_old(&dense_ccfv2)?;
//! # Ok(())
//! # }
//! ```
//!
//! [`LabelRemapper`]: ./remap/struct.LabelRemapper.html
//! [`DynLabelVolume`]: ./volume/enum.DynLabelVolume.html
//! [`writer::write_file`]: ./writer/fn.write_file.html
//! [`align`]: ./align/index.html
#![deny(missing_debug_implementations)]
#![warn(missing_docs, unused_extern_crates, trivial_casts, unused_results)]

pub mod align;
pub mod error;
pub mod header;
pub mod object;
pub mod remap;
pub mod typedef;
pub mod volume;
pub mod writer;

pub use crate::error::{RemapError, Result};
pub use crate::header::{Encoding, NrrdHeader};
pub use crate::object::{check_and_load, check_and_load_normalized, NrrdObject};
pub use crate::remap::{LabelInventory, LabelRemapper, RemapOptions, UnknownLabelPolicy};
pub use crate::typedef::LabelType;
pub use crate::volume::{DynLabelVolume, LabelElement};
pub use byteordered::Endianness;
