//! # tiffcsv
//!
//! Dump the samples of a TIFF raster as plain-text CSV.
//!
//! ## Output layout
//!
//! One block per channel, channel 0 first. Inside a block, rows run from the
//! last image row up to the first, and every sample is written as a decimal
//! integer followed by a comma. Each row ends with a newline and each block
//! is followed by four more newlines. A 2x2 gray image with rows `[10, 20]`
//! and `[30, 40]` becomes:
//!
//! ```text
//! 30,40,
//! 10,20,
//!
//!
//!
//!
//! ```
//!
//! ## Sample width
//!
//! Raster bytes are reinterpreted as integers of a fixed width chosen by
//! [`SampleWidth`]. The default, [`SampleWidth::Bits16`], reads two bytes per
//! sample whatever the declared bit depth, which is only right for 16-bit
//! images. [`SampleWidth::Auto`] follows the declared depth instead.
//!
//! ## Non-Goals
//!
//! - Tiled or planar-separate storage
//! - Multi-page TIFFs (only the first image is read)
//! - Color interpretation (samples are written as stored, even for WhiteIsZero)
//!
//! ## Usage
//!
//! ```no_run
//! use tiffcsv::{SampleWidth, Unstoppable};
//!
//! let image = tiffcsv::decode("scan.tif", Unstoppable)?;
//! println!("{}x{} {}bit({})", image.width, image.height,
//!          image.bits_per_sample, image.samples_per_pixel);
//! tiffcsv::write_csv(tiffcsv::csv_path_for("scan.tif"), &image,
//!                    SampleWidth::Bits16, Unstoppable)?;
//! # Ok::<(), tiffcsv::TiffCsvError>(())
//! ```

#![forbid(unsafe_code)]

mod csv;
mod decode;
mod error;
mod image;
mod limits;
mod sample;
pub mod source;

// Re-exports
pub use csv::{CSV_EXT, csv_path_for, encode_csv, encode_csv_to, write_csv};
pub use decode::{DecodeRequest, decode, decode_reader, decode_source};
pub use enough::{Stop, Unstoppable};
pub use error::TiffCsvError;
pub use image::{DecodedImage, PlanarConfig};
pub use limits::Limits;
pub use sample::SampleWidth;
