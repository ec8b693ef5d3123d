use std::io;
use std::path::PathBuf;

use enough::StopReason;

/// Errors from TIFF decoding and CSV encoding.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TiffCsvError {
    #[error("could not open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: tiff::TiffError,
    },

    #[error("could not decode TIFF: {0}")]
    Decode(#[source] tiff::TiffError),

    #[error("could not read scanline {row}: {source}")]
    Read {
        row: u32,
        #[source]
        source: tiff::TiffError,
    },

    #[error("unsupported planar configuration {0} (only contiguous samples are supported)")]
    UnsupportedPlanarConfig(u32),

    #[error("unsupported layout: {0}")]
    UnsupportedLayout(String),

    #[error("could not allocate {bytes} bytes for the raster")]
    Allocation { bytes: usize },

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("scanline {row} truncated: need {needed} bytes, got {actual}")]
    TruncatedScanline {
        row: u32,
        needed: usize,
        actual: usize,
    },

    #[error("cannot derive sample width from {0} bits per sample")]
    UnsupportedSampleWidth(u32),

    #[error("raster too small: need {needed} bytes, got {actual}")]
    SampleOutOfBounds { needed: usize, actual: usize },

    #[error("could not open {} for writing: {source}", path.display())]
    OutputOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("write failed: {0}")]
    Io(#[from] io::Error),

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for TiffCsvError {
    fn from(r: StopReason) -> Self {
        TiffCsvError::Cancelled(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_message_names_value() {
        let err = TiffCsvError::UnsupportedPlanarConfig(2);
        assert_eq!(
            err.to_string(),
            "unsupported planar configuration 2 (only contiguous samples are supported)"
        );
    }

    #[test]
    fn output_open_message_names_path() {
        let err = TiffCsvError::OutputOpen {
            path: PathBuf::from("/nope/out.csv"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().starts_with("could not open /nope/out.csv for writing"));
    }

    #[test]
    fn io_error_converts() {
        let err: TiffCsvError = io::Error::other("disk full").into();
        assert!(matches!(err, TiffCsvError::Io(_)));
    }
}
