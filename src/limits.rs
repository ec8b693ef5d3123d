use crate::error::TiffCsvError;

/// Caps on the images a conversion will accept.
///
/// Everything defaults to `None`, meaning no cap. These are the only caps
/// applied: the `tiff` decoder's own buffer limits are derived from them
/// by [`Limits::decoder_limits`].
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Maximum pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Maximum size of the decoded raster in bytes.
    pub max_memory_bytes: Option<u64>,
}

fn over(what: &str, value: u64, cap: Option<u64>) -> Result<(), TiffCsvError> {
    match cap {
        Some(cap) if value > cap => Err(TiffCsvError::LimitExceeded(format!(
            "{what} {value} exceeds limit {cap}"
        ))),
        _ => Ok(()),
    }
}

impl Limits {
    /// Validate the image geometry and return the raster size in bytes
    /// (`scanline_size * height`).
    pub(crate) fn raster_bytes(
        &self,
        width: u32,
        height: u32,
        scanline_size: usize,
    ) -> Result<usize, TiffCsvError> {
        over("width", u64::from(width), self.max_width)?;
        over("height", u64::from(height), self.max_height)?;
        over("pixel count", u64::from(width) * u64::from(height), self.max_pixels)?;
        let bytes = scanline_size
            .checked_mul(height as usize)
            .ok_or(TiffCsvError::DimensionsTooLarge { width, height })?;
        over("raster size", bytes as u64, self.max_memory_bytes)?;
        Ok(bytes)
    }

    /// Buffer limits for the `tiff` decoder.
    ///
    /// Unlimited unless `max_memory_bytes` is set, in which case no single
    /// strip may decode to more than that.
    pub(crate) fn decoder_limits(&self) -> tiff::decoder::Limits {
        let mut limits = tiff::decoder::Limits::unlimited();
        if let Some(max) = self.max_memory_bytes {
            let max = usize::try_from(max).unwrap_or(usize::MAX);
            limits.decoding_buffer_size = max;
            limits.intermediate_buffer_size = max;
        }
        limits
    }
}
