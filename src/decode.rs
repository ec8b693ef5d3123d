use std::io::{Read, Seek};
use std::path::Path;

use enough::Stop;

use crate::error::TiffCsvError;
use crate::image::{DecodedImage, PlanarConfig};
use crate::limits::Limits;
use crate::source::{Field, ScanlineSource, TiffSource};

/// Decode request builder.
///
/// ```no_run
/// use tiffcsv::{DecodeRequest, Limits, Unstoppable};
///
/// let limits = Limits { max_pixels: Some(1 << 24), ..Default::default() };
/// let image = DecodeRequest::new("scan.tif")
///     .with_limits(&limits)
///     .decode(Unstoppable)?;
/// println!("{}x{}", image.width, image.height);
/// # Ok::<(), tiffcsv::TiffCsvError>(())
/// ```
pub struct DecodeRequest<'a> {
    path: &'a Path,
    limits: Option<&'a Limits>,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(path: &'a (impl AsRef<Path> + ?Sized)) -> Self {
        Self {
            path: path.as_ref(),
            limits: None,
        }
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn decode(self, stop: impl Stop) -> Result<DecodedImage, TiffCsvError> {
        tracing::debug!(path = %self.path.display(), "opening TIFF");
        let mut source = TiffSource::open(self.path, self.limits)?;
        decode_source(&mut source, self.limits, stop)
    }
}

/// Decode the TIFF file at `path` with no limits.
pub fn decode(path: impl AsRef<Path>, stop: impl Stop) -> Result<DecodedImage, TiffCsvError> {
    DecodeRequest::new(path.as_ref()).decode(stop)
}

/// Decode TIFF data from any seekable reader.
pub fn decode_reader<R: Read + Seek>(
    reader: R,
    limits: Option<&Limits>,
    stop: impl Stop,
) -> Result<DecodedImage, TiffCsvError> {
    let mut source = TiffSource::new(reader, limits)?;
    decode_source(&mut source, limits, stop)
}

/// Pull a whole raster out of `source`, one scanline at a time.
pub fn decode_source<S: ScanlineSource + ?Sized>(
    source: &mut S,
    limits: Option<&Limits>,
    stop: impl Stop,
) -> Result<DecodedImage, TiffCsvError> {
    let mut field = |f: Field| -> Result<u32, TiffCsvError> {
        Ok(source.field(f)?.unwrap_or(f.default_value()))
    };
    let width = field(Field::ImageWidth)?;
    let height = field(Field::ImageLength)?;
    let bits_per_sample = field(Field::BitsPerSample)?;
    let samples_per_pixel = field(Field::SamplesPerPixel)?;
    let planar = field(Field::PlanarConfiguration)?;
    tracing::debug!(
        width,
        height,
        bits_per_sample,
        samples_per_pixel,
        planar,
        "read TIFF metadata"
    );

    if PlanarConfig::from_tag(planar) != PlanarConfig::Contiguous {
        return Err(TiffCsvError::UnsupportedPlanarConfig(planar));
    }

    let scanline_size = source.scanline_size()?;
    let total = limits
        .unwrap_or(&Limits::default())
        .raster_bytes(width, height, scanline_size)?;

    let mut raster = Vec::new();
    raster
        .try_reserve_exact(total)
        .map_err(|_| TiffCsvError::Allocation { bytes: total })?;
    raster.resize(total, 0);

    stop.check()?;
    if scanline_size > 0 {
        for (row, line) in (0..height).zip(raster.chunks_exact_mut(scanline_size)) {
            if row % 16 == 0 {
                stop.check()?;
            }
            source.read_scanline(row, line)?;
        }
    }
    tracing::debug!(bytes = total, "raster decoded");

    DecodedImage::from_raw(
        raster,
        width,
        height,
        bits_per_sample,
        samples_per_pixel,
        scanline_size,
    )
}
