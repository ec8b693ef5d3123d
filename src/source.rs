//! Scanline sources: the seam between the converter and the TIFF decoder.
//!
//! The decoder adapter only needs four things from a decoding library: tag
//! lookups, the byte size of one scanline, a way to read a single scanline
//! into a caller buffer, and release on drop. [`ScanlineSource`] captures
//! exactly that; [`TiffSource`] satisfies it with the `tiff` crate.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use crate::error::TiffCsvError;
use crate::limits::Limits;

/// Metadata fields the adapter queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    ImageWidth,
    ImageLength,
    BitsPerSample,
    SamplesPerPixel,
    PlanarConfiguration,
}

impl Field {
    /// TIFF baseline value used when the tag is absent.
    pub fn default_value(self) -> u32 {
        match self {
            Self::ImageWidth | Self::ImageLength => 0,
            Self::BitsPerSample | Self::SamplesPerPixel | Self::PlanarConfiguration => 1,
        }
    }

    fn tag(self) -> Tag {
        match self {
            Self::ImageWidth => Tag::ImageWidth,
            Self::ImageLength => Tag::ImageLength,
            Self::BitsPerSample => Tag::BitsPerSample,
            Self::SamplesPerPixel => Tag::SamplesPerPixel,
            Self::PlanarConfiguration => Tag::PlanarConfiguration,
        }
    }
}

/// Row-at-a-time access to a raster image.
///
/// Dropping the source releases the underlying resource.
pub trait ScanlineSource {
    /// Value of `field`, or `None` if the image does not carry it.
    ///
    /// Multi-valued tags report their first value.
    fn field(&mut self, field: Field) -> Result<Option<u32>, TiffCsvError>;

    /// Byte size of one decoded scanline.
    fn scanline_size(&mut self) -> Result<usize, TiffCsvError>;

    /// Decode row `row` into `buf`, which is exactly one scanline long.
    fn read_scanline(&mut self, row: u32, buf: &mut [u8]) -> Result<(), TiffCsvError>;
}

/// [`ScanlineSource`] backed by [`tiff::decoder::Decoder`].
///
/// Strips are decoded whole and cached, so reading rows in order decodes
/// each strip once. Samples come out as stored: the decoder's WhiteIsZero
/// inversion is undone.
///
/// The decoder rejects PlanarConfiguration values other than 1 and 2 while
/// parsing the header, so those surface as [`TiffCsvError::Open`] (or
/// [`TiffCsvError::Decode`] for readers) rather than
/// [`TiffCsvError::UnsupportedPlanarConfig`].
pub struct TiffSource<R: Read + Seek> {
    decoder: Decoder<R>,
    rows_per_strip: u32,
    white_is_zero: bool,
    strip: Option<(u32, Vec<u8>)>,
}

impl TiffSource<BufReader<File>> {
    /// Open the TIFF file at `path`.
    ///
    /// The decoder's buffer caps come from `limits`; without limits there are none.
    pub fn open(path: impl AsRef<Path>, limits: Option<&Limits>) -> Result<Self, TiffCsvError> {
        let path = path.as_ref();
        let open_err = |source: tiff::TiffError| TiffCsvError::Open {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(|e| open_err(e.into()))?;
        let decoder = Decoder::new(BufReader::new(file)).map_err(open_err)?;
        Self::from_decoder(decoder, limits)
    }
}

impl<R: Read + Seek> TiffSource<R> {
    /// Wrap an arbitrary reader holding TIFF data.
    pub fn new(reader: R, limits: Option<&Limits>) -> Result<Self, TiffCsvError> {
        let decoder = Decoder::new(reader).map_err(TiffCsvError::Decode)?;
        Self::from_decoder(decoder, limits)
    }

    fn from_decoder(decoder: Decoder<R>, limits: Option<&Limits>) -> Result<Self, TiffCsvError> {
        let mut decoder =
            decoder.with_limits(limits.unwrap_or(&Limits::default()).decoder_limits());
        if decoder
            .find_tag(Tag::TileWidth)
            .map_err(TiffCsvError::Decode)?
            .is_some()
        {
            return Err(TiffCsvError::UnsupportedLayout(
                "tiled images are not supported".into(),
            ));
        }
        let mut first = |tag| {
            decoder
                .find_tag_unsigned_vec::<u32>(tag)
                .map(|v| v.and_then(|v| v.first().copied()))
                .map_err(TiffCsvError::Decode)
        };
        let photometric = first(Tag::PhotometricInterpretation)?;
        let bits = first(Tag::BitsPerSample)?.unwrap_or(1);
        let (_, rows_per_strip) = decoder.chunk_dimensions();
        Ok(Self {
            decoder,
            rows_per_strip: rows_per_strip.max(1),
            // the decoder only inverts these depths
            white_is_zero: photometric == Some(0) && matches!(bits, 0..=8 | 16 | 32 | 64),
            strip: None,
        })
    }

    fn load_strip(&mut self, index: u32, row: u32) -> Result<&[u8], TiffCsvError> {
        let cached = matches!(&self.strip, Some((i, _)) if *i == index);
        if !cached {
            tracing::trace!(strip = index, "decoding strip");
            let decoded = self
                .decoder
                .read_chunk(index)
                .map_err(|source| TiffCsvError::Read { row, source })?;
            self.strip = Some((index, native_bytes(decoded, self.white_is_zero)?));
        }
        match &self.strip {
            Some((_, bytes)) => Ok(bytes),
            None => Ok(&[]),
        }
    }
}

impl<R: Read + Seek> ScanlineSource for TiffSource<R> {
    fn field(&mut self, field: Field) -> Result<Option<u32>, TiffCsvError> {
        let values = self
            .decoder
            .find_tag_unsigned_vec::<u32>(field.tag())
            .map_err(TiffCsvError::Decode)?;
        Ok(values.and_then(|v| v.first().copied()))
    }

    fn scanline_size(&mut self) -> Result<usize, TiffCsvError> {
        let mut get = |f: Field| -> Result<u32, TiffCsvError> {
            Ok(self.field(f)?.unwrap_or(f.default_value()))
        };
        let width = get(Field::ImageWidth)?;
        let spp = get(Field::SamplesPerPixel)?;
        let bps = get(Field::BitsPerSample)?;
        let bits = u64::from(width) * u64::from(spp) * u64::from(bps);
        usize::try_from(bits.div_ceil(8)).map_err(|_| TiffCsvError::DimensionsTooLarge {
            width,
            height: 1,
        })
    }

    fn read_scanline(&mut self, row: u32, buf: &mut [u8]) -> Result<(), TiffCsvError> {
        let index = row / self.rows_per_strip;
        let offset = (row % self.rows_per_strip) as usize * buf.len();
        let strip = self.load_strip(index, row)?;
        let src = strip
            .get(offset..offset + buf.len())
            .ok_or(TiffCsvError::TruncatedScanline {
                row,
                needed: offset + buf.len(),
                actual: strip.len(),
            })?;
        buf.copy_from_slice(src);
        Ok(())
    }
}

/// Flatten decoded samples into native-endian bytes.
///
/// For WhiteIsZero images the decoder has replaced every unsigned sample `v`
/// with `MAX - v`; flipping all bits restores the stored value.
fn native_bytes(decoded: DecodingResult, white_is_zero: bool) -> Result<Vec<u8>, TiffCsvError> {
    #[allow(unreachable_patterns)]
    let (mut bytes, unsigned): (Vec<u8>, bool) = match decoded {
        DecodingResult::U8(v) => (v, true),
        DecodingResult::U16(v) => (v.iter().flat_map(|s| s.to_ne_bytes()).collect(), true),
        DecodingResult::U32(v) => (v.iter().flat_map(|s| s.to_ne_bytes()).collect(), true),
        DecodingResult::U64(v) => (v.iter().flat_map(|s| s.to_ne_bytes()).collect(), true),
        DecodingResult::I8(v) => (v.iter().map(|s| *s as u8).collect(), false),
        DecodingResult::I16(v) => (v.iter().flat_map(|s| s.to_ne_bytes()).collect(), false),
        DecodingResult::I32(v) => (v.iter().flat_map(|s| s.to_ne_bytes()).collect(), false),
        DecodingResult::I64(v) => (v.iter().flat_map(|s| s.to_ne_bytes()).collect(), false),
        DecodingResult::F32(v) => (v.iter().flat_map(|s| s.to_ne_bytes()).collect(), false),
        DecodingResult::F64(v) => (v.iter().flat_map(|s| s.to_ne_bytes()).collect(), false),
        _ => {
            return Err(TiffCsvError::UnsupportedLayout(
                "unsupported sample type".into(),
            ));
        }
    };
    if white_is_zero {
        if !unsigned {
            return Err(TiffCsvError::UnsupportedLayout(
                "WhiteIsZero with signed or floating-point samples".into(),
            ));
        }
        for b in &mut bytes {
            *b = !*b;
        }
    }
    Ok(bytes)
}
