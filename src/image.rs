use crate::error::TiffCsvError;
use crate::sample::SampleWidth;

/// TIFF `PlanarConfiguration` tag value.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanarConfig {
    /// Samples of one pixel stored next to each other (value 1).
    Contiguous,
    /// Each channel stored as its own plane (value 2).
    Separate,
    Unknown(u32),
}

impl PlanarConfig {
    pub fn from_tag(value: u32) -> Self {
        match value {
            1 => Self::Contiguous,
            2 => Self::Separate,
            other => Self::Unknown(other),
        }
    }
}

/// A fully decoded raster with its metadata.
///
/// The raster holds `scanline_size * height` bytes, top row first, with
/// samples in native byte order. Samples are always interleaved per pixel;
/// other planar configurations are rejected while decoding.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    raster: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub bits_per_sample: u32,
    pub samples_per_pixel: u32,
    pub scanline_size: usize,
}

impl DecodedImage {
    /// Wrap an existing raster.
    ///
    /// Fails with [`TiffCsvError::SampleOutOfBounds`] unless
    /// `raster.len() == scanline_size * height`.
    pub fn from_raw(
        raster: Vec<u8>,
        width: u32,
        height: u32,
        bits_per_sample: u32,
        samples_per_pixel: u32,
        scanline_size: usize,
    ) -> Result<Self, TiffCsvError> {
        let needed = scanline_size
            .checked_mul(height as usize)
            .ok_or(TiffCsvError::DimensionsTooLarge { width, height })?;
        if raster.len() != needed {
            return Err(TiffCsvError::SampleOutOfBounds {
                needed,
                actual: raster.len(),
            });
        }
        Ok(Self {
            raster,
            width,
            height,
            bits_per_sample,
            samples_per_pixel,
            scanline_size,
        })
    }

    /// Access the raw raster bytes.
    pub fn raster(&self) -> &[u8] {
        &self.raster
    }

    /// Number of samples the raster must hold: `width * height * samples_per_pixel`.
    pub fn sample_count(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.samples_per_pixel as usize)
    }

    /// Sample at (`row`, `col`, `channel`), read with `width`.
    ///
    /// `width` must already be resolved (not [`SampleWidth::Auto`]).
    pub fn sample(&self, row: u32, col: u32, channel: u32, width: SampleWidth) -> Option<u32> {
        let index = (row as usize)
            .checked_mul(self.width as usize)?
            .checked_add(col as usize)?
            .checked_mul(self.samples_per_pixel as usize)?
            .checked_add(channel as usize)?;
        width.read(&self.raster, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray16(rows: &[[u16; 2]]) -> DecodedImage {
        let raster: Vec<u8> = rows
            .iter()
            .flatten()
            .flat_map(|v| v.to_ne_bytes())
            .collect();
        DecodedImage::from_raw(raster, 2, rows.len() as u32, 16, 1, 4).unwrap()
    }

    #[test]
    fn from_raw_checks_length() {
        let err = DecodedImage::from_raw(vec![0; 7], 2, 2, 16, 1, 4).unwrap_err();
        assert!(matches!(
            err,
            TiffCsvError::SampleOutOfBounds {
                needed: 8,
                actual: 7
            }
        ));
    }

    #[test]
    fn sample_indexing() {
        let img = gray16(&[[10, 20], [30, 40]]);
        assert_eq!(img.sample(0, 0, 0, SampleWidth::Bits16), Some(10));
        assert_eq!(img.sample(0, 1, 0, SampleWidth::Bits16), Some(20));
        assert_eq!(img.sample(1, 0, 0, SampleWidth::Bits16), Some(30));
        assert_eq!(img.sample(1, 1, 0, SampleWidth::Bits16), Some(40));
        assert_eq!(img.sample(2, 0, 0, SampleWidth::Bits16), None);
    }

    #[test]
    fn interleaved_channels() {
        // 1x2 RGB, 8-bit
        let raster = vec![1, 2, 3, 4, 5, 6];
        let img = DecodedImage::from_raw(raster, 1, 2, 8, 3, 3).unwrap();
        assert_eq!(img.sample(1, 0, 2, SampleWidth::Bits8), Some(6));
        assert_eq!(img.sample(0, 0, 1, SampleWidth::Bits8), Some(2));
        assert_eq!(img.sample_count(), Some(6));
    }

    #[test]
    fn planar_from_tag() {
        assert_eq!(PlanarConfig::from_tag(1), PlanarConfig::Contiguous);
        assert_eq!(PlanarConfig::from_tag(2), PlanarConfig::Separate);
        assert_eq!(PlanarConfig::from_tag(7), PlanarConfig::Unknown(7));
    }
}
