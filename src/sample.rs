use crate::error::TiffCsvError;

/// How raster bytes are reinterpreted as integer samples when writing CSV.
///
/// Samples are read in native byte order, matching what the decoder stores.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SampleWidth {
    /// One byte per sample.
    Bits8,
    /// Two bytes per sample, regardless of the declared bit depth.
    #[default]
    Bits16,
    /// Four bytes per sample.
    Bits32,
    /// Derived from the image's declared bits-per-sample (8, 16 or 32).
    Auto,
}

impl SampleWidth {
    /// Resolve `Auto` against the declared bit depth.
    pub fn resolve(self, bits_per_sample: u32) -> Result<SampleWidth, TiffCsvError> {
        match self {
            Self::Auto => match bits_per_sample {
                8 => Ok(Self::Bits8),
                16 => Ok(Self::Bits16),
                32 => Ok(Self::Bits32),
                other => Err(TiffCsvError::UnsupportedSampleWidth(other)),
            },
            fixed => Ok(fixed),
        }
    }

    /// Bytes per sample. `Auto` must be resolved first.
    pub(crate) fn bytes(self) -> usize {
        match self {
            Self::Bits8 => 1,
            Self::Bits16 => 2,
            Self::Bits32 | Self::Auto => 4,
        }
    }

    /// Read the sample at `index` from `raster`, or `None` if it runs past the end.
    pub(crate) fn read(self, raster: &[u8], index: usize) -> Option<u32> {
        let bytes = self.bytes();
        let start = index.checked_mul(bytes)?;
        let raw = raster.get(start..start.checked_add(bytes)?)?;
        Some(match self {
            Self::Bits8 => u32::from(raw[0]),
            Self::Bits16 => u32::from(u16::from_ne_bytes([raw[0], raw[1]])),
            Self::Bits32 | Self::Auto => u32::from_ne_bytes([raw[0], raw[1], raw[2], raw[3]]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_follows_bit_depth() {
        assert_eq!(SampleWidth::Auto.resolve(8).unwrap(), SampleWidth::Bits8);
        assert_eq!(SampleWidth::Auto.resolve(16).unwrap(), SampleWidth::Bits16);
        assert_eq!(SampleWidth::Auto.resolve(32).unwrap(), SampleWidth::Bits32);
        assert!(matches!(
            SampleWidth::Auto.resolve(12),
            Err(TiffCsvError::UnsupportedSampleWidth(12))
        ));
    }

    #[test]
    fn fixed_width_ignores_bit_depth() {
        assert_eq!(SampleWidth::Bits16.resolve(8).unwrap(), SampleWidth::Bits16);
    }

    #[test]
    fn read_native_endian() {
        let raster: Vec<u8> = [10u16, 65535].iter().flat_map(|v| v.to_ne_bytes()).collect();
        assert_eq!(SampleWidth::Bits16.read(&raster, 0), Some(10));
        assert_eq!(SampleWidth::Bits16.read(&raster, 1), Some(65535));
        assert_eq!(SampleWidth::Bits16.read(&raster, 2), None);
    }

    #[test]
    fn read_rejects_partial_sample() {
        let raster = [1u8, 2, 3];
        assert_eq!(SampleWidth::Bits16.read(&raster, 1), None);
        assert_eq!(SampleWidth::Bits8.read(&raster, 2), Some(3));
    }
}
