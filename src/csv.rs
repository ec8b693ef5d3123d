//! Channel-major CSV output.
//!
//! Each channel becomes one block. Rows are written bottom-to-top, every
//! sample is followed by a comma (including the last one in a row), and each
//! block ends with four newlines.

use std::ffi::OsString;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use enough::Stop;

use crate::error::TiffCsvError;
use crate::image::DecodedImage;
use crate::sample::SampleWidth;

/// Suffix appended to the input path to name the output.
pub const CSV_EXT: &str = ".csv";

const BLOCK_SEPARATOR: &[u8] = b"\n\n\n\n";

/// Output path for `input`: the input path with `.csv` appended.
///
/// `scan.tif` becomes `scan.tif.csv`.
pub fn csv_path_for(input: impl AsRef<Path>) -> PathBuf {
    let mut name = OsString::from(input.as_ref().as_os_str());
    name.push(CSV_EXT);
    PathBuf::from(name)
}

/// Resolve `width` for `image` and make sure every sample it addresses lies
/// inside the raster.
fn check_layout(image: &DecodedImage, width: SampleWidth) -> Result<SampleWidth, TiffCsvError> {
    let width = width.resolve(image.bits_per_sample)?;
    let needed = image
        .sample_count()
        .and_then(|n| n.checked_mul(width.bytes()))
        .ok_or(TiffCsvError::DimensionsTooLarge {
            width: image.width,
            height: image.height,
        })?;
    let actual = image.raster().len();
    if needed > actual {
        return Err(TiffCsvError::SampleOutOfBounds { needed, actual });
    }
    Ok(width)
}

/// Write `image` as CSV into `out`.
pub fn encode_csv_to<W: Write + ?Sized>(
    out: &mut W,
    image: &DecodedImage,
    width: SampleWidth,
    stop: impl Stop,
) -> Result<(), TiffCsvError> {
    let width = check_layout(image, width)?;
    write_blocks(out, image, width, &stop)
}

fn write_blocks<W: Write + ?Sized>(
    out: &mut W,
    image: &DecodedImage,
    width: SampleWidth,
    stop: &dyn Stop,
) -> Result<(), TiffCsvError> {
    let mut line = String::new();
    for channel in 0..image.samples_per_pixel {
        for (n, row) in (0..image.height).rev().enumerate() {
            if n % 16 == 0 {
                stop.check()?;
            }
            line.clear();
            for col in 0..image.width {
                let value = image.sample(row, col, channel, width).ok_or(
                    TiffCsvError::SampleOutOfBounds {
                        needed: image.sample_count().unwrap_or(usize::MAX),
                        actual: image.raster().len(),
                    },
                )?;
                // Writing into a String cannot fail.
                let _ = write!(line, "{value},");
            }
            line.push('\n');
            out.write_all(line.as_bytes())?;
        }
        out.write_all(BLOCK_SEPARATOR)?;
    }
    Ok(())
}

/// Encode `image` as CSV into a new buffer.
pub fn encode_csv(
    image: &DecodedImage,
    width: SampleWidth,
    stop: impl Stop,
) -> Result<Vec<u8>, TiffCsvError> {
    let mut out = Vec::new();
    encode_csv_to(&mut out, image, width, stop)?;
    Ok(out)
}

/// Write `image` as CSV to the file at `path`, truncating it if it exists.
///
/// The image is validated against `width` before the file is created, so a
/// raster that is too small for the requested sample width leaves no file
/// behind.
pub fn write_csv(
    path: impl AsRef<Path>,
    image: &DecodedImage,
    width: SampleWidth,
    stop: impl Stop,
) -> Result<(), TiffCsvError> {
    let path = path.as_ref();
    let width = check_layout(image, width)?;
    let file = File::create(path).map_err(|source| TiffCsvError::OutputOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let mut out = BufWriter::new(file);
    write_blocks(&mut out, image, width, &stop)?;
    out.flush()?;
    tracing::debug!(path = %path.display(), "CSV written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use enough::Unstoppable;
    use pretty_assertions::assert_eq;

    fn image16(width: u32, height: u32, spp: u32, samples: &[u16]) -> DecodedImage {
        let raster: Vec<u8> = samples.iter().flat_map(|v| v.to_ne_bytes()).collect();
        let scanline = (width * spp * 2) as usize;
        DecodedImage::from_raw(raster, width, height, 16, spp, scanline).unwrap()
    }

    fn csv(image: &DecodedImage, width: SampleWidth) -> String {
        String::from_utf8(encode_csv(image, width, Unstoppable).unwrap()).unwrap()
    }

    #[test]
    fn two_by_two_gray_is_flipped() {
        let img = image16(2, 2, 1, &[10, 20, 30, 40]);
        assert_eq!(csv(&img, SampleWidth::Bits16), "30,40,\n10,20,\n\n\n\n\n");
    }

    #[test]
    fn channels_are_separate_blocks() {
        // 2x1 RGB: pixel0 = (1,2,3), pixel1 = (4,5,6)
        let img = image16(2, 1, 3, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(
            csv(&img, SampleWidth::Bits16),
            "1,4,\n\n\n\n\n2,5,\n\n\n\n\n3,6,\n\n\n\n\n"
        );
    }

    #[test]
    fn block_line_k_is_row_height_minus_one_minus_k() {
        let (w, h, spp) = (3u32, 4u32, 2u32);
        let samples: Vec<u16> = (0..w * h * spp).map(|i| i as u16 * 7).collect();
        let img = image16(w, h, spp, &samples);

        let mut expected = String::new();
        for c in 0..spp {
            for k in 0..h {
                let y = h - 1 - k;
                for j in 0..w {
                    let idx = ((y * w + j) * spp + c) as usize;
                    expected.push_str(&format!("{},", samples[idx]));
                }
                expected.push('\n');
            }
            expected.push_str("\n\n\n\n");
        }
        assert_eq!(csv(&img, SampleWidth::Bits16), expected);
    }

    #[test]
    fn eight_bit_raster_too_small_for_sixteen() {
        let img = DecodedImage::from_raw(vec![1, 2, 3, 4], 2, 2, 8, 1, 2).unwrap();
        let err = encode_csv(&img, SampleWidth::Bits16, Unstoppable).unwrap_err();
        assert!(matches!(
            err,
            TiffCsvError::SampleOutOfBounds {
                needed: 8,
                actual: 4
            }
        ));
        assert_eq!(csv(&img, SampleWidth::Auto), "3,4,\n1,2,\n\n\n\n\n");
    }

    #[test]
    fn zero_height_still_separates() {
        let img = image16(5, 0, 2, &[]);
        assert_eq!(csv(&img, SampleWidth::Bits16), "\n\n\n\n\n\n\n\n");
    }

    #[test]
    fn path_gets_suffix() {
        assert_eq!(csv_path_for("a/b/scan.tif"), PathBuf::from("a/b/scan.tif.csv"));
        assert_eq!(csv_path_for("noext"), PathBuf::from("noext.csv"));
    }

    #[test]
    fn write_csv_truncates_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale content that is much longer than the output").unwrap();
        let img = image16(1, 1, 1, &[7]);
        write_csv(&path, &img, SampleWidth::Bits16, Unstoppable).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "7,\n\n\n\n\n");
    }

    #[test]
    fn write_csv_bad_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let img = image16(1, 1, 1, &[7]);
        let err = write_csv(&path, &img, SampleWidth::Bits16, Unstoppable).unwrap_err();
        assert!(matches!(err, TiffCsvError::OutputOpen { .. }));
    }

    #[test]
    fn invalid_layout_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let img = DecodedImage::from_raw(vec![1, 2], 2, 1, 8, 1, 2).unwrap();
        assert!(write_csv(&path, &img, SampleWidth::Bits32, Unstoppable).is_err());
        assert!(!path.exists());
    }
}
