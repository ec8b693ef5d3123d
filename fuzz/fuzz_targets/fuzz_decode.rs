#![no_main]
use libfuzzer_sys::fuzz_target;
use tiffcsv::{Limits, SampleWidth, Unstoppable};

fuzz_target!(|data: &[u8]| {
    // Keep allocations bounded; arbitrary headers can claim huge images.
    let limits = Limits {
        max_memory_bytes: Some(16 << 20),
        max_pixels: Some(1 << 20),
        ..Default::default()
    };

    // Decode then encode with every width — must never panic
    let Ok(image) = tiffcsv::decode_reader(std::io::Cursor::new(data), Some(&limits), Unstoppable)
    else {
        return;
    };
    for width in [
        SampleWidth::Bits8,
        SampleWidth::Bits16,
        SampleWidth::Bits32,
        SampleWidth::Auto,
    ] {
        let _ = tiffcsv::encode_csv(&image, width, Unstoppable);
    }
});
