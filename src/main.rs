use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiffcsv::{DecodeRequest, Limits, SampleWidth, Unstoppable};

#[derive(Parser)]
#[command(name = "tiffcsv", version)]
#[command(about = "Convert a TIFF image into per-channel CSV (written to FILE.csv)")]
struct Cli {
    /// TIFF image to convert
    file: PathBuf,

    /// How many bytes to read per sample ("auto" follows the image's bit depth)
    #[arg(long, value_enum, default_value = "16")]
    sample_width: WidthArg,

    /// Refuse images whose raster needs more than this many bytes
    #[arg(long, value_name = "BYTES")]
    max_memory: Option<u64>,

    /// Refuse images with more than this many pixels
    #[arg(long, value_name = "N")]
    max_pixels: Option<u64>,

    /// Refuse images wider than this
    #[arg(long, value_name = "PX")]
    max_width: Option<u64>,

    /// Refuse images taller than this
    #[arg(long, value_name = "PX")]
    max_height: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum WidthArg {
    Auto,
    #[value(name = "8")]
    Eight,
    #[value(name = "16")]
    Sixteen,
    #[value(name = "32")]
    ThirtyTwo,
}

impl From<WidthArg> for SampleWidth {
    fn from(arg: WidthArg) -> Self {
        match arg {
            WidthArg::Auto => SampleWidth::Auto,
            WidthArg::Eight => SampleWidth::Bits8,
            WidthArg::Sixteen => SampleWidth::Bits16,
            WidthArg::ThirtyTwo => SampleWidth::Bits32,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
        Err(e) => e.exit(),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tiffcsv=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let output = tiffcsv::csv_path_for(&cli.file);
    let limits = Limits {
        max_width: cli.max_width,
        max_height: cli.max_height,
        max_pixels: cli.max_pixels,
        max_memory_bytes: cli.max_memory,
    };

    let image = DecodeRequest::new(&cli.file)
        .with_limits(&limits)
        .decode(Unstoppable)?;

    println!(
        "convert {} -> {} size={}x{} {}bit({})",
        cli.file.display(),
        output.display(),
        image.width,
        image.height,
        image.bits_per_sample,
        image.samples_per_pixel
    );

    tiffcsv::write_csv(&output, &image, cli.sample_width.into(), Unstoppable)
        .with_context(|| format!("converting {}", cli.file.display()))?;
    Ok(())
}
