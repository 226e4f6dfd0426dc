//! Command-line interface implementation

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use image::RgbaImage;

use crate::address::BitAddress;
use crate::arranger::Arranger;
use crate::codec::{Codec, CodecSpec, ColorType};
use crate::color::ColorModel;
use crate::datafile::DataFile;
use crate::error::GfxError;
use crate::palette::Palette;
use crate::pixels::{DirectPixels, IndexedPixels, PixelBuffer};

/// Exit codes
const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_INVALID_ARGS: u8 = 2;

/// Romgfx - decode and encode retro-console graphics embedded in binary ROM images
#[derive(Parser)]
#[command(name = "rgx")]
#[command(about = "Romgfx - decode and encode retro-console graphics in binary ROM images")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode a region of a binary file to PNG
    Decode {
        /// Input binary file (ROM or disk image)
        input: PathBuf,

        /// Output PNG path. Defaults to {input}.png
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Codec: a built-in name (see `rgx formats`) or a JSON descriptor path
        #[arg(short, long)]
        format: String,

        /// Region start as BYTE or BYTE:BIT (decimal or 0x-prefixed)
        #[arg(long, default_value = "0")]
        offset: String,

        /// Grid width in elements
        #[arg(long, default_value = "1")]
        cols: u32,

        /// Grid height in elements
        #[arg(long, default_value = "1")]
        rows: u32,

        /// Palette JSON path. Defaults to a grayscale ramp covering the codec depth
        #[arg(short, long)]
        palette: Option<PathBuf>,
    },

    /// Encode a PNG back into a region of a binary file
    Encode {
        /// Binary file to write into (modified in place)
        input: PathBuf,

        /// Source PNG whose size must match the arranger extents
        image: PathBuf,

        /// Codec: a built-in name (see `rgx formats`) or a JSON descriptor path
        #[arg(short, long)]
        format: String,

        /// Region start as BYTE or BYTE:BIT (decimal or 0x-prefixed)
        #[arg(long, default_value = "0")]
        offset: String,

        /// Grid width in elements
        #[arg(long, default_value = "1")]
        cols: u32,

        /// Grid height in elements
        #[arg(long, default_value = "1")]
        rows: u32,

        /// Palette JSON path. Defaults to a grayscale ramp covering the codec depth
        #[arg(short, long)]
        palette: Option<PathBuf>,
    },

    /// List built-in format names
    Formats,
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Decode {
            input,
            output,
            format,
            offset,
            cols,
            rows,
            palette,
        } => run_decode(&input, output.as_deref(), &format, &offset, cols, rows, palette.as_deref()),
        Commands::Encode {
            input,
            image,
            format,
            offset,
            cols,
            rows,
            palette,
        } => run_encode(&input, &image, &format, &offset, cols, rows, palette.as_deref()),
        Commands::Formats => {
            for name in CodecSpec::builtin_names() {
                println!("{}", name);
            }
            ExitCode::from(EXIT_SUCCESS)
        }
    }
}

fn run_decode(
    input: &Path,
    output: Option<&Path>,
    format: &str,
    offset: &str,
    cols: u32,
    rows: u32,
    palette: Option<&Path>,
) -> ExitCode {
    let arranger = match open_arranger(input, format, offset, cols, rows, palette) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let (image, warnings) = arranger.render();
    for warning in &warnings {
        eprintln!("Warning: {}", warning.message);
    }

    let output_path = match output {
        Some(path) => path.to_path_buf(),
        None => {
            let mut path = input.to_path_buf();
            path.set_extension("png");
            path
        }
    };

    if let Err(e) = image.save(&output_path) {
        eprintln!("Error: Cannot write '{}': {}", output_path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    println!(
        "Decoded {}x{} pixels to {}",
        image.width(),
        image.height(),
        output_path.display()
    );
    ExitCode::from(EXIT_SUCCESS)
}

fn run_encode(
    input: &Path,
    image_path: &Path,
    format: &str,
    offset: &str,
    cols: u32,
    rows: u32,
    palette: Option<&Path>,
) -> ExitCode {
    let arranger = match open_arranger(input, format, offset, cols, rows, palette) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let source = match image::open(image_path) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            eprintln!("Error: Cannot open image '{}': {}", image_path.display(), e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    if source.width() != arranger.pixel_width() || source.height() != arranger.pixel_height() {
        eprintln!(
            "Error: image is {}x{} but the arranger is {}x{}",
            source.width(),
            source.height(),
            arranger.pixel_width(),
            arranger.pixel_height()
        );
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    if let Err(e) = encode_tiles(&arranger, &source) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }

    println!(
        "Encoded {}x{} pixels into {}",
        source.width(),
        source.height(),
        input.display()
    );
    ExitCode::from(EXIT_SUCCESS)
}

/// Encode every element of `arranger` from its tile of `source`.
fn encode_tiles(arranger: &Arranger, source: &RgbaImage) -> Result<(), GfxError> {
    let (cols, rows) = arranger.grid_size();
    for row in 0..rows {
        for col in 0..cols {
            let element = arranger.element(col, row)?;
            let tile = crop_tile(source, element.x1(), element.y1(), element.width(), element.height());

            let buffer = match element.codec().color_type() {
                ColorType::Indexed => {
                    PixelBuffer::Indexed(IndexedPixels::from_rgba(&tile, element.palette())?)
                }
                ColorType::Direct => PixelBuffer::Direct(DirectPixels::from_rgba(&tile)),
            };
            element.encode(&buffer)?;
        }
    }
    Ok(())
}

fn crop_tile(source: &RgbaImage, x: u32, y: u32, width: u32, height: u32) -> RgbaImage {
    let mut tile = RgbaImage::new(width, height);
    for ty in 0..height {
        for tx in 0..width {
            tile.put_pixel(tx, ty, *source.get_pixel(x + tx, y + ty));
        }
    }
    tile
}

/// Open the binary file and lay a sequential arranger over it from the
/// CLI arguments. Errors are printed here; the caller just propagates the
/// exit code.
fn open_arranger(
    input: &Path,
    format: &str,
    offset: &str,
    cols: u32,
    rows: u32,
    palette: Option<&Path>,
) -> Result<Arranger, ExitCode> {
    let codec = match load_codec(format) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: Invalid format '{}': {}", format, e);
            return Err(ExitCode::from(EXIT_INVALID_ARGS));
        }
    };

    let address = match parse_offset(offset) {
        Some(a) => a,
        None => {
            eprintln!("Error: Invalid offset '{}', expected BYTE or BYTE:BIT", offset);
            return Err(ExitCode::from(EXIT_INVALID_ARGS));
        }
    };

    let palette = match load_palette(palette, &codec) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: Cannot load palette: {}", e);
            return Err(ExitCode::from(EXIT_INVALID_ARGS));
        }
    };

    let file = match DataFile::open(input.display().to_string(), input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: Cannot open input file '{}': {}", input.display(), e);
            return Err(ExitCode::from(EXIT_INVALID_ARGS));
        }
    };

    Arranger::sequential(
        input.display().to_string(),
        cols,
        rows,
        Rc::new(file),
        address,
        Rc::new(codec),
        Rc::new(palette),
    )
    .map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_ERROR)
    })
}

/// Resolve a built-in format name or read a JSON descriptor file.
fn load_codec(format: &str) -> Result<Codec, GfxError> {
    let spec = match CodecSpec::builtin(format) {
        Some(spec) => spec,
        None => {
            let text = std::fs::read_to_string(format)?;
            serde_json::from_str(&text).map_err(|e| {
                GfxError::DimensionMismatch(format!("malformed codec descriptor: {}", e))
            })?
        }
    };
    spec.build()
}

fn load_palette(path: Option<&Path>, codec: &Codec) -> Result<Palette, GfxError> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            serde_json::from_str(&text)
                .map_err(|e| GfxError::DimensionMismatch(format!("malformed palette: {}", e)))
        }
        None => Ok(Palette::grayscale(
            "gray",
            ColorModel::Rgb15,
            codec.color_depth().clamp(1, 8),
        )),
    }
}

/// Parse "BYTE" or "BYTE:BIT", each decimal or 0x-prefixed hex.
fn parse_offset(s: &str) -> Option<BitAddress> {
    let (byte_part, bit_part) = match s.split_once(':') {
        Some((b, bit)) => (b, Some(bit)),
        None => (s, None),
    };
    let byte = parse_number(byte_part)?;
    let bit = match bit_part {
        Some(text) => {
            let bit = parse_number(text)?;
            if bit > 7 {
                return None;
            }
            bit
        }
        None => 0,
    };
    Some(BitAddress::new(byte, bit))
}

fn parse_number(s: &str) -> Option<u64> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}
