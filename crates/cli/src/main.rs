//! `zplc` — generate and deliver ZPL print jobs.
//!
//! Subcommands cover the delivery pipeline end to end: `convert` turns a
//! PNG into a printer download object, `inspect` examines a PNG's chunk
//! stream, `send` delivers any job file over active FTP, and `demo` renders
//! a sample label program.

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use zpl_courier_assets::png::{self, ChunkData};
use zpl_courier_assets::{Chunk, DownloadObject, Drive};
use zpl_courier_core::{EcLevel, Label, Orientation, Units};
use zpl_courier_ftp::{FtpClient, FtpConfig};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "zplc",
    version,
    about = "zpl-courier — generate ZPL label jobs and deliver them to Zebra printers over FTP"
)]
struct Cli {
    /// Output mode: "pretty" for terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Deliver a job file (ZPL or download object) to a printer over FTP.
    Send {
        /// Path of the file to deliver.
        file: PathBuf,
        /// Printer address (`IP`, `IP:PORT`, or hostname; port defaults to 21).
        #[arg(long)]
        host: String,
        /// FTP username.
        #[arg(long, default_value = "admin")]
        user: String,
        /// Remote file name for the `STOR` command. Derived from the local
        /// file name when omitted.
        #[arg(long)]
        name: Option<String>,
    },

    /// Convert a PNG image into a `~DY` download object.
    Convert {
        /// Path of the source PNG.
        image: PathBuf,
        /// Object name on the printer (1–8 alphanumeric characters).
        #[arg(long)]
        name: String,
        /// Target storage drive.
        #[arg(long, value_enum, default_value = "r")]
        drive: DriveArg,
        /// Write the command bytes here instead of stdout.
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// List a PNG's chunks with CRC verification results.
    Inspect {
        /// Path of the PNG to inspect.
        image: PathBuf,
    },

    /// Render a sample label program to stdout.
    Demo {
        /// Printer dot density.
        #[arg(long, default_value_t = 203)]
        dpi: u32,
        /// Unit system for the sample's coordinates.
        #[arg(long, value_enum, default_value = "dots")]
        units: UnitsArg,
    },
}

/// Drive letter choices for `convert`.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum DriveArg {
    /// Volatile RAM.
    R,
    /// Onboard flash.
    E,
    /// Memory card.
    B,
    /// USB storage.
    A,
}

impl From<DriveArg> for Drive {
    fn from(d: DriveArg) -> Self {
        match d {
            DriveArg::R => Drive::Ram,
            DriveArg::E => Drive::Flash,
            DriveArg::B => Drive::Card,
            DriveArg::A => Drive::Usb,
        }
    }
}

/// Unit choices for `demo`.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum UnitsArg {
    /// Device dots.
    Dots,
    /// Inches.
    Inches,
    /// Device-independent pixels (1/96 inch).
    Pixels,
}

impl From<UnitsArg> for Units {
    fn from(u: UnitsArg) -> Self {
        match u {
            UnitsArg::Dots => Units::Dots,
            UnitsArg::Inches => Units::Inches,
            UnitsArg::Pixels => Units::Pixels,
        }
    }
}

/// Output format for structured results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Pretty,
    Json,
}

impl Format {
    fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let format = Format::resolve_or_detect(cli.output.as_deref());

    match cli.cmd {
        Cmd::Send {
            file,
            host,
            user,
            name,
        } => cmd_send(&file, &host, &user, name.as_deref())?,
        Cmd::Convert {
            image,
            name,
            drive,
            out,
        } => cmd_convert(&image, &name, drive.into(), out.as_deref())?,
        Cmd::Inspect { image } => cmd_inspect(&image, format)?,
        Cmd::Demo { dpi, units } => cmd_demo(dpi, units.into())?,
    }

    Ok(())
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_send(file: &Path, host: &str, user: &str, name: Option<&str>) -> Result<()> {
    let data = fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let remote = match name {
        Some(n) => n.to_string(),
        None => derive_remote_name(file),
    };

    let mut client = FtpClient::connect(host, user, FtpConfig::new())
        .with_context(|| format!("connecting to {host}"))?;
    client
        .put_data(&remote, &data)
        .with_context(|| format!("uploading {remote}"))?;
    client.disconnect();

    println!("sent {} bytes to {host} as {remote}", data.len());
    Ok(())
}

fn cmd_convert(image: &Path, name: &str, drive: Drive, out: Option<&Path>) -> Result<()> {
    let bytes = fs::read(image).with_context(|| format!("reading {}", image.display()))?;
    let object = DownloadObject::png(drive, name, &bytes)
        .with_context(|| format!("converting {}", image.display()))?;
    let rendered = object.render()?;

    match out {
        Some(path) => {
            fs::write(path, &rendered).with_context(|| format!("writing {}", path.display()))?;
            eprintln!(
                "wrote {} bytes ({} byte payload) to {}",
                rendered.len(),
                object.payload_len(),
                path.display()
            );
        }
        None => io::stdout().write_all(&rendered)?,
    }
    Ok(())
}

fn cmd_inspect(image: &Path, format: Format) -> Result<()> {
    let bytes = fs::read(image).with_context(|| format!("reading {}", image.display()))?;
    let chunks = png::parse_bytes(&bytes)
        .with_context(|| format!("parsing {}", image.display()))?;

    match format {
        Format::Json => {
            let entries: Vec<serde_json::Value> = chunks.iter().map(chunk_json).collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Format::Pretty => {
            for chunk in &chunks {
                let crc = if chunk.crc_matched {
                    "crc ok".to_string()
                } else {
                    format!(
                        "CRC MISMATCH (stored {:08X}, computed {:08X})",
                        chunk.stored_crc, chunk.computed_crc
                    )
                };
                println!(
                    "{:<4} {:>8} bytes  {}{}",
                    chunk.chunk_type,
                    chunk.length,
                    crc,
                    describe_decoded(chunk)
                );
            }
        }
    }

    if chunks.iter().any(|c| !c.crc_matched) {
        eprintln!("error: one or more chunks failed CRC verification");
        process::exit(1);
    }
    Ok(())
}

fn cmd_demo(dpi: u32, units: Units) -> Result<()> {
    let mut label = Label::new(units, Some(dpi))?;
    let scale = match units {
        Units::Dots => 1.0,
        Units::Inches => 1.0 / f64::from(dpi),
        Units::Pixels => 96.0 / f64::from(dpi),
    };

    label.print_width(scale * 600.0)?;
    label.text(
        scale * 30.0,
        scale * 30.0,
        "ZPL COURIER",
        Orientation::Normal,
        None,
    )?;
    label.rectangle(
        scale * 20.0,
        scale * 20.0,
        scale * 560.0,
        scale * 360.0,
        scale * 3.0,
        Some(2),
    )?;
    label.line(scale * 20.0, scale * 90.0, scale * 580.0, scale * 90.0, scale * 2.0)?;
    label.qr(
        scale * 420.0,
        scale * 140.0,
        "https://example.com/a/1",
        EcLevel::Medium,
        scale * 140.0,
        false,
    )?;
    label.text(
        scale * 30.0,
        scale * 140.0,
        "SAMPLE",
        Orientation::Rotated,
        None,
    )?;

    println!("{}", label.render_string());
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Derive a printer-safe remote name from a local path: alphanumerics of
/// the file stem, uppercased, at most 8 characters.
fn derive_remote_name(file: &Path) -> String {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let cleaned: String = stem
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .take(8)
        .collect();
    if cleaned.is_empty() {
        "JOB".to_string()
    } else {
        cleaned
    }
}

fn chunk_json(chunk: &Chunk) -> serde_json::Value {
    serde_json::json!({
        "type": chunk.chunk_type,
        "length": chunk.length,
        "crcMatched": chunk.crc_matched,
        "storedCrc": format!("{:08X}", chunk.stored_crc),
        "computedCrc": format!("{:08X}", chunk.computed_crc),
        "ancillary": chunk.ancillary,
        "private": chunk.private,
        "safeToCopy": chunk.safe_to_copy,
        "decoded": chunk.decoded.as_ref().map(decoded_json),
    })
}

fn decoded_json(decoded: &ChunkData) -> serde_json::Value {
    match decoded {
        ChunkData::ImageHeader {
            width,
            height,
            bit_depth,
            color_type,
            compression,
            filter,
            interlace,
        } => serde_json::json!({
            "width": width,
            "height": height,
            "bitDepth": bit_depth,
            "colorType": color_type,
            "compression": compression,
            "filter": filter,
            "interlace": interlace,
        }),
        ChunkData::Palette(entries) => serde_json::json!({ "entries": entries.len() }),
        ChunkData::PhysicalDimensions {
            x_pixels_per_unit,
            y_pixels_per_unit,
            unit,
        } => serde_json::json!({
            "xPixelsPerUnit": x_pixels_per_unit,
            "yPixelsPerUnit": y_pixels_per_unit,
            "unit": unit,
        }),
        ChunkData::SrgbIntent(intent) => serde_json::json!({ "renderingIntent": intent }),
        ChunkData::Gamma(gamma) => serde_json::json!({ "gamma": gamma }),
        ChunkData::IccProfile {
            name,
            compression_method,
            compressed_profile,
        } => serde_json::json!({
            "profileName": name,
            "compressionMethod": compression_method,
            // Left compressed: inflating embedded profiles is out of scope.
            "compressedBytes": compressed_profile.len(),
        }),
    }
}

fn describe_decoded(chunk: &Chunk) -> String {
    match &chunk.decoded {
        Some(ChunkData::ImageHeader {
            width,
            height,
            bit_depth,
            color_type,
            ..
        }) => format!("  {width}x{height}, {bit_depth}-bit, color type {color_type}"),
        Some(ChunkData::Palette(entries)) => format!("  {} entries", entries.len()),
        Some(ChunkData::PhysicalDimensions {
            x_pixels_per_unit,
            y_pixels_per_unit,
            ..
        }) => format!("  {x_pixels_per_unit}x{y_pixels_per_unit} px/unit"),
        Some(ChunkData::SrgbIntent(intent)) => format!("  rendering intent {intent}"),
        Some(ChunkData::Gamma(gamma)) => format!("  gamma {gamma}"),
        Some(ChunkData::IccProfile { name, .. }) => {
            format!("  profile \"{name}\" (compressed, not decoded)")
        }
        None => String::new(),
    }
}
