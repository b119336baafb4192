//! # SteganoHuff Command-Line Tool
//!
//! Hides Huffman-compressed text inside lossless images and recovers it.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin steganohuff -- encode --cover photo.png --output stego.png \
//!   --message "meet at dawn" --seed 1337
//! cargo run --bin steganohuff -- decode --image stego.png --key stego.png.key.json
//! cargo run --bin steganohuff -- capacity --cover photo.png
//! ```
//!
//! `encode` writes the stego image plus a key file holding the code table and
//! embedding mode. Both are needed by `decode`.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn, LevelFilter};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use steganohuff::common::config::{load_config, AppConfig};
use steganohuff::common::logging::init_logger;
use steganohuff::compression::deserialize_table;
use steganohuff::pipeline::image_io;
use steganohuff::processing::{self, steganography::HEADER_BITS};
use steganohuff::{decode_payload, encode_message, EmbedMode, StegoKey};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress a message and hide it in a cover image
    Encode(EncodeArgs),
    /// Recover a hidden message
    Decode(DecodeArgs),
    /// Show how many bits a cover image can hold
    Capacity {
        #[arg(long)]
        cover: PathBuf,
    },
}

#[derive(Args, Debug)]
struct EncodeArgs {
    /// Cover image (any readable format)
    #[arg(long)]
    cover: PathBuf,

    /// Stego image to write (PNG, BMP, TIFF, TGA or PNM)
    #[arg(short, long)]
    output: PathBuf,

    /// Message text
    #[arg(short, long, conflicts_with = "message_file")]
    message: Option<String>,

    /// Read the message bytes from a file
    #[arg(long)]
    message_file: Option<PathBuf>,

    /// Key file to write (defaults to `<output>.key.json`)
    #[arg(short, long)]
    key: Option<PathBuf>,

    /// Embed in raster order instead of shuffled order
    #[arg(long, conflicts_with = "seed")]
    sequential: bool,

    /// Shuffle seed
    #[arg(long)]
    seed: Option<u64>,

    /// Write encoding statistics as JSON
    #[arg(long)]
    stats_output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Stego image produced by `encode`
    #[arg(short, long)]
    image: PathBuf,

    /// Key file produced by `encode`
    #[arg(short, long)]
    key: PathBuf,

    /// Write the message bytes here instead of printing them
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config: AppConfig = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        config.logging.level_filter()
    };
    init_logger(level);

    match cli.command {
        Command::Encode(args) => run_encode(args, &config),
        Command::Decode(args) => run_decode(args),
        Command::Capacity { cover } => run_capacity(cover),
    }
}

fn resolve_mode(args: &EncodeArgs, config: &AppConfig) -> EmbedMode {
    if args.sequential {
        EmbedMode::Sequential
    } else if let Some(seed) = args.seed {
        EmbedMode::Shuffled { seed }
    } else {
        config.embedding.embed_mode()
    }
}

fn run_encode(args: EncodeArgs, config: &AppConfig) -> Result<()> {
    let plaintext = match (&args.message, &args.message_file) {
        (Some(text), None) => text.as_bytes().to_vec(),
        (None, Some(path)) => {
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
        }
        _ => bail!("provide either --message or --message-file"),
    };

    let mode = resolve_mode(&args, config);
    let cover = image_io::open_image(&args.cover)?;
    info!(
        "📷 Cover {} ({}x{}), mode {}",
        args.cover.display(),
        cover.width(),
        cover.height(),
        mode
    );

    let encoded = encode_message(&cover, &plaintext, mode)?;
    image_io::save_image(&encoded.stego, &args.output)?;

    let key_path = args
        .key
        .clone()
        .unwrap_or_else(|| StegoKey::default_path(&args.output));
    StegoKey::new(mode, encoded.stats.compressed_bits, &encoded.code_table).save(&key_path)?;

    let stats = &encoded.stats;
    info!(
        "✅ Hid {} bytes as {} bits ({:.1}% compression) in {}",
        stats.message_bytes,
        stats.compressed_bits,
        stats.compression_ratio() * 100.0,
        args.output.display()
    );
    info!("🔑 Key file written to {}", key_path.display());

    if let Some(path) = &args.stats_output {
        fs::write(path, serde_json::to_string_pretty(stats)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Statistics exported to {}", path.display());
    }

    Ok(())
}

fn run_decode(args: DecodeArgs) -> Result<()> {
    let key = StegoKey::load(&args.key)?;
    let table = deserialize_table(&key.code_table_bytes()?)?;
    let stego = image_io::open_image(&args.image)?;

    let bits = processing::extract(&stego, key.mode)?;
    if bits.len() != key.payload_bits {
        warn!(
            "Image declares {} payload bits but the key expects {}; wrong image or mode?",
            bits.len(),
            key.payload_bits
        );
    }

    let plaintext = decode_payload(&bits, &table)?;

    match &args.output {
        Some(path) => {
            fs::write(path, &plaintext)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("✅ Wrote {} bytes to {}", plaintext.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", String::from_utf8_lossy(&plaintext))?;
        }
    }

    Ok(())
}

fn run_capacity(cover: PathBuf) -> Result<()> {
    let image = image_io::open_image(&cover)?;
    let channels = processing::capacity(&image);
    let payload = processing::max_payload_bits(&image);

    println!("{}: {}x{}", cover.display(), image.width(), image.height());
    println!("writable channels: {}", channels);
    println!("header bits:       {}", HEADER_BITS);
    println!("max payload bits:  {} (~{} bytes uncompressed)", payload, payload / 8);

    Ok(())
}
