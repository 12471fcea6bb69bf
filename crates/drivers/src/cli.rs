use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use image_manager_domain::{DropEvent, ImageFormat, SortKey};

use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[command(
    name = "image-manager",
    version,
    about = "Upload, reorder and export image collections"
)]
pub struct Cli {
    /// TOML config file. Flags override its values.
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Debug logging. RUST_LOG takes precedence.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload images, apply edits and write the export archive.
    Export(ExportArgs),
    /// Upload images and print the resulting collection.
    List {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Interactive session reading commands from stdin.
    Shell { inputs: Vec<PathBuf> },
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Image files or folders to upload.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Move the image at FROM to TO. Moves run first, in the order given.
    #[arg(long = "move", value_name = "FROM:TO", value_parser = parse_move)]
    pub moves: Vec<DropEvent>,

    /// Delete the image at INDEX. Deletes run after moves, in the order given.
    #[arg(long = "delete", value_name = "INDEX")]
    pub deletes: Vec<usize>,

    /// Mark the image at INDEX as root once moves and deletes are applied.
    #[arg(long, value_name = "INDEX")]
    pub root: Option<usize>,

    /// Directory the archive is written to.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    #[arg(long, value_name = "NAME")]
    pub file_name: Option<String>,

    #[arg(long, value_parser = parse_format)]
    pub format: Option<ImageFormat>,

    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: Option<u8>,

    /// Scale factor applied to both dimensions.
    #[arg(long, value_name = "PERCENT", value_parser = clap::value_parser!(u8).range(1..=100))]
    pub ratio: Option<u8>,
}

impl ExportArgs {
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(file_name) = &self.file_name {
            config.archive_file_name = file_name.clone();
        }
        if let Some(format) = self.format {
            config.compression.format = format;
        }
        if let Some(quality) = self.quality {
            config.compression.quality = quality;
        }
        if let Some(ratio) = self.ratio {
            config.compression.ratio_percent = ratio;
        }
    }
}

pub fn parse_move(value: &str) -> Result<DropEvent, String> {
    let (from, to) = value
        .split_once(':')
        .ok_or_else(|| format!("expected FROM:TO, got {value}"))?;
    let index = |part: &str| {
        part.trim()
            .parse::<usize>()
            .map_err(|_| format!("invalid position in {value}"))
    };
    Ok(DropEvent {
        previous_index: index(from)?,
        current_index: index(to)?,
    })
}

pub fn parse_format(value: &str) -> Result<ImageFormat, String> {
    match value.to_ascii_lowercase().as_str() {
        "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
        "png" => Ok(ImageFormat::Png),
        "webp" => Ok(ImageFormat::Webp),
        "gif" => Ok(ImageFormat::Gif),
        "bmp" => Ok(ImageFormat::Bmp),
        "tiff" | "tif" => Ok(ImageFormat::Tiff),
        other => Err(format!("unsupported format: {other}")),
    }
}

pub fn parse_sort_key(value: &str) -> Result<SortKey, String> {
    match value {
        "ingestion" => Ok(SortKey::Ingestion),
        "file-name" | "name" => Ok(SortKey::FileName),
        other => Err(format!("unknown sort key: {other}")),
    }
}
