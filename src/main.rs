//! VFX CLI - Command-line tool for browsing and extracting Metro VFX archives.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use vfx::archive::PATH_SEPARATOR;
use vfx::prelude::*;

/// VFX - Metro archive extraction tool
#[derive(Parser)]
#[command(name = "vfx")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show index header and package table
    Info {
        /// Path to the VFX index file
        #[arg(short, long, env = "VFX_INDEX")]
        index: PathBuf,
    },

    /// List archive contents
    List {
        /// Path to the VFX index file
        #[arg(short, long, env = "VFX_INDEX")]
        index: PathBuf,

        /// Folder to list (backslash-separated, defaults to root)
        #[arg(long)]
        folder: Option<String>,

        /// Filter pattern (glob-style) on full paths
        #[arg(short, long)]
        filter: Option<String>,

        /// Show sizes and packages
        #[arg(short, long)]
        detailed: bool,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract files to a directory
    Extract {
        /// Path to the VFX index file
        #[arg(short, long, env = "VFX_INDEX")]
        index: PathBuf,

        /// Output directory
        #[arg(short, long, env = "OUTPUT_FOLDER")]
        output: PathBuf,

        /// Folder to extract (backslash-separated, defaults to root)
        #[arg(long)]
        folder: Option<String>,

        /// Only extract files whose names end with this suffix
        #[arg(short, long)]
        ext: Option<String>,
    },

    /// Write one file to stdout
    Cat {
        /// Path to the VFX index file
        #[arg(short, long, env = "VFX_INDEX")]
        index: PathBuf,

        /// File path inside the archive
        #[arg(short, long)]
        path: String,

        /// Byte offset into the file
        #[arg(long)]
        offset: Option<usize>,

        /// Number of bytes to write
        #[arg(long)]
        length: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Info { index } => cmd_info(&index)?,
        Commands::List {
            index,
            folder,
            filter,
            detailed,
            json,
        } => cmd_list(&index, folder.as_deref(), filter.as_deref(), detailed, json)?,
        Commands::Extract {
            index,
            output,
            folder,
            ext,
        } => cmd_extract(&index, &output, folder.as_deref(), ext.as_deref())?,
        Commands::Cat {
            index,
            path,
            offset,
            length,
        } => cmd_cat(&index, &path, SubRange { offset, length })?,
    }

    Ok(())
}

fn open_archive(path: &Path) -> Result<VfxArchive> {
    VfxArchive::open(path).with_context(|| format!("Failed to open VFX index {}", path.display()))
}

fn resolve_folder<'a>(archive: &'a VfxArchive, folder: Option<&str>) -> Result<&'a Entry> {
    match folder {
        Some(path) => archive
            .folder(path, None)
            .with_context(|| format!("Folder not found: {}", path)),
        None => Ok(archive.root()),
    }
}

fn cmd_info(index: &Path) -> Result<()> {
    let archive = open_archive(index)?;

    let files = archive.entries().iter().filter(|e| e.is_file()).count();

    println!("Index:           {}", archive.name());
    println!("Content version: {}", archive.content_version());
    println!("GUID:            {}", archive.guid());
    println!("Reserved:        {:#010x}", archive.reserved());
    println!(
        "Entries:         {} ({} files, {} folders)",
        archive.entry_count(),
        files,
        archive.folders().len()
    );
    println!("\nPackages:");
    for (i, package) in archive.packages().iter().enumerate() {
        println!("  [{}] {} (chunk {})", i, package.name, package.chunk);
        if !package.levels.is_empty() {
            println!("      levels: {}", package.levels.join(", "));
        }
    }

    Ok(())
}

fn cmd_list(
    index: &Path,
    folder: Option<&str>,
    filter: Option<&str>,
    detailed: bool,
    json: bool,
) -> Result<()> {
    let archive = open_archive(index)?;
    let root = resolve_folder(&archive, folder)?;

    let pattern = filter
        .map(glob::Pattern::new)
        .transpose()
        .context("Invalid filter pattern")?;

    let mut count = 0;
    let mut listed = Vec::new();
    for (_, entry) in archive.walk(root.index) {
        let path = archive.entry_path(entry.index).unwrap_or_default();
        if let Some(pattern) = &pattern {
            if !pattern.matches(&path) {
                continue;
            }
        }

        count += 1;
        if json {
            listed.push(serde_json::json!({ "path": path, "entry": entry }));
            continue;
        }

        if detailed {
            match entry.kind {
                EntryKind::File {
                    package,
                    size_uncompressed,
                    size_compressed,
                    ..
                } => println!(
                    "{:>12} {:>12} {:>3} {}",
                    size_compressed, size_uncompressed, package, path
                ),
                EntryKind::Folder { num_files, .. } => {
                    println!("{:>12} {:>12} {:>3} {}\\", "<dir>", num_files, "-", path)
                }
            }
        } else if entry.is_folder() {
            println!("{}\\", path);
        } else {
            println!("{}", path);
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&listed)?);
    } else {
        println!("\nTotal: {} entries", count);
    }

    Ok(())
}

fn cmd_extract(index: &Path, output: &Path, folder: Option<&str>, ext: Option<&str>) -> Result<()> {
    println!("Opening VFX index: {}", index.display());

    let start = Instant::now();
    let archive = open_archive(index)?;
    println!("Loaded {} entries in {:?}", archive.entry_count(), start.elapsed());

    let root = resolve_folder(&archive, folder)?;
    let indices = archive.find_files(root.index, ext.unwrap_or(""), true);

    println!("Extracting {} files...", indices.len());

    let pb = ProgressBar::new(indices.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    fs::create_dir_all(output)?;

    let start = Instant::now();
    let mut extracted = 0;
    let mut errors = 0;

    for &idx in &indices {
        let name = archive.entry_path(idx).unwrap_or_default();
        let Some(output_path) = safe_output_path(output, &name) else {
            pb.suspend(|| eprintln!("Skipping unsafe path: {}", name));
            errors += 1;
            pb.inc(1);
            continue;
        };

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }

        match archive.extract(idx, SubRange::ALL) {
            Ok(view) => {
                fs::write(&output_path, view.as_slice())
                    .with_context(|| format!("Failed to write {}", output_path.display()))?;
                extracted += 1;
            }
            Err(e) => {
                pb.suspend(|| eprintln!("Error extracting {}: {}", name, e));
                errors += 1;
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");
    println!(
        "Extracted {} files in {:?} ({} errors)",
        extracted,
        start.elapsed(),
        errors
    );

    Ok(())
}

/// Map an archive path onto `output`, refusing names that would escape it.
fn safe_output_path(output: &Path, archive_path: &str) -> Option<PathBuf> {
    let mut path = output.to_path_buf();
    for segment in archive_path.split(PATH_SEPARATOR) {
        if segment.is_empty()
            || segment == "."
            || segment == ".."
            || segment.contains(['/', ':', '\0'])
        {
            return None;
        }
        path.push(segment);
    }

    path.starts_with(output).then_some(path)
}

fn cmd_cat(index: &Path, path: &str, range: SubRange) -> Result<()> {
    let archive = open_archive(index)?;

    let idx = archive
        .find_file(path, None)
        .with_context(|| format!("File not found: {}", path))?;
    let view = archive
        .extract(idx, range)
        .with_context(|| format!("Failed to extract {}", path))?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(view.as_slice())?;
    stdout.flush()?;

    Ok(())
}
