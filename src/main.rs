//! Main entry point for the zipgrab CLI.
//!
//! Thin wrapper around the library: parse arguments, open the archive,
//! either list its contents or locate-and-extract one entry. All errors
//! are caught here, logged with the entity name and failure description,
//! and converted to a non-zero exit status.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;

use zipgrab::{Cli, ReadAt, ZipArchive};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        log::error!("{}: {e:#}", cli.archive.display());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let archive = ZipArchive::open(&cli.archive)?;

    // List mode: display archive contents and exit.
    if cli.list || cli.verbose {
        list_entries(&archive, cli.verbose);
        return Ok(());
    }

    let name = cli.entry.as_deref().context("missing entry name")?;
    let dest = resolve_dest(cli, name);

    if !cli.is_quiet() {
        println!("  extracting: {name}");
    }

    let start = Instant::now();
    let entry = archive.locate(name)?;
    let written = archive.extract(entry, &dest)?;
    let elapsed = start.elapsed();

    log::info!(
        "extracted {name} ({}) to {} in {elapsed:.2?}",
        format_size(written),
        dest.display()
    );

    Ok(())
}

/// Destination path: explicit argument, or the entry's base name in the
/// current directory.
fn resolve_dest(cli: &Cli, name: &str) -> PathBuf {
    if let Some(ref dest) = cli.dest {
        return dest.clone();
    }
    let base = Path::new(name)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| name.to_string());
    PathBuf::from(base)
}

/// Print archive contents, either names only or a detailed table with
/// sizes, compression ratio, and timestamps.
fn list_entries<R: ReadAt>(archive: &ZipArchive<R>, verbose: bool) {
    if verbose {
        println!(
            "{:>10}  {:>10}  {:>5}  {:>10}  {:>5}  Name",
            "Length", "Size", "Cmpr", "Date", "Time"
        );
        println!("{}", "-".repeat(70));
    }

    for entry in archive.entries() {
        if !verbose {
            println!("{}", entry.name);
            continue;
        }

        let (year, month, day) = entry.mod_date();
        let (hour, minute, _second) = entry.mod_time();
        let ratio = if entry.uncompressed_size > 0 {
            100 - (entry.compressed_size * 100 / entry.uncompressed_size)
        } else {
            0
        };

        println!(
            "{:>10}  {:>10}  {:>4}%  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
            entry.uncompressed_size,
            entry.compressed_size,
            ratio,
            year,
            month,
            day,
            hour,
            minute,
            entry.name
        );
    }
}

/// Format a byte count with the appropriate unit.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
