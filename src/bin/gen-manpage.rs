//! Man page generator for spiflash-fs
//!
//! Writes `spiflash-fs.1` plus one page per subcommand
//! (`spiflash-fs-read.1`, `spiflash-fs-trace-write.1`, ...).
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]

use clap::{Command, CommandFactory};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[path = "../cli.rs"]
mod cli;

const FILES_SECTION: &str = "\
Files:
  The chip image (--image, default flash.img) holds the raw contents of the
  emulated flash. A missing image reads as an erased chip. The image is
  written back after write, erase and trace.

  The configuration file (--config) is TOML with [region] start/end,
  [geometry] erase_block/log_block/log_page/write_page/address_width and the
  optional [bus], [opcodes] and [busy] tables. Sizes may be integers, hex
  strings (\"0x1000\") or sizes (\"64 KiB\"). Without a file a 16 MiB region
  with 64 KiB erase blocks is used.";

fn render_pages(cmd: &Command, dir: &Path, written: &mut Vec<PathBuf>) -> io::Result<()> {
    let stem = cmd.get_display_name().unwrap_or_else(|| cmd.get_name());
    let path = dir.join(format!("{}.1", stem));

    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd.clone()).render(&mut buffer)?;
    fs::write(&path, buffer)?;
    written.push(path);

    for sub in cmd.get_subcommands() {
        if sub.get_name() == "help" || sub.is_hide_set() {
            continue;
        }
        render_pages(sub, dir, written)?;
    }
    Ok(())
}

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    // Default to ./man directory
    let output_dir = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        PathBuf::from("man")
    };

    fs::create_dir_all(&output_dir)?;

    // Building assigns subcommands their "spiflash-fs-<sub>" display names
    let mut cmd = cli::Cli::command().after_long_help(FILES_SECTION);
    cmd.build();

    let mut written = Vec::new();
    render_pages(&cmd, &output_dir, &mut written)?;

    for path in &written {
        println!("Man page generated at: {}", path.display());
    }
    if let Some(main_page) = written.first() {
        println!("\nTo view the man page:");
        println!("  man -l {}", main_page.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_page_per_subcommand() {
        let dir = std::env::temp_dir().join(format!("spiflash-fs-man-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let mut cmd = cli::Cli::command().after_long_help(FILES_SECTION);
        cmd.build();
        let mut written = Vec::new();
        render_pages(&cmd, &dir, &mut written).unwrap();

        for page in ["spiflash-fs.1", "spiflash-fs-read.1", "spiflash-fs-trace-write.1"] {
            assert!(dir.join(page).exists(), "{} missing", page);
        }
        assert!(!dir.join("spiflash-fs-help.1").exists());
        let main_page = fs::read_to_string(dir.join("spiflash-fs.1")).unwrap();
        assert!(main_page.contains("flash.img"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
