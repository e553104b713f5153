//! CLI argument parsing

use crate::programmers;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse a USB ID given in hex, with or without 0x
fn parse_usb_id(s: &str) -> Result<u16, String> {
    let hex = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u16::from_str_radix(hex, 16).map_err(|e| format!("Invalid USB ID: {}", e))
}

/// Generate dynamic help text for the programmer argument
fn programmer_help() -> String {
    format!(
        "Programmer to use, as name[:key=value,...] [available: {}]",
        programmers::programmer_names_short()
    )
}

#[derive(Parser)]
#[command(name = "nandbang")]
#[command(author, version, long_about = None)]
#[command(about = "Raw NAND flash reader over a bit-banged FT2232H")]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Session options shared across device commands
#[derive(clap::Args, Debug, Clone)]
pub struct SessionArgs {
    #[arg(short, long, default_value = "ftdi", help = programmer_help())]
    pub programmer: String,

    /// NAND profile file (TOML); defaults to the built-in H27U4G8F2D
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Give up waiting for R/B after this many polls (default: wait forever)
    #[arg(long, value_name = "POLLS")]
    pub busy_timeout: Option<u32>,

    /// Issue a Reset command after bringing the bus up
    #[arg(long)]
    pub reset: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read and check the ID register
    Id {
        #[command(flatten)]
        session: SessionArgs,
    },

    /// Read and decode the status register
    Status {
        #[command(flatten)]
        session: SessionArgs,
    },

    /// Dump pages (data + spare) to a file
    Dump {
        #[command(flatten)]
        session: SessionArgs,

        /// Output file path
        #[arg(short, long, default_value = nandbang_core::dump::DEFAULT_DUMP_FILE)]
        output: PathBuf,

        /// First page to read
        #[arg(long, default_value = "0", value_parser = parse_hex_u32)]
        start_page: u32,

        /// Number of pages to read (default: up to the end of the device)
        #[arg(long, value_parser = parse_hex_u32)]
        pages: Option<u32>,

        /// Dump even if the ID register does not match the profile
        #[arg(long)]
        force: bool,
    },

    /// Erase blocks
    Erase {
        #[command(flatten)]
        session: SessionArgs,

        /// First block to erase
        #[arg(short, long, value_parser = parse_hex_u32)]
        block: u32,

        /// Number of blocks to erase
        #[arg(short, long, default_value = "1", value_parser = parse_hex_u32)]
        count: u32,

        /// Erase even if the ID register does not match the profile
        #[arg(long)]
        force: bool,
    },

    /// Walk every pin for visual inspection, then read both buses back
    Selftest {
        #[command(flatten)]
        session: SessionArgs,

        /// Time each step is held, in milliseconds
        #[arg(long, default_value = "1000")]
        step_ms: u32,
    },

    /// List connected FT2232H adapters
    List {
        /// USB vendor ID (hex)
        #[arg(long, default_value = "0403", value_parser = parse_usb_id)]
        vid: u16,

        /// USB product ID (hex)
        #[arg(long, default_value = "6010", value_parser = parse_usb_id)]
        pid: u16,
    },

    /// List available programmers
    ListProgrammers,
}
