//! CLI command implementations
//!
//! Every device command takes an open session and leaves closing it to
//! the caller.

pub mod dump;
pub mod erase;
pub mod id;
pub mod list;
pub mod selftest;
pub mod status;

use indicatif::ProgressStyle;
use nandbang_core::nand::IdMatch;

use crate::programmers::Session;

/// Read the ID register and refuse to continue on a mismatch unless forced
fn check_id(flash: &mut Session, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    match flash.read_id()? {
        IdMatch::Match(id) => {
            log::info!("ID register: {}", id);
            Ok(())
        }
        IdMatch::Mismatch { expected, actual } if force => {
            log::warn!(
                "ID register {} does not match {}, continuing (--force)",
                actual,
                expected
            );
            Ok(())
        }
        IdMatch::Mismatch { expected, actual } => Err(format!(
            "ID register {} does not match expected {} (use --force to continue anyway)",
            actual, expected
        )
        .into()),
    }
}

fn create_progress_bar_style(unit: &str) -> Result<ProgressStyle, Box<dyn std::error::Error>> {
    Ok(ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {} ({{eta}})",
            unit
        ))?
        .progress_chars("#>-"))
}
