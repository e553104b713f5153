//! nandbang - Raw NAND flash reader over a bit-banged FT2232H
//!
//! The FT2232H's two channels are run in asynchronous bitbang mode: channel
//! A carries the NAND I/O bus, channel B the control signals. Every NAND bus
//! cycle (Command Input, Address Input, Data Output) is reproduced with
//! individual pin writes, which is slow but needs nothing beyond a few
//! wires between the adapter and the chip.
//!
//! Supported operations: read ID, read status, dump pages, erase blocks,
//! and a pin walk self-test for checking the wiring.

mod cli;
mod commands;
mod programmers;

use clap::Parser;
use cli::{Cli, Commands};

/// Log level selected by -v / -vv; `None` keeps RUST_LOG (default info)
fn verbosity_filter(verbose: u8) -> Option<log::LevelFilter> {
    match verbose {
        0 => None,
        1 => Some(log::LevelFilter::Debug),
        _ => Some(log::LevelFilter::Trace),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logger
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = verbosity_filter(cli.verbose) {
        logger.filter_level(level);
    }
    logger.init();

    match cli.command {
        Commands::Id { session } => {
            let mut flash = programmers::open_session(&session)?;
            commands::id::run_id(&mut flash)?;
            flash.close()?;
            Ok(())
        }
        Commands::Status { session } => {
            let mut flash = programmers::open_session(&session)?;
            commands::status::run_status(&mut flash)?;
            flash.close()?;
            Ok(())
        }
        Commands::Dump {
            session,
            output,
            start_page,
            pages,
            force,
        } => {
            let mut flash = programmers::open_session(&session)?;
            commands::dump::run_dump(&mut flash, &output, start_page, pages, force)?;
            flash.close()?;
            Ok(())
        }
        Commands::Erase {
            session,
            block,
            count,
            force,
        } => {
            let mut flash = programmers::open_session(&session)?;
            commands::erase::run_erase(&mut flash, block, count, force)?;
            flash.close()?;
            Ok(())
        }
        Commands::Selftest { session, step_ms } => {
            let mut flash = programmers::open_session(&session)?;
            commands::selftest::run_selftest(&mut flash, step_ms)?;
            flash.close()?;
            Ok(())
        }
        Commands::List { vid, pid } => commands::list::list_devices(vid, pid),
        Commands::ListProgrammers => {
            commands::list::list_programmers();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_filter() {
        assert_eq!(verbosity_filter(0), None);
        assert_eq!(verbosity_filter(1), Some(log::LevelFilter::Debug));
        assert_eq!(verbosity_filter(2), Some(log::LevelFilter::Trace));
        assert_eq!(verbosity_filter(5), Some(log::LevelFilter::Trace));

        let cli = Cli::try_parse_from(["nandbang", "-v", "id", "-p", "dummy"]).unwrap();
        assert_eq!(verbosity_filter(cli.verbose), Some(log::LevelFilter::Debug));
    }
}
