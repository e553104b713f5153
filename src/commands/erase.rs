//! Block erase command

use indicatif::ProgressBar;

use super::{check_id, create_progress_bar_style};
use crate::programmers::Session;

/// Erase `count` blocks starting at `block`
pub fn run_erase(
    flash: &mut Session,
    block: u32,
    count: u32,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    check_id(flash, force)?;

    let blocks = flash.geometry().blocks;
    if count == 0 || block.checked_add(count).map_or(true, |end| end > blocks) {
        return Err(format!(
            "Blocks {}..{} are outside the device ({} blocks)",
            block,
            block as u64 + count as u64,
            blocks
        )
        .into());
    }

    println!("Erasing {} block(s) starting at block {}", count, block);

    let pb = ProgressBar::new(count as u64);
    pb.set_style(create_progress_bar_style("{pos}/{len} blocks")?);

    let result = flash.erase_blocks(block, count, &mut |_| pb.inc(1));

    match result {
        Ok(()) => {
            pb.finish_with_message("done");
            println!("Erase complete");
            Ok(())
        }
        Err(e) => {
            pb.abandon();
            Err(e.into())
        }
    }
}
