//! Page dump command

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use indicatif::ProgressBar;
use nandbang_core::dump::dump_pages;
use nandbang_core::nand::Geometry;

use super::{check_id, create_progress_bar_style};
use crate::programmers::Session;

/// Number of pages to dump, checked against the device before anything
/// is written
fn page_count(geometry: &Geometry, start_page: u32, pages: Option<u32>) -> Result<u32, String> {
    let total = geometry.total_pages();
    if start_page >= total {
        return Err(format!(
            "Start page {} is beyond the last page ({})",
            start_page,
            total.saturating_sub(1)
        ));
    }
    let count = pages.unwrap_or(total - start_page);
    if count == 0 || start_page.checked_add(count).map_or(true, |end| end > total) {
        return Err(format!(
            "Pages {}..{} are outside the device ({} pages)",
            start_page,
            start_page as u64 + count as u64,
            total
        ));
    }
    Ok(count)
}

/// Dump `pages` pages starting at `start_page` into `output`
///
/// Without `pages`, dumps up to the last page of the device.
pub fn run_dump(
    flash: &mut Session,
    output: &Path,
    start_page: u32,
    pages: Option<u32>,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    check_id(flash, force)?;

    let geometry = *flash.geometry();
    let count = page_count(&geometry, start_page, pages)?;
    let total_bytes = count as u64 * geometry.page_bytes() as u64;

    println!(
        "Dumping {} pages ({} bytes) from page {} to {}",
        count,
        total_bytes,
        start_page,
        output.display()
    );

    let file = File::create(output)?;
    let mut sink = BufWriter::new(file);

    let pb = ProgressBar::new(total_bytes);
    pb.set_style(create_progress_bar_style("{bytes}/{total_bytes} ({bytes_per_sec})")?);

    let result = dump_pages(flash, start_page, count, &mut sink, &mut |_page, written| {
        pb.set_position(written)
    });

    match result {
        Ok(written) => {
            pb.finish_with_message("done");
            println!("Wrote {} bytes to {}", written, output.display());
            Ok(())
        }
        Err(e) => {
            pb.abandon();
            Err(e.into())
        }
    }
}
