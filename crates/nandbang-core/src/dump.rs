//! Page dump driver
//!
//! Reads a range of pages in ascending address order and streams every
//! page (data + spare) to a sink. The output is the raw concatenation of
//! the page buffers, without any header or ECC processing.

use std::io::Write;
use std::vec;

use crate::error::{Error, Result};
use crate::nand::NandFlash;
use crate::port::BitbangPort;

/// Default output file name
pub const DEFAULT_DUMP_FILE: &str = "flashdump.bin";

/// Pages in a full dump of the default device (64 pages x 4096 blocks)
pub const DEFAULT_DUMP_PAGES: u32 = 64 * 4096;

/// Dump `count` pages starting at page index `start_page` into `sink`
///
/// `on_page` is called after every page written, with the page index and
/// the number of bytes written so far. Returns the total number of bytes
/// written.
pub fn dump_pages<D, C, W>(
    flash: &mut NandFlash<D, C>,
    start_page: u32,
    count: u32,
    sink: &mut W,
    on_page: &mut dyn FnMut(u32, u64),
) -> Result<u64>
where
    D: BitbangPort,
    C: BitbangPort,
    W: Write + ?Sized,
{
    let end = start_page
        .checked_add(count)
        .filter(|&end| end <= flash.geometry().total_pages())
        .ok_or(Error::AddressOutOfBounds)?;

    let mut buf = vec![0u8; flash.geometry().page_bytes()];
    let mut written: u64 = 0;
    log::debug!(
        "dumping pages {}..{} ({} bytes each)",
        start_page,
        end,
        buf.len()
    );

    for page in start_page..end {
        let address = flash.page_address(page)?;
        flash.read_page_into(address, &mut buf)?;
        sink.write_all(&buf).map_err(|_| Error::IoError)?;
        written += buf.len() as u64;
        on_page(page, written);
    }

    sink.flush().map_err(|_| Error::IoError)?;
    Ok(written)
}
