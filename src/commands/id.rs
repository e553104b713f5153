//! ID register command

use nandbang_core::nand::{manufacturer_name, IdMatch};

use crate::programmers::Session;

/// Read the ID register and print it
pub fn run_id(flash: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
    let result = flash.read_id()?;
    let id = result.actual();

    println!("ID register:  {}", id);
    println!(
        "Manufacturer: {} (0x{:02X})",
        manufacturer_name(id.manufacturer()),
        id.manufacturer()
    );
    println!("Device code:  0x{:02X}", id.device());
    println!(
        "Organisation: {} B pages, {} B spare, {} KiB blocks",
        id.page_size_hint(),
        id.page_size_hint() / 512 * id.spare_per_512_hint(),
        id.block_size_hint() / 1024
    );

    match result {
        IdMatch::Match(_) => println!("Matches profile {}", flash.config().expected_id),
        IdMatch::Mismatch { expected, .. } => {
            println!("Does NOT match profile (expected {})", expected)
        }
    }
    Ok(())
}
