//! Status register command

use crate::programmers::Session;

/// Read the status register and print it decoded
pub fn run_status(flash: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
    let status = flash.read_status()?;
    println!("Status register: 0x{:02X}", status.bits());
    println!(
        "  bit 0 pass/fail:      {}",
        if status.failed() { "fail" } else { "pass" }
    );
    println!(
        "  bit 6 ready/busy:     {}",
        if status.is_ready() { "ready" } else { "busy" }
    );
    println!(
        "  bit 7 write protect:  {}",
        if status.is_write_protected() {
            "protected"
        } else {
            "not protected"
        }
    );
    Ok(())
}
