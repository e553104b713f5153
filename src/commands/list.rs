//! List commands implementation

use crate::programmers::available_programmers;

/// List all supported programmers
pub fn list_programmers() {
    println!("Supported programmers:");
    println!();
    for p in available_programmers() {
        if p.aliases.is_empty() {
            println!("  {:8} - {}", p.name, p.description);
        } else {
            println!(
                "  {:8} - {} (aliases: {})",
                p.name,
                p.description,
                p.aliases.join(", ")
            );
        }
    }
}

/// List connected adapters with the given USB IDs
#[cfg(feature = "ftdi")]
pub fn list_devices(vid: u16, pid: u16) -> Result<(), Box<dyn std::error::Error>> {
    let devices = nandbang_ftdi::list_devices(vid, pid)?;
    if devices.is_empty() {
        println!("No adapters found with ID {:04X}:{:04X}", vid, pid);
        return Ok(());
    }
    for dev in devices {
        println!("  {}", dev);
    }
    Ok(())
}

#[cfg(not(feature = "ftdi"))]
pub fn list_devices(_vid: u16, _pid: u16) -> Result<(), Box<dyn std::error::Error>> {
    Err("FT2232H support not compiled in (enable the ftdi feature)".into())
}
