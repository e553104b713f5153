//! Bus self-test command

use nandbang_core::protocol::SelfTestStep;

use crate::programmers::Session;

/// Walk every pin, holding each step for `step_ms`, then sample both buses
pub fn run_selftest(flash: &mut Session, step_ms: u32) -> Result<(), Box<dyn std::error::Error>> {
    println!("Walking control and data pins ({} ms per step)", step_ms);

    let step_us = step_ms.saturating_mul(1000);
    let sample = flash.self_test(step_us, &mut |step| match step {
        SelfTestStep::ControlPin { pin, on } => {
            println!("  {} {}", pin.name(), if on { "on" } else { "off" })
        }
        SelfTestStep::DataBit { bit, on } => {
            println!("  DIO{} {}", bit, if on { "on" } else { "off" })
        }
        SelfTestStep::DataPattern(value) => println!("  DIO = 0x{:02X}", value),
    })?;

    println!("Input read-back:");
    println!("  data bus:    0x{:02X}", sample.data);
    println!("  control bus: 0x{:02X}", sample.control.bits());
    Ok(())
}
