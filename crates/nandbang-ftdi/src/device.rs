//! FT2232H bitbang port implementation
//!
//! Each channel is opened as its own libftdi context in asynchronous
//! bitbang mode. Writes go out through the channel's FIFO; reads sample
//! the pins directly with `ftdi_read_pins`, so they never see stale FIFO
//! data.

use std::io::Write;
use std::time::Duration;

use ftdi::{find_by_vid_pid, BitMode, Device};
use nandbang_core::error::{Error as CoreError, Result as CoreResult};
use nandbang_core::port::BitbangPort;

use crate::error::{FtdiError, Result};
use crate::protocol::*;

/// Configuration for opening the two FT2232H channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtdiConfig {
    /// USB vendor ID
    pub vendor_id: u16,
    /// USB product ID
    pub product_id: u16,
    /// Channel wired to IO0..IO7
    pub data: FtdiInterface,
    /// Channel wired to the control signals
    pub control: FtdiInterface,
    /// USB latency timer in milliseconds
    pub latency_ms: u8,
}

impl Default for FtdiConfig {
    fn default() -> Self {
        FtdiConfig {
            vendor_id: FT2232H_VID,
            product_id: FT2232H_PID,
            data: FtdiInterface::A,
            control: FtdiInterface::B,
            latency_ms: DEFAULT_LATENCY_MS,
        }
    }
}

/// One FT2232H channel in asynchronous bitbang mode
pub struct FtdiPort {
    /// libftdi device context
    device: Device,
    /// Channel this context is bound to
    interface: FtdiInterface,
}

impl FtdiPort {
    /// Open one channel of the adapter with the given VID/PID
    ///
    /// The channel starts with every pin released (mask 0x00).
    pub fn open(
        vendor_id: u16,
        product_id: u16,
        interface: FtdiInterface,
        latency_ms: u8,
    ) -> Result<Self> {
        let channel = interface.letter();
        log::debug!(
            "Looking for FTDI device VID={:04X} PID={:04X} channel {}",
            vendor_id,
            product_id,
            channel
        );

        let mut device = find_by_vid_pid(vendor_id, product_id)
            .interface(interface.to_ftdi())
            .open()
            .map_err(|source| FtdiError::OpenFailed { channel, source })?;

        device
            .usb_reset()
            .map_err(|source| FtdiError::ConfigFailed {
                channel,
                what: "USB reset",
                source,
            })?;

        device
            .set_latency_timer(latency_ms)
            .map_err(|source| FtdiError::ConfigFailed {
                channel,
                what: "latency timer",
                source,
            })?;

        device
            .set_bitmode(0x00, BitMode::Bitbang)
            .map_err(|source| FtdiError::ConfigFailed {
                channel,
                what: "bitbang mode",
                source,
            })?;

        log::info!("Opened FTDI channel {} in bitbang mode", channel);
        Ok(FtdiPort { device, interface })
    }

    fn configure(&mut self, output_mask: u8) -> Result<()> {
        log::trace!(
            "channel {}: bitbang mask 0x{:02X}",
            self.interface.letter(),
            output_mask
        );
        self.device
            .set_bitmode(output_mask, BitMode::Bitbang)
            .map_err(|source| FtdiError::ConfigFailed {
                channel: self.interface.letter(),
                what: "bitbang mask",
                source,
            })
    }

    fn send(&mut self, value: u8) -> Result<()> {
        self.device
            .write_all(&[value])
            .map_err(|e| FtdiError::TransferFailed {
                channel: self.interface.letter(),
                message: format!("Write failed: {}", e),
            })
    }

    fn read_pins(&mut self) -> Result<u8> {
        let mut pins: u8 = 0;
        // SAFETY: the context pointer stays valid for as long as `device`
        // lives, and `pins` outlives the call.
        let rc = unsafe { libftdi1_sys::ftdi_read_pins(self.device.libftdi_context(), &mut pins) };
        if rc < 0 {
            return Err(FtdiError::TransferFailed {
                channel: self.interface.letter(),
                message: format!("ftdi_read_pins returned {}", rc),
            });
        }
        Ok(pins)
    }
}

impl Drop for FtdiPort {
    fn drop(&mut self) {
        // Release I/O pins on close
        if let Err(e) = self.device.set_bitmode(0x00, BitMode::Reset) {
            log::warn!(
                "Failed to release channel {} on close: {}",
                self.interface.letter(),
                e
            );
        }
    }
}

impl BitbangPort for FtdiPort {
    fn set_direction(&mut self, output_mask: u8) -> CoreResult<()> {
        self.configure(output_mask).map_err(CoreError::from)
    }

    fn write_byte(&mut self, value: u8) -> CoreResult<()> {
        self.send(value).map_err(CoreError::from)
    }

    fn read_byte(&mut self) -> CoreResult<u8> {
        self.read_pins().map_err(CoreError::from)
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(us as u64));
    }
}

/// Open the data and control channels described by `config`
///
/// Returns `(data, control)`. The data channel is left driven (mask
/// 0xFF); the session configures the control mask itself.
pub fn open_pair(config: &FtdiConfig) -> Result<(FtdiPort, FtdiPort)> {
    if config.data == config.control {
        return Err(FtdiError::InvalidParameter(format!(
            "data and control must use different channels (both are {})",
            config.data
        )));
    }

    let mut data = FtdiPort::open(
        config.vendor_id,
        config.product_id,
        config.data,
        config.latency_ms,
    )?;
    data.configure(MASK_ALL_OUTPUT)?;

    let control = FtdiPort::open(
        config.vendor_id,
        config.product_id,
        config.control,
        config.latency_ms,
    )?;

    Ok((data, control))
}

/// Information about a connected FT2232H
#[derive(Debug, Clone)]
pub struct FtdiDeviceInfo {
    /// USB bus number
    pub bus: u8,
    /// USB device address
    pub address: u8,
    /// Vendor ID
    pub vendor_id: u16,
    /// Product ID
    pub product_id: u16,
    /// Product string, if the device reports one
    pub product: Option<String>,
    /// Serial number, if the device reports one
    pub serial: Option<String>,
}

impl std::fmt::Display for FtdiDeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at bus {} address {} ({:04X}:{:04X})",
            self.product.as_deref().unwrap_or("FT2232H"),
            self.bus,
            self.address,
            self.vendor_id,
            self.product_id
        )?;
        if let Some(serial) = &self.serial {
            write!(f, " serial {}", serial)?;
        }
        Ok(())
    }
}

/// List connected adapters matching `vendor_id`/`product_id`
pub fn list_devices(vendor_id: u16, product_id: u16) -> Result<Vec<FtdiDeviceInfo>> {
    let devices = nusb::list_devices()?
        .filter(|dev| dev.vendor_id() == vendor_id && dev.product_id() == product_id)
        .map(|dev| FtdiDeviceInfo {
            bus: dev.bus_number(),
            address: dev.device_address(),
            vendor_id: dev.vendor_id(),
            product_id: dev.product_id(),
            product: dev.product_string().map(str::to_string),
            serial: dev.serial_number().map(str::to_string),
        })
        .collect();
    Ok(devices)
}

fn parse_hex_u16(key: &str, value: &str) -> Result<u16> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    u16::from_str_radix(digits, 16)
        .map_err(|_| FtdiError::InvalidParameter(format!("Invalid {} '{}'", key, value)))
}

fn parse_channel(value: &str) -> Result<FtdiInterface> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => {
            FtdiInterface::from_char(c).ok_or_else(|| FtdiError::InvalidChannel(value.to_string()))
        }
        _ => Err(FtdiError::InvalidChannel(value.to_string())),
    }
}

/// Parse programmer options
///
/// Format: "vid=<hex>,pid=<hex>,data=<A|B>,control=<A|B>,latency=<ms>"
pub fn parse_options(options: &[(&str, &str)]) -> Result<FtdiConfig> {
    let mut config = FtdiConfig::default();

    for (key, value) in options {
        match *key {
            "vid" => config.vendor_id = parse_hex_u16(key, value)?,
            "pid" => config.product_id = parse_hex_u16(key, value)?,
            "data" | "io" => config.data = parse_channel(value)?,
            "control" | "ctrl" => config.control = parse_channel(value)?,
            "latency" => {
                config.latency_ms = value.parse().map_err(|_| {
                    FtdiError::InvalidParameter(format!("Invalid latency '{}'", value))
                })?;
            }
            _ => {
                log::warn!("Unknown FTDI option: {}={}", key, value);
            }
        }
    }

    if config.data == config.control {
        return Err(FtdiError::InvalidParameter(format!(
            "data and control must use different channels (both are {})",
            config.data
        )));
    }

    Ok(config)
}
