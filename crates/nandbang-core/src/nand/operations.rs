//! Device level operations
//!
//! [`NandFlash`] is the session object. It owns the protocol engine (and
//! with it both ports) from bring-up to teardown:
//!
//! 1. `open` clears both bus values, drives the data bus and settles the
//!    control bus in its idle state (nRE high, nCE low, nWP low).
//! 2. Operations run strictly one after another.
//! 3. `close` (or drop) deasserts nCE.

use crate::address::{map_address, AddressCycles};
use crate::bus::{BusState, Direction, Pin};
use crate::error::{EraseFailure, Error, Result};
use crate::nand::{DeviceId, Geometry, IdMatch, StatusRegister};
use crate::port::BitbangPort;
use crate::protocol::{opcodes, BusSample, ProtocolEngine, SelfTestStep};
use crate::timing::TimingProfile;

#[cfg(feature = "alloc")]
use alloc::vec;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// How to wait for R/B after an array operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusyWait {
    /// Poll until ready, however long it takes
    #[default]
    Unbounded,
    /// Give up with [`Error::Timeout`] after `max_polls` polls
    Bounded {
        /// Poll budget
        max_polls: u32,
    },
}

/// Session configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NandConfig {
    /// Signature `read_id` compares against
    pub expected_id: DeviceId,
    /// Array organisation
    pub geometry: Geometry,
    /// Bus delays
    pub timing: TimingProfile,
    /// R/B wait strategy for page reads, erases and reset
    pub busy_wait: BusyWait,
    /// Issue a Reset command during `open`
    pub reset_on_open: bool,
}

impl Default for NandConfig {
    fn default() -> Self {
        Self {
            expected_id: DeviceId::H27U4G8F2D,
            geometry: Geometry::H27U4G8F2D,
            timing: TimingProfile::conservative(),
            busy_wait: BusyWait::Unbounded,
            reset_on_open: false,
        }
    }
}

/// Raw NAND flash session over a data port `D` and a control port `C`
pub struct NandFlash<D: BitbangPort, C: BitbangPort> {
    engine: ProtocolEngine<D, C>,
    config: NandConfig,
    released: bool,
}

impl<D: BitbangPort, C: BitbangPort> NandFlash<D, C> {
    /// Take ownership of both ports and bring the bus up
    pub fn open(data_port: D, control_port: C, config: NandConfig) -> Result<Self> {
        let mut flash = Self {
            engine: ProtocolEngine::new(data_port, control_port, config.timing),
            config,
            released: false,
        };
        flash.bring_up()?;
        if config.reset_on_open {
            flash.reset()?;
        }
        log::info!("NAND session open (expecting ID {})", config.expected_id);
        Ok(flash)
    }

    fn bring_up(&mut self) -> Result<()> {
        self.engine.reset_buses();
        self.engine.control_mut().configure()?;
        self.engine.data_mut().set_direction(Direction::Output)?;
        self.engine.control_mut().flush()?;
        self.engine.data_mut().flush()?;

        let control = self.engine.control_mut();
        control.set_pin(Pin::NRe, true);
        control.set_pin(Pin::NCe, false);
        control.set_pin(Pin::NWp, false);
        control.flush()
    }

    /// Session configuration
    pub fn config(&self) -> &NandConfig {
        &self.config
    }

    /// Array organisation
    pub fn geometry(&self) -> &Geometry {
        &self.config.geometry
    }

    /// Snapshot of what the host currently drives
    pub fn state(&self) -> BusState {
        self.engine.state()
    }

    /// Protocol engine, for raw bus access
    pub fn engine_mut(&mut self) -> &mut ProtocolEngine<D, C> {
        &mut self.engine
    }

    fn wait_ready(&mut self, wait: BusyWait) -> Result<u32> {
        match wait {
            BusyWait::Unbounded => self.engine.wait_busy(),
            BusyWait::Bounded { max_polls } => self.engine.wait_busy_bounded(max_polls),
        }
    }

    /// Issue Reset (0xFF) and wait for the device
    pub fn reset(&mut self) -> Result<()> {
        log::debug!("reset");
        self.engine.latch_command(opcodes::RESET)?;
        self.wait_ready(self.config.busy_wait)?;
        Ok(())
    }

    /// Read the five ID bytes and compare them with the expected signature
    ///
    /// A mismatch is reported in the returned value, not as an error.
    pub fn read_id(&mut self) -> Result<IdMatch> {
        let mut buf = [0u8; 5];
        self.engine.latch_command(opcodes::READ_ID)?;
        self.engine.latch_address(&[0x00])?;
        self.engine.latch_data_out(&mut buf)?;

        let result = IdMatch::compare(self.config.expected_id, DeviceId(buf));
        match result {
            IdMatch::Match(id) => log::debug!("ID register: {} (match)", id),
            IdMatch::Mismatch { expected, actual } => {
                log::debug!("ID register: {} (expected {})", actual, expected)
            }
        }
        Ok(result)
    }

    /// Read the status register
    pub fn read_status(&mut self) -> Result<StatusRegister> {
        let mut buf = [0u8; 1];
        self.engine.latch_command(opcodes::READ_STATUS)?;
        self.engine.latch_data_out(&mut buf)?;
        let status = StatusRegister::from_raw(buf[0]);
        log::debug!("status register: {}", status);
        Ok(status)
    }

    /// Linear address of `page`
    pub fn page_address(&self, page: u32) -> Result<u32> {
        self.config
            .geometry
            .page_address(page)
            .ok_or(Error::AddressOutOfBounds)
    }

    /// Read the page (data + spare) at linear `address` into `buf`
    ///
    /// `buf` must be exactly one page long. Waits for R/B as configured
    /// for the session.
    pub fn read_page_into(&mut self, address: u32, buf: &mut [u8]) -> Result<()> {
        self.read_page_with(address, buf, self.config.busy_wait)
    }

    /// Like [`read_page_into`](Self::read_page_into) but always gives up
    /// after `max_polls` R/B polls
    pub fn read_page_bounded_into(
        &mut self,
        address: u32,
        buf: &mut [u8],
        max_polls: u32,
    ) -> Result<()> {
        self.read_page_with(address, buf, BusyWait::Bounded { max_polls })
    }

    fn read_page_with(&mut self, address: u32, buf: &mut [u8], wait: BusyWait) -> Result<()> {
        if buf.len() != self.config.geometry.page_bytes() {
            return Err(Error::BufferTooSmall);
        }
        let cycles = map_address(address);
        log::debug!("read page at 0x{:08X}: {}", address, cycles);

        self.engine.latch_command(opcodes::READ_1ST)?;
        self.engine.latch_address(cycles.as_bytes())?;
        self.engine.latch_command(opcodes::READ_2ND)?;
        self.wait_ready(wait)?;
        self.engine.latch_data_out(buf)
    }

    /// Read the page at linear `address` into a new buffer
    #[cfg(feature = "alloc")]
    pub fn read_page(&mut self, address: u32) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.config.geometry.page_bytes()];
        self.read_page_into(address, &mut buf)?;
        Ok(buf)
    }

    /// Erase one block
    ///
    /// Write protect is lifted for the duration of the erase and asserted
    /// again afterwards, also when the erase failed. Returns the status
    /// register read after the erase.
    pub fn erase_block(&mut self, block: u32) -> Result<StatusRegister> {
        let address = self
            .config
            .geometry
            .block_address(block)
            .ok_or(Error::AddressOutOfBounds)?;
        let cycles = map_address(address);
        log::debug!("erase block {} at 0x{:08X}: {}", block, address, cycles);

        let result = self
            .engine
            .control_mut()
            .drive(Pin::NWp, true)
            .and_then(|()| self.erase_sequence(&cycles));
        // Clears the held bit even if this flush fails too
        let restore = self.engine.control_mut().drive(Pin::NWp, false);
        let status = result?;
        restore?;

        if status.failed() {
            log::warn!("erase of block {} failed: {}", block, status);
            return Err(Error::EraseError(EraseFailure {
                block,
                status: status.bits(),
            }));
        }
        Ok(status)
    }

    fn erase_sequence(&mut self, cycles: &AddressCycles) -> Result<StatusRegister> {
        self.engine.latch_command(opcodes::BLOCK_ERASE_1ST)?;
        self.engine.latch_address(cycles.row())?;
        self.engine.latch_command(opcodes::BLOCK_ERASE_2ND)?;
        self.wait_ready(self.config.busy_wait)?;
        self.read_status()
    }

    /// Erase `count` blocks starting at `first`, stopping at the first
    /// failure
    ///
    /// `on_block` is called after every successful erase.
    pub fn erase_blocks(
        &mut self,
        first: u32,
        count: u32,
        on_block: &mut dyn FnMut(u32),
    ) -> Result<()> {
        let end = first
            .checked_add(count)
            .filter(|&end| end <= self.config.geometry.blocks)
            .ok_or(Error::AddressOutOfBounds)?;
        for block in first..end {
            self.erase_block(block)?;
            on_block(block);
        }
        Ok(())
    }

    /// Page program is not implemented
    pub fn program_page(&mut self, address: u32, _data: &[u8]) -> Result<()> {
        log::debug!("program page at 0x{:08X}: unsupported", address);
        Err(Error::Unsupported)
    }

    /// Walk every pin, sample both buses, and return to the idle state
    ///
    /// `step_us` is held after every step so the levels can be observed.
    pub fn self_test(
        &mut self,
        step_us: u32,
        on_step: &mut dyn FnMut(SelfTestStep),
    ) -> Result<BusSample> {
        log::info!("bus self-test, {} us per step", step_us);
        self.engine.walk_control_pins(step_us, on_step)?;
        self.engine.walk_data_bus(step_us, on_step)?;
        let sample = self.engine.sample_inputs()?;
        self.bring_up()?;
        Ok(sample)
    }

    fn release(&mut self) -> Result<()> {
        self.released = true;
        self.engine.control_mut().drive(Pin::NCe, true)
    }

    /// Deassert chip enable and end the session
    pub fn close(mut self) -> Result<()> {
        log::info!("NAND session closed");
        self.release()
    }
}

impl<D: BitbangPort, C: BitbangPort> Drop for NandFlash<D, C> {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = self.release() {
                log::warn!("failed to deassert nCE: {}", e);
            }
        }
    }
}
