//! NAND bus protocol engine
//!
//! [`ProtocolEngine`] owns both buses and implements the three bus
//! operations of the datasheet as pin sequences:
//!
//! - Command Input: [`latch_command`](ProtocolEngine::latch_command)
//! - Address Input: [`latch_address`](ProtocolEngine::latch_address)
//! - Data Output: [`latch_data_out`](ProtocolEngine::latch_data_out)
//!
//! plus R/B polling. Each latch primitive first checks the held control
//! byte against the levels the bus operation requires and refuses to touch
//! either bus when one is wrong.

mod diag;
pub mod opcodes;

pub use diag::{BusSample, SelfTestStep};

use crate::bus::{BusState, ControlBus, ControlPins, DataBus, Direction, Level, Pin};
use crate::error::{Error, LatchOp, Precondition, Result};
use crate::port::BitbangPort;
use crate::timing::{TimingProfile, Transition};

/// Maximum number of Address Input cycles in one latch
pub const MAX_ADDRESS_CYCLES: usize = 5;

/// Bus protocol engine over a data port `D` and a control port `C`
pub struct ProtocolEngine<D, C> {
    data: DataBus<D>,
    control: ControlBus<C>,
    timing: TimingProfile,
}

impl<D: BitbangPort, C: BitbangPort> ProtocolEngine<D, C> {
    /// Create an engine; neither port is touched
    pub fn new(data_port: D, control_port: C, timing: TimingProfile) -> Self {
        Self {
            data: DataBus::new(data_port),
            control: ControlBus::new(control_port),
            timing,
        }
    }

    /// Clear the held values of both buses (not flushed)
    pub fn reset_buses(&mut self) {
        self.control.reset_value();
        self.data.reset_value();
    }

    /// Snapshot of what the host currently drives
    pub fn state(&self) -> BusState {
        BusState {
            control: self.control.pins(),
            data: self.data.value(),
            direction: self.data.direction(),
        }
    }

    /// Control bus
    pub fn control(&self) -> &ControlBus<C> {
        &self.control
    }

    /// Mutable control bus
    pub fn control_mut(&mut self) -> &mut ControlBus<C> {
        &mut self.control
    }

    /// Data bus
    pub fn data(&self) -> &DataBus<D> {
        &self.data
    }

    /// Mutable data bus
    pub fn data_mut(&mut self) -> &mut DataBus<D> {
        &mut self.data
    }

    fn require(&self, op: LatchOp, levels: &[(Pin, Level)]) -> Result<()> {
        for &(pin, required) in levels {
            if self.control.level(pin) != required {
                return Err(Error::PreconditionViolation(Precondition {
                    op,
                    pin,
                    required,
                }));
            }
        }
        Ok(())
    }

    fn settle(&mut self, transition: Transition) {
        let us = self.timing.delay(transition);
        self.control.delay_us(us);
    }

    /// Command Input bus operation
    ///
    /// Requires nCE low and nRE high. The opcode is latched on the rising
    /// edge of nWE while CLE is high.
    pub fn latch_command(&mut self, opcode: u8) -> Result<()> {
        self.require(
            LatchOp::Command,
            &[(Pin::NCe, Level::Low), (Pin::NRe, Level::High)],
        )?;
        log::trace!("CMD 0x{:02X} ({})", opcode, opcodes::name(opcode));

        self.control.drive(Pin::Cle, true)?;
        self.control.drive(Pin::NWe, false)?;
        self.data.write(opcode)?;
        self.settle(Transition::CommandSetup);
        self.control.drive(Pin::NWe, true)?;
        self.control.drive(Pin::Cle, false)
    }

    /// Address Input bus operation
    ///
    /// Requires nCE low, CLE low and nRE high. `cycles` must hold between
    /// 1 and 5 bytes; each is latched on a rising edge of nWE while ALE is
    /// high.
    pub fn latch_address(&mut self, cycles: &[u8]) -> Result<()> {
        if cycles.is_empty() || cycles.len() > MAX_ADDRESS_CYCLES {
            return Err(Error::InvalidAddressLength(cycles.len()));
        }
        self.require(
            LatchOp::Address,
            &[
                (Pin::NCe, Level::Low),
                (Pin::Cle, Level::Low),
                (Pin::NRe, Level::High),
            ],
        )?;
        log::trace!("ADDR {:02X?}", cycles);

        self.control.drive(Pin::Ale, true)?;
        for &cycle in cycles {
            self.control.drive(Pin::NWe, false)?;
            self.settle(Transition::AddressWeLow);
            self.data.write(cycle)?;
            self.settle(Transition::AddressSetup);
            self.control.drive(Pin::NWe, true)?;
            self.settle(Transition::AddressHold);
        }
        self.control.drive(Pin::Ale, false)
    }

    /// Data Output bus operation, filling `buf`
    ///
    /// Requires nCE low, nWE high and ALE low. The data bus is released for
    /// the transfer and driven again afterwards, whether the transfer
    /// succeeded or not. An empty `buf` still performs both direction
    /// switches.
    pub fn latch_data_out(&mut self, buf: &mut [u8]) -> Result<()> {
        self.require(
            LatchOp::DataOut,
            &[
                (Pin::NCe, Level::Low),
                (Pin::NWe, Level::High),
                (Pin::Ale, Level::Low),
            ],
        )?;
        log::trace!("DOUT {} bytes", buf.len());

        self.data.set_direction(Direction::Input)?;
        let result = self.clock_out(buf);
        if result.is_err() && !self.control.is_set(Pin::NRe) {
            self.control.set_pin(Pin::NRe, true);
            if let Err(e) = self.control.flush() {
                log::warn!("failed to deassert nRE after aborted read: {}", e);
            }
        }
        let restore = self.data.set_direction(Direction::Output);
        result.and(restore)
    }

    fn clock_out(&mut self, buf: &mut [u8]) -> Result<()> {
        for byte in buf.iter_mut() {
            self.control.drive(Pin::NRe, false)?;
            self.settle(Transition::ReadAccess);
            *byte = self.data.read()?;
            self.control.drive(Pin::NRe, true)?;
            self.settle(Transition::ReadHold);
        }
        Ok(())
    }

    fn poll_ready(&mut self) -> Result<bool> {
        let live = self.control.read_status()?;
        Ok(live.contains(ControlPins::RDY))
    }

    /// Poll R/B until the device reports ready
    ///
    /// There is no upper bound: a device that never releases R/B keeps this
    /// call spinning forever. Use [`wait_busy_bounded`](Self::wait_busy_bounded)
    /// where that matters. Returns the number of polls performed.
    pub fn wait_busy(&mut self) -> Result<u32> {
        let mut polls: u32 = 0;
        loop {
            polls = polls.saturating_add(1);
            if self.poll_ready()? {
                log::trace!("ready after {} polls", polls);
                return Ok(polls);
            }
            self.settle(Transition::BusyPoll);
        }
    }

    /// Poll R/B at most `max_polls` times
    ///
    /// Returns the number of polls performed, or [`Error::Timeout`] when the
    /// device is still busy after the last one. A budget of 0 times out
    /// without sampling.
    pub fn wait_busy_bounded(&mut self, max_polls: u32) -> Result<u32> {
        for polls in 1..=max_polls {
            if self.poll_ready()? {
                log::trace!("ready after {} polls", polls);
                return Ok(polls);
            }
            self.settle(Transition::BusyPoll);
        }
        log::warn!("device still busy after {} polls", max_polls);
        Err(Error::Timeout { polls: max_polls })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::mock::{MockPort, PortOp};
    use std::vec;

    const NCE: u8 = 0x04;
    const NWE: u8 = 0x08;
    const NRE: u8 = 0x10;

    fn engine() -> (ProtocolEngine<MockPort, MockPort>, MockPort, MockPort) {
        let data = MockPort::new();
        let control = MockPort::new();
        let engine = ProtocolEngine::new(data.clone(), control.clone(), TimingProfile::none());
        (engine, data, control)
    }

    /// Put the engine in the idle state left by session bring-up plus a
    /// completed command (nWE high)
    fn idle(engine: &mut ProtocolEngine<MockPort, MockPort>) {
        engine.control_mut().set_pin(Pin::NRe, true);
        engine.control_mut().set_pin(Pin::NWe, true);
        engine.control_mut().set_pin(Pin::NCe, false);
    }

    #[test]
    fn test_latch_command_sequence() {
        let (mut engine, data, control) = engine();
        idle(&mut engine);
        engine.latch_command(0x90).unwrap();

        let idle = NRE | NWE;
        assert_eq!(
            control.writes(),
            [idle | 0x01, (idle & !NWE) | 0x01, idle | 0x01, idle]
        );
        assert_eq!(data.writes(), [0x90]);
    }

    #[test]
    fn test_latch_command_requires_chip_enable() {
        let (mut engine, data, control) = engine();
        idle(&mut engine);
        engine.control_mut().set_pin(Pin::NCe, true);

        let err = engine.latch_command(0x00).unwrap_err();
        assert_eq!(
            err,
            Error::PreconditionViolation(Precondition {
                op: LatchOp::Command,
                pin: Pin::NCe,
                required: Level::Low,
            })
        );
        assert!(data.ops().is_empty());
        assert!(control.ops().is_empty());
        assert_eq!(engine.control().pins().bits(), NRE | NWE | NCE);
    }

    #[test]
    fn test_latch_command_requires_read_enable_high() {
        let (mut engine, data, _control) = engine();
        idle(&mut engine);
        engine.control_mut().set_pin(Pin::NRe, false);

        assert!(matches!(
            engine.latch_command(0x70),
            Err(Error::PreconditionViolation(Precondition {
                pin: Pin::NRe,
                required: Level::High,
                ..
            }))
        ));
        assert!(data.ops().is_empty());
    }

    #[test]
    fn test_latch_address_lengths() {
        let (mut engine, data, _control) = engine();
        idle(&mut engine);

        assert_eq!(
            engine.latch_address(&[]),
            Err(Error::InvalidAddressLength(0))
        );
        assert_eq!(
            engine.latch_address(&[0; 6]),
            Err(Error::InvalidAddressLength(6))
        );
        assert!(data.ops().is_empty());

        engine.latch_address(&[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(data.writes(), [1, 2, 3, 4, 5]);
        assert!(!engine.control().is_set(Pin::Ale));
    }

    #[test]
    fn test_latch_address_requires_cle_low() {
        let (mut engine, data, _control) = engine();
        idle(&mut engine);
        engine.control_mut().set_pin(Pin::Cle, true);
        assert!(matches!(
            engine.latch_address(&[0x00]),
            Err(Error::PreconditionViolation(Precondition {
                op: LatchOp::Address,
                pin: Pin::Cle,
                ..
            }))
        ));
        assert!(data.ops().is_empty());
    }

    #[test]
    fn test_latch_address_requires_chip_enable_and_read_enable() {
        let (mut engine, data, control) = engine();
        idle(&mut engine);
        engine.control_mut().set_pin(Pin::NCe, true);
        assert_eq!(
            engine.latch_address(&[0x00]),
            Err(Error::PreconditionViolation(Precondition {
                op: LatchOp::Address,
                pin: Pin::NCe,
                required: Level::Low,
            }))
        );

        engine.control_mut().set_pin(Pin::NCe, false);
        engine.control_mut().set_pin(Pin::NRe, false);
        assert_eq!(
            engine.latch_address(&[0x00]),
            Err(Error::PreconditionViolation(Precondition {
                op: LatchOp::Address,
                pin: Pin::NRe,
                required: Level::High,
            }))
        );
        assert!(data.ops().is_empty());
        assert!(control.ops().is_empty());
    }

    #[test]
    fn test_latch_data_out_requires_chip_enable_and_ale_low() {
        let (mut engine, data, control) = engine();
        idle(&mut engine);
        let mut buf = [0u8; 1];

        engine.control_mut().set_pin(Pin::NCe, true);
        assert_eq!(
            engine.latch_data_out(&mut buf),
            Err(Error::PreconditionViolation(Precondition {
                op: LatchOp::DataOut,
                pin: Pin::NCe,
                required: Level::Low,
            }))
        );

        engine.control_mut().set_pin(Pin::NCe, false);
        engine.control_mut().set_pin(Pin::Ale, true);
        assert_eq!(
            engine.latch_data_out(&mut buf),
            Err(Error::PreconditionViolation(Precondition {
                op: LatchOp::DataOut,
                pin: Pin::Ale,
                required: Level::Low,
            }))
        );
        // No direction switch, no nRE edge
        assert!(data.ops().is_empty());
        assert!(control.ops().is_empty());
    }

    #[test]
    fn test_latch_address_delays() {
        let data = MockPort::new();
        let control = MockPort::new();
        let mut engine =
            ProtocolEngine::new(data.clone(), control.clone(), TimingProfile::conservative());
        idle(&mut engine);
        engine.latch_address(&[0xAB]).unwrap();

        let idle = NRE | NWE;
        assert_eq!(
            control.ops(),
            [
                PortOp::Write(idle | 0x02),
                PortOp::Write((idle & !NWE) | 0x02),
                PortOp::Delay(10),
                PortOp::Delay(10),
                PortOp::Write(idle | 0x02),
                PortOp::Delay(10),
                PortOp::Write(idle),
            ]
        );
    }

    #[test]
    fn test_latch_data_out_restores_output() {
        let (mut engine, data, _control) = engine();
        idle(&mut engine);
        data.push_reads(&[0xAD, 0xDC]);

        let mut buf = [0u8; 2];
        engine.latch_data_out(&mut buf).unwrap();
        assert_eq!(buf, [0xAD, 0xDC]);
        assert_eq!(engine.state().direction, Direction::Output);
        assert_eq!(
            data.ops(),
            [
                PortOp::Direction(0x00),
                PortOp::Read,
                PortOp::Read,
                PortOp::Direction(0xFF)
            ]
        );
    }

    #[test]
    fn test_latch_data_out_empty() {
        let (mut engine, data, control) = engine();
        idle(&mut engine);
        engine.latch_data_out(&mut []).unwrap();
        assert_eq!(engine.data().direction(), Direction::Output);
        assert_eq!(
            data.ops(),
            [PortOp::Direction(0x00), PortOp::Direction(0xFF)]
        );
        assert!(control.ops().is_empty());
    }

    #[test]
    fn test_latch_data_out_restores_after_failure() {
        let (mut engine, data, control) = engine();
        idle(&mut engine);
        control.fail_writes(true);

        let mut buf = vec![0u8; 4];
        assert_eq!(engine.latch_data_out(&mut buf), Err(Error::PortError));
        assert_eq!(engine.data().direction(), Direction::Output);
        assert_eq!(data.ops().last(), Some(&PortOp::Direction(0xFF)));
        assert!(engine.control().is_set(Pin::NRe));
    }

    #[test]
    fn test_latch_data_out_requires_we_high() {
        let (mut engine, data, _control) = engine();
        engine.control_mut().set_pin(Pin::NRe, true);
        let mut buf = [0u8; 1];
        assert!(matches!(
            engine.latch_data_out(&mut buf),
            Err(Error::PreconditionViolation(Precondition {
                op: LatchOp::DataOut,
                pin: Pin::NWe,
                required: Level::High,
            }))
        ));
        assert!(data.ops().is_empty());
    }

    #[test]
    fn test_wait_busy_counts_polls() {
        let (mut engine, _data, control) = engine();
        control.push_reads(&[0x00, 0x00, 0x40]);
        assert_eq!(engine.wait_busy().unwrap(), 3);
    }

    #[test]
    fn test_wait_busy_bounded_timeout() {
        let (mut engine, _data, control) = engine();
        control.set_idle_read(0x00);
        assert_eq!(
            engine.wait_busy_bounded(8),
            Err(Error::Timeout { polls: 8 })
        );
        assert_eq!(control.ops().len(), 8);

        control.push_reads(&[0x00, 0x40]);
        assert_eq!(engine.wait_busy_bounded(8).unwrap(), 2);
    }

    #[test]
    fn test_wait_busy_bounded_zero_budget() {
        let (mut engine, _data, control) = engine();
        control.set_idle_read(0x40);
        assert_eq!(
            engine.wait_busy_bounded(0),
            Err(Error::Timeout { polls: 0 })
        );
        assert!(control.ops().is_empty());
    }
}
