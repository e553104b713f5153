//! Edge-level NAND device model

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;

use nandbang_core::address::AddressCycles;
use nandbang_core::bus::ControlPins;
use nandbang_core::error::Result;
use nandbang_core::nand::StatusRegister;
use nandbang_core::port::BitbangPort;
use nandbang_core::protocol::opcodes;

use crate::{page_pattern, BusEvent, DummyConfig, Fill};

/// Command waiting for its address cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    None,
    ReadId,
    Read,
    Erase,
}

/// What a falling edge of nRE puts on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    None,
    Id(usize),
    Register(usize),
    Status,
}

struct State {
    config: DummyConfig,
    pages: BTreeMap<u32, Vec<u8>>,
    register: Vec<u8>,

    control: ControlPins,
    control_mask: u8,
    data_value: u8,
    data_mask: u8,
    presented: u8,

    pending: Pending,
    address: Vec<u8>,
    output: Output,
    busy_remaining: u32,
    last_failed: bool,

    trace: Vec<BusEvent>,
    data_writes: usize,
}

impl State {
    fn new(config: DummyConfig) -> Self {
        Self {
            config,
            pages: BTreeMap::new(),
            register: Vec::new(),
            control: ControlPins::empty(),
            control_mask: 0x00,
            data_value: 0xFF,
            data_mask: 0x00,
            presented: 0xFF,
            pending: Pending::None,
            address: Vec::new(),
            output: Output::None,
            busy_remaining: 0,
            last_failed: false,
            trace: Vec::new(),
            data_writes: 0,
        }
    }

    fn page_bytes(&self) -> usize {
        self.config.geometry.page_bytes()
    }

    fn is_ready(&self) -> bool {
        !self.config.stuck_busy && self.busy_remaining == 0
    }

    fn start_busy(&mut self) {
        self.busy_remaining = self.config.busy_polls;
    }

    fn page(&self, row: u32) -> Vec<u8> {
        match self.pages.get(&row) {
            Some(page) => page.clone(),
            None => match self.config.fill {
                Fill::Erased => vec![0xFF; self.page_bytes()],
                Fill::Pattern => page_pattern(row, self.page_bytes()),
            },
        }
    }

    fn status(&self) -> StatusRegister {
        let mut status = StatusRegister::empty();
        status.set(StatusRegister::FAIL, self.last_failed);
        status.set(StatusRegister::READY, self.is_ready());
        status.set(
            StatusRegister::NOT_PROTECTED,
            self.control.contains(ControlPins::NWP),
        );
        status
    }

    fn write_control(&mut self, value: u8) {
        let prev = self.control;
        let next = ControlPins::from_bits_retain(value & self.control_mask);
        self.control = next;

        if next.contains(ControlPins::NCE) {
            return;
        }

        let we_rising = !prev.contains(ControlPins::NWE) && next.contains(ControlPins::NWE);
        if we_rising {
            let byte = self.data_value;
            if next.contains(ControlPins::CLE) {
                self.latch_command(byte);
            } else if next.contains(ControlPins::ALE) {
                self.latch_address(byte);
            }
        }

        let re_falling = prev.contains(ControlPins::NRE) && !next.contains(ControlPins::NRE);
        if re_falling {
            self.present_next();
        }
    }

    fn latch_command(&mut self, opcode: u8) {
        log::trace!("sim: command 0x{:02X}", opcode);
        self.trace.push(BusEvent::Command(opcode));
        match opcode {
            opcodes::RESET => {
                self.pending = Pending::None;
                self.output = Output::None;
                self.last_failed = false;
                self.start_busy();
            }
            opcodes::READ_ID => self.begin(Pending::ReadId),
            opcodes::READ_1ST => self.begin(Pending::Read),
            opcodes::BLOCK_ERASE_1ST => self.begin(Pending::Erase),
            opcodes::READ_2ND => self.load_register(),
            opcodes::BLOCK_ERASE_2ND => self.erase(),
            opcodes::READ_STATUS => self.output = Output::Status,
            _ => {
                log::warn!("sim: unsupported command 0x{:02X}", opcode);
                self.pending = Pending::None;
            }
        }
    }

    fn begin(&mut self, pending: Pending) {
        self.pending = pending;
        self.address.clear();
        self.output = Output::None;
    }

    fn latch_address(&mut self, byte: u8) {
        log::trace!("sim: address 0x{:02X}", byte);
        self.trace.push(BusEvent::Address(byte));
        self.address.push(byte);
        if self.pending == Pending::ReadId {
            self.pending = Pending::None;
            self.output = Output::Id(0);
        }
    }

    fn load_register(&mut self) {
        if self.pending != Pending::Read || self.address.len() != 5 {
            log::warn!(
                "sim: READ confirm without a 5 cycle address ({} cycles)",
                self.address.len()
            );
            self.pending = Pending::None;
            return;
        }
        let mut cycles = [0u8; 5];
        cycles.copy_from_slice(&self.address);
        let cycles = AddressCycles::from_bytes(cycles);
        let row = cycles.row_address();
        let column = cycles.column_address() as usize;

        let page = self.page(row);
        self.register = page.get(column..).map(<[u8]>::to_vec).unwrap_or_default();
        self.pending = Pending::None;
        self.output = Output::Register(0);
        self.last_failed = false;
        self.start_busy();
    }

    fn erase(&mut self) {
        if self.pending != Pending::Erase || self.address.len() != 3 {
            log::warn!(
                "sim: ERASE confirm without a 3 cycle row address ({} cycles)",
                self.address.len()
            );
            self.pending = Pending::None;
            return;
        }
        let row = self.address[0] as u32
            | ((self.address[1] as u32) << 8)
            | ((self.address[2] as u32) << 16);
        let pages_per_block = self.config.geometry.pages_per_block;
        let first = row - row % pages_per_block;
        self.pending = Pending::None;
        self.start_busy();

        if self.config.fail_erase || !self.control.contains(ControlPins::NWP) {
            log::trace!("sim: erase of row {} refused", first);
            self.last_failed = true;
            return;
        }
        let erased = vec![0xFF; self.page_bytes()];
        for row in first..first + pages_per_block {
            self.pages.insert(row, erased.clone());
        }
        self.last_failed = false;
    }

    fn present_next(&mut self) {
        let byte = match self.output {
            Output::None => 0xFF,
            Output::Id(pos) => {
                self.output = Output::Id(pos + 1);
                self.config.id.0[pos % 5]
            }
            Output::Register(pos) => {
                self.output = Output::Register(pos + 1);
                self.register.get(pos).copied().unwrap_or(0xFF)
            }
            Output::Status => self.status().bits(),
        };
        self.presented = byte;
        self.trace.push(BusEvent::DataOut(byte));
    }

    fn read_control(&mut self) -> u8 {
        let ready = self.is_ready();
        if self.busy_remaining > 0 {
            self.busy_remaining -= 1;
        }
        self.trace.push(BusEvent::BusyPoll { ready });
        let mut pins = self.control;
        pins.set(ControlPins::RDY, ready);
        pins.bits()
    }

    fn read_data(&self) -> u8 {
        if self.data_mask == 0x00 {
            self.presented
        } else {
            self.data_value
        }
    }
}

/// Simulated NAND device
///
/// Create one, then hand [`data_port`](Self::data_port) and
/// [`control_port`](Self::control_port) to the session. The `SimNand`
/// handle stays usable for inspecting the array and the trace.
#[derive(Clone)]
pub struct SimNand {
    state: Rc<RefCell<State>>,
}

impl SimNand {
    /// Create a new device with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(State::new(config))),
        }
    }

    /// Create a new device with default configuration (H27U4G8F2D)
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a device whose pages hold [`page_pattern`](crate::page_pattern)
    pub fn with_pattern(config: DummyConfig) -> Self {
        Self::new(DummyConfig {
            fill: Fill::Pattern,
            ..config
        })
    }

    /// Port for the I/O bus
    pub fn data_port(&self) -> SimDataPort {
        SimDataPort {
            state: Rc::clone(&self.state),
        }
    }

    /// Port for the control bus
    pub fn control_port(&self) -> SimControlPort {
        SimControlPort {
            state: Rc::clone(&self.state),
        }
    }

    /// Content of the page at `row`
    pub fn page(&self, row: u32) -> Vec<u8> {
        self.state.borrow().page(row)
    }

    /// Overwrite the page at `row`; shorter data is padded with 0xFF
    pub fn set_page(&self, row: u32, data: &[u8]) {
        let mut state = self.state.borrow_mut();
        let mut page = vec![0xFF; state.page_bytes()];
        let len = core::cmp::min(data.len(), page.len());
        page[..len].copy_from_slice(&data[..len]);
        state.pages.insert(row, page);
    }

    /// Events observed so far
    pub fn trace(&self) -> Vec<BusEvent> {
        self.state.borrow().trace.clone()
    }

    /// Forget the recorded events
    pub fn clear_trace(&self) {
        self.state.borrow_mut().trace.clear();
    }

    /// Number of bytes the host wrote to the data port
    pub fn data_writes(&self) -> usize {
        self.state.borrow().data_writes
    }

    /// Control byte the host drives
    pub fn control_pins(&self) -> ControlPins {
        self.state.borrow().control
    }

    /// Whether the host currently drives the data bus
    pub fn data_driven(&self) -> bool {
        self.state.borrow().data_mask == 0xFF
    }

    /// Make the device hang busy (or recover)
    pub fn set_stuck_busy(&self, stuck: bool) {
        self.state.borrow_mut().config.stuck_busy = stuck;
    }

    /// Make every subsequent erase fail (or succeed)
    pub fn set_fail_erase(&self, fail: bool) {
        self.state.borrow_mut().config.fail_erase = fail;
    }
}

/// I/O bus side of a [`SimNand`]
pub struct SimDataPort {
    state: Rc<RefCell<State>>,
}

impl BitbangPort for SimDataPort {
    fn set_direction(&mut self, output_mask: u8) -> Result<()> {
        self.state.borrow_mut().data_mask = output_mask;
        Ok(())
    }

    fn write_byte(&mut self, value: u8) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.data_writes += 1;
        state.data_value = value;
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        Ok(self.state.borrow().read_data())
    }

    fn delay_us(&mut self, _us: u32) {
        // No delay needed for the simulated device
    }
}

/// Control bus side of a [`SimNand`]
pub struct SimControlPort {
    state: Rc<RefCell<State>>,
}

impl BitbangPort for SimControlPort {
    fn set_direction(&mut self, output_mask: u8) -> Result<()> {
        self.state.borrow_mut().control_mask = output_mask;
        Ok(())
    }

    fn write_byte(&mut self, value: u8) -> Result<()> {
        self.state.borrow_mut().write_control(value);
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        Ok(self.state.borrow_mut().read_control())
    }

    fn delay_us(&mut self, _us: u32) {
        // No delay needed for the simulated device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nandbang_core::nand::{DeviceId, NandConfig, NandFlash};
    use nandbang_core::timing::TimingProfile;

    fn open(sim: &SimNand) -> NandFlash<SimDataPort, SimControlPort> {
        let config = NandConfig {
            timing: TimingProfile::none(),
            ..NandConfig::default()
        };
        NandFlash::open(sim.data_port(), sim.control_port(), config).unwrap()
    }

    #[test]
    fn test_read_id() {
        let sim = SimNand::new_default();
        let mut flash = open(&sim);
        assert!(flash.read_id().unwrap().is_match());
        assert_eq!(
            sim.trace(),
            [
                BusEvent::Command(0x90),
                BusEvent::Address(0x00),
                BusEvent::DataOut(0xAD),
                BusEvent::DataOut(0xDC),
                BusEvent::DataOut(0x10),
                BusEvent::DataOut(0x95),
                BusEvent::DataOut(0x54),
            ]
        );
    }

    #[test]
    fn test_other_id() {
        let sim = SimNand::new(DummyConfig {
            id: DeviceId([0x2C, 0xDC, 0x90, 0x95, 0x56]),
            ..DummyConfig::default()
        });
        let mut flash = open(&sim);
        let result = flash.read_id().unwrap();
        assert!(!result.is_match());
        assert_eq!(result.actual().manufacturer(), 0x2C);
    }

    #[test]
    fn test_read_page_pattern() {
        let sim = SimNand::with_pattern(DummyConfig::default());
        let mut flash = open(&sim);
        let address = flash.page_address(7).unwrap();
        let page = flash.read_page(address).unwrap();
        assert_eq!(page, page_pattern(7, 2112));
    }

    #[test]
    fn test_erase_block() {
        let sim = SimNand::with_pattern(DummyConfig::default());
        sim.set_page(64, &[0x00; 16]);
        let mut flash = open(&sim);

        let status = flash.erase_block(1).unwrap();
        assert!(status.is_ready());
        assert!(!status.failed());
        assert_eq!(sim.page(64), vec![0xFF; 2112]);
        assert_eq!(sim.page(127), vec![0xFF; 2112]);
        // Neighbouring blocks are untouched
        assert_eq!(sim.page(128), page_pattern(128, 2112));
        assert!(!sim.control_pins().contains(ControlPins::NWP));
    }

    #[test]
    fn test_erase_refused_while_protected() {
        let sim = SimNand::new_default();
        let mut flash = open(&sim);
        flash.engine_mut().latch_command(opcodes::BLOCK_ERASE_1ST).unwrap();
        flash.engine_mut().latch_address(&[0x40, 0x00, 0x00]).unwrap();
        flash.engine_mut().latch_command(opcodes::BLOCK_ERASE_2ND).unwrap();
        flash.engine_mut().wait_busy().unwrap();
        let status = flash.read_status().unwrap();
        assert!(status.failed());
        assert!(status.is_write_protected());
    }

    #[test]
    fn test_busy_polls() {
        let sim = SimNand::new(DummyConfig {
            busy_polls: 3,
            ..DummyConfig::default()
        });
        let mut flash = open(&sim);
        flash.engine_mut().latch_command(opcodes::RESET).unwrap();
        assert_eq!(flash.engine_mut().wait_busy().unwrap(), 4);
    }

    #[test]
    fn test_read_page_bus_sequence() {
        let sim = SimNand::with_pattern(DummyConfig::default());
        let mut flash = open(&sim);
        let address = flash.page_address(1).unwrap();
        let page = flash.read_page(address).unwrap();
        assert_eq!(page, page_pattern(1, 2112));

        let trace = sim.trace();
        assert_eq!(
            trace[..10],
            [
                BusEvent::Command(0x00),
                BusEvent::Address(0x00),
                BusEvent::Address(0x00),
                BusEvent::Address(0x01),
                BusEvent::Address(0x00),
                BusEvent::Address(0x00),
                BusEvent::Command(0x30),
                BusEvent::BusyPoll { ready: false },
                BusEvent::BusyPoll { ready: false },
                BusEvent::BusyPoll { ready: true },
            ]
        );
        assert_eq!(trace.len(), 10 + 2112);
        assert!(trace[10..]
            .iter()
            .all(|e| matches!(e, BusEvent::DataOut(_))));
    }

    #[test]
    fn test_command_refused_with_chip_disabled() {
        use nandbang_core::bus::{Level, Pin};
        use nandbang_core::error::{Error, LatchOp, Precondition};

        let sim = SimNand::new_default();
        let mut flash = open(&sim);
        flash.engine_mut().control_mut().drive(Pin::NCe, true).unwrap();
        let writes = sim.data_writes();

        assert_eq!(
            flash.engine_mut().latch_command(opcodes::READ_ID),
            Err(Error::PreconditionViolation(Precondition {
                op: LatchOp::Command,
                pin: Pin::NCe,
                required: Level::Low,
            }))
        );
        assert_eq!(sim.data_writes(), writes);
        assert!(sim.trace().is_empty());
    }

    #[test]
    fn test_empty_data_out_keeps_bus_driven() {
        let sim = SimNand::new_default();
        let mut flash = open(&sim);
        flash.engine_mut().latch_command(opcodes::READ_STATUS).unwrap();
        flash.engine_mut().latch_data_out(&mut []).unwrap();
        assert!(sim.data_driven());
        assert_eq!(sim.trace(), [BusEvent::Command(0x70)]);
    }

    #[test]
    fn test_erase_failure_restores_write_protect() {
        use nandbang_core::error::Error;

        let sim = SimNand::new_default();
        sim.set_fail_erase(true);
        let mut flash = open(&sim);

        match flash.erase_block(3) {
            Err(Error::EraseError(failure)) => {
                assert_eq!(failure.block, 3);
                assert!(StatusRegister::from_raw(failure.status).failed());
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(!sim.control_pins().contains(ControlPins::NWP));
    }

    #[test]
    fn test_bounded_read_times_out() {
        use nandbang_core::error::Error;

        let sim = SimNand::new_default();
        let mut flash = open(&sim);
        sim.set_stuck_busy(true);

        let mut buf = [0u8; 2112];
        assert_eq!(
            flash.read_page_bounded_into(0, &mut buf, 5),
            Err(Error::Timeout { polls: 5 })
        );
        let polls = sim
            .trace()
            .iter()
            .filter(|e| matches!(e, BusEvent::BusyPoll { .. }))
            .count();
        assert_eq!(polls, 5);
        // Device recovers, the session is still usable
        sim.set_stuck_busy(false);
        sim.clear_trace();
        assert!(flash.read_id().unwrap().is_match());
        assert_eq!(sim.trace()[..2], [BusEvent::Command(0x90), BusEvent::Address(0x00)]);
    }

    #[test]
    fn test_dump_pages_in_order() {
        use nandbang_core::dump::dump_pages;

        let sim = SimNand::with_pattern(DummyConfig::default());
        let mut flash = open(&sim);
        let mut out = Vec::new();
        let mut seen = Vec::new();

        let written = dump_pages(&mut flash, 2, 2, &mut out, &mut |page, bytes| {
            seen.push((page, bytes))
        })
        .unwrap();

        assert_eq!(written, 4224);
        assert_eq!(out[..2112], page_pattern(2, 2112)[..]);
        assert_eq!(out[2112..], page_pattern(3, 2112)[..]);
        assert_eq!(seen, [(2, 2112), (3, 4224)]);
    }

    #[test]
    fn test_self_test_returns_to_idle() {
        use nandbang_core::bus::Pin;
        use nandbang_core::protocol::SelfTestStep;

        let sim = SimNand::new_default();
        let mut flash = open(&sim);
        let idle = sim.control_pins();

        let mut steps = Vec::new();
        flash.self_test(0, &mut |step| steps.push(step)).unwrap();

        assert_eq!(
            steps.first(),
            Some(&SelfTestStep::ControlPin {
                pin: Pin::Cle,
                on: true
            })
        );
        assert_eq!(sim.control_pins(), idle);
        assert!(sim.data_driven());
        assert!(flash.read_id().unwrap().is_match());
    }
}
