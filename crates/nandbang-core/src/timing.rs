//! Bus settle and hold delays
//!
//! The engine never relies on the adapter's own latency for timing. Every
//! wait the datasheet asks for between two pin transitions is looked up in
//! a [`TimingProfile`]. The default table uses 10 µs for every address and
//! data-out transition, which is orders of magnitude above the device's
//! nanosecond limits but matches what the bit-banged USB path can do
//! reliably.

/// Pin transition that may be followed by a delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// After the command byte is placed on the bus
    CommandSetup,
    /// After nWE goes low in an address cycle
    AddressWeLow,
    /// After the address byte is placed on the bus
    AddressSetup,
    /// After nWE goes high in an address cycle
    AddressHold,
    /// After nRE goes low, before sampling
    ReadAccess,
    /// After nRE goes high again
    ReadHold,
    /// Between two R/B polls
    BusyPoll,
}

/// Per-transition delay table in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Deserialize))]
#[cfg_attr(feature = "std", serde(default, deny_unknown_fields))]
pub struct TimingProfile {
    /// Delay after the command byte is driven
    pub command_setup_us: u32,
    /// Delay after nWE low in an address cycle
    pub address_we_low_us: u32,
    /// Delay after the address byte is driven
    pub address_setup_us: u32,
    /// Delay after nWE high in an address cycle
    pub address_hold_us: u32,
    /// Delay between nRE low and sampling the data bus
    pub read_access_us: u32,
    /// Delay after nRE high
    pub read_hold_us: u32,
    /// Delay between two R/B polls
    pub busy_poll_us: u32,
}

impl TimingProfile {
    /// 10 µs on every address and data-out transition
    pub const fn conservative() -> Self {
        Self {
            command_setup_us: 0,
            address_we_low_us: 10,
            address_setup_us: 10,
            address_hold_us: 10,
            read_access_us: 10,
            read_hold_us: 10,
            busy_poll_us: 0,
        }
    }

    /// No delays at all (simulated devices)
    pub const fn none() -> Self {
        Self {
            command_setup_us: 0,
            address_we_low_us: 0,
            address_setup_us: 0,
            address_hold_us: 0,
            read_access_us: 0,
            read_hold_us: 0,
            busy_poll_us: 0,
        }
    }

    /// Delay to apply after `transition`
    pub const fn delay(&self, transition: Transition) -> u32 {
        match transition {
            Transition::CommandSetup => self.command_setup_us,
            Transition::AddressWeLow => self.address_we_low_us,
            Transition::AddressSetup => self.address_setup_us,
            Transition::AddressHold => self.address_hold_us,
            Transition::ReadAccess => self.read_access_us,
            Transition::ReadHold => self.read_hold_us,
            Transition::BusyPoll => self.busy_poll_us,
        }
    }
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self::conservative()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_conservative() {
        let timing = TimingProfile::default();
        assert_eq!(timing.delay(Transition::AddressWeLow), 10);
        assert_eq!(timing.delay(Transition::ReadAccess), 10);
        assert_eq!(timing.delay(Transition::CommandSetup), 0);
    }

    #[test]
    fn test_none_has_no_delays() {
        let timing = TimingProfile::none();
        assert_eq!(timing.delay(Transition::AddressHold), 0);
        assert_eq!(timing.delay(Transition::ReadHold), 0);
    }
}
