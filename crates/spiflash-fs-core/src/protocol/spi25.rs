//! SPI25 protocol implementation
//!
//! This module implements the JEDEC command sequences needed to read,
//! program and erase a NOR flash through a [`SpiBus`]. Every destructive
//! command is preceded by Write Enable and followed by a busy-wait, so the
//! chip is always idle when one of these functions returns `Ok`.

use crate::bus::{CommandFlags, SpiBus};
use crate::config::{BusyPolicy, FlashConfig};
use crate::error::{Error, Result};
use crate::spi::{opcodes, BusCommand};

/// Read the status register
pub fn read_status<B: SpiBus + ?Sized>(bus: &mut B, cfg: &FlashConfig) -> Result<u8> {
    let mut buf = [0u8; 1];
    let cmd = BusCommand::simple(cfg.opcodes.read_status).encode();
    bus.command(cfg.target, cmd.as_bytes(), &mut buf, CommandFlags::empty())?;
    Ok(buf[0])
}

/// Send the Write Enable command
///
/// The latch clears itself once the following program or erase completes.
pub fn write_enable<B: SpiBus + ?Sized>(bus: &mut B, cfg: &FlashConfig) -> Result<()> {
    let cmd = BusCommand::simple(cfg.opcodes.write_enable).encode();
    bus.command(cfg.target, cmd.as_bytes(), &mut [], CommandFlags::empty())
}

/// Wait for the WIP (Write In Progress) bit to clear
///
/// Polls the status register at most `policy.max_polls` times, sleeping
/// `policy.poll_delay_us` between polls. Returns the number of polls it took.
///
/// # Errors
/// * `DeviceUnresponsive` - the busy bit was still set after the last poll
/// * `BusFault` - a status read failed
pub fn wait_ready<B: SpiBus + ?Sized>(
    bus: &mut B,
    cfg: &FlashConfig,
    policy: BusyPolicy,
) -> Result<u32> {
    for poll in 1..=policy.max_polls {
        let status = read_status(bus, cfg)?;
        if status & opcodes::SR1_WIP == 0 {
            return Ok(poll);
        }
        if poll < policy.max_polls && policy.poll_delay_us > 0 {
            bus.delay_us(policy.poll_delay_us);
        }
    }

    log::error!(
        "Flash still busy after {} polls ({} us)",
        policy.max_polls,
        policy.timeout_us()
    );
    Err(Error::DeviceUnresponsive)
}

/// Read `buf.len()` bytes starting at `addr` in a single bus transaction
pub fn read_data<B: SpiBus + ?Sized>(
    bus: &mut B,
    cfg: &FlashConfig,
    addr: u32,
    buf: &mut [u8],
) -> Result<()> {
    let cmd = BusCommand::addressed(cfg.opcodes.read, addr, cfg.address_width).encode();
    bus.command(cfg.target, cmd.as_bytes(), buf, CommandFlags::empty())
}

/// Program a single page chunk
///
/// The data must not cross a write page boundary. The header is sent with
/// [`CommandFlags::MERGE`] so chip select stays asserted for the data phase.
pub fn program_page<B: SpiBus + ?Sized>(
    bus: &mut B,
    cfg: &FlashConfig,
    addr: u32,
    data: &[u8],
) -> Result<()> {
    debug_assert!(
        (addr % cfg.write_page_size) as usize + data.len() <= cfg.write_page_size as usize,
        "page program crosses a page boundary"
    );

    write_enable(bus, cfg)?;

    let cmd = BusCommand::addressed(cfg.opcodes.write, addr, cfg.address_width).encode();
    bus.command(cfg.target, cmd.as_bytes(), &mut [], CommandFlags::MERGE)?;
    bus.command(cfg.target, data, &mut [], CommandFlags::empty())?;

    wait_ready(bus, cfg, cfg.program_wait).map(|_| ())
}

/// Erase the erase block starting at `addr`
pub fn erase_block<B: SpiBus + ?Sized>(bus: &mut B, cfg: &FlashConfig, addr: u32) -> Result<()> {
    write_enable(bus, cfg)?;

    let cmd = BusCommand::addressed(cfg.opcodes.erase, addr, cfg.address_width).encode();
    bus.command(cfg.target, cmd.as_bytes(), &mut [], CommandFlags::empty())?;

    let polls = wait_ready(bus, cfg, cfg.erase_wait)?;
    log::debug!("Erase at 0x{:08X} ready after {} polls", addr, polls);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bus that answers status reads from a script and counts traffic
    struct ScriptedBus {
        statuses: &'static [u8],
        polls: usize,
        delays: u32,
        fail: bool,
    }

    impl ScriptedBus {
        fn new(statuses: &'static [u8]) -> Self {
            Self {
                statuses,
                polls: 0,
                delays: 0,
                fail: false,
            }
        }
    }

    impl SpiBus for ScriptedBus {
        fn command(
            &mut self,
            _target: u8,
            tx: &[u8],
            rx: &mut [u8],
            _flags: CommandFlags,
        ) -> Result<()> {
            if self.fail {
                return Err(Error::BusFault);
            }
            if tx == [opcodes::RDSR] {
                let idx = self.polls.min(self.statuses.len() - 1);
                rx[0] = self.statuses[idx];
                self.polls += 1;
            }
            Ok(())
        }

        fn delay_us(&mut self, us: u32) {
            self.delays += us;
        }
    }

    #[test]
    fn test_wait_ready_counts_polls() {
        let mut bus = ScriptedBus::new(&[0x03, 0x01, 0x00]);
        let polls = wait_ready(&mut bus, &FlashConfig::DEFAULT, BusyPolicy::PAGE_PROGRAM).unwrap();
        assert_eq!(polls, 3);
        assert_eq!(bus.delays, 20);
    }

    #[test]
    fn test_wait_ready_ignores_wel() {
        let mut bus = ScriptedBus::new(&[opcodes::SR1_WEL]);
        assert_eq!(
            wait_ready(&mut bus, &FlashConfig::DEFAULT, BusyPolicy::PAGE_PROGRAM),
            Ok(1)
        );
    }

    #[test]
    fn test_wait_ready_times_out() {
        let mut bus = ScriptedBus::new(&[opcodes::SR1_WIP]);
        let policy = BusyPolicy {
            poll_delay_us: 5,
            max_polls: 8,
        };
        assert_eq!(
            wait_ready(&mut bus, &FlashConfig::DEFAULT, policy),
            Err(Error::DeviceUnresponsive)
        );
        assert_eq!(bus.polls, 8);
        assert_eq!(bus.delays, 35);
    }

    #[test]
    fn test_bus_fault_propagates() {
        let mut bus = ScriptedBus::new(&[0x00]);
        bus.fail = true;
        assert_eq!(
            erase_block(&mut bus, &FlashConfig::DEFAULT, 0),
            Err(Error::BusFault)
        );
        assert_eq!(read_status(&mut bus, &FlashConfig::DEFAULT), Err(Error::BusFault));
    }
}
