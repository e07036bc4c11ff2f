use embedded_error::mci::MciError;

use crate::bus::{Bus, DataPhase};
use crate::commands::{Command, SDMMC_CMD55_APP_CMD};
use crate::error::error_name;

/// How long to wait for a card to release the busy signal after an R1b response
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BusyPolicy {
    pub timeout_ms: u32,
    pub poll_interval_ms: u32,
}

impl Default for BusyPolicy {
    fn default() -> Self {
        Self { timeout_ms: 60_000, poll_interval_ms: 100 }
    }
}

pub struct Card<BUS> {
    /// Command transport
    pub bus: BUS,
    /// Relative card address, always 0 in SPI mode
    pub rca: u16,
    pub busy: BusyPolicy,
}

impl<BUS: Bus> Card<BUS> {
    pub fn new(bus: BUS) -> Self {
        Self { bus, rca: 0, busy: BusyPolicy::default() }
    }

    pub fn with_busy_policy(mut self, busy: BusyPolicy) -> Self {
        self.busy = busy;
        self
    }

    pub fn free(self) -> BUS {
        self.bus
    }

    /// Send a single command, then wait out the busy signal of an R1b response.
    /// A failed command is returned as is, without waiting.
    pub fn send_command(
        &mut self,
        command: Command,
        argument: u32,
        data: DataPhase<'_>,
    ) -> Result<(), MciError> {
        log::debug!("{} arg {:#010x}, {} data bytes", command, argument, data.len());
        self.bus.send(command, argument, data)?;
        if command.response.is_busy() {
            let BusyPolicy { timeout_ms, poll_interval_ms } = self.busy;
            log::debug!("{} busy wait, {} ms budget", command, timeout_ms);
            self.bus.wait_until_not_busy(timeout_ms, poll_interval_ms)?;
        }
        Ok(())
    }

    /// CMD55 followed by the application command
    pub fn send_app_command(
        &mut self,
        command: Command,
        argument: u32,
        data: DataPhase<'_>,
    ) -> Result<(), MciError> {
        let rca = (self.rca as u32) << 16;
        if let Err(e) = self.send_command(SDMMC_CMD55_APP_CMD, rca, DataPhase::None) {
            let prefix = SDMMC_CMD55_APP_CMD;
            log::warn!("{} prefix of {} failed: {}", prefix, command, error_name(&e));
            return Err(e);
        }
        self.send_command(command, argument, data)
    }
}
