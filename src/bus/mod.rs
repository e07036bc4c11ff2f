#[cfg(feature = "spi")]
pub mod spi;

use embedded_error::mci::MciError;

use crate::commands::Command;

pub const SD_MMC_BLOCK_SIZE: usize = 512;

/// Data transferred after the command response
pub enum DataPhase<'a> {
    /// Command only
    None,
    /// Read `buf.len()` bytes of response data into `buf`
    Read(&'a mut [u8]),
}

impl<'a> DataPhase<'a> {
    pub fn len(&self) -> usize {
        match self {
            DataPhase::None => 0,
            DataPhase::Read(buf) => buf.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Command transport to a single card
pub trait Bus {
    /// Send one command frame and, with `DataPhase::Read`, receive that many bytes of data.
    /// Busy signalling after an R1b response is not waited for here.
    fn send(&mut self, command: Command, argument: u32, data: DataPhase<'_>)
        -> Result<(), MciError>;

    /// Poll the card until it releases the busy signal
    ///
    /// # Arguments
    /// * `timeout_ms`: Overall time budget
    /// * `poll_interval_ms`: Pause between two polls
    fn wait_until_not_busy(&mut self, timeout_ms: u32, poll_interval_ms: u32)
        -> Result<(), MciError>;
}

impl<B: Bus + ?Sized> Bus for &mut B {
    fn send(
        &mut self,
        command: Command,
        argument: u32,
        data: DataPhase<'_>,
    ) -> Result<(), MciError> {
        (**self).send(command, argument, data)
    }

    fn wait_until_not_busy(
        &mut self,
        timeout_ms: u32,
        poll_interval_ms: u32,
    ) -> Result<(), MciError> {
        (**self).wait_until_not_busy(timeout_ms, poll_interval_ms)
    }
}
