use embedded_error::mci::{CommandOrDataError, MciError};
use embedded_hal::blocking::spi;
use embedded_hal::digital::v2::OutputPin;

use super::bus::SpiBus;
use super::response::{ErrorToken, BLOCK_READ_DATA_TOKEN};

/// Polls for the data start token, about 160 ms at 25 MHz (Nac is 100 ms for SDHC/SDXC)
const NAC_MAX_BYTES: u32 = 500_000;

impl<SPI, CS, DELAY, E, OE> SpiBus<SPI, CS, DELAY>
where
    SPI: spi::Transfer<u8, Error = E> + spi::Write<u8, Error = E>,
    CS: OutputPin<Error = OE>,
{
    fn start_read_block(&mut self) -> Result<(), MciError> {
        let mut token = self.read_byte()?;
        let mut counter = NAC_MAX_BYTES;
        while token != BLOCK_READ_DATA_TOKEN {
            if let Some(error) = ErrorToken::parse(token) {
                error.check()?;
            }
            counter -= 1;
            if counter == 0 {
                return Err(MciError::DataError(CommandOrDataError::Timeout));
            }
            token = self.read_byte()?;
        }
        Ok(())
    }

    fn stop_read_block(&mut self) -> Result<(), MciError> {
        let _crc = [self.read_byte()?, self.read_byte()?]; // not checked
        Ok(())
    }

    /// Read one data block of `buf.len()` bytes following a command response
    pub(crate) fn read_block(&mut self, buf: &mut [u8]) -> Result<(), MciError> {
        self.start_read_block()?;
        self.read_bytes(buf)?;
        self.stop_read_block()
    }
}
