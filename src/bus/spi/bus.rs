use embedded_error::mci::{CommandOrDataError, MciError};
use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::spi;
use embedded_hal::digital::v2::OutputPin;

use crate::bus::{Bus, DataPhase};
use crate::commands::Command;

/// SD card in SPI mode behind a blocking SPI bus and a chip select pin
pub struct SpiBus<SPI, CS, DELAY> {
    pub(crate) spi: SPI,
    cs: CS,
    delay: DELAY,
    pub(crate) last_response: u32,
}

impl<SPI, CS, DELAY, E, OE> SpiBus<SPI, CS, DELAY>
where
    SPI: spi::Transfer<u8, Error = E> + spi::Write<u8, Error = E>,
    CS: OutputPin<Error = OE>,
{
    pub fn new(spi: SPI, cs: CS, delay: DELAY) -> Self {
        Self { spi, cs, delay, last_response: 0 }
    }

    /// Response of the last command: the R1 byte, followed by the trailing R2/R3/R7 bytes
    pub fn last_response(&self) -> u32 {
        self.last_response
    }

    pub fn free(self) -> (SPI, CS, DELAY) {
        (self.spi, self.cs, self.delay)
    }

    pub(crate) fn write_byte(&mut self, value: u8) -> Result<(), MciError> {
        self.spi.write(&[value]).map_err(|_| MciError::WriteError)
    }

    pub(crate) fn read_byte(&mut self) -> Result<u8, MciError> {
        let mut retval = 0xFF;
        self.spi.transfer(core::slice::from_mut(&mut retval)).map_err(|_| MciError::ReadError)?;
        Ok(retval)
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), MciError> {
        self.spi.write(bytes).map_err(|_| MciError::WriteError)
    }

    pub(crate) fn read_bytes<'a>(&mut self, bytes: &'a mut [u8]) -> Result<&'a [u8], MciError> {
        bytes.iter_mut().for_each(|b| *b = 0xFF);
        self.spi.transfer(bytes).map_err(|_| MciError::ReadError)?;
        Ok(bytes)
    }

    fn select(&mut self) -> Result<(), MciError> {
        self.cs.set_low().map_err(|_| MciError::CouldNotSelectDevice)
    }

    /// Deselect and give the card 8 clocks to release DO
    fn release(&mut self) -> Result<(), MciError> {
        self.cs.set_high().map_err(|_| MciError::CouldNotSelectDevice)?;
        self.write_byte(0xFF)
    }
}

impl<SPI, CS, DELAY, E, OE> SpiBus<SPI, CS, DELAY>
where
    SPI: spi::Transfer<u8, Error = E> + spi::Write<u8, Error = E>,
    CS: OutputPin<Error = OE>,
    DELAY: DelayMs<u32>,
{
    pub(crate) fn wait_busy(
        &mut self,
        timeout_ms: u32,
        poll_interval_ms: u32,
    ) -> Result<(), MciError> {
        let mut elapsed = 0u32;
        loop {
            // DO is held low while busy
            if self.read_byte()? == 0xFF {
                return Ok(());
            }
            if elapsed >= timeout_ms {
                return Err(MciError::DataError(CommandOrDataError::Timeout));
            }
            self.delay.delay_ms(poll_interval_ms);
            elapsed = elapsed.saturating_add(poll_interval_ms.max(1));
        }
    }
}

impl<SPI, CS, DELAY, E, OE> Bus for SpiBus<SPI, CS, DELAY>
where
    SPI: spi::Transfer<u8, Error = E> + spi::Write<u8, Error = E>,
    CS: OutputPin<Error = OE>,
    DELAY: DelayMs<u32>,
{
    fn send(
        &mut self,
        command: Command,
        argument: u32,
        data: DataPhase<'_>,
    ) -> Result<(), MciError> {
        self.select()?;
        let result = self.command(command, argument).and_then(|_| match data {
            DataPhase::None => Ok(()),
            DataPhase::Read(buf) => self.read_block(buf),
        });
        let released = self.release();
        result.and(released)
    }

    fn wait_until_not_busy(
        &mut self,
        timeout_ms: u32,
        poll_interval_ms: u32,
    ) -> Result<(), MciError> {
        self.select()?;
        let result = self.wait_busy(timeout_ms, poll_interval_ms);
        let released = self.release();
        result.and(released)
    }
}
