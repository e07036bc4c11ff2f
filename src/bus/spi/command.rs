use embedded_error::mci::{CommandOrDataError, MciError};
use embedded_hal::blocking::spi;
use embedded_hal::digital::v2::OutputPin;

use crate::commands::Command;

use super::bus::SpiBus;
use super::response::R1;

/// Bytes the card may take to answer a command (Ncr)
const NCR_MAX_BYTES: usize = 8;

pub fn crc7(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &b in data.iter() {
        for i in 0..8 {
            crc <<= 1;
            if (((b << i) & 0x80) ^ (crc & 0x80)) != 0 {
                crc ^= 0x09;
            }
        }
    }
    (crc << 1) | 1
}

impl<SPI, CS, DELAY, E, OE> SpiBus<SPI, CS, DELAY>
where
    SPI: spi::Transfer<u8, Error = E> + spi::Write<u8, Error = E>,
    CS: OutputPin<Error = OE>,
{
    /// Send a command frame and collect its response into `last_response`
    pub(crate) fn command(&mut self, command: Command, argument: u32) -> Result<(), MciError> {
        // 8 cycles to respect Ncs timing
        // NOTE: This byte does not include start bit "0", thus it is ignored by card.
        self.write_byte(0xFF)?;

        let mut frame = [0u8; 6];
        frame[0] = 0x40 | (command.index & 0x3F);
        frame[1..5].copy_from_slice(&argument.to_be_bytes());
        frame[5] = crc7(&frame[..5]);
        self.write_bytes(&frame)?;

        let mut r1 = R1::from_bits_retain(self.read_byte()?);
        let mut ncr = 1;
        while r1.pending() {
            if ncr == NCR_MAX_BYTES {
                return Err(MciError::CommandError(CommandOrDataError::Timeout));
            }
            r1 = R1::from_bits_retain(self.read_byte()?);
            ncr += 1;
        }
        self.last_response = r1.bits() as u32;
        r1.check()?;

        for _ in 0..command.response.spi_trailing_bytes() {
            self.last_response = (self.last_response << 8) | self.read_byte()? as u32;
        }
        Ok(())
    }
}
