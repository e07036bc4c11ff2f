use bitflags::bitflags;
use embedded_error::mci::{CommandOrDataError, MciError};
use embedded_error::ImplError;

bitflags! {
    /// SPI mode R1 token
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub(crate) struct R1: u8 {
        const IDLE = 1 << 0;
        const ERASE_RESET = 1 << 1;
        const ILLEGAL_COMMAND = 1 << 2;
        const COMMAND_CRC = 1 << 3;
        const ERASE_SEQUENCE = 1 << 4;
        const ADDRESS = 1 << 5;
        const PARAMETER = 1 << 6;
        /// Always clear in a valid R1, set while the card has not answered yet
        const START = 1 << 7;
    }
}

impl R1 {
    pub fn pending(self) -> bool {
        self.contains(R1::START)
    }

    /// Erase reset is informational and never fails a command
    pub fn check(self) -> Result<(), MciError> {
        let error = if self.contains(R1::COMMAND_CRC) {
            MciError::CommandError(CommandOrDataError::Crc)
        } else if self.contains(R1::ILLEGAL_COMMAND) {
            MciError::CommandError(CommandOrDataError::Index)
        } else if self.intersects(R1::ADDRESS | R1::PARAMETER) {
            MciError::Impl(ImplError::InvalidConfiguration)
        } else if self.contains(R1::ERASE_SEQUENCE) {
            MciError::WriteError
        } else if self.contains(R1::IDLE) {
            // Back in idle state, the card needs to be initialized again
            MciError::UnusableCard
        } else {
            return Ok(());
        };
        Err(error)
    }
}

pub const BLOCK_READ_DATA_TOKEN: u8 = 0xFE;

bitflags! {
    /// Sent instead of the start token when a read fails
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub(crate) struct ErrorToken: u8 {
        const ERROR = 1 << 0;
        const CC_ERROR = 1 << 1;
        const CARD_ECC_FAILED = 1 << 2;
        const OUT_OF_RANGE = 1 << 3;
        const CARD_IS_LOCKED = 1 << 4;
    }
}

impl ErrorToken {
    /// Upper three bits are clear in an error token
    pub fn parse(token: u8) -> Option<Self> {
        match token & 0xE0 {
            0 => Some(Self::from_bits_retain(token)),
            _ => None,
        }
    }

    pub fn check(self) -> Result<(), MciError> {
        if self.intersects(ErrorToken::ERROR | ErrorToken::OUT_OF_RANGE) {
            return Err(MciError::ReadError);
        }
        if self.contains(ErrorToken::CC_ERROR) {
            return Err(MciError::DataError(CommandOrDataError::Crc));
        }
        if self.intersects(ErrorToken::CARD_ECC_FAILED | ErrorToken::CARD_IS_LOCKED) {
            return Err(MciError::UnusableCard);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use embedded_error::mci::{CommandOrDataError, MciError};

    use super::*;

    #[test]
    fn test_r1() {
        assert!(R1::from_bits_retain(0xFF).pending());
        assert!(R1::empty().check().is_ok());
        assert!(R1::ERASE_RESET.check().is_ok());
        let r1 = R1::from_bits_retain(0x05);
        assert!(matches!(r1.check(), Err(MciError::CommandError(CommandOrDataError::Index))));
        assert!(matches!(R1::IDLE.check(), Err(MciError::UnusableCard)));
        assert!(matches!(R1::PARAMETER.check(), Err(MciError::Impl(_))));
    }

    #[test]
    fn test_error_token() {
        assert!(ErrorToken::parse(BLOCK_READ_DATA_TOKEN).is_none());
        assert!(ErrorToken::parse(0xFF).is_none());
        let token = ErrorToken::parse(0x08).unwrap();
        assert!(token.contains(ErrorToken::OUT_OF_RANGE));
        assert!(matches!(token.check(), Err(MciError::ReadError)));
        assert!(ErrorToken::parse(0x00).unwrap().check().is_ok());
    }
}
