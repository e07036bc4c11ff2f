use core::fmt;

use crate::command_responses::Response;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub index: u8,
    pub response: Response,
    /// Must be preceded by CMD55
    pub app: bool,
}

impl Command {
    pub const fn new(index: u8, response: Response) -> Self {
        Self { index, response, app: false }
    }

    pub const fn app(index: u8, response: Response) -> Self {
        Self { index, response, app: true }
    }
}

impl Into<u8> for Command {
    fn into(self) -> u8 {
        self.index
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.app { "ACMD" } else { "CMD" };
        write!(f, "{}{}", prefix, self.index)
    }
}

pub const SD_CMD6_SWITCH_FUNC: Command = Command::new(6, Response::R1);
pub const SDMMC_CMD9_SEND_CSD: Command = Command::new(9, Response::R1);
pub const SDMMC_CMD10_SEND_CID: Command = Command::new(10, Response::R1);
pub const SD_CMD32_ERASE_WR_BLK_START: Command = Command::new(32, Response::R1);
pub const SD_CMD33_ERASE_WR_BLK_END: Command = Command::new(33, Response::R1);
pub const SDMMC_CMD38_ERASE: Command = Command::new(38, Response::R1b);
pub const SDMMC_CMD55_APP_CMD: Command = Command::new(55, Response::R1);
// SD status is answered with R2 in SPI mode
pub const SD_ACMD13_SD_STATUS: Command = Command::app(13, Response::R2);
pub const SD_ACMD51_SEND_SCR: Command = Command::app(51, Response::R1);
