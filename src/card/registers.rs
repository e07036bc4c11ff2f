use embedded_error::mci::MciError;

use crate::bus::{Bus, DataPhase};
use crate::command_arguments::Cmd6;
use crate::commands::{
    SDMMC_CMD10_SEND_CID, SDMMC_CMD9_SEND_CSD, SD_ACMD13_SD_STATUS, SD_ACMD51_SEND_SCR,
    SD_CMD6_SWITCH_FUNC,
};
use crate::registers::cid::Cid;
use crate::registers::csd::Csd;
use crate::registers::sd::scr::Scr;
use crate::registers::sd::sd_status::SdStatus;
use crate::registers::sd::switch_status::SwitchStatus;
use crate::registers::{CID_SIZE, CSD_SIZE, SCR_SIZE, SD_STATUS_SIZE, SWITCH_STATUS_SIZE};

use super::Card;

impl<BUS: Bus> Card<BUS> {
    /// CMD10: Card identification
    pub fn load_cid(&mut self) -> Result<Cid, MciError> {
        let mut buf = [0u8; CID_SIZE];
        self.send_command(SDMMC_CMD10_SEND_CID, 0, DataPhase::Read(&mut buf))?;
        Ok(buf.into())
    }

    /// CMD9: Card specific data
    pub fn load_csd(&mut self) -> Result<Csd, MciError> {
        let mut buf = [0u8; CSD_SIZE];
        self.send_command(SDMMC_CMD9_SEND_CSD, 0, DataPhase::Read(&mut buf))?;
        Ok(buf.into())
    }

    /// ACMD51: SD configuration
    pub fn load_scr(&mut self) -> Result<Scr, MciError> {
        let mut buf = [0u8; SCR_SIZE];
        self.send_app_command(SD_ACMD51_SEND_SCR, 0, DataPhase::Read(&mut buf))?;
        Ok(buf.into())
    }

    /// ACMD13
    pub fn load_sd_status(&mut self) -> Result<SdStatus, MciError> {
        let mut buf = [0u8; SD_STATUS_SIZE];
        self.send_app_command(SD_ACMD13_SD_STATUS, 0, DataPhase::Read(&mut buf))?;
        Ok(buf.into())
    }

    /// CMD6 in check mode, nothing is switched
    pub fn load_switch_status(&mut self) -> Result<SwitchStatus, MciError> {
        let mut buf = [0u8; SWITCH_STATUS_SIZE];
        self.send_command(SD_CMD6_SWITCH_FUNC, Cmd6::query().val, DataPhase::Read(&mut buf))?;
        Ok(buf.into())
    }
}
