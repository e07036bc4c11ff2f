pub mod geometry;
pub mod report;

use embedded_error::mci::MciError;

use crate::bus::{Bus, DataPhase};
use crate::card::Card;
use crate::commands::{SDMMC_CMD38_ERASE, SD_CMD32_ERASE_WR_BLK_START, SD_CMD33_ERASE_WR_BLK_END};
use crate::error::error_name;
use crate::registers::cid::Cid;
use crate::registers::csd::Csd;
use crate::registers::sd::scr::Scr;
use crate::registers::sd::sd_status::SdStatus;
use crate::registers::sd::switch_status::SwitchStatus;

use geometry::{DiskGeometry, Geometry};
use report::{Report, Step};

/// Everything `Controller::info` read from the card
pub struct CardInfo {
    pub disk: DiskGeometry,
    pub cid: Result<Cid, MciError>,
    pub csd: Result<Csd, MciError>,
    pub scr: Result<Scr, MciError>,
    pub sd_status: Result<SdStatus, MciError>,
    pub switch_status: Result<SwitchStatus, MciError>,
}

/// Result of each of the three erase commands
pub struct EraseOutcome {
    pub disk: DiskGeometry,
    pub start: Result<(), MciError>,
    pub end: Result<(), MciError>,
    pub erase: Result<(), MciError>,
}

impl EraseOutcome {
    pub fn is_ok(&self) -> bool {
        self.start.is_ok() && self.end.is_ok() && self.erase.is_ok()
    }
}

pub struct Controller<BUS, GEOMETRY> {
    pub card: Card<BUS>,
    pub geometry: GEOMETRY,
}

fn reported<T>(report: &mut impl Report, step: Step, result: &Result<T, MciError>) {
    let result = result.as_ref().map(|_| ());
    if let Err(e) = result {
        log::warn!("{} failed: {}", step, error_name(e));
    }
    report.command(step, result);
}

impl<BUS: Bus, GEOMETRY: Geometry> Controller<BUS, GEOMETRY> {
    pub fn new(card: Card<BUS>, geometry: GEOMETRY) -> Self {
        Self { card, geometry }
    }

    pub fn free(self) -> (Card<BUS>, GEOMETRY) {
        (self.card, self.geometry)
    }

    fn disk_geometry(&mut self, report: &mut impl Report) -> Result<DiskGeometry, MciError> {
        let disk = self.geometry.query();
        reported(report, Step::Geometry, &disk);
        let disk = disk?;
        report.geometry(&disk);
        Ok(disk)
    }

    /// Read and report every register the card exposes.
    /// Only a geometry failure stops the flow, a failed register read is reported and skipped.
    pub fn info(&mut self, mut report: impl Report) -> Result<CardInfo, MciError> {
        let report = &mut report;
        let disk = self.disk_geometry(report)?;

        let cid = self.card.load_cid();
        reported(report, Step::Cid, &cid);
        if let Ok(cid) = &cid {
            report.cid(cid);
        }

        let csd = self.card.load_csd();
        reported(report, Step::Csd, &csd);
        if let Ok(csd) = &csd {
            report.csd(csd, &disk);
        }

        let scr = self.card.load_scr();
        reported(report, Step::Scr, &scr);
        if let Ok(scr) = &scr {
            report.scr(scr);
        }

        let sd_status = self.card.load_sd_status();
        reported(report, Step::SdStatus, &sd_status);
        if let Ok(status) = &sd_status {
            report.sd_status(status);
        }

        let switch_status = self.card.load_switch_status();
        reported(report, Step::SwitchStatus, &switch_status);
        if let Ok(status) = &switch_status {
            report.switch_status(status);
        }

        Ok(CardInfo { disk, cid, csd, scr, sd_status, switch_status })
    }

    /// Erase the whole card, block 0 up to the last block of the disk geometry.
    /// Each command runs even if the previous one failed, nothing is retried.
    pub fn erase(&mut self, mut report: impl Report) -> Result<EraseOutcome, MciError> {
        let report = &mut report;
        let disk = self.disk_geometry(report)?;
        if disk.block_count == 0 {
            log::warn!("No blocks to erase");
            return Err(MciError::UnusableCard);
        }

        let start = self.card.send_command(SD_CMD32_ERASE_WR_BLK_START, 0, DataPhase::None);
        reported(report, Step::EraseStart, &start);

        let last = disk.block_count - 1;
        let end = self.card.send_command(SD_CMD33_ERASE_WR_BLK_END, last, DataPhase::None);
        reported(report, Step::EraseEnd, &end);

        let erase = self.card.send_command(SDMMC_CMD38_ERASE, 0, DataPhase::None);
        reported(report, Step::Erase, &erase);

        Ok(EraseOutcome { disk, start, end, erase })
    }
}

#[cfg(test)]
mod tests {
    use embedded_error::mci::MciError;

    use super::geometry::mock::FixedGeometry;
    use super::report::mock::RecordingReport;
    use super::*;
    use crate::card::mock::{Call, RecordingBus};
    use crate::card::BusyPolicy;
    use crate::commands::{
        SDMMC_CMD10_SEND_CID, SDMMC_CMD55_APP_CMD, SDMMC_CMD9_SEND_CSD, SD_ACMD13_SD_STATUS,
        SD_ACMD51_SEND_SCR, SD_CMD6_SWITCH_FUNC,
    };

    const SDHC_CSD: [u8; 16] = [
        0x40, 0x0E, 0x00, 0x32, 0x5B, 0x59, 0x00, 0x00, 0xED, 0xC8, 0x7F, 0x80, 0x0A, 0x40, 0x40,
        0x01,
    ];

    fn controller(
        bus: RecordingBus,
        geometry: FixedGeometry,
    ) -> Controller<RecordingBus, FixedGeometry> {
        Controller::new(Card::new(bus), geometry)
    }

    #[test]
    fn test_info_order() {
        let mut bus = RecordingBus::default();
        bus.answer(SDMMC_CMD9_SEND_CSD, &SDHC_CSD);
        let mut controller = controller(bus, FixedGeometry::new(62_333_952, 512));
        let mut report = RecordingReport::default();
        let info = controller.info(&mut report).ok().unwrap();

        assert_eq!(
            controller.card.bus.sent(),
            [
                (SDMMC_CMD10_SEND_CID, 0),
                (SDMMC_CMD9_SEND_CSD, 0),
                (SDMMC_CMD55_APP_CMD, 0),
                (SD_ACMD51_SEND_SCR, 0),
                (SDMMC_CMD55_APP_CMD, 0),
                (SD_ACMD13_SD_STATUS, 0),
                (SD_CMD6_SWITCH_FUNC, 0x00FF_FFFF),
            ]
        );
        assert_eq!(
            report.lines,
            [
                "DISK_GEOMETRY ok",
                "geometry 62333952",
                "SD_SEND_CID ok",
                "cid",
                "SD_SEND_CSD ok",
                "csd 62333952 62333952",
                "SD_APP_SEND_SCR ok",
                "scr",
                "SD_APP_SD_STATUS ok",
                "sd_status",
                "SD_SWITCH ok",
                "switch_status",
            ]
        );
        assert_eq!(info.disk.block_count, 62_333_952);
        assert_eq!(info.csd.ok().unwrap().block_count, 62_333_952);
    }

    #[test]
    fn test_info_continues_after_failed_read() {
        let mut bus = RecordingBus::default();
        bus.fail(SDMMC_CMD10_SEND_CID).fail(SD_ACMD51_SEND_SCR);
        let mut controller = controller(bus, FixedGeometry::new(1024, 512));
        let mut report = RecordingReport::default();
        let info = controller.info(&mut report).ok().unwrap();

        assert!(info.cid.is_err());
        assert!(info.csd.is_ok());
        assert!(info.scr.is_err());
        assert!(info.sd_status.is_ok());
        assert!(info.switch_status.is_ok());
        assert_eq!(report.failed, [Step::Cid, Step::Scr]);
        assert!(!report.lines.iter().any(|line| line == "cid" || line == "scr"));
        assert_eq!(controller.card.bus.sent().len(), 7);
    }

    #[test]
    fn test_info_failed_app_prefix_skips_target() {
        let mut bus = RecordingBus::default();
        bus.fail(SDMMC_CMD55_APP_CMD);
        let mut controller = controller(bus, FixedGeometry::new(1024, 512));
        let info = controller.info(()).ok().unwrap();

        assert!(info.scr.is_err());
        assert!(info.sd_status.is_err());
        let sent = controller.card.bus.sent();
        assert!(!sent.iter().any(|(command, _)| command.app));
        assert_eq!(sent.len(), 5);
    }

    #[test]
    fn test_geometry_failure_aborts_before_commands() {
        let mut controller = controller(RecordingBus::default(), FixedGeometry::failing());
        let mut report = RecordingReport::default();
        assert!(matches!(controller.info(&mut report), Err(MciError::ReadError)));
        assert!(matches!(controller.erase(&mut report), Err(MciError::ReadError)));
        assert!(controller.card.bus.calls.is_empty());
        assert_eq!(report.failed, [Step::Geometry, Step::Geometry]);
    }

    #[test]
    fn test_erase_sequence() {
        let busy = BusyPolicy { timeout_ms: 60_000, poll_interval_ms: 100 };
        let card = Card::new(RecordingBus::default()).with_busy_policy(busy);
        let mut controller = Controller::new(card, FixedGeometry::new(62_333_952, 512));
        let mut report = RecordingReport::default();
        let outcome = controller.erase(&mut report).ok().unwrap();

        assert!(outcome.is_ok());
        assert_eq!(
            controller.card.bus.calls,
            [
                Call::Send(SD_CMD32_ERASE_WR_BLK_START, 0, 0),
                Call::Send(SD_CMD33_ERASE_WR_BLK_END, 62_333_951, 0),
                Call::Send(SDMMC_CMD38_ERASE, 0, 0),
                Call::BusyWait(60_000, 100),
            ]
        );
        assert_eq!(
            report.lines[2..],
            ["SD_ERASE_BLOCK_START ok", "SD_ERASE_BLOCK_END ok", "SD_ERASE_BLOCK_OPERATION ok"]
        );
    }

    #[test]
    fn test_erase_single_block() {
        let mut controller = controller(RecordingBus::default(), FixedGeometry::new(1, 512));
        assert!(controller.erase(()).is_ok());
        assert_eq!(controller.card.bus.sent()[1], (SD_CMD33_ERASE_WR_BLK_END, 0));
    }

    #[test]
    fn test_erase_empty_card() {
        let mut controller = controller(RecordingBus::default(), FixedGeometry::new(0, 512));
        assert!(matches!(controller.erase(()), Err(MciError::UnusableCard)));
        assert!(controller.card.bus.calls.is_empty());
    }

    #[test]
    fn test_erase_continues_after_failure() {
        let mut bus = RecordingBus::default();
        bus.fail(SD_CMD33_ERASE_WR_BLK_END);
        let mut controller = controller(bus, FixedGeometry::new(1024, 512));
        let mut report = RecordingReport::default();
        let outcome = controller.erase(&mut report).ok().unwrap();

        assert!(outcome.start.is_ok());
        assert!(outcome.end.is_err());
        assert!(outcome.erase.is_ok());
        assert!(!outcome.is_ok());
        assert_eq!(controller.card.bus.sent().len(), 3);
        assert_eq!(report.failed, [Step::EraseEnd]);
    }

    #[test]
    fn test_erase_busy_timeout_reported() {
        let mut bus = RecordingBus::default();
        bus.busy_timeout = true;
        let mut controller = controller(bus, FixedGeometry::new(1024, 512));
        let outcome = controller.erase(()).ok().unwrap();
        assert!(outcome.start.is_ok() && outcome.end.is_ok());
        assert!(matches!(outcome.erase, Err(MciError::DataError(_))));
    }

    #[cfg(feature = "spi")]
    #[test]
    fn test_erase_over_spi() {
        use crate::bus::spi::mock::{MockDelay, MockPin, MockSpi};
        use crate::bus::spi::SpiBus;

        // Each command: 7 bytes clocked while sending, R1, release
        let mut miso = std::vec::Vec::new();
        for _ in 0..3 {
            miso.extend(&[0xFF; 7]);
            miso.extend(&[0x00, 0xFF]);
        }
        // Busy for two polls after CMD38
        miso.extend(&[0x00, 0x00, 0xFF, 0xFF]);
        let bus = SpiBus::new(MockSpi::with(&miso), MockPin::default(), MockDelay::default());
        let mut controller = Controller::new(Card::new(bus), FixedGeometry::new(1024, 512));
        let outcome = controller.erase(()).ok().unwrap();
        assert!(outcome.is_ok());

        let (spi, cs, delay) = controller.free().0.free().free();
        assert_eq!(delay.total_ms, 200);
        assert!(!cs.low);
        assert_eq!(&spi.mosi[10..15], &[0x40 | 33, 0x00, 0x00, 0x03, 0xFF]);
    }
}
