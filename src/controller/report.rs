use core::fmt;

use embedded_error::mci::MciError;
use log::{info, warn};

use crate::error::error_name;
use crate::registers::cid::Cid;
use crate::registers::csd::{Csd, CsdFlags, CsdStructure};
use crate::registers::sd::scr::{BusWidths, Scr, ScrFlags};
use crate::registers::sd::sd_status::{DatBusWidth, SdStatus, SpeedClass};
use crate::registers::sd::switch_status::{
    BusSpeeds, CurrentLimits, DriverTypes, SwitchStatus, Timing,
};

use super::geometry::DiskGeometry;

/// One card operation performed by a diagnostic flow
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Geometry,
    Cid,
    Csd,
    Scr,
    SdStatus,
    SwitchStatus,
    EraseStart,
    EraseEnd,
    Erase,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Geometry => "DISK_GEOMETRY",
            Step::Cid => "SD_SEND_CID",
            Step::Csd => "SD_SEND_CSD",
            Step::Scr => "SD_APP_SEND_SCR",
            Step::SdStatus => "SD_APP_SD_STATUS",
            Step::SwitchStatus => "SD_SWITCH",
            Step::EraseStart => "SD_ERASE_BLOCK_START",
            Step::EraseEnd => "SD_ERASE_BLOCK_END",
            Step::Erase => "SD_ERASE_BLOCK_OPERATION",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Display class of the SD Status PERFORMANCE_MOVE byte
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PerformanceMove {
    NotDefined,
    Unlimited,
    MegabytesPerSecond(u8),
}

impl From<u8> for PerformanceMove {
    fn from(value: u8) -> Self {
        match value {
            0x00 => Self::NotDefined,
            0xFF => Self::Unlimited,
            mbps => Self::MegabytesPerSecond(mbps),
        }
    }
}

impl fmt::Display for PerformanceMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotDefined => write!(f, "0 (not defined)"),
            Self::Unlimited => write!(f, "0xFF (infinite / not limited)"),
            Self::MegabytesPerSecond(mbps) => write!(f, "{} MB/s", mbps),
        }
    }
}

/// Receives everything a diagnostic flow learns about the card.
/// Every method defaults to doing nothing, so `()` discards it all.
pub trait Report {
    fn geometry(&mut self, _disk: &DiskGeometry) {}

    /// Outcome of every step, failed or not
    fn command(&mut self, _step: Step, _result: Result<(), &MciError>) {}

    fn cid(&mut self, _cid: &Cid) {}

    /// Capacity from the CSD next to the one reported by the disk layer
    fn csd(&mut self, _csd: &Csd, _disk: &DiskGeometry) {}

    fn scr(&mut self, _scr: &Scr) {}

    fn sd_status(&mut self, _status: &SdStatus) {}

    fn switch_status(&mut self, _status: &SwitchStatus) {}
}

impl Report for () {}

impl<R: Report + ?Sized> Report for &mut R {
    fn geometry(&mut self, disk: &DiskGeometry) {
        (**self).geometry(disk)
    }

    fn command(&mut self, step: Step, result: Result<(), &MciError>) {
        (**self).command(step, result)
    }

    fn cid(&mut self, cid: &Cid) {
        (**self).cid(cid)
    }

    fn csd(&mut self, csd: &Csd, disk: &DiskGeometry) {
        (**self).csd(csd, disk)
    }

    fn scr(&mut self, scr: &Scr) {
        (**self).scr(scr)
    }

    fn sd_status(&mut self, status: &SdStatus) {
        (**self).sd_status(status)
    }

    fn switch_status(&mut self, status: &SwitchStatus) {
        (**self).switch_status(status)
    }
}

const CSD_FLAG_NAMES: [(CsdFlags, &str); 11] = [
    (CsdFlags::READ_BLOCK_PARTIAL, "Partial read blocks allowed"),
    (CsdFlags::WRITE_BLOCK_PARTIAL, "Partial write blocks allowed"),
    (CsdFlags::WRITE_BLOCK_MISALIGN, "Write block misalignment"),
    (CsdFlags::READ_BLOCK_MISALIGN, "Read block misalignment"),
    (CsdFlags::DSR_IMPLEMENTED, "DSR implemented"),
    (CsdFlags::ERASE_BLOCK_ENABLED, "Single-block erase enabled"),
    (CsdFlags::WRITE_PROTECT_GROUP_ENABLED, "Write protect group enabled"),
    (CsdFlags::FILE_FORMAT_GROUP, "Non-DOS/Windows file format"),
    (CsdFlags::COPY, "Content is copy of original"),
    (CsdFlags::PERMANENT_WRITE_PROTECT, "Permanently write-protected"),
    (CsdFlags::TEMPORARY_WRITE_PROTECT, "Temporarily write-protected"),
];

const BUS_SPEED_NAMES: [(BusSpeeds, &str); 5] = [
    (BusSpeeds::DEFAULT_SPEED, "Default speed / UHS SDR12"),
    (BusSpeeds::HIGH_SPEED, "High speed / UHS SDR25"),
    (BusSpeeds::UHS_SDR50, "UHS SDR50"),
    (BusSpeeds::UHS_SDR104, "UHS SDR104"),
    (BusSpeeds::UHS_DDR50, "UHS DDR50"),
];

const DRIVER_TYPE_NAMES: [(DriverTypes, &str); 4] = [
    (DriverTypes::TYPE_B, "Driver type B (default)"),
    (DriverTypes::TYPE_A, "Driver type A"),
    (DriverTypes::TYPE_C, "Driver type C"),
    (DriverTypes::TYPE_D, "Driver type D"),
];

const CURRENT_LIMIT_NAMES: [(CurrentLimits, &str); 4] = [
    (CurrentLimits::MAX_200MA, "up to 200 mA"),
    (CurrentLimits::MAX_400MA, "up to 400 mA"),
    (CurrentLimits::MAX_600MA, "up to 600 mA"),
    (CurrentLimits::MAX_800MA, "up to 800 mA"),
];

fn structure_name(structure: CsdStructure) -> &'static str {
    match structure {
        CsdStructure::V1 => "CSD v1.0 (SDSC)",
        CsdStructure::V2 => "CSD v2.0 (SDHC/SDXC)",
        CsdStructure::Reserved(_) => "Reserved/Unknown",
    }
}

fn bus_widths_name(widths: BusWidths) -> &'static str {
    if widths.contains(BusWidths::FOUR_BIT) {
        "1-bit & 4-bit"
    } else if widths.contains(BusWidths::ONE_BIT) {
        "1-bit"
    } else {
        "unknown"
    }
}

fn dat_bus_width_name(width: DatBusWidth) -> &'static str {
    match width {
        DatBusWidth::OneBit => "1-bit",
        DatBusWidth::FourBit => "4-bit",
        DatBusWidth::Reserved(_) => "reserved",
    }
}

fn speed_class_name(class: SpeedClass) -> &'static str {
    match class {
        SpeedClass::Class0 => "Class 0",
        SpeedClass::Class2 => "Class 2",
        SpeedClass::Class4 => "Class 4",
        SpeedClass::Class6 => "Class 6",
        SpeedClass::Class10 => "Class 10",
        SpeedClass::Reserved(_) => "Reserved/unknown",
    }
}

fn timing_name(timing: Timing) -> &'static str {
    match timing {
        Timing::Sdr12 => "Default / SDR12",
        Timing::Sdr25 => "High speed / SDR25",
        Timing::Sdr50 => "SDR50",
        Timing::Sdr104 => "SDR104",
        Timing::Ddr50 => "DDR50",
        Timing::Unknown(_) => "unknown",
    }
}

fn list<F: bitflags::Flags + Copy>(set: F, names: &[(F, &str)]) {
    for (flag, name) in names.iter() {
        if set.contains(*flag) {
            info!("    - {}", name);
        }
    }
}

/// Renders every decoded field as `info` log lines
#[derive(Copy, Clone, Debug, Default)]
pub struct LogReport;

impl Report for LogReport {
    fn geometry(&mut self, disk: &DiskGeometry) {
        info!("Block count {}", disk.block_count);
        info!("Sector size {}", disk.block_size);
        info!("Bulk size {} MB, {} GB", disk.size_mb(), disk.size_gb());
    }

    fn command(&mut self, step: Step, result: Result<(), &MciError>) {
        match result {
            Ok(()) => info!("{} ok", step),
            Err(e) => info!("{} failed: {}", step, error_name(e)),
        }
    }

    fn cid(&mut self, cid: &Cid) {
        let oem = cid.oem_id();
        let (major, minor) = cid.revision();
        info!("CID decode:");
        info!("  MID (manufacturer) : 0x{:02X} ({})", cid.manufacturer_id, cid.manufacturer_name());
        info!("  OID (OEM/app)      : {}{}", oem[0] as char, oem[1] as char);
        info!("  PNM (product)      : {}", cid.product_name_str().unwrap_or("?"));
        info!("  PRV (revision)     : {}.{}", major, minor);
        info!("  PSN (serial)       : 0x{:08X}", cid.serial_number);
        info!(
            "  MDT (date)         : {:04}-{:02}",
            cid.manufacturing_year(),
            cid.manufacturing_month()
        );
    }

    fn csd(&mut self, csd: &Csd, disk: &DiskGeometry) {
        let structure: u8 = csd.structure.into();
        info!("CSD decode:");
        info!("  CSD structure      : {} ({})", structure, structure_name(csd.structure));
        info!(
            "  Max transfer rate  : 0x{:02X} ({} Hz)",
            csd.transfer_rate,
            csd.max_clock_hz()
        );
        info!("  Command classes    : 0x{:03X}", csd.command_classes.bits());
        info!(
            "  Read block length  : 2^{} = {} bytes",
            csd.read_block_length,
            1u64 << csd.read_block_length
        );
        info!(
            "  Write block length : 2^{} = {} bytes",
            csd.write_block_length,
            1u64 << csd.write_block_length
        );
        info!("  Device size field  : 0x{:06X}", csd.device_size);
        if let Some(sdsc) = csd.sdsc {
            info!("  Size multiplier    : {}", sdsc.size_multiplier);
            info!(
                "  Read current       : {}..{}, write current {}..{}",
                sdsc.read_current_min,
                sdsc.read_current_max,
                sdsc.write_current_min,
                sdsc.write_current_max
            );
        }
        info!("  Erase sector size  : {}", csd.erase_sector_size);
        info!("  Write protect size : {}", csd.write_protect_group_size);
        info!("  Flags              : 0x{:04X}", csd.flags.bits());
        list(csd.flags, &CSD_FLAG_NAMES);
        info!(
            "  Capacity from CSD  : {} blocks, {}-byte block",
            csd.block_count,
            csd.block_size
        );
        info!(
            "  Capacity from disk : {} blocks, {}-byte block",
            disk.block_count,
            disk.block_size
        );
    }

    fn scr(&mut self, scr: &Scr) {
        info!("SCR decode:");
        info!("  SCR structure      : {}", scr.structure);
        info!("  SD spec            : {} (flags 0x{:02X})", scr.sd_spec, scr.spec_version.bits());
        info!("  Security           : 0x{:02X}", scr.security);
        info!(
            "  Bus widths support : 0x{:02X} ({})",
            scr.bus_widths.bits(),
            bus_widths_name(scr.bus_widths)
        );
        info!("  Extended security  : 0x{:02X}", scr.extended_security);
        info!(
            "  CMD support        : 0x{:02X} (bit0=CMD20, bit1=CMD23)",
            scr.command_support.bits()
        );
        if scr.flags.contains(ScrFlags::DATA_STATUS_AFTER_ERASE) {
            info!("  Flag: data is all '1' after erase");
        }
        if scr.flags.contains(ScrFlags::SD_SPEC3) {
            info!("  Flag: spec version 3.0 or higher");
        }
    }

    fn sd_status(&mut self, status: &SdStatus) {
        info!("SD Status (ACMD13) decode:");
        info!(
            "  DAT bus width      : {} ({})",
            status.bus_width,
            dat_bus_width_name(status.dat_bus_width())
        );
        info!("  Secured mode       : {}", if status.secured_mode { "yes" } else { "no" });
        info!("  Card type bits     : 0x{:04X}", status.card_type);
        info!("  Protected area raw : 0x{:04X}", status.protected_area_size);
        info!(
            "  Speed class        : 0x{:02X} ({})",
            status.speed_class,
            speed_class_name(status.class())
        );
        info!("  Performance move   : {}", PerformanceMove::from(status.performance_move));
    }

    fn switch_status(&mut self, status: &SwitchStatus) {
        info!("CMD6 switch status decode:");
        info!("  Maximum current    : {} mA", status.max_current);
        info!("  Supported bus speeds (status[13]=0x{:02X}):", status.supported_bus_speeds.bits());
        list(status.supported_bus_speeds, &BUS_SPEED_NAMES);
        info!(
            "  Supported driver types (status[9]=0x{:02X}):",
            status.supported_driver_types.bits()
        );
        list(status.supported_driver_types, &DRIVER_TYPE_NAMES);
        info!(
            "  Supported current limits (status[7]=0x{:02X}):",
            status.supported_current_limits.bits()
        );
        list(status.supported_current_limits, &CURRENT_LIMIT_NAMES);
        info!(
            "  Selected timing    : {} ({})",
            status.selected_timing,
            timing_name(status.timing())
        );
        info!("  Selected curr.limit: 0x{:X} (CMD6 group 4 value)", status.selected_current_limit);
        if status.switch_error() {
            warn!("  Bus speed selection rejected by the card");
        }
    }
}


#[cfg(test)]
mod tests {
    use std::string::ToString;

    use embedded_error::mci::MciError;

    use super::*;

    #[test]
    fn test_performance_move_classes() {
        assert_eq!(PerformanceMove::from(0x00), PerformanceMove::NotDefined);
        assert_eq!(PerformanceMove::from(0xFF), PerformanceMove::Unlimited);
        assert_eq!(PerformanceMove::from(0x14), PerformanceMove::MegabytesPerSecond(20));
        assert_eq!(PerformanceMove::from(0x14).to_string(), "20 MB/s");
    }

    #[test]
    fn test_step_names() {
        assert_eq!(Step::Cid.to_string(), "SD_SEND_CID");
        assert_eq!(Step::Erase.to_string(), "SD_ERASE_BLOCK_OPERATION");
    }

    #[test]
    fn test_bus_widths_name() {
        assert_eq!(bus_widths_name(BusWidths::ONE_BIT | BusWidths::FOUR_BIT), "1-bit & 4-bit");
        assert_eq!(bus_widths_name(BusWidths::ONE_BIT), "1-bit");
        assert_eq!(bus_widths_name(BusWidths::empty()), "unknown");
    }

    #[test]
    fn test_unit_report_is_silent() {
        let mut sink = ();
        sink.geometry(&DiskGeometry { block_count: 1, block_size: 512 });
        sink.command(Step::Cid, Err(&MciError::NoCard));
        sink.switch_status(&SwitchStatus::default());
    }

    #[test]
    fn test_log_report_renders_everything() {
        let mut sink = LogReport;
        let disk = DiskGeometry { block_count: 1024, block_size: 512 };
        sink.geometry(&disk);
        sink.command(Step::Scr, Err(&MciError::ReadError));
        sink.cid(&Cid::default());
        sink.csd(&Csd::from([0u8; 16]), &disk);
        sink.scr(&Scr::default());
        sink.sd_status(&SdStatus::default());
        sink.switch_status(&SwitchStatus::default());
    }
}
