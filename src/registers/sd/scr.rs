use bit_field::BitField;
use bitflags::bitflags;

use crate::registers::words::{assemble, WordOrder};

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    pub struct ScrFlags: u8 {
        /// Data status after erase [55]
        const DATA_STATUS_AFTER_ERASE = 1 << 0;
        /// SD specification 3.00 or higher [47]
        const SD_SPEC3 = 1 << 1;
    }
}

bitflags! {
    /// SD_BUS_WIDTHS [51:48]
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    pub struct BusWidths: u8 {
        const ONE_BIT = 1 << 0;
        const FOUR_BIT = 1 << 2;
    }
}

bitflags! {
    /// CMD_SUPPORT [33:32]
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    pub struct CommandSupport: u8 {
        /// Speed class control
        const CMD20 = 1 << 0;
        /// Set block count
        const CMD23 = 1 << 1;
    }
}

bitflags! {
    /// Coarse physical layer version, empty when the SD_SPEC field is not recognised
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    pub struct SpecVersion: u8 {
        const V1_0 = 1 << 0;
        const V1_1 = 1 << 1;
        const V2_0 = 1 << 2;
        const V3_0 = 1 << 3;
    }
}

/// Decoded SD Card Configuration Register
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Scr {
    /// SCR_STRUCTURE [63:60]
    pub structure: u8,
    /// SD_SPEC [59:56]
    pub sd_spec: u8,
    pub flags: ScrFlags,
    /// SD_SECURITY [54:52]
    pub security: u8,
    pub bus_widths: BusWidths,
    /// EX_SECURITY [46:43]
    pub extended_security: u8,
    pub command_support: CommandSupport,
    /// [31:0]
    pub reserved_for_manufacturer: u32,
    pub spec_version: SpecVersion,
}

impl Scr {
    pub fn from_words(raw: &[u32; 2]) -> Self {
        let mut flags = ScrFlags::empty();
        flags.set(ScrFlags::DATA_STATUS_AFTER_ERASE, raw[0].get_bit(23));
        flags.set(ScrFlags::SD_SPEC3, raw[0].get_bit(15));

        let sd_spec = raw[0].get_bits(24..28) as u8;
        let spec_version = match sd_spec {
            0 => SpecVersion::V1_0,
            1 => SpecVersion::V1_1,
            2 if flags.contains(ScrFlags::SD_SPEC3) => SpecVersion::V3_0,
            2 => SpecVersion::V2_0,
            _ => SpecVersion::empty(),
        };

        Self {
            structure: raw[0].get_bits(28..32) as u8,
            sd_spec,
            flags,
            security: raw[0].get_bits(20..23) as u8,
            bus_widths: BusWidths::from_bits_retain(raw[0].get_bits(16..20) as u8),
            extended_security: raw[0].get_bits(11..15) as u8,
            command_support: CommandSupport::from_bits_retain(raw[0].get_bits(0..2) as u8),
            reserved_for_manufacturer: raw[1],
            spec_version,
        }
    }
}

impl From<[u8; 8]> for Scr {
    fn from(bytes: [u8; 8]) -> Self {
        Self::from_words(&assemble(&bytes, WordOrder::Natural))
    }
}
