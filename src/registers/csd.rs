use bit_field::BitField;
use bitflags::bitflags;

use crate::bus::SD_MMC_BLOCK_SIZE;

use super::words::{assemble, WordOrder};

// SD/MMC transfer rate unit codes (10K) list
pub const SD_MMC_TRANS_UNITS: [u32; 8] = [10, 100, 1_000, 10_000, 0, 0, 0, 0];
// SD transfer multiplier factor codes (1/10) list
pub const SD_TRANS_MULTIPLIERS: [u32; 16] =
    [0, 10, 12, 13, 15, 20, 25, 30, 35, 40, 45, 50, 55, 60, 70, 80];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CsdStructure {
    /// CSD version 1.0, standard capacity
    V1,
    /// CSD version 2.0, high and extended capacity
    V2,
    Reserved(u8),
}

impl From<u8> for CsdStructure {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::V1,
            1 => Self::V2,
            other => Self::Reserved(other),
        }
    }
}

impl Into<u8> for CsdStructure {
    fn into(self) -> u8 {
        match self {
            Self::V1 => 0,
            Self::V2 => 1,
            Self::Reserved(value) => value,
        }
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    pub struct CsdFlags: u16 {
        const READ_BLOCK_PARTIAL = 1 << 0;          // [79]
        const WRITE_BLOCK_MISALIGN = 1 << 1;        // [78]
        const READ_BLOCK_MISALIGN = 1 << 2;         // [77]
        const DSR_IMPLEMENTED = 1 << 3;             // [76]
        const ERASE_BLOCK_ENABLED = 1 << 4;         // [46]
        const WRITE_PROTECT_GROUP_ENABLED = 1 << 5; // [31]
        const WRITE_BLOCK_PARTIAL = 1 << 6;         // [21]
        const FILE_FORMAT_GROUP = 1 << 7;           // [15]
        const COPY = 1 << 8;                        // [14]
        const PERMANENT_WRITE_PROTECT = 1 << 9;     // [13]
        const TEMPORARY_WRITE_PROTECT = 1 << 10;    // [12]
    }
}

bitflags! {
    /// Card command classes (CCC), one bit per class
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    pub struct CommandClasses: u16 {
        const BASIC = 1 << 0;
        const BLOCK_READ = 1 << 2;
        const BLOCK_WRITE = 1 << 4;
        const ERASE = 1 << 5;
        const WRITE_PROTECT = 1 << 6;
        const LOCK_CARD = 1 << 7;
        const APPLICATION_SPECIFIC = 1 << 8;
        const IO_MODE = 1 << 9;
        const SWITCH = 1 << 10;
        const EXTENSION = 1 << 11;
    }
}

/// Fields only present in a version 1.0 CSD
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SdscFields {
    pub read_current_min: u8,
    pub read_current_max: u8,
    pub write_current_min: u8,
    pub write_current_max: u8,
    /// C_SIZE_MULT
    pub size_multiplier: u8,
}

/// Decoded Card-Specific Data register
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Csd {
    pub structure: CsdStructure,
    /// TAAC
    pub read_access_time1: u8,
    /// NSAC, in units of 100 clock cycles
    pub read_access_time2: u8,
    /// TRAN_SPEED
    pub transfer_rate: u8,
    pub command_classes: CommandClasses,
    /// READ_BL_LEN, log2 of the block size
    pub read_block_length: u8,
    /// WRITE_BL_LEN, log2 of the block size
    pub write_block_length: u8,
    /// C_SIZE, 12 bits for v1.0 and 22 bits for v2.0
    pub device_size: u32,
    pub sdsc: Option<SdscFields>,
    pub erase_sector_size: u8,
    pub write_protect_group_size: u8,
    /// R2W_FACTOR
    pub write_speed_factor: u8,
    pub flags: CsdFlags,
    pub file_format: u8,
    /// Capacity in `block_size` blocks
    pub block_count: u64,
    pub block_size: u32,
}

impl Csd {
    /// Decode from reversed-order words, word 3 holding bits [127:96]
    pub fn from_words(raw: &[u32; 4]) -> Self {
        let structure = CsdStructure::from(raw[3].get_bits(30..32) as u8);
        let read_block_length = raw[2].get_bits(16..20) as u8;

        let mut flags = CsdFlags::empty();
        flags.set(CsdFlags::READ_BLOCK_PARTIAL, raw[2].get_bit(15));
        flags.set(CsdFlags::WRITE_BLOCK_MISALIGN, raw[2].get_bit(14));
        flags.set(CsdFlags::READ_BLOCK_MISALIGN, raw[2].get_bit(13));
        flags.set(CsdFlags::DSR_IMPLEMENTED, raw[2].get_bit(12));
        flags.set(CsdFlags::ERASE_BLOCK_ENABLED, raw[1].get_bit(14));
        flags.set(CsdFlags::WRITE_PROTECT_GROUP_ENABLED, raw[0].get_bit(31));
        flags.set(CsdFlags::WRITE_BLOCK_PARTIAL, raw[0].get_bit(21));
        flags.set(CsdFlags::FILE_FORMAT_GROUP, raw[0].get_bit(15));
        flags.set(CsdFlags::COPY, raw[0].get_bit(14));
        flags.set(CsdFlags::PERMANENT_WRITE_PROTECT, raw[0].get_bit(13));
        flags.set(CsdFlags::TEMPORARY_WRITE_PROTECT, raw[0].get_bit(12));

        let mut device_size = 0;
        let mut sdsc = None;
        let mut block_count = 0u64;
        let block_size = SD_MMC_BLOCK_SIZE as u32;
        match structure {
            CsdStructure::V1 => {
                device_size = (raw[2].get_bits(0..10) << 2) | raw[1].get_bits(30..32);
                let fields = SdscFields {
                    read_current_min: raw[1].get_bits(27..30) as u8,
                    read_current_max: raw[1].get_bits(24..27) as u8,
                    write_current_min: raw[1].get_bits(21..24) as u8,
                    write_current_max: raw[1].get_bits(18..21) as u8,
                    size_multiplier: raw[1].get_bits(15..18) as u8,
                };
                sdsc = Some(fields);

                // BLOCKNR = (C_SIZE + 1) * 2^(C_SIZE_MULT + 2), BLOCK_LEN = 2^READ_BL_LEN
                block_count = ((device_size as u64) + 1) << (fields.size_multiplier as u64 + 2);
                let native_block_size = 1u32 << read_block_length;
                if native_block_size != block_size {
                    block_count = block_count * native_block_size as u64 / block_size as u64;
                }
            }
            CsdStructure::V2 => {
                device_size = (raw[2].get_bits(0..6) << 16) | raw[1].get_bits(16..32);
                block_count = ((device_size as u64) + 1) * 1024;
            }
            CsdStructure::Reserved(_) => (),
        }

        Self {
            structure,
            read_access_time1: raw[3].get_bits(16..24) as u8,
            read_access_time2: raw[3].get_bits(8..16) as u8,
            transfer_rate: raw[3].get_bits(0..8) as u8,
            command_classes: CommandClasses::from_bits_retain(raw[2].get_bits(20..32) as u16),
            read_block_length,
            write_block_length: raw[0].get_bits(22..26) as u8,
            device_size,
            sdsc,
            erase_sector_size: raw[1].get_bits(7..14) as u8,
            write_protect_group_size: raw[1].get_bits(0..7) as u8,
            write_speed_factor: raw[0].get_bits(26..29) as u8,
            flags,
            file_format: raw[0].get_bits(10..12) as u8,
            block_count,
            block_size,
        }
    }

    /// Maximum data transfer clock in Hz, decoded from TRAN_SPEED
    pub fn max_clock_hz(&self) -> u32 {
        let unit = SD_MMC_TRANS_UNITS[(self.transfer_rate & 0x7) as usize];
        let mult = SD_TRANS_MULTIPLIERS[((self.transfer_rate >> 3) & 0xF) as usize];
        unit * mult * 1000
    }

    pub fn capacity_bytes(&self) -> u64 {
        self.block_count * self.block_size as u64
    }
}

impl From<[u8; 16]> for Csd {
    fn from(bytes: [u8; 16]) -> Self {
        Self::from_words(&assemble(&bytes, WordOrder::Reversed))
    }
}
