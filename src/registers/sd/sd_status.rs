use bit_field::BitField;

use crate::registers::words::{assemble, WordOrder};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DatBusWidth {
    OneBit,
    FourBit,
    Reserved(u8),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SpeedClass {
    Class0,
    Class2,
    Class4,
    Class6,
    Class10,
    Reserved(u8),
}

/// Decoded SD Status (ACMD13), first two words of the 512-bit block
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SdStatus {
    /// DAT_BUS_WIDTH code
    pub bus_width: u8,
    pub secured_mode: bool,
    pub card_type: u16,
    pub protected_area_size: u16,
    /// SPEED_CLASS code
    pub speed_class: u8,
    /// 0 undefined, 0xFF unlimited, MB/s otherwise
    pub performance_move: u8,
}

impl SdStatus {
    pub fn from_words(raw: &[u32; 2]) -> Self {
        Self {
            bus_width: raw[0].get_bits(30..32) as u8,
            secured_mode: raw[0].get_bit(29),
            card_type: raw[0].get_bits(0..16) as u16,
            protected_area_size: raw[1].get_bits(16..32) as u16,
            speed_class: raw[1].get_bits(8..16) as u8,
            performance_move: raw[1].get_bits(0..8) as u8,
        }
    }

    pub fn dat_bus_width(&self) -> DatBusWidth {
        match self.bus_width {
            0 => DatBusWidth::OneBit,
            2 => DatBusWidth::FourBit,
            other => DatBusWidth::Reserved(other),
        }
    }

    pub fn class(&self) -> SpeedClass {
        match self.speed_class {
            0 => SpeedClass::Class0,
            1 => SpeedClass::Class2,
            2 => SpeedClass::Class4,
            3 => SpeedClass::Class6,
            4 => SpeedClass::Class10,
            other => SpeedClass::Reserved(other),
        }
    }
}

impl From<[u8; 64]> for SdStatus {
    fn from(bytes: [u8; 64]) -> Self {
        Self::from_words(&assemble(&bytes, WordOrder::Natural))
    }
}
