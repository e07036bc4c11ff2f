use bit_field::BitField;

use super::words::{assemble, WordOrder};

pub const PRODUCT_NAME_BYTES: usize = 5;

/// Known SD card manufacturer IDs
const MANUFACTURERS: [(u8, &str); 26] = [
    (0x00, "Generic"),
    (0x01, "Panasonic"),
    (0x02, "Toshiba / Kioxia"),
    (0x03, "SanDisk / WD"),
    (0x05, "Lenovo"),
    (0x06, "SanDisk Extreme Pro / Sabrent"),
    (0x09, "ATP"),
    (0x12, "Patriot"),
    (0x1B, "Samsung"),
    (0x1D, "ADATA"),
    (0x27, "Phison OEM (Delkin, HP, Integral, Kingston, Lexar, PNY, etc.)"),
    (0x28, "Lexar (Longsys)"),
    (0x31, "Silicon Power"),
    (0x41, "Kingston"),
    (0x45, "TEAMGROUP"),
    (0x56, "SanDian / various"),
    (0x6F, "Hiksemi / HP / Kodak / Lenovo / Netac"),
    (0x74, "Transcend / Gigastone"),
    (0x76, "PNY / Patriot"),
    (0x82, "Sony"),
    (0x89, "Netac / Intel"),
    (0x90, "Strontium"),
    (0x92, "Verbatim"),
    (0x9B, "Patriot"),
    (0x9C, "Angelbird / Hoodman"),
    (0xB6, "Delkin Devices"),
];

/// Vendor name for a CID manufacturer ID, "Unknown" when not tabulated
pub fn manufacturer_name(id: u8) -> &'static str {
    MANUFACTURERS.iter().find(|(mid, _)| *mid == id).map(|(_, name)| *name).unwrap_or("Unknown")
}

/// Decoded Card Identification register
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Cid {
    /// MID [127:120]
    pub manufacturer_id: u8,
    /// OID [119:104], two ASCII characters
    pub application_id: u16,
    /// PNM [103:64]
    pub product_name: [u8; PRODUCT_NAME_BYTES],
    /// PRV [63:56], BCD major.minor
    pub product_revision: u8,
    /// PSN [55:24]
    pub serial_number: u32,
    /// MDT [19:8], years since 2000 in the upper 8 bits and the month in the lower 4
    pub manufacturing_date: u16,
}

impl Cid {
    pub fn from_words(raw: &[u32; 4]) -> Self {
        Self {
            manufacturer_id: raw[3].get_bits(24..32) as u8,
            application_id: raw[3].get_bits(8..24) as u16,
            product_name: [
                raw[3].get_bits(0..8) as u8,
                raw[2].get_bits(24..32) as u8,
                raw[2].get_bits(16..24) as u8,
                raw[2].get_bits(8..16) as u8,
                raw[2].get_bits(0..8) as u8,
            ],
            product_revision: raw[1].get_bits(24..32) as u8,
            serial_number: (raw[1].get_bits(0..24) << 8) | raw[0].get_bits(24..32),
            manufacturing_date: raw[0].get_bits(8..20) as u16,
        }
    }

    pub fn manufacturer_name(&self) -> &'static str {
        manufacturer_name(self.manufacturer_id)
    }

    pub fn oem_id(&self) -> [u8; 2] {
        self.application_id.to_be_bytes()
    }

    /// Product name as text, `None` if the card stores non UTF-8 bytes
    pub fn product_name_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.product_name).ok()
    }

    /// (major, minor)
    pub fn revision(&self) -> (u8, u8) {
        (self.product_revision >> 4, self.product_revision & 0x0F)
    }

    pub fn manufacturing_year(&self) -> u16 {
        2000 + (self.manufacturing_date >> 4)
    }

    pub fn manufacturing_month(&self) -> u8 {
        (self.manufacturing_date & 0x0F) as u8
    }
}

impl From<[u8; 16]> for Cid {
    fn from(bytes: [u8; 16]) -> Self {
        Self::from_words(&assemble(&bytes, WordOrder::Reversed))
    }
}
