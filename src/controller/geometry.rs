use embedded_error::mci::MciError;
use embedded_hal::digital::v2::InputPin;

/// Block layout as seen by the disk layer
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DiskGeometry {
    pub block_count: u32,
    pub block_size: u32,
}

impl DiskGeometry {
    pub fn size_bytes(&self) -> u64 {
        self.block_count as u64 * self.block_size as u64
    }

    pub fn size_mb(&self) -> u64 {
        self.size_bytes() >> 20
    }

    pub fn size_gb(&self) -> u64 {
        self.size_bytes() >> 30
    }
}

/// Source of the disk geometry, queried before any card command
pub trait Geometry {
    fn query(&mut self) -> Result<DiskGeometry, MciError>;
}

impl<G: Geometry + ?Sized> Geometry for &mut G {
    fn query(&mut self) -> Result<DiskGeometry, MciError> {
        (**self).query()
    }
}

impl Geometry for DiskGeometry {
    fn query(&mut self) -> Result<DiskGeometry, MciError> {
        Ok(*self)
    }
}

/// Only asks `geometry` once the card detect pin reports a card
pub struct PresenceCheck<DETECT, G> {
    pub detect_pin: DETECT,
    pub geometry: G,
    /// Card is present when the pin reads low
    pub lower_is_true: bool,
}

impl<DETECT: InputPin, G: Geometry> PresenceCheck<DETECT, G> {
    pub fn new(detect_pin: DETECT, geometry: G, lower_is_true: bool) -> Self {
        Self { detect_pin, geometry, lower_is_true }
    }

    pub fn card_present(&self) -> Result<bool, MciError> {
        let level = self.detect_pin.is_low().map_err(|_| MciError::PinLevelReadError)?;
        Ok(level == self.lower_is_true)
    }
}

impl<DETECT: InputPin, G: Geometry> Geometry for PresenceCheck<DETECT, G> {
    fn query(&mut self) -> Result<DiskGeometry, MciError> {
        if !self.card_present()? {
            return Err(MciError::NoCard);
        }
        self.geometry.query()
    }
}
