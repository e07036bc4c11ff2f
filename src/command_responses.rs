/// Response class of a command, as seen by the host
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Response {
    R1,
    /// R1 followed by a busy signal on the data line
    R1b,
    R2,
    /// OCR
    R3,
    /// Interface condition
    R7,
}

impl Response {
    /// Whether the card may hold the line busy after responding
    pub fn is_busy(self) -> bool {
        self == Response::R1b
    }

    /// Number of bytes following the R1 token in SPI mode
    pub fn spi_trailing_bytes(self) -> usize {
        match self {
            Response::R1 | Response::R1b => 0,
            Response::R2 => 1,
            Response::R3 | Response::R7 => 4,
        }
    }
}
