use bitflags::bitflags;

/// Function selection result reported for an unsupported function
pub const SD_SW_STATUS_FUN_GRP_RC_ERROR: u8 = 0xF;

bitflags! {
    /// Function group 1 support, status byte 13
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    pub struct BusSpeeds: u8 {
        /// Default speed / UHS SDR12
        const DEFAULT_SPEED = 1 << 0;
        /// High speed (50 MHz) / UHS SDR25
        const HIGH_SPEED = 1 << 1;
        const UHS_SDR50 = 1 << 2;
        const UHS_SDR104 = 1 << 3;
        const UHS_DDR50 = 1 << 4;
    }
}

bitflags! {
    /// Function group 3 support, status byte 9
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    pub struct DriverTypes: u8 {
        /// Default driver strength
        const TYPE_B = 1 << 0;
        const TYPE_A = 1 << 1;
        const TYPE_C = 1 << 2;
        const TYPE_D = 1 << 3;
    }
}

bitflags! {
    /// Function group 4 support, status byte 7
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    pub struct CurrentLimits: u8 {
        const MAX_200MA = 1 << 0;
        const MAX_400MA = 1 << 1;
        const MAX_600MA = 1 << 2;
        const MAX_800MA = 1 << 3;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Timing {
    Sdr12,
    Sdr25,
    Sdr50,
    Sdr104,
    Ddr50,
    Unknown(u8),
}

impl From<u8> for Timing {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Sdr12,
            1 => Self::Sdr25,
            2 => Self::Sdr50,
            3 => Self::Sdr104,
            4 => Self::Ddr50,
            other => Self::Unknown(other),
        }
    }
}

/// Decoded 512-bit CMD6 switch function status
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SwitchStatus {
    /// Maximum current consumption in mA, 0 on error
    pub max_current: u16,
    pub supported_current_limits: CurrentLimits,
    pub supported_driver_types: DriverTypes,
    pub supported_bus_speeds: BusSpeeds,
    /// Function group 4 selection
    pub selected_current_limit: u8,
    /// Function group 3 selection
    pub selected_driver_type: u8,
    /// Function group 1 selection
    pub selected_timing: u8,
    pub structure_version: u8,
    /// Busy status of function group 1, valid from structure version 1
    pub bus_speed_busy: u16,
}

impl SwitchStatus {
    pub fn timing(&self) -> Timing {
        self.selected_timing.into()
    }

    /// Whether the card rejected the bus speed selection
    pub fn switch_error(&self) -> bool {
        self.selected_timing == SD_SW_STATUS_FUN_GRP_RC_ERROR
    }
}

impl From<[u8; 64]> for SwitchStatus {
    fn from(buf: [u8; 64]) -> Self {
        Self {
            max_current: u16::from_be_bytes([buf[0], buf[1]]),
            supported_current_limits: CurrentLimits::from_bits_retain(buf[7]),
            supported_driver_types: DriverTypes::from_bits_retain(buf[9]),
            supported_bus_speeds: BusSpeeds::from_bits_retain(buf[13]),
            selected_current_limit: (buf[15] >> 4) & 0x0F,
            selected_driver_type: buf[15] & 0x0F,
            selected_timing: buf[16] & 0x0F,
            structure_version: buf[17],
            bus_speed_busy: u16::from_be_bytes([buf[28], buf[29]]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_speed_card_query() {
        let mut buf = [0u8; 64];
        buf[0] = 0x00;
        buf[1] = 0x64;
        buf[7] = 0x01;
        buf[9] = 0x01;
        buf[13] = 0x03;
        buf[15] = 0x00;
        buf[16] = 0x01;
        buf[17] = 0x01;
        let status: SwitchStatus = buf.into();
        assert_eq!(status.max_current, 100);
        assert_eq!(status.supported_current_limits, CurrentLimits::MAX_200MA);
        assert_eq!(status.supported_driver_types, DriverTypes::TYPE_B);
        assert_eq!(status.supported_bus_speeds, BusSpeeds::DEFAULT_SPEED | BusSpeeds::HIGH_SPEED);
        assert_eq!(status.timing(), Timing::Sdr25);
        assert_eq!(status.selected_current_limit, 0);
        assert_eq!(status.structure_version, 1);
        assert!(!status.switch_error());
    }

    #[test]
    fn test_single_bus_speed_bit() {
        let mut buf = [0u8; 64];
        buf[13] = 0x01;
        let status: SwitchStatus = buf.into();
        assert_eq!(status.supported_bus_speeds, BusSpeeds::DEFAULT_SPEED);

        buf[13] = 0x02;
        let status: SwitchStatus = buf.into();
        assert_eq!(status.supported_bus_speeds, BusSpeeds::HIGH_SPEED);
        assert_eq!(status.supported_bus_speeds.iter().count(), 1);
    }

    #[test]
    fn test_uhs_card_selection_nibbles() {
        let mut buf = [0u8; 64];
        buf[7] = 0x0F;
        buf[9] = 0x0F;
        buf[13] = 0x1F;
        buf[15] = 0x31;
        buf[16] = 0xF3;
        buf[28] = 0x80;
        buf[29] = 0x02;
        let status: SwitchStatus = buf.into();
        assert!(status.supported_current_limits.is_all());
        assert!(status.supported_driver_types.is_all());
        assert!(status.supported_bus_speeds.is_all());
        assert_eq!(status.selected_current_limit, 3);
        assert_eq!(status.selected_driver_type, 1);
        // Upper nibble of byte 16 belongs to group 2
        assert_eq!(status.timing(), Timing::Sdr104);
        assert_eq!(status.bus_speed_busy, 0x8002);
    }

    #[test]
    fn test_unsupported_selection() {
        let mut buf = [0u8; 64];
        buf[16] = 0x0F;
        let status: SwitchStatus = buf.into();
        assert_eq!(status.timing(), Timing::Unknown(0xF));
        assert!(status.switch_error());
    }
}
