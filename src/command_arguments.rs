use bit_field::BitField;

/// Function value leaving a CMD6 function group unchanged
pub const SD_CMD6_NO_CHANGE: u8 = 0xF;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cmd6Mode {
    /// Query supported functions without switching
    Check,
    Switch,
}

/// CMD6 function groups, group 1 occupies argument bits [3:0]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FunctionGroup {
    /// Bus speed mode
    AccessMode = 1,
    CommandSystem,
    DriverStrength,
    CurrentLimit,
    Group5,
    Group6,
}

impl FunctionGroup {
    pub const ALL: [FunctionGroup; 6] = [
        Self::AccessMode,
        Self::CommandSystem,
        Self::DriverStrength,
        Self::CurrentLimit,
        Self::Group5,
        Self::Group6,
    ];

    fn bits(self) -> core::ops::Range<usize> {
        let start = (self as usize - 1) * 4;
        start..start + 4
    }
}

/// CMD6 SWITCH_FUNC argument
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Cmd6 {
    pub val: u32,
}

impl Cmd6 {
    /// Check mode with every group left unchanged
    pub fn query() -> Self {
        let mut arg = Self::default();
        arg.set_mode(Cmd6Mode::Check);
        for &group in FunctionGroup::ALL.iter() {
            arg.set_function_group(group, SD_CMD6_NO_CHANGE);
        }
        arg
    }

    pub fn set_mode(&mut self, mode: Cmd6Mode) -> &mut Self {
        self.val.set_bit(31, mode == Cmd6Mode::Switch);
        self
    }

    pub fn set_function_group(&mut self, group: FunctionGroup, function: u8) -> &mut Self {
        self.val.set_bits(group.bits(), (function & 0xF) as u32);
        self
    }
}
