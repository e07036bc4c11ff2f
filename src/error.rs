use embedded_error::mci::{CommandOrDataError, MciError};
use embedded_error::ImplError;

/// Short text for an `MciError`, which has no `Debug` or `Display` of its own
#[allow(unreachable_patterns)]
pub fn error_name(error: &MciError) -> &'static str {
    match error {
        MciError::CommandError(CommandOrDataError::Timeout) => "command timeout",
        MciError::CommandError(CommandOrDataError::Crc) => "command CRC error",
        MciError::CommandError(CommandOrDataError::Index) => "illegal command",
        MciError::CommandError(_) => "command error",
        MciError::DataError(CommandOrDataError::Timeout) => "data timeout",
        MciError::DataError(CommandOrDataError::Crc) => "data CRC error",
        MciError::DataError(_) => "data error",
        MciError::ReadError => "read error",
        MciError::WriteError => "write error",
        MciError::NoCard => "no card",
        MciError::UnusableCard => "unusable card",
        MciError::CouldNotSelectDevice => "could not select device",
        MciError::PinLevelReadError => "pin level read error",
        MciError::WriteProtected => "write protected",
        MciError::Impl(ImplError::TimedOut) => "timed out",
        MciError::Impl(ImplError::InvalidConfiguration) => "invalid argument",
        MciError::Impl(_) => "implementation error",
        _ => "unknown error",
    }
}
