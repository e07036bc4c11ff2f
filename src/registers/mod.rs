pub mod cid;
pub mod csd;
pub mod sd;
pub mod words;

/// Raw register sizes in bytes
pub const CID_SIZE: usize = 16;
pub const CSD_SIZE: usize = 16;
pub const SCR_SIZE: usize = 8;
pub const SD_STATUS_SIZE: usize = 64;
pub const SWITCH_STATUS_SIZE: usize = 64;
