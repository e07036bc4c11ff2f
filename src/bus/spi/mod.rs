mod bus;
mod command;
mod read;
mod response;

pub use bus::SpiBus;
pub use command::crc7;

#[cfg(test)]
pub(crate) use bus::mock;
