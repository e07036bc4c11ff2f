use std::vec::Vec;

use embedded_error::mci::{CommandOrDataError, MciError};

use crate::bus::{Bus, DataPhase};
use crate::commands::Command;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Call {
    /// Command, argument and data phase length
    Send(Command, u32, usize),
    BusyWait(u32, u32),
}

/// Records every bus operation and answers data phases from canned register images
#[derive(Default)]
pub struct RecordingBus {
    pub calls: Vec<Call>,
    pub failures: Vec<Command>,
    pub data: Vec<(Command, Vec<u8>)>,
    pub busy_timeout: bool,
}

impl RecordingBus {
    pub fn fail(&mut self, command: Command) -> &mut Self {
        self.failures.push(command);
        self
    }

    pub fn answer(&mut self, command: Command, bytes: &[u8]) -> &mut Self {
        self.data.push((command, bytes.to_vec()));
        self
    }

    pub fn sent(&self) -> Vec<(Command, u32)> {
        self.calls
            .iter()
            .filter_map(|call| match *call {
                Call::Send(command, argument, _) => Some((command, argument)),
                Call::BusyWait(..) => None,
            })
            .collect()
    }
}

impl Bus for RecordingBus {
    fn send(
        &mut self,
        command: Command,
        argument: u32,
        data: DataPhase<'_>,
    ) -> Result<(), MciError> {
        self.calls.push(Call::Send(command, argument, data.len()));
        if self.failures.contains(&command) {
            return Err(MciError::CommandError(CommandOrDataError::Timeout));
        }
        if let DataPhase::Read(buf) = data {
            if let Some((_, bytes)) = self.data.iter().find(|(c, _)| *c == command) {
                buf.copy_from_slice(&bytes[..buf.len()]);
            }
        }
        Ok(())
    }

    fn wait_until_not_busy(
        &mut self,
        timeout_ms: u32,
        poll_interval_ms: u32,
    ) -> Result<(), MciError> {
        self.calls.push(Call::BusyWait(timeout_ms, poll_interval_ms));
        match self.busy_timeout {
            true => Err(MciError::DataError(CommandOrDataError::Timeout)),
            false => Ok(()),
        }
    }
}
