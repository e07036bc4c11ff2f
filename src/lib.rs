#![cfg_attr(not(test), no_std)]
//! SD card register diagnostics over a command-level transport.
//!
//! Reads and decodes CID, CSD, SCR, SD Status and the CMD6 switch status, and erases a whole
//! card with CMD32/CMD33/CMD38.

pub mod bus;
pub mod card;
pub mod command_arguments;
pub mod command_responses;
pub mod commands;
pub mod controller;
pub mod error;
pub mod registers;
