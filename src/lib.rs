#![no_std]
//! Polled two-wire (TWI/I2C) master stack.
//!
//! [`Twi`] drives the hardware peripheral through its start, address, data and stop
//! phases by busy-waiting on the status registers. [`access`] composes bus transactions
//! into register reads and writes, and [`Mpu6050`] builds a motion sensor client on top.

mod error;
mod log;
#[cfg(test)]
mod sim;

pub mod access;
pub mod config;
pub mod device;
pub mod interface;
pub mod params;
pub mod peripheral;
pub mod registers;

pub use crate::config::BusConfig;
pub use crate::device::{Motion6, Mpu6050};
pub use crate::error::{BusError, Error, Result, Step};
pub use crate::interface::twi::Twi;
pub use crate::interface::TwoWireBus;
