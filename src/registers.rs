//! Register map definitions for the MPU6050 motion sensor.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::access::BitField;
use crate::params::{AccelRange, ClockSource, GyroRange};

/// Fixed bus address of the sensor (AD0 pulled low).
pub const MPU6050_ADDRESS: u8 = 0x68;

/// Register address of `GYRO_CONFIG`.
pub const REG_GYRO_CONFIG: u8 = 0x1B;
/// Register address of `ACCEL_CONFIG`.
pub const REG_ACCEL_CONFIG: u8 = 0x1C;
/// Register address of `ACCEL_XOUT_H`, first byte of the motion burst.
pub const REG_ACCEL_XOUT_H: u8 = 0x3B;
/// Register address of `TEMP_OUT_H`.
pub const REG_TEMP_OUT_H: u8 = 0x41;
/// Register address of `GYRO_XOUT_H`.
pub const REG_GYRO_XOUT_H: u8 = 0x43;
/// Register address of `PWR_MGMT_1`.
pub const REG_PWR_MGMT_1: u8 = 0x6B;
/// Register address of `WHO_AM_I`.
pub const REG_WHO_AM_I: u8 = 0x75;

/// `PWR_MGMT_1[2:0]` clock source selection.
pub const CLOCK_SOURCE_FIELD: BitField = BitField::new(2, 3);
/// `PWR_MGMT_1[6]` sleep enable.
pub const SLEEP_BIT: u8 = 6;
/// `GYRO_CONFIG[4:3]` gyroscope full-scale range.
pub const GYRO_RANGE_FIELD: BitField = BitField::new(4, 2);
/// `ACCEL_CONFIG[4:3]` accelerometer full-scale range.
pub const ACCEL_RANGE_FIELD: BitField = BitField::new(4, 2);
/// `WHO_AM_I[6:1]` identity field.
pub const WHO_AM_I_FIELD: BitField = BitField::new(6, 6);

/// Identity field value, right-aligned.
pub const EXPECTED_WHO_AM_I: u8 = 0x34;

/// Bytes spanning accelerometer, temperature and gyroscope outputs.
pub const MOTION6_LEN: usize = 14;

/// Minimal metadata exposed by every register value type.
pub trait Register {
    /// Register address as documented in the datasheet.
    const ADDRESS: u8;
    /// Power-on value defined by the datasheet.
    const RESET_VALUE: u8;
}

/// Bitfield representation of the `PWR_MGMT_1` register (address `0x6B`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerManagement1 {
    // Clock source selection (bits 2:0).
    pub clock_source: ClockSource,
    // Temperature sensor disable (bit 3).
    pub temp_disable: bool,
    #[skip]
    __: B1,
    // Cycle between sleep and single samples (bit 5).
    pub cycle: bool,
    // Sleep mode (bit 6).
    pub sleep: bool,
    // Device reset (bit 7).
    pub device_reset: bool,
}

impl From<u8> for PowerManagement1 {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<PowerManagement1> for u8 {
    fn from(value: PowerManagement1) -> Self {
        value.into_bytes()[0]
    }
}

/// Bitfield representation of the `GYRO_CONFIG` register (address `0x1B`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GyroConfig {
    #[skip]
    __: B3,
    // Full-scale range (bits 4:3).
    pub range: GyroRange,
    // Z-axis self-test (bit 5).
    pub z_self_test: bool,
    // Y-axis self-test (bit 6).
    pub y_self_test: bool,
    // X-axis self-test (bit 7).
    pub x_self_test: bool,
}

impl From<u8> for GyroConfig {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<GyroConfig> for u8 {
    fn from(value: GyroConfig) -> Self {
        value.into_bytes()[0]
    }
}

/// Bitfield representation of the `ACCEL_CONFIG` register (address `0x1C`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccelConfig {
    #[skip]
    __: B3,
    // Full-scale range (bits 4:3).
    pub range: AccelRange,
    // Z-axis self-test (bit 5).
    pub z_self_test: bool,
    // Y-axis self-test (bit 6).
    pub y_self_test: bool,
    // X-axis self-test (bit 7).
    pub x_self_test: bool,
}

impl From<u8> for AccelConfig {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<AccelConfig> for u8 {
    fn from(value: AccelConfig) -> Self {
        value.into_bytes()[0]
    }
}

impl Register for PowerManagement1 {
    const ADDRESS: u8 = REG_PWR_MGMT_1;
    const RESET_VALUE: u8 = 0x40;
}

impl Register for GyroConfig {
    const ADDRESS: u8 = REG_GYRO_CONFIG;
    const RESET_VALUE: u8 = 0x00;
}

impl Register for AccelConfig {
    const ADDRESS: u8 = REG_ACCEL_CONFIG;
    const RESET_VALUE: u8 = 0x00;
}
