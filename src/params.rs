//! Strongly typed parameter enumerations for the MPU6050 client.
//!
//! These enums map directly to datasheet field encodings and are used by the
//! [`registers`](crate::registers) bitfields and the [`Mpu6050`](crate::Mpu6050) setters.
//!
//! # Examples
//!
//! ```rust
//! use polled_twi::params::{AccelRange, ClockSource, GyroRange};
//!
//! assert_eq!(ClockSource::PllXGyro as u8, 0b001);
//! assert_eq!(GyroRange::Dps2000 as u8, 0b11);
//! assert_eq!(AccelRange::G4 as u8, 0b01);
//! ```

use modular_bitfield::prelude::Specifier;

/// Clock source selection (`PWR_MGMT_1.CLKSEL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 3]
pub enum ClockSource {
    /// Internal 8 MHz oscillator.
    Internal8MHz = 0b000,
    /// PLL referenced to the X-axis gyroscope.
    PllXGyro = 0b001,
    /// PLL referenced to the Y-axis gyroscope.
    PllYGyro = 0b010,
    /// PLL referenced to the Z-axis gyroscope.
    PllZGyro = 0b011,
    /// PLL referenced to an external 32.768 kHz clock.
    PllExternal32K = 0b100,
    /// PLL referenced to an external 19.2 MHz clock.
    PllExternal19M = 0b101,
    /// Reserved encoding.
    Reserved = 0b110,
    /// Clock stopped, timing generator held in reset.
    Stopped = 0b111,
}

/// Gyroscope full-scale range (`GYRO_CONFIG.FS_SEL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum GyroRange {
    /// ±250 °/s, the most sensitive setting.
    Dps250 = 0b00,
    /// ±500 °/s.
    Dps500 = 0b01,
    /// ±1000 °/s.
    Dps1000 = 0b10,
    /// ±2000 °/s.
    Dps2000 = 0b11,
}

/// Accelerometer full-scale range (`ACCEL_CONFIG.AFS_SEL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum AccelRange {
    /// ±2 g, the most sensitive setting.
    G2 = 0b00,
    /// ±4 g.
    G4 = 0b01,
    /// ±8 g.
    G8 = 0b10,
    /// ±16 g.
    G16 = 0b11,
}
