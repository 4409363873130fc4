//! Hardware register interface of the two-wire peripheral.
//!
//! The bus driver never touches memory directly; it reads and writes the four TWI
//! registers (plus the pull-up port) through [`TwiRegisters`]. Real silicon is provided
//! by [`atmega328p`] behind the `atmega328p` feature, tests substitute a simulated
//! peripheral.
#![allow(unused_parens)]

#[cfg(feature = "atmega328p")]
pub mod atmega328p;

use modular_bitfield::prelude::*;

/// Mask selecting the protocol state code (top five bits) of the status register.
pub const STATUS_MASK: u8 = 0xF8;

/// Access to the control, status, data, bit-rate and pull-up registers of a TWI block.
pub trait TwiRegisters {
    /// Reads the control register (`TWCR`).
    fn control(&mut self) -> Control;

    /// Writes the control register (`TWCR`).
    fn set_control(&mut self, value: Control);

    /// Reads the raw status register (`TWSR`), prescaler bits included.
    fn status(&mut self) -> StatusRegister;

    /// Writes the status register (`TWSR`); only the prescaler bits are writable.
    fn set_status(&mut self, value: StatusRegister);

    /// Reads the data register (`TWDR`).
    fn data(&mut self) -> u8;

    /// Writes the data register (`TWDR`).
    fn set_data(&mut self, value: u8);

    /// Writes the bit-rate divisor register (`TWBR`).
    fn set_bit_rate(&mut self, value: u8);

    /// Enables or disables the internal pull-ups on the SDA/SCL pins.
    fn set_pull_ups(&mut self, enabled: bool);
}

/// Bitfield representation of the control register (`TWCR`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Control {
    // Interrupt enable (bit 0). Unused by the polled driver.
    pub twie: bool,
    #[skip]
    __: B1,
    // Peripheral enable (bit 2).
    pub twen: bool,
    // Write collision flag (bit 3).
    pub twwc: bool,
    // Stop condition request (bit 4). Cleared by hardware once the stop went out.
    pub twsto: bool,
    // Start condition request (bit 5).
    pub twsta: bool,
    // Acknowledge enable (bit 6).
    pub twea: bool,
    // Interrupt flag (bit 7). Set by hardware when a step completes, cleared by writing one.
    pub twint: bool,
}

impl Control {
    /// Peripheral enabled with no action pending.
    pub fn enabled() -> Self {
        Self::new().with_twen(true)
    }

    /// Clears the interrupt flag to launch the next step with the peripheral enabled.
    pub fn trigger() -> Self {
        Self::enabled().with_twint(true)
    }
}

impl From<u8> for Control {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<Control> for u8 {
    fn from(value: Control) -> Self {
        value.into_bytes()[0]
    }
}

/// Bitfield representation of the status register (`TWSR`).
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRegister {
    // Bit-rate prescaler selection (bits 1:0).
    pub prescaler: B2,
    #[skip]
    __: B1,
    // Protocol state code (bits 7:3).
    pub state: B5,
}

impl StatusRegister {
    /// Returns the masked protocol state byte (`TWSR & 0xF8`).
    pub fn code(self) -> u8 {
        u8::from(self) & STATUS_MASK
    }
}

impl From<u8> for StatusRegister {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<StatusRegister> for u8 {
    fn from(value: StatusRegister) -> Self {
        value.into_bytes()[0]
    }
}

/// Master-mode protocol states reported in the status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StatusCode {
    /// Illegal start or stop condition observed.
    BusError = 0x00,
    /// Start condition transmitted.
    Start = 0x08,
    /// Repeated start condition transmitted.
    RepeatedStart = 0x10,
    /// Address + write transmitted, acknowledge received.
    WriteAddressAck = 0x18,
    /// Address + write transmitted, not-acknowledge received.
    WriteAddressNack = 0x20,
    /// Data byte transmitted, acknowledge received.
    DataSentAck = 0x28,
    /// Data byte transmitted, not-acknowledge received.
    DataSentNack = 0x30,
    /// Arbitration lost while sending address or data.
    ArbitrationLost = 0x38,
    /// Address + read transmitted, acknowledge received.
    ReadAddressAck = 0x40,
    /// Address + read transmitted, not-acknowledge received.
    ReadAddressNack = 0x48,
    /// Data byte received, acknowledge returned.
    DataReceivedAck = 0x50,
    /// Data byte received, not-acknowledge returned.
    DataReceivedNack = 0x58,
    /// No relevant state information available.
    NoInformation = 0xF8,
}

impl StatusCode {
    /// Translates a masked status byte, returning `None` for states outside master mode.
    pub fn from_byte(value: u8) -> Option<Self> {
        match value & STATUS_MASK {
            0x00 => Some(Self::BusError),
            0x08 => Some(Self::Start),
            0x10 => Some(Self::RepeatedStart),
            0x18 => Some(Self::WriteAddressAck),
            0x20 => Some(Self::WriteAddressNack),
            0x28 => Some(Self::DataSentAck),
            0x30 => Some(Self::DataSentNack),
            0x38 => Some(Self::ArbitrationLost),
            0x40 => Some(Self::ReadAddressAck),
            0x48 => Some(Self::ReadAddressNack),
            0x50 => Some(Self::DataReceivedAck),
            0x58 => Some(Self::DataReceivedNack),
            0xF8 => Some(Self::NoInformation),
            _ => None,
        }
    }
}

impl PartialEq<StatusCode> for u8 {
    fn eq(&self, other: &StatusCode) -> bool {
        *self == *other as u8
    }
}
