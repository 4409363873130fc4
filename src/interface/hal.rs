//! [`TwoWireBus`] implementation on top of an `embedded-hal` [`I2c`] bus.
//!
//! `embedded-hal` only exposes whole transactions, so bytes sent after
//! [`begin_transaction`](TwoWireBus::begin_transaction) are staged and go out as a single
//! write when the transaction is stopped.

use embedded_hal::i2c::I2c;

use super::TwoWireBus;

/// Number of bytes a single staged write transaction may carry.
pub const STAGING_CAPACITY: usize = 32;

/// Errors produced by [`HalBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalBusError<E> {
    /// Error reported by the wrapped I2C bus.
    I2c(E),
    /// The staged write exceeds [`STAGING_CAPACITY`].
    Overflow,
    /// A byte was sent without an open transaction.
    NoTransaction,
}

/// Two-wire bus adapter for any `embedded-hal` I2C implementation.
pub struct HalBus<I2C> {
    i2c: I2C,
    device: Option<u8>,
    staged: [u8; STAGING_CAPACITY],
    len: usize,
}

impl<I2C> HalBus<I2C> {
    /// Creates a new adapter from the provided I2C bus.
    pub const fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            device: None,
            staged: [0; STAGING_CAPACITY],
            len: 0,
        }
    }

    /// Provides mutable access to the wrapped I2C bus.
    pub fn i2c_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Consumes the adapter and returns the owned I2C bus. Staged bytes are discarded.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> HalBus<I2C>
where
    I2C: I2c,
{
    /// Sends whatever is staged for the open transaction and closes it.
    fn flush(&mut self) -> Result<(), HalBusError<I2C::Error>> {
        let len = core::mem::take(&mut self.len);
        match self.device.take() {
            Some(device) => self
                .i2c
                .write(device, &self.staged[..len])
                .map_err(HalBusError::I2c),
            None => Ok(()),
        }
    }
}

impl<I2C> TwoWireBus for HalBus<I2C>
where
    I2C: I2c,
{
    type Error = HalBusError<I2C::Error>;

    fn begin_transaction(&mut self, device: u8) -> Result<(), Self::Error> {
        self.flush()?;
        self.device = Some(device);
        Ok(())
    }

    fn send_byte(&mut self, value: u8) -> Result<(), Self::Error> {
        if self.device.is_none() {
            return Err(HalBusError::NoTransaction);
        }
        let slot = self.staged.get_mut(self.len).ok_or(HalBusError::Overflow)?;
        *slot = value;
        self.len += 1;
        Ok(())
    }

    fn write_block(&mut self, device: u8, register: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.begin_transaction(device)?;
        self.send_byte(register)?;
        for &byte in data {
            self.send_byte(byte)?;
        }
        Ok(())
    }

    fn read_block(&mut self, device: u8, register: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        self.flush()?;
        self.i2c
            .write_read(device, &[register], data)
            .map_err(HalBusError::I2c)
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        self.flush()
    }
}
