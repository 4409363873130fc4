//! Two-wire bus abstraction used by the register access layer and the sensor client.

pub mod hal;
pub mod twi;

/// Data direction encoded in the R/W bit of the address byte.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Master transmits to the peripheral (R/W = 0).
    Write = 0,
    /// Master receives from the peripheral (R/W = 1).
    Read = 1,
}

/// Forms the address-phase byte from a 7-bit device address.
pub const fn address_byte(device: u8, direction: Direction) -> u8 {
    ((device & 0x7F) << 1) | direction as u8
}

/// Transaction-level primitives of a two-wire bus master.
///
/// Device addresses are 7-bit; register addresses select a peripheral-internal register.
pub trait TwoWireBus {
    /// Error type produced by the concrete bus implementation.
    type Error;

    /// Issues a start condition and addresses `device` for writing.
    fn begin_transaction(&mut self, device: u8) -> Result<(), Self::Error>;

    /// Sends one byte inside the transaction opened by [`begin_transaction`](Self::begin_transaction).
    fn send_byte(&mut self, value: u8) -> Result<(), Self::Error>;

    /// Addresses `device`, selects `register` and writes `data`.
    ///
    /// The transaction is left open: the caller is responsible for the closing [`stop`](Self::stop).
    fn write_block(&mut self, device: u8, register: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Selects `register` on `device`, switches to reading with a repeated start and fills
    /// `data`. Always ends with a stop condition.
    fn read_block(&mut self, device: u8, register: u8, data: &mut [u8]) -> Result<(), Self::Error>;

    /// Issues a stop condition.
    fn stop(&mut self) -> Result<(), Self::Error>;
}

impl<T> TwoWireBus for &mut T
where
    T: TwoWireBus + ?Sized,
{
    type Error = T::Error;

    fn begin_transaction(&mut self, device: u8) -> Result<(), Self::Error> {
        T::begin_transaction(self, device)
    }

    fn send_byte(&mut self, value: u8) -> Result<(), Self::Error> {
        T::send_byte(self, value)
    }

    fn write_block(&mut self, device: u8, register: u8, data: &[u8]) -> Result<(), Self::Error> {
        T::write_block(self, device, register, data)
    }

    fn read_block(&mut self, device: u8, register: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        T::read_block(self, device, register, data)
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        T::stop(self)
    }
}
