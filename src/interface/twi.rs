//! Polled bus driver for the hardware two-wire peripheral.
//!
//! Every protocol step writes the control register, busy-waits on the completion flag for
//! at most [`POLL_LIMIT`] reads and then checks the masked status register against the
//! state expected for that step. No interrupts, no clock, no sleeping.

use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};

use super::{address_byte, Direction, TwoWireBus};
use crate::config::BusConfig;
use crate::error::{BusError, Step};
use crate::log::{debug, trace, warn};
use crate::peripheral::{Control, StatusCode, StatusRegister, TwiRegisters};

/// Maximum number of completion-flag polls per protocol step.
pub const POLL_LIMIT: usize = 250;

/// Additional attempts made when the address phase is not acknowledged.
pub const ADDRESS_RETRIES: usize = 2;

/// Polled two-wire bus master driving a [`TwiRegisters`] block.
pub struct Twi<R> {
    regs: R,
}

impl<R> Twi<R> {
    /// Wraps the peripheral registers. Call [`configure`](Twi::configure) before use.
    pub const fn new(regs: R) -> Self {
        Self { regs }
    }

    /// Consumes the driver and returns the owned registers.
    pub fn release(self) -> R {
        self.regs
    }

    /// Provides mutable access to the underlying registers.
    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }
}

impl<R> Twi<R>
where
    R: TwiRegisters,
{
    // ==================================================================
    // == Peripheral Setup ==============================================
    // ==================================================================
    /// Programs pull-ups and bit rate from `config`, then enables the peripheral.
    pub fn configure(&mut self, config: &BusConfig) {
        let bit_rate = config.bit_rate();

        self.regs.set_control(Control::new());
        self.regs.set_pull_ups(config.pull_ups);
        self.regs.set_status(StatusRegister::new());
        self.regs.set_bit_rate(bit_rate);
        self.regs.set_control(Control::enabled());

        debug!("twi: configured, bit rate {=u8}, pull-ups {}", bit_rate, config.pull_ups);
    }

    /// Returns the control register to its inactive, disabled state.
    pub fn reset(&mut self) {
        self.regs.set_control(Control::new());
    }

    // ==================================================================
    // == Transaction Primitives ========================================
    // ==================================================================
    /// Issues a start condition and addresses `device` for writing.
    ///
    /// A refused address is retried [`ADDRESS_RETRIES`] more times before giving up.
    pub fn begin_transaction(&mut self, device: u8) -> Result<(), BusError> {
        self.address(device, Direction::Write, Self::begin_control(), Step::Start, Step::Address)
    }

    /// Sends one byte and expects it to be acknowledged.
    pub fn send_byte(&mut self, value: u8) -> Result<(), BusError> {
        self.transmit(value, Step::Byte)
    }

    /// Addresses `device`, sends `register` and then every byte of `data`.
    ///
    /// Stops at the first failing byte. No stop condition is issued: the caller closes the
    /// transaction with [`stop`](Twi::stop).
    pub fn write_block(&mut self, device: u8, register: u8, data: &[u8]) -> Result<(), BusError> {
        self.begin_transaction(device)?;
        self.transmit(register, Step::Register)?;
        for &byte in data {
            self.transmit(byte, Step::Data)?;
        }
        Ok(())
    }

    /// Selects `register` on `device` and reads `data.len()` bytes.
    ///
    /// All bytes but the last are acknowledged; the last one is not, which tells the
    /// peripheral the read is over. A stop condition is issued whatever the outcome.
    pub fn read_block(&mut self, device: u8, register: u8, data: &mut [u8]) -> Result<(), BusError> {
        let result = self.select_and_receive(device, register, data);
        if let Err(err) = &result {
            warn!("twi: block read failed at {}, code {=u8}", err.step(), err.code());
        }
        if let Err(err) = self.stop() {
            warn!("twi: stop after block read failed, code {=u8}", err.code());
        }
        result
    }

    /// Issues a stop condition and waits for the hardware to release the bus.
    pub fn stop(&mut self) -> Result<(), BusError> {
        self.regs.set_control(Control::trigger().with_twsto(true));

        // TWINT does not rise after a stop; the hardware clears TWSTO instead.
        let regs = &mut self.regs;
        if (0..POLL_LIMIT).any(|_| !regs.control().twsto()) {
            Ok(())
        } else {
            warn!("twi: stop condition timed out");
            Err(BusError::Timeout(Step::Stop))
        }
    }

    // ==================================================================
    // == Internal Step Helpers =========================================
    // ==================================================================
    fn begin_control() -> Control {
        Control::trigger().with_twsta(true).with_twsto(true)
    }

    fn repeated_start_control() -> Control {
        Control::trigger().with_twsta(true)
    }

    fn wait_for_completion(&mut self) -> bool {
        let regs = &mut self.regs;
        (0..POLL_LIMIT).any(|_| regs.control().twint())
    }

    /// Writes `control`, waits for the step to finish and returns the masked status.
    fn execute(&mut self, control: Control, step: Step) -> Result<u8, BusError> {
        self.regs.set_control(control);
        if !self.wait_for_completion() {
            warn!("twi: timeout during {}", step);
            return Err(BusError::Timeout(step));
        }
        Ok(self.regs.status().code())
    }

    fn address(
        &mut self,
        device: u8,
        direction: Direction,
        start: Control,
        start_step: Step,
        address_step: Step,
    ) -> Result<(), BusError> {
        let (ack, nack) = match direction {
            Direction::Write => (StatusCode::WriteAddressAck, StatusCode::WriteAddressNack),
            Direction::Read => (StatusCode::ReadAddressAck, StatusCode::ReadAddressNack),
        };

        let mut retries = ADDRESS_RETRIES;
        loop {
            let status = self.execute(start, start_step)?;
            if status != StatusCode::Start && status != StatusCode::RepeatedStart {
                warn!("twi: unexpected status {=u8:#x} after start", status);
                return Err(BusError::Status {
                    step: start_step,
                    status,
                });
            }

            self.regs.set_data(address_byte(device, direction));
            let status = self.execute(Control::trigger(), address_step)?;
            if status == ack {
                return Ok(());
            }
            if status == nack && retries > 0 {
                retries -= 1;
                trace!("twi: address {=u8:#x} refused, retrying", device);
                continue;
            }

            warn!("twi: address {=u8:#x} failed with status {=u8:#x}", device, status);
            return Err(BusError::Status {
                step: address_step,
                status,
            });
        }
    }

    fn transmit(&mut self, value: u8, step: Step) -> Result<(), BusError> {
        self.regs.set_data(value);
        let status = self.execute(Control::trigger(), step)?;
        if status == StatusCode::DataSentAck {
            Ok(())
        } else {
            Err(BusError::Status { step, status })
        }
    }

    /// Clocks in `data`; when `nack_last` is set the final byte is not acknowledged.
    fn receive(&mut self, data: &mut [u8], nack_last: bool) -> Result<(), BusError> {
        let last = data.len().saturating_sub(1);
        for (index, byte) in data.iter_mut().enumerate() {
            let ack = !(nack_last && index == last);
            let status = self.execute(Control::trigger().with_twea(ack), Step::Receive)?;
            if status != StatusCode::DataReceivedAck && status != StatusCode::DataReceivedNack {
                return Err(BusError::Status {
                    step: Step::Receive,
                    status,
                });
            }
            *byte = self.regs.data();
        }
        Ok(())
    }

    fn select_and_receive(&mut self, device: u8, register: u8, data: &mut [u8]) -> Result<(), BusError> {
        self.address(
            device,
            Direction::Write,
            Self::begin_control(),
            Step::SelectStart,
            Step::SelectAddress,
        )?;
        self.transmit(register, Step::SelectRegister)?;
        self.address(
            device,
            Direction::Read,
            Self::begin_control(),
            Step::RepeatedStart,
            Step::ReadAddress,
        )?;
        self.receive(data, true)
    }

    fn run_operations(&mut self, device: u8, operations: &mut [Operation<'_>]) -> Result<(), BusError> {
        let mut current: Option<Direction> = None;

        for index in 0..operations.len() {
            let next_is_read = matches!(operations.get(index + 1), Some(Operation::Read(_)));
            let (start, start_step) = match current {
                None => (Self::begin_control(), Step::Start),
                Some(_) => (Self::repeated_start_control(), Step::RepeatedStart),
            };

            match &mut operations[index] {
                Operation::Write(bytes) => {
                    if current != Some(Direction::Write) {
                        self.address(device, Direction::Write, start, start_step, Step::Address)?;
                        current = Some(Direction::Write);
                    }
                    for &byte in bytes.iter() {
                        self.transmit(byte, Step::Data)?;
                    }
                }
                Operation::Read(buffer) => {
                    if current != Some(Direction::Read) {
                        self.address(device, Direction::Read, start, start_step, Step::ReadAddress)?;
                        current = Some(Direction::Read);
                    }
                    self.receive(buffer, !next_is_read)?;
                }
            }
        }

        Ok(())
    }
}

impl<R> TwoWireBus for Twi<R>
where
    R: TwiRegisters,
{
    type Error = BusError;

    fn begin_transaction(&mut self, device: u8) -> Result<(), Self::Error> {
        Twi::begin_transaction(self, device)
    }

    fn send_byte(&mut self, value: u8) -> Result<(), Self::Error> {
        Twi::send_byte(self, value)
    }

    fn write_block(&mut self, device: u8, register: u8, data: &[u8]) -> Result<(), Self::Error> {
        Twi::write_block(self, device, register, data)
    }

    fn read_block(&mut self, device: u8, register: u8, data: &mut [u8]) -> Result<(), Self::Error> {
        Twi::read_block(self, device, register, data)
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        Twi::stop(self)
    }
}

impl<R> ErrorType for Twi<R>
where
    R: TwiRegisters,
{
    type Error = BusError;
}

impl<R> I2c<SevenBitAddress> for Twi<R>
where
    R: TwiRegisters,
{
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let result = self.run_operations(address, operations);
        let stopped = self.stop();
        result.and(stopped)
    }
}
