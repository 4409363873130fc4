//! Error handling primitives for the two-wire stack.

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

use crate::peripheral::StatusCode;

/// Crate-wide result type alias for the register and sensor layers.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Error variants produced by the register access layer and the sensor client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Any error reported by the underlying bus.
    Interface(E),
    /// The caller's buffer exceeds the scratch space available for the operation.
    InvalidLength,
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Self::Interface(err)
    }
}

/// Protocol step of a bus driver call.
///
/// The read path has its own register-select steps so that every failing sub-step of
/// [`read_block`](crate::interface::TwoWireBus::read_block) maps to a distinct code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// Start condition of a write transaction.
    Start,
    /// Address + write byte of a write transaction.
    Address,
    /// Register address byte of a write transaction.
    Register,
    /// Payload byte of a block write.
    Data,
    /// Standalone byte sent with `send_byte`.
    Byte,
    /// Start condition selecting the register before a block read.
    SelectStart,
    /// Address + write byte selecting the register before a block read.
    SelectAddress,
    /// Register address byte before a block read.
    SelectRegister,
    /// Repeated start switching to the read direction.
    RepeatedStart,
    /// Address + read byte.
    ReadAddress,
    /// Received payload byte.
    Receive,
    /// Stop condition.
    Stop,
}

impl Step {
    /// Codes reported for a timeout and for an unexpected status at this step.
    const fn codes(self) -> (u8, u8) {
        match self {
            Self::Start => (1, 2),
            Self::Address => (3, 4),
            Self::Register => (5, 6),
            Self::Data => (7, 8),
            Self::Byte => (1, 2),
            Self::SelectStart => (16, 17),
            Self::SelectAddress => (18, 19),
            Self::SelectRegister => (20, 21),
            Self::RepeatedStart => (22, 23),
            Self::ReadAddress => (24, 25),
            Self::Receive => (26, 0),
            Self::Stop => (1, 1),
        }
    }
}

/// Failure of a single bus driver call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// The completion flag never rose within the poll budget.
    Timeout(Step),
    /// The step completed but the peripheral reported an unexpected state.
    Status {
        /// Step that was executing.
        step: Step,
        /// Masked status register value (`TWSR & 0xF8`).
        status: u8,
    },
}

impl BusError {
    /// Returns the step that failed.
    pub fn step(&self) -> Step {
        match *self {
            Self::Timeout(step) | Self::Status { step, .. } => step,
        }
    }

    /// Returns the non-zero diagnostic code of the failing sub-step.
    ///
    /// Codes are unique within one driver operation. An unexpected status while
    /// receiving a byte reports the raw masked status itself.
    pub fn code(&self) -> u8 {
        match *self {
            Self::Timeout(step) => step.codes().0,
            Self::Status {
                step: Step::Receive,
                status,
            } => status,
            Self::Status { step, .. } => step.codes().1,
        }
    }

    /// Returns `true` when the peripheral refused an address or data byte.
    pub fn is_nack(&self) -> bool {
        matches!(
            self.status_code(),
            Some(
                StatusCode::WriteAddressNack
                    | StatusCode::ReadAddressNack
                    | StatusCode::DataSentNack
            )
        )
    }

    fn status_code(&self) -> Option<StatusCode> {
        match *self {
            Self::Timeout(_) => None,
            Self::Status { status, .. } => StatusCode::from_byte(status),
        }
    }
}

impl embedded_hal::i2c::Error for BusError {
    fn kind(&self) -> ErrorKind {
        if let Self::Timeout(_) = self {
            return ErrorKind::Other;
        }

        match self.status_code() {
            Some(StatusCode::WriteAddressNack | StatusCode::ReadAddressNack) => {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
            }
            Some(StatusCode::DataSentNack) => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
            Some(StatusCode::ArbitrationLost) => ErrorKind::ArbitrationLoss,
            _ => ErrorKind::Bus,
        }
    }
}
