//! Memory-mapped TWI registers of the ATmega328P.

use core::ptr;

use super::{Control, StatusRegister, TwiRegisters};

/// Address of the TWI bit-rate register.
pub const TWBR: *mut u8 = 0x00B8 as *mut u8;
/// Address of the TWI status register.
pub const TWSR: *mut u8 = 0x00B9 as *mut u8;
/// Address of the TWI data register.
pub const TWDR: *mut u8 = 0x00BB as *mut u8;
/// Address of the TWI control register.
pub const TWCR: *mut u8 = 0x00BC as *mut u8;
/// Address of the port C output register (SDA = PC4, SCL = PC5).
pub const PORTC: *mut u8 = 0x0028 as *mut u8;

// PC4 | PC5 drive the internal pull-ups when the pins are inputs.
const PULL_UP_PINS: u8 = (1 << 4) | (1 << 5);

/// Handle to the single on-chip TWI block.
pub struct Atmega328pTwi {
    _private: (),
}

impl Atmega328pTwi {
    /// Claims the TWI registers.
    ///
    /// # Safety
    ///
    /// Only one handle may exist at a time, and the registers must not be touched from an
    /// interrupt handler while the handle is in use.
    pub const unsafe fn steal() -> Self {
        Self { _private: () }
    }
}

impl TwiRegisters for Atmega328pTwi {
    fn control(&mut self) -> Control {
        Control::from(unsafe { ptr::read_volatile(TWCR) })
    }

    fn set_control(&mut self, value: Control) {
        unsafe { ptr::write_volatile(TWCR, u8::from(value)) }
    }

    fn status(&mut self) -> StatusRegister {
        StatusRegister::from(unsafe { ptr::read_volatile(TWSR) })
    }

    fn set_status(&mut self, value: StatusRegister) {
        unsafe { ptr::write_volatile(TWSR, u8::from(value)) }
    }

    fn data(&mut self) -> u8 {
        unsafe { ptr::read_volatile(TWDR) }
    }

    fn set_data(&mut self, value: u8) {
        unsafe { ptr::write_volatile(TWDR, value) }
    }

    fn set_bit_rate(&mut self, value: u8) {
        unsafe { ptr::write_volatile(TWBR, value) }
    }

    fn set_pull_ups(&mut self, enabled: bool) {
        unsafe {
            let port = ptr::read_volatile(PORTC);
            let port = if enabled {
                port | PULL_UP_PINS
            } else {
                port & !PULL_UP_PINS
            };
            ptr::write_volatile(PORTC, port);
        }
    }
}
