//! Byte, word, bit and bit-field register access built on [`TwoWireBus`] primitives.
//!
//! Every helper is stateless: it composes bus calls for one device register and collapses
//! the bus failure into [`Error::Interface`]. Words are big-endian on the wire.

use crate::error::{Error, Result};
use crate::interface::TwoWireBus;

/// Largest word count [`read_words`] can reassemble in one transaction.
pub const MAX_WORDS: usize = 32;

/// Contiguous span of bits inside a register byte.
///
/// `msb` is the index of the field's most significant bit, so a field of `length` bits
/// covers bits `msb - length + 1 ..= msb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitField {
    msb: u8,
    length: u8,
}

impl BitField {
    /// Describes a field of `length` bits whose top bit is `msb`.
    pub const fn new(msb: u8, length: u8) -> Self {
        assert!(msb < 8, "bit index out of range");
        assert!(length >= 1 && length <= msb + 1, "field does not fit in a byte");
        Self { msb, length }
    }

    /// Index of the field's most significant bit.
    pub const fn msb(self) -> u8 {
        self.msb
    }

    /// Width of the field in bits.
    pub const fn length(self) -> u8 {
        self.length
    }

    /// Position of the field's least significant bit.
    pub const fn shift(self) -> u8 {
        self.msb + 1 - self.length
    }

    /// Mask selecting the field in place.
    pub const fn mask(self) -> u8 {
        (((1u16 << self.length) - 1) as u8) << self.shift()
    }

    /// Extracts the field from `byte`, right-aligned.
    pub const fn extract(self, byte: u8) -> u8 {
        (byte & self.mask()) >> self.shift()
    }

    /// Replaces the field in `byte` with `value`; bits of `value` beyond the field are dropped.
    pub const fn insert(self, byte: u8, value: u8) -> u8 {
        (byte & !self.mask()) | ((value << self.shift()) & self.mask())
    }
}

// Bit indices past the register width select nothing.
fn bit_mask(bit: u8) -> u8 {
    1u8.checked_shl(u32::from(bit)).unwrap_or(0)
}

// ==================================================================
// == Reads =========================================================
// ==================================================================

/// Reads `buf.len()` consecutive registers starting at `register`.
///
/// Returns the number of bytes read.
pub fn read_bytes<B>(bus: &mut B, device: u8, register: u8, buf: &mut [u8]) -> Result<usize, B::Error>
where
    B: TwoWireBus,
{
    bus.read_block(device, register, buf)?;
    Ok(buf.len())
}

/// Reads a single register.
pub fn read_byte<B>(bus: &mut B, device: u8, register: u8) -> Result<u8, B::Error>
where
    B: TwoWireBus,
{
    let mut value = [0u8; 1];
    read_bytes(bus, device, register, &mut value)?;
    Ok(value[0])
}

/// Reads `words.len()` big-endian words starting at `register`.
///
/// Returns the number of words read, or [`Error::InvalidLength`] beyond [`MAX_WORDS`].
pub fn read_words<B>(bus: &mut B, device: u8, register: u8, words: &mut [u16]) -> Result<usize, B::Error>
where
    B: TwoWireBus,
{
    if words.len() > MAX_WORDS {
        return Err(Error::InvalidLength);
    }

    let mut scratch = [0u8; MAX_WORDS * 2];
    let raw = &mut scratch[..words.len() * 2];
    read_bytes(bus, device, register, raw)?;

    for (word, pair) in words.iter_mut().zip(raw.chunks_exact(2)) {
        *word = u16::from_be_bytes([pair[0], pair[1]]);
    }
    Ok(words.len())
}

/// Reads one big-endian word.
pub fn read_word<B>(bus: &mut B, device: u8, register: u8) -> Result<u16, B::Error>
where
    B: TwoWireBus,
{
    let mut word = [0u16; 1];
    read_words(bus, device, register, &mut word)?;
    Ok(word[0])
}

/// Reads one bit, returned in place (`0` or `1 << bit`), not normalized.
pub fn read_bit<B>(bus: &mut B, device: u8, register: u8, bit: u8) -> Result<u8, B::Error>
where
    B: TwoWireBus,
{
    Ok(read_byte(bus, device, register)? & bit_mask(bit))
}

/// Reads a bit field, right-aligned.
pub fn read_bits<B>(bus: &mut B, device: u8, register: u8, field: BitField) -> Result<u8, B::Error>
where
    B: TwoWireBus,
{
    Ok(field.extract(read_byte(bus, device, register)?))
}

// ==================================================================
// == Writes ========================================================
// ==================================================================

fn send_sequence<B, I>(bus: &mut B, device: u8, register: u8, bytes: I) -> core::result::Result<(), B::Error>
where
    B: TwoWireBus,
    I: IntoIterator<Item = u8>,
{
    bus.begin_transaction(device)?;
    bus.send_byte(register)?;
    for byte in bytes {
        bus.send_byte(byte)?;
    }
    Ok(())
}

/// Opens a write transaction, sends `register` then `bytes`, and always closes it.
///
/// The first failing step aborts the payload; a stop is issued regardless.
fn write_sequence<B, I>(bus: &mut B, device: u8, register: u8, bytes: I) -> Result<(), B::Error>
where
    B: TwoWireBus,
    I: IntoIterator<Item = u8>,
{
    let sent = send_sequence(bus, device, register, bytes);
    let stopped = bus.stop();
    sent.and(stopped).map_err(Error::Interface)
}

/// Writes `data` to consecutive registers starting at `register`.
pub fn write_bytes<B>(bus: &mut B, device: u8, register: u8, data: &[u8]) -> Result<(), B::Error>
where
    B: TwoWireBus,
{
    write_sequence(bus, device, register, data.iter().copied())
}

/// Writes a single register.
pub fn write_byte<B>(bus: &mut B, device: u8, register: u8, value: u8) -> Result<(), B::Error>
where
    B: TwoWireBus,
{
    write_bytes(bus, device, register, &[value])
}

/// Writes `words` big-endian, high byte first.
pub fn write_words<B>(bus: &mut B, device: u8, register: u8, words: &[u16]) -> Result<(), B::Error>
where
    B: TwoWireBus,
{
    write_sequence(bus, device, register, words.iter().flat_map(|word| word.to_be_bytes()))
}

/// Writes one big-endian word.
pub fn write_word<B>(bus: &mut B, device: u8, register: u8, value: u16) -> Result<(), B::Error>
where
    B: TwoWireBus,
{
    write_words(bus, device, register, &[value])
}

/// Sets or clears one bit with a read-modify-write cycle.
///
/// Nothing is written when the read fails.
pub fn write_bit<B>(bus: &mut B, device: u8, register: u8, bit: u8, value: bool) -> Result<(), B::Error>
where
    B: TwoWireBus,
{
    let current = read_byte(bus, device, register)?;
    let updated = if value {
        current | bit_mask(bit)
    } else {
        current & !bit_mask(bit)
    };
    write_byte(bus, device, register, updated)
}

/// Replaces a bit field with a read-modify-write cycle.
///
/// Nothing is written when the read fails.
pub fn write_bits<B>(bus: &mut B, device: u8, register: u8, field: BitField, value: u8) -> Result<(), B::Error>
where
    B: TwoWireBus,
{
    let current = read_byte(bus, device, register)?;
    write_byte(bus, device, register, field.insert(current, value))
}
