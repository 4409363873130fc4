//! Simulated TWI peripheral backing the unit tests.
//!
//! Models the master-side register protocol of the hardware block together with a single
//! addressed device exposing a 256-byte register file with an auto-incrementing pointer.

use crate::peripheral::{Control, StatusCode, StatusRegister, TwiRegisters};

/// Hardware action whose completion flag never rises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stall {
    Start,
    /// Only the n-th start condition (1-based, counting repeated starts) stalls.
    NthStart(usize),
    Address,
    /// Only the n-th address phase (1-based) stalls.
    NthAddress(usize),
    Transmit,
    Receive,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    AwaitAddress,
    Transmit { register_selected: bool },
    Receive,
}

pub(crate) struct SimTwi {
    control: Control,
    status: u8,
    prescaler: u8,
    data: u8,
    phase: Phase,
    in_transaction: bool,
    transmitted: usize,
    /// 7-bit address the simulated device answers to.
    pub device: u8,
    pub registers: [u8; 256],
    pub pointer: u8,
    pub bit_rate: u8,
    pub pull_ups: bool,
    /// Remaining address phases to refuse; `usize::MAX` refuses forever.
    pub address_nacks: usize,
    /// Refuse transmitted bytes from this index (register byte = 0) onwards.
    pub nack_from: Option<usize>,
    /// Status reported for received bytes instead of the data ack/nack codes.
    pub receive_status: Option<u8>,
    /// `(n, status)`: the n-th start condition (1-based) and every later one report
    /// `status` instead of start/repeated start.
    pub start_status: Option<(usize, u8)>,
    pub stall: Option<Stall>,
    pub polls: usize,
    pub starts: usize,
    pub repeated_starts: usize,
    pub stops: usize,
    pub address_attempts: usize,
    pub ack_requests: usize,
    pub nack_requests: usize,
    pub sent: [u8; 64],
    pub sent_len: usize,
}

impl SimTwi {
    pub(crate) fn new(device: u8) -> Self {
        Self {
            control: Control::new(),
            status: StatusCode::NoInformation as u8,
            prescaler: 0,
            data: 0,
            phase: Phase::Idle,
            in_transaction: false,
            transmitted: 0,
            device,
            registers: [0; 256],
            pointer: 0,
            bit_rate: 0,
            pull_ups: false,
            address_nacks: 0,
            nack_from: None,
            receive_status: None,
            start_status: None,
            stall: None,
            polls: 0,
            starts: 0,
            repeated_starts: 0,
            stops: 0,
            address_attempts: 0,
            ack_requests: 0,
            nack_requests: 0,
            sent: [0; 64],
            sent_len: 0,
        }
    }

    pub(crate) fn sent(&self) -> &[u8] {
        &self.sent[..self.sent_len]
    }

    pub(crate) fn is_idle(&self) -> bool {
        !self.in_transaction
    }

    fn complete(&mut self, action: Stall) {
        if self.stall != Some(action) {
            self.control.set_twint(true);
        }
    }

    fn complete_nth(&mut self, action: Stall, nth: Stall) {
        if self.stall != Some(nth) {
            self.complete(action);
        }
    }

    fn end_transaction(&mut self) {
        if self.in_transaction {
            self.stops += 1;
        }
        self.in_transaction = false;
        self.phase = Phase::Idle;
    }

    fn start(&mut self, value: Control) {
        if value.twsto() {
            self.end_transaction();
        }
        self.status = if self.in_transaction {
            self.repeated_starts += 1;
            StatusCode::RepeatedStart as u8
        } else {
            self.starts += 1;
            StatusCode::Start as u8
        };
        let nth = self.starts + self.repeated_starts;
        if let Some((from, status)) = self.start_status {
            if nth >= from {
                self.status = status;
            }
        }
        self.in_transaction = true;
        self.transmitted = 0;
        self.phase = Phase::AwaitAddress;
        self.complete_nth(Stall::Start, Stall::NthStart(nth));
    }

    fn stop(&mut self) {
        self.end_transaction();
        if self.stall != Some(Stall::Stop) {
            self.control.set_twsto(false);
        }
    }

    fn address(&mut self) {
        self.address_attempts += 1;
        let read = self.data & 0x01 != 0;
        let matches = self.data >> 1 == self.device;
        let refused = self.address_nacks > 0;
        if refused && self.address_nacks != usize::MAX {
            self.address_nacks -= 1;
        }

        if matches && !refused {
            if read {
                self.status = StatusCode::ReadAddressAck as u8;
                self.phase = Phase::Receive;
            } else {
                self.status = StatusCode::WriteAddressAck as u8;
                self.phase = Phase::Transmit {
                    register_selected: false,
                };
            }
        } else {
            self.status = if read {
                StatusCode::ReadAddressNack as u8
            } else {
                StatusCode::WriteAddressNack as u8
            };
            self.phase = Phase::Idle;
        }
        self.complete_nth(Stall::Address, Stall::NthAddress(self.address_attempts));
    }

    fn transmit(&mut self, register_selected: bool) {
        if self.sent_len < self.sent.len() {
            self.sent[self.sent_len] = self.data;
            self.sent_len += 1;
        }

        let index = self.transmitted;
        self.transmitted += 1;
        if self.nack_from.is_some_and(|from| index >= from) {
            self.status = StatusCode::DataSentNack as u8;
        } else {
            if register_selected {
                self.registers[usize::from(self.pointer)] = self.data;
                self.pointer = self.pointer.wrapping_add(1);
            } else {
                self.pointer = self.data;
            }
            self.phase = Phase::Transmit {
                register_selected: true,
            };
            self.status = StatusCode::DataSentAck as u8;
        }
        self.complete(Stall::Transmit);
    }

    fn receive(&mut self, ack: bool) {
        if ack {
            self.ack_requests += 1;
        } else {
            self.nack_requests += 1;
        }
        self.data = self.registers[usize::from(self.pointer)];
        self.pointer = self.pointer.wrapping_add(1);
        self.status = match self.receive_status {
            Some(status) => status,
            None if ack => StatusCode::DataReceivedAck as u8,
            None => StatusCode::DataReceivedNack as u8,
        };
        self.complete(Stall::Receive);
    }
}

impl TwiRegisters for SimTwi {
    fn control(&mut self) -> Control {
        self.polls += 1;
        self.control
    }

    fn set_control(&mut self, value: Control) {
        // Writing one to TWINT clears the flag and launches the requested action.
        self.control = value.with_twint(false);
        if !value.twint() {
            if !value.twen() {
                self.end_transaction();
            }
            return;
        }

        if value.twsta() {
            self.start(value);
        } else if value.twsto() {
            self.stop();
        } else {
            match self.phase {
                Phase::AwaitAddress => self.address(),
                Phase::Transmit { register_selected } => self.transmit(register_selected),
                Phase::Receive => self.receive(value.twea()),
                Phase::Idle => {
                    self.status = StatusCode::BusError as u8;
                    self.complete(Stall::Transmit);
                }
            }
        }
    }

    fn status(&mut self) -> StatusRegister {
        StatusRegister::from(self.status | self.prescaler)
    }

    fn set_status(&mut self, value: StatusRegister) {
        self.prescaler = value.prescaler();
    }

    fn data(&mut self) -> u8 {
        self.data
    }

    fn set_data(&mut self, value: u8) {
        self.data = value;
    }

    fn set_bit_rate(&mut self, value: u8) {
        self.bit_rate = value;
    }

    fn set_pull_ups(&mut self, enabled: bool) {
        self.pull_ups = enabled;
    }
}
