//! Bus configuration primitives.

/// Reference CPU frequency assumed when none is supplied (16 MHz).
pub const DEFAULT_CPU_HZ: u32 = 16_000_000;

/// Two-wire bus configuration, applied once by [`Twi::configure`](crate::interface::twi::Twi::configure).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfig {
    /// CPU clock feeding the bit-rate generator, in hertz.
    pub cpu_hz: u32,
    /// Requested SCL frequency in kilohertz.
    pub clock_khz: u32,
    /// Enables the internal pull-ups on SDA/SCL.
    pub pull_ups: bool,
}

impl BusConfig {
    /// Begins building a [`BusConfig`] using the builder pattern.
    pub fn new() -> BusConfigBuilder {
        BusConfigBuilder::new()
    }

    /// Exact bit-rate divisor `cpu_hz / 2000 / clock_khz - 8`, before any clamping.
    fn divisor(&self) -> Option<i64> {
        if self.clock_khz == 0 {
            return None;
        }
        Some(i64::from(self.cpu_hz / 2000 / self.clock_khz) - 8)
    }

    /// Returns the value programmed into the bit-rate register (prescaler 1).
    ///
    /// Out-of-range divisors saturate to the register bounds; a zero clock yields 0.
    pub fn bit_rate(&self) -> u8 {
        match self.divisor() {
            Some(divisor) => divisor.clamp(0, i64::from(u8::MAX)) as u8,
            None => 0,
        }
    }

    /// Checks that the requested clock is reachable with a prescaler of 1.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        match self.divisor() {
            None => Err(ConfigError::ZeroClock),
            Some(divisor) if !(0..=i64::from(u8::MAX)).contains(&divisor) => {
                Err(ConfigError::BitRateOutOfRange)
            }
            Some(_) => Ok(()),
        }
    }
}

/// Builder for [`BusConfig`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct BusConfigBuilder {
    config: BusConfig,
}

impl BusConfigBuilder {
    /// Creates a new builder seeded with [`BusConfig::default()`].
    pub fn new() -> Self {
        Self {
            config: BusConfig::default(),
        }
    }

    /// Overrides the reference CPU frequency.
    pub fn cpu_hz(mut self, cpu_hz: u32) -> Self {
        self.config.cpu_hz = cpu_hz;
        self
    }

    /// Overrides the SCL frequency.
    pub fn clock_khz(mut self, clock_khz: u32) -> Self {
        self.config.clock_khz = clock_khz;
        self
    }

    /// Enables or disables the internal pull-ups.
    pub fn pull_ups(mut self, enabled: bool) -> Self {
        self.config.pull_ups = enabled;
        self
    }

    /// Finalizes the builder and returns the [`BusConfig`].
    pub fn build(self) -> BusConfig {
        self.config
    }
}

impl Default for BusConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            cpu_hz: DEFAULT_CPU_HZ,
            clock_khz: 100,
            pull_ups: true,
        }
    }
}

/// Validation errors generated while verifying a [`BusConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A clock of 0 kHz was requested.
    ZeroClock,
    /// The divisor for the requested clock does not fit the bit-rate register.
    BitRateOutOfRange,
}
