//! MPU6050 motion sensor client.

use crate::access;
use crate::error::Result;
use crate::interface::TwoWireBus;
use crate::log::warn;
use crate::params::{AccelRange, ClockSource, GyroRange};
use crate::registers::{
    PowerManagement1,
    Register,
    ACCEL_RANGE_FIELD,
    CLOCK_SOURCE_FIELD,
    EXPECTED_WHO_AM_I,
    GYRO_RANGE_FIELD,
    MOTION6_LEN,
    MPU6050_ADDRESS,
    REG_ACCEL_CONFIG,
    REG_ACCEL_XOUT_H,
    REG_GYRO_CONFIG,
    REG_PWR_MGMT_1,
    REG_WHO_AM_I,
    SLEEP_BIT,
    WHO_AM_I_FIELD,
};

// Byte offset of GYRO_XOUT_H inside the motion burst; TEMP_OUT sits in between.
const GYRO_OFFSET: usize = 8;

/// Raw accelerometer and gyroscope sample.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Motion6 {
    /// Accelerometer X axis.
    pub ax: i16,
    /// Accelerometer Y axis.
    pub ay: i16,
    /// Accelerometer Z axis.
    pub az: i16,
    /// Gyroscope X axis.
    pub gx: i16,
    /// Gyroscope Y axis.
    pub gy: i16,
    /// Gyroscope Z axis.
    pub gz: i16,
}

impl Motion6 {
    /// Decodes a `ACCEL_XOUT_H..=GYRO_ZOUT_L` burst; the temperature word is skipped.
    pub fn from_burst(raw: &[u8; MOTION6_LEN]) -> Self {
        let axis = |offset: usize| i16::from_be_bytes([raw[offset], raw[offset + 1]]);
        Self {
            ax: axis(0),
            ay: axis(2),
            az: axis(4),
            gx: axis(GYRO_OFFSET),
            gy: axis(GYRO_OFFSET + 2),
            gz: axis(GYRO_OFFSET + 4),
        }
    }
}

/// Fixed-configuration driver for an MPU6050 at [`MPU6050_ADDRESS`].
///
/// The last burst read is kept in an internal buffer; the non-signalling accessors
/// ([`motion6`](Mpu6050::motion6), [`device_id`](Mpu6050::device_id)) report from it, so
/// a failed read leaves the previous contents in place.
pub struct Mpu6050<BUS> {
    bus: BUS,
    buffer: [u8; MOTION6_LEN],
}

impl<BUS> Mpu6050<BUS> {
    // ==================================================================
    // == Driver Construction & Ownership ===============================
    // ==================================================================
    /// Creates a new client on the provided bus.
    pub fn new(bus: BUS) -> Self {
        Self {
            bus,
            buffer: [0; MOTION6_LEN],
        }
    }

    /// Consumes the client and returns the owned bus.
    pub fn release(self) -> BUS {
        self.bus
    }

    /// Provides mutable access to the underlying bus.
    pub fn bus_mut(&mut self) -> &mut BUS {
        &mut self.bus
    }
}

impl<BUS, CommE> Mpu6050<BUS>
where
    BUS: TwoWireBus<Error = CommE>,
{
    // ==================================================================
    // == Initialization ================================================
    // ==================================================================
    /// Applies the startup configuration without reporting failures.
    ///
    /// Selects the X gyro PLL as clock, the most sensitive gyroscope and accelerometer
    /// ranges and wakes the device. Every step is attempted even if an earlier one failed.
    pub fn initialize(&mut self) {
        let steps = [
            self.set_clock_source(ClockSource::PllXGyro),
            self.set_gyro_range(GyroRange::Dps250),
            self.set_accel_range(AccelRange::G2),
            self.set_sleep_enabled(false),
        ];
        let failed = steps.iter().filter(|step| step.is_err()).count();
        if failed > 0 {
            warn!("mpu6050: {=usize} initialization writes failed", failed);
        }
    }

    /// Applies the startup configuration, stopping at the first failed write.
    pub fn init(&mut self) -> Result<(), CommE> {
        self.set_clock_source(ClockSource::PllXGyro)?;
        self.set_gyro_range(GyroRange::Dps250)?;
        self.set_accel_range(AccelRange::G2)?;
        self.set_sleep_enabled(false)
    }

    // ==================================================================
    // == Configuration =================================================
    // ==================================================================
    /// Selects the clock source.
    pub fn set_clock_source(&mut self, source: ClockSource) -> Result<(), CommE> {
        access::write_bits(
            &mut self.bus,
            MPU6050_ADDRESS,
            REG_PWR_MGMT_1,
            CLOCK_SOURCE_FIELD,
            source as u8,
        )
    }

    /// Selects the gyroscope full-scale range.
    pub fn set_gyro_range(&mut self, range: GyroRange) -> Result<(), CommE> {
        access::write_bits(
            &mut self.bus,
            MPU6050_ADDRESS,
            REG_GYRO_CONFIG,
            GYRO_RANGE_FIELD,
            range as u8,
        )
    }

    /// Selects the accelerometer full-scale range.
    pub fn set_accel_range(&mut self, range: AccelRange) -> Result<(), CommE> {
        access::write_bits(
            &mut self.bus,
            MPU6050_ADDRESS,
            REG_ACCEL_CONFIG,
            ACCEL_RANGE_FIELD,
            range as u8,
        )
    }

    /// Enters or leaves sleep mode.
    pub fn set_sleep_enabled(&mut self, enabled: bool) -> Result<(), CommE> {
        access::write_bit(&mut self.bus, MPU6050_ADDRESS, REG_PWR_MGMT_1, SLEEP_BIT, enabled)
    }

    /// Reads and decodes `PWR_MGMT_1`.
    pub fn power_management(&mut self) -> Result<PowerManagement1, CommE> {
        let raw = access::read_byte(&mut self.bus, MPU6050_ADDRESS, PowerManagement1::ADDRESS)?;
        Ok(PowerManagement1::from(raw))
    }

    // ==================================================================
    // == Identification ================================================
    // ==================================================================
    /// Returns `true` when the identity field reads [`EXPECTED_WHO_AM_I`].
    pub fn test_connection(&mut self) -> bool {
        let id = self.device_id();
        if id != EXPECTED_WHO_AM_I {
            warn!("mpu6050: unexpected identity {=u8:#x}", id);
        }
        id == EXPECTED_WHO_AM_I
    }

    /// Returns the right-aligned identity field.
    ///
    /// On a failed read the first byte of the internal buffer is returned unchanged.
    pub fn device_id(&mut self) -> u8 {
        if let Ok(id) = self.read_device_id() {
            self.buffer[0] = id;
        }
        self.buffer[0]
    }

    /// Reads the right-aligned identity field.
    pub fn read_device_id(&mut self) -> Result<u8, CommE> {
        access::read_bits(&mut self.bus, MPU6050_ADDRESS, REG_WHO_AM_I, WHO_AM_I_FIELD)
    }

    // ==================================================================
    // == Data Acquisition ==============================================
    // ==================================================================
    /// Reads accelerometer and gyroscope axes without reporting failures.
    ///
    /// If the bus read fails the result is decoded from whatever the buffer still holds.
    pub fn motion6(&mut self) -> Motion6 {
        let _ = access::read_bytes(&mut self.bus, MPU6050_ADDRESS, REG_ACCEL_XOUT_H, &mut self.buffer);
        Motion6::from_burst(&self.buffer)
    }

    /// Reads accelerometer and gyroscope axes.
    pub fn read_motion6(&mut self) -> Result<Motion6, CommE> {
        access::read_bytes(&mut self.bus, MPU6050_ADDRESS, REG_ACCEL_XOUT_H, &mut self.buffer)?;
        Ok(Motion6::from_burst(&self.buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BusConfig;
    use crate::error::{BusError, Error};
    use crate::interface::twi::Twi;
    use crate::registers::{AccelConfig, GyroConfig, REG_GYRO_XOUT_H, REG_TEMP_OUT_H};
    use crate::sim::SimTwi;

    const BURST: [u8; MOTION6_LEN] = [
        0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0xAA, 0xBB, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C,
    ];

    fn sensor() -> Mpu6050<Twi<SimTwi>> {
        let mut sim = SimTwi::new(MPU6050_ADDRESS);
        sim.registers[usize::from(REG_PWR_MGMT_1)] = PowerManagement1::RESET_VALUE;
        sim.registers[usize::from(REG_WHO_AM_I)] = 0x68;
        let mut twi = Twi::new(sim);
        twi.configure(&BusConfig::default());
        Mpu6050::new(twi)
    }

    fn registers(mpu: &mut Mpu6050<Twi<SimTwi>>) -> &mut [u8; 256] {
        &mut mpu.bus_mut().registers_mut().registers
    }

    #[test]
    fn burst_layout_skips_temperature() {
        assert_eq!(usize::from(REG_TEMP_OUT_H - REG_ACCEL_XOUT_H), 6);
        assert_eq!(usize::from(REG_GYRO_XOUT_H - REG_ACCEL_XOUT_H), GYRO_OFFSET);
    }

    #[test]
    fn motion6_decodes_big_endian_axes() {
        let mut mpu = sensor();
        let start = usize::from(REG_ACCEL_XOUT_H);
        registers(&mut mpu)[start..start + MOTION6_LEN].copy_from_slice(&BURST);

        let motion = mpu.motion6();
        assert_eq!(
            motion,
            Motion6 {
                ax: 0x0102,
                ay: 0x0304,
                az: 0x0506,
                gx: 0x0708,
                gy: 0x090A,
                gz: 0x0B0C,
            }
        );
        assert_eq!(mpu.read_motion6(), Ok(motion));
    }

    #[test]
    fn motion6_axes_are_signed() {
        let mut raw = [0u8; MOTION6_LEN];
        raw[0] = 0xFF;
        raw[1] = 0xFE;
        raw[12] = 0x80;
        let motion = Motion6::from_burst(&raw);
        assert_eq!(motion.ax, -2);
        assert_eq!(motion.gz, i16::MIN);
    }

    #[test]
    fn motion6_keeps_stale_buffer_when_read_fails() {
        let mut mpu = sensor();
        let start = usize::from(REG_ACCEL_XOUT_H);
        registers(&mut mpu)[start..start + MOTION6_LEN].copy_from_slice(&BURST);
        let first = mpu.motion6();

        registers(&mut mpu)[start..start + MOTION6_LEN].fill(0);
        mpu.bus_mut().registers_mut().address_nacks = usize::MAX;

        assert_eq!(mpu.motion6(), first);
        assert!(matches!(mpu.read_motion6(), Err(Error::Interface(_))));
    }

    #[test]
    fn initialize_programs_clock_ranges_and_wakes() {
        let mut mpu = sensor();
        registers(&mut mpu)[usize::from(REG_GYRO_CONFIG)] = 0b1001_1000;
        registers(&mut mpu)[usize::from(REG_ACCEL_CONFIG)] = 0b0001_1000;

        mpu.initialize();

        let power = mpu.power_management().unwrap();
        assert_eq!(power.clock_source(), ClockSource::PllXGyro);
        assert!(!power.sleep());

        let gyro = GyroConfig::from(registers(&mut mpu)[usize::from(REG_GYRO_CONFIG)]);
        assert_eq!(gyro.range(), GyroRange::Dps250);
        assert!(gyro.x_self_test());

        let accel = AccelConfig::from(registers(&mut mpu)[usize::from(REG_ACCEL_CONFIG)]);
        assert_eq!(accel.range(), AccelRange::G2);
    }

    #[test]
    fn initialize_swallows_bus_failures() {
        let mut mpu = sensor();
        mpu.bus_mut().registers_mut().address_nacks = usize::MAX;

        mpu.initialize();
        // Four read-modify-write steps, each read refused three times.
        assert_eq!(mpu.bus_mut().registers_mut().address_attempts, 12);
        assert!(mpu.init().is_err());
    }

    #[test]
    fn init_reports_first_failure() {
        let mut mpu = sensor();
        assert_eq!(mpu.init(), Ok(()));

        let mut absent = Mpu6050::new(Twi::new(SimTwi::new(0x69)));
        absent.bus_mut().configure(&BusConfig::default());
        match absent.init() {
            Err(Error::Interface(err @ BusError::Status { .. })) => assert_eq!(err.code(), 19),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn connection_test_accepts_only_expected_identity() {
        let mut mpu = sensor();
        assert_eq!(mpu.device_id(), EXPECTED_WHO_AM_I);
        assert!(mpu.test_connection());

        // 0x72 carries identity 0x39 in bits 6:1.
        registers(&mut mpu)[usize::from(REG_WHO_AM_I)] = 0x72;
        assert_eq!(mpu.device_id(), 0x39);
        assert!(!mpu.test_connection());

        // Bit 7 and bit 0 are outside the identity field.
        registers(&mut mpu)[usize::from(REG_WHO_AM_I)] = 0xE9;
        assert!(mpu.test_connection());
    }

    #[test]
    fn failed_identity_read_on_fresh_client_is_rejected() {
        let mut mpu = sensor();
        mpu.bus_mut().registers_mut().address_nacks = usize::MAX;

        assert_eq!(mpu.device_id(), 0x00);
        assert!(!mpu.test_connection());
    }

    #[test]
    fn failed_identity_read_reports_stale_buffer() {
        let mut mpu = sensor();
        assert!(mpu.test_connection());

        mpu.bus_mut().registers_mut().address_nacks = usize::MAX;
        // The stale identity from the previous read is still in the buffer.
        assert!(mpu.test_connection());
        assert!(mpu.read_device_id().is_err());
    }

    mod hal {
        extern crate std;

        use super::super::*;
        use crate::interface::hal::HalBus;
        use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
        use std::vec;

        #[test]
        fn initialize_over_embedded_hal_bus() {
            let expectations = [
                I2cTransaction::write_read(0x68, vec![0x6B], vec![0x40]),
                I2cTransaction::write(0x68, vec![0x6B, 0x41]),
                I2cTransaction::write_read(0x68, vec![0x1B], vec![0x18]),
                I2cTransaction::write(0x68, vec![0x1B, 0x00]),
                I2cTransaction::write_read(0x68, vec![0x1C], vec![0x08]),
                I2cTransaction::write(0x68, vec![0x1C, 0x00]),
                I2cTransaction::write_read(0x68, vec![0x6B], vec![0x41]),
                I2cTransaction::write(0x68, vec![0x6B, 0x01]),
            ];
            let mut mpu = Mpu6050::new(HalBus::new(I2cMock::new(&expectations)));

            mpu.initialize();

            mpu.release().release().done();
        }

        #[test]
        fn motion_and_identity_over_embedded_hal_bus() {
            let expectations = [
                I2cTransaction::write_read(0x68, vec![0x75], vec![0x68]),
                I2cTransaction::write_read(
                    0x68,
                    vec![0x3B],
                    vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0xAA, 0xBB, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C],
                ),
            ];
            let mut mpu = Mpu6050::new(HalBus::new(I2cMock::new(&expectations)));

            assert!(mpu.test_connection());
            let motion = mpu.motion6();
            assert_eq!((motion.ax, motion.gz), (0x0102, 0x0B0C));

            mpu.release().release().done();
        }
    }
}
