//! MPU-9250 driver: gyro/accel die plus the AK8963 magnetometer behind
//! the bypass mux.
//!
//! Blocking reads over `embedded-hal` I²C. Axis words are big-endian
//! 16-bit on the gyro/accel die and little-endian on the AK8963. Scale
//! factors assume the power-on default ranges (±2 g, ±250 °/s, 16-bit
//! magnetometer mode).

use embedded_hal::i2c::I2c;

use crate::imu::InertialSource;

/// Gyro/accel die I²C address (AD0 low).
const MPU_ADDR: u8 = 0x68;
/// AK8963 magnetometer address, reachable once bypass is enabled.
const AK8963_ADDR: u8 = 0x0C;

mod reg {
    pub const INT_PIN_CFG: u8 = 0x37;
    pub const ACCEL_XOUT_H: u8 = 0x3B;
    pub const GYRO_XOUT_H: u8 = 0x43;
    pub const PWR_MGMT_1: u8 = 0x6B;
    pub const WHO_AM_I: u8 = 0x75;
}

mod ak8963 {
    pub const HXL: u8 = 0x03;
    pub const CNTL1: u8 = 0x0A;
    /// Continuous measurement mode 2 (100 Hz), 16-bit output.
    pub const MODE_CONT2_16BIT: u8 = 0x16;
}

/// Expected WHO_AM_I responses (MPU-9250 / MPU-6500).
const WHO_AM_I_MPU9250: u8 = 0x71;
const WHO_AM_I_MPU6500: u8 = 0x70;

/// INT_PIN_CFG bit routing the auxiliary bus to the host.
const BYPASS_EN: u8 = 0x02;

/// LSB per g at the ±2 g default range.
const ACCEL_LSB_PER_G: f32 = 16384.0;
/// LSB per °/s at the ±250 °/s default range.
const GYRO_LSB_PER_DPS: f32 = 131.0;
/// µT per LSB in 16-bit magnetometer mode.
const MAG_UT_PER_LSB: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mpu9250Error<E> {
    /// I²C transaction failed.
    Bus(E),
    /// WHO_AM_I returned an unexpected identity.
    UnknownDevice(u8),
}

pub struct Mpu9250<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Mpu9250<I2C> {
    /// Verify the device identity, wake it, and open the bypass to the
    /// magnetometer.
    pub fn new(i2c: I2C) -> Result<Self, Mpu9250Error<I2C::Error>> {
        let mut dev = Self { i2c };

        let mut id = [0u8];
        dev.i2c
            .write_read(MPU_ADDR, &[reg::WHO_AM_I], &mut id)
            .map_err(Mpu9250Error::Bus)?;
        if id[0] != WHO_AM_I_MPU9250 && id[0] != WHO_AM_I_MPU6500 {
            return Err(Mpu9250Error::UnknownDevice(id[0]));
        }

        // Clear sleep, select the default internal clock.
        dev.write_reg(MPU_ADDR, reg::PWR_MGMT_1, 0x00)?;
        dev.write_reg(MPU_ADDR, reg::INT_PIN_CFG, BYPASS_EN)?;
        dev.write_reg(AK8963_ADDR, ak8963::CNTL1, ak8963::MODE_CONT2_16BIT)?;

        Ok(dev)
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write_reg(&mut self, addr: u8, reg: u8, value: u8) -> Result<(), Mpu9250Error<I2C::Error>> {
        self.i2c
            .write(addr, &[reg, value])
            .map_err(Mpu9250Error::Bus)
    }

    /// Six-byte big-endian axis block from the gyro/accel die.
    fn read_be_axes(
        &mut self,
        start: u8,
        lsb_per_unit: f32,
    ) -> Result<[f32; 3], Mpu9250Error<I2C::Error>> {
        let mut buf = [0u8; 6];
        self.i2c
            .write_read(MPU_ADDR, &[start], &mut buf)
            .map_err(Mpu9250Error::Bus)?;
        Ok([
            i16::from_be_bytes([buf[0], buf[1]]) as f32 / lsb_per_unit,
            i16::from_be_bytes([buf[2], buf[3]]) as f32 / lsb_per_unit,
            i16::from_be_bytes([buf[4], buf[5]]) as f32 / lsb_per_unit,
        ])
    }
}

impl<I2C: I2c> InertialSource for Mpu9250<I2C> {
    type Error = Mpu9250Error<I2C::Error>;

    fn read_accel(&mut self) -> Result<[f32; 3], Self::Error> {
        self.read_be_axes(reg::ACCEL_XOUT_H, ACCEL_LSB_PER_G)
    }

    fn read_gyro(&mut self) -> Result<[f32; 3], Self::Error> {
        self.read_be_axes(reg::GYRO_XOUT_H, GYRO_LSB_PER_DPS)
    }

    fn read_mag(&mut self) -> Result<[f32; 3], Self::Error> {
        // HXL..HZH plus ST2; reading ST2 latches the next sample.
        let mut buf = [0u8; 7];
        self.i2c
            .write_read(AK8963_ADDR, &[ak8963::HXL], &mut buf)
            .map_err(Mpu9250Error::Bus)?;
        Ok([
            i16::from_le_bytes([buf[0], buf[1]]) as f32 * MAG_UT_PER_LSB,
            i16::from_le_bytes([buf[2], buf[3]]) as f32 * MAG_UT_PER_LSB,
            i16::from_le_bytes([buf[4], buf[5]]) as f32 * MAG_UT_PER_LSB,
        ])
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests (run on host, not embedded)
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorType, Operation};
    use std::collections::BTreeMap;

    /// Register-table I²C bus: writes are logged, reads come from a
    /// (address, register) → bytes table.
    #[derive(Default)]
    struct TableBus {
        regs: BTreeMap<(u8, u8), Vec<u8>>,
        writes: Vec<(u8, Vec<u8>)>,
        pointer: BTreeMap<u8, u8>,
    }

    impl TableBus {
        fn with_identity(id: u8) -> Self {
            let mut bus = Self::default();
            bus.regs.insert((MPU_ADDR, reg::WHO_AM_I), vec![id]);
            bus
        }
    }

    impl ErrorType for TableBus {
        type Error = core::convert::Infallible;
    }

    impl I2c for TableBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        self.pointer.insert(address, bytes[0]);
                        self.writes.push((address, bytes.to_vec()));
                    }
                    Operation::Read(buf) => {
                        let reg = *self.pointer.get(&address).unwrap_or(&0);
                        let data = self.regs.get(&(address, reg)).cloned().unwrap_or_default();
                        for (dst, src) in buf.iter_mut().zip(data) {
                            *dst = src;
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn init_checks_identity_and_wakes_device() {
        let bus = TableBus::with_identity(WHO_AM_I_MPU9250);
        let dev = Mpu9250::new(bus).unwrap();
        let bus = dev.release();

        assert!(bus
            .writes
            .contains(&(MPU_ADDR, vec![reg::PWR_MGMT_1, 0x00])));
        assert!(bus
            .writes
            .contains(&(MPU_ADDR, vec![reg::INT_PIN_CFG, BYPASS_EN])));
        assert!(bus
            .writes
            .contains(&(AK8963_ADDR, vec![ak8963::CNTL1, ak8963::MODE_CONT2_16BIT])));
    }

    #[test]
    fn init_rejects_unknown_identity() {
        let bus = TableBus::with_identity(0x42);
        match Mpu9250::new(bus) {
            Err(Mpu9250Error::UnknownDevice(0x42)) => {}
            other => panic!("expected UnknownDevice, got {:?}", other.err()),
        }
    }

    #[test]
    fn accel_words_are_big_endian_and_scaled_to_g() {
        let mut bus = TableBus::with_identity(WHO_AM_I_MPU9250);
        // +1 g, -1 g, +0.5 g at 16384 LSB/g.
        bus.regs.insert(
            (MPU_ADDR, reg::ACCEL_XOUT_H),
            vec![0x40, 0x00, 0xC0, 0x00, 0x20, 0x00],
        );
        let mut dev = Mpu9250::new(bus).unwrap();

        let [x, y, z] = dev.read_accel().unwrap();
        assert!((x - 1.0).abs() < 1e-6);
        assert!((y + 1.0).abs() < 1e-6);
        assert!((z - 0.5).abs() < 1e-6);
    }

    #[test]
    fn gyro_words_scale_to_degrees_per_second() {
        let mut bus = TableBus::with_identity(WHO_AM_I_MPU9250);
        // 131 LSB = 1 °/s; -262 LSB = -2 °/s.
        bus.regs.insert(
            (MPU_ADDR, reg::GYRO_XOUT_H),
            vec![0x00, 0x83, 0xFE, 0xFA, 0x00, 0x00],
        );
        let mut dev = Mpu9250::new(bus).unwrap();

        let [x, y, z] = dev.read_gyro().unwrap();
        assert!((x - 1.0).abs() < 1e-6);
        assert!((y + 2.0).abs() < 1e-6);
        assert_eq!(z, 0.0);
    }

    #[test]
    fn mag_words_are_little_endian_microtesla() {
        let mut bus = TableBus::with_identity(WHO_AM_I_MPU9250);
        // 100 LSB * 0.15 = 15 µT on x; -200 LSB = -30 µT on y.
        bus.regs.insert(
            (AK8963_ADDR, ak8963::HXL),
            vec![0x64, 0x00, 0x38, 0xFF, 0x00, 0x00, 0x00],
        );
        let mut dev = Mpu9250::new(bus).unwrap();

        let [x, y, z] = dev.read_mag().unwrap();
        assert!((x - 15.0).abs() < 1e-4);
        assert!((y + 30.0).abs() < 1e-4);
        assert_eq!(z, 0.0);
    }

    #[test]
    fn calibrate_over_the_driver_averages_axes() {
        let mut bus = TableBus::with_identity(WHO_AM_I_MPU9250);
        bus.regs.insert(
            (MPU_ADDR, reg::GYRO_XOUT_H),
            vec![0x00, 0x83, 0x00, 0x00, 0x00, 0x00],
        );
        let mut dev = Mpu9250::new(bus).unwrap();

        let bias = crate::imu::calibrate(|| dev.read_gyro(), 8).unwrap();
        assert!((bias[0] - 1.0).abs() < 1e-6);
        assert_eq!(bias[1], 0.0);
    }
}
