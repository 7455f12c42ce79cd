//! Local inertial sensor source.
//!
//! The link core only assumes a collaborator with this shape: axis
//! readings in engineering units plus a mean-of-N bias calibration. The
//! concrete device behind it is an MPU-9250-class part on I²C.

pub mod mpu9250;

/// Three-axis readings in engineering units.
///
/// Accelerometer in g, gyroscope in deg/s, magnetometer in µT.
pub trait InertialSource {
    type Error;

    fn read_accel(&mut self) -> Result<[f32; 3], Self::Error>;
    fn read_gyro(&mut self) -> Result<[f32; 3], Self::Error>;
    fn read_mag(&mut self) -> Result<[f32; 3], Self::Error>;
}

/// Compute per-axis bias as the arithmetic mean of `samples` readings.
///
/// The result is subtracted from subsequent raw readings by the caller.
/// The reader and the sample count are explicit so calibration can run
/// against any axis source and any budget; `samples` must be nonzero.
pub fn calibrate<E>(
    mut read: impl FnMut() -> Result<[f32; 3], E>,
    samples: u32,
) -> Result<[f32; 3], E> {
    let mut sum = [0.0f32; 3];
    for _ in 0..samples {
        let v = read()?;
        for (acc, axis) in sum.iter_mut().zip(v) {
            *acc += axis;
        }
    }
    let n = samples as f32;
    Ok([sum[0] / n, sum[1] / n, sum[2] / n])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_source_calibrates_to_itself() {
        let bias = calibrate::<()>(|| Ok([0.02, -0.50, 9.81]), 1000).unwrap();
        assert!((bias[0] - 0.02).abs() < 1e-5);
        assert!((bias[1] + 0.50).abs() < 1e-5);
        assert!((bias[2] - 9.81).abs() < 1e-3);
    }

    #[test]
    fn bias_is_the_arithmetic_mean() {
        let mut n = 0.0f32;
        let bias = calibrate::<()>(
            || {
                n += 1.0;
                Ok([n, 2.0 * n, 0.0])
            },
            4,
        )
        .unwrap();
        // mean of 1..=4 is 2.5
        assert!((bias[0] - 2.5).abs() < 1e-5);
        assert!((bias[1] - 5.0).abs() < 1e-5);
        assert_eq!(bias[2], 0.0);
    }

    #[test]
    fn reader_errors_propagate() {
        let mut calls = 0;
        let res = calibrate(
            || {
                calls += 1;
                if calls == 3 {
                    Err("bus fault")
                } else {
                    Ok([0.0; 3])
                }
            },
            10,
        );
        assert_eq!(res, Err("bus fault"));
        assert_eq!(calls, 3);
    }
}
