//! Application-wide constants and compile-time configuration.
//!
//! All protocol identifiers, timing parameters, and tuning constants
//! live here so they can be adjusted in one place.

use crate::ble::transport::{PeerAddress, Uuid128};

// BLE identifiers

/// Wearable service UUID (custom 128-bit family, xxxx = 0x1000).
pub const WEAR_SERVICE_UUID: Uuid128 = Uuid128(0x7c691000_e3a6_4f2c_a6a0_5b8d9e2f0c31);

/// Button characteristic UUID - write / write-without-response.
pub const BUTTON_CHAR_UUID: Uuid128 = Uuid128(0x7c691001_e3a6_4f2c_a6a0_5b8d9e2f0c31);

/// Motion characteristic UUID - notify, carries the wearable's IMU flag.
pub const MOTION_CHAR_UUID: Uuid128 = Uuid128(0x7c691002_e3a6_4f2c_a6a0_5b8d9e2f0c31);

/// Link-layer address of the wearable (static random, little-endian bytes).
pub const PEER_ADDRESS: PeerAddress = PeerAddress([0xE7, 0x4B, 0x1A, 0x2C, 0x9D, 0xC0]);

// BLE link parameters

/// Requested ATT MTU. Hint only - the peer may negotiate down or ignore
/// it entirely, so nothing here depends on payloads actually growing.
pub const ATT_MTU_HINT: u16 = 185;

/// BLE connection interval range (in 1.25 ms units).
pub const BLE_CONN_INTERVAL_MIN: u16 = 6;
pub const BLE_CONN_INTERVAL_MAX: u16 = 12;

/// BLE slave latency (number of connection events the peripheral can skip).
pub const BLE_SLAVE_LATENCY: u16 = 0;

/// BLE supervision timeout (in 10 ms units). 400 = 4 s.
pub const BLE_SUP_TIMEOUT: u16 = 400;

/// Duration of the pre-connect advertisement watch (seconds).
pub const BLE_SURVEY_DURATION_SECS: u64 = 8;

// Proximity estimation

/// Weight given to the newest RSSI sample in the running average.
pub const RSSI_SMOOTHING_ALPHA: f32 = 0.2;

/// Measured signal power at 1 m from the wearable (dBm). Operator-tuned.
pub const TX_POWER_AT_1M_DBM: f32 = -59.0;

/// Path-loss exponent for the deployment environment. Operator-tuned,
/// assumed nonzero.
pub const PATH_LOSS_EXPONENT: f32 = 2.5;

// Local IMU

/// Samples averaged per axis when computing a bias offset.
pub const CALIBRATION_SAMPLES: u32 = 1000;

// GPIO pin assignments (nRF52840-DK defaults)
//
//   Button         → P0.11
//   Motion LED     → P0.06
//   I²C SDA        → P0.26
//   I²C SCL        → P0.27

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

/// Mailbox poll period for the motion-flag consumer (ms).
pub const MOTION_POLL_MS: u64 = 100;
