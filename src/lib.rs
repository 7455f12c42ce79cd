//! Host-testable library interface for wearlink.
//!
//! The portable core - link state machine, notification decode, mailbox,
//! RSSI pipeline, IMU byte-packing - lives here and runs under
//! `cargo test` on the host with no embedded hardware.
//!
//! The embedded binary uses main.rs with #![no_std] and #![no_main] and
//! pulls in the SoftDevice glue behind the `embedded` feature.

#![cfg_attr(not(test), no_std)]

pub mod ble;
pub mod config;
pub mod error;
pub mod imu;
pub mod mailbox;
pub mod rssi;

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests - cross-module properties of the portable core
// ═══════════════════════════════════════════════════════════════════════════
