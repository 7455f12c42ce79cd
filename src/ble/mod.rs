//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Central** role:
//!
//! 1. **Survey** - watches advertisements from the configured wearable,
//!    feeding per-report RSSI into the proximity estimate.
//! 2. **Link Manager** - owns the connection lifecycle: connect, discover
//!    the wearable service, validate both characteristics, subscribe to
//!    motion notifications, and expose the button-state write.
//! 3. **Client glue** - the SoftDevice-backed transport and the
//!    notification loop that decodes inbound flags into the mailbox.
//!
//! The link manager itself is radio-agnostic (generic over
//! [`transport::RadioTransport`]) so the whole state machine runs in host
//! tests against a scripted transport.

pub mod link;
pub mod notify_parser;
pub mod transport;

#[cfg(feature = "embedded")]
pub mod imu_client;
#[cfg(feature = "embedded")]
pub mod survey;

/// Connection-establishment state of the one peripheral session.
///
/// Every failure path and explicit disconnect lands back on `Idle`; a
/// session is never left partially established.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// No session. The only state a new attempt may start from.
    Idle,
    /// Transport connection in progress.
    Connecting,
    /// Resolving the wearable service.
    Discovering,
    /// Checking characteristic presence and capabilities.
    Validating,
    /// Enabling motion notifications.
    Subscribing,
    /// Fully validated and subscribed; both handles resolved.
    Connected,
}

/// Motion flag carried by the wearable's notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MotionFlag {
    /// Wearable reports no motion ('0').
    Still = 0,
    /// Wearable reports motion ('1').
    Moving = 1,
}

/// Commands the input task sends to the link task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkCommand {
    /// Forward the local button state to the wearable.
    SetButton(bool),
    /// Tear down the current session.
    Disconnect,
}
