//! Unified error type for wearlink.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging when the
//! `defmt` feature is enabled.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Peripheral link establishment or use failed.
    Link(LinkError),

    /// I²C transaction to the local IMU failed.
    Imu,
}

/// Errors on the peripheral-link path.
///
/// Every connect-path failure is terminal for that attempt: the session is
/// torn down and the caller decides whether to try again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Transport-level connection to the peer failed.
    ConnectFailed,

    /// The peer does not expose the wearable service.
    ServiceNotFound,

    /// A required characteristic is absent from the service.
    CharacteristicNotFound,

    /// The button characteristic supports neither write mode.
    NotWritable,

    /// The motion characteristic does not support notifications.
    NotifyUnsupported,

    /// Enabling notifications on the motion characteristic failed.
    SubscribeFailed,

    /// Operation requires an established session.
    NotConnected,

    /// The radio rejected an outbound characteristic write.
    WriteFailed,
}

/// Coarse failure classification for callers that branch on what went
/// wrong rather than on the specific step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FailureClass {
    /// The radio layer failed (connect, subscribe, write).
    Transport,
    /// A service or characteristic was absent.
    Discovery,
    /// A required write or notify capability was missing.
    Capability,
}

impl LinkError {
    pub fn class(&self) -> FailureClass {
        match self {
            LinkError::ConnectFailed
            | LinkError::SubscribeFailed
            | LinkError::NotConnected
            | LinkError::WriteFailed => FailureClass::Transport,
            LinkError::ServiceNotFound | LinkError::CharacteristicNotFound => {
                FailureClass::Discovery
            }
            LinkError::NotWritable | LinkError::NotifyUnsupported => FailureClass::Capability,
        }
    }
}

// Convenience conversions

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Error::Link(e)
    }
}
