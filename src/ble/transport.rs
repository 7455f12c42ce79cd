//! Radio transport seam.
//!
//! The link manager never talks to the SoftDevice directly; it drives a
//! [`RadioTransport`] that exposes exactly the narrow client surface it
//! needs: connect by address, resolve a service and its characteristics,
//! subscribe, write. The embedded build implements it over nrf-softdevice
//! (`imu_client::SoftdeviceTransport`); host tests implement it with a
//! scripted mock.

/// 128-bit service/characteristic UUID.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Uuid128(pub u128);

/// Link-layer peer address (6 bytes, little-endian as the radio hands
/// them out).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeerAddress(pub [u8; 6]);

/// Opaque characteristic token minted by the transport.
///
/// The session stores and passes these back verbatim; only the transport
/// that minted a handle may interpret it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CharHandle(pub u16);

/// Capabilities advertised by a remote characteristic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CharProps {
    pub write: bool,
    pub write_without_response: bool,
    pub notify: bool,
}

/// A resolved characteristic: its transport token plus capabilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CharacteristicInfo {
    pub handle: CharHandle,
    pub props: CharProps,
}

/// Outbound write mode, fixed per session at connect time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteMode {
    /// Acknowledged write; the peer confirms delivery.
    WithResponse,
    /// Fire-and-forget write; lower latency, no delivery guarantee.
    WithoutResponse,
}

/// Raw radio-layer error code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransportError(pub u32);

/// Narrow client surface of the radio stack.
///
/// Ordering contract: `resolve_characteristic` and `subscribe` operate on
/// the service most recently resolved with `resolve_service`; the caller
/// drives the sequence connect → resolve_service → resolve_characteristic
/// → subscribe. Sub-step timeouts are owned by the radio stack, not by
/// callers.
#[allow(async_fn_in_trait)]
pub trait RadioTransport {
    /// Establish the transport connection.
    ///
    /// `att_mtu_hint` requests an enlarged ATT MTU; it is best-effort and
    /// the peer may ignore it.
    async fn connect(
        &mut self,
        addr: &PeerAddress,
        att_mtu_hint: u16,
    ) -> Result<(), TransportError>;

    /// Resolve the logical service by UUID. `false` means the connected
    /// peer does not expose it.
    async fn resolve_service(&mut self, uuid: &Uuid128) -> bool;

    /// Resolve one characteristic of the resolved service.
    async fn resolve_characteristic(&mut self, uuid: &Uuid128) -> Option<CharacteristicInfo>;

    /// Enable notifications on a characteristic, registering the inbound
    /// delivery path.
    async fn subscribe(&mut self, chr: CharHandle) -> Result<(), TransportError>;

    /// Write `payload` to a characteristic using the given mode.
    async fn write(
        &mut self,
        chr: CharHandle,
        mode: WriteMode,
        payload: &[u8],
    ) -> Result<(), TransportError>;

    /// Release the transport connection. Must be safe to call at any
    /// point of the sequence, including when nothing is connected.
    async fn disconnect(&mut self);
}
