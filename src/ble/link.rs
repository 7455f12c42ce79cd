//! Peripheral link manager.
//!
//! Owns the one wearable session end to end: connect, resolve the
//! service, validate both characteristics, subscribe to motion
//! notifications, then serve button writes and link-quality queries until
//! disconnect. Each establishment step is a hard gate - the first failure
//! tears the transport down, clears the session, and surfaces one
//! [`LinkError`]; no partially-built session is ever reachable.
//!
//! Threading contract: all methods that touch the session run on the
//! application context, and callers serialize their own calls (one
//! external writer per session). The only method safe to call from the
//! radio delivery context is [`LinkManager::on_notification`], which
//! writes solely into the mailbox.

use crate::ble::notify_parser::decode_flag;
use crate::ble::transport::{CharHandle, PeerAddress, RadioTransport, WriteMode};
use crate::ble::LinkState;
use crate::config;
use crate::error::LinkError;
use crate::mailbox::FlagMailbox;
use crate::rssi::{estimate_distance_m, CalibrationConstants, RssiSmoother};

/// One active or attempted connection.
///
/// Invariant: `state == Connected` implies both handles and the write
/// mode are present; they are committed together after the last gate.
struct LinkSession {
    state: LinkState,
    button: Option<CharHandle>,
    motion: Option<CharHandle>,
    write_mode: Option<WriteMode>,
}

impl LinkSession {
    const fn idle() -> Self {
        Self {
            state: LinkState::Idle,
            button: None,
            motion: None,
            write_mode: None,
        }
    }

    fn reset(&mut self) {
        *self = Self::idle();
    }
}

/// Connection lifecycle, button command path, and proximity readout for
/// the single wearable peer.
pub struct LinkManager<'m, T: RadioTransport> {
    transport: T,
    mailbox: &'m FlagMailbox,
    session: LinkSession,
    smoother: RssiSmoother,
    calibration: CalibrationConstants,
}

impl<'m, T: RadioTransport> LinkManager<'m, T> {
    pub fn new(transport: T, mailbox: &'m FlagMailbox, calibration: CalibrationConstants) -> Self {
        Self {
            transport,
            mailbox,
            session: LinkSession::idle(),
            smoother: RssiSmoother::new(),
            calibration,
        }
    }

    pub fn state(&self) -> LinkState {
        self.session.state
    }

    /// Negotiated write mode, present only while `Connected`.
    pub fn write_mode(&self) -> Option<WriteMode> {
        self.session.write_mode
    }

    /// Handle of the subscribed motion characteristic, present only
    /// while `Connected`.
    pub fn motion_handle(&self) -> Option<CharHandle> {
        self.session.motion
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Connect to the wearable at `addr` and bring the session to
    /// `Connected`.
    ///
    /// Steps, in order, each a hard gate: transport connect (the ATT MTU
    /// request is a hint the peer may ignore), service resolve, button
    /// characteristic resolve + writability check, motion characteristic
    /// resolve + notify check, subscribe. The first failure aborts the
    /// attempt and returns the session to `Idle`. Retrying is caller
    /// policy; this method never loops.
    pub async fn connect(&mut self, addr: &PeerAddress) -> Result<(), LinkError> {
        // A live or half-built session is torn down first so every
        // attempt starts from Idle.
        if self.session.state != LinkState::Idle {
            self.disconnect().await;
        }

        self.session.state = LinkState::Connecting;
        if self
            .transport
            .connect(addr, config::ATT_MTU_HINT)
            .await
            .is_err()
        {
            self.session.reset();
            return Err(LinkError::ConnectFailed);
        }

        self.session.state = LinkState::Discovering;
        if !self
            .transport
            .resolve_service(&config::WEAR_SERVICE_UUID)
            .await
        {
            return Err(self.abort(LinkError::ServiceNotFound).await);
        }

        self.session.state = LinkState::Validating;
        let Some(button) = self
            .transport
            .resolve_characteristic(&config::BUTTON_CHAR_UUID)
            .await
        else {
            return Err(self.abort(LinkError::CharacteristicNotFound).await);
        };

        // Prefer fire-and-forget if the peer allows it; acknowledged
        // writes are the fallback.
        let write_mode = if button.props.write_without_response {
            WriteMode::WithoutResponse
        } else if button.props.write {
            WriteMode::WithResponse
        } else {
            return Err(self.abort(LinkError::NotWritable).await);
        };

        let Some(motion) = self
            .transport
            .resolve_characteristic(&config::MOTION_CHAR_UUID)
            .await
        else {
            return Err(self.abort(LinkError::CharacteristicNotFound).await);
        };
        if !motion.props.notify {
            return Err(self.abort(LinkError::NotifyUnsupported).await);
        }

        self.session.state = LinkState::Subscribing;
        if self.transport.subscribe(motion.handle).await.is_err() {
            return Err(self.abort(LinkError::SubscribeFailed).await);
        }

        self.session.button = Some(button.handle);
        self.session.motion = Some(motion.handle);
        self.session.write_mode = Some(write_mode);
        self.session.state = LinkState::Connected;
        Ok(())
    }

    /// Send the local button state as a single byte (0x00 / 0x01) using
    /// the mode negotiated at connect time.
    ///
    /// Not retried internally: button state is idempotent-by-latest, so a
    /// caller that cares can simply send the next state change.
    pub async fn write_button_state(&mut self, pressed: bool) -> Result<(), LinkError> {
        if self.session.state != LinkState::Connected {
            return Err(LinkError::NotConnected);
        }
        let handle = self.session.button.ok_or(LinkError::NotConnected)?;
        // Unreachable once Connected, checked anyway.
        let mode = self.session.write_mode.ok_or(LinkError::NotWritable)?;

        let value = [u8::from(pressed)];
        self.transport
            .write(handle, mode, &value)
            .await
            .map_err(|_| LinkError::WriteFailed)
    }

    /// Inbound notification entry point, invoked from the radio delivery
    /// context.
    ///
    /// Decodes the payload's motion flag and overwrites the mailbox slot;
    /// payloads without a recognizable flag are dropped silently. Never
    /// touches session state, so it is safe concurrently with the
    /// application context.
    pub fn on_notification(&self, payload: &[u8]) {
        if let Some(flag) = decode_flag(payload) {
            self.mailbox.post(flag);
        }
    }

    /// Release the transport and clear the session. Idempotent at `Idle`.
    pub async fn disconnect(&mut self) {
        if self.session.state == LinkState::Idle {
            return;
        }
        self.transport.disconnect().await;
        self.session.reset();
        self.smoother.reset();
    }

    /// Fold one RSSI sample into the link-quality average.
    pub fn record_rssi(&mut self, sample: i8) -> f32 {
        self.smoother.update(sample)
    }

    /// Distance estimate from the smoothed RSSI, `None` before the first
    /// sample.
    pub fn estimated_distance_m(&self) -> Option<f32> {
        self.smoother.average().map(|avg| {
            estimate_distance_m(
                avg,
                self.calibration.tx_power_at_1m_dbm,
                self.calibration.path_loss_exponent,
            )
        })
    }

    async fn abort(&mut self, err: LinkError) -> LinkError {
        self.transport.disconnect().await;
        self.session.reset();
        err
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests (run on host, not embedded)
// ═══════════════════════════════════════════════════════════════════════════
