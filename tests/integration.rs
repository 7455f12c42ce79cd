//! Integration tests for wearlink host-testable logic.
//!
//! Exercises the public link-manager API end to end against a scripted
//! radio transport.

use embassy_futures::block_on;
use wearlink::ble::link::LinkManager;
use wearlink::ble::transport::{
    CharHandle, CharProps, CharacteristicInfo, PeerAddress, RadioTransport, TransportError,
    Uuid128, WriteMode,
};
use wearlink::ble::{LinkState, MotionFlag};
use wearlink::config;
use wearlink::error::{FailureClass, LinkError};
use wearlink::mailbox::FlagMailbox;
use wearlink::rssi::CalibrationConstants;

const BUTTON_HANDLE: CharHandle = CharHandle(7);
const MOTION_HANDLE: CharHandle = CharHandle(8);

/// Peer fixture: which characteristics the fake wearable exposes, plus a
/// record of everything written to it.
struct FakePeer {
    button: Option<CharProps>,
    motion: Option<CharProps>,
    writes: Vec<(CharHandle, WriteMode, Vec<u8>)>,
    subscribed: Vec<CharHandle>,
    disconnects: usize,
}

impl FakePeer {
    fn wearable() -> Self {
        Self {
            button: Some(CharProps {
                write: true,
                write_without_response: true,
                notify: false,
            }),
            motion: Some(CharProps {
                write: false,
                write_without_response: false,
                notify: true,
            }),
            writes: Vec::new(),
            subscribed: Vec::new(),
            disconnects: 0,
        }
    }
}

impl RadioTransport for FakePeer {
    async fn connect(&mut self, _addr: &PeerAddress, _hint: u16) -> Result<(), TransportError> {
        Ok(())
    }

    async fn resolve_service(&mut self, uuid: &Uuid128) -> bool {
        *uuid == config::WEAR_SERVICE_UUID
    }

    async fn resolve_characteristic(&mut self, uuid: &Uuid128) -> Option<CharacteristicInfo> {
        if *uuid == config::BUTTON_CHAR_UUID {
            self.button.map(|props| CharacteristicInfo {
                handle: BUTTON_HANDLE,
                props,
            })
        } else if *uuid == config::MOTION_CHAR_UUID {
            self.motion.map(|props| CharacteristicInfo {
                handle: MOTION_HANDLE,
                props,
            })
        } else {
            None
        }
    }

    async fn subscribe(&mut self, chr: CharHandle) -> Result<(), TransportError> {
        self.subscribed.push(chr);
        Ok(())
    }

    async fn write(
        &mut self,
        chr: CharHandle,
        mode: WriteMode,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        self.writes.push((chr, mode, payload.to_vec()));
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.disconnects += 1;
    }
}

fn link_with(peer: FakePeer) -> LinkManager<'static, FakePeer> {
    let mailbox: &'static FlagMailbox = Box::leak(Box::new(FlagMailbox::new()));
    LinkManager::new(peer, mailbox, CalibrationConstants::default())
}

#[test]
fn peer_without_button_characteristic_leaves_no_session_behind() {
    let mut peer = FakePeer::wearable();
    peer.button = None;
    let mut link = link_with(peer);

    let err = block_on(link.connect(&config::PEER_ADDRESS)).unwrap_err();
    assert_eq!(err, LinkError::CharacteristicNotFound);
    assert_eq!(err.class(), FailureClass::Discovery);
    assert_eq!(link.state(), LinkState::Idle);
    assert_eq!(link.write_mode(), None);

    // The half-open transport link was released, nothing was subscribed,
    // and a write afterwards is refused up front.
    assert_eq!(link.transport().disconnects, 1);
    assert!(link.transport().subscribed.is_empty());
    let err = block_on(link.write_button_state(true)).unwrap_err();
    assert_eq!(err, LinkError::NotConnected);
    assert!(link.transport().writes.is_empty());
}

#[test]
fn button_writes_are_independent_of_the_motion_characteristic() {
    // Motion characteristic is notify-only (no write capability); the
    // button path must not care.
    let mut link = link_with(FakePeer::wearable());
    block_on(link.connect(&config::PEER_ADDRESS)).unwrap();

    assert_eq!(link.transport().subscribed, vec![MOTION_HANDLE]);

    block_on(link.write_button_state(true)).unwrap();
    block_on(link.write_button_state(false)).unwrap();

    let writes = &link.transport().writes;
    assert_eq!(writes.len(), 2);
    assert_eq!(
        writes[0],
        (BUTTON_HANDLE, WriteMode::WithoutResponse, vec![0x01])
    );
    assert_eq!(
        writes[1],
        (BUTTON_HANDLE, WriteMode::WithoutResponse, vec![0x00])
    );
}

#[test]
fn session_lifecycle_connect_notify_disconnect() {
    let mailbox: &'static FlagMailbox = Box::leak(Box::new(FlagMailbox::new()));
    let mut link = LinkManager::new(
        FakePeer::wearable(),
        mailbox,
        CalibrationConstants::default(),
    );

    block_on(link.connect(&config::PEER_ADDRESS)).unwrap();
    assert_eq!(link.state(), LinkState::Connected);

    // Notifications flow through the decode → mailbox path with
    // latest-wins semantics.
    link.on_notification(b"hdr;1");
    link.on_notification(b"hdr;0");
    assert_eq!(mailbox.take(), Some(MotionFlag::Still));
    assert_eq!(mailbox.take(), None);

    // Proximity readout follows the smoothed RSSI.
    link.record_rssi(-59);
    assert!((link.estimated_distance_m().unwrap() - 1.0).abs() < 1e-5);

    block_on(link.disconnect());
    assert_eq!(link.state(), LinkState::Idle);
    assert_eq!(link.transport().disconnects, 1);
    // Distance history belongs to the closed session.
    assert_eq!(link.estimated_distance_m(), None);

    // Disconnect is idempotent once idle.
    block_on(link.disconnect());
    assert_eq!(link.transport().disconnects, 1);
}
