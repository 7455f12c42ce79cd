//! SoftDevice-backed wearable client.
//!
//! After the GAP connection is established, this module:
//! 1. Discovers the wearable service.
//! 2. Locates the button and motion characteristics.
//! 3. Enables CCCD notifications on the motion characteristic.
//! 4. Decodes each motion notification and posts the flag into the
//!    mailbox - on the SoftDevice's delivery context, never touching
//!    session state.
//!
//! [`SoftdeviceTransport`] adapts this surface to the radio seam the
//! link manager drives.

use crate::ble::notify_parser::decode_flag;
use crate::ble::transport::{
    CharHandle, CharProps, CharacteristicInfo, PeerAddress, RadioTransport, TransportError,
    Uuid128, WriteMode,
};
use crate::config;
use crate::mailbox::FlagMailbox;
use defmt::{info, warn};
use nrf_softdevice::ble::{central, gatt_client, Address, AddressType, Connection};
use nrf_softdevice::{raw, Softdevice};

/// nrf-softdevice GATT client struct for the wearable service.
///
/// The `#[nrf_softdevice::gatt_client]` macro generates discovery and
/// read/write/notify helpers for the listed characteristics.
#[nrf_softdevice::gatt_client(uuid = "7c691000-e3a6-4f2c-a6a0-5b8d9e2f0c31")]
pub struct WearServiceClient {
    /// Button-state mirror on the wearable - one byte, 0x00 or 0x01.
    #[characteristic(
        uuid = "7c691001-e3a6-4f2c-a6a0-5b8d9e2f0c31",
        write,
        write_without_response
    )]
    pub button_state: u8,

    /// Motion flag - notifications carry the wearable's IMU state.
    #[characteristic(uuid = "7c691002-e3a6-4f2c-a6a0-5b8d9e2f0c31", read, notify)]
    pub motion_flag: [u8; 20],
}

// Transport-scoped characteristic tokens. Only this module interprets
// them; the session stores them opaquely.
const BUTTON_TOKEN: CharHandle = CharHandle(1);
const MOTION_TOKEN: CharHandle = CharHandle(2);

/// Radio seam implementation over the SoftDevice Central APIs.
pub struct SoftdeviceTransport {
    sd: &'static Softdevice,
    conn: Option<Connection>,
    client: Option<WearServiceClient>,
}

impl SoftdeviceTransport {
    pub fn new(sd: &'static Softdevice) -> Self {
        Self {
            sd,
            conn: None,
            client: None,
        }
    }

    /// Live connection, present between a successful `connect` and the
    /// next `disconnect`.
    pub fn connection(&self) -> Option<&Connection> {
        self.conn.as_ref()
    }

    /// Discovered client, present once the service has been resolved.
    pub fn client(&self) -> Option<&WearServiceClient> {
        self.client.as_ref()
    }
}

impl RadioTransport for SoftdeviceTransport {
    async fn connect(
        &mut self,
        addr: &PeerAddress,
        att_mtu_hint: u16,
    ) -> Result<(), TransportError> {
        let peer = Address::new(AddressType::RandomStatic, addr.0);
        let whitelist = [&peer];
        let conn_cfg = central::ConnectConfig {
            scan_config: central::ScanConfig {
                whitelist: Some(&whitelist),
                ..Default::default()
            },
            conn_params: raw::ble_gap_conn_params_t {
                min_conn_interval: config::BLE_CONN_INTERVAL_MIN,
                max_conn_interval: config::BLE_CONN_INTERVAL_MAX,
                slave_latency: config::BLE_SLAVE_LATENCY,
                conn_sup_timeout: config::BLE_SUP_TIMEOUT,
            },
            ..Default::default()
        };

        let conn = central::connect(self.sd, &conn_cfg)
            .await
            .map_err(|_| TransportError(1))?;

        // The enlarged MTU is a hint; plenty of peers refuse the
        // exchange and the one-byte traffic here fits any MTU.
        match gatt_client::att_mtu_exchange(&conn, att_mtu_hint).await {
            Ok(_) => info!("ATT MTU exchange requested ({})", att_mtu_hint),
            Err(_) => warn!("peer declined ATT MTU exchange"),
        }

        self.conn = Some(conn);
        Ok(())
    }

    async fn resolve_service(&mut self, _uuid: &Uuid128) -> bool {
        // Discovery is driven by the client's service definition; a miss
        // means the connected peer does not expose the wearable service.
        let Some(conn) = &self.conn else {
            return false;
        };
        match gatt_client::discover(conn).await {
            Ok(client) => {
                self.client = Some(client);
                true
            }
            Err(_) => false,
        }
    }

    async fn resolve_characteristic(&mut self, uuid: &Uuid128) -> Option<CharacteristicInfo> {
        // Both characteristics were located together with the service;
        // capabilities follow the client's declarations.
        self.client.as_ref()?;
        if *uuid == config::BUTTON_CHAR_UUID {
            Some(CharacteristicInfo {
                handle: BUTTON_TOKEN,
                props: CharProps {
                    write: true,
                    write_without_response: true,
                    notify: false,
                },
            })
        } else if *uuid == config::MOTION_CHAR_UUID {
            Some(CharacteristicInfo {
                handle: MOTION_TOKEN,
                props: CharProps {
                    write: false,
                    write_without_response: false,
                    notify: true,
                },
            })
        } else {
            None
        }
    }

    async fn subscribe(&mut self, chr: CharHandle) -> Result<(), TransportError> {
        if chr != MOTION_TOKEN {
            return Err(TransportError(2));
        }
        let client = self.client.as_ref().ok_or(TransportError(2))?;
        client
            .motion_flag_cccd_write(true)
            .await
            .map_err(|_| TransportError(3))
    }

    async fn write(
        &mut self,
        chr: CharHandle,
        mode: WriteMode,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        if chr != BUTTON_TOKEN {
            return Err(TransportError(4));
        }
        let client = self.client.as_ref().ok_or(TransportError(4))?;
        let value = payload.first().copied().unwrap_or(0);
        let result = match mode {
            WriteMode::WithoutResponse => client.button_state_write_without_response(&value).await,
            WriteMode::WithResponse => client.button_state_write(&value).await,
        };
        result.map_err(|_| TransportError(5))
    }

    async fn disconnect(&mut self) {
        self.client = None;
        if let Some(conn) = self.conn.take() {
            let _ = conn.disconnect();
        }
    }
}

/// Run the motion notification listener loop.
///
/// Blocks until the connection drops. Payloads are decoded right in the
/// SoftDevice's event callback and the flag posted into `mailbox`;
/// flagless payloads are dropped without a trace, which is intentional -
/// a lost status byte is not worth surfacing.
pub async fn run_notification_loop(
    conn: &Connection,
    client: &WearServiceClient,
    mailbox: &FlagMailbox,
) {
    info!("motion notification loop started");

    let _result = gatt_client::run(conn, client, |event| match event {
        WearServiceClientEvent::MotionFlagNotification(data) => {
            if let Some(flag) = decode_flag(&data) {
                mailbox.post(flag);
            }
        }
    })
    .await;

    info!("motion notification loop ended (connection closed)");
}
