//! Pre-connect advertisement watch.
//!
//! Uses the SoftDevice Central-role scanning API. Unlike a discovery
//! scan, this pass already knows the peer: it watches for the configured
//! wearable's advertisements, confirms it is in range before a connect
//! attempt, and feeds every sighting's RSSI into the proximity estimate.

use crate::ble::transport::{PeerAddress, TransportError};
use crate::config::BLE_SURVEY_DURATION_SECS;
use defmt::info;
use embassy_time::{Duration, Instant};
use nrf_softdevice::ble::central;
use nrf_softdevice::Softdevice;

/// Watch for `peer` for [`BLE_SURVEY_DURATION_SECS`] seconds.
///
/// `on_rssi` is called once per advertisement received from the peer,
/// from this task's context. Returns the number of sightings; zero means
/// the wearable was not heard this window.
pub async fn watch_for_peer(
    sd: &Softdevice,
    peer: &PeerAddress,
    mut on_rssi: impl FnMut(i8),
) -> Result<u32, TransportError> {
    info!("advertisement watch starting ({} s window)", BLE_SURVEY_DURATION_SECS);

    let scan_cfg = central::ScanConfig {
        ..Default::default()
    };

    let deadline = Instant::now() + Duration::from_secs(BLE_SURVEY_DURATION_SECS);
    let mut sightings: u32 = 0;

    let scan_result = central::scan(sd, &scan_cfg, |params| {
        if Instant::now() > deadline {
            return Some(()); // window closed - stop scanning
        }

        if params.peer_addr.addr == peer.0 {
            sightings += 1;
            on_rssi(params.rssi);
        }

        None // keep scanning
    })
    .await;

    if scan_result.is_err() {
        defmt::warn!("advertisement watch ended with error");
        return Err(TransportError(6));
    }

    info!("advertisement watch complete - {} sightings", sightings);
    Ok(sightings)
}
