//! wearlink embedded entry point (nRF52840 + SoftDevice S140).
//!
//! Task layout:
//! - `softdevice_task` - runs the SoftDevice event loop.
//! - `link_task`       - owns the wearable session: advertisement watch,
//!                       connect, notification loop, reconnect on drop.
//! - `button_task`     - debounced GPIO button, forwards both edges.
//! - `motion_task`     - polls the mailbox and drives the motion LED.
//! - `imu_task`        - local IMU bring-up, calibration, periodic reads.
//!
//! The link task is the only writer of session state; the SoftDevice
//! delivery context only ever posts into the mailbox.

#![no_std]
#![no_main]

use defmt_rtt as _;
use panic_probe as _;

use defmt::{info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::{AnyPin, Input, Level, Output, OutputDrive, Pin as _, Pull};
use embassy_nrf::interrupt::Priority;
use embassy_nrf::peripherals::TWISPI0;
use embassy_nrf::{bind_interrupts, twim};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{Duration, Ticker, Timer};
use nrf_softdevice::{raw, Softdevice};

use wearlink::ble::imu_client::{self, SoftdeviceTransport};
use wearlink::ble::link::LinkManager;
use wearlink::ble::survey;
use wearlink::ble::{LinkCommand, MotionFlag};
use wearlink::config;
use wearlink::imu::mpu9250::Mpu9250;
use wearlink::imu::{self, InertialSource};
use wearlink::mailbox::FlagMailbox;
use wearlink::rssi::CalibrationConstants;

bind_interrupts!(struct Irqs {
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<TWISPI0>;
});

/// Sole shared-mutable boundary between the SoftDevice delivery context
/// and the application tasks.
static MOTION_MAILBOX: FlagMailbox = FlagMailbox::new();

/// Input task → link task commands.
static LINK_COMMANDS: Channel<CriticalSectionRawMutex, LinkCommand, 4> = Channel::new();

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn link_task(sd: &'static Softdevice) -> ! {
    let mut link = LinkManager::new(
        SoftdeviceTransport::new(sd),
        &MOTION_MAILBOX,
        CalibrationConstants::default(),
    );
    let rx = LINK_COMMANDS.receiver();

    loop {
        // Wait until the wearable is heard advertising, charging the
        // proximity estimate from its advertisement RSSI.
        let sightings = match survey::watch_for_peer(sd, &config::PEER_ADDRESS, |rssi| {
            link.record_rssi(rssi);
        })
        .await
        {
            Ok(n) => n,
            Err(_) => {
                Timer::after(Duration::from_secs(1)).await;
                continue;
            }
        };
        if sightings == 0 {
            warn!("wearable not heard; watching again");
            continue;
        }
        if let Some(d) = link.estimated_distance_m() {
            info!("wearable in range, ~{} m", d);
        }

        if let Err(e) = link.connect(&config::PEER_ADDRESS).await {
            warn!("connect failed: {}", e);
            Timer::after(Duration::from_secs(1)).await;
            continue;
        }
        info!("wearable session established");

        // Serve button commands while the notification loop runs. A
        // command interrupts the loop briefly (CCCD stays enabled); the
        // loop ending on its own means the connection dropped.
        loop {
            let cmd = {
                let t = link.transport();
                let (Some(conn), Some(client)) = (t.connection(), t.client()) else {
                    break;
                };
                match select(
                    rx.receive(),
                    imu_client::run_notification_loop(conn, client, &MOTION_MAILBOX),
                )
                .await
                {
                    Either::First(cmd) => Some(cmd),
                    Either::Second(()) => None,
                }
            };

            match cmd {
                Some(LinkCommand::SetButton(pressed)) => {
                    if link.write_button_state(pressed).await.is_err() {
                        warn!("button write failed");
                    }
                }
                Some(LinkCommand::Disconnect) | None => break,
            }
        }

        link.disconnect().await;
        info!("wearable session closed");
    }
}

/// Debounced button forwarding (active-low with internal pull-up).
///
/// Both edges are sent: the wearable mirrors the actual button state,
/// not press events.
#[embassy_executor::task]
async fn button_task(pin: AnyPin) -> ! {
    let mut btn = Input::new(pin, Pull::Up);
    let tx = LINK_COMMANDS.sender();

    loop {
        btn.wait_for_falling_edge().await;
        Timer::after(Duration::from_millis(config::BUTTON_DEBOUNCE_MS)).await;

        if btn.is_low() {
            tx.send(LinkCommand::SetButton(true)).await;

            btn.wait_for_rising_edge().await;
            Timer::after(Duration::from_millis(config::BUTTON_DEBOUNCE_MS)).await;
            tx.send(LinkCommand::SetButton(false)).await;
        }
    }
}

/// Mailbox consumer: latest flag drives the motion LED.
#[embassy_executor::task]
async fn motion_task(pin: AnyPin) -> ! {
    let mut led = Output::new(pin, Level::Low, OutputDrive::Standard);
    let mut ticker = Ticker::every(Duration::from_millis(config::MOTION_POLL_MS));

    loop {
        ticker.next().await;
        match MOTION_MAILBOX.take() {
            Some(MotionFlag::Moving) => led.set_high(),
            Some(MotionFlag::Still) => led.set_low(),
            None => {}
        }
    }
}

/// Local IMU bring-up and periodic reads.
#[embassy_executor::task]
async fn imu_task(bus: twim::Twim<'static, TWISPI0>) -> ! {
    let mut dev = match Mpu9250::new(bus) {
        Ok(dev) => dev,
        Err(_) => {
            warn!("local IMU not responding");
            loop {
                Timer::after(Duration::from_secs(60)).await;
            }
        }
    };

    match imu::calibrate(|| dev.read_gyro(), config::CALIBRATION_SAMPLES) {
        Ok(bias) => info!("gyro bias: {} {} {}", bias[0], bias[1], bias[2]),
        Err(_) => warn!("gyro calibration failed"),
    }

    let mut ticker = Ticker::every(Duration::from_secs(1));
    loop {
        ticker.next().await;
        if let Ok([x, y, z]) = dev.read_accel() {
            info!("accel: {} {} {} g", x, y, z);
        }
    }
}

fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_XTAL as u8,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_50_PPM as u8,
            rc_ctiv: 0,
            rc_temp_ctiv: 0,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        // The enlarged ATT MTU is requested here; the peer may still
        // negotiate it down.
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t {
            att_mtu: config::ATT_MTU_HINT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 0,
            central_role_count: 1,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        ..Default::default()
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("wearlink starting");

    let mut nrf_config = embassy_nrf::config::Config::default();
    // The SoftDevice owns the highest interrupt priorities.
    nrf_config.gpiote_interrupt_priority = Priority::P2;
    nrf_config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(nrf_config);

    let sd = Softdevice::enable(&softdevice_config());

    let i2c = twim::Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());

    unwrap!(spawner.spawn(softdevice_task(sd)));
    unwrap!(spawner.spawn(link_task(sd)));
    unwrap!(spawner.spawn(button_task(p.P0_11.degrade())));
    unwrap!(spawner.spawn(motion_task(p.P0_06.degrade())));
    unwrap!(spawner.spawn(imu_task(i2c)));

    info!("wearlink up");
}
