use bt_hci::cmd::le::LeReadAdvPhysicalChannelTxPower;
use embassy_futures::{
    join::join,
    select::{Either, select},
};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::{Duration, Timer};
use esp_println::println;
use trouble_host::prelude::*;

use ble_led_core::{
    AdvertisingParams, AttError, CharacteristicId, DeviceAddress, ProtocolSession, STRIP_SERVICE,
    SessionEvent, SessionOutcome, WriteResponse, advertising::MAX_ADV_PAYLOAD_LEN,
};

use crate::{
    controllers::BootController,
    infrastructure::{
        config,
        drivers::{BleController, BleInitError},
        types::StripRouter,
    },
    mk_static,
};

const CONNECTIONS_MAX: usize = 1;
const L2CAP_CHANNELS_MAX: usize = 2;

/// Largest value stored for a written characteristic
const VALUE_CAPACITY: usize = 16;

/// Status used when the host reports a failure without an HCI code
const HOST_FAILURE: i32 = -1;

const ADVERTISING_RETRY: Duration = Duration::from_millis(500);
const RUNNER_RESTART: Duration = Duration::from_secs(1);

/// Raised by the host runner when it stops, carries the failure status
static HOST_RESET: Signal<CriticalSectionRawMutex, i32> = Signal::new();

#[gatt_service(uuid = "e2cfbe98-68fe-33cf-da9a-0464bc340004")]
struct StripService {
    #[characteristic(uuid = "f3dfcfa9-79ef-44bf-ebab-0575cd450005", write)]
    color: heapless::Vec<u8, VALUE_CAPACITY>,
    #[characteristic(uuid = "d1bfad87-57ed-22de-c989-0353ab210003", write)]
    power: heapless::Vec<u8, VALUE_CAPACITY>,
}

#[gatt_server]
pub struct StripServer {
    strip: StripService,
}

/// Build the attribute table of the strip service
pub fn init_gatt_server() -> Result<&'static StripServer<'static>, BleInitError> {
    let server = StripServer::new_with_config(GapConfig::Peripheral(PeripheralConfig {
        name: config::DEVICE.name,
        appearance: &appearance::power_device::GENERIC_POWER_DEVICE,
    }))
    .map_err(BleInitError::Gatt)?;

    for characteristic in STRIP_SERVICE.characteristics {
        println!(
            "ble: {} characteristic {} accepts up to {} bytes",
            characteristic.name, characteristic.uuid, characteristic.max_len
        );
    }
    Ok(&*mk_static!(StripServer<'static>, server))
}

/// BLE task: runs the host and the protocol session side by side.
///
/// The strip is powered and shows its default color once the host is up.
/// The session owns the router, so every accepted write is applied to the
/// strip before the peer gets its response.
#[embassy_executor::task]
pub async fn ble_session_task(
    controller: BleController,
    server: &'static StripServer<'static>,
    mut router: StripRouter,
    address: DeviceAddress,
    boot: BootController,
) {
    let mut resources: HostResources<DefaultPacketPool, CONNECTIONS_MAX, L2CAP_CHANNELS_MAX> =
        HostResources::new();
    let stack = trouble_host::new(controller, &mut resources)
        .set_random_address(Address::random(address.to_le_bytes()));
    let Host {
        mut peripheral,
        runner,
        ..
    } = stack.build();

    join(host_task(runner), async {
        let tx_power_dbm = match stack.command(LeReadAdvPhysicalChannelTxPower::new()).await {
            Ok(level) => level,
            Err(e) => {
                println!("ble: failed to read tx power: {:?}", e);
                config::BLE.fallback_tx_power_dbm
            }
        };
        let mut session = ProtocolSession::new(config::DEVICE.name, tx_power_dbm, &STRIP_SERVICE);
        boot.on_boot(&mut router);

        let mut outcome = session.handle(SessionEvent::HostSynced { address }, &mut router);
        loop {
            let cycle = run_cycle(outcome, &mut session, &mut router, &mut peripheral, server);
            outcome = match select(cycle, HOST_RESET.wait()).await {
                Either::First(next) => next,
                Either::Second(reason) => {
                    session.handle(SessionEvent::HostReset { reason }, &mut router);
                    session.handle(SessionEvent::HostSynced { address }, &mut router)
                }
            };
        }
    })
    .await;
}

async fn host_task<C: Controller, P: PacketPool>(mut runner: Runner<'_, C, P>) {
    loop {
        if let Err(e) = runner.run().await {
            println!("ble: host stopped: {:?}", e);
            HOST_RESET.signal(HOST_FAILURE);
            Timer::after(RUNNER_RESTART).await;
        }
    }
}

/// Act on one session outcome and return the next one
async fn run_cycle<'stack, C: Controller>(
    outcome: SessionOutcome,
    session: &mut ProtocolSession,
    router: &mut StripRouter,
    peripheral: &mut Peripheral<'stack, C, DefaultPacketPool>,
    server: &'static StripServer<'static>,
) -> SessionOutcome {
    let SessionOutcome::Advertise(params) = outcome else {
        // Nothing to do until the host resyncs
        return core::future::pending().await;
    };

    match advertise(&params, peripheral, server).await {
        Ok(conn) => {
            let handle = conn.raw().handle().raw();
            session.handle(SessionEvent::Connected { conn: handle }, router);
            let reason = serve_connection(session, router, server, &conn).await;
            session.handle(SessionEvent::Disconnected { reason }, router)
        }
        Err(e) => {
            println!("ble: advertising failed: {:?}", e);
            Timer::after(ADVERTISING_RETRY).await;
            session.handle(SessionEvent::ConnectFailed { status: HOST_FAILURE }, router)
        }
    }
}

async fn advertise<'stack, C: Controller>(
    params: &AdvertisingParams,
    peripheral: &mut Peripheral<'stack, C, DefaultPacketPool>,
    server: &'static StripServer<'static>,
) -> Result<GattConnection<'stack, 'static, DefaultPacketPool>, BleHostError<C::Error>> {
    let mut adv_data = [0u8; MAX_ADV_PAYLOAD_LEN];
    let len = match params.encode_payload(&mut adv_data) {
        Ok(len) => len,
        Err(e) => {
            println!("ble: advertising payload rejected: {:?}", e);
            return Err(BleHostError::BleHost(Error::InsufficientSpace));
        }
    };

    let adv_params = AdvertisementParameters {
        timeout: params
            .duration_ms
            .map(|ms| Duration::from_millis(u64::from(ms))),
        ..Default::default()
    };
    let advertiser = peripheral
        .advertise(
            &adv_params,
            Advertisement::ConnectableScannableUndirected {
                adv_data: &adv_data[..len],
                scan_data: &[],
            },
        )
        .await?;
    println!("ble: advertising as {} ({})", params.name, params.address);

    let conn = advertiser.accept().await?.with_attribute_server(server)?;
    Ok(conn)
}

/// Serve GATT events until the peer disconnects, returns the reason
async fn serve_connection<P: PacketPool>(
    session: &mut ProtocolSession,
    router: &mut StripRouter,
    server: &StripServer<'_>,
    conn: &GattConnection<'_, '_, P>,
) -> i32 {
    let color_handle = server.strip.color.handle;
    let power_handle = server.strip.power.handle;

    loop {
        match conn.next().await {
            GattConnectionEvent::Disconnected { reason } => {
                return i32::from(reason.into_inner());
            }
            GattConnectionEvent::Gatt { event } => {
                let outcome = match &event {
                    GattEvent::Write(write) => {
                        let characteristic = if write.handle() == color_handle {
                            Some(CharacteristicId::Color)
                        } else if write.handle() == power_handle {
                            Some(CharacteristicId::Power)
                        } else {
                            None
                        };
                        match characteristic {
                            Some(characteristic) => session.handle(
                                SessionEvent::Write {
                                    characteristic,
                                    payload: write.data(),
                                },
                                router,
                            ),
                            None => SessionOutcome::Continue,
                        }
                    }
                    GattEvent::Read(read)
                        if read.handle() == color_handle || read.handle() == power_handle =>
                    {
                        session.handle(SessionEvent::UnsupportedOperation, router)
                    }
                    _ => SessionOutcome::Continue,
                };

                let reply = match outcome {
                    SessionOutcome::Respond(WriteResponse::Rejected(err)) => {
                        event.reject(att_error_code(err))
                    }
                    _ => event.accept(),
                };
                match reply {
                    Ok(reply) => reply.send().await,
                    Err(e) => println!("ble: failed to respond: {:?}", e),
                }
            }
            _ => {}
        }
    }
}

fn att_error_code(err: AttError) -> AttErrorCode {
    match err {
        AttError::InvalidAttributeValueLength => AttErrorCode::INVALID_ATTRIBUTE_VALUE_LENGTH,
        AttError::Unlikely => AttErrorCode::UNLIKELY_ERROR,
    }
}
