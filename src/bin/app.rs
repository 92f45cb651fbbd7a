#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::Duration;

use esp_alloc as _;
use esp_backtrace as _;
use esp_hal::{clock::CpuClock, timer::timg::TimerGroup};

use ble_led_core::{CommandRouter, WaveformEncoder};
use ble_led_strip::controllers::init_controllers;
use ble_led_strip::infrastructure::drivers::{
    device_address, init_ble_controller, init_power_line,
};
use ble_led_strip::infrastructure::tasks::{
    ble_session_task, init_gatt_server, init_transmit_channel, transmit_report_task,
    transmit_task,
};
use ble_led_strip::infrastructure::types::StripRouter;
use ble_led_strip::{led_gpio, power_gpio};

esp_bootloader_esp_idf::esp_app_desc!();

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    esp_println::logger::init_logger_from_env();

    // Initialize hardware
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // The BLE controller needs heap
    esp_alloc::heap_allocator!(
        #[unsafe(link_section = ".dram2_uninit")] size: 64 * 1024
    );

    // Start rtos
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let boot_controller = init_controllers();

    // Strip stays unpowered until the transmit channel is up
    let power = init_power_line(power_gpio!(peripherals));
    let channel = match init_transmit_channel(peripherals.RMT, led_gpio!(peripherals)) {
        Ok(channel) => channel,
        Err(err) => boot_controller.on_transmit_fault(power, err).await,
    };

    let encoder = WaveformEncoder::new(channel.pulse_spec());
    let router: StripRouter = CommandRouter::new(power, encoder, channel.submitter());
    spawner.spawn(transmit_task(channel)).ok();
    spawner.spawn(transmit_report_task()).ok();

    let controller = match init_ble_controller(peripherals.BT) {
        Ok(controller) => controller,
        Err(err) => boot_controller.on_ble_fault(router, err).await,
    };
    let server = match init_gatt_server() {
        Ok(server) => server,
        Err(err) => boot_controller.on_ble_fault(router, err).await,
    };

    // The session task powers the strip and shows the default color
    spawner
        .spawn(ble_session_task(
            controller,
            server,
            router,
            device_address(),
            boot_controller,
        ))
        .ok();

    loop {
        embassy_time::Timer::after(Duration::from_secs(5)).await;
    }
}
