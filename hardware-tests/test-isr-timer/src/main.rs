//! Report-tick smoke test: the on-board LED toggles on every firing of the
//! two-second analysis alarm.
#![no_std]
#![no_main]

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};
use cortex_m::interrupt::Mutex;
use defmt::info;
use defmt_rtt as _;
use embedded_hal::digital::v2::OutputPin;
use fugit::MicrosDurationU32;
use panic_halt as _;
use rp_pico::hal::{
    clocks,
    sio::Sio,
    timer::{Alarm, Alarm0, Timer},
    Watchdog,
};
use rp_pico::pac::{interrupt, Interrupt, Peripherals, NVIC};
use rp_pico::Pins;

/// Milliseconds between analysis cycles.
const REPORT_INTERVAL_MS: u32 = 2000;

static GLOBAL_ALARM: Mutex<RefCell<Option<Alarm0>>> = Mutex::new(RefCell::new(None));
static G_REPORT_TICK: AtomicBool = AtomicBool::new(false);

/// Entry point to our bare-metal application.
///
/// The `#[entry]` macro ensures the Cortex-M start-up code calls this function
/// as soon as all global variables are initialised.
#[rp_pico::entry]
fn main() -> ! {
    let mut pac = Peripherals::take().unwrap();
    let sio = Sio::new(pac.SIO);

    // boilerplate from the rp2040 template:
    let pins = Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );
    let mut led_pin = pins.led.into_push_pull_output();
    led_pin.set_low().unwrap();

    let mut watchdog = Watchdog::new(pac.WATCHDOG);
    let clocks = clocks::init_clocks_and_plls(
        rp_pico::XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();
    let mut timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);
    let mut alarm0 = timer.alarm_0().unwrap();
    alarm0
        .schedule(MicrosDurationU32::millis(REPORT_INTERVAL_MS))
        .unwrap();
    alarm0.enable_interrupt();
    cortex_m::interrupt::free(|cs| {
        GLOBAL_ALARM.borrow(cs).replace(Some(alarm0));
    });
    unsafe {
        NVIC::unmask(Interrupt::TIMER_IRQ_0);
    }
    info!("toggling the LED every {} ms", REPORT_INTERVAL_MS);
    let mut led_active = false;
    loop {
        if G_REPORT_TICK.load(Ordering::Acquire) {
            if led_active {
                led_pin.set_high().unwrap();
            } else {
                led_pin.set_low().unwrap();
            }
            led_active = !led_active;
            info!("report tick");
            G_REPORT_TICK.store(false, Ordering::Release);
        }
    }
}

#[allow(non_snake_case)]
#[interrupt]
fn TIMER_IRQ_0() {
    static mut ALARM: Option<Alarm0> = None;

    G_REPORT_TICK.store(true, Ordering::Release);

    if ALARM.is_none() {
        cortex_m::interrupt::free(|cs| *ALARM = GLOBAL_ALARM.borrow(cs).take());
    }
    if let Some(alarm) = ALARM.as_mut() {
        alarm.clear_interrupt();
        // alarm is oneshot, so re-arm it here:
        alarm
            .schedule(MicrosDurationU32::millis(REPORT_INTERVAL_MS))
            .unwrap();
    }
}
