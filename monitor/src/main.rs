//! DCF77 reception-quality monitor on a Pico board
//!
//! An edge ISR timestamps every transition of the receiver output into a
//! bounded ring; every two seconds the main loop snapshots the ring, runs
//! the `dcf77-quality` pipeline over it and writes score, time and
//! diagnostics to the LCD.
#![no_std]
#![no_main]

use crate::monitor_hardware::{EDGE_RING, GLOBAL_ALARM, GLOBAL_SIGNAL_PIN, GLOBAL_TIMER, SignalPin};
use core::sync::atomic::{AtomicBool, Ordering};
use cortex_m::delay::Delay;
use dcf77_quality::{EdgeSnapshot, SignalAnalyzer};
use defmt_rtt as _;
use embedded_hal::digital::v2::{InputPin, OutputPin, ToggleableOutputPin};
use fugit::{MicrosDurationU32, RateExtU32};
use hd44780_driver::{Cursor, CursorBlink, HD44780};
use rp_pico::hal::{
    clocks,
    clocks::Clock,
    gpio,
    gpio::FunctionI2C,
    sio::Sio,
    timer::{Alarm, Alarm0},
    watchdog::Watchdog,
    Timer, I2C,
};
use rp_pico::pac;
use rp_pico::pac::{interrupt, CorePeripherals, Peripherals, NVIC};
use rp_pico::Pins;

extern crate panic_halt; // provides a #[panic_handler] function

mod hd44780_helper;
mod monitor_hardware;

/// I²C address of the PCF8574 adapter, change as needed
const I2C_ADDRESS: u8 = 0x27;

/// Milliseconds between analysis cycles.
const REPORT_INTERVAL_MS: u32 = 2000;

static G_REPORT_TICK: AtomicBool = AtomicBool::new(false);

/// Entry point to our bare-metal application.
///
/// The `#[entry]` macro ensures the Cortex-M start-up code calls this function
/// as soon as all global variables and the spinlock are initialised.
#[rp_pico::entry]
fn main() -> ! {
    // Set up basic peripherals:
    let mut pac = Peripherals::take().unwrap();
    let mut watchdog = Watchdog::new(pac.WATCHDOG);

    // Set up the RP2040 clock:
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

    let core = CorePeripherals::take().unwrap();
    let mut delay = Delay::new(core.SYST, clocks.system_clock.freq().to_Hz());

    // Set up the I/O pin bank:
    let sio = Sio::new(pac.SIO);
    let pins = Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    defmt::info!("monitor starting");

    // Configure the LCD display using the I²C interface:
    let sda_pin = pins.gpio26.into_function::<FunctionI2C>();
    let scl_pin = pins.gpio27.into_function::<FunctionI2C>();
    let i2c = I2C::i2c1(
        pac.I2C1,
        sda_pin,
        scl_pin,
        400.kHz(),
        &mut pac.RESETS,
        &clocks.peripheral_clock,
    );
    let mut lcd = HD44780::new_i2c(i2c, I2C_ADDRESS, &mut delay).unwrap();
    // Initialize the display:
    lcd.reset(&mut delay).unwrap();
    lcd.clear(&mut delay).unwrap();
    lcd.set_cursor_blink(CursorBlink::Off, &mut delay).unwrap(); // small static cursor
    lcd.set_cursor_visibility(Cursor::Invisible, &mut delay)
        .unwrap(); // turn off completely

    // Set the power-down pin to LOW, i.e. receiver ON:
    let mut receiver_pdn = pins.gpio15.into_push_pull_output();
    receiver_pdn.set_low().unwrap();

    // Set up the on-board heartbeat LED:
    let mut led_pin = pins.led.into_push_pull_output();
    led_pin.set_low().unwrap();

    // The receiver output, pulled up; both edges matter.
    let signal_pin: SignalPin = pins.gpio11.into_pull_up_input();
    signal_pin.set_interrupt_enabled(gpio::Interrupt::EdgeHigh, true);
    signal_pin.set_interrupt_enabled(gpio::Interrupt::EdgeLow, true);

    let mut timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);
    let mut alarm0 = timer.alarm_0().unwrap();
    alarm0
        .schedule(MicrosDurationU32::millis(REPORT_INTERVAL_MS))
        .unwrap();
    alarm0.enable_interrupt();

    // Give the ISR-owned peripherals away. Ready, set, go!
    cortex_m::interrupt::free(|cs| {
        GLOBAL_SIGNAL_PIN.borrow(cs).replace(Some(signal_pin));
        GLOBAL_TIMER.borrow(cs).replace(Some(timer));
        GLOBAL_ALARM.borrow(cs).replace(Some(alarm0));
    });
    unsafe {
        NVIC::unmask(pac::Interrupt::IO_IRQ_BANK0);
        NVIC::unmask(pac::Interrupt::TIMER_IRQ_0);
    }

    let mut snapshot = EdgeSnapshot::new();
    let mut analyzer = SignalAnalyzer::new();

    hd44780_helper::write_status(&mut lcd, &mut delay, "0", "INIT", "");
    defmt::info!("init done, reporting every {} ms", REPORT_INTERVAL_MS);

    loop {
        if G_REPORT_TICK.load(Ordering::Acquire) {
            cortex_m::interrupt::free(|cs| {
                snapshot.capture(&EDGE_RING.borrow(cs).borrow());
            });
            let report = analyzer.analyze(snapshot.times(), snapshot.levels());
            hd44780_helper::write_status(
                &mut lcd,
                &mut delay,
                &report.line1,
                &report.line2,
                &report.line3,
            );
            led_pin.toggle().unwrap();
            G_REPORT_TICK.store(false, Ordering::Release);
        }
    }
}

#[allow(non_snake_case)]
#[interrupt]
fn IO_IRQ_BANK0() {
    static mut SIGNAL_PIN: Option<SignalPin> = None;
    static mut TIMER: Option<Timer> = None;

    // One-time lazy initialisation: steal the peripherals handed over
    // through the globals.
    if SIGNAL_PIN.is_none() {
        cortex_m::interrupt::free(|cs| *SIGNAL_PIN = GLOBAL_SIGNAL_PIN.borrow(cs).take());
    }
    if TIMER.is_none() {
        cortex_m::interrupt::free(|cs| *TIMER = GLOBAL_TIMER.borrow(cs).take());
    }

    if let (Some(signal_pin), Some(timer)) = (SIGNAL_PIN.as_mut(), TIMER.as_ref()) {
        let now = timer.get_counter_low();
        let is_low = signal_pin.is_low().unwrap();
        cortex_m::interrupt::free(|cs| {
            EDGE_RING.borrow(cs).borrow_mut().record(now, !is_low);
        });
        // Our edge interrupts don't clear themselves. Do that at the end,
        // so we don't immediately jump back to the ISR.
        signal_pin.clear_interrupt(if is_low {
            gpio::Interrupt::EdgeLow
        } else {
            gpio::Interrupt::EdgeHigh
        });
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
