//! Edge-ISR smoke test: the on-board LED mirrors the receiver output and
//! the edge ring fills with debounced, timestamped transitions.
#![no_std]
#![no_main]

use bsp::hal::{clocks, pac, sio::Sio, watchdog::Watchdog, Timer};
use bsp::pac::interrupt;
use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};
use cortex_m::interrupt::Mutex;
use cortex_m_rt::entry; // the macro for our start-up function
use dcf77_quality::EdgeBuffer;
use defmt::info;
use defmt_rtt as _;
use embedded_hal::digital::v2::{InputPin, OutputPin};
use panic_halt as _;
use rp_pico as bsp;
use rp_pico::hal::gpio;
use rp_pico::hal::gpio::Interrupt::{EdgeHigh, EdgeLow};

type SignalPin = gpio::Pin<gpio::bank0::Gpio11, gpio::FunctionSioInput, gpio::PullUp>;

// Needed to transfer the peripherals into the ISR:
static GLOBAL_SIGNAL_PIN: Mutex<RefCell<Option<SignalPin>>> = Mutex::new(RefCell::new(None));
static GLOBAL_TIMER: Mutex<RefCell<Option<Timer>>> = Mutex::new(RefCell::new(None));

static EDGE_RING: Mutex<RefCell<EdgeBuffer>> = Mutex::new(RefCell::new(EdgeBuffer::new()));

static G_HIGH_EDGE_RECEIVED: AtomicBool = AtomicBool::new(false);
static G_LOW_EDGE_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Entry point to our bare-metal application.
///
/// The `#[entry]` macro ensures the Cortex-M start-up code calls this function
/// as soon as all global variables are initialised.
#[entry]
fn main() -> ! {
    let mut pac = pac::Peripherals::take().unwrap();
    let mut watchdog = Watchdog::new(pac.WATCHDOG);
    // The timestamp timer needs the clock tree:
    let clocks = clocks::init_clocks_and_plls(
        bsp::XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    let sio = Sio::new(pac.SIO);
    let pins = bsp::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let mut led_pin = pins.led.into_push_pull_output();
    led_pin.set_low().unwrap();

    let signal_pin: SignalPin = pins.gpio11.into_pull_up_input();
    signal_pin.set_interrupt_enabled(EdgeHigh, true);
    signal_pin.set_interrupt_enabled(EdgeLow, true);

    let timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

    // Give the peripherals away to the ISR
    cortex_m::interrupt::free(|cs| {
        GLOBAL_SIGNAL_PIN.borrow(cs).replace(Some(signal_pin));
        GLOBAL_TIMER.borrow(cs).replace(Some(timer));
    });
    unsafe {
        pac::NVIC::unmask(pac::Interrupt::IO_IRQ_BANK0);
    }

    info!("watching for edges on GPIO11");
    let mut last_count = 0;
    loop {
        // active-low signal: LED on while the carrier is dipped
        if G_LOW_EDGE_RECEIVED.load(Ordering::Acquire) {
            led_pin.set_high().unwrap();
            G_LOW_EDGE_RECEIVED.store(false, Ordering::Release);
        }
        if G_HIGH_EDGE_RECEIVED.load(Ordering::Acquire) {
            led_pin.set_low().unwrap();
            G_HIGH_EDGE_RECEIVED.store(false, Ordering::Release);
        }

        let count = cortex_m::interrupt::free(|cs| EDGE_RING.borrow(cs).borrow().len());
        if count != last_count {
            info!("edges retained: {}", count);
            last_count = count;
        }
    }
}

#[interrupt]
fn IO_IRQ_BANK0() {
    static mut SIGNAL_PIN: Option<SignalPin> = None;
    static mut TIMER: Option<Timer> = None;

    // This is one-time lazy initialisation. We steal the variables given to
    // us via the globals.
    if SIGNAL_PIN.is_none() {
        cortex_m::interrupt::free(|cs| {
            *SIGNAL_PIN = GLOBAL_SIGNAL_PIN.borrow(cs).take();
        });
    }
    if TIMER.is_none() {
        cortex_m::interrupt::free(|cs| {
            *TIMER = GLOBAL_TIMER.borrow(cs).take();
        });
    }

    if let (Some(signal_pin), Some(timer)) = (SIGNAL_PIN.as_mut(), TIMER.as_ref()) {
        let now = timer.get_counter_low();
        let is_low = signal_pin.is_low().unwrap();
        cortex_m::interrupt::free(|cs| {
            EDGE_RING.borrow(cs).borrow_mut().record(now, !is_low);
        });
        // Our edge interrupts don't clear themselves. Do that at the end,
        // so we don't immediately jump back to this interrupt handler.
        if is_low {
            G_LOW_EDGE_RECEIVED.store(true, Ordering::Release);
            signal_pin.clear_interrupt(EdgeLow);
        } else {
            G_HIGH_EDGE_RECEIVED.store(true, Ordering::Release);
            signal_pin.clear_interrupt(EdgeHigh);
        }
    }
}
