use core::cell::RefCell;
use cortex_m::interrupt::Mutex;
use dcf77_quality::EdgeBuffer;
use hd44780_driver::bus::I2CBus;
use rp_pico::hal::{
    gpio::{bank0, FunctionI2C, FunctionSioInput, Pin, PullDown, PullUp},
    timer::Alarm0,
    Timer, I2C,
};
use rp_pico::pac::I2C1;

/// Input carrying the receiver's demodulated output, pulled up and driven
/// low during a pulse.
pub type SignalPin = Pin<bank0::Gpio11, FunctionSioInput, PullUp>;

pub type I2CDisplay = I2CBus<
    I2C<
        I2C1,
        (
            Pin<bank0::Gpio26, FunctionI2C, PullDown>,
            Pin<bank0::Gpio27, FunctionI2C, PullDown>,
        ),
    >,
>;

/// Edge ring: written by the edge ISR, snapshotted by the report loop
/// inside a critical section.
pub static EDGE_RING: Mutex<RefCell<EdgeBuffer>> = Mutex::new(RefCell::new(EdgeBuffer::new()));

// ISR-owned peripherals, handed over once during start-up.
pub static GLOBAL_SIGNAL_PIN: Mutex<RefCell<Option<SignalPin>>> = Mutex::new(RefCell::new(None));
pub static GLOBAL_TIMER: Mutex<RefCell<Option<Timer>>> = Mutex::new(RefCell::new(None));
pub static GLOBAL_ALARM: Mutex<RefCell<Option<Alarm0>>> = Mutex::new(RefCell::new(None));
