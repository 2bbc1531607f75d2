//! Display smoke test: brings up the I²C LCD and writes the three status
//! rows the way the monitor does, then overwrites them with a shorter
//! status to check the blank-padding.
#![no_std]
#![no_main]

use bsp::hal::{
    clocks::{init_clocks_and_plls, Clock},
    gpio::FunctionI2C,
    pac,
    sio::Sio,
    watchdog::Watchdog,
    I2C,
};
use bsp::XOSC_CRYSTAL_FREQ;
use core::fmt::Write;
use cortex_m_rt::entry;
use defmt::info;
use defmt_rtt as _;
use fugit::RateExtU32;
use hd44780_driver::HD44780;
use heapless::String;
use panic_halt as _;
use rp_pico as bsp;

/// Width of one status line, matching the monitor.
const LINE_WIDTH: usize = 8;

#[entry]
fn main() -> ! {
    let mut pac = pac::Peripherals::take().unwrap();
    let core = pac::CorePeripherals::take().unwrap();
    let mut watchdog = Watchdog::new(pac.WATCHDOG);
    let sio = Sio::new(pac.SIO);
    // boilerplate from the rp2040 template:
    let clocks = init_clocks_and_plls(
        XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    let mut delay = cortex_m::delay::Delay::new(core.SYST, clocks.system_clock.freq().to_Hz());
    let pins = bsp::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    // The monitor's display bus: I²C1 on GPIO26/GPIO27.
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
    let mut lcd = HD44780::new_i2c(i2c, 0x27, &mut delay).unwrap();

    lcd.reset(&mut delay).unwrap();
    lcd.clear(&mut delay).unwrap();

    // A decoded-frame status...
    info!("writing the decoded-frame status rows");
    write_row(&mut lcd, &mut delay, 0, "100");
    write_row(&mut lcd, &mut delay, 1, "14:37");
    write_row(&mut lcd, &mut delay, 2, "05/11");

    delay.delay_ms(5000u32);

    // ...then the no-signal status; the old text must vanish completely.
    info!("writing the no-signal status rows");
    write_row(&mut lcd, &mut delay, 0, "0");
    write_row(&mut lcd, &mut delay, 1, "NO SIG");
    write_row(&mut lcd, &mut delay, 2, "");

    // Do nothing - we're finished
    #[allow(clippy::empty_loop)]
    loop {
        // Empty loop
    }
}

/// Writes one blank-padded status row; rows 0 and 1 are the HD44780's two
/// line addresses.
fn write_row<B: hd44780_driver::bus::DataBus>(
    lcd: &mut HD44780<B>,
    delay: &mut cortex_m::delay::Delay,
    row: u8,
    text: &str,
) {
    let mut padded: String<LINE_WIDTH> = String::new();
    write!(padded, "{:<width$}", text, width = LINE_WIDTH).unwrap();
    let addr = match row {
        0 => 0,
        1 => 0x40,
        _ => 0x14, // third row on a 20x4 panel
    };
    lcd.set_cursor_pos(addr, delay).unwrap();
    lcd.write_str(padded.as_str(), delay).unwrap();
}
