use core::fmt::Write;
use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use hd44780_driver::HD44780;
use heapless::String;

use crate::monitor_hardware::I2CDisplay;
use dcf77_quality::LINE_WIDTH;

/// Number of rows on the display, change as needed
const DISPLAY_ROWS: u8 = 4;
/// Number of columns on the display, change as needed
const DISPLAY_COLUMNS: u8 = 20;

/// Gets the one-dimensional HD44780 coordinate for position (x, y) (zero-based)
///
/// See <https://web.alfredstate.edu/faculty/weimandn/lcd/lcd_addressing/lcd_addressing_index.html>
fn get_xy(x: u8, y: u8) -> Option<u8> {
    if (x >= DISPLAY_COLUMNS) || (y >= DISPLAY_ROWS) {
        return None;
    }
    let mut addr = x & 0x3f;
    if (y & 1) == 1 {
        addr += 0x40;
    }
    if (y & 2) == 2 {
        addr += DISPLAY_COLUMNS;
    }
    Some(addr)
}

#[inline] // spend some flash on speed, the report loop redraws every cycle
pub fn write_at<D: DelayUs<u16> + DelayMs<u8>>(
    pos: (u8, u8),
    m: &str,
    lcd: &mut HD44780<I2CDisplay>,
    delay: &mut D,
) {
    lcd.set_cursor_pos(get_xy(pos.0, pos.1).unwrap(), delay)
        .unwrap();
    lcd.write_str(m, delay).unwrap();
}

/// Rewrites the three status rows in full, blank-padded to the status
/// width so stale text never survives a cycle.
pub fn write_status<D: DelayUs<u16> + DelayMs<u8>>(
    lcd: &mut HD44780<I2CDisplay>,
    delay: &mut D,
    line1: &str,
    line2: &str,
    line3: &str,
) {
    for (row, text) in [(0u8, line1), (1, line2), (2, line3)] {
        let mut padded: String<LINE_WIDTH> = String::new();
        write!(padded, "{:<width$}", text, width = LINE_WIDTH).unwrap();
        write_at((0, row), padded.as_str(), lcd, delay);
    }
}
