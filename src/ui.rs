// StrideWatch: Screen Layouts
//
// Everything is drawn into a `FrameBuffer` using embedded-graphics; the
// firmware's SSD1306 driver only pushes the finished buffer over I2C.

use core::convert::Infallible;

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};

use crate::config::*;
use crate::events::{FallStatus, Snapshot};
use crate::settings::DisplaySettings;

// ---------------------------------------------------------------------------
// Frame buffer (SSD1306 page layout: 8 vertical pixels per byte)
// ---------------------------------------------------------------------------
pub struct FrameBuffer {
    buf: [u8; DISPLAY_BUFFER_SIZE],
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self { buf: [0; DISPLAY_BUFFER_SIZE] }
    }

    pub fn clear_all(&mut self) {
        self.buf.fill(0);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn pixel(&self, x: u32, y: u32) -> bool {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return false;
        }
        let (idx, bit) = Self::locate(x, y);
        self.buf[idx] & bit != 0
    }

    /// True if any pixel in rows `y0..y1` is lit.
    pub fn any_lit_in_rows(&self, y0: u32, y1: u32) -> bool {
        (y0..y1.min(SCREEN_HEIGHT)).any(|y| (0..SCREEN_WIDTH).any(|x| self.pixel(x, y)))
    }

    fn locate(x: u32, y: u32) -> (usize, u8) {
        let idx = (y / 8) as usize * SCREEN_WIDTH as usize + x as usize;
        (idx, 1 << (y % 8))
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            // Clip silently, as the panel does.
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as u32, point.y as u32);
            if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
                continue;
            }
            let (idx, bit) = Self::locate(x, y);
            match color {
                BinaryColor::On => self.buf[idx] |= bit,
                BinaryColor::Off => self.buf[idx] &= !bit,
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Layouts
// ---------------------------------------------------------------------------
const LARGE_LINE: i32 = 20;
const STATUS_TOP: i32 = 22;

fn small() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyle::new(&FONT_6X10, BinaryColor::On)
}

fn large() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyle::new(&FONT_10X20, BinaryColor::On)
}

fn line<D>(target: &mut D, text: &str, y: i32, style: MonoTextStyle<'_, BinaryColor>) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    Text::with_baseline(text, Point::new(0, y), style, Baseline::Top).draw(target)?;
    Ok(())
}

/// Main screen refreshed every tick.
pub struct StatusScreen;

impl StatusScreen {
    pub fn render<D>(snapshot: &Snapshot, display: &DisplaySettings, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        target.clear(BinaryColor::Off)?;

        let steps = format!("Steps: {}", display.shown_steps(snapshot.steps));
        line(target, &steps, 0, large())?;

        match snapshot.fall {
            FallStatus::Monitoring => line(target, FallStatus::Monitoring.label(), STATUS_TOP, small())?,
            FallStatus::FallDetected => {
                line(target, "Fall", STATUS_TOP, large())?;
                line(target, "Detected!", STATUS_TOP + LARGE_LINE, large())?;
            }
        }
        Ok(())
    }
}

/// Messages shown before the control loop starts.
pub struct BootScreen;

impl BootScreen {
    pub fn splash<D>(target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        target.clear(BinaryColor::Off)?;
        line(target, "StrideWatch", 0, large())?;
        line(target, "step + fall monitor", STATUS_TOP + 4, small())
    }

    pub fn connecting<D>(target: &mut D, ssid: &str) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        target.clear(BinaryColor::Off)?;
        line(target, "Connecting to WiFi...", 0, small())?;
        line(target, ssid, 12, small())
    }

    pub fn connected<D>(target: &mut D, ip: &str) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        target.clear(BinaryColor::Off)?;
        line(target, "WiFi Connected!", 0, small())?;
        line(target, "IP Address: ", 12, small())?;
        line(target, ip, 24, small())
    }

    pub fn self_test<D>(target: &mut D, display_ok: bool, sensor_ok: bool) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let mark = |ok: bool| if ok { "OK" } else { "FAIL" };
        target.clear(BinaryColor::Off)?;
        line(target, &format!("OLED    {}", mark(display_ok)), 0, small())?;
        line(target, &format!("MPU6050 {}", mark(sensor_ok)), 12, small())
    }

    pub fn halted<D>(target: &mut D, reason: &str) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        target.clear(BinaryColor::Off)?;
        line(target, "HALTED", 0, large())?;
        // 21 columns of 6x10 per row.
        let chars: Vec<char> = reason.chars().collect();
        for (row, chunk) in chars.chunks(21).take(4).enumerate() {
            let text: String = chunk.iter().collect();
            line(target, &text, STATUS_TOP + row as i32 * 10, small())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixels_use_page_layout() {
        let mut fb = FrameBuffer::new();
        Pixel(Point::new(3, 9), BinaryColor::On).draw(&mut fb).unwrap();
        assert!(fb.pixel(3, 9));
        // Row 9 lives in page 1, bit 1.
        assert_eq!(fb.as_bytes()[SCREEN_WIDTH as usize + 3], 0b10);
    }

    #[test]
    fn out_of_bounds_pixels_are_clipped() {
        let mut fb = FrameBuffer::new();
        let pixels = [
            Pixel(Point::new(-1, 0), BinaryColor::On),
            Pixel(Point::new(128, 0), BinaryColor::On),
            Pixel(Point::new(0, 64), BinaryColor::On),
        ];
        fb.draw_iter(pixels).unwrap();
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn monitoring_layout_leaves_bottom_blank() {
        let mut fb = FrameBuffer::new();
        let snap = Snapshot { steps: 7, fall: FallStatus::Monitoring, ticks: 1 };
        StatusScreen::render(&snap, &DisplaySettings::default(), &mut fb).unwrap();

        assert!(fb.any_lit_in_rows(0, 20));
        assert!(fb.any_lit_in_rows(STATUS_TOP as u32, STATUS_TOP as u32 + 10));
        assert!(!fb.any_lit_in_rows(42, 64));
    }

    #[test]
    fn status_line_starts_below_steps_line() {
        let mut fb = FrameBuffer::new();
        let snap = Snapshot { steps: 88, fall: FallStatus::FallDetected, ticks: 1 };
        StatusScreen::render(&snap, &DisplaySettings::default(), &mut fb).unwrap();

        // FONT_10X20 fills rows 0..20; the status block must not touch them.
        assert_eq!(STATUS_TOP, LARGE_LINE + 2);
        assert!(!fb.any_lit_in_rows(LARGE_LINE as u32, STATUS_TOP as u32));
        assert!(fb.any_lit_in_rows(STATUS_TOP as u32, STATUS_TOP as u32 + LARGE_LINE as u32));
    }

    #[test]
    fn fall_layout_fills_two_large_lines() {
        let mut fb = FrameBuffer::new();
        let snap = Snapshot { steps: 7, fall: FallStatus::FallDetected, ticks: 1 };
        StatusScreen::render(&snap, &DisplaySettings::default(), &mut fb).unwrap();

        assert!(fb.any_lit_in_rows(42, 64));
    }

    #[test]
    fn render_replaces_previous_frame() {
        let mut fb = FrameBuffer::new();
        let fall = Snapshot { steps: 0, fall: FallStatus::FallDetected, ticks: 1 };
        let calm = Snapshot { steps: 0, fall: FallStatus::Monitoring, ticks: 2 };
        StatusScreen::render(&fall, &DisplaySettings::default(), &mut fb).unwrap();
        StatusScreen::render(&calm, &DisplaySettings::default(), &mut fb).unwrap();
        assert!(!fb.any_lit_in_rows(42, 64));
    }

    #[test]
    fn halted_screen_wraps_long_reasons() {
        let mut fb = FrameBuffer::new();
        BootScreen::halted(&mut fb, "MPU6050 sensor not found on I2C bus").unwrap();
        // Second wrapped row starts at STATUS_TOP + 10.
        assert!(fb.any_lit_in_rows(STATUS_TOP as u32 + 10, STATUS_TOP as u32 + 20));
    }
}
