// StrideWatch: SSD1306 OLED Driver
//
// Owns a `FrameBuffer`; screens are drawn into it and pushed page by page
// over the shared I2C bus.

use core::convert::Infallible;

use stridewatch::config::*;
use stridewatch::ui::FrameBuffer;

use super::{lock, SharedBus};

const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;
const PAGES: usize = SCREEN_HEIGHT as usize / 8;

// 128x64, internal charge pump, horizontal addressing.
const INIT_SEQUENCE: &[u8] = &[
    0xAE,       // display off
    0xD5, 0x80, // clock divide
    0xA8, 0x3F, // multiplex 64
    0xD3, 0x00, // display offset
    0x40,       // start line 0
    0x8D, 0x14, // charge pump on
    0x20, 0x00, // horizontal addressing
    0xA1,       // segment remap
    0xC8,       // COM scan descending
    0xDA, 0x12, // COM pins
    0x81, 0xCF, // contrast
    0xD9, 0xF1, // pre-charge
    0xDB, 0x40, // VCOMH
    0xA4,       // follow RAM
    0xA6,       // normal (not inverted)
    0xAF,       // display on
];

pub struct OledDisplay {
    bus: SharedBus,
    frame: FrameBuffer,
}

impl OledDisplay {
    pub fn new(bus: SharedBus) -> Self {
        Self { bus, frame: FrameBuffer::new() }
    }

    /// The SSD1306 has no ID register; an ACK on its address counts as present.
    pub fn is_connected(&self) -> bool {
        let Ok(mut bus) = lock(self.bus) else {
            return false;
        };
        bus.write(I2C_ADDR_OLED, &[CONTROL_COMMAND, 0xE3], I2C_TIMEOUT_TICKS).is_ok()
    }

    pub fn init(&mut self) -> anyhow::Result<()> {
        self.command(INIT_SEQUENCE)?;
        self.frame.clear_all();
        self.flush()?;
        log::info!("SSD1306 initialised ({}x{})", SCREEN_WIDTH, SCREEN_HEIGHT);
        Ok(())
    }

    /// Draw a screen into the frame buffer and push it to the panel.
    pub fn show<F>(&mut self, draw: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut FrameBuffer) -> Result<(), Infallible>,
    {
        // Drawing into RAM cannot fail.
        let _ = draw(&mut self.frame);
        self.flush()
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        self.command(&[0x21, 0, (SCREEN_WIDTH - 1) as u8, 0x22, 0, (PAGES - 1) as u8])?;

        let mut bus = lock(self.bus)?;
        let mut packet = [0u8; SCREEN_WIDTH as usize + 1];
        packet[0] = CONTROL_DATA;
        for page in self.frame.as_bytes().chunks(SCREEN_WIDTH as usize) {
            packet[1..].copy_from_slice(page);
            bus.write(I2C_ADDR_OLED, &packet, I2C_TIMEOUT_TICKS)?;
        }
        Ok(())
    }

    fn command(&self, bytes: &[u8]) -> anyhow::Result<()> {
        let mut bus = lock(self.bus)?;
        let mut packet = Vec::with_capacity(bytes.len() + 1);
        packet.push(CONTROL_COMMAND);
        packet.extend_from_slice(bytes);
        bus.write(I2C_ADDR_OLED, &packet, I2C_TIMEOUT_TICKS)?;
        Ok(())
    }
}
