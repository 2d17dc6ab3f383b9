// Window + software drawing utilities.
// Visual effects provided here:
// 1) A window that shows the composited camera image.
// 2) Filled discs and thick lines used by the overlay strokes and eraser.
// 3) Crosshairs on tracked fingertips and a tiny 5x7 bitmap font for the HUD.

use crate::error::Error;
use crate::session::Command;
use crate::types::{FrameBuffer, Point};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

/// Snapshot of the mouse for this tick, in window pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    pub pos: Option<(f32, f32)>,
    pub left: bool,
    pub right: bool,
}

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Create a window sized to the camera feed.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    /// Visual: the window immediately displays the new image.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Pump window events without drawing (used when a camera frame was skipped),
    /// so key presses still arrive.
    pub fn refresh_input(&mut self) {
        self.window.update();
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn pointer(&self) -> PointerState {
        PointerState {
            pos: self.window.get_mouse_pos(MouseMode::Discard),
            left: self.window.get_mouse_down(MouseButton::Left),
            right: self.window.get_mouse_down(MouseButton::Right),
        }
    }

    /// Commands pressed since the last update. Unbound keys are ignored.
    pub fn poll_commands(&self) -> Vec<Command> {
        let mut out = Vec::new();
        if self.pressed_once(Key::C) {
            out.push(Command::Clear);
        }
        if self.pressed_once(Key::N) {
            out.push(Command::NextColor);
        }
        if self.pressed_once(Key::Q) || self.window.is_key_down(Key::Escape) {
            out.push(Command::Quit);
        }
        out
    }

    fn pressed_once(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }
}

/* ---------- Software drawing: pixels, discs, lines, crosshair, tiny bitmap font ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
pub fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Walk a Bresenham line from a to b, calling `plot` for each pixel (endpoints included).
fn bresenham(a: Point, b: Point, mut plot: impl FnMut(i32, i32)) {
    let (mut x0, mut y0) = (a.x, a.y);
    // i64 so endpoints at opposite ends of the i32 range cannot overflow.
    let dx = (b.x as i64 - x0 as i64).abs();
    let sx = if x0 < b.x { 1 } else { -1 };
    let dy = -(b.y as i64 - y0 as i64).abs();
    let sy = if y0 < b.y { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        plot(x0, y0);
        if x0 == b.x && y0 == b.y { break; }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x0 += sx; }
        if e2 <= dx { err += dx; y0 += sy; }
    }
}

/// Draw a thin 1-pixel line between a and b.
pub fn draw_line(fb: &mut FrameBuffer, a: Point, b: Point, color: u32) {
    bresenham(a, b, |x, y| put_pixel(fb, x, y, color));
}

/// Solid disc of `radius` pixels; radius 0 is a single pixel. Clipped to the buffer.
pub fn fill_disc(fb: &mut FrameBuffer, c: Point, radius: i32, color: u32) {
    let r = radius.max(0);
    let r2 = (r as i64) * (r as i64);
    let y_lo = c.y.saturating_sub(r).max(0);
    let y_hi = c.y.saturating_add(r).min(fb.height as i32 - 1);
    let x_lo = c.x.saturating_sub(r).max(0);
    let x_hi = c.x.saturating_add(r).min(fb.width as i32 - 1);
    for y in y_lo..=y_hi {
        for x in x_lo..=x_hi {
            if Point::new(x, y).distance_sq(c) <= r2 {
                fb.pixels[y as usize * fb.width + x as usize] = color;
            }
        }
    }
}

/// Line with round caps: a disc of `thickness / 2` stamped at every Bresenham step.
pub fn draw_thick_line(fb: &mut FrameBuffer, a: Point, b: Point, color: u32, thickness: u32) {
    let radius = (thickness / 2) as i32;
    if radius == 0 {
        draw_line(fb, a, b, color);
        return;
    }
    bresenham(a, b, |x, y| fill_disc(fb, Point::new(x, y), radius, color));
}

/// Axis-aligned filled rectangle with top-left (x,y).
pub fn fill_rect(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, color: u32) {
    for yy in y..y + h {
        for xx in x..x + w {
            put_pixel(fb, xx, yy, color);
        }
    }
}

/// Draw a small crosshair centered at c.
/// Visual: a “+” shape (with a tiny gap at the center) marks a fingertip.
pub fn draw_crosshair(fb: &mut FrameBuffer, c: Point, size: i32, color: u32) {
    let (cx, cy) = (c.x, c.y);
    draw_line(fb, Point::new(cx - size, cy), Point::new(cx - 2, cy), color);
    draw_line(fb, Point::new(cx + 2, cy), Point::new(cx + size, cy), color);
    draw_line(fb, Point::new(cx, cy - size), Point::new(cx, cy - 2), color);
    draw_line(fb, Point::new(cx, cy + 2), Point::new(cx, cy + size), color);
    put_pixel(fb, cx, cy, color);
}

/* ---------- 5x7 bitmap font (ASCII subset the HUD needs) ---------- */

/// Return a 5x7 glyph bitmap for a limited character set.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch {
        // Digits 0..9
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        // Uppercase letters used by the HUD
        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'N' => g!(0b10001,0b11001,0b10101,0b10011,0b10001,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),

        // Punctuation: space, colon, percent
        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '%' => g!(0b11001,0b11010,0b00010,0b00100,0b01000,0b01011,0b10011),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y), with a 1-pixel black shadow for contrast.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    if let Some(rows) = glyph5x7(ch.to_ascii_uppercase()) {
        for (shift, c) in [(1, 0x00000000), (0, color)] {
            for (ry, rowbits) in rows.iter().enumerate() {
                for rx in 0..5 {
                    if (rowbits & (1 << (4 - rx))) != 0 {
                        put_pixel(fb, x + rx as i32 + shift, y + ry as i32 + shift, c);
                    }
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs; each glyph advances 6 pixels.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6; // 5 pixels glyph width + 1 pixel spacing
    }
}
