// The persistent drawing overlay.
// Visual: strokes accumulate here frame after frame; each tick the overlay is
// mixed 50/50 with the live camera so both stay visible.

use crate::draw::{draw_thick_line, fill_disc};
use crate::error::Error;
use crate::types::{BACKGROUND, FrameBuffer, Point, rgb, unpack};

/// The four operations the gesture logic is allowed to perform on an overlay.
pub trait Canvas {
    fn dimensions(&self) -> (usize, usize);

    /// Paint a straight stroke from `from` to `to`.
    fn draw_segment(&mut self, from: Point, to: Point, color: u32, thickness: u32);

    /// Paint background over a filled circle.
    fn erase(&mut self, center: Point, radius: u32);

    /// Blend the live frame with the overlay into a new image. Neither input changes.
    fn composite(&self, frame: &FrameBuffer) -> Result<FrameBuffer, Error>;

    /// Reset every pixel to background.
    fn clear(&mut self);
}

pub struct Overlay {
    buf: FrameBuffer,
}

impl Overlay {
    /// All-background overlay of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self { buf: FrameBuffer::filled(width, height, BACKGROUND) }
    }

    pub fn pixels(&self) -> &FrameBuffer {
        &self.buf
    }

    pub fn is_blank(&self) -> bool {
        self.buf.pixels.iter().all(|&p| p == BACKGROUND)
    }
}

impl Canvas for Overlay {
    fn dimensions(&self) -> (usize, usize) {
        self.buf.dimensions()
    }

    fn draw_segment(&mut self, from: Point, to: Point, color: u32, thickness: u32) {
        draw_thick_line(&mut self.buf, from, to, color, thickness);
    }

    fn erase(&mut self, center: Point, radius: u32) {
        fill_disc(&mut self.buf, center, radius as i32, BACKGROUND);
    }

    fn composite(&self, frame: &FrameBuffer) -> Result<FrameBuffer, Error> {
        if frame.dimensions() != self.buf.dimensions() {
            return Err(Error::DimensionMismatch {
                expected: self.buf.dimensions(),
                got: frame.dimensions(),
            });
        }
        let pixels = frame
            .pixels
            .iter()
            .zip(&self.buf.pixels)
            .map(|(&f, &o)| blend_half(f, o))
            .collect();
        Ok(FrameBuffer { width: frame.width, height: frame.height, pixels })
    }

    fn clear(&mut self) {
        self.buf.pixels.fill(BACKGROUND);
    }
}

/// Equal-weight mix of two pixels, rounding halves up.
#[inline]
pub fn blend_half(a: u32, b: u32) -> u32 {
    let (ar, ag, ab) = unpack(a);
    let (br, bg, bb) = unpack(b);
    let mix = |x: u8, y: u8| ((x as u16 + y as u16 + 1) / 2) as u8;
    rgb(mix(ar, br), mix(ag, bg), mix(ab, bb))
}
