// Stroke colours. `N` steps through them; the swatch in the top-left corner
// shows which one is active.

pub const RED: u32 = 0x00_FF_00_00;
pub const GREEN: u32 = 0x00_00_FF_00;
pub const PINK: u32 = 0x00_FF_B6_C1;

pub const DEFAULT_COLORS: [u32; 3] = [RED, GREEN, PINK];

/// A fixed colour list plus the selected index. Advancing returns a new value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: &'static [u32],
    index: usize,
}

impl Palette {
    /// Panics on an empty list; palettes are compile-time constants.
    pub const fn new(colors: &'static [u32]) -> Self {
        assert!(!colors.is_empty());
        Self { colors, index: 0 }
    }

    pub fn current(&self) -> u32 {
        self.colors[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self { index: (self.index + 1) % self.colors.len(), ..self }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(&DEFAULT_COLORS)
    }
}
