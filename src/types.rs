// Core types shared by the camera, detector, overlay and session.

/// Index of the index-finger tip in the 21-point hand landmark layout.
pub const INDEX_FINGER_TIP: usize = 8;
/// Index of the middle-finger tip in the 21-point hand landmark layout.
pub const MIDDLE_FINGER_TIP: usize = 12;
pub const HAND_LANDMARK_COUNT: usize = 21;

/// Bones of the hand skeleton as landmark index pairs: thumb, four fingers, palm.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (5, 9), (9, 10), (10, 11), (11, 12),
    (9, 13), (13, 14), (14, 15), (15, 16),
    (13, 17), (17, 18), (18, 19), (19, 20),
    (0, 17),
];

/// How far outside the frame (in frame sizes) a landmark may land before it is pinned.
const LANDMARK_SLACK: f32 = 1.0;

/// Background colour of the overlay. Black pixels add nothing when blended.
pub const BACKGROUND: u32 = 0x00_00_00_00;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// A buffer filled with one colour.
    pub fn filled(width: usize, height: usize, color: u32) -> Self {
        Self { width, height, pixels: vec![color; width * height] }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Colour at (x,y), or None when outside the buffer.
    pub fn get(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Mirror every row in place (selfie view).
    pub fn flip_horizontal(&mut self) {
        if self.width == 0 {
            return;
        }
        for row in self.pixels.chunks_exact_mut(self.width) {
            row.reverse();
        }
    }
}

#[inline]
pub fn rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[inline]
pub fn unpack(px: u32) -> (u8, u8, u8) {
    (((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8)
}

/// Pixel coordinate on the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance; exact for integer pixels.
    pub fn distance_sq(self, other: Point) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        dx * dx + dy * dy
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub const ALL: [Handedness; 2] = [Handedness::Left, Handedness::Right];

    /// Parse the detector's label. Anything else is not a hand we track.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            l if l.eq_ignore_ascii_case("left") => Some(Handedness::Left),
            l if l.eq_ignore_ascii_case("right") => Some(Handedness::Right),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Handedness::Left => "Left",
            Handedness::Right => "Right",
        }
    }
}

/// One landmark in normalized [0,1] image coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    /// Scale to pixels for a frame of the given size (truncates like an int cast).
    /// Values far off-frame are pinned one frame size beyond the edge.
    pub fn to_pixel(&self, width: usize, height: usize) -> Point {
        let pin = |v: f32| v.clamp(-LANDMARK_SLACK, 1.0 + LANDMARK_SLACK);
        Point::new((pin(self.x) * width as f32) as i32, (pin(self.y) * height as f32) as i32)
    }

    /// Within the slack band around the frame.
    pub fn is_plausible(&self) -> bool {
        let ok = |v: f32| (-LANDMARK_SLACK..=1.0 + LANDMARK_SLACK).contains(&v);
        ok(self.x) && ok(self.y)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DetectedHand {
    pub handedness: Handedness,
    pub score: f32,
    pub landmarks: Vec<Landmark>,
}

impl DetectedHand {
    pub fn landmark_px(&self, index: usize, width: usize, height: usize) -> Option<Point> {
        self.landmarks.get(index).map(|lm| lm.to_pixel(width, height))
    }

    /// The two fingertips the gesture rule looks at: (index tip, middle tip).
    pub fn fingertips(&self, width: usize, height: usize) -> (Option<Point>, Option<Point>) {
        (
            self.landmark_px(INDEX_FINGER_TIP, width, height),
            self.landmark_px(MIDDLE_FINGER_TIP, width, height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landmarks_scale_to_pixels() {
        let lm = Landmark { x: 0.5, y: 0.25 };
        assert_eq!(lm.to_pixel(640, 480), Point::new(320, 120));
    }

    #[test]
    fn wild_landmarks_are_pinned_near_the_frame() {
        let far = Landmark { x: 5e6, y: -5e6 };
        assert!(!far.is_plausible());
        assert_eq!(far.to_pixel(640, 480), Point::new(1280, -480));
        assert!(Landmark { x: 1.5, y: -0.5 }.is_plausible());
    }

    #[test]
    fn distance_of_extreme_points_does_not_overflow() {
        let a = Point::new(i32::MAX, i32::MIN);
        let b = Point::new(i32::MIN, i32::MAX);
        let d = (u32::MAX as i64) * (u32::MAX as i64);
        assert_eq!(a.distance_sq(b), 2 * d);
    }

    #[test]
    fn missing_fingertips_are_absent() {
        let hand = DetectedHand {
            handedness: Handedness::Left,
            score: 1.0,
            landmarks: vec![Landmark::default(); 10],
        };
        let (index, middle) = hand.fingertips(100, 100);
        assert_eq!(index, Some(Point::new(0, 0)));
        assert_eq!(middle, None);
    }

    #[test]
    fn handedness_labels() {
        assert_eq!(Handedness::from_label("Left"), Some(Handedness::Left));
        assert_eq!(Handedness::from_label("right"), Some(Handedness::Right));
        assert_eq!(Handedness::from_label("Unknown"), None);
    }

    #[test]
    fn flip_reverses_rows() {
        let mut fb = FrameBuffer { width: 3, height: 2, pixels: vec![1, 2, 3, 4, 5, 6] };
        fb.flip_horizontal();
        assert_eq!(fb.pixels, vec![3, 2, 1, 6, 5, 4]);
    }
}
