// One drawing session: the overlay, per-hand stroke state and the palette,
// advanced once per camera frame.
// Visual: everything you see on top of the camera comes out of `process`.

use std::ops::ControlFlow;

use crate::canvas::{Canvas, Overlay};
use crate::draw::{draw_crosshair, draw_line, draw_text_5x7, fill_disc, fill_rect};
use crate::error::Error;
use crate::gesture::{GestureSettings, HandReport, HandTracker};
use crate::palette::Palette;
use crate::types::{DetectedHand, FrameBuffer, HAND_CONNECTIONS};

const HUD_TEXT: u32 = 0x00_FF_FF_FF;
const CROSSHAIR: u32 = 0x00_FF_CC_33;
const BONE: u32 = 0x00_33_CC_FF;
const JOINT: u32 = 0x00_FF_33_66;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Clear,
    NextColor,
    Quit,
}

pub struct Rendered {
    pub image: FrameBuffer,
    pub hands: Vec<HandReport>,
}

pub struct Session {
    overlay: Option<Overlay>,
    tracker: HandTracker,
    palette: Palette,
}

impl Session {
    pub fn new(settings: GestureSettings) -> Self {
        Self { overlay: None, tracker: HandTracker::new(settings), palette: Palette::default() }
    }

    /// None until the first frame arrives.
    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// Apply this frame's hands and build the image to show.
    /// A frame of a new size starts a fresh, empty overlay.
    pub fn process(&mut self, frame: &FrameBuffer, hands: &[DetectedHand]) -> Result<Rendered, Error> {
        let overlay = overlay_for(&mut self.overlay, &mut self.tracker, frame.dimensions());
        let reports = self.tracker.update(hands, overlay, self.palette.current());
        let mut image = overlay.composite(frame)?;
        draw_skeletons(&mut image, hands);
        draw_hud(&mut image, self.palette.current(), &reports);
        Ok(Rendered { image, hands: reports })
    }

    /// Handle one user command. `Break` means quit.
    pub fn apply(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::Clear => {
                if let Some(overlay) = self.overlay.as_mut() {
                    overlay.clear();
                    log::debug!("overlay cleared");
                }
            }
            Command::NextColor => {
                self.palette = self.palette.next();
                log::debug!("palette colour {:06X}", self.palette.current());
            }
            Command::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }
}

/// The overlay sized for `dims`, replacing one of any other size.
fn overlay_for<'a>(
    slot: &'a mut Option<Overlay>,
    tracker: &mut HandTracker,
    dims: (usize, usize),
) -> &'a mut Overlay {
    if let Some(old) = slot.as_ref().filter(|o| o.dimensions() != dims) {
        log::info!("frame size changed {:?} -> {:?}, overlay reset", old.dimensions(), dims);
        *slot = None;
    }
    if slot.is_none() {
        // Old positions belong to the old resolution.
        tracker.reset();
    }
    slot.get_or_insert_with(|| Overlay::new(dims.0, dims.1))
}

/// Landmark bones and joints of every detected hand, under the rest of the HUD.
/// Visual: a stick-figure hand tracks each real one.
fn draw_skeletons(image: &mut FrameBuffer, hands: &[DetectedHand]) {
    let (w, h) = image.dimensions();
    for hand in hands {
        for &(a, b) in &HAND_CONNECTIONS {
            // Short landmark lists just lose the bones they cannot reach.
            if let (Some(pa), Some(pb)) = (hand.landmark_px(a, w, h), hand.landmark_px(b, w, h)) {
                draw_line(image, pa, pb, BONE);
            }
        }
        for lm in &hand.landmarks {
            fill_disc(image, lm.to_pixel(w, h), 2, JOINT);
        }
    }
}

/// Colour swatch top-left, per-hand mode bottom-left, crosshair on each index tip.
fn draw_hud(image: &mut FrameBuffer, color: u32, hands: &[HandReport]) {
    fill_rect(image, 10, 10, 50, 50, color);
    draw_text_5x7(image, 10, 66, "COLOR", HUD_TEXT);

    let mut y = image.height as i32 - 12;
    for report in hands.iter().rev() {
        if let Some(tip) = report.primary {
            draw_crosshair(image, tip, 10, CROSSHAIR);
        }
        if let Some(mode) = report.mode {
            let pct = (report.score.clamp(0.0, 1.0) * 100.0).round() as u32;
            let line = format!("{}: {} {pct}%", report.handedness.label(), mode.label());
            draw_text_5x7(image, 10, y, &line, HUD_TEXT);
            y -= 10;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::blend_half;
    use crate::detector::{HandDetector, detect_or_none};
    use crate::types::{BACKGROUND, Handedness, Landmark, MIDDLE_FINGER_TIP};

    const W: usize = 400;
    const H: usize = 300;

    fn frame(w: usize, h: usize) -> FrameBuffer {
        FrameBuffer::filled(w, h, 0x00_20_40_60)
    }

    fn hand_at(label: Handedness, w: usize, h: usize, index: (i32, i32), pinch: bool) -> DetectedHand {
        let norm = |p: (i32, i32)| Landmark {
            x: (p.0 as f32 + 0.5) / w as f32,
            y: (p.1 as f32 + 0.5) / h as f32,
        };
        let middle = if pinch { (index.0 + 3, index.1) } else { (index.0 + 100, index.1 + 100) };
        let mut landmarks = vec![norm(index); 21];
        landmarks[MIDDLE_FINGER_TIP] = norm(middle);
        DetectedHand { handedness: label, score: 1.0, landmarks }
    }

    fn draw(at: (i32, i32)) -> DetectedHand {
        hand_at(Handedness::Right, W, H, at, false)
    }

    fn overlay_px(s: &Session, x: i32, y: i32) -> u32 {
        s.overlay().unwrap().pixels().get(x, y).unwrap()
    }

    #[test]
    fn first_frame_leaves_overlay_blank_second_draws_segment() {
        let mut s = Session::new(GestureSettings::default());
        s.process(&frame(W, H), &[draw((100, 100))]).unwrap();
        assert!(s.overlay().unwrap().is_blank());

        s.process(&frame(W, H), &[draw((120, 100))]).unwrap();
        let color = s.palette().current();
        for x in 100..=120 {
            assert_eq!(overlay_px(&s, x, 100), color);
        }
        assert_eq!(overlay_px(&s, 130, 100), BACKGROUND);
    }

    #[test]
    fn erase_frame_prevents_bridging_segment() {
        let mut s = Session::new(GestureSettings { eraser_radius: 3, ..Default::default() });
        s.process(&frame(W, H), &[draw((50, 50))]).unwrap();
        s.process(&frame(W, H), &[draw((60, 60))]).unwrap();
        s.process(&frame(W, H), &[hand_at(Handedness::Right, W, H, (200, 200), true)]).unwrap();
        s.process(&frame(W, H), &[draw((70, 70))]).unwrap();

        // midpoint of (60,60)-(70,70) stays untouched
        assert_eq!(overlay_px(&s, 65, 65), BACKGROUND);
        assert_ne!(overlay_px(&s, 55, 55), BACKGROUND);

        s.process(&frame(W, H), &[draw((80, 70))]).unwrap();
        assert_ne!(overlay_px(&s, 75, 70), BACKGROUND);
    }

    #[test]
    fn clear_command_blanks_overlay() {
        let mut s = Session::new(GestureSettings::default());
        s.process(&frame(W, H), &[draw((10, 10))]).unwrap();
        s.process(&frame(W, H), &[draw((300, 200))]).unwrap();
        assert!(!s.overlay().unwrap().is_blank());

        assert_eq!(s.apply(Command::Clear), ControlFlow::Continue(()));
        assert!(s.overlay().unwrap().is_blank());

        let live = frame(W, H);
        let out = s.overlay().unwrap().composite(&live).unwrap();
        assert!(out.pixels.iter().all(|&p| p == blend_half(0x00_20_40_60, BACKGROUND)));
    }

    #[test]
    fn clear_before_first_frame_is_harmless() {
        let mut s = Session::new(GestureSettings::default());
        assert_eq!(s.apply(Command::Clear), ControlFlow::Continue(()));
        assert!(s.overlay().is_none());
    }

    #[test]
    fn resolution_change_discards_strokes() {
        let mut s = Session::new(GestureSettings::default());
        s.process(&frame(W, H), &[draw((100, 100))]).unwrap();
        s.process(&frame(W, H), &[draw((150, 100))]).unwrap();
        assert!(!s.overlay().unwrap().is_blank());

        let small = frame(200, 150);
        let out = s.process(&small, &[]).unwrap();
        let overlay = s.overlay().unwrap();
        assert_eq!(overlay.dimensions(), (200, 150));
        assert!(overlay.is_blank());
        assert_eq!(out.image.dimensions(), (200, 150));
        assert_eq!(out.image.get(120, 100), Some(blend_half(0x00_20_40_60, BACKGROUND)));
    }

    #[test]
    fn resolution_change_forgets_previous_positions() {
        let mut s = Session::new(GestureSettings::default());
        s.process(&frame(W, H), &[draw((10, 10))]).unwrap();
        s.process(&frame(200, 150), &[hand_at(Handedness::Right, 200, 150, (150, 100), false)])
            .unwrap();
        assert!(s.overlay().unwrap().is_blank());
    }

    #[test]
    fn one_hand_erasing_keeps_other_hand_stroke() {
        let mut s = Session::new(GestureSettings::default());
        let left_draw = |p| hand_at(Handedness::Left, W, H, p, false);
        let left_pinch = |p| hand_at(Handedness::Left, W, H, p, true);
        s.process(&frame(W, H), &[left_draw((20, 250)), draw((200, 50))]).unwrap();
        let out = s
            .process(&frame(W, H), &[left_pinch((20, 250)), draw((240, 50))])
            .unwrap();
        assert_eq!(out.hands.len(), 2);
        assert_ne!(overlay_px(&s, 220, 50), BACKGROUND);
    }

    #[test]
    fn next_color_changes_stroke_color() {
        let mut s = Session::new(GestureSettings::default());
        let first = s.palette().current();
        s.apply(Command::NextColor);
        let second = s.palette().current();
        assert_ne!(first, second);

        s.process(&frame(W, H), &[draw((100, 200))]).unwrap();
        s.process(&frame(W, H), &[draw((140, 200))]).unwrap();
        assert_eq!(overlay_px(&s, 120, 200), second);
    }

    #[test]
    fn quit_breaks() {
        let mut s = Session::new(GestureSettings::default());
        assert_eq!(s.apply(Command::Quit), ControlFlow::Break(()));
    }

    #[test]
    fn hud_marks_fingertip_and_swatch() {
        let mut s = Session::new(GestureSettings::default());
        let out = s.process(&frame(W, H), &[draw((200, 150))]).unwrap();
        assert_eq!(out.image.get(20, 20), Some(s.palette().current()));
        assert_eq!(out.image.get(200, 150), Some(CROSSHAIR));
        assert_eq!(out.image.get(200, 150 - 5), Some(CROSSHAIR));
    }

    #[test]
    fn hud_draws_hand_skeleton() {
        let mut s = Session::new(GestureSettings::default());
        let mut hand = draw((200, 150));
        // wrist far below the tips; bone 0-1 runs straight down the column
        let wrist = Landmark { x: 100.5 / W as f32, y: 280.5 / H as f32 };
        hand.landmarks[0] = wrist;
        hand.landmarks[1] = Landmark { x: wrist.x, y: 200.5 / H as f32 };
        let out = s.process(&frame(W, H), &[hand]).unwrap();
        assert_eq!(out.image.get(100, 240), Some(BONE));
        assert_eq!(out.image.get(100, 280), Some(JOINT));
    }

    #[test]
    fn skeleton_skips_bones_past_a_short_landmark_list() {
        let mut s = Session::new(GestureSettings::default());
        let mut hand = draw((200, 150));
        hand.landmarks.truncate(5);
        let out = s.process(&frame(W, H), &[hand]).unwrap();
        assert!(out.hands[0].mode.is_none());
        assert_eq!(out.image.get(200, 150), Some(JOINT));
    }

    struct Broken;

    impl HandDetector for Broken {
        fn detect(&mut self, _frame: &FrameBuffer) -> Result<Vec<DetectedHand>, Error> {
            Err(Error::Detector("bad response \"{\"".into()))
        }
    }

    #[test]
    fn detector_failure_keeps_the_drawing() {
        let mut s = Session::new(GestureSettings::default());
        s.process(&frame(W, H), &[draw((100, 100))]).unwrap();
        s.process(&frame(W, H), &[draw((140, 100))]).unwrap();

        let mut det: Box<dyn HandDetector> = Box::new(Broken);
        let hands = detect_or_none(&mut det, &frame(W, H));
        let out = s.process(&frame(W, H), &hands).unwrap();
        assert!(out.hands.is_empty());
        assert_eq!(overlay_px(&s, 120, 100), s.palette().current());
    }

    #[test]
    fn off_frame_fingertip_is_harmless() {
        let mut s = Session::new(GestureSettings::default());
        s.process(&frame(W, H), &[draw((100, 100))]).unwrap();
        let mut wild = draw((100, 100));
        wild.landmarks.iter_mut().for_each(|lm| *lm = Landmark { x: 5e6, y: -5e6 });
        let out = s.process(&frame(W, H), &[wild]).unwrap();
        assert_eq!(out.image.dimensions(), (W, H));
    }
}
