// Per-hand draw/erase decisions.
// Visual: index finger alone paints; pinch index + middle together and the
// spot under the index tip is wiped instead.

use crate::canvas::Canvas;
use crate::palette::{GREEN, PINK};
use crate::types::{DetectedHand, Handedness, Point};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureMode {
    Draw,
    Erase,
}

impl GestureMode {
    pub fn label(&self) -> &'static str {
        match self {
            GestureMode::Draw => "drawing",
            GestureMode::Erase => "erasing",
        }
    }
}

/// Which colour a hand's strokes use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeColors {
    /// Every hand paints with the palette's current colour.
    #[default]
    Palette,
    /// Left hand green, right hand pink, palette ignored.
    ByHand,
}

impl StrokeColors {
    fn color_for(self, hand: Handedness, palette_color: u32) -> u32 {
        match (self, hand) {
            (StrokeColors::Palette, _) => palette_color,
            (StrokeColors::ByHand, Handedness::Left) => GREEN,
            (StrokeColors::ByHand, Handedness::Right) => PINK,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GestureSettings {
    /// Fingertips closer than this (pixels) means erase.
    pub threshold: u32,
    pub eraser_radius: u32,
    pub thickness: u32,
    pub colors: StrokeColors,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self { threshold: 40, eraser_radius: 30, thickness: 5, colors: StrokeColors::Palette }
    }
}

/// Erase when the fingertips are strictly closer than `threshold`.
pub fn classify(primary: Point, secondary: Point, threshold: u32) -> GestureMode {
    let t = threshold as i64;
    if primary.distance_sq(secondary) < t * t {
        GestureMode::Erase
    } else {
        GestureMode::Draw
    }
}

/// Last drawn fingertip per hand. `Some` only while that hand kept drawing
/// through the previous frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Continuity {
    left: Option<Point>,
    right: Option<Point>,
}

impl Continuity {
    pub fn get(&self, hand: Handedness) -> Option<Point> {
        match hand {
            Handedness::Left => self.left,
            Handedness::Right => self.right,
        }
    }

    fn slot(&mut self, hand: Handedness) -> &mut Option<Point> {
        match hand {
            Handedness::Left => &mut self.left,
            Handedness::Right => &mut self.right,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// What one hand did this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandReport {
    pub handedness: Handedness,
    /// Detector confidence, 0..=1.
    pub score: f32,
    /// None when a required fingertip was missing.
    pub mode: Option<GestureMode>,
    pub primary: Option<Point>,
    pub secondary: Option<Point>,
}

pub struct HandTracker {
    settings: GestureSettings,
    continuity: Continuity,
}

impl HandTracker {
    pub fn new(settings: GestureSettings) -> Self {
        Self { settings, continuity: Continuity::default() }
    }

    pub fn continuity(&self) -> &Continuity {
        &self.continuity
    }

    /// Forget every hand's previous position.
    pub fn reset(&mut self) {
        self.continuity.reset();
    }

    /// Apply this frame's hands to the canvas. Left is handled before Right;
    /// a second hand with an already-seen label is ignored. Hands that are not
    /// in this frame lose their continuity.
    pub fn update<C: Canvas + ?Sized>(
        &mut self,
        hands: &[DetectedHand],
        canvas: &mut C,
        palette_color: u32,
    ) -> Vec<HandReport> {
        let (width, height) = canvas.dimensions();
        let mut reports = Vec::with_capacity(2);

        for label in Handedness::ALL {
            let Some(hand) = hands.iter().find(|h| h.handedness == label) else {
                *self.continuity.slot(label) = None;
                continue;
            };
            let (primary, secondary) = hand.fingertips(width, height);
            let color = self.settings.colors.color_for(label, palette_color);
            let mode = match (primary, secondary) {
                (Some(p), Some(s)) => Some(self.apply(label, p, s, canvas, color)),
                _ => {
                    *self.continuity.slot(label) = None;
                    None
                }
            };
            reports.push(HandReport { handedness: label, score: hand.score, mode, primary, secondary });
        }

        reports
    }

    fn apply<C: Canvas + ?Sized>(
        &mut self,
        hand: Handedness,
        primary: Point,
        secondary: Point,
        canvas: &mut C,
        color: u32,
    ) -> GestureMode {
        let mode = classify(primary, secondary, self.settings.threshold);
        let prev = self.continuity.slot(hand);
        match mode {
            GestureMode::Erase => {
                canvas.erase(primary, self.settings.eraser_radius);
                *prev = None;
            }
            GestureMode::Draw => {
                if let Some(from) = *prev {
                    canvas.draw_segment(from, primary, color, self.settings.thickness);
                }
                *prev = Some(primary);
            }
        }
        mode
    }
}
