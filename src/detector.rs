// Hand landmark sources.
//
// Visual:
//   camera frame -> helper process (stdin) -> one JSON line (stdout) -> hands
//   mouse        -> PointerDetector                                  -> one hand
//
// Protocol, per frame: `width`, `height`, `channels` (3) as little-endian u32,
// then `width * height * 3` RGB bytes. The helper answers with one line:
//   {"hands":[{"handedness":"Left","score":0.93,"landmarks":[{"x":0.1,"y":0.2}, ...]}]}
// plus an optional "error" string. Before the first frame it prints `READY`.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::Deserialize;

use crate::draw::PointerState;
use crate::error::Error;
use crate::types::{
    DetectedHand, FrameBuffer, HAND_LANDMARK_COUNT, Handedness, Landmark, MIDDLE_FINGER_TIP,
    unpack,
};

pub trait HandDetector {
    /// Hands visible in `frame`. An empty list is normal, not an error.
    fn detect(&mut self, frame: &FrameBuffer) -> Result<Vec<DetectedHand>, Error>;

    /// Mouse state for this tick. Only pointer-driven detectors care.
    fn observe_pointer(&mut self, _pointer: PointerState) {}
}

#[derive(Deserialize, Debug)]
struct LandmarkJson {
    x: f32,
    y: f32,
}

impl LandmarkJson {
    fn is_plausible(&self) -> bool {
        Landmark { x: self.x, y: self.y }.is_plausible()
    }
}

#[derive(Deserialize, Debug)]
struct HandJson {
    handedness: String,
    #[serde(default = "full_score")]
    score: f32,
    landmarks: Vec<LandmarkJson>,
}

fn full_score() -> f32 {
    1.0
}

#[derive(Deserialize, Debug)]
struct DetectionResult {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Turn one response line into hands, dropping low-confidence or unlabeled ones.
fn parse_response(line: &str, min_confidence: f32) -> Result<Vec<DetectedHand>, Error> {
    let result: DetectionResult = serde_json::from_str(line.trim())
        .map_err(|e| Error::Detector(format!("bad response {line:?}: {e}")))?;

    if let Some(err) = result.error {
        log::warn!("hand detector reported: {err}");
        return Ok(Vec::new());
    }

    let mut hands = Vec::with_capacity(result.hands.len());
    for hand in result.hands {
        if hand.score < min_confidence {
            continue;
        }
        let Some(handedness) = Handedness::from_label(&hand.handedness) else {
            log::warn!("ignoring hand with label {:?}", hand.handedness);
            continue;
        };
        if let Some(lm) = hand.landmarks.iter().find(|lm| !lm.is_plausible()) {
            log::warn!("{handedness:?} hand landmark far off-frame: ({}, {})", lm.x, lm.y);
        }
        if hand.landmarks.len() != HAND_LANDMARK_COUNT {
            log::warn!(
                "expected {HAND_LANDMARK_COUNT} landmarks, got {}",
                hand.landmarks.len()
            );
        }
        hands.push(DetectedHand {
            handedness,
            score: hand.score,
            landmarks: hand
                .landmarks
                .into_iter()
                .map(|lm| Landmark { x: lm.x, y: lm.y })
                .collect(),
        });
    }
    Ok(hands)
}

/// Runs an external landmark helper and exchanges frames over its stdin/stdout.
pub struct SubprocessDetector {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    min_confidence: f32,
    scratch: Vec<u8>,
}

impl SubprocessDetector {
    pub fn spawn(program: &str, args: &[String], min_confidence: f32) -> Result<Self, Error> {
        log::info!("starting hand detector: {program} {}", args.join(" "));

        let mut process = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| Error::Detector(format!("spawn {program}: {e}")))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| Error::Detector("no stdin on detector process".into()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| Error::Detector("no stdout on detector process".into()))?;
        let mut stdout = BufReader::new(stdout);

        let mut ready = String::new();
        let handshake = match stdout.read_line(&mut ready) {
            Ok(_) if ready.trim() == "READY" => Ok(()),
            Ok(_) => Err(Error::Detector(format!("expected READY, got {:?}", ready.trim()))),
            Err(e) => Err(Error::Detector(format!("waiting for READY: {e}"))),
        };
        if let Err(e) = handshake {
            let _ = process.kill();
            let _ = process.wait();
            return Err(e);
        }
        log::info!("hand detector ready");

        Ok(Self {
            process,
            stdin,
            stdout,
            min_confidence: min_confidence.clamp(0.0, 1.0),
            scratch: Vec::new(),
        })
    }
}

/// 12-byte header + packed RGB for one frame.
fn encode_frame(frame: &FrameBuffer, out: &mut Vec<u8>) {
    out.clear();
    out.reserve(12 + frame.pixels.len() * 3);
    out.extend_from_slice(&(frame.width as u32).to_le_bytes());
    out.extend_from_slice(&(frame.height as u32).to_le_bytes());
    out.extend_from_slice(&3u32.to_le_bytes());
    for &px in &frame.pixels {
        let (r, g, b) = unpack(px);
        out.extend_from_slice(&[r, g, b]);
    }
}

impl HandDetector for SubprocessDetector {
    fn detect(&mut self, frame: &FrameBuffer) -> Result<Vec<DetectedHand>, Error> {
        encode_frame(frame, &mut self.scratch);
        self.stdin.write_all(&self.scratch)?;
        self.stdin.flush()?;

        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(Error::DetectorExited);
        }
        parse_response(&line, self.min_confidence)
    }
}

impl Drop for SubprocessDetector {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

/// One detection pass that never ends the program.
///
/// A bad response or a broken pipe costs this frame its hands. A helper that
/// has exited is replaced by the mouse stand-in so the session keeps going.
pub fn detect_or_none(
    detector: &mut Box<dyn HandDetector>,
    frame: &FrameBuffer,
) -> Vec<DetectedHand> {
    match detector.detect(frame) {
        Ok(hands) => hands,
        Err(Error::DetectorExited) => {
            log::error!("hand detector exited, falling back to mouse input");
            *detector = Box::new(PointerDetector::new());
            Vec::new()
        }
        Err(e) => {
            log::warn!("hand detection failed, skipping frame: {e}");
            Vec::new()
        }
    }
}

/// Mouse stand-in for a real hand.
/// Hold LMB: a right hand draws at the cursor. Hold RMB: the same hand pinches (erase).
pub struct PointerDetector {
    pointer: PointerState,
}

/// How far apart the fake fingertips sit while drawing, in pixels.
const POINTER_FINGER_SPREAD: f32 = 120.0;

impl PointerDetector {
    pub fn new() -> Self {
        Self { pointer: PointerState::default() }
    }
}

impl HandDetector for PointerDetector {
    fn detect(&mut self, frame: &FrameBuffer) -> Result<Vec<DetectedHand>, Error> {
        let PointerState { pos: Some((mx, my)), left, right } = self.pointer else {
            return Ok(Vec::new());
        };
        if (!left && !right) || frame.width == 0 || frame.height == 0 {
            return Ok(Vec::new());
        }

        let (w, h) = (frame.width as f32, frame.height as f32);
        let index = Landmark { x: mx / w, y: my / h };
        let middle = if right {
            index
        } else {
            Landmark { x: (mx + POINTER_FINGER_SPREAD) / w, y: my / h }
        };

        // Whole skeleton collapses onto the cursor; only the middle tip moves.
        let mut landmarks = vec![index; HAND_LANDMARK_COUNT];
        landmarks[MIDDLE_FINGER_TIP] = middle;
        Ok(vec![DetectedHand { handedness: Handedness::Right, score: 1.0, landmarks }])
    }

    fn observe_pointer(&mut self, pointer: PointerState) {
        self.pointer = pointer;
    }
}
