// What you SEE:
// • Live camera (mirrored) is always the base image, mixed 50/50 with your drawing.
// • Index finger up on its own: paint. Pinch index + middle together: erase under the index tip.
// • No landmark helper configured? Hold LMB to paint, RMB to erase, with the mouse.
// • C clears the drawing, N picks the next colour, Q or ESC quits.

mod camera;
mod canvas;
mod config;
mod detector;
mod draw;
mod error;
mod gesture;
mod palette;
mod session;
mod types;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use camera::CameraCapture;
use clap::Parser;
use config::{AppConfig, DetectorConfig};
use detector::{HandDetector, PointerDetector, SubprocessDetector, detect_or_none};
use draw::Drawer;
use error::Error;
use session::Session;

#[derive(Parser, Debug)]
#[command(name = "air-sketch", about = "Draw on your webcam feed with your fingertips")]
struct Args {
    /// Config file (defaults to <config dir>/air-sketch/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Camera index
    #[arg(long)]
    camera: Option<u32>,

    /// Requested capture width
    #[arg(long)]
    width: Option<u32>,

    /// Requested capture height
    #[arg(long)]
    height: Option<u32>,

    /// Show the camera unmirrored
    #[arg(long)]
    no_mirror: bool,

    /// Landmark helper program; everything after `--` is passed to it
    #[arg(long)]
    detector: Option<String>,

    #[arg(last = true)]
    detector_args: Vec<String>,
}

impl Args {
    /// Flags win over the config file.
    fn apply(self, config: &mut AppConfig) {
        if let Some(index) = self.camera {
            config.camera.index = index;
        }
        if let Some(width) = self.width {
            config.camera.width = width;
        }
        if let Some(height) = self.height {
            config.camera.height = height;
        }
        if self.no_mirror {
            config.camera.mirror = false;
        }
        if let Some(program) = self.detector {
            let min_confidence = config.detector.as_ref().map_or(0.8, |d| d.min_confidence);
            config.detector = Some(DetectorConfig { program, args: self.detector_args, min_confidence });
        }
    }
}

fn open_detector(config: Option<&DetectorConfig>) -> Result<Box<dyn HandDetector>, Error> {
    match config {
        Some(d) => Ok(Box::new(SubprocessDetector::spawn(&d.program, &d.args, d.min_confidence)?)),
        None => {
            log::info!("no hand detector configured; using the mouse (LMB draw, RMB erase)");
            Ok(Box::new(PointerDetector::new()))
        }
    }
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    /* --- Detector, camera + window setup ---
       Visual: window opens with live camera feed. */
    let mut detector = open_detector(config.detector.as_ref())?;
    let cam_cfg = &config.camera;
    let mut cam = CameraCapture::new(cam_cfg.index, cam_cfg.width, cam_cfg.height, cam_cfg.mirror)?;
    let (w, h) = cam.resolution();
    let mut drawer = Drawer::new("Air Sketch", w as usize, h as usize)?;

    let mut session = Session::new(config.gesture.settings());

    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;

    /* ------------------------------ Main loop ------------------------------ */
    'frames: while drawer.is_open() {
        match cam.next_frame() {
            Ok(frame) => {
                detector.observe_pointer(drawer.pointer());
                let hands = detect_or_none(&mut detector, &frame);
                let rendered = session.process(&frame, &hands)?;
                if let Err(e) = drawer.present(&rendered.image) {
                    log::warn!("{e}");
                }
                frames_this_second += 1;
            }
            Err(e) => {
                // No frame this tick; keep every piece of state as it was.
                log::trace!("skipping frame: {e}");
                drawer.refresh_input();
            }
        }

        for command in drawer.poll_commands() {
            if session.apply(command).is_break() {
                break 'frames;
            }
        }

        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            log::debug!("FPS: {:.1}", frames_this_second as f32 / secs);
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    log::info!("bye");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from([
            "air-sketch", "--camera", "2", "--no-mirror", "--detector", "python3", "--", "hand_detect.py",
        ]);
        let mut config = AppConfig::default();
        args.apply(&mut config);
        assert_eq!(config.camera.index, 2);
        assert!(!config.camera.mirror);
        assert_eq!(config.camera.width, 640);
        let det = config.detector.unwrap();
        assert_eq!(det.program, "python3");
        assert_eq!(det.args, vec!["hand_detect.py".to_string()]);
    }

    #[test]
    fn no_flags_keep_config() {
        let args = Args::parse_from(["air-sketch"]);
        let mut config = AppConfig::default();
        args.apply(&mut config);
        assert_eq!(config, AppConfig::default());
    }
}
