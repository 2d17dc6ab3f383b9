// One error type for the whole app. Every variant states *where* things went wrong.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String), // Creating the window failed
    #[error("Window update error: {0}")]
    WindowUpdate(String), // Updating the window buffer failed
    #[error("Camera init error: {0}")]
    CameraInit(String), // Opening/starting the camera failed
    #[error("Camera frame error: {0}")]
    CameraFrame(String), // Grabbing/decoding a frame failed (recoverable: the loop skips it)
    #[error("Hand detector error: {0}")]
    Detector(String), // Talking to the landmark detector failed
    #[error("Hand detector exited")]
    DetectorExited, // Helper closed its output; no more frames will be answered
    #[error("Config error: {0}")]
    Config(String), // Reading/parsing the config file failed
    #[error("Dimension mismatch: expected {expected:?}, got {got:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
