use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, QuizError>;

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("OpenCV error: {source}")]
    OpenCv {
        #[from]
        source: opencv::Error,
    },
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    #[error("a hand needs exactly 21 landmarks, got {0}")]
    LandmarkCount(usize),
    #[error("answers must be between 1 and 5, got {0}")]
    InvalidAnswer(u8),
    #[error("could not read question catalogue {path:?}: {reason}")]
    Catalogue { path: PathBuf, reason: String },
    #[error("could not open camera {0}")]
    CameraOpen(i32),
    #[error("could not read a frame from the camera")]
    CameraRead,
    #[error("hand detector failed to start: {0}")]
    DetectorStartup(String),
    #[error("hand detector exited")]
    DetectorExited,
}
