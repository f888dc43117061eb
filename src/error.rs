use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Landmark index {index} out of range for a {len}-point face")]
    LandmarkOutOfRange { index: usize, len: usize },

    #[error("Detector error: {0}")]
    Detector(String),

    #[error("Camera error: {0}")]
    Camera(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Pipeline is already streaming")]
    AlreadyStreaming,

    #[error("Pipeline has not been started")]
    NotStreaming,
}

pub type Result<T> = std::result::Result<T, Error>;
