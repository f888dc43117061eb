//! Frame acquisition.
//!
//! A [`FrameSource`] stands in for the camera driver: the pipeline pulls one
//! frame at a time and does not ask for the next until the previous frame has
//! been through the detector.

use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp"];

/// One captured video frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Position of the frame in the stream, starting at 0.
    pub index: u64,
    pub image: RgbaImage,
}

impl Frame {
    pub fn new(index: u64, image: RgbaImage) -> Self {
        Self { index, image }
    }

    /// Native resolution of the frame.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Capture settings requested from the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureOptions {
    /// Requested frame width; 0 keeps the source resolution.
    pub width: u32,
    /// Requested frame height; 0 keeps the source resolution.
    pub height: u32,
    pub frame_rate: u32,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            frame_rate: 30,
        }
    }
}

impl CaptureOptions {
    /// Time between frames; `None` when pacing is disabled (`frame_rate == 0`).
    pub fn frame_interval(&self) -> Option<std::time::Duration> {
        (self.frame_rate > 0)
            .then(|| std::time::Duration::from_secs_f64(1.0 / self.frame_rate as f64))
    }
}

/// Source of video frames.
#[allow(async_fn_in_trait)]
pub trait FrameSource {
    /// Next frame, or `None` once the source is exhausted.
    /// A live camera never returns `None`.
    async fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Plays a directory of still images back as a video stream, in file-name order.
#[derive(Debug)]
pub struct ImageSequenceCamera {
    files: Vec<PathBuf>,
    next: usize,
    options: CaptureOptions,
}

impl ImageSequenceCamera {
    pub fn open<P: AsRef<Path>>(dir: P, options: CaptureOptions) -> Result<Self> {
        let dir = dir.as_ref();
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && has_image_extension(&path) {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(Error::Camera(format!(
                "no image files found in {}",
                dir.display()
            )));
        }

        info!(dir = %dir.display(), frames = files.len(), "opened image sequence");
        Ok(Self {
            files,
            next: 0,
            options,
        })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }
}

impl FrameSource for ImageSequenceCamera {
    async fn next_frame(&mut self) -> Result<Option<Frame>> {
        let Some(path) = self.files.get(self.next) else {
            return Ok(None);
        };

        let bytes = tokio::fs::read(path).await?;
        let mut image = image::load_from_memory(&bytes)?.to_rgba8();

        let CaptureOptions { width, height, .. } = self.options;
        if width > 0 && height > 0 && image.dimensions() != (width, height) {
            image = imageops::resize(&image, width, height, FilterType::Triangle);
        }

        let frame = Frame::new(self.next as u64, image);
        debug!(index = frame.index, path = %path.display(), "captured frame");
        self.next += 1;
        Ok(Some(frame))
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
