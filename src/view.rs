//! The user-facing state: the annotated canvas and the shape label.

use image::Rgba;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::canvas::Canvas;
use crate::classify::{classify, FaceShape};
use crate::detector::DetectionResult;

/// Text shown for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeLabel {
    #[default]
    NoFace,
    Detected(FaceShape),
}

impl std::fmt::Display for ShapeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeLabel::NoFace => f.write_str("No face detected"),
            ShapeLabel::Detected(shape) => write!(f, "{}", shape),
        }
    }
}

/// How landmark markers are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayOptions {
    pub marker_radius: i32,
    /// RGBA marker color.
    pub marker_color: [u8; 4],
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            marker_radius: 1,
            marker_color: [255, 0, 0, 255],
        }
    }
}

/// Receives each detection result. The pipeline calls it once per frame and
/// never concurrently.
pub trait ResultsHandler {
    fn on_results(&mut self, results: &DetectionResult);
}

/// Owns the displayed label and drawing surface. Both change only through
/// [`ResultsHandler::on_results`].
#[derive(Debug, Clone, Default)]
pub struct FaceShapeView {
    label: ShapeLabel,
    canvas: Canvas,
    overlay: OverlayOptions,
    last_frame: Option<u64>,
    rendered_frame: Option<u64>,
}

impl FaceShapeView {
    pub fn new(overlay: OverlayOptions) -> Self {
        Self {
            overlay,
            ..Self::default()
        }
    }

    pub fn label(&self) -> ShapeLabel {
        self.label
    }

    /// The caption line shown under the canvas.
    pub fn caption(&self) -> String {
        format!("Detected face shape: {}.", self.label)
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Index of the last frame whose results arrived.
    pub fn last_frame(&self) -> Option<u64> {
        self.last_frame
    }

    /// Index of the frame currently drawn on the canvas.
    pub fn rendered_frame(&self) -> Option<u64> {
        self.rendered_frame
    }
}

impl ResultsHandler for FaceShapeView {
    fn on_results(&mut self, results: &DetectionResult) {
        self.last_frame = Some(results.image.index);
        if !results.has_faces() {
            self.label = ShapeLabel::NoFace;
            return;
        }

        let frame = &results.image;
        let (width, height) = frame.dimensions();
        self.canvas.resize(width, height);
        self.canvas.clear();
        self.canvas.draw_image(&frame.image);
        self.rendered_frame = Some(frame.index);

        let color = Rgba(self.overlay.marker_color);
        for (i, landmarks) in results.faces().iter().enumerate() {
            let shape = classify(landmarks).unwrap_or_else(|e| {
                warn!(frame = frame.index, face = i, error = %e, "cannot classify face");
                FaceShape::Unknown
            });
            // Last face processed wins when several are present
            self.label = ShapeLabel::Detected(shape);

            for point in landmarks {
                self.canvas.mark(point, self.overlay.marker_radius, color);
            }
        }

        debug!(frame = frame.index, label = %self.label, "frame rendered");
    }
}
