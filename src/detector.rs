//! The landmark detector seam.
//!
//! Face detection and landmark localisation belong to an external, pretrained
//! face-mesh model. This module defines the contract the pipeline expects from
//! it and ships [`ReplayDetector`], which plays back recorded detector output.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::camera::Frame;
use crate::error::{Error, Result};
use crate::types::Landmarks;

/// Default location of the face-mesh model assets.
pub const DEFAULT_ASSET_BASE_URL: &str = "https://cdn.jsdelivr.net/npm/@mediapipe/face_mesh/";

/// Asset files the face-mesh model loads at start-up.
pub const FACE_MESH_ASSETS: &[&str] = &[
    "face_mesh.binarypb",
    "face_mesh_solution_packed_assets.data",
    "face_mesh_solution_packed_assets_loader.js",
    "face_mesh_solution_simd_wasm_bin.js",
    "face_mesh_solution_simd_wasm_bin.wasm",
];

/// Detector settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorOptions {
    pub max_faces: usize,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            max_faces: 1,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
        }
    }
}

/// Resolves model asset file names to URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLocator {
    base_url: String,
}

impl AssetLocator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn locate_file(&self, file: &str) -> String {
        if self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, file)
        } else {
            format!("{}/{}", self.base_url, file)
        }
    }
}

impl Default for AssetLocator {
    fn default() -> Self {
        Self::new(DEFAULT_ASSET_BASE_URL)
    }
}

/// What the detector hands back for one frame.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    /// The frame that was processed.
    pub image: Frame,
    /// One landmark list per detected face; `None` when no face was found.
    pub multi_face_landmarks: Option<Vec<Landmarks>>,
}

impl DetectionResult {
    /// Detected faces, empty when there are none.
    pub fn faces(&self) -> &[Landmarks] {
        self.multi_face_landmarks.as_deref().unwrap_or(&[])
    }

    pub fn has_faces(&self) -> bool {
        !self.faces().is_empty()
    }
}

/// A face-landmark detector.
#[allow(async_fn_in_trait)]
pub trait LandmarkDetector {
    /// Configure the detector before the first frame.
    fn initialize(&mut self, options: &DetectorOptions, locator: &AssetLocator) -> Result<()>;

    /// Run detection on one frame. Resolves once the result is available.
    async fn send(&mut self, frame: Frame) -> Result<DetectionResult>;
}

/// One line of a detector recording.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultRecord {
    #[serde(default)]
    multi_face_landmarks: Option<Vec<Landmarks>>,
}

/// Plays back detector output recorded as JSON Lines.
///
/// Each line holds one frame's result in the face-mesh result shape,
/// `{"multiFaceLandmarks": [[{"x": .., "y": .., "z": ..}, ...]]}`. `null`, `{}`
/// or a missing field mean no face. Once the recording runs out every further
/// frame reports no face.
#[derive(Debug, Default)]
pub struct ReplayDetector {
    records: Vec<Option<Vec<Landmarks>>>,
    next: usize,
    options: DetectorOptions,
}

impl ReplayDetector {
    pub fn new(records: Vec<Option<Vec<Landmarks>>>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut records = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record: Option<ResultRecord> = serde_json::from_str(line).map_err(|e| {
                Error::Detector(format!("invalid record on line {}: {}", line_no + 1, e))
            })?;
            records.push(record.and_then(|r| r.multi_face_landmarks));
        }
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl LandmarkDetector for ReplayDetector {
    fn initialize(&mut self, options: &DetectorOptions, locator: &AssetLocator) -> Result<()> {
        if options.max_faces == 0 {
            return Err(Error::Detector("max_faces must be at least 1".into()));
        }
        for asset in FACE_MESH_ASSETS {
            debug!(url = %locator.locate_file(asset), "model asset");
        }
        info!(
            max_faces = options.max_faces,
            min_detection_confidence = options.min_detection_confidence,
            min_tracking_confidence = options.min_tracking_confidence,
            records = self.records.len(),
            "replay detector initialized"
        );
        self.options = *options;
        Ok(())
    }

    async fn send(&mut self, frame: Frame) -> Result<DetectionResult> {
        let mut faces = self.records.get(self.next).cloned().flatten();
        self.next += 1;

        if let Some(faces) = faces.as_mut() {
            faces.truncate(self.options.max_faces);
        }

        Ok(DetectionResult {
            image: frame,
            multi_face_landmarks: faces,
        })
    }
}
