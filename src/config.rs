//! Runtime settings.
//!
//! Built-in defaults are layered under an optional settings file and then
//! `FACE_SHAPE__*` environment variables, e.g.
//! `FACE_SHAPE__CAPTURE__FRAME_RATE=15`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::camera::CaptureOptions;
use crate::detector::{AssetLocator, DetectorOptions, DEFAULT_ASSET_BASE_URL};
use crate::error::Result;
use crate::view::OverlayOptions;

/// Settings file looked up in the working directory when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "face-shape";

const ENV_PREFIX: &str = "FACE_SHAPE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    pub max_faces: usize,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
    pub asset_base_url: String,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        let options = DetectorOptions::default();
        Self {
            max_faces: options.max_faces,
            min_detection_confidence: options.min_detection_confidence,
            min_tracking_confidence: options.min_tracking_confidence,
            asset_base_url: DEFAULT_ASSET_BASE_URL.to_string(),
        }
    }
}

impl DetectorSettings {
    pub fn options(&self) -> DetectorOptions {
        DetectorOptions {
            max_faces: self.max_faces,
            min_detection_confidence: self.min_detection_confidence,
            min_tracking_confidence: self.min_tracking_confidence,
        }
    }

    pub fn locator(&self) -> AssetLocator {
        AssetLocator::new(self.asset_base_url.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub detector: DetectorSettings,
    pub capture: CaptureOptions,
    pub overlay: OverlayOptions,
}

impl Settings {
    /// Load settings. With `path`, that file must exist; otherwise
    /// `face-shape.{toml,json,yaml}` in the working directory is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_SETTINGS_FILE).required(false),
        };

        let settings: Settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        debug!(?settings, "settings loaded");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.detector.max_faces, 1);
        assert_eq!(settings.detector.min_detection_confidence, 0.5);
        assert_eq!(settings.detector.min_tracking_confidence, 0.5);
        assert_eq!(settings.capture.width, 640);
        assert_eq!(settings.capture.height, 480);
        assert_eq!(settings.overlay.marker_radius, 1);
        assert_eq!(
            settings.detector.locator().locate_file("face_mesh.binarypb"),
            "https://cdn.jsdelivr.net/npm/@mediapipe/face_mesh/face_mesh.binarypb"
        );
    }

    #[test]
    fn file_overrides_defaults() {
        let path = std::env::temp_dir()
            .join(format!("face-shape-settings-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            r#"
[detector]
max_faces = 2
asset_base_url = "http://localhost/assets/"

[capture]
frame_rate = 10

[overlay]
marker_color = [0, 255, 0, 255]
"#,
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.detector.max_faces, 2);
        assert_eq!(settings.detector.min_detection_confidence, 0.5);
        assert_eq!(settings.detector.asset_base_url, "http://localhost/assets/");
        assert_eq!(settings.capture.frame_rate, 10);
        assert_eq!(settings.capture.width, 640);
        assert_eq!(settings.overlay.marker_color, [0, 255, 0, 255]);
        assert_eq!(settings.overlay.marker_radius, 1);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join("face-shape-does-not-exist.toml");
        assert!(Settings::load(Some(&path)).is_err());
    }
}
