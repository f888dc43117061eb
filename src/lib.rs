//! # face-shape
//!
//! Classify the shape of a face from face-mesh landmarks, frame by frame.
//!
//! This crate provides:
//! - **Shape classification**: Oval, Rectangle, Triangle, Heart, Round, Square
//!   or Unknown, decided from five distances between fixed landmarks
//! - **Frame pipeline**: camera → landmark detector → results handler, run as a
//!   single cooperative task with at most one detection in flight
//! - **View**: a canvas annotated with landmark markers and the current label
//!
//! Landmark detection itself is delegated to an external face-mesh model behind
//! the [`LandmarkDetector`] trait. [`ReplayDetector`] plays back recorded output
//! of such a model.
//!
//! ## Algorithm Overview
//!
//! 1. Measure jaw width (0-16), cheekbone width (2-14), face length (8-27),
//!    forehead width (10-151) and jaw-to-chin length (152-8)
//! 2. Walk the rules in order, first match wins:
//!    - face length > cheekbones > jaw: Oval
//!    - face length > cheekbones < jaw: Rectangle
//!    - forehead > cheekbones < jaw: Triangle
//!    - jaw-to-chin > forehead: Heart
//!    - jaw == cheekbones == face length: Round
//!    - jaw and cheekbones within 10% of face length: Square
//!    - otherwise Unknown
//!
//! ## Quick Start
//!
//! ```rust
//! use face_shape::{classify, FaceShape, Landmarks, Point, FACE_MESH_LANDMARK_COUNT};
//!
//! let mut points = vec![Point::new(0.5, 0.5); FACE_MESH_LANDMARK_COUNT];
//! points[0] = Point::new(0.0, 0.0); // jaw, right
//! points[16] = Point::new(0.3, 0.0); // jaw, left
//! points[2] = Point::new(0.1, 0.5); // cheekbone, right
//! points[14] = Point::new(0.6, 0.5); // cheekbone, left
//! points[8] = Point::new(0.3, 1.0); // chin
//! points[27] = Point::new(0.3, 0.0); // nose bridge
//!
//! let shape = classify(&Landmarks::new(points)).unwrap();
//! assert_eq!(shape, FaceShape::Oval);
//! ```
//!
//! ## Streaming
//!
//! ```rust,no_run
//! use face_shape::{CaptureOptions, FaceShapeView, ImageSequenceCamera, Pipeline, ReplayDetector};
//!
//! # async fn stream() -> face_shape::Result<()> {
//! let camera = ImageSequenceCamera::open("frames", CaptureOptions::default())?;
//! let detector = ReplayDetector::open("landmarks.jsonl")?;
//! let mut pipeline = Pipeline::new(detector, camera, FaceShapeView::default());
//!
//! pipeline
//!     .run_with(|view| {
//!         println!("{}", view.caption());
//!         Ok(())
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod camera;
pub mod canvas;
mod classify;
pub mod config;
pub mod detector;
mod error;
pub mod landmarks;
pub mod logging;
mod pipeline;
mod types;
mod view;

pub use camera::{CaptureOptions, Frame, FrameSource, ImageSequenceCamera};
pub use canvas::Canvas;
pub use classify::{classify, FaceMeasurements, FaceShape};
pub use config::Settings;
pub use detector::{
    AssetLocator, DetectionResult, DetectorOptions, LandmarkDetector, ReplayDetector,
};
pub use error::{Error, Result};
pub use landmarks::FACE_MESH_LANDMARK_COUNT;
pub use pipeline::{Pipeline, PipelineState, StreamSummary};
pub use types::{Landmarks, Point};
pub use view::{FaceShapeView, OverlayOptions, ResultsHandler, ShapeLabel};
