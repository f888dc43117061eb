//! Per-frame orchestration: camera → detector → results handler.
//!
//! The pipeline runs on a single cooperative task. Each frame's detection is
//! awaited before the next frame is requested, so at most one inference is in
//! flight and the handler is never re-entered.

use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::camera::{CaptureOptions, Frame, FrameSource};
use crate::detector::{AssetLocator, DetectorOptions, LandmarkDetector};
use crate::error::{Error, Result};
use crate::view::ResultsHandler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Camera not started yet.
    Idle,
    /// Frames flow to the detector until the pipeline is dropped.
    Streaming,
}

/// Counters for a finished stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamSummary {
    /// Frames whose results reached the handler.
    pub frames: u64,
    /// Frames lost to detector errors.
    pub dropped: u64,
}

pub struct Pipeline<D, S, H> {
    detector: D,
    source: S,
    handler: H,
    options: DetectorOptions,
    locator: AssetLocator,
    capture: CaptureOptions,
    state: PipelineState,
    summary: StreamSummary,
}

impl<D, S, H> Pipeline<D, S, H>
where
    D: LandmarkDetector,
    S: FrameSource,
    H: ResultsHandler,
{
    pub fn new(detector: D, source: S, handler: H) -> Self {
        Self {
            detector,
            source,
            handler,
            options: DetectorOptions::default(),
            locator: AssetLocator::default(),
            capture: CaptureOptions::default(),
            state: PipelineState::Idle,
            summary: StreamSummary::default(),
        }
    }

    pub fn with_detector_options(mut self, options: DetectorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_locator(mut self, locator: AssetLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Capture settings; only the frame rate is used here, for pacing.
    pub fn with_capture(mut self, capture: CaptureOptions) -> Self {
        self.capture = capture;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn summary(&self) -> StreamSummary {
        self.summary
    }

    /// Initialize the detector and begin streaming. Only valid once.
    pub fn start(&mut self) -> Result<()> {
        if self.state == PipelineState::Streaming {
            return Err(Error::AlreadyStreaming);
        }
        self.detector.initialize(&self.options, &self.locator)?;
        self.state = PipelineState::Streaming;
        info!(frame_rate = self.capture.frame_rate, "streaming started");
        Ok(())
    }

    /// Push one frame through. Returns `false` once the source is exhausted.
    ///
    /// A detector failure drops the frame; it is not retried.
    pub async fn step(&mut self) -> Result<bool> {
        match self.next_frame().await? {
            Some(frame) => {
                self.process(frame).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.state != PipelineState::Streaming {
            return Err(Error::NotStreaming);
        }
        let frame = self.source.next_frame().await?;
        if frame.is_none() {
            debug!("frame source exhausted");
        }
        Ok(frame)
    }

    async fn process(&mut self, frame: Frame) {
        let index = frame.index;
        match self.detector.send(frame).await {
            Ok(results) => {
                self.handler.on_results(&results);
                self.summary.frames += 1;
            }
            Err(e) => {
                warn!(frame = index, error = %e, "detection failed, frame dropped");
                self.summary.dropped += 1;
            }
        }
    }

    /// Stream until the source runs out.
    pub async fn run(&mut self) -> Result<StreamSummary> {
        self.run_with(|_| Ok(())).await
    }

    /// Stream until the source runs out, calling `after_frame` with the handler
    /// after every frame. Starts the pipeline if it is still idle.
    pub async fn run_with<F>(&mut self, mut after_frame: F) -> Result<StreamSummary>
    where
        F: FnMut(&H) -> Result<()>,
    {
        if self.state == PipelineState::Idle {
            self.start()?;
        }

        let mut ticker = self.capture.frame_interval().map(|period| {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        // The frame is fetched before waiting, so an exhausted source ends the
        // stream without an extra period.
        while let Some(frame) = self.next_frame().await? {
            if let Some(ticker) = ticker.as_mut() {
                ticker.tick().await;
            }
            self.process(frame).await;
            after_frame(&self.handler)?;
        }

        info!(
            frames = self.summary.frames,
            dropped = self.summary.dropped,
            "stream finished"
        );
        Ok(self.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::DetectionResult;
    use image::RgbaImage;

    struct Frames(u64, u64);

    impl FrameSource for Frames {
        async fn next_frame(&mut self) -> Result<Option<Frame>> {
            if self.0 >= self.1 {
                return Ok(None);
            }
            self.0 += 1;
            Ok(Some(Frame::new(self.0 - 1, RgbaImage::new(2, 2))))
        }
    }

    #[derive(Default)]
    struct NoFaces {
        initialized: usize,
    }

    impl LandmarkDetector for NoFaces {
        fn initialize(&mut self, _: &DetectorOptions, _: &AssetLocator) -> Result<()> {
            self.initialized += 1;
            Ok(())
        }

        async fn send(&mut self, frame: Frame) -> Result<DetectionResult> {
            Ok(DetectionResult {
                image: frame,
                multi_face_landmarks: None,
            })
        }
    }

    #[derive(Default)]
    struct Count(usize);

    impl ResultsHandler for Count {
        fn on_results(&mut self, _: &DetectionResult) {
            self.0 += 1;
        }
    }

    #[test]
    fn starts_once() {
        let mut pipeline = Pipeline::new(NoFaces::default(), Frames(0, 1), Count::default());
        assert_eq!(pipeline.state(), PipelineState::Idle);

        pipeline.start().unwrap();
        assert_eq!(pipeline.state(), PipelineState::Streaming);
        assert_eq!(pipeline.detector().initialized, 1);

        assert!(matches!(pipeline.start(), Err(Error::AlreadyStreaming)));
        assert_eq!(pipeline.state(), PipelineState::Streaming);
        assert_eq!(pipeline.detector().initialized, 1);
    }

    #[tokio::test]
    async fn step_requires_streaming() {
        let mut pipeline = Pipeline::new(NoFaces::default(), Frames(0, 1), Count::default());
        assert!(matches!(pipeline.step().await, Err(Error::NotStreaming)));
    }

    #[tokio::test]
    async fn run_starts_idle_pipeline() {
        let capture = CaptureOptions {
            frame_rate: 0,
            ..CaptureOptions::default()
        };
        let mut pipeline = Pipeline::new(NoFaces::default(), Frames(0, 3), Count::default())
            .with_capture(capture);

        let summary = pipeline.run().await.unwrap();
        assert_eq!(summary, StreamSummary { frames: 3, dropped: 0 });
        assert_eq!(pipeline.handler().0, 3);
        assert_eq!(pipeline.state(), PipelineState::Streaming);
    }

    #[test]
    fn summary_json() {
        let summary = StreamSummary { frames: 4, dropped: 1 };
        assert_eq!(
            serde_json::to_value(summary).unwrap(),
            serde_json::json!({"frames": 4, "dropped": 1})
        );
    }
}
