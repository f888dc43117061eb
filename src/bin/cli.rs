//! CLI application for face-shape classification.
//!
//! Usage:
//!   face-shape classify <landmarks.json>             # Human-readable output
//!   face-shape classify <landmarks.json> --json      # JSON output
//!   face-shape stream --frames <dir> --landmarks <recording.jsonl> -o annotated/

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use face_shape::{
    logging, FaceMeasurements, FaceShape, FaceShapeView, ImageSequenceCamera, Landmarks, Pipeline,
    ReplayDetector, Settings, StreamSummary,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "face-shape")]
#[command(author, version, about = "Face-shape classification from face-mesh landmarks", long_about = None)]
struct Args {
    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify faces from a landmark file
    Classify {
        /// JSON file: one landmark list, a list of them, or a face-mesh result
        #[arg(required = true)]
        landmarks: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the frame pipeline over an image sequence and a detector recording
    Stream {
        /// Directory of frames, played in file-name order
        #[arg(long)]
        frames: PathBuf,

        /// Detector recording (JSON Lines, one result per frame)
        #[arg(long)]
        landmarks: PathBuf,

        /// Directory to write annotated frames to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Settings file (default: face-shape.{toml,json,yaml} if present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output one JSON object per frame
        #[arg(short, long)]
        json: bool,
    },
}

/// Accepted shapes of the `classify` input.
#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkInput {
    Faces(Vec<Landmarks>),
    Face(Landmarks),
    Result {
        #[serde(rename = "multiFaceLandmarks")]
        multi_face_landmarks: Option<Vec<Landmarks>>,
    },
}

impl LandmarkInput {
    fn into_faces(self) -> Vec<Landmarks> {
        match self {
            LandmarkInput::Result {
                multi_face_landmarks,
            } => multi_face_landmarks.unwrap_or_default(),
            LandmarkInput::Faces(faces) => faces,
            LandmarkInput::Face(face) => vec![face],
        }
    }
}

/// Output structure for JSON serialization
#[derive(Serialize)]
struct Output {
    source: String,
    faces_detected: usize,
    faces: Vec<FaceOutput>,
}

#[derive(Serialize)]
struct FaceOutput {
    /// Face index (1-based)
    index: usize,
    landmark_count: usize,
    shape: String,
    measurements: Option<FaceMeasurements>,
    error: Option<String>,
}

#[derive(Serialize)]
struct FrameOutput {
    frame: u64,
    label: String,
    rendered: bool,
}

/// Final line of `stream --json`.
#[derive(Serialize)]
struct SummaryOutput {
    summary: StreamSummary,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    if let Err(e) = logging::init(level) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let result = match &args.command {
        Command::Classify {
            landmarks,
            json,
            output,
        } => run_classify(landmarks, *json, output.as_deref()),
        Command::Stream {
            frames,
            landmarks,
            output,
            config,
            json,
        } => run_stream(frames, landmarks, output.as_deref(), config.as_deref(), *json).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_classify(
    path: &Path,
    json: bool,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    debug!(path = %path.display(), "reading landmarks");
    let text = std::fs::read_to_string(path)?;
    let input: LandmarkInput = serde_json::from_str(&text)?;
    let faces = input.into_faces();

    let face_outputs: Vec<FaceOutput> = faces
        .iter()
        .enumerate()
        .map(|(i, landmarks)| match FaceMeasurements::from_landmarks(landmarks) {
            Ok(m) => FaceOutput {
                index: i + 1,
                landmark_count: landmarks.len(),
                shape: m.shape().to_string(),
                measurements: Some(m),
                error: None,
            },
            Err(e) => FaceOutput {
                index: i + 1,
                landmark_count: landmarks.len(),
                shape: FaceShape::Unknown.to_string(),
                measurements: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    let report = Output {
        source: path.display().to_string(),
        faces_detected: faces.len(),
        faces: face_outputs,
    };

    let output_str = if json {
        serde_json::to_string_pretty(&report)?
    } else {
        format_human_readable(&report)
    };

    if let Some(path) = output {
        std::fs::write(path, &output_str)?;
        info!(path = %path.display(), "output written");
    } else {
        println!("{}", output_str);
    }

    Ok(())
}

async fn run_stream(
    frames: &Path,
    recording: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load(config)?;

    let camera = ImageSequenceCamera::open(frames, settings.capture)?;
    let detector = ReplayDetector::open(recording)?;
    let view = FaceShapeView::new(settings.overlay);

    if let Some(dir) = output {
        std::fs::create_dir_all(dir)?;
    }

    let mut pipeline = Pipeline::new(detector, camera, view)
        .with_detector_options(settings.detector.options())
        .with_locator(settings.detector.locator())
        .with_capture(settings.capture);

    let mut last_written = None;
    let summary = pipeline
        .run_with(|view| {
            let Some(frame) = view.last_frame() else {
                return Ok(());
            };
            let rendered = view.rendered_frame() == Some(frame);

            if json {
                let line = FrameOutput {
                    frame,
                    label: view.label().to_string(),
                    rendered,
                };
                println!("{}", serde_json::to_string(&line)?);
            } else {
                println!("frame {:>5}: {}", frame, view.caption());
            }

            if let Some(dir) = output {
                if rendered && last_written != Some(frame) {
                    let path = dir.join(format!("frame_{:05}.png", frame));
                    view.canvas().image().save(&path)?;
                    debug!(path = %path.display(), "annotated frame written");
                    last_written = Some(frame);
                }
            }
            Ok(())
        })
        .await?;

    if json {
        println!("{}", serde_json::to_string(&SummaryOutput { summary })?);
    }
    info!(frames = summary.frames, dropped = summary.dropped, "done");
    Ok(())
}

fn format_human_readable(output: &Output) -> String {
    let mut s = String::new();

    s.push_str(&format!("Landmarks: {}\n", output.source));
    s.push_str(&format!("Faces: {}\n", output.faces_detected));

    if output.faces.is_empty() {
        s.push_str("\nDetected face shape: No face detected.\n");
        return s;
    }

    for face in &output.faces {
        s.push_str(&format!("\n--- Face {} ---\n", face.index));
        s.push_str(&format!("Landmarks: {} points\n", face.landmark_count));
        s.push_str(&format!("Detected face shape: {}.\n", face.shape));

        if let Some(m) = &face.measurements {
            s.push_str("\nMeasurements (normalized):\n");
            s.push_str(&format!("  Jaw width:       {:.4}\n", m.jaw_width));
            s.push_str(&format!("  Cheekbone width: {:.4}\n", m.cheekbone_width));
            s.push_str(&format!("  Face length:     {:.4}\n", m.face_length));
            s.push_str(&format!("  Forehead width:  {:.4}\n", m.forehead_width));
            s.push_str(&format!("  Jaw to chin:     {:.4}\n", m.jaw_to_chin_length));
        }
        if let Some(error) = &face.error {
            s.push_str(&format!("  ({})\n", error));
        }
    }

    s
}
