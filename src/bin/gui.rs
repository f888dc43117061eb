//! GUI application showing the annotated stream and the detected face shape.
//!
//! Run with: cargo run --features gui --bin face-shape-gui

use std::time::{Duration, Instant};

use eframe::egui;
use face_shape::{logging, FaceShapeView, ImageSequenceCamera, Pipeline, ReplayDetector, Settings};
use tracing::{error, info};

type StreamPipeline = Pipeline<ReplayDetector, ImageSequenceCamera, FaceShapeView>;

fn main() -> eframe::Result<()> {
    if let Err(e) = logging::init("info") {
        eprintln!("Error: {}", e);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1024.0, 768.0]),
        ..Default::default()
    };

    eframe::run_native(
        "face-shape - Face Shape Detection",
        options,
        Box::new(|cc| Ok(Box::new(FaceShapeApp::new(cc)))),
    )
}

struct FaceShapeApp {
    settings: Settings,
    runtime: Option<tokio::runtime::Runtime>,

    // Stream state
    pipeline: Option<StreamPipeline>,
    finished: bool,
    last_step: Option<Instant>,
    display_texture: Option<egui::TextureHandle>,
    shown_frame: Option<u64>,
    status: String,

    // Inputs
    frames_dir: String,
    recording_path: String,
}

impl FaceShapeApp {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let (settings, status) = match Settings::load(None) {
            Ok(settings) => (settings, "Choose frames and a landmark recording".to_string()),
            Err(e) => (
                Settings::default(),
                format!("Failed to load settings, using defaults: {}", e),
            ),
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| error!(error = %e, "failed to build runtime"))
            .ok();

        Self {
            settings,
            runtime,
            pipeline: None,
            finished: false,
            last_step: None,
            display_texture: None,
            shown_frame: None,
            status,
            frames_dir: "frames".to_string(),
            recording_path: "landmarks.jsonl".to_string(),
        }
    }

    fn start_stream(&mut self) {
        let camera = match ImageSequenceCamera::open(&self.frames_dir, self.settings.capture) {
            Ok(camera) => camera,
            Err(e) => {
                self.status = format!("Failed to open frames: {}", e);
                return;
            }
        };
        let detector = match ReplayDetector::open(&self.recording_path) {
            Ok(detector) => detector,
            Err(e) => {
                self.status = format!("Failed to open recording: {}", e);
                return;
            }
        };

        let view = FaceShapeView::new(self.settings.overlay);
        let mut pipeline = Pipeline::new(detector, camera, view)
            .with_detector_options(self.settings.detector.options())
            .with_locator(self.settings.detector.locator())
            .with_capture(self.settings.capture);

        if let Err(e) = pipeline.start() {
            self.status = format!("Failed to start stream: {}", e);
            return;
        }

        info!(frames = %self.frames_dir, recording = %self.recording_path, "stream started");
        self.pipeline = Some(pipeline);
        self.finished = false;
        self.last_step = None;
        self.display_texture = None;
        self.shown_frame = None;
        self.status = "Streaming".to_string();
    }

    fn frame_due(&self) -> bool {
        match (self.last_step, self.settings.capture.frame_interval()) {
            (Some(last), Some(interval)) => last.elapsed() >= interval,
            _ => true,
        }
    }

    fn step(&mut self) {
        let (Some(runtime), Some(pipeline)) = (self.runtime.as_ref(), self.pipeline.as_mut())
        else {
            return;
        };

        self.last_step = Some(Instant::now());
        match runtime.block_on(pipeline.step()) {
            Ok(true) => {}
            Ok(false) => {
                let summary = pipeline.summary();
                self.finished = true;
                self.status = format!(
                    "Stream finished: {} frames, {} dropped",
                    summary.frames, summary.dropped
                );
            }
            Err(e) => {
                self.finished = true;
                self.status = format!("Stream failed: {}", e);
            }
        }
    }

    fn refresh_texture(&mut self, ctx: &egui::Context) {
        let Some(view) = self.pipeline.as_ref().map(|p| p.handler()) else {
            return;
        };
        if view.rendered_frame() == self.shown_frame {
            return;
        }

        let canvas = view.canvas().image();
        let size = [canvas.width() as usize, canvas.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, canvas.as_raw());

        match self.display_texture.as_mut() {
            Some(texture) => texture.set(color_image, Default::default()),
            None => {
                self.display_texture =
                    Some(ctx.load_texture("canvas", color_image, Default::default()))
            }
        }
        self.shown_frame = view.rendered_frame();
    }

    fn caption(&self) -> String {
        self.pipeline
            .as_ref()
            .map(|p| p.handler().caption())
            .unwrap_or_else(|| FaceShapeView::default().caption())
    }
}

impl eframe::App for FaceShapeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.pipeline.is_some() && !self.finished {
            if self.frame_due() {
                self.step();
                self.refresh_texture(ctx);
            }
            let wait = self
                .settings
                .capture
                .frame_interval()
                .unwrap_or(Duration::ZERO);
            ctx.request_repaint_after(wait);
        }

        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        egui::SidePanel::left("controls").min_width(250.0).show(ctx, |ui| {
            ui.heading("Input");
            ui.separator();

            ui.label("Frames directory:");
            ui.text_edit_singleline(&mut self.frames_dir);
            if ui.button("Browse...").clicked() {
                if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                    self.frames_dir = dir.display().to_string();
                }
            }
            ui.add_space(8.0);

            ui.label("Landmark recording:");
            ui.text_edit_singleline(&mut self.recording_path);
            if ui.button("Browse...").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("JSON Lines", &["jsonl", "ndjson", "json"])
                    .pick_file()
                {
                    self.recording_path = path.display().to_string();
                }
            }
            ui.add_space(16.0);

            ui.heading("Stream");
            ui.separator();
            let streaming = self.pipeline.is_some() && !self.finished;
            if ui.add_enabled(!streaming, egui::Button::new("Start")).clicked() {
                self.start_stream();
            }
            ui.add_space(16.0);

            ui.heading("Status");
            ui.separator();
            ui.label(&self.status);
        });

        egui::TopBottomPanel::bottom("caption").show(ctx, |ui| {
            ui.centered_and_justified(|ui| {
                ui.heading(self.caption());
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(ref texture) = self.display_texture {
                let available_size = ui.available_size();
                let texture_size = texture.size_vec2();

                // Scale to fit
                let scale = (available_size.x / texture_size.x)
                    .min(available_size.y / texture_size.y)
                    .min(1.0);
                let display_size = texture_size * scale;

                ui.centered_and_justified(|ui| {
                    ui.image((texture.id(), display_size));
                });
            } else {
                ui.centered_and_justified(|ui| {
                    ui.heading("No frame drawn yet");
                });
            }
        });
    }
}
