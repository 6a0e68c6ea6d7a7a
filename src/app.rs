//! Mood player window — egui/eframe application.
//!
//! # Architecture
//!
//! [`MoodPlayerApp`] is the top-level [`eframe::App`].  It owns the
//! [`MoodLoop`] and drives exactly one [`MoodLoop::tick`] per repaint, then
//! draws what the tick reported:
//!
//! * the camera frame, uploaded into a single reused texture;
//! * a rectangle around every detected face, labelled with the latest mood;
//! * the non-dominant scores ("Other Emotions: ...");
//! * a "Play my vibe" button, the auto-play toggle and the last playback
//!   outcome.
//!
//! The window repaints continuously.  It closes itself when the capture
//! device stops producing frames, and releases the device in `on_exit`.

use std::sync::Arc;

use eframe::egui;

use crate::config::UiConfig;
use crate::emotion::Classification;
use crate::pipeline::{LoopError, MoodLoop, MoodReading};
use crate::vision::{FaceRegion, Frame};

const FACE_COLOR: egui::Color32 = egui::Color32::from_rgb(80, 200, 120);
const DIM_TEXT: egui::Color32 = egui::Color32::from_rgb(160, 160, 160);
const WARN_TEXT: egui::Color32 = egui::Color32::from_rgb(255, 136, 68);

// ---------------------------------------------------------------------------
// MoodPlayerApp
// ---------------------------------------------------------------------------

/// eframe application — webcam view plus playback controls.
pub struct MoodPlayerApp {
    mood_loop: MoodLoop,

    // ── Last tick ────────────────────────────────────────────────────────
    texture: Option<egui::TextureHandle>,
    frame_size: [usize; 2],
    faces: Vec<FaceRegion>,
    reading: Option<Arc<MoodReading>>,

    // ── Status ───────────────────────────────────────────────────────────
    /// Last playback outcome or trigger problem, shown under the controls.
    status: Option<(String, bool)>,
    device_lost: bool,

    show_scores: bool,
}

impl MoodPlayerApp {
    pub fn new(mood_loop: MoodLoop, ui: &UiConfig) -> Self {
        Self {
            mood_loop,
            texture: None,
            frame_size: [0, 0],
            faces: Vec::new(),
            reading: None,
            status: None,
            device_lost: false,
            show_scores: ui.show_scores,
        }
    }

    // ── Loop driving ─────────────────────────────────────────────────────

    fn run_tick(&mut self, ctx: &egui::Context) {
        match self.mood_loop.tick() {
            Ok(report) => {
                self.upload_frame(ctx, &report.frame);
                self.faces = report.faces;
                self.reading = report.reading;
                if let Some(outcome) = report.outcome {
                    self.status = Some((outcome.summary(), outcome.is_started()));
                }
            }
            Err(LoopError::DeviceUnavailable) => {
                log::error!("app: camera lost, closing window");
                self.device_lost = true;
                self.status = Some(("Camera unavailable".into(), false));
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            Err(_) => {}
        }
    }

    fn upload_frame(&mut self, ctx: &egui::Context, frame: &Frame) {
        let image = egui::ColorImage::from_rgb(frame.size(), frame.pixels());
        self.frame_size = frame.size();
        match &mut self.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.texture =
                    Some(ctx.load_texture("camera", image, egui::TextureOptions::LINEAR));
            }
        }
    }

    fn play_my_vibe(&mut self) {
        self.status = Some(match self.mood_loop.trigger_manual() {
            Ok(outcome) => (outcome.summary(), outcome.is_started()),
            Err(e) => (capitalize(&e.to_string()), false),
        });
    }

    // ── Rendering ────────────────────────────────────────────────────────

    /// Camera image scaled to the available width, with face overlays.
    fn draw_video(&self, ui: &mut egui::Ui) {
        let Some(texture) = &self.texture else {
            ui.centered_and_justified(|ui| {
                ui.label(egui::RichText::new("Waiting for camera...").color(DIM_TEXT));
            });
            return;
        };

        let [w, h] = self.frame_size;
        let avail = ui.available_size();
        let scale = (avail.x / w as f32).min(avail.y / h as f32).max(0.01);
        let size = egui::vec2(w as f32 * scale, h as f32 * scale);

        let response = ui.add(
            egui::Image::new(egui::load::SizedTexture::new(texture.id(), size))
                .fit_to_exact_size(size),
        );
        let painter = ui.painter_at(response.rect);

        let label = self
            .reading
            .as_ref()
            .map(|r| r.label().to_string())
            .unwrap_or_default();

        for region in &self.faces {
            let rect = region_to_screen(region, self.frame_size, response.rect);
            painter.rect_stroke(
                rect,
                2.0,
                egui::Stroke::new(2.0, FACE_COLOR),
                egui::StrokeKind::Outside,
            );
            if !label.is_empty() {
                painter.text(
                    rect.left_top() - egui::vec2(0.0, 4.0),
                    egui::Align2::LEFT_BOTTOM,
                    &label,
                    egui::FontId::proportional(18.0),
                    FACE_COLOR,
                );
            }
        }
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        if self.show_scores {
            if let Some(reading) = &self.reading {
                ui.label(
                    egui::RichText::new(other_emotions_line(&reading.classification))
                        .color(DIM_TEXT)
                        .size(12.0),
                );
            }
        }

        ui.horizontal(|ui| {
            let enabled = !self.device_lost;
            if ui
                .add_enabled(enabled, egui::Button::new("Play my vibe"))
                .clicked()
            {
                self.play_my_vibe();
            }

            let mut auto = self.mood_loop.auto_trigger();
            if ui.checkbox(&mut auto, "Auto-play").changed() {
                self.mood_loop.set_auto_trigger(auto);
            }
            ui.checkbox(&mut self.show_scores, "Scores");

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    egui::RichText::new(self.mood_loop.phase().label())
                        .color(DIM_TEXT)
                        .size(11.0),
                );
            });
        });

        if let Some((text, ok)) = &self.status {
            let color = if *ok { FACE_COLOR } else { WARN_TEXT };
            ui.label(egui::RichText::new(text.as_str()).color(color).size(12.0));
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a face rectangle in frame pixels onto the on-screen image rect.
fn region_to_screen(region: &FaceRegion, frame_size: [usize; 2], image: egui::Rect) -> egui::Rect {
    let sx = image.width() / frame_size[0].max(1) as f32;
    let sy = image.height() / frame_size[1].max(1) as f32;
    egui::Rect::from_min_size(
        image.min + egui::vec2(region.x as f32 * sx, region.y as f32 * sy),
        egui::vec2(region.width as f32 * sx, region.height as f32 * sy),
    )
}

/// `"Other Emotions: sadness 25%, neutral 10%"`, highest first.
fn other_emotions_line(classification: &Classification) -> String {
    let others = classification.others();
    if others.is_empty() {
        return "Other Emotions: none".into();
    }
    let parts: Vec<String> = others
        .iter()
        .map(|(label, score)| format!("{label} {:.0}%", score * 100.0))
        .collect();
    format!("Other Emotions: {}", parts.join(", "))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for MoodPlayerApp {
    /// Called every frame by eframe.  Runs one loop tick, then renders.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.device_lost {
            self.run_tick(ctx);
        }

        egui::TopBottomPanel::bottom("controls")
            .frame(egui::Frame::new().inner_margin(egui::Margin::same(8)))
            .show(ctx, |ui| self.draw_controls(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(egui::Color32::from_rgb(20, 20, 20)))
            .show(ctx, |ui| self.draw_video(ui));

        // Camera-bound: draw as fast as frames arrive.
        ctx.request_repaint();
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.mood_loop.shutdown();
        log::info!("mood player window closing");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
