//! Capture view using egui

use crate::state::{StateMachine, ViewState};
use crate::worker::{CameraCommand, CameraEvent};
use capture_v4l::{
    CameraSettings, CapturedFrame, Facing, Orientation, Rect, SharedSurface, Size,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use overlay::{centered, scaled, stretch_size};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use uuid::Uuid;

/// Fraction of the preview covered by the capture guide
const FRAME_WIDTH_RATIO: f64 = 0.8;
const FRAME_HEIGHT_RATIO: f64 = 0.8;

/// Ideal capture resolution per window orientation
const PORTRAIT_IDEAL: Size = Size::new(2224, 3024);
const LANDSCAPE_IDEAL: Size = Size::new(4032, 3024);

const DEFAULT_FACING: Facing = Facing::Front;

/// Camera settings derived from the current window size
fn settings_for(window: Size) -> CameraSettings {
    let ideal_resolution = match window.orientation() {
        Orientation::Portrait => PORTRAIT_IDEAL,
        Orientation::Landscape => LANDSCAPE_IDEAL,
    };
    CameraSettings {
        ideal_resolution,
        facing: DEFAULT_FACING,
    }
}

/// Crop rectangle for the confirmed still: the guide fraction of the live
/// resolution, centered
fn capture_rect(resolution: Size) -> Rect {
    overlay::frame_guide(resolution, FRAME_WIDTH_RATIO, FRAME_HEIGHT_RATIO)
}

fn to_egui(rect: Rect) -> egui::Rect {
    egui::Rect::from_min_size(
        egui::pos2(rect.x as f32, rect.y as f32),
        egui::vec2(rect.width as f32, rect.height as f32),
    )
}

/// Main capture view
pub struct CaptureApp {
    surface: SharedSurface,
    cmd_tx: Sender<CameraCommand>,
    event_rx: Receiver<CameraEvent>,
    machine: StateMachine,
    resolution: Size,
    window: Size,
    texture: Option<egui::TextureHandle>,
    error_text: Option<String>,
    save_status: Arc<Mutex<Option<String>>>,
}

impl CaptureApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        surface: SharedSurface,
        cmd_tx: Sender<CameraCommand>,
        event_rx: Receiver<CameraEvent>,
    ) -> Self {
        Self {
            surface,
            cmd_tx,
            event_rx,
            machine: StateMachine::new(),
            resolution: Size::UNKNOWN,
            window: Size::UNKNOWN,
            texture: None,
            error_text: None,
            save_status: Arc::new(Mutex::new(None)),
        }
    }

    fn send(&self, command: CameraCommand) {
        if self.cmd_tx.send(command).is_err() {
            log::error!("camera worker is gone");
        }
    }

    fn handle_event(&mut self, event: CameraEvent) {
        match event {
            CameraEvent::Opened(size) => {
                self.resolution = size;
                self.machine.stream_ready();
            }
            CameraEvent::Closed => {
                self.resolution = Size::UNKNOWN;
            }
            CameraEvent::Captured(capture) => self.save_capture(capture),
            CameraEvent::Error(message) => {
                log::warn!("camera error: {message}");
                self.error_text = Some(message);
                self.machine.fail();
            }
        }
    }

    fn reopen_camera(&mut self) {
        if self.machine.reopen() {
            self.error_text = None;
            self.send(CameraCommand::Open(settings_for(self.window)));
        }
    }

    fn toggle_freeze(&mut self) {
        if self.machine.state() == ViewState::Frozen {
            self.send(CameraCommand::Play);
            self.machine.unfreeze();
        } else if self.machine.freeze() {
            self.send(CameraCommand::Pause);
        }
    }

    fn confirm_capture(&mut self) {
        let rect = capture_rect(self.resolution);
        if rect.has_zero_field() {
            self.error_text = Some("no live resolution to capture".to_owned());
            return;
        }
        if self.machine.confirm() {
            self.send(CameraCommand::Capture(rect));
            self.send(CameraCommand::Close);
        }
    }

    fn hide_view(&mut self) {
        let close_needed = self.machine.state() != ViewState::Hidden;
        self.machine.hide();
        if close_needed {
            self.send(CameraCommand::Close);
        }
        self.texture = None;
    }

    /// Pick a destination and write the confirmed still, off the UI thread
    /// so the dialog does not stall the event loop.
    fn save_capture(&self, capture: CapturedFrame) {
        let status = Arc::clone(&self.save_status);
        thread::spawn(move || {
            let default_name = format!("snapcam_{}.jpg", Uuid::new_v4());
            let picked = rfd::FileDialog::new()
                .add_filter("JPEG image", &["jpg", "jpeg"])
                .add_filter("PNG image", &["png"])
                .set_file_name(&default_name)
                .save_file();

            let Some(path) = picked else {
                *status.lock() = Some("save cancelled".to_owned());
                return;
            };

            match export::export_capture(&capture, &path) {
                Ok(path) => {
                    log::info!("saved capture to {}", path.display());
                    *status.lock() = Some(format!("saved: {}", path.display()));
                }
                Err(err) => {
                    log::error!("export failed: {err}");
                    *status.lock() = Some(format!("export failed: {err}"));
                }
            }
        });
    }

    fn refresh_texture(&mut self, ctx: &egui::Context) {
        if self.machine.state() == ViewState::Hidden {
            return;
        }
        let image = {
            let surface = self.surface.lock();
            surface.frame().map(|frame| {
                egui::ColorImage::from_rgb(
                    [frame.width as usize, frame.height as usize],
                    &frame.data,
                )
            })
        };
        if let Some(image) = image {
            match &mut self.texture {
                Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
                None => {
                    self.texture =
                        Some(ctx.load_texture("preview", image, egui::TextureOptions::LINEAR));
                }
            }
        }
    }

    fn draw_preview(&self, ui: &egui::Ui) {
        let Some(texture) = &self.texture else {
            return;
        };
        if self.resolution.is_unknown() {
            return;
        }

        let painter = ui.painter();
        let display = stretch_size(self.window, self.resolution);

        let image_rect = to_egui(centered(self.window, display.size()));
        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
        painter.image(texture.id(), image_rect, uv, egui::Color32::WHITE);

        let guide = centered(
            self.window,
            scaled(display.size(), FRAME_WIDTH_RATIO, FRAME_HEIGHT_RATIO),
        );
        painter.rect_stroke(
            to_egui(guide),
            0.0,
            egui::Stroke::new(3.0, egui::Color32::RED),
        );
    }

    fn draw_status(&self, ui: &egui::Ui) {
        let painter = ui.painter();

        let status = self
            .error_text
            .clone()
            .unwrap_or_else(|| self.machine.state().display_text().to_owned());
        painter.text(
            egui::pos2(10.0, 10.0),
            egui::Align2::LEFT_TOP,
            status,
            egui::FontId::proportional(18.0),
            egui::Color32::RED,
        );

        let display = stretch_size(self.window, self.resolution);
        painter.text(
            egui::pos2(10.0, 36.0),
            egui::Align2::LEFT_TOP,
            format!(
                "window: {} * {}  video: {} * {}  fit: {:?}",
                self.window.width,
                self.window.height,
                self.resolution.width,
                self.resolution.height,
                display.base,
            ),
            egui::FontId::proportional(14.0),
            egui::Color32::YELLOW,
        );
        painter.text(
            egui::pos2(10.0, 56.0),
            egui::Align2::LEFT_TOP,
            format!("orientation: {:?}", self.window.orientation()),
            egui::FontId::proportional(14.0),
            egui::Color32::YELLOW,
        );

        if let Some(saved) = self.save_status.lock().clone() {
            painter.text(
                egui::pos2(10.0, 76.0),
                egui::Align2::LEFT_TOP,
                saved,
                egui::FontId::proportional(14.0),
                egui::Color32::LIGHT_GREEN,
            );
        }
    }

    fn draw_controls(&mut self, ctx: &egui::Context) {
        let state = self.machine.state();

        egui::Area::new(egui::Id::new("capture-controls"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-20.0, -20.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let disabled = egui::Color32::from_rgb(108, 117, 125); // Gray

                    let capture_label = if state == ViewState::Frozen {
                        "⏺ Retake"
                    } else {
                        "⏺ Capture"
                    };
                    let capture_btn = egui::Button::new(
                        egui::RichText::new(capture_label)
                            .size(16.0)
                            .color(egui::Color32::WHITE),
                    )
                    .fill(if state.can_capture() {
                        egui::Color32::from_rgb(220, 53, 69) // Red
                    } else {
                        disabled
                    })
                    .min_size(egui::vec2(110.0, 40.0))
                    .rounding(8.0);

                    if ui.add_enabled(state.can_capture(), capture_btn).clicked() {
                        self.toggle_freeze();
                    }

                    ui.add_space(12.0);

                    let confirm_btn = egui::Button::new(
                        egui::RichText::new("✔ Save")
                            .size(16.0)
                            .color(egui::Color32::WHITE),
                    )
                    .fill(if state.can_confirm() {
                        egui::Color32::from_rgb(40, 167, 69) // Green
                    } else {
                        disabled
                    })
                    .min_size(egui::vec2(110.0, 40.0))
                    .rounding(8.0);

                    if ui.add_enabled(state.can_confirm(), confirm_btn).clicked() {
                        self.confirm_capture();
                    }

                    ui.add_space(12.0);

                    let cancel_btn = egui::Button::new(
                        egui::RichText::new("✖ Close")
                            .size(16.0)
                            .color(egui::Color32::WHITE),
                    )
                    .fill(if state != ViewState::Hidden {
                        egui::Color32::from_rgb(255, 193, 7) // Amber
                    } else {
                        disabled
                    })
                    .min_size(egui::vec2(110.0, 40.0))
                    .rounding(8.0);

                    if ui
                        .add_enabled(state != ViewState::Hidden, cancel_btn)
                        .clicked()
                    {
                        self.hide_view();
                    }
                });
            });
    }
}

impl eframe::App for CaptureApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
        }

        // Resize and orientation changes both land here as a new window
        // size; the camera is reopened with a recomputed ideal resolution.
        let screen = ctx.screen_rect();
        let window = Size::new(screen.width() as u32, screen.height() as u32);
        if self.machine.state() != ViewState::Hidden && window != self.window {
            self.window = window;
            self.reopen_camera();
        }

        self.refresh_texture(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                self.draw_preview(ui);
                self.draw_status(ui);
            });

        self.draw_controls(ctx);

        // Keep pulling frames while the preview is live
        ctx.request_repaint();
    }
}
