//! SnapCam - camera still capture with live preview

mod state;
mod ui;
mod worker;

use crate::ui::CaptureApp;
use crate::worker::{camera_worker, CameraCommand, CameraEvent};
use capture_v4l::PreviewSurface;
use crossbeam_channel::{bounded, Receiver, Sender};
use eframe::egui;
use std::sync::Arc;
use std::thread;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let surface = PreviewSurface::shared();

    let (cmd_tx, cmd_rx): (Sender<CameraCommand>, Receiver<CameraCommand>) = bounded(8);
    let (event_tx, event_rx): (Sender<CameraEvent>, Receiver<CameraEvent>) = bounded(8);

    // Camera worker thread; commands from the UI execute serially here
    let worker_surface = Arc::clone(&surface);
    let worker_handle = thread::spawn(move || {
        camera_worker(worker_surface, cmd_rx, event_tx);
    });

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 640.0])
            .with_min_inner_size([480.0, 320.0])
            .with_title("SnapCam")
            .with_resizable(true),
        ..Default::default()
    };

    let app_surface = Arc::clone(&surface);
    let app_cmd_tx = cmd_tx.clone();
    let _ = eframe::run_native(
        "SnapCam",
        native_options,
        Box::new(|cc| Ok(Box::new(CaptureApp::new(cc, app_surface, app_cmd_tx, event_rx)))),
    );

    // Cleanup
    let _ = cmd_tx.send(CameraCommand::Shutdown);
    let _ = worker_handle.join();

    Ok(())
}
