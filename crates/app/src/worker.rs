//! Camera worker thread

use capture_v4l::{
    Camera, CameraSettings, CapturedFrame, Rect, SharedSurface, Size, V4l2Source,
};
use crossbeam_channel::{Receiver, Sender};

/// Commands from the UI to the camera worker
pub enum CameraCommand {
    /// Open with the given settings, closing a currently open camera
    /// first (the resize/orientation reopen cycle)
    Open(CameraSettings),
    Close,
    Pause,
    Play,
    Capture(Rect),
    Shutdown,
}

/// Results from the camera worker to the UI
pub enum CameraEvent {
    Opened(Size),
    Closed,
    Captured(CapturedFrame),
    Error(String),
}

/// Run the camera command loop. Commands execute serially, so a close
/// issued during a pending open is simply processed right after it.
pub fn camera_worker(
    surface: SharedSurface,
    cmd_rx: Receiver<CameraCommand>,
    event_tx: Sender<CameraEvent>,
) {
    let mut camera = Camera::new(V4l2Source::new(), surface);

    while let Ok(command) = cmd_rx.recv() {
        match command {
            CameraCommand::Open(settings) => {
                if camera.is_open() {
                    if let Err(err) = camera.close() {
                        log::warn!("close before reopen failed: {err}");
                    }
                }
                match camera.open(&settings) {
                    Ok(size) => {
                        let _ = event_tx.send(CameraEvent::Opened(size));
                    }
                    Err(err) => {
                        log::error!("open failed: {err}");
                        let _ = event_tx.send(CameraEvent::Error(err.to_string()));
                    }
                }
            }
            CameraCommand::Close => match camera.close() {
                Ok(()) => {
                    let _ = event_tx.send(CameraEvent::Closed);
                }
                // A close can trail a failed or cancelled open; not an
                // error worth surfacing to the view.
                Err(err) => log::debug!("close ignored: {err}"),
            },
            CameraCommand::Pause => {
                if let Err(err) = camera.pause() {
                    let _ = event_tx.send(CameraEvent::Error(err.to_string()));
                }
            }
            CameraCommand::Play => {
                if let Err(err) = camera.play() {
                    let _ = event_tx.send(CameraEvent::Error(err.to_string()));
                }
            }
            CameraCommand::Capture(rect) => match camera.capture_still(rect) {
                Ok(capture) => {
                    let _ = event_tx.send(CameraEvent::Captured(capture));
                }
                Err(err) => {
                    log::error!("capture failed: {err}");
                    let _ = event_tx.send(CameraEvent::Error(err.to_string()));
                }
            },
            CameraCommand::Shutdown => break,
        }
    }

    if camera.is_open() {
        let _ = camera.close();
    }
}
