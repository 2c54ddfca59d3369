//! Capture view state machine

/// Capture view states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// Camera closed, capture view hidden
    Hidden,
    /// Waiting for the camera to report a resolution
    Opening,
    /// Live preview running
    Live,
    /// Preview frozen on a candidate still
    Frozen,
}

impl ViewState {
    /// Status line for the current state
    pub fn display_text(&self) -> &'static str {
        match self {
            ViewState::Hidden => "(closed)",
            ViewState::Opening => "searching for camera...",
            ViewState::Live => "align the subject inside the frame",
            ViewState::Frozen => "confirm or retake the still",
        }
    }

    /// Whether the capture (freeze/retake) button is enabled
    pub fn can_capture(&self) -> bool {
        matches!(self, ViewState::Live | ViewState::Frozen)
    }

    /// Whether the confirm button is enabled
    pub fn can_confirm(&self) -> bool {
        matches!(self, ViewState::Frozen)
    }

    /// Whether the camera is expected to be open
    pub fn is_streaming(&self) -> bool {
        matches!(self, ViewState::Live | ViewState::Frozen)
    }
}

/// State machine transitions
pub struct StateMachine {
    state: ViewState,
}

impl StateMachine {
    /// The view starts opening the camera immediately on mount.
    pub fn new() -> Self {
        Self {
            state: ViewState::Opening,
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Camera reported a resolution
    pub fn stream_ready(&mut self) -> bool {
        if self.state == ViewState::Opening {
            self.state = ViewState::Live;
            true
        } else {
            false
        }
    }

    /// Close-then-reopen cycle started (resize or orientation change)
    pub fn reopen(&mut self) -> bool {
        if self.state == ViewState::Hidden {
            false
        } else {
            self.state = ViewState::Opening;
            true
        }
    }

    /// Freeze the preview on the current frame
    pub fn freeze(&mut self) -> bool {
        if self.state == ViewState::Live {
            self.state = ViewState::Frozen;
            true
        } else {
            false
        }
    }

    /// Retake: resume the live preview
    pub fn unfreeze(&mut self) -> bool {
        if self.state == ViewState::Frozen {
            self.state = ViewState::Live;
            true
        } else {
            false
        }
    }

    /// Confirm the frozen still; the view hides while it is extracted
    pub fn confirm(&mut self) -> bool {
        if self.state == ViewState::Frozen {
            self.state = ViewState::Hidden;
            true
        } else {
            false
        }
    }

    /// Cancel and hide the capture view
    pub fn hide(&mut self) {
        self.state = ViewState::Hidden;
    }

    /// Camera failed; the view gives up
    pub fn fail(&mut self) {
        self.state = ViewState::Hidden;
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
