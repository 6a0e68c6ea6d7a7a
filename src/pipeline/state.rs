//! Render/control loop state machine.
//!
//! [`LoopState`] is what [`MoodLoop`](super::MoodLoop) is doing right now.
//! The status bar shows [`MoodLoop::phase`](super::MoodLoop::phase).

// ---------------------------------------------------------------------------
// LoopState
// ---------------------------------------------------------------------------

/// States of the render/control loop.
///
/// The state machine transitions are:
///
/// ```text
/// Idle ──frame──▶ Detecting ──regions──▶ Overlaying ──▶ Idle
///                                         │
///                   manual / auto trigger ▼
///                              DispatchingPlayback ──outcome──▶ Idle
/// any state ──window close / device lost──▶ ShuttingDown   (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// Waiting for the next frame.
    #[default]
    Idle,

    /// Running the face locator on the current frame.
    Detecting,

    /// Dispatching faces, draining the hand-off slot and drawing results.
    Overlaying,

    /// A playback request is running on the render thread.
    DispatchingPlayback,

    /// The capture device has been (or is being) released.  No further
    /// transitions.
    ShuttingDown,
}

impl LoopState {
    /// Returns `true` once the loop can no longer run.
    ///
    /// ```
    /// use mood_player::pipeline::LoopState;
    ///
    /// assert!(!LoopState::Idle.is_terminal());
    /// assert!(!LoopState::DispatchingPlayback.is_terminal());
    /// assert!(LoopState::ShuttingDown.is_terminal());
    /// ```
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopState::ShuttingDown)
    }

    /// A short human-readable label for the status bar.
    pub fn label(&self) -> &'static str {
        match self {
            LoopState::Idle => "Idle",
            LoopState::Detecting => "Detecting",
            LoopState::Overlaying => "Watching",
            LoopState::DispatchingPlayback => "Starting playback",
            LoopState::ShuttingDown => "Shutting down",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- LoopState::is_terminal ---

    #[test]
    fn idle_is_not_terminal() {
        assert!(!LoopState::Idle.is_terminal());
    }

    #[test]
    fn detecting_is_not_terminal() {
        assert!(!LoopState::Detecting.is_terminal());
    }

    #[test]
    fn overlaying_is_not_terminal() {
        assert!(!LoopState::Overlaying.is_terminal());
    }

    #[test]
    fn shutting_down_is_terminal() {
        assert!(LoopState::ShuttingDown.is_terminal());
    }

    // ---- LoopState::label ---

    #[test]
    fn label_idle() {
        assert_eq!(LoopState::Idle.label(), "Idle");
    }

    #[test]
    fn label_overlaying() {
        assert_eq!(LoopState::Overlaying.label(), "Watching");
    }

    #[test]
    fn label_dispatching() {
        assert_eq!(LoopState::DispatchingPlayback.label(), "Starting playback");
    }

    #[test]
    fn label_shutting_down() {
        assert_eq!(LoopState::ShuttingDown.label(), "Shutting down");
    }

    // ---- Default ---

    #[test]
    fn default_loop_state_is_idle() {
        assert_eq!(LoopState::default(), LoopState::Idle);
    }
}
