//! Frame-loop lifecycle tracking.
//!
//! The orrery moves through three phases, strictly in order:
//! [`Setup`](LoopPhase::Setup) until every GPU resource exists,
//! [`Running`](LoopPhase::Running) while frames are drawn, and
//! [`ShuttingDown`](LoopPhase::ShuttingDown) once the window closes or a
//! fatal error occurs. A phase is never re-entered.

use std::time::Instant;

use tracing::{debug, info};

/// Lifecycle phase of the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoopPhase {
    Setup,
    Running,
    ShuttingDown,
}

/// Phase state machine plus frame statistics.
pub struct FrameLoop {
    phase: LoopPhase,
    frame_count: u64,
    started_at: Option<Instant>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            phase: LoopPhase::Setup,
            frame_count: 0,
            started_at: None,
        }
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == LoopPhase::Running
    }

    /// Move to `next`. Returns `false` and stays put if `next` is not
    /// strictly later than the current phase.
    pub fn transition(&mut self, next: LoopPhase) -> bool {
        if next <= self.phase {
            debug!("Ignoring frame loop transition {:?} -> {:?}", self.phase, next);
            return false;
        }
        info!("Frame loop {:?} -> {:?}", self.phase, next);
        if next == LoopPhase::Running {
            self.started_at = Some(Instant::now());
        }
        self.phase = next;
        true
    }

    /// Count one presented frame. No-op outside `Running`.
    pub fn record_frame(&mut self) {
        if self.is_running() {
            self.frame_count += 1;
        }
    }

    /// Returns the total number of frames presented.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Average frames per second since entering `Running`.
    pub fn average_fps(&self) -> Option<f64> {
        let elapsed = self.started_at?.elapsed().as_secs_f64();
        (elapsed > 0.0).then(|| self.frame_count as f64 / elapsed)
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_in_setup() {
        let frame_loop = FrameLoop::new();
        assert_eq!(frame_loop.phase(), LoopPhase::Setup);
        assert!(!frame_loop.is_running());
        assert_eq!(frame_loop.frame_count(), 0);
        assert!(frame_loop.average_fps().is_none());
    }

    #[test]
    fn test_forward_transitions() {
        let mut frame_loop = FrameLoop::new();
        assert!(frame_loop.transition(LoopPhase::Running));
        assert!(frame_loop.is_running());
        assert!(frame_loop.transition(LoopPhase::ShuttingDown));
        assert_eq!(frame_loop.phase(), LoopPhase::ShuttingDown);
    }

    #[test]
    fn test_setup_can_skip_to_shutdown() {
        let mut frame_loop = FrameLoop::new();
        assert!(frame_loop.transition(LoopPhase::ShuttingDown));
        assert!(!frame_loop.transition(LoopPhase::Running));
        assert_eq!(frame_loop.phase(), LoopPhase::ShuttingDown);
    }

    #[test]
    fn test_backward_and_repeated_transitions_rejected() {
        let mut frame_loop = FrameLoop::new();
        assert!(!frame_loop.transition(LoopPhase::Setup));
        frame_loop.transition(LoopPhase::Running);
        assert!(!frame_loop.transition(LoopPhase::Running));
        assert!(!frame_loop.transition(LoopPhase::Setup));
        assert!(frame_loop.is_running());
    }

    #[test]
    fn test_frames_only_counted_while_running() {
        let mut frame_loop = FrameLoop::new();
        frame_loop.record_frame();
        assert_eq!(frame_loop.frame_count(), 0);

        frame_loop.transition(LoopPhase::Running);
        for _ in 0..10 {
            frame_loop.record_frame();
        }
        assert_eq!(frame_loop.frame_count(), 10);

        frame_loop.transition(LoopPhase::ShuttingDown);
        frame_loop.record_frame();
        assert_eq!(frame_loop.frame_count(), 10);
    }
}
