// Run state machine for one pipeline invocation.
//
// Idle -> Extracting -> (ExtractFailed | Extracted) -> Generating
//      -> (GenerateFailed | Completed)
//
// A run is single-shot: no state is re-entered and the three terminal states
// have no outgoing transitions. Callers never see these states; they are
// tracked for logging and to catch coordinator bugs in debug builds.

use std::fmt;
use std::time::Instant;

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Extracting,
    ExtractFailed,
    Extracted,
    Generating,
    GenerateFailed,
    Completed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::ExtractFailed | Self::GenerateFailed | Self::Completed
        )
    }

    /// Whether `next` directly follows `self`.
    pub fn can_advance_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Idle, Extracting)
                | (Extracting, ExtractFailed)
                | (Extracting, Extracted)
                | (Extracted, Generating)
                | (Generating, GenerateFailed)
                | (Generating, Completed)
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Extracting => "extracting",
            Self::ExtractFailed => "extract_failed",
            Self::Extracted => "extracted",
            Self::Generating => "generating",
            Self::GenerateFailed => "generate_failed",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Tracks one run's position in the state machine.
#[derive(Debug)]
pub struct RunTracker {
    state: RunState,
    started: Instant,
}

impl Default for RunTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RunTracker {
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
            started: Instant::now(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Move to `next`, logging the transition.
    pub fn advance(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal run transition {} -> {}",
            self.state,
            next
        );
        debug!(
            from = %self.state,
            to = %next,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "Pipeline state"
        );
        self.state = next;
    }
}
