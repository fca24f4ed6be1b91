//! Worker lifecycle states
//!
//! A worker cycles `Idle → Fetching → Enriching → Recording → Expanding → Idle`
//! until the frontier is drained, then settles in `Done`.

use std::fmt;

/// Represents what a worker is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// Waiting for the next URL
    Idle,

    /// Page fetch in progress
    Fetching,

    /// Resolving IP and geolocation
    Enriching,

    /// Handing the record to the result sink
    Recording,

    /// Admitting extracted links to the frontier
    Expanding,

    /// No more work will be handed out
    Done,
}

impl WorkerState {
    /// Returns true if the worker holds an in-flight task in this state
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Fetching | Self::Enriching | Self::Recording | Self::Expanding
        )
    }

    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if moving from `self` to `next` is a legal step
    ///
    /// A failed fetch abandons the URL, so `Fetching → Idle` is allowed.
    pub fn can_transition_to(&self, next: WorkerState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Fetching)
                | (Self::Idle, Self::Done)
                | (Self::Fetching, Self::Enriching)
                | (Self::Fetching, Self::Idle)
                | (Self::Enriching, Self::Recording)
                | (Self::Recording, Self::Expanding)
                | (Self::Expanding, Self::Idle)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Enriching => "enriching",
            Self::Recording => "recording",
            Self::Expanding => "expanding",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_cycle() {
        let cycle = [
            WorkerState::Idle,
            WorkerState::Fetching,
            WorkerState::Enriching,
            WorkerState::Recording,
            WorkerState::Expanding,
            WorkerState::Idle,
        ];

        for pair in cycle.windows(2) {
            assert!(
                pair[0].can_transition_to(pair[1]),
                "{} -> {} should be legal",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_fetch_failure_returns_to_idle() {
        assert!(WorkerState::Fetching.can_transition_to(WorkerState::Idle));
    }

    #[test]
    fn test_done_only_from_idle() {
        assert!(WorkerState::Idle.can_transition_to(WorkerState::Done));
        assert!(!WorkerState::Fetching.can_transition_to(WorkerState::Done));
        assert!(!WorkerState::Expanding.can_transition_to(WorkerState::Done));
    }

    #[test]
    fn test_done_is_terminal() {
        assert!(WorkerState::Done.is_terminal());
        assert!(!WorkerState::Done.can_transition_to(WorkerState::Idle));
        assert!(!WorkerState::Done.can_transition_to(WorkerState::Fetching));
    }

    #[test]
    fn test_skipping_states_is_illegal() {
        assert!(!WorkerState::Idle.can_transition_to(WorkerState::Recording));
        assert!(!WorkerState::Fetching.can_transition_to(WorkerState::Expanding));
        assert!(!WorkerState::Enriching.can_transition_to(WorkerState::Idle));
    }

    #[test]
    fn test_is_busy() {
        assert!(!WorkerState::Idle.is_busy());
        assert!(WorkerState::Fetching.is_busy());
        assert!(WorkerState::Enriching.is_busy());
        assert!(WorkerState::Recording.is_busy());
        assert!(WorkerState::Expanding.is_busy());
        assert!(!WorkerState::Done.is_busy());
    }

    #[test]
    fn test_display() {
        assert_eq!(WorkerState::Enriching.to_string(), "enriching");
    }
}
