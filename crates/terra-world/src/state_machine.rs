use terra_core::types::ChunkCoord;

use crate::chunk_map::{SpatialIndex, LEAF_DEPTH};
use crate::planner::PositionPlanner;
use crate::viewpoint::ViewTransform;

/// Scheduler lifecycle.
///
/// ```text
///  Idle --attach--> Scanning --end of list--> Paused
///                      ^                        |
///                      +--------reset-----------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum SchedulerState {
    /// No viewpoint attached yet.
    #[default]
    Idle,
    /// Walking the candidate list.
    Scanning,
    /// Candidate list exhausted; waiting for a reset.
    Paused,
}

/// Result of one admission step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmitOutcome {
    /// Coordinate claimed; the caller must enqueue it.
    Queued(ChunkCoord),
    /// Coordinate already generated or reserved.
    Skipped(ChunkCoord),
    /// Cursor reached the end of the list; now Paused.
    Exhausted,
    /// No viewpoint attached.
    Idle,
}

/// Scan cursor and current transform. Only the admission thread steps it;
/// resets come from the viewpoint. Callers serialise access.
#[derive(Debug, Clone, Default)]
pub struct Admission {
    state: SchedulerState,
    cursor: usize,
    transform: ViewTransform,
}

impl Admission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    /// Idle → Scanning with the first transform. Later calls are no-ops and
    /// return false.
    pub fn attach(&mut self, transform: ViewTransform) -> bool {
        if self.state != SchedulerState::Idle {
            return false;
        }
        self.transform = transform;
        self.cursor = 0;
        self.state = SchedulerState::Scanning;
        true
    }

    /// Rewind to the nearest candidate, optionally under a new transform.
    /// Paused resumes scanning; Idle stays Idle.
    pub fn reset(&mut self, transform: Option<ViewTransform>) {
        if let Some(transform) = transform {
            self.transform = transform;
        }
        self.cursor = 0;
        if self.state == SchedulerState::Paused {
            self.state = SchedulerState::Scanning;
        }
    }

    /// Screen the candidate under the cursor and advance.
    pub fn step(&mut self, planner: &PositionPlanner, index: &dyn SpatialIndex) -> AdmitOutcome {
        match self.state {
            SchedulerState::Idle => return AdmitOutcome::Idle,
            SchedulerState::Paused => return AdmitOutcome::Exhausted,
            SchedulerState::Scanning => {}
        }
        let Some(offset) = planner.get(self.cursor) else {
            self.state = SchedulerState::Paused;
            return AdmitOutcome::Exhausted;
        };
        self.cursor += 1;

        let coord = self.transform.offset_to_chunk(offset);
        let populated = index
            .traverse(coord, LEAF_DEPTH)
            .is_some_and(|node| node.chunk.is_some());
        if !populated && index.claim(coord) {
            AdmitOutcome::Queued(coord)
        } else {
            AdmitOutcome::Skipped(coord)
        }
    }
}
