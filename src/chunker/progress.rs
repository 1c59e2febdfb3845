//! Termination guard for the chunking loop.
//!
//! Every iteration reports whether its boundary and its overlap step were
//! forced. The tracker moves through
//! `Normal -> StalledBoundary -> StalledOverlap -> Emergency`; `Emergency`
//! is terminal and tells the caller to abandon semantic chunking.

/// Consecutive forced overlap advances tolerated before giving up
pub const MAX_CONSECUTIVE_OVERLAP_STALLS: usize = 3;

/// Multiplier on the expected iteration count
pub const LOOP_CEILING_FACTOR: usize = 4;

const LOOP_CEILING_SLACK: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Normal,
    /// Last chunk end was forced at the window edge
    StalledBoundary,
    /// Last overlap step had to be pushed forward by one char
    StalledOverlap,
    Emergency(StallReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StallReason {
    LoopCeiling,
    RepeatedOverlapStall,
}

#[derive(Debug)]
pub struct ProgressTracker {
    state: Progress,
    iterations: usize,
    ceiling: usize,
    overlap_stalls: usize,
    last_boundary_forced: bool,
}

impl ProgressTracker {
    pub fn new(ceiling: usize) -> Self {
        Self {
            state: Progress::Normal,
            iterations: 0,
            ceiling,
            overlap_stalls: 0,
            last_boundary_forced: false,
        }
    }

    /// Ceiling for a text of `len` bytes cut into `window`-sized chunks
    pub fn ceiling_for(len: usize, window: usize, overlap: usize) -> usize {
        let nominal_step = window.saturating_sub(overlap).max(window / 4).max(1);
        (len / nominal_step + 1)
            .saturating_mul(LOOP_CEILING_FACTOR)
            .saturating_add(LOOP_CEILING_SLACK)
    }

    pub fn state(&self) -> Progress {
        self.state
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Count one loop iteration
    pub fn begin_iteration(&mut self) -> Progress {
        if matches!(self.state, Progress::Emergency(_)) {
            return self.state;
        }
        self.iterations += 1;
        if self.iterations > self.ceiling {
            self.state = Progress::Emergency(StallReason::LoopCeiling);
        }
        self.state
    }

    pub fn record_boundary(&mut self, forced: bool) -> Progress {
        if matches!(self.state, Progress::Emergency(_)) {
            return self.state;
        }
        self.last_boundary_forced = forced;
        if forced {
            self.state = Progress::StalledBoundary;
        }
        self.state
    }

    pub fn record_overlap(&mut self, forced: bool) -> Progress {
        if matches!(self.state, Progress::Emergency(_)) {
            return self.state;
        }
        if forced {
            self.overlap_stalls += 1;
            self.state = if self.overlap_stalls >= MAX_CONSECUTIVE_OVERLAP_STALLS {
                Progress::Emergency(StallReason::RepeatedOverlapStall)
            } else {
                Progress::StalledOverlap
            };
        } else {
            self.overlap_stalls = 0;
            self.state = if self.last_boundary_forced {
                Progress::StalledBoundary
            } else {
                Progress::Normal
            };
        }
        self.state
    }
}
