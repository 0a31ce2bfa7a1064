//! Repetition tracking from elapsed playback time

/// Count the repetitions that have started at `elapsed_ms`
///
/// A boundary counts once its start time (seconds) is `<= elapsed_ms / 1000`.
/// Counting rather than searching keeps the result monotonic in `elapsed_ms`
/// even for a malformed, unsorted marker list.
pub fn repetition_at(elapsed_ms: u64, boundaries: &[f64]) -> usize {
    let elapsed_secs = elapsed_ms as f64 / 1000.0;
    boundaries
        .iter()
        .filter(|&&start| start <= elapsed_secs)
        .count()
}

/// Cached "current repetition" for the loaded track
///
/// Always recomputed from a position; never advanced on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepetitionTracker {
    current: usize,
}

impl RepetitionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute from a position
    ///
    /// Returns `true` if the repetition index changed.
    pub fn update(&mut self, elapsed_ms: u64, boundaries: &[f64]) -> bool {
        let next = repetition_at(elapsed_ms, boundaries);
        let changed = next != self.current;
        self.current = next;
        changed
    }

    /// Back to repetition 0 (track load / stop)
    pub fn reset(&mut self) {
        self.current = 0;
    }

    pub fn current(&self) -> usize {
        self.current
    }
}
