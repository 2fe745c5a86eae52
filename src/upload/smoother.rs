//! Displayed-progress smoothing.
//!
//! The backend reports progress in coarse, infrequent jumps. Instead of
//! snapping the bar to each report, the renderer keeps a displayed value that
//! walks toward the latest target one point per tick, so the bar advances
//! continuously. The displayed value never moves backward; if the server's
//! number regresses, the bar simply holds until the target catches up.

/// Pure smoothing state. The caller drives [`tick`](Self::tick) on a short
/// fixed cadence (about 20ms) and renders the returned value.
#[derive(Debug, Default)]
pub struct ProgressSmoother {
    displayed: u8,
    target: u8,
}

impl ProgressSmoother {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest authoritative percentage.
    pub fn set_target(&mut self, target: u8) {
        self.target = target.min(100);
    }

    pub fn target(&self) -> u8 {
        self.target
    }

    pub fn displayed(&self) -> u8 {
        self.displayed
    }

    /// Advance the displayed value one point toward the target.
    pub fn tick(&mut self) -> u8 {
        if self.displayed < self.target {
            self.displayed += 1;
        }
        self.displayed
    }

    /// True once the displayed value has caught up with the target.
    pub fn settled(&self) -> bool {
        self.displayed >= self.target
    }
}
