//! Position sampling and manual-seek classification.
//!
//! The tracker compares each playback-time sample against the previous one.
//! A delta larger than the configured threshold cannot come from normal
//! playback drift at sane rates, so it is classified as a user seek. The
//! engine syncs its own seeks into the tracker ([`PositionTracker::sync`])
//! so they are never misread as manual.

/// Classification of one playback-time sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    /// First sample after a reset; nothing to compare against.
    Initial,
    /// Natural progression from the previous sample.
    Progress,
    /// Discontinuous jump attributed to the user.
    ManualSeek { from: f64, to: f64 },
}

#[derive(Debug)]
pub struct PositionTracker {
    threshold: f64,
    last: Option<f64>,
}

impl PositionTracker {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            last: None,
        }
    }

    /// Classify `t` against the previous sample and remember it.
    pub fn observe(&mut self, t: f64) -> Sample {
        let sample = match self.last {
            None => Sample::Initial,
            Some(prev) if (t - prev).abs() > self.threshold => {
                Sample::ManualSeek { from: prev, to: t }
            }
            Some(_) => Sample::Progress,
        };
        self.last = Some(t);
        sample
    }

    /// Record an engine-initiated position change so the next observation
    /// is measured from it.
    pub fn sync(&mut self, t: f64) {
        self.last = Some(t);
    }

    /// Forget the previous sample; the next observation is `Initial`.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
