//! Per-run timing state and frame math
//!
//! [`RunState`] holds everything that changes while a count-up animates.
//! Its methods are pure state transitions; scheduling and display are left
//! to the engine that owns it.

use crate::config::AnimationConfig;
use crate::scheduler::FrameHandle;

/// Mutable state of the current run
#[derive(Clone, Debug, PartialEq)]
pub struct RunState {
    pub start_value: f64,
    /// Target of the current phase (an intermediate value during a split)
    pub end_value: f64,
    /// True target while the first phase of a smart-easing split runs
    pub final_end_value: Option<f64>,
    /// Last computed and displayed value
    pub frame_value: f64,
    /// Timestamp of the first tick of the current phase; `None` until anchored
    pub start_timestamp: Option<f64>,
    /// Working duration of the current phase
    pub duration_ms: f64,
    pub remaining_ms: f64,
    pub counting_down: bool,
    /// Easing in effect for the current phase
    pub use_easing: bool,
    pub paused: bool,
    pub pending_frame: Option<FrameHandle>,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            start_value: 0.0,
            end_value: 0.0,
            final_end_value: None,
            frame_value: 0.0,
            start_timestamp: None,
            duration_ms: 0.0,
            remaining_ms: 0.0,
            counting_down: false,
            use_easing: true,
            paused: true,
            pending_frame: None,
        }
    }
}

impl RunState {
    /// Restore the configured duration and drop the timing anchor
    pub fn reset_duration(&mut self, config: &AnimationConfig) {
        self.start_timestamp = None;
        self.duration_ms = config.duration_ms();
        self.remaining_ms = self.duration_ms;
    }

    /// Whether the run is in the first phase of a smart-easing split
    #[inline]
    pub fn is_split(&self) -> bool {
        self.final_end_value.is_some()
    }

    /// Collapse a split back onto its true target
    pub fn fold_split(&mut self) {
        if let Some(end) = self.final_end_value.take() {
            self.end_value = end;
        }
    }

    /// Decide direction and whether to split the run.
    ///
    /// Distances above the threshold run linearly to a point `amount` short
    /// of the true target in half the working duration; the remainder is
    /// settled in a single eased phase once that point is reached. A
    /// distance no longer than `amount` is never split, so phase 1 always
    /// moves toward the target.
    pub fn determine_direction_and_smart_easing(&mut self, config: &AnimationConfig) {
        let end = self.final_end_value.unwrap_or(self.end_value);
        self.counting_down = self.start_value > end;

        let distance = (end - self.start_value).abs();
        let amount = config.smart_easing_amount.max(0.0);
        if distance > config.smart_easing_threshold && distance > amount {
            self.final_end_value = Some(end);
            let up = if self.counting_down { 1.0 } else { -1.0 };
            self.end_value = end + up * amount;
            self.duration_ms /= 2.0;
        } else {
            self.end_value = end;
            self.final_end_value = None;
        }

        self.use_easing = !self.is_split() && config.use_easing;
    }

    /// Plan the settle after phase 1 as one phase onto `end_value`, keeping
    /// the working duration
    pub fn plan_settle(&mut self, config: &AnimationConfig) {
        self.final_end_value = None;
        self.counting_down = self.start_value > self.end_value;
        self.use_easing = config.use_easing;
    }

    /// Compute the frame value at `timestamp`, anchoring the run on its first
    /// tick. Returns the elapsed time of the current phase.
    pub fn advance(&mut self, config: &AnimationConfig, timestamp: f64) -> f64 {
        let anchor = *self.start_timestamp.get_or_insert(timestamp);
        let elapsed = timestamp - anchor;
        self.remaining_ms = self.duration_ms - elapsed;

        let value = self.sample(config, elapsed);
        let value = if self.counting_down {
            value.max(self.end_value)
        } else {
            value.min(self.end_value)
        };
        self.frame_value = config.round(value);
        elapsed
    }

    /// Unclamped value `elapsed` milliseconds into the current phase
    fn sample(&self, config: &AnimationConfig, elapsed: f64) -> f64 {
        let (start, end, duration) = (self.start_value, self.end_value, self.duration_ms);
        if duration <= 0.0 {
            return end;
        }

        if self.use_easing {
            if self.counting_down {
                start - config.easing.ease(elapsed, 0.0, start - end, duration)
            } else {
                config.easing.ease(elapsed, start, end - start, duration)
            }
        } else if self.counting_down {
            start - (start - end) * (elapsed / duration)
        } else {
            start + (end - start) * (elapsed / duration)
        }
    }
}
