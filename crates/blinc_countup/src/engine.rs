//! Count-up engine
//!
//! [`CountUp`] is the frame-driven state machine:
//!
//! ```text
//! Idle --start--> Running --pause--> Paused --resume--> Running
//!                 Running --last frame--> Completed
//! any --reset--> Idle
//! ```
//!
//! Runs whose distance exceeds the smart-easing threshold are split in two:
//! a linear run to a point short of the target in half the duration, then an
//! eased settle onto the target. Every control operation cancels the
//! outstanding frame before scheduling another, so at most one tick chain
//! drives the run state.

use tracing::{debug, trace, warn};

use crate::config::{parse_value, AnimationConfig, CountUpDefaults, CountUpOptions, RawValue};
use crate::display::{DisplayTarget, TargetRef, TargetScope};
use crate::error::{CountUpError, Result};
use crate::run::RunState;
use crate::scheduler::{FrameHandle, FrameScheduler, FrameSource};

/// Callback invoked when a run finishes naturally
pub type CompletionCallback = Box<dyn FnMut() + Send>;

/// Lifecycle of a count-up engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountUpState {
    /// Configured (or reset) and not animating
    Idle,
    Running,
    Paused,
    /// Finished naturally; only a fresh start, retarget or reset moves on
    Completed,
}

/// Animates one displayed number toward a target value
pub struct CountUp<T, S> {
    defaults: CountUpDefaults,
    scope: Option<Box<dyn TargetScope<T>>>,
    default_target: Option<T>,
    target: Option<T>,
    scheduler: S,
    config: Option<AnimationConfig>,
    run: RunState,
    state: CountUpState,
    error: Option<CountUpError>,
    on_complete: Option<CompletionCallback>,
}

impl<T, S> CountUp<T, S>
where
    T: DisplayTarget + Clone,
    S: FrameScheduler,
{
    pub fn new(scheduler: S) -> Self {
        Self {
            defaults: CountUpDefaults::default(),
            scope: None,
            default_target: None,
            target: None,
            scheduler,
            config: None,
            run: RunState::default(),
            state: CountUpState::Idle,
            error: None,
            on_complete: None,
        }
    }

    /// Replace the instance defaults used by later configure calls
    pub fn with_defaults(mut self, defaults: CountUpDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Bind the target used when a configure call names none
    pub fn with_target(mut self, target: T) -> Self {
        self.default_target = Some(target);
        self
    }

    /// Scope that [`TargetRef::Path`] lookups resolve against
    pub fn with_scope<C: TargetScope<T> + 'static>(mut self, scope: C) -> Self {
        self.scope = Some(Box::new(scope));
        self
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    /// Resolve options and bind a target.
    ///
    /// If the target already shows a number, counting continues from it;
    /// otherwise from the configured start value. Invalid input or a missing
    /// target is recorded in [`CountUp::error`] and leaves the engine inert
    /// until the next configure call.
    pub fn configure(
        &mut self,
        end_value: Option<RawValue>,
        target: Option<TargetRef<T>>,
        overrides: CountUpOptions,
    ) -> &mut Self {
        let target = self.resolve_target(target);
        let displayed = target.as_ref().ok().and_then(|t| t.text());
        self.apply_configuration(end_value, target, &overrides, displayed.as_deref());
        self
    }

    /// Like [`CountUp::configure`], with the currently displayed text given
    /// by the caller instead of read from the target
    pub fn configure_with_text(
        &mut self,
        end_value: Option<RawValue>,
        target: Option<TargetRef<T>>,
        overrides: CountUpOptions,
        displayed_text: Option<&str>,
    ) -> &mut Self {
        let target = self.resolve_target(target);
        self.apply_configuration(end_value, target, &overrides, displayed_text);
        self
    }

    fn resolve_target(&self, target: Option<TargetRef<T>>) -> Result<T> {
        match target {
            Some(TargetRef::Handle(target)) => Ok(target),
            Some(TargetRef::Path(path)) => {
                match self.scope.as_ref().and_then(|scope| scope.find(&path)) {
                    Some(target) => Ok(target),
                    None => Err(CountUpError::TargetNotFound { path }),
                }
            }
            None => self.default_target.clone().ok_or(CountUpError::NoTarget),
        }
    }

    fn apply_configuration(
        &mut self,
        end_value: Option<RawValue>,
        target: Result<T>,
        overrides: &CountUpOptions,
        displayed_text: Option<&str>,
    ) {
        self.cancel_pending();
        self.error = None;

        let config = AnimationConfig::resolve(&self.defaults, overrides);

        let shown = displayed_text.and_then(|text| config.parse_displayed(text));
        let start = match shown {
            Some(value) => Some(value),
            None => self.validate_value(&config.start_value),
        };
        let end_raw = end_value.unwrap_or(RawValue::Number(self.defaults.end_value));
        let end = self.validate_value(&end_raw);

        self.run = RunState {
            start_value: start.unwrap_or_default(),
            end_value: end.unwrap_or_default(),
            frame_value: start.unwrap_or_default(),
            ..RunState::default()
        };
        self.run.reset_duration(&config);
        self.state = CountUpState::Idle;

        debug!(
            start = self.run.start_value,
            end = self.run.end_value,
            duration_ms = self.run.duration_ms,
            decimals = config.decimal_places(),
            "count-up configured"
        );
        self.config = Some(config);

        match target {
            Ok(target) => {
                self.target = Some(target);
                let start = self.run.start_value;
                self.emit(start);
            }
            Err(err) => {
                self.target = None;
                self.record_error(err);
            }
        }
    }

    fn ensure_configured(&mut self) {
        if self.config.is_none() {
            self.configure(None, None, CountUpOptions::default());
        }
    }

    /// Coerce `raw` to a finite number, recording an error if it is not one
    pub fn validate_value(&mut self, raw: &RawValue) -> Option<f64> {
        match parse_value(raw) {
            Ok(value) => Some(value),
            Err(err) => {
                self.record_error(err);
                None
            }
        }
    }

    fn record_error(&mut self, err: CountUpError) {
        warn!(error = %err, "count-up error");
        self.error = Some(err);
    }

    // ========================================================================
    // Control
    // ========================================================================

    /// Start counting toward the configured end value
    pub fn start(&mut self) -> &mut Self {
        self.begin(None)
    }

    /// Start counting and call `on_complete` when the run finishes
    pub fn start_with<F: FnMut() + Send + 'static>(&mut self, on_complete: F) -> &mut Self {
        self.begin(Some(Box::new(on_complete)))
    }

    fn begin(&mut self, on_complete: Option<CompletionCallback>) -> &mut Self {
        self.ensure_configured();
        if let Some(err) = &self.error {
            warn!(error = %err, "count-up not started");
            return self;
        }
        self.on_complete = on_complete;
        self.cancel_pending();

        let Some(config) = self.config.as_ref() else {
            return self;
        };
        self.run.fold_split();
        self.run.reset_duration(config);
        if self.run.duration_ms <= 0.0 {
            self.finish_immediately();
            return self;
        }

        self.run.determine_direction_and_smart_easing(config);
        debug!(
            from = self.run.start_value,
            to = self.run.end_value,
            settle_to = ?self.run.final_end_value,
            duration_ms = self.run.duration_ms,
            "count-up started"
        );
        self.run.paused = false;
        self.state = CountUpState::Running;
        self.schedule();
        self
    }

    /// Pause a running animation, or resume a paused one.
    ///
    /// Resuming continues from the displayed value with whatever time was
    /// left, and plans smart easing again against the remaining distance.
    pub fn pause_resume(&mut self) -> &mut Self {
        match self.state {
            CountUpState::Running => {
                self.cancel_pending();
                self.run.paused = true;
                self.state = CountUpState::Paused;
                debug!(
                    value = self.run.frame_value,
                    remaining_ms = self.run.remaining_ms,
                    "count-up paused"
                );
            }
            CountUpState::Idle | CountUpState::Paused => self.resume(),
            CountUpState::Completed => debug!("count-up already completed"),
        }
        self
    }

    fn resume(&mut self) {
        self.ensure_configured();
        let Some(config) = self.config.as_ref() else {
            return;
        };

        self.run.start_timestamp = None;
        self.run.duration_ms = self.run.remaining_ms;
        self.run.start_value = self.run.frame_value;
        if self.run.duration_ms <= 0.0 {
            self.finish_immediately();
            return;
        }

        self.run.determine_direction_and_smart_easing(config);
        debug!(
            from = self.run.start_value,
            to = self.run.end_value,
            duration_ms = self.run.duration_ms,
            "count-up resumed"
        );
        self.run.paused = false;
        self.state = CountUpState::Running;
        self.schedule();
    }

    /// Stop and show the configured start value again
    pub fn reset(&mut self) -> &mut Self {
        self.cancel_pending();
        self.run.paused = true;
        self.state = CountUpState::Idle;

        let Some(config) = self.config.as_ref() else {
            return self;
        };
        self.run.reset_duration(config);
        self.run.fold_split();

        let raw = config.start_value.clone();
        let start = self.validate_value(&raw).unwrap_or_default();
        self.run.start_value = start;
        self.run.frame_value = start;
        debug!(start, "count-up reset");
        self.emit(start);
        self
    }

    /// Count from the displayed value toward `new_end`.
    ///
    /// Any split in progress is abandoned and the full configured duration
    /// applies. A target equal to the displayed value schedules nothing and
    /// does not count as a natural finish. An invalid value is recorded and
    /// leaves the current animation alone; the next valid one clears it.
    pub fn retarget(&mut self, new_end: impl Into<RawValue>) -> &mut Self {
        self.ensure_configured();
        let raw = new_end.into();
        let Some(end) = self.validate_value(&raw) else {
            return self;
        };
        if matches!(self.error, Some(CountUpError::InvalidValue { .. })) {
            self.error = None;
        }
        self.continue_to(end, false);
        self
    }

    /// Shared by caller retargets and the settle phase of a split run
    fn continue_to(&mut self, end: f64, settling: bool) {
        self.cancel_pending();
        self.run.start_timestamp = None;
        if !settling {
            self.run.final_end_value = None;
        }
        self.run.end_value = end;

        if end == self.run.frame_value {
            self.run.final_end_value = None;
            if self.state == CountUpState::Running {
                if settling {
                    self.complete();
                } else {
                    self.state = CountUpState::Completed;
                    debug!(value = end, "count-up already on target");
                }
            }
            return;
        }

        let Some(config) = self.config.as_ref() else {
            return;
        };
        self.run.start_value = self.run.frame_value;
        if settling {
            self.run.remaining_ms = self.run.duration_ms;
            self.run.plan_settle(config);
        } else {
            self.run.reset_duration(config);
            self.run.determine_direction_and_smart_easing(config);
        }
        debug!(
            from = self.run.start_value,
            to = self.run.end_value,
            duration_ms = self.run.duration_ms,
            settling,
            "count-up retargeted"
        );
        self.run.paused = false;
        self.state = CountUpState::Running;
        self.schedule();
    }

    // ========================================================================
    // Frames
    // ========================================================================

    /// Deliver a frame tick.
    ///
    /// Ticks for any handle other than the outstanding one are ignored, so a
    /// cancelled request can never touch the run.
    pub fn on_frame(&mut self, handle: FrameHandle, timestamp_ms: f64) {
        if self.run.pending_frame != Some(handle) {
            trace!(?handle, "ignoring stale frame");
            return;
        }
        self.run.pending_frame = None;

        let Some(config) = self.config.as_ref() else {
            return;
        };
        let elapsed = self.run.advance(config, timestamp_ms);
        let value = self.run.frame_value;
        trace!(timestamp_ms, elapsed, value, "count-up frame");
        self.emit(value);

        if elapsed < self.run.duration_ms {
            self.schedule();
        } else if let Some(final_end) = self.run.final_end_value {
            self.continue_to(final_end, true);
        } else {
            self.complete();
        }
    }

    fn schedule(&mut self) {
        if let Some(handle) = self.run.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.run.pending_frame = Some(self.scheduler.request_frame());
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.run.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    fn finish_immediately(&mut self) {
        self.run.fold_split();
        let end = self.run.end_value;
        self.run.frame_value = end;
        self.state = CountUpState::Completed;
        debug!(end, "count-up jumped to end value");
        self.emit(end);
    }

    fn complete(&mut self) {
        self.cancel_pending();
        self.state = CountUpState::Completed;
        debug!(value = self.run.frame_value, "count-up completed");
        if let Some(on_complete) = self.on_complete.as_mut() {
            on_complete();
        }
    }

    fn emit(&mut self, value: f64) {
        let (Some(config), Some(target)) = (self.config.as_ref(), self.target.as_mut()) else {
            return;
        };
        target.set_text(&config.format_value(value));
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> CountUpState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.run.paused
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// The last computed frame value
    pub fn value(&self) -> f64 {
        self.run.frame_value
    }

    /// The error recorded by the last configure or control call, if any
    pub fn error(&self) -> Option<&CountUpError> {
        self.error.as_ref()
    }

    pub fn config(&self) -> Option<&AnimationConfig> {
        self.config.as_ref()
    }

    pub fn run_state(&self) -> &RunState {
        &self.run
    }

    pub fn defaults(&self) -> &CountUpDefaults {
        &self.defaults
    }

    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

impl<T, S> CountUp<T, S>
where
    T: DisplayTarget + Clone,
    S: FrameSource,
{
    /// Deliver every tick due at this display refresh; returns how many fired
    pub fn advance(&mut self, timestamp_ms: f64) -> usize {
        let due = self.scheduler.take_due();
        for &handle in &due {
            self.on_frame(handle, timestamp_ms);
        }
        due.len()
    }
}
