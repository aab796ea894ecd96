//! Easing functions for count-up animations
//!
//! Every easing is evaluated in the `(t, b, c, d)` form: elapsed time `t`,
//! base value `b`, signed change `c` and total duration `d`, all in the same
//! time unit.

use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Caller-supplied easing in `(t, b, c, d)` form
#[derive(Clone)]
pub struct EasingFn(Arc<dyn Fn(f64, f64, f64, f64) -> f64 + Send + Sync>);

impl EasingFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(f64, f64, f64, f64) -> f64 + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    #[inline]
    pub fn call(&self, t: f64, b: f64, c: f64, d: f64) -> f64 {
        (self.0)(t, b, c, d)
    }
}

impl fmt::Debug for EasingFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EasingFn(..)")
    }
}

/// Easing function type
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    /// Exponential ease-out, normalized to land exactly on `b + c` at `t = d`
    #[default]
    EaseOutExpo,
    Linear,
    EaseOutQuad,
    EaseOutCubic,
    EaseOutQuart,
    EaseInOutCubic,
    #[serde(skip)]
    Custom(EasingFn),
}

impl Easing {
    /// Wrap a custom `(t, b, c, d)` easing
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f64, f64, f64, f64) -> f64 + Send + Sync + 'static,
    {
        Easing::Custom(EasingFn::new(f))
    }

    /// Evaluate the easing at elapsed time `t` of `d`, moving from `b` by `c`.
    ///
    /// `EaseOutExpo` and custom easings are not clamped, so `t > d` may
    /// overshoot; callers clamp the result against their target.
    pub fn ease(&self, t: f64, b: f64, c: f64, d: f64) -> f64 {
        match self {
            Easing::EaseOutExpo => ease_out_expo(t, b, c, d),
            Easing::Custom(f) => f.call(t, b, c, d),
            _ => {
                let progress = if d > 0.0 { (t / d).clamp(0.0, 1.0) } else { 1.0 };
                b + c * self.curve(progress)
            }
        }
    }

    /// Apply the curve to a normalized progress value (0.0 to 1.0)
    pub fn curve(&self, p: f64) -> f64 {
        match self {
            Easing::Linear => p,
            Easing::EaseOutExpo => ease_out_expo(p, 0.0, 1.0, 1.0),
            Easing::EaseOutQuad => 1.0 - (1.0 - p) * (1.0 - p),
            Easing::EaseOutCubic => 1.0 - (1.0 - p).powi(3),
            Easing::EaseOutQuart => 1.0 - (1.0 - p).powi(4),
            Easing::EaseInOutCubic => {
                if p < 0.5 {
                    4.0 * p * p * p
                } else {
                    1.0 - (-2.0 * p + 2.0).powi(3) / 2.0
                }
            }
            Easing::Custom(f) => f.call(p, 0.0, 1.0, 1.0),
        }
    }
}

/// `b + c * (1 - 2^(-10t/d)) * 1024/1023`
///
/// The raw curve tops out at `1 - 2^-10` when `t = d`; the `1024/1023`
/// factor stretches it so the end point is exactly `b + c`.
#[inline]
pub fn ease_out_expo(t: f64, b: f64, c: f64, d: f64) -> f64 {
    c * (1.0 - 2f64.powf(-10.0 * t / d)) * 1024.0 / 1023.0 + b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expo_hits_endpoints() {
        assert_eq!(ease_out_expo(0.0, 10.0, 90.0, 2000.0), 10.0);
        assert!((ease_out_expo(2000.0, 10.0, 90.0, 2000.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn expo_front_loads_motion() {
        let half = ease_out_expo(1000.0, 0.0, 1000.0, 2000.0);
        assert!(half > 950.0, "expected most of the change by halfway, got {half}");
    }

    #[test]
    fn curves_are_monotonic() {
        for easing in [
            Easing::EaseOutExpo,
            Easing::Linear,
            Easing::EaseOutQuad,
            Easing::EaseOutCubic,
            Easing::EaseOutQuart,
            Easing::EaseInOutCubic,
        ] {
            let mut last = easing.curve(0.0);
            for step in 1..=100 {
                let v = easing.curve(step as f64 / 100.0);
                assert!(v >= last - 1e-12, "{easing:?} decreased at step {step}");
                last = v;
            }
            assert!((last - 1.0).abs() < 1e-9, "{easing:?} ended at {last}");
        }
    }

    #[test]
    fn custom_easing_receives_raw_arguments() {
        let easing = Easing::custom(|t, b, c, d| b + c * (t / d) * (t / d));
        assert_eq!(easing.ease(1.0, 5.0, 8.0, 2.0), 7.0);
    }

    #[test]
    fn easing_deserializes_by_name() {
        #[derive(Deserialize)]
        struct Holder {
            easing: Easing,
        }
        let holder: Holder = toml::from_str(r#"easing = "ease-out-cubic""#).unwrap();
        assert!(matches!(holder.easing, Easing::EaseOutCubic));
    }
}
