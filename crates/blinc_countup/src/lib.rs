//! Blinc Count-Up Labels
//!
//! Frame-driven animation of a single displayed number.
//!
//! # Features
//!
//! - **Formatting**: grouping and decimal separators, fixed decimals,
//!   prefix/suffix and numeral glyph substitution
//! - **Easing**: exponential ease-out by default, or any `(t, b, c, d)` curve
//! - **Smart Easing**: large jumps run linearly, then ease onto the target
//! - **Interruptible**: pause, resume, reset, or retarget mid-flight without
//!   the displayed value jumping
//!
//! The engine renders nothing. A host delivers frame ticks and owns the text
//! element that receives each formatted value.
//!
//! # Example
//!
//! ```rust
//! use blinc_countup::{CountUp, CountUpOptions, FrameQueue, Label};
//!
//! let label = Label::shared();
//! let mut counter = CountUp::new(FrameQueue::new()).with_target(label.clone());
//! counter
//!     .configure(Some(900.into()), None, CountUpOptions::new().use_easing(false))
//!     .start();
//!
//! // One tick per display refresh, timestamps in milliseconds
//! counter.advance(0.0);
//! counter.advance(1000.0);
//! assert_eq!(label.borrow().as_str(), "450");
//! ```

pub mod config;
pub mod display;
pub mod easing;
pub mod engine;
pub mod error;
pub mod format;
pub mod run;
pub mod scheduler;

pub use config::{parse_value, AnimationConfig, CountUpDefaults, CountUpOptions, RawValue};
pub use display::{DisplayTarget, Label, SharedLabel, TargetRef, TargetRegistry, TargetScope};
pub use easing::{Easing, EasingFn};
pub use engine::{CompletionCallback, CountUp, CountUpState};
pub use error::{CountUpError, Result};
pub use format::{CustomFormatter, NumberFormat};
pub use run::RunState;
pub use scheduler::{FrameHandle, FrameQueue, FrameScheduler, FrameSource};
