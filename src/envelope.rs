//! Parameter automation curves.
//!
//! An [`Envelope`] describes how a parameter (gain or frequency) moves over a
//! tone's lifetime. Times are seconds relative to the tone's start.
//!
//! The curve semantics follow the usual audio-parameter automation model:
//!
//! - [`Automation::Set`] holds the previous value until its time, then jumps.
//! - [`Automation::Linear`] ramps linearly from the previous event.
//! - [`Automation::Exponential`] ramps geometrically from the previous event.
//!   If the previous value is zero or has the opposite sign, the previous
//!   value holds until the ramp's end time.
//!
//! After the last event the final value holds forever.

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

/// A single automation event.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Automation {
    Set { value: f32, at: f64 },
    Linear { value: f32, at: f64 },
    Exponential { value: f32, at: f64 },
}

impl Automation {
    #[inline]
    pub fn value(&self) -> f32 {
        match *self {
            Automation::Set { value, .. }
            | Automation::Linear { value, .. }
            | Automation::Exponential { value, .. } => value,
        }
    }

    #[inline]
    pub fn at(&self) -> f64 {
        match *self {
            Automation::Set { at, .. }
            | Automation::Linear { at, .. }
            | Automation::Exponential { at, .. } => at,
        }
    }
}

/// A time-ordered list of automation events with a default starting value.
///
/// ```
/// use ambiance::Envelope;
///
/// // Fade in over half a second, then decay towards silence by 3s.
/// let env = Envelope::starting_at(0.0)
///     .linear_to(0.1, 0.5)
///     .exponential_to(0.0001, 3.0);
///
/// assert!((env.value_at(0.25) - 0.05).abs() < 1e-6);
/// assert!((env.peak() - 0.1).abs() < 1e-6);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    default: f32,
    events: Vec<Automation>,
}

impl Envelope {
    /// A parameter that never moves.
    pub fn constant(value: f32) -> Self {
        Self {
            default: value,
            events: Vec::new(),
        }
    }

    /// Start with an explicit value set at `t = 0`.
    pub fn starting_at(value: f32) -> Self {
        Self::constant(value).set(value, 0.0)
    }

    /// Jump to `value` at time `at`.
    pub fn set(self, value: f32, at: f64) -> Self {
        self.push(|at| Automation::Set { value, at }, at)
    }

    /// Ramp linearly to `value`, arriving at time `at`.
    pub fn linear_to(self, value: f32, at: f64) -> Self {
        self.push(|at| Automation::Linear { value, at }, at)
    }

    /// Ramp exponentially to `value`, arriving at time `at`.
    pub fn exponential_to(self, value: f32, at: f64) -> Self {
        self.push(|at| Automation::Exponential { value, at }, at)
    }

    // Events never go back in time; a late insert is pinned to the last event.
    fn push(mut self, make: impl FnOnce(f64) -> Automation, at: f64) -> Self {
        let floor = self.events.last().map_or(0.0, Automation::at);
        self.events.push(make(at.max(floor)));
        self
    }

    #[inline]
    pub fn events(&self) -> &[Automation] {
        &self.events
    }

    /// Time of the last automation event (0.0 for a constant envelope).
    pub fn end_time(&self) -> f64 {
        self.events.last().map_or(0.0, Automation::at)
    }

    /// The largest value the curve ever reaches.
    ///
    /// Every segment is monotonic, so the maximum sits on an event value.
    pub fn peak(&self) -> f32 {
        self.events
            .iter()
            .map(Automation::value)
            .fold(self.default, f32::max)
    }

    /// Evaluate the curve at `t` seconds.
    pub fn value_at(&self, t: f64) -> f32 {
        let mut prev_t = 0.0;
        let mut prev_v = self.default;

        for event in &self.events {
            let at = event.at();
            if t < at {
                // prev_t <= t < at, so the span is never zero here
                let progress = (t - prev_t) / (at - prev_t);
                return match *event {
                    Automation::Set { .. } => prev_v,
                    Automation::Linear { value, .. } => {
                        prev_v + (value - prev_v) * progress as f32
                    }
                    Automation::Exponential { value, .. } => {
                        if prev_v == 0.0 || (prev_v > 0.0) != (value > 0.0) {
                            prev_v
                        } else {
                            prev_v * (value / prev_v).powf(progress as f32)
                        }
                    }
                };
            }
            prev_t = at;
            prev_v = event.value();
        }

        prev_v
    }
}
