//! Per-tick generation of the demo variable set.

use std::borrow::Cow;

use rand::Rng;

use crate::variable::{Variable, VariableValue};

/// Values cycled through by `quoted-string`, indexed by `tick % 7`.
pub const QUOTED_VALUES: [&str; 7] = ["123", "true", "false", "456.789", "hello world", "0", ""];

/// Literal sent as the bare `string` variable.
pub const BARE_STRING: &str = "This is a string.";

/// Frequency multiplier applied to the tick before taking the sine.
pub const SINE_STEP: f64 = 0.1;

/// Inclusive upper bound of the `random` variable.
pub const RANDOM_MAX: i64 = 99;

/// Variable names in emission order.
pub const VARIABLE_NAMES: [&str; 7] = [
    "counter",
    "random",
    "sine",
    "boolean",
    "timestamp",
    "string",
    "quoted-string",
];

/// Name of the one-off status variable sent on connect.
pub const STATUS_NAME: &str = "connection-status";

/// Value of the status variable sent on connect.
pub const STATUS_CONNECTED: &str = "connected";

/// The status message announcing a successful connection.
pub fn connected_status() -> Variable {
    Variable::new(STATUS_NAME, VariableValue::String(Cow::Borrowed(STATUS_CONNECTED)))
}

/// `sin(tick * 0.1)`.
#[allow(clippy::cast_precision_loss)]
pub fn sine_at(tick: u64) -> f64 {
    (tick as f64 * SINE_STEP).sin()
}

/// `true` on even ticks.
pub fn is_even_tick(tick: u64) -> bool {
    tick % 2 == 0
}

/// Entry of [`QUOTED_VALUES`] selected for `tick`.
#[allow(clippy::cast_possible_truncation)]
pub fn quoted_value_at(tick: u64) -> &'static str {
    QUOTED_VALUES[(tick % QUOTED_VALUES.len() as u64) as usize]
}

/// Builds the fixed variable set for one tick.
///
/// The sampler holds only its randomness source; tick and wall-clock time are
/// passed in so callers own all per-session state.
#[derive(Debug)]
pub struct TickSampler<R> {
    rng: R,
}

impl<R: Rng> TickSampler<R> {
    /// Create a sampler drawing `random` values from `rng`.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Produce the seven variables for `tick`, in emission order.
    pub fn sample(&mut self, tick: u64, timestamp_ms: i64) -> [Variable; 7] {
        let counter = i64::try_from(tick).unwrap_or(i64::MAX);
        [
            Variable::new("counter", counter),
            Variable::new("random", self.rng.random_range(0..=RANDOM_MAX)),
            Variable::new("sine", sine_at(tick)),
            Variable::new("boolean", is_even_tick(tick)),
            Variable::new("timestamp", timestamp_ms),
            Variable::new("string", VariableValue::String(Cow::Borrowed(BARE_STRING))),
            Variable::new(
                "quoted-string",
                VariableValue::QuotedString(Cow::Borrowed(quoted_value_at(tick))),
            ),
        ]
    }
}

/// Wall-clock milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
