//! Wait between two ticks of a session.

use std::time::Duration;

use datalake_settings::CadenceMode;
use tokio::time::{self, Interval, MissedTickBehavior};

/// Paces one session's tick loop.
#[derive(Debug)]
pub enum Ticker {
    /// Sleep a full period after each cycle.
    FixedDelay(Duration),
    /// Wake on period boundaries; a late cycle pushes the schedule back.
    Aligned(Interval),
}

impl Ticker {
    /// Build a ticker for `mode`. The first cycle is not delayed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(mode: CadenceMode, period: Duration) -> Self {
        match mode {
            CadenceMode::FixedDelay => Self::FixedDelay(period),
            CadenceMode::Aligned => {
                let mut interval = time::interval_at(time::Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                Self::Aligned(interval)
            }
        }
    }

    /// Wait until the next cycle may start.
    pub async fn wait(&mut self) {
        match self {
            Self::FixedDelay(period) => time::sleep(*period).await,
            Self::Aligned(interval) => {
                let _ = interval.tick().await;
            }
        }
    }
}
