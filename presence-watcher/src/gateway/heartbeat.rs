//! Heartbeat scheduling and liveness detection.

use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Schedules liveness pulses and tracks whether the previous pulse was
/// acknowledged. A missed acknowledgement is the only liveness signal this
/// protocol offers, so the check happens before each send rather than on a
/// separate timeout.
///
/// The monitor is re-armed exactly once per completed handshake (the
/// interval may change between sessions) and disarmed before every
/// reconnect so a pulse can never race a half-torn-down connection.
pub struct HeartbeatMonitor {
    ticker: Option<Interval>,
    interval_millis: Option<u64>,
    ack_received: bool,
}

impl HeartbeatMonitor {
    pub fn new() -> Self {
        Self {
            ticker: None,
            interval_millis: None,
            ack_received: true,
        }
    }

    /// Start (or restart) the pulse schedule with the announced period.
    /// The first pulse fires one full period after arming.
    pub fn arm(&mut self, interval_millis: u64) {
        let period = Duration::from_millis(interval_millis.max(1));
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.ticker = Some(ticker);
        self.interval_millis = Some(interval_millis);
        self.ack_received = true;
    }

    /// Cancel the pulse schedule.
    pub fn disarm(&mut self) {
        self.ticker = None;
        self.interval_millis = None;
    }

    pub fn is_armed(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn interval_millis(&self) -> Option<u64> {
        self.interval_millis
    }

    /// Wait until the next pulse is due. Pends forever while unarmed, which
    /// makes it safe to park in a `select!` arm before the hello arrives.
    pub async fn tick(&mut self) {
        match self.ticker.as_mut() {
            Some(ticker) => {
                ticker.tick().await;
            }
            None => std::future::pending().await,
        }
    }

    /// Whether the previous pulse has been acknowledged.
    pub fn ack_received(&self) -> bool {
        self.ack_received
    }

    /// Mark a pulse as sent and its acknowledgement outstanding.
    pub fn mark_pending(&mut self) {
        self.ack_received = false;
    }

    /// Record an acknowledgement frame.
    pub fn note_ack(&mut self) {
        self.ack_received = true;
    }
}

impl Default for HeartbeatMonitor {
    fn default() -> Self {
        Self::new()
    }
}
