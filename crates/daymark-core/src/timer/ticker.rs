//! The one-second tick source behind a running clock.
//!
//! A [`Ticker`] owns at most one spawned interval task. Starting it again
//! aborts the previous task first, and stopping (or dropping) it aborts the
//! task and drops the receiving end, so no tick can be observed afterwards.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    task: Option<JoinHandle<()>>,
    rx: Option<mpsc::Receiver<()>>,
}

impl Ticker {
    /// A ticker firing once per second.
    pub fn new() -> Self {
        Self::with_period(Duration::from_secs(1))
    }

    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            task: None,
            rx: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    /// Spawn the interval task. Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        self.stop();
        let (tx, rx) = mpsc::channel(1);
        let period = self.period;
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick resolves immediately; a clock ticks after a full period.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        }));
        self.rx = Some(rx);
        tracing::debug!(period_ms = period.as_millis() as u64, "ticker started");
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("ticker stopped");
        }
        self.rx = None;
    }

    /// Wait for the next tick. Returns `None` immediately when stopped.
    pub async fn next(&mut self) -> Option<()> {
        match self.rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let mut ticker = Ticker::new();
        ticker.start();
        for _ in 0..3 {
            assert_eq!(ticker.next().await, Some(()));
        }
        assert!(ticker.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_ticker_yields_nothing() {
        let mut ticker = Ticker::new();
        ticker.start();
        assert_eq!(ticker.next().await, Some(()));
        ticker.stop();
        assert!(!ticker.is_active());
        assert_eq!(ticker.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_previous_task() {
        let mut ticker = Ticker::new();
        ticker.start();
        ticker.start();
        assert!(ticker.is_active());
        assert_eq!(ticker.next().await, Some(()));
    }
}
