use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
    time::{interval_at, sleep, Instant},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, Instrument};

use claimer_ethereum::ClaimConfig;
use claimer_types::{LoopPhase, LoopStatus, Severity};

use crate::{
    executor::{Claim, ClaimMode, ClaimTally},
    log::SessionLog,
};

const TICK: Duration = Duration::from_secs(1);

/// Progress notifications from the auto-claim loop, in order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoopEvent {
    Started,
    AttemptStarted { attempt: u64 },
    AttemptFinished { attempt: u64, success: bool },
    Waiting { next_fire_at: Option<DateTime<Utc>> },
    /// Seconds until the next attempt, published once per second while waiting
    Countdown(u64),
    Stopped(LoopStatus),
}

#[derive(Debug, thiserror::Error)]
pub enum LoopError {
    #[error("Claim interval of {_0:?} is below 60s and was not confirmed")]
    ShortIntervalUnconfirmed(Duration),
}

/// Repeats claim attempts on a fixed interval until cancelled.
///
/// Only one attempt is ever in flight; the wait before the next attempt starts once the
/// previous one has fully resolved.
pub struct AutoClaimer<C> {
    claimer: C,
    interval: Duration,
    log: SessionLog,
    events: broadcast::Sender<LoopEvent>,
}

impl<C: Claim + 'static> AutoClaimer<C> {
    pub fn new(claimer: C, interval: Duration, log: SessionLog) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            claimer,
            interval,
            log,
            events,
        }
    }

    /// Receive loop events, including those emitted right after [`AutoClaimer::start`]
    pub fn subscribe(&self) -> broadcast::Receiver<LoopEvent> {
        self.events.subscribe()
    }

    /// Spawn the loop onto the runtime.
    ///
    /// Intervals below a minute require `confirm_short_interval`, since faucets tend to
    /// rate limit aggressive callers.
    pub fn start(self, confirm_short_interval: bool) -> Result<AutoClaimHandle, LoopError> {
        if self.interval < ClaimConfig::MIN_INTERVAL && !confirm_short_interval {
            self.log.warning(format!(
                "Claim interval of {}s is below 60s and may be rate limited; not starting without confirmation",
                self.interval.as_secs()
            ));
            return Err(LoopError::ShortIntervalUnconfirmed(self.interval));
        }

        let cancel = CancellationToken::new();
        let (status_tx, status_rx) = watch::channel(LoopStatus {
            phase: LoopPhase::Running,
            running: true,
            ..Default::default()
        });
        let log = self.log.clone();
        let events = self.events.clone();

        self.log.success("Starting automatic claims");
        let span = info_span!("auto_claim", interval = ?self.interval);
        let task = tokio::spawn(self.run(cancel.clone(), status_tx).instrument(span));

        Ok(AutoClaimHandle {
            cancel,
            status: status_rx,
            events,
            log,
            task: Some(task),
        })
    }

    async fn run(self, cancel: CancellationToken, status: watch::Sender<LoopStatus>) -> LoopStatus {
        let secs = self.interval.as_secs();
        let remainder = self.interval - Duration::from_secs(secs);
        let mut tally = ClaimTally::default();
        self.emit(LoopEvent::Started);

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let attempt = tally.completed() + 1;
            status.send_modify(|s| {
                s.phase = LoopPhase::Attempting;
                s.next_fire_at = None;
                s.countdown = 0;
            });
            self.emit(LoopEvent::AttemptStarted { attempt });
            self.log.info("Auto claim: attempting to claim tokens...");

            // Never raced against cancellation; a submitted transaction is allowed to settle
            let outcome = self.claimer.claim().await;
            tally.record(&self.log, ClaimMode::Auto, &outcome);
            let success = matches!(&outcome, Ok(result) if result.success);
            status.send_modify(|s| {
                s.success_count = tally.success;
                s.fail_count = tally.fail;
            });
            self.emit(LoopEvent::AttemptFinished { attempt, success });

            if cancel.is_cancelled() {
                break;
            }

            let next_fire_at = TimeDelta::from_std(self.interval)
                .ok()
                .and_then(|delta| Utc::now().checked_add_signed(delta));
            status.send_modify(|s| {
                s.phase = LoopPhase::Waiting;
                s.next_fire_at = next_fire_at;
                s.countdown = secs;
            });
            self.emit(LoopEvent::Waiting { next_fire_at });
            self.log.push(
                Severity::Time,
                format!("Waiting {secs} seconds before the next claim..."),
            );
            self.emit(LoopEvent::Countdown(secs));

            if !self.countdown(&cancel, &status, secs, remainder).await {
                break;
            }
        }

        status.send_modify(|s| {
            s.phase = LoopPhase::Stopped;
            s.running = false;
            s.next_fire_at = None;
            s.countdown = 0;
        });
        self.log.info("Automatic claim loop ended");

        let last = status.borrow().clone();
        debug!(%last, "Auto claim loop finished");
        self.emit(LoopEvent::Stopped(last.clone()));
        last
    }

    /// Tick down the wait once per second. Returns false if cancelled first.
    async fn countdown(
        &self,
        cancel: &CancellationToken,
        status: &watch::Sender<LoopStatus>,
        secs: u64,
        remainder: Duration,
    ) -> bool {
        let mut ticker = interval_at(Instant::now() + TICK, TICK);
        let mut remaining = secs;

        while remaining > 0 {
            tokio::select! {
                _ = cancel.cancelled() => return false,
                _ = ticker.tick() => {
                    remaining -= 1;
                    status.send_modify(|s| s.countdown = remaining);
                    self.emit(LoopEvent::Countdown(remaining));
                }
            }
        }

        // Sub-second part of the interval; also yields when the interval is zero
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = sleep(remainder) => true,
        }
    }

    fn emit(&self, event: LoopEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

/// Control handle for a running auto-claim loop.
///
/// Dropping the handle stops the loop, the same as tearing down the hosting session.
pub struct AutoClaimHandle {
    cancel: CancellationToken,
    status: watch::Receiver<LoopStatus>,
    events: broadcast::Sender<LoopEvent>,
    log: SessionLog,
    task: Option<JoinHandle<LoopStatus>>,
}

impl AutoClaimHandle {
    /// Request the loop to stop. An attempt already in flight finishes, but no further
    /// attempt is scheduled. Calling this more than once is a no-op.
    pub fn stop(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.cancel.cancel();
        self.log.push(Severity::Warning, "Stopping automatic claims");
    }

    pub fn is_running(&self) -> bool {
        self.status.borrow().running
    }

    /// Latest loop snapshot
    pub fn status(&self) -> LoopStatus {
        self.status.borrow().clone()
    }

    /// Watch the loop status; readers never block the loop
    pub fn watch(&self) -> watch::Receiver<LoopStatus> {
        self.status.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LoopEvent> {
        self.events.subscribe()
    }

    /// Token observed by the loop; cancelling it is equivalent to [`AutoClaimHandle::stop`]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the loop to exit and return its final status.
    /// Does not stop the loop by itself.
    pub async fn join(mut self) -> Result<LoopStatus, tokio::task::JoinError> {
        match self.task.take() {
            Some(task) => task.await,
            None => Ok(self.status()),
        }
    }
}

impl Drop for AutoClaimHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
