//! Scheduler - drives reconciliation cycles on a fixed interval until cancelled.
//!
//! Timing is split in two seams so tests never sleep:
//! - [`Clock`] answers "what time is it" and "wait until this instant"
//! - [`Ticker`] turns a clock into a stream of ticks
//!
//! Cycles never overlap. A tick that comes due while a cycle is still
//! running is honored once the cycle returns; further ticks missed during
//! the same cycle are dropped.

use crate::gateway::ListGateway;
use crate::reconciler::Reconciler;
use crate::types::CycleResult;
use log::{info, warn};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Shortest period an [`IntervalTicker`] will run at.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Longest period an [`IntervalTicker`] will run at (about 100 years).
pub const MAX_INTERVAL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Debug, Default)]
struct CancelState {
    cancelled: Mutex<bool>,
    signal: Condvar,
}

/// Cooperative cancellation signal shared between the scheduler and whoever
/// stops it (typically a Ctrl-C handler). Clones share the same signal.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    state: Arc<CancelState>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the signal and wake any waiter.
    pub fn cancel(&self) {
        let mut cancelled = self
            .state
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *cancelled = true;
        self.state.signal.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self
            .state
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Block for up to `timeout`, returning early if cancelled.
    ///
    /// Returns `true` if the token is cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let guard = self
            .state
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = self
            .state
            .signal
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

/// Source of time for an [`IntervalTicker`].
pub trait Clock {
    fn now(&self) -> Instant;

    /// Wait until `deadline` unless cancelled first.
    ///
    /// Returns `true` if the wait ended because of cancellation.
    fn wait_until(&self, deadline: Instant, cancel: &CancelToken) -> bool;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wait_until(&self, deadline: Instant, cancel: &CancelToken) -> bool {
        let timeout = deadline.saturating_duration_since(Instant::now());
        cancel.wait_timeout(timeout)
    }
}

/// Outcome of waiting for the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickWait {
    Tick,
    Cancelled,
}

/// Produces the ticks that start reconciliation cycles.
pub trait Ticker {
    /// Called once when the scheduler starts, before the first cycle.
    fn start(&mut self) {}

    /// Block until the next tick is due or `cancel` fires.
    fn wait(&mut self, cancel: &CancelToken) -> TickWait;

    /// Nominal period between ticks, for logging.
    fn period(&self) -> Duration;
}

/// Fixed-period ticker.
///
/// Deadlines stay on the grid `start + k * interval`. At most one missed
/// deadline is delivered late; the rest are skipped.
#[derive(Debug)]
pub struct IntervalTicker<C = SystemClock> {
    clock: C,
    interval: Duration,
    next: Instant,
}

impl IntervalTicker {
    pub fn new(interval: Duration) -> Self {
        Self::with_clock(interval, SystemClock)
    }
}

impl<C: Clock> IntervalTicker<C> {
    pub fn with_clock(interval: Duration, clock: C) -> Self {
        let interval = interval.clamp(MIN_INTERVAL, MAX_INTERVAL);
        let next = deadline_after(clock.now(), interval);
        Self {
            clock,
            interval,
            next,
        }
    }

    /// Instant the next tick is due.
    pub fn next_deadline(&self) -> Instant {
        self.next
    }

    /// First grid deadline strictly after `now`.
    fn advance(&mut self, now: Instant) {
        let mut next = deadline_after(self.next, self.interval);
        if next <= now {
            let behind = now.duration_since(next).as_nanos();
            let skipped = behind / self.interval.as_nanos() + 1;
            let catch_up = u64::try_from(skipped * self.interval.as_nanos())
                .map_or(MAX_INTERVAL, Duration::from_nanos);
            next = deadline_after(next, catch_up);
        }
        self.next = next;
    }
}

/// `from + by`, saturating at `from + MAX_INTERVAL` where the platform's
/// `Instant` cannot represent the sum.
fn deadline_after(from: Instant, by: Duration) -> Instant {
    from.checked_add(by)
        .or_else(|| from.checked_add(MAX_INTERVAL))
        .unwrap_or(from)
}

impl<C: Clock> Ticker for IntervalTicker<C> {
    fn start(&mut self) {
        self.next = deadline_after(self.clock.now(), self.interval);
    }

    fn wait(&mut self, cancel: &CancelToken) -> TickWait {
        if cancel.is_cancelled() {
            return TickWait::Cancelled;
        }

        if self.clock.now() < self.next && self.clock.wait_until(self.next, cancel) {
            return TickWait::Cancelled;
        }

        let now = self.clock.now();
        self.advance(now);
        TickWait::Tick
    }

    fn period(&self) -> Duration {
        self.interval
    }
}

/// Counters collected over a scheduler run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerReport {
    /// Cycles executed
    pub cycles: usize,
    /// Cycles that completed with no failure
    pub succeeded: usize,
    /// Cycles aborted by a fetch failure
    pub aborted: usize,
    /// Cycles where one apply direction failed
    pub partial_failures: usize,
}

impl SchedulerReport {
    pub fn record(&mut self, result: &CycleResult) {
        self.cycles += 1;
        if result.is_aborted() {
            self.aborted += 1;
        } else if result.is_partial_failure() {
            self.partial_failures += 1;
        } else {
            self.succeeded += 1;
        }
    }
}

/// Runs a [`Reconciler`] once immediately and then on every tick.
pub struct Scheduler<T = IntervalTicker> {
    ticker: T,
}

impl Scheduler {
    /// Scheduler on the system clock.
    pub fn new(interval: Duration) -> Self {
        Self::with_ticker(IntervalTicker::new(interval))
    }
}

impl<T: Ticker> Scheduler<T> {
    pub fn with_ticker(ticker: T) -> Self {
        Self { ticker }
    }

    /// Run cycles until `cancel` fires.
    ///
    /// Cancellation is checked between cycles only; a cycle in progress
    /// always runs to completion. `observer` sees every cycle's result.
    pub fn run<G, F>(
        &mut self,
        reconciler: &Reconciler<G>,
        cancel: &CancelToken,
        mut observer: F,
    ) -> SchedulerReport
    where
        G: ListGateway,
        F: FnMut(&CycleResult),
    {
        let mut report = SchedulerReport::default();
        self.ticker.start();

        loop {
            let result = reconciler.run_cycle();
            report.record(&result);
            log_cycle(report.cycles, &result);
            observer(&result);

            if cancel.is_cancelled() {
                break;
            }

            info!("wait for {}", format_interval(self.ticker.period()));
            if self.ticker.wait(cancel) == TickWait::Cancelled {
                break;
            }
        }

        info!(
            "scheduler stopped after {} cycles ({} ok, {} aborted, {} partial failures)",
            report.cycles, report.succeeded, report.aborted, report.partial_failures
        );
        report
    }
}

fn log_cycle(n: usize, result: &CycleResult) {
    match result {
        CycleResult::Aborted(e) => warn!("cycle {n} aborted: {e}"),
        CycleResult::Completed { .. } => {
            let line = format!(
                "cycle {n} done: add {}/{}, remove {}/{}",
                result.additions_succeeded(),
                result.additions_attempted(),
                result.removals_succeeded(),
                result.removals_attempted()
            );
            if result.is_partial_failure() {
                warn!("{line} ({} failed)", result.failures());
            } else {
                info!("{line}");
            }
        }
    }
}

/// Compact human form of an interval, e.g. `90s` -> `1m30s`.
pub fn format_interval(interval: Duration) -> String {
    let total = interval.as_secs();
    if total == 0 {
        return format!("{}ms", interval.as_millis());
    }

    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    if seconds > 0 || out.is_empty() {
        out.push_str(&format!("{seconds}s"));
    }
    out
}
