//! Stop conditions for the generational loop.
//!
//! A run continues while every predicate holds: generation cap, stagnation
//! timeout, absolute time limit and (optionally) an external cancellation
//! flag. Predicates are evaluated once per generation boundary, and the
//! first one that fails ends the run with the best solution found so far.
//!
//! Time is read through a [`Clock`], so tests and simulations can drive the
//! time-based predicates deterministically with a [`ManualClock`].

use super::config::GaConfig;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A monotonic time source.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// Wall-clock time via [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// ```
/// use std::time::Duration;
/// use u_bitga::ga::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let t0 = clock.now();
/// clock.advance(Duration::from_secs(90));
/// assert_eq!(clock.now() - t0, Duration::from_secs(90));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset_nanos: AtomicU64,
}

impl ManualClock {
    /// A clock frozen at the moment of creation.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_nanos: AtomicU64::new(0),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.offset_nanos.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Total time advanced since creation.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// All `max_generations` generations were executed.
    GenerationLimit,
    /// No improvement of the best fitness within the stagnation timeout.
    Stagnation,
    /// The absolute time limit elapsed.
    TimeLimit,
    /// The cancellation flag was raised.
    Cancelled,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StopReason::GenerationLimit => "generation limit",
            StopReason::Stagnation => "stagnation",
            StopReason::TimeLimit => "time limit",
            StopReason::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// The combined stop predicates of one run.
#[derive(Debug, Clone)]
pub struct Termination {
    max_generations: usize,
    stagnation_timeout: Option<Duration>,
    time_limit: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Termination {
    /// Predicates from a configuration, without cancellation.
    pub fn from_config(config: &GaConfig) -> Self {
        Self {
            max_generations: config.max_generations,
            stagnation_timeout: config.stagnation_timeout(),
            time_limit: config.time_limit(),
            cancel: None,
        }
    }

    /// Adds an external cancellation flag.
    pub fn with_cancel(mut self, cancel: Option<Arc<AtomicBool>>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Checks whether generation `next_generation` (1-based) may run.
    ///
    /// `started` is the run start and `last_improvement` the instant the
    /// best fitness last improved (the run start if it never has).
    pub fn check(
        &self,
        next_generation: usize,
        started: Instant,
        last_improvement: Instant,
        now: Instant,
    ) -> Option<StopReason> {
        if let Some(flag) = &self.cancel {
            if flag.load(Ordering::Relaxed) {
                return Some(StopReason::Cancelled);
            }
        }
        if let Some(timeout) = self.stagnation_timeout {
            if now.saturating_duration_since(last_improvement) >= timeout {
                return Some(StopReason::Stagnation);
            }
        }
        if let Some(limit) = self.time_limit {
            if now.saturating_duration_since(started) >= limit {
                return Some(StopReason::TimeLimit);
            }
        }
        if next_generation > self.max_generations {
            return Some(StopReason::GenerationLimit);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn termination(max_generations: usize, stagnation_ms: u64, limit_ms: u64) -> Termination {
        let config = GaConfig::default()
            .with_max_generations(max_generations)
            .with_stagnation_timeout_ms(stagnation_ms)
            .with_time_limit_ms(limit_ms);
        Termination::from_config(&config)
    }

    #[test]
    fn test_continues_within_all_bounds() {
        let t = termination(10, 1000, 5000);
        let t0 = Instant::now();
        assert_eq!(t.check(1, t0, t0, t0), None);
        assert_eq!(t.check(10, t0, t0, t0 + Duration::from_millis(999)), None);
    }

    #[test]
    fn test_generation_cap() {
        let t = termination(10, 1000, 5000);
        let t0 = Instant::now();
        assert_eq!(t.check(11, t0, t0, t0), Some(StopReason::GenerationLimit));
    }

    #[test]
    fn test_stagnation_measured_from_last_improvement() {
        let t = termination(usize::MAX, 1000, 5000);
        let t0 = Instant::now();
        let improved = t0 + Duration::from_millis(800);
        assert_eq!(t.check(5, t0, improved, t0 + Duration::from_millis(1500)), None);
        assert_eq!(
            t.check(5, t0, improved, t0 + Duration::from_millis(1800)),
            Some(StopReason::Stagnation)
        );
    }

    #[test]
    fn test_time_limit_measured_from_start() {
        let t = termination(usize::MAX, 1000, 5000);
        let t0 = Instant::now();
        let now = t0 + Duration::from_millis(5000);
        assert_eq!(
            t.check(5, t0, now - Duration::from_millis(10), now),
            Some(StopReason::TimeLimit)
        );
    }

    #[test]
    fn test_disabled_time_bounds() {
        let config = GaConfig::default().with_max_generations(3).without_time_limits();
        let t = Termination::from_config(&config);
        let t0 = Instant::now();
        let later = t0 + Duration::from_secs(365 * 24 * 3600);
        assert_eq!(t.check(3, t0, t0, later), None);
        assert_eq!(t.check(4, t0, t0, later), Some(StopReason::GenerationLimit));
    }

    #[test]
    fn test_cancellation_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let t = termination(10, 1000, 5000).with_cancel(Some(flag.clone()));
        let t0 = Instant::now();
        assert_eq!(t.check(1, t0, t0, t0), None);
        flag.store(true, Ordering::Relaxed);
        assert_eq!(t.check(1, t0, t0, t0), Some(StopReason::Cancelled));
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new();
        let t0 = clock.now();
        assert_eq!(clock.now(), t0);
        clock.advance(Duration::from_millis(250));
        clock.advance(Duration::from_millis(250));
        assert_eq!(clock.now() - t0, Duration::from_millis(500));
        assert_eq!(clock.elapsed(), Duration::from_millis(500));
    }

    #[test]
    fn test_stop_reason_display() {
        assert_eq!(StopReason::Stagnation.to_string(), "stagnation");
        assert_eq!(StopReason::GenerationLimit.to_string(), "generation limit");
    }
}
