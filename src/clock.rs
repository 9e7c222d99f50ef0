//! Time source and the periodic hour/minute/second signal
//!
//! The backend reads the wall clock whenever its timer fires and pushes the
//! reading to a sink. Everything runs on the UI thread: the host polls the
//! timer from its update loop and schedules the next repaint for when the
//! timer is next due.

use chrono::Timelike;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Hours, minutes and seconds of a local wall-clock reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hms {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl Hms {
    /// Extract the triple from any chrono time value.
    ///
    /// chrono encodes a leap second as second 59 with an overflowing
    /// nanosecond field, so `seconds` never reaches 60.
    pub fn from_time<T: Timelike>(time: &T) -> Self {
        Self {
            hours: time.hour() as u8,
            minutes: time.minute() as u8,
            seconds: time.second() as u8,
        }
    }
}

impl std::fmt::Display for Hms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// Source of the current time of day
pub trait TimeSource {
    fn now_hms(&self) -> Hms;
}

/// Reads the system's local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl TimeSource for LocalClock {
    fn now_hms(&self) -> Hms {
        Hms::from_time(&chrono::Local::now())
    }
}

/// Receiver of time updates
pub trait HmsSink {
    fn on_hms(&mut self, hms: Hms);
}

impl<F: FnMut(Hms)> HmsSink for F {
    fn on_hms(&mut self, hms: Hms) {
        self(hms)
    }
}

/// Repeating timer polled from the event loop.
///
/// Fires at most once per poll. When the loop falls behind by more than one
/// period the missed ticks are dropped and the schedule restarts from `now`.
#[derive(Debug, Clone)]
pub struct Timer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Timer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    /// Returns true if the timer is due, and schedules the next period.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }

        let mut next = due + self.interval;
        if next <= now {
            next = now + self.interval;
        }
        self.next_due = Some(next);
        true
    }

    /// Time left until the next tick, `None` while stopped
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}

/// Drives the time signal: a timer plus the source it reads on every tick
pub struct Backend<S: TimeSource> {
    source: S,
    timer: Timer,
    emitted: u64,
}

impl<S: TimeSource> Backend<S> {
    /// Create a backend whose timer is already running from `now`.
    pub fn new(source: S, interval: Duration, now: Instant) -> Self {
        let mut timer = Timer::new(interval);
        timer.start(now);
        debug!(interval_ms = interval.as_millis() as u64, "Clock timer started");
        Self {
            source,
            timer,
            emitted: 0,
        }
    }

    /// Read the clock and deliver one update immediately
    pub fn update_time(&mut self, sink: &mut dyn HmsSink) -> Hms {
        let hms = self.source.now_hms();
        self.emitted += 1;
        trace!(time = %hms, "Time update");
        sink.on_hms(hms);
        hms
    }

    /// Deliver an update if the timer is due
    pub fn poll(&mut self, now: Instant, sink: &mut dyn HmsSink) -> Option<Hms> {
        if self.timer.poll(now) {
            Some(self.update_time(sink))
        } else {
            None
        }
    }

    pub fn stop(&mut self) {
        if self.timer.is_active() {
            debug!(emitted = self.emitted, "Clock timer stopped");
        }
        self.timer.stop();
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.timer.is_active()
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.timer.remaining(now)
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveTime;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Time source that returns a settable value and counts reads
    #[derive(Clone, Default)]
    pub(crate) struct FixedClock {
        pub(crate) now: Rc<Cell<Option<Hms>>>,
        pub(crate) reads: Rc<Cell<u32>>,
    }

    impl FixedClock {
        pub(crate) fn at(hours: u8, minutes: u8, seconds: u8) -> Self {
            let clock = Self::default();
            clock.set(hours, minutes, seconds);
            clock
        }

        pub(crate) fn set(&self, hours: u8, minutes: u8, seconds: u8) {
            self.now.set(Some(Hms {
                hours,
                minutes,
                seconds,
            }));
        }
    }

    impl TimeSource for FixedClock {
        fn now_hms(&self) -> Hms {
            self.reads.set(self.reads.get() + 1);
            self.now.get().unwrap_or(Hms {
                hours: 0,
                minutes: 0,
                seconds: 0,
            })
        }
    }

    const TICK: Duration = Duration::from_millis(100);

    #[test]
    fn local_clock_matches_chrono() {
        let before = chrono::Local::now();
        let hms = LocalClock.now_hms();
        let after = chrono::Local::now();

        assert!(hms.hours <= 23);
        assert!(hms.minutes <= 59);
        assert!(hms.seconds <= 59);
        // The reading lies between two surrounding chrono reads
        let as_secs = |h: Hms| h.hours as u32 * 3600 + h.minutes as u32 * 60 + h.seconds as u32;
        let lo = as_secs(Hms::from_time(&before));
        let hi = as_secs(Hms::from_time(&after));
        let got = as_secs(hms);
        if lo <= hi {
            assert!(lo <= got && got <= hi);
        }
    }

    #[test]
    fn leap_second_stays_in_range() {
        let leap = NaiveTime::from_hms_milli_opt(23, 59, 59, 1_500).unwrap();
        let hms = Hms::from_time(&leap);
        assert_eq!((hms.hours, hms.minutes, hms.seconds), (23, 59, 59));
    }

    #[test]
    fn display_pads_fields() {
        let hms = Hms {
            hours: 7,
            minutes: 5,
            seconds: 9,
        };
        assert_eq!(hms.to_string(), "07:05:09");
    }

    #[test]
    fn timer_fires_once_per_period() {
        let start = Instant::now();
        let mut timer = Timer::new(TICK);
        assert!(!timer.poll(start + TICK));

        timer.start(start);
        assert!(!timer.poll(start + Duration::from_millis(99)));
        assert!(timer.poll(start + TICK));
        assert!(!timer.poll(start + TICK));
        assert!(timer.poll(start + Duration::from_millis(200)));
    }

    #[test]
    fn timer_skips_missed_periods() {
        let start = Instant::now();
        let mut timer = Timer::new(TICK);
        timer.start(start);

        let late = start + Duration::from_millis(550);
        assert!(timer.poll(late));
        assert!(!timer.poll(late));
        assert_eq!(timer.remaining(late), Some(TICK));
        assert!(timer.poll(late + TICK));
    }

    #[test]
    fn timer_remaining_counts_down() {
        let start = Instant::now();
        let mut timer = Timer::new(TICK);
        assert_eq!(timer.remaining(start), None);

        timer.start(start);
        assert_eq!(
            timer.remaining(start + Duration::from_millis(30)),
            Some(Duration::from_millis(70))
        );
        assert_eq!(timer.remaining(start + Duration::from_secs(1)), Some(Duration::ZERO));
    }

    #[test]
    fn stopped_timer_never_fires() {
        let start = Instant::now();
        let mut timer = Timer::new(TICK);
        timer.start(start);
        timer.stop();
        assert!(!timer.is_active());
        assert!(!timer.poll(start + Duration::from_secs(10)));
    }

    #[test]
    fn backend_emits_on_schedule() {
        let start = Instant::now();
        let clock = FixedClock::at(10, 20, 30);
        let mut backend = Backend::new(clock.clone(), TICK, start);
        let mut seen = Vec::new();
        let mut sink = |hms: Hms| seen.push(hms);

        assert_eq!(backend.poll(start + Duration::from_millis(50), &mut sink), None);
        clock.set(10, 20, 31);
        let fired = backend.poll(start + TICK, &mut sink);
        assert_eq!(
            fired,
            Some(Hms {
                hours: 10,
                minutes: 20,
                seconds: 31
            })
        );
        drop(sink);
        assert_eq!(seen.len(), 1);
        assert_eq!(backend.emitted(), 1);
        assert_eq!(clock.reads.get(), 1);
    }

    #[test]
    fn eager_update_precedes_first_tick() {
        let start = Instant::now();
        let clock = FixedClock::at(8, 0, 0);
        let mut backend = Backend::new(clock, TICK, start);
        let mut count = 0;
        let mut sink = |_: Hms| count += 1;

        backend.update_time(&mut sink);
        backend.poll(start + Duration::from_millis(10), &mut sink);
        drop(sink);
        assert_eq!(count, 1);
    }

    #[test]
    fn stopped_backend_emits_nothing() {
        let start = Instant::now();
        let mut backend = Backend::new(FixedClock::at(1, 2, 3), TICK, start);
        let mut count = 0;
        let mut sink = |_: Hms| count += 1;

        backend.stop();
        assert!(!backend.is_running());
        for i in 1..20 {
            backend.poll(start + TICK * i, &mut sink);
        }
        drop(sink);
        assert_eq!(count, 0);
        assert_eq!(backend.remaining(start), None);
    }

    proptest! {
        #[test]
        fn emitted_triple_matches_reading(secs in 0u32..86_400, nanos in 0u32..1_000_000_000) {
            let time = NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos).unwrap();
            let hms = Hms::from_time(&time);
            prop_assert!(hms.hours <= 23);
            prop_assert!(hms.minutes <= 59);
            prop_assert!(hms.seconds <= 59);
            prop_assert_eq!(hms.hours as u32, time.hour());
            prop_assert_eq!(hms.minutes as u32, time.minute());
            prop_assert_eq!(hms.seconds as u32, time.second());
        }
    }
}
