//! Fixed-rate schedules for the rain.
//!
//! In the browser the two schedules are `setInterval` timers owned by the
//! mounted card (see `card::dom`). [`RainClock`] replays the same two
//! schedules against a virtual clock so the loop can be driven headless.

use crate::particles::ParticleField;
use crate::rng::RandomSource;

/// A recurring deadline: first fires one period after `start_ms`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedRate {
    period_ms: f64,
    next_due_ms: f64,
}

impl FixedRate {
    pub fn new(period_ms: u32, start_ms: f64) -> Self {
        let period_ms = f64::from(period_ms.max(1));
        Self {
            period_ms,
            next_due_ms: start_ms + period_ms,
        }
    }

    pub fn period_ms(&self) -> f64 {
        self.period_ms
    }

    pub fn next_due_ms(&self) -> f64 {
        self.next_due_ms
    }

    /// Consume one firing if it is due at or before `now`.
    pub fn fire_if_due(&mut self, now: f64) -> Option<f64> {
        if self.next_due_ms <= now {
            let at = self.next_due_ms;
            self.next_due_ms += self.period_ms;
            Some(at)
        } else {
            None
        }
    }
}

/// Counters from a [`RainClock::advance_to`] run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClockReport {
    pub spawned: usize,
    pub ticks: usize,
    pub culled: usize,
}

/// Spawn and advance schedules sharing one field, fired in deadline order.
///
/// On a tie the spawn fires first, matching timer registration order in the
/// browser.
pub struct RainClock {
    spawn: FixedRate,
    advance: FixedRate,
    now_ms: f64,
    cancelled: bool,
}

impl RainClock {
    pub fn new(spawn_period_ms: u32, advance_period_ms: u32, start_ms: f64) -> Self {
        Self {
            spawn: FixedRate::new(spawn_period_ms, start_ms),
            advance: FixedRate::new(advance_period_ms, start_ms),
            now_ms: start_ms,
            cancelled: false,
        }
    }

    pub fn for_field<R: RandomSource>(field: &ParticleField<R>, start_ms: f64) -> Self {
        let t = field.tuning();
        Self::new(t.spawn_period_ms, t.advance_period_ms, start_ms)
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Stop both schedules together; later `advance_to` calls fire nothing.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Fire every spawn and advance deadline up to and including `now`.
    pub fn advance_to<R: RandomSource>(
        &mut self,
        now: f64,
        field: &mut ParticleField<R>,
    ) -> ClockReport {
        let mut report = ClockReport::default();
        if self.cancelled {
            return report;
        }
        loop {
            let spawn_at = self.spawn.next_due_ms();
            let advance_at = self.advance.next_due_ms();
            if spawn_at.min(advance_at) > now {
                break;
            }
            if spawn_at <= advance_at {
                self.spawn.fire_if_due(now);
                field.spawn_one();
                report.spawned += 1;
            } else {
                self.advance.fire_if_due(now);
                report.culled += field.tick();
                report.ticks += 1;
            }
        }
        self.now_ms = self.now_ms.max(now);
        report
    }
}
