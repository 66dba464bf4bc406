/// Turns elapsed frame time into whole simulation ticks.
///
/// Ticks run one after another on the caller's thread, so a tick never
/// overlaps the next. When a frame falls behind by more than
/// `max_ticks_per_frame` periods the backlog is dropped instead of replayed.
#[derive(Debug, Clone)]
pub struct TickDriver {
    period_ms: f64,
    accumulated_ms: f64,
    pub max_ticks_per_frame: u32,
}

impl TickDriver {
    pub fn new(period_ms: f64, max_ticks_per_frame: u32) -> Self {
        Self {
            period_ms: period_ms.max(f64::EPSILON),
            accumulated_ms: 0.0,
            max_ticks_per_frame: max_ticks_per_frame.max(1),
        }
    }

    pub fn period_ms(&self) -> f64 {
        self.period_ms
    }

    pub fn set_period_ms(&mut self, period_ms: f64) {
        self.period_ms = period_ms.max(f64::EPSILON);
    }

    /// Add `elapsed_ms` of wall time and return how many ticks are due
    pub fn advance(&mut self, elapsed_ms: f64) -> u32 {
        if elapsed_ms.is_finite() && elapsed_ms > 0.0 {
            self.accumulated_ms += elapsed_ms;
        }
        let due = (self.accumulated_ms / self.period_ms).floor();
        if due >= self.max_ticks_per_frame as f64 {
            self.accumulated_ms = 0.0;
            return self.max_ticks_per_frame;
        }
        self.accumulated_ms -= due * self.period_ms;
        due as u32
    }
}
