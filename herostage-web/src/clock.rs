/// Frame clock fed with display-refresh timestamps (milliseconds).
///
/// The first tick starts the clock and returns 0; every later tick returns the
/// seconds elapsed since the previous one.
#[derive(Debug, Default)]
pub struct Clock {
    last_tick: Option<f64>,
}

impl Clock {
    pub fn new() -> Self {
        Self { last_tick: None }
    }

    /// Delta in seconds since the previous tick. Timestamps that go
    /// backwards yield 0.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let delta = match self.last_tick {
            Some(prev) => ((now_ms - prev).max(0.0) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_tick = Some(now_ms);
        delta
    }
}
