/// Elapsed and delta time for one frame, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    pub elapsed: f64,
    pub delta: f64,
}

/// Frame clock fed with host timestamps.
///
/// Elapsed time is measured from `origin` and never goes backwards. The first
/// tick reports a zero delta; after that the delta is unbounded, so a resumed
/// background tab produces one large step.
#[derive(Debug, Clone)]
pub struct Clock {
    origin: f64,
    elapsed: f64,
    last: Option<f64>,
}

impl Clock {
    /// Clock whose elapsed time counts from `origin` (seconds, same timeline
    /// as the timestamps passed to [`Clock::tick`]).
    pub fn starting_at(origin: f64) -> Self {
        Self {
            origin,
            elapsed: 0.0,
            last: None,
        }
    }

    pub fn tick(&mut self, now: f64) -> FrameTime {
        let delta = match self.last {
            Some(last) => (now - last).max(0.0),
            None => 0.0,
        };
        self.last = Some(self.last.map_or(now, |last| last.max(now)));
        self.elapsed = self.elapsed.max(now - self.origin);

        FrameTime {
            elapsed: self.elapsed,
            delta,
        }
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_has_zero_delta() {
        let mut clock = Clock::starting_at(0.0);
        let t = clock.tick(1.5);
        assert_eq!(t.delta, 0.0);
        assert_eq!(t.elapsed, 1.5);
    }

    #[test]
    fn test_delta_between_ticks() {
        let mut clock = Clock::starting_at(10.0);
        clock.tick(10.0);
        let t = clock.tick(10.25);
        assert_eq!(t.delta, 0.25);
        assert_eq!(t.elapsed, 0.25);
    }

    #[test]
    fn test_large_delta_is_not_clamped() {
        let mut clock = Clock::starting_at(0.0);
        clock.tick(1.0);
        let t = clock.tick(301.0);
        assert_eq!(t.delta, 300.0);
    }

    #[test]
    fn test_time_never_goes_backwards() {
        let mut clock = Clock::starting_at(0.0);
        clock.tick(5.0);
        let t = clock.tick(4.0);
        assert_eq!(t.delta, 0.0);
        assert_eq!(t.elapsed, 5.0);

        // Delta resumes from the latest timestamp seen
        let t = clock.tick(5.5);
        assert_eq!(t.delta, 0.5);
        assert_eq!(clock.elapsed(), 5.5);
    }
}
