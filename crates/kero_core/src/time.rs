//! Millisecond frame timing.
//!
//! Physics is integrated with the wall-clock delta of the previous frame
//! (no fixed step), so every velocity in the game is expressed in pixels per
//! millisecond. Hosts, replays and tests all feed the clock through `advance`.

pub struct FrameClock {
    /// Deltas above this are clamped so a stalled frame cannot tunnel the
    /// character through the floor.
    pub max_delta_ms: u64,
    pub delta_ms: u64,
    pub total_ms: u64,
    pub frame_count: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            max_delta_ms: 100,
            delta_ms: 0,
            total_ms: 0,
            frame_count: 0,
        }
    }

    /// Feed an explicit delta. Returns the (possibly clamped) delta in use.
    pub fn advance(&mut self, delta_ms: u64) -> u64 {
        let mut delta = delta_ms;
        if delta > self.max_delta_ms {
            log::warn!(
                "Frame took {}ms, clamping delta to {}ms",
                delta,
                self.max_delta_ms
            );
            delta = self.max_delta_ms;
        }
        self.delta_ms = delta;
        self.total_ms += delta;
        self.frame_count += 1;
        delta
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Fires once every `1000 / fps` milliseconds. Leftover time is dropped on
/// each firing, matching the animation cadence of the tile renderer.
#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    fps: u32,
    elapsed_ms: u64,
}

impl Ticker {
    pub fn new(fps: u32) -> Self {
        Self { fps, elapsed_ms: 0 }
    }

    pub fn period_ms(&self) -> u64 {
        1000 / u64::from(self.fps.max(1))
    }

    pub fn tick(&mut self, delta_ms: u64) -> bool {
        self.elapsed_ms += delta_ms;
        if self.elapsed_ms >= self.period_ms() {
            self.elapsed_ms = 0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates_total() {
        let mut clock = FrameClock::new();
        clock.advance(16);
        clock.advance(17);
        assert_eq!(clock.delta_ms, 17);
        assert_eq!(clock.total_ms, 33);
        assert_eq!(clock.frame_count, 2);
    }

    #[test]
    fn advance_clamps_long_frames() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(5_000), clock.max_delta_ms);
        assert_eq!(clock.total_ms, clock.max_delta_ms);
    }

    #[test]
    fn ticker_fires_at_period() {
        let mut ticker = Ticker::new(15);
        assert_eq!(ticker.period_ms(), 66);
        assert!(!ticker.tick(33));
        assert!(!ticker.tick(32));
        assert!(ticker.tick(1));
        assert!(!ticker.tick(10));
    }

    #[test]
    fn ticker_zero_fps_does_not_divide_by_zero() {
        let mut ticker = Ticker::new(0);
        assert_eq!(ticker.period_ms(), 1000);
        assert!(ticker.tick(1000));
    }
}
