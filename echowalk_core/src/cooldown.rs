//! Global warning rate limit.

use std::time::{Duration, Instant};

/// Admits at most one warning per window, process-wide.
///
/// The gate is closed while `now - last <= window`; the first consume is
/// always admitted.
#[derive(Debug, Clone)]
pub struct CooldownGate {
    window: Duration,
    last: Option<Instant>,
}

impl CooldownGate {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn last(&self) -> Option<Instant> {
        self.last
    }

    /// Whether a consume at `now` would be admitted.
    pub fn is_open(&self, now: Instant) -> bool {
        match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.window,
        }
    }

    /// Admit and record a warning at `now`, or refuse without side effects.
    pub fn try_consume(&mut self, now: Instant) -> bool {
        if !self.is_open(now) {
            return false;
        }
        self.last = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_consume_is_admitted() {
        let mut g = CooldownGate::new(Duration::from_secs(3));
        assert!(g.try_consume(Instant::now()));
    }

    #[test]
    fn window_boundary_is_exclusive() {
        let t0 = Instant::now();
        let mut g = CooldownGate::new(Duration::from_secs(3));
        assert!(g.try_consume(t0));
        assert!(!g.try_consume(t0 + Duration::from_secs(1)));
        assert!(!g.try_consume(t0 + Duration::from_secs(3)));
        assert!(g.try_consume(t0 + Duration::from_millis(3001)));
        assert_eq!(g.last(), Some(t0 + Duration::from_millis(3001)));
    }

    #[test]
    fn refused_consume_does_not_extend_window() {
        let t0 = Instant::now();
        let mut g = CooldownGate::new(Duration::from_secs(3));
        g.try_consume(t0);
        g.try_consume(t0 + Duration::from_secs(2));
        assert!(g.is_open(t0 + Duration::from_millis(3500)));
    }
}
