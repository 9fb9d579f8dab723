//! Press-and-hold seeking.
//!
//! The host toolkit has no native press-and-hold event, so the UI owns a
//! repeating timer: it calls [`SeekRepeater::start`] on button press,
//! drives [`SeekRepeater::tick`] every [`crate::SEEK_REPEAT_INTERVAL_MS`]
//! while the button is held, and calls [`SeekRepeater::stop`] on release.
//! The repeater only computes step targets; it never touches the player.

/// Direction of a held seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekDirection {
    Back,
    Forward,
}

/// Tracks the currently held seek button and produces step targets.
pub struct SeekRepeater {
    step_ms: u64,
    active: Option<SeekDirection>,
}

impl SeekRepeater {
    pub fn new(step_ms: u64) -> Self {
        Self {
            step_ms,
            active: None,
        }
    }

    /// Begin a held seek. Starting while already held just updates the
    /// direction; the single host timer keeps firing.
    pub fn start(&mut self, direction: SeekDirection) {
        self.active = Some(direction);
    }

    /// End the held seek. Idempotent; a tick racing a stop observes the
    /// stopped state and does nothing.
    pub fn stop(&mut self) {
        self.active = None;
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn direction(&self) -> Option<SeekDirection> {
        self.active
    }

    /// One repeat step. Returns the target position, or `None` when
    /// nothing is held or the candidate falls outside `[1, duration_ms)`;
    /// out-of-range steps are suppressed rather than clamped, so holding
    /// at a boundary stops moving the playhead. With the duration still
    /// unknown (zero) forward steps are suppressed and the timer runs
    /// harmlessly.
    pub fn tick(&mut self, current_ms: u64, duration_ms: u64) -> Option<u64> {
        match self.active? {
            SeekDirection::Back => {
                let target = current_ms.saturating_sub(self.step_ms);
                (target >= 1).then_some(target)
            }
            SeekDirection::Forward => {
                let target = current_ms.saturating_add(self.step_ms);
                (target < duration_ms).then_some(target)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_ticks_until_suppressed_at_duration() {
        let mut repeater = SeekRepeater::new(500);
        repeater.start(SeekDirection::Forward);

        assert_eq!(repeater.tick(0, 2000), Some(500));
        assert_eq!(repeater.tick(500, 2000), Some(1000));
        assert_eq!(repeater.tick(1000, 2000), Some(1500));
        // 2000 is not < 2000
        assert_eq!(repeater.tick(1500, 2000), None);
    }

    #[test]
    fn test_backward_suppressed_below_one() {
        let mut repeater = SeekRepeater::new(500);
        repeater.start(SeekDirection::Back);

        assert_eq!(repeater.tick(1200, 60_000), Some(700));
        assert_eq!(repeater.tick(700, 60_000), Some(200));
        assert_eq!(repeater.tick(200, 60_000), None);
    }

    #[test]
    fn test_tick_inert_when_stopped() {
        let mut repeater = SeekRepeater::new(500);
        repeater.start(SeekDirection::Forward);
        repeater.stop();
        assert_eq!(repeater.tick(1000, 60_000), None);
        assert!(!repeater.is_active());
    }

    #[test]
    fn test_stop_without_start_is_noop() {
        let mut repeater = SeekRepeater::new(500);
        repeater.stop();
        assert_eq!(repeater.tick(1000, 60_000), None);
    }

    #[test]
    fn test_double_start_updates_direction() {
        let mut repeater = SeekRepeater::new(500);
        repeater.start(SeekDirection::Forward);
        repeater.start(SeekDirection::Back);
        assert_eq!(repeater.direction(), Some(SeekDirection::Back));
        assert_eq!(repeater.tick(1000, 60_000), Some(500));
    }

    #[test]
    fn test_forward_with_unknown_duration() {
        let mut repeater = SeekRepeater::new(500);
        repeater.start(SeekDirection::Forward);
        assert_eq!(repeater.tick(1000, 0), None);
    }
}
