use std::time::Duration;

pub const DEFAULT_BLINK_PERIOD: Duration = Duration::from_millis(500);

/// Typewriter cursor that toggles on a fixed wall-clock period while typing is
/// in progress. Once typing completes the blink stops and the cursor hides.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorBlink {
    period: Duration,
    elapsed: Duration,
    visible: bool,
    suspended: bool,
}

impl CursorBlink {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            elapsed: Duration::ZERO,
            visible: true,
            suspended: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible && !self.suspended
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Advances the blink clock. Returns the visibility after the tick.
    pub fn tick(&mut self, delta: Duration) -> bool {
        if self.suspended || self.period.is_zero() {
            return self.is_visible();
        }

        let period = self.period.as_nanos();
        let elapsed = self.elapsed.as_nanos() + delta.as_nanos();
        if (elapsed / period) % 2 == 1 {
            self.visible = !self.visible;
        }
        self.elapsed =
            u64::try_from(elapsed % period).map_or(Duration::ZERO, Duration::from_nanos);
        self.visible
    }

    /// Applies the typing state reported by the latest scroll sample.
    pub(crate) fn sync(&mut self, typing_complete: bool) {
        if typing_complete {
            self.suspended = true;
            self.visible = false;
            self.elapsed = Duration::ZERO;
        } else {
            self.suspended = false;
            self.visible = true;
        }
    }
}

impl Default for CursorBlink {
    fn default() -> Self {
        Self::new(DEFAULT_BLINK_PERIOD)
    }
}
