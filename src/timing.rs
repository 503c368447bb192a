use std::time::Duration;

/// Every delay in the bot is a multiple of one configurable time unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    unit: Duration,
}

impl Timing {
    pub fn new(unit: Duration) -> Self {
        Timing { unit }
    }

    /// No waiting at all.
    pub fn instant() -> Self {
        Timing {
            unit: Duration::ZERO,
        }
    }

    pub fn unit(&self) -> Duration {
        self.unit
    }

    pub fn sleep(&self, units: u32) {
        let duration = self.unit * units;
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Timing::new(Duration::from_secs(1))
    }
}
