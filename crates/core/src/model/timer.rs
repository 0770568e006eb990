/// Seconds left in an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    seconds_remaining: u32,
}

impl Countdown {
    #[must_use]
    pub fn new(seconds: u32) -> Self {
        Self {
            seconds_remaining: seconds,
        }
    }

    #[must_use]
    pub fn seconds_remaining(self) -> u32 {
        self.seconds_remaining
    }

    #[must_use]
    pub fn is_expired(self) -> bool {
        self.seconds_remaining == 0
    }

    /// Removes one second. Returns `true` only on the tick that reaches zero.
    pub fn tick(&mut self) -> bool {
        if self.seconds_remaining == 0 {
            return false;
        }
        self.seconds_remaining -= 1;
        self.seconds_remaining == 0
    }

    /// Under five minutes left.
    #[must_use]
    pub fn is_low(self) -> bool {
        self.seconds_remaining < 300
    }

    /// `HH:MM:SS`.
    #[must_use]
    pub fn display(self) -> String {
        let total = self.seconds_remaining;
        format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_expiry_once() {
        let mut timer = Countdown::new(2);
        assert!(!timer.tick());
        assert!(timer.tick());
        assert!(!timer.tick());
        assert!(!timer.tick());
        assert!(timer.is_expired());
    }

    #[test]
    fn formats_hours_minutes_seconds() {
        assert_eq!(Countdown::new(3_600).display(), "01:00:00");
        assert_eq!(Countdown::new(299).display(), "00:04:59");
        assert!(Countdown::new(299).is_low());
        assert!(!Countdown::new(300).is_low());
    }
}
