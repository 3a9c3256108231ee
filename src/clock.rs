use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// The writer asks its clock for "now" when it names a backup file and when it decides
/// which backups are too old. The default is [`SystemClock`]; tests and simulations can
/// inject their own implementation with
/// [`RollingFileWriterBuilder::clock`](crate::RollingFileWriterBuilder::clock).
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Returns the current point in time.
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock of the operating system.
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod test {
    use super::{Clock, SystemClock};

    #[test]
    fn test_system_clock_advances() {
        let first = SystemClock.now();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = SystemClock.now();
        assert!(second > first);
    }
}
