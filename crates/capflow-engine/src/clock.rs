//! Injectable time source.
//!
//! Every date-sensitive decision (postponement validation, daily rules,
//! record timestamps) reads the clock through this trait, so tests pin
//! time exactly.

use chrono::{DateTime, Utc};

use capflow_core::types::Date;

/// A source of the current instant.
pub trait Clock: Send + Sync {
    /// The current timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// The current calendar date.
    fn today(&self) -> Date {
        Date::from(self.now().date_naive())
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_derives_date() {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 2, 1, 23, 30, 0).unwrap());
        assert_eq!(clock.today(), Date::parse("2026-02-01").unwrap());
    }
}
