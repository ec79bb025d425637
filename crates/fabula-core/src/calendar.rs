//! Calendar-unit conversion seam.
//!
//! Narrative offsets arrive in days, weeks, months, or years; the
//! engine works in days. Fictional calendars plug in here.

use crate::models::marker::CalendarUnit;

pub trait Calendar: Send + Sync {
    /// Nominal length of one unit, in days.
    fn days_in(&self, unit: CalendarUnit) -> i64;

    fn to_days(&self, quantity: u32, unit: CalendarUnit) -> i64 {
        i64::from(quantity) * self.days_in(unit)
    }
}

/// Nominal Gregorian lengths. Narrative offsets are approximate by
/// nature, so months are 30 days and years 365.
#[derive(Debug, Default, Clone, Copy)]
pub struct Gregorian;

impl Calendar for Gregorian {
    fn days_in(&self, unit: CalendarUnit) -> i64 {
        match unit {
            CalendarUnit::Day => 1,
            CalendarUnit::Week => 7,
            CalendarUnit::Month => 30,
            CalendarUnit::Year => 365,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gregorian_units() {
        let cal = Gregorian;
        assert_eq!(cal.to_days(3, CalendarUnit::Day), 3);
        assert_eq!(cal.to_days(2, CalendarUnit::Week), 14);
        assert_eq!(cal.to_days(1, CalendarUnit::Month), 30);
        assert_eq!(cal.to_days(20, CalendarUnit::Year), 7300);
    }
}
