//! Working-hours calendar
//!
//! Each advisor location has a business-hours window expressed in the
//! reference timezone (the zone lead timestamps are recorded in), plus the
//! location's offset from that zone. The weekend rule is evaluated in the
//! advisor's local time; the hour window is evaluated on the reference clock.

use crate::error::AllocationError;
use chrono::{Datelike, Duration, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Largest accepted distance between a location and the reference zone
pub const MAX_OFFSET_HOURS: f64 = 24.0;

/// Business-hours window for a single location
///
/// Hours are fractional (`22.5` = 22:30). A window whose `end_hour` is not
/// after its `start_hour` wraps past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkingHours {
    /// Window opens at this hour (0-24)
    pub start_hour: f64,

    /// Window closes at this hour (0-24, inclusive)
    pub end_hour: f64,

    /// Offset of the location's local time from the reference zone, in hours
    pub timezone_offset: f64,
}

impl WorkingHours {
    pub fn new(start_hour: f64, end_hour: f64, timezone_offset: f64) -> Self {
        Self {
            start_hour,
            end_hour,
            timezone_offset,
        }
    }

    /// True when `datetime` (reference zone) falls inside this window
    ///
    /// # Example
    /// ```
    /// use chrono::NaiveDate;
    /// use lead_allocator_core_rs::WorkingHours;
    ///
    /// let adelaide = WorkingHours::new(9.0, 17.0, 0.0);
    /// // Tuesday 10:15
    /// let ts = NaiveDate::from_ymd_opt(2021, 3, 2).unwrap().and_hms_opt(10, 15, 0).unwrap();
    /// assert!(adelaide.contains(ts));
    /// ```
    pub fn contains(&self, datetime: NaiveDateTime) -> bool {
        let offset_minutes = (self.timezone_offset * 60.0).round() as i64;
        let local = datetime - Duration::minutes(offset_minutes);
        if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }

        let hour_of_day = datetime.hour() as f64 + datetime.minute() as f64 / 60.0;

        let mut end_hour = self.end_hour;
        let mut effective_hour = hour_of_day;
        if self.end_hour <= self.start_hour {
            end_hour += 24.0;
            if hour_of_day < self.start_hour {
                effective_hour += 24.0;
            }
        }

        effective_hour >= self.start_hour && effective_hour <= end_hour
    }

    fn validate(&self, location: &str) -> Result<(), AllocationError> {
        let in_day = |h: f64| h.is_finite() && (0.0..=24.0).contains(&h);
        if !in_day(self.start_hour) || !in_day(self.end_hour) {
            return Err(AllocationError::configuration(format!(
                "location '{}' has working hours outside 0-24: {}-{}",
                location, self.start_hour, self.end_hour
            )));
        }
        if !self.timezone_offset.is_finite()
            || !(-MAX_OFFSET_HOURS..=MAX_OFFSET_HOURS).contains(&self.timezone_offset)
        {
            return Err(AllocationError::configuration(format!(
                "location '{}' has a timezone offset outside +/-{} hours: {}",
                location, MAX_OFFSET_HOURS, self.timezone_offset
            )));
        }
        Ok(())
    }
}

/// Location key -> working-hours window
///
/// The default calendar carries the two reference locations, `Adelaide`
/// (the reference zone itself) and `Canada`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkingHoursCalendar {
    locations: BTreeMap<String, WorkingHours>,
}

impl WorkingHoursCalendar {
    /// Empty calendar; every lookup fails until locations are inserted
    pub fn empty() -> Self {
        Self {
            locations: BTreeMap::new(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>, hours: WorkingHours) -> Self {
        self.insert(location, hours);
        self
    }

    pub fn insert(&mut self, location: impl Into<String>, hours: WorkingHours) {
        self.locations.insert(location.into(), hours);
    }

    pub fn get(&self, location: &str) -> Option<&WorkingHours> {
        self.locations.get(location)
    }

    pub fn contains_location(&self, location: &str) -> bool {
        self.locations.contains_key(location)
    }

    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.locations.keys().map(String::as_str)
    }

    /// Is `datetime` inside the working hours of `location`?
    ///
    /// # Errors
    /// `Configuration` if the location is not in the calendar.
    pub fn is_in_working_hours(
        &self,
        datetime: NaiveDateTime,
        location: &str,
    ) -> Result<bool, AllocationError> {
        self.get(location)
            .map(|hours| hours.contains(datetime))
            .ok_or_else(|| {
                AllocationError::configuration(format!("unknown location '{}'", location))
            })
    }

    /// Check every window is well formed
    pub fn validate(&self) -> Result<(), AllocationError> {
        for (location, hours) in &self.locations {
            hours.validate(location)?;
        }
        Ok(())
    }
}

impl Default for WorkingHoursCalendar {
    fn default() -> Self {
        Self::empty()
            .with_location("Adelaide", WorkingHours::new(9.0, 17.0, 0.0))
            .with_location("Canada", WorkingHours::new(22.5, 6.5, 13.5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_plain_window_is_inclusive() {
        let hours = WorkingHours::new(9.0, 17.0, 0.0);
        // 2021-03-03 is a Wednesday
        assert!(hours.contains(at(2021, 3, 3, 9, 0)));
        assert!(hours.contains(at(2021, 3, 3, 17, 0)));
        assert!(!hours.contains(at(2021, 3, 3, 17, 1)));
        assert!(!hours.contains(at(2021, 3, 3, 8, 59)));
    }

    #[test]
    fn test_missing_location_is_configuration_error() {
        let calendar = WorkingHoursCalendar::default();
        let err = calendar
            .is_in_working_hours(at(2021, 3, 3, 10, 0), "Narnia")
            .unwrap_err();
        assert!(matches!(err, AllocationError::Configuration { .. }));
    }

    #[test]
    fn test_validate_rejects_out_of_range_hours() {
        let calendar =
            WorkingHoursCalendar::empty().with_location("Bad", WorkingHours::new(9.0, 25.0, 0.0));
        assert!(calendar.validate().is_err());
    }
}
