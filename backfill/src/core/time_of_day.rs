use std::fmt::{Debug, Display, Formatter};

use average::Mean;
use chrono::{NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

use crate::prelude::*;

pub const HALF_HOURS_PER_DAY: usize = 48;

const MINUTES_PER_HALF_HOUR: u32 = 30;
const MINUTES_PER_DAY: i64 = 24 * 60;

/// Wall-clock time of day with minute resolution.
///
/// `24:00` is the end-of-day sentinel and is distinct from `00:00`.
/// Ordering and equality are structural on `(hour, minute)`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "(u32, u32)", into = "(u32, u32)")]
#[must_use]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    pub const MIDNIGHT: Self = Self { hour: 0, minute: 0 };
    pub const END_OF_DAY: Self = Self { hour: 24, minute: 0 };

    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 24 || minute >= 60 || (hour == 24 && minute != 0) {
            return Err(Error::InvalidInput(format!(
                "time of day out of range: {hour}:{minute:02}"
            )));
        }
        Ok(Self { hour, minute })
    }

    /// Construct a time of day that sits exactly on a half-hour boundary.
    pub fn on_half_hour(hour: u32, minute: u32) -> Result<Self> {
        if minute % MINUTES_PER_HALF_HOUR != 0 {
            return Err(Error::InvalidInput(format!(
                "time of day is not on a half-hour boundary: {hour}:{minute:02}"
            )));
        }
        Self::new(hour, minute)
    }

    /// Start of the half-hour bucket.
    pub fn from_bucket(index: usize) -> Result<Self> {
        if index >= HALF_HOURS_PER_DAY {
            return Err(Error::InvalidInput(format!("half-hour bucket out of range: {index}")));
        }
        let minutes = u32::try_from(index)
            .map_err(|_| Error::InvalidInput(format!("half-hour bucket out of range: {index}")))?
            * MINUTES_PER_HALF_HOUR;
        Self::new(minutes / 60, minutes % 60)
    }

    #[must_use]
    pub const fn hour(self) -> u32 {
        self.hour
    }

    #[must_use]
    pub const fn minute(self) -> u32 {
        self.minute
    }

    #[must_use]
    pub const fn minutes_since_midnight(self) -> u32 {
        self.hour * 60 + self.minute
    }

    /// Enclosing half-hour bucket and the position within it, `0.0..1.0`.
    ///
    /// [`Self::END_OF_DAY`] yields `(48, 0.0)`: the exclusive end of the last bucket.
    #[must_use]
    pub fn to_bucket(self) -> (usize, f64) {
        let minutes = self.minutes_since_midnight();
        let index = (minutes / MINUTES_PER_HALF_HOUR) as usize;
        let fraction =
            f64::from(minutes % MINUTES_PER_HALF_HOUR) / f64::from(MINUTES_PER_HALF_HOUR);
        (index, fraction)
    }

    /// Shift by the whole minutes of the duration.
    ///
    /// Crossing `00:00` or `24:00` is an error rather than a wrap into the neighbouring day.
    pub fn checked_add(self, duration: TimeDelta) -> Result<Self> {
        let minutes = i64::from(self.minutes_since_midnight()) + duration.num_minutes();
        if !(0..=MINUTES_PER_DAY).contains(&minutes) {
            return Err(Error::InvalidInput(format!("{self} + {duration} leaves the day")));
        }
        let minutes = u32::try_from(minutes)
            .map_err(|_| Error::InvalidInput(format!("{self} + {duration} leaves the day")))?;
        Self::new(minutes / 60, minutes % 60)
    }

    /// Average the times by placing them on a shared epoch date and averaging the instants.
    ///
    /// This is a linear average: `23:00` and `01:00` average to `12:00`, not to midnight.
    pub fn average(times: &[Self]) -> Result<Self> {
        if times.is_empty() {
            return Err(Error::InvalidInput("cannot average an empty list of times".to_string()));
        }
        let mean: Mean =
            times.iter().map(|time| f64::from(time.minutes_since_midnight())).collect();
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let minutes = mean.mean().round() as u32;
        Self::new(minutes / 60, minutes % 60)
    }

    /// `None` for [`Self::END_OF_DAY`], which has no [`NaiveTime`] counterpart.
    #[must_use]
    pub fn to_naive_time(self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0)
    }
}

impl TryFrom<NaiveTime> for TimeOfDay {
    type Error = Error;

    fn try_from(time: NaiveTime) -> Result<Self> {
        Self::new(time.hour(), time.minute())
    }
}

impl TryFrom<(u32, u32)> for TimeOfDay {
    type Error = Error;

    fn try_from((hour, minute): (u32, u32)) -> Result<Self> {
        Self::new(hour, minute)
    }
}

impl From<TimeOfDay> for (u32, u32) {
    fn from(time: TimeOfDay) -> Self {
        (time.hour, time.minute)
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl Debug for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_construct_whole_domain() -> Result {
        for hour in 0..24 {
            for minute in 0..60 {
                TimeOfDay::new(hour, minute)?;
            }
        }
        TimeOfDay::new(24, 0)?;
        Ok(())
    }

    #[test]
    fn test_construct_out_of_range() {
        assert!(matches!(TimeOfDay::new(25, 0), Err(Error::InvalidInput(_))));
        assert!(matches!(TimeOfDay::new(24, 1), Err(Error::InvalidInput(_))));
        assert!(matches!(TimeOfDay::new(7, 60), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_end_of_day_is_not_midnight() -> Result {
        let end_of_day = TimeOfDay::new(24, 0)?;
        assert_ne!(end_of_day, TimeOfDay::MIDNIGHT);
        assert!(end_of_day > TimeOfDay::new(23, 59)?);
        assert_eq!(end_of_day.to_naive_time(), None);
        Ok(())
    }

    #[test]
    fn test_to_bucket() -> Result {
        assert_eq!(TimeOfDay::new(7, 30)?.to_bucket(), (15, 0.0));
        let (index, fraction) = TimeOfDay::new(7, 45)?.to_bucket();
        assert_eq!(index, 15);
        assert_abs_diff_eq!(fraction, 0.5);
        assert_eq!(TimeOfDay::END_OF_DAY.to_bucket(), (48, 0.0));
        Ok(())
    }

    #[test]
    fn test_exact_half_hours_have_zero_fraction() -> Result {
        for index in 0..HALF_HOURS_PER_DAY {
            let time = TimeOfDay::from_bucket(index)?;
            assert_eq!(time.to_bucket(), (index, 0.0));
        }
        Ok(())
    }

    #[test]
    fn test_on_half_hour() -> Result {
        assert_eq!(TimeOfDay::on_half_hour(7, 30)?, TimeOfDay::new(7, 30)?);
        assert!(TimeOfDay::on_half_hour(7, 15).is_err());
        Ok(())
    }

    #[test]
    fn test_checked_add() -> Result {
        let time = TimeOfDay::new(23, 0)?;
        assert_eq!(time.checked_add(TimeDelta::minutes(45))?, TimeOfDay::new(23, 45)?);
        assert_eq!(time.checked_add(TimeDelta::hours(1))?, TimeOfDay::END_OF_DAY);
        assert!(time.checked_add(TimeDelta::minutes(61)).is_err());
        assert!(TimeOfDay::MIDNIGHT.checked_add(TimeDelta::minutes(-1)).is_err());
        Ok(())
    }

    #[test]
    fn test_average() -> Result {
        let times = [TimeOfDay::new(6, 0)?, TimeOfDay::new(7, 0)?];
        assert_eq!(TimeOfDay::average(&times)?, TimeOfDay::new(6, 30)?);
        assert!(TimeOfDay::average(&[]).is_err());
        Ok(())
    }

    #[test]
    fn test_average_is_linear_around_midnight() -> Result {
        let times = [TimeOfDay::new(23, 0)?, TimeOfDay::new(1, 0)?];
        assert_eq!(TimeOfDay::average(&times)?, TimeOfDay::new(12, 0)?);
        Ok(())
    }
}
