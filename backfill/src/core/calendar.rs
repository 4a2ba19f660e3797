use std::{
    collections::BTreeSet,
    fmt::{Display, Formatter},
};

use chrono::{Datelike, NaiveDate, Weekday};
use enumset::{EnumSet, EnumSetType};
use serde::{Deserialize, Serialize};

use crate::core::date_range::DateRange;

/// Kind of day the consumption models are segmented by.
#[derive(Debug, Hash, Ord, PartialOrd, EnumSetType, Serialize, Deserialize)]
#[enumset(serialize_repr = "list")]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    Holiday,
    Weekend,

    /// Term-time weekday with the school open.
    SchoolDayOpen,

    /// Term-time weekday with the school closed, for example an inset day.
    SchoolDayClosed,
}

impl DayType {
    /// Day types whose consumption best stands in for this one when it has no samples,
    /// most similar first.
    #[must_use]
    pub const fn substitutes(self) -> &'static [Self] {
        match self {
            Self::Holiday => &[Self::Weekend, Self::SchoolDayClosed, Self::SchoolDayOpen],
            Self::Weekend => &[Self::Holiday, Self::SchoolDayClosed, Self::SchoolDayOpen],
            Self::SchoolDayClosed => &[Self::Holiday, Self::Weekend, Self::SchoolDayOpen],
            Self::SchoolDayOpen => &[Self::SchoolDayClosed, Self::Holiday, Self::Weekend],
        }
    }

    #[must_use]
    pub fn occupied() -> EnumSet<Self> {
        EnumSet::only(Self::SchoolDayOpen)
    }
}

impl Display for DayType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Holiday => write!(f, "Holiday"),
            Self::Weekend => write!(f, "Weekend"),
            Self::SchoolDayOpen => write!(f, "School day (open)"),
            Self::SchoolDayClosed => write!(f, "School day (closed)"),
        }
    }
}

/// Classifies every date into exactly one [`DayType`].
pub trait Calendar {
    fn day_type(&self, date: NaiveDate) -> DayType;
}

/// School calendar: holidays take precedence over weekends, weekends over closures.
#[must_use]
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SchoolCalendar {
    #[serde(default)]
    holidays: Vec<DateRange>,

    #[serde(default)]
    closed_days: BTreeSet<NaiveDate>,
}

impl SchoolCalendar {
    pub fn with_holiday(mut self, holiday: DateRange) -> Self {
        self.holidays.push(holiday);
        self
    }

    pub fn with_closed_day(mut self, date: NaiveDate) -> Self {
        self.closed_days.insert(date);
        self
    }
}

impl Calendar for SchoolCalendar {
    fn day_type(&self, date: NaiveDate) -> DayType {
        if self.holidays.iter().any(|holiday| holiday.contains(date)) {
            DayType::Holiday
        } else if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            DayType::Weekend
        } else if self.closed_days.contains(&date) {
            DayType::SchoolDayClosed
        } else {
            DayType::SchoolDayOpen
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{prelude::*, testing::date};

    #[test]
    fn test_day_types() -> Result {
        let calendar = SchoolCalendar::default()
            .with_holiday(DateRange::new(date(2024, 4, 1), date(2024, 4, 12))?)
            .with_closed_day(date(2024, 4, 15));
        assert_eq!(calendar.day_type(date(2024, 4, 6)), DayType::Holiday);
        assert_eq!(calendar.day_type(date(2024, 4, 13)), DayType::Weekend);
        assert_eq!(calendar.day_type(date(2024, 4, 15)), DayType::SchoolDayClosed);
        assert_eq!(calendar.day_type(date(2024, 4, 16)), DayType::SchoolDayOpen);
        Ok(())
    }

    #[test]
    fn test_substitutes_exclude_self() {
        for day_type in EnumSet::<DayType>::all() {
            assert!(!day_type.substitutes().contains(&day_type));
            assert_eq!(day_type.substitutes().len(), 3);
        }
    }
}
