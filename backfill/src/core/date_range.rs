use std::fmt::{Debug, Display, Formatter};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Inclusive range of calendar dates, `start..=end`.
#[must_use]
#[derive(Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Bounds")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct Bounds {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<Bounds> for DateRange {
    type Error = Error;

    fn try_from(bounds: Bounds) -> Result<Self> {
        Self::new(bounds.start, bounds.end)
    }
}

impl Debug for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..={:?}", self.start, self.end)
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} – {}", self.start, self.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidInput(format!(
                "date range ends before it starts: {start} – {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub const fn single(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    #[must_use]
    pub const fn start(self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub const fn end(self) -> NaiveDate {
        self.end
    }

    /// Number of dates in the range, both ends included.
    #[must_use]
    pub fn n_days(self) -> usize {
        usize::try_from((self.end - self.start).num_days() + 1).unwrap_or_default()
    }

    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        (self.start <= date) && (date <= self.end)
    }

    #[must_use]
    pub fn intersection(self, other: Self) -> Option<Self> {
        Self::new(self.start.max(other.start), self.end.min(other.end)).ok()
    }

    pub fn iter(self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take_while(move |date| *date <= self.end)
    }

    /// Split the range into consecutive sub-ranges of at most `max_days` dates each.
    pub fn chunks(self, max_days: u64) -> impl Iterator<Item = Self> {
        let step = Days::new(max_days.max(1));
        std::iter::successors(Some(self.start), move |start| start.checked_add_days(step))
            .take_while(move |start| *start <= self.end)
            .map(move |start| {
                let end = start
                    .checked_add_days(step)
                    .and_then(|next| next.pred_opt())
                    .map_or(self.end, |end| end.min(self.end));
                Self { start, end }
            })
    }

    /// Same range moved back by the number of days.
    pub fn shifted_back(self, days: u64) -> Option<Self> {
        Some(Self {
            start: self.start.checked_sub_days(Days::new(days))?,
            end: self.end.checked_sub_days(Days::new(days))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_rejects_reversed_range() {
        assert!(matches!(
            DateRange::new(date(2024, 1, 2), date(2024, 1, 1)),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_n_days() -> Result {
        assert_eq!(DateRange::new(date(2023, 1, 1), date(2023, 12, 31))?.n_days(), 365);
        assert_eq!(DateRange::single(date(2023, 1, 1)).n_days(), 1);
        Ok(())
    }

    #[test]
    fn test_chunks() -> Result {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 25))?;
        let chunks = range.chunks(10).collect_vec();
        assert_eq!(
            chunks,
            [
                DateRange::new(date(2024, 1, 1), date(2024, 1, 10))?,
                DateRange::new(date(2024, 1, 11), date(2024, 1, 20))?,
                DateRange::new(date(2024, 1, 21), date(2024, 1, 25))?,
            ]
        );
        assert_eq!(chunks.iter().map(|chunk| chunk.n_days()).sum::<usize>(), range.n_days());
        Ok(())
    }

    #[test]
    fn test_intersection() -> Result {
        let lhs = DateRange::new(date(2024, 1, 1), date(2024, 1, 10))?;
        let rhs = DateRange::new(date(2024, 1, 5), date(2024, 2, 1))?;
        let expected = DateRange::new(date(2024, 1, 5), date(2024, 1, 10))?;
        assert_eq!(lhs.intersection(rhs), Some(expected));
        assert_eq!(lhs.intersection(DateRange::single(date(2025, 1, 1))), None);
        Ok(())
    }

    #[test]
    fn test_deserialize_validates() {
        let reversed = r#"{"start":"2024-01-02","end":"2024-01-01"}"#;
        assert!(serde_json::from_str::<DateRange>(reversed).is_err());
        let ordered = r#"{"start":"2024-01-01","end":"2024-01-02"}"#;
        assert!(serde_json::from_str::<DateRange>(ordered).is_ok());
    }
}
