pub mod cache;
pub mod calendar;
pub mod date_range;
pub mod meter;
pub mod series;
pub mod time_of_day;
