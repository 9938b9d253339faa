//! Month calendar grid model and date arithmetic.
//!
//! # Invariants
//! - A month grid always has `WEEKS_PER_GRID` rows of 7 days.
//! - The first cell is the `week_start` weekday on or before the 1st.

use crate::model::task::{TaskId, TaskStatus};
use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

pub const WEEKS_PER_GRID: usize = 6;
pub const DAYS_PER_WEEK: usize = 7;

/// First column of the calendar grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            Self::Sunday => Weekday::Sun,
            Self::Monday => Weekday::Mon,
        }
    }
}

/// Task summary rendered inside one calendar cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarTask {
    pub id: TaskId,
    pub title: String,
    pub priority: u8,
    pub status: TaskStatus,
    /// `HH:MM` part of the due date; `None` for midnight (all-day).
    pub due_time: Option<String>,
}

/// One cell of the month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub tasks: Vec<CalendarTask>,
    pub has_diary_entry: bool,
}

/// Month view: `WEEKS_PER_GRID` weeks of `DAYS_PER_WEEK` days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub week_start: WeekStart,
    pub weeks: Vec<Vec<CalendarDay>>,
}

impl MonthGrid {
    pub fn days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.weeks.iter().flatten()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.days().find(|day| day.date == date)
    }
}

/// First day of `year-month`, or `None` for an invalid month.
pub fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// First day of the month before `first`, clamped at the minimum date.
pub fn previous_month(first: NaiveDate) -> NaiveDate {
    first.checked_sub_months(Months::new(1)).unwrap_or(first)
}

/// First day of the month after `first`, clamped at the maximum date.
pub fn next_month(first: NaiveDate) -> NaiveDate {
    first.checked_add_months(Months::new(1)).unwrap_or(first)
}

/// Date shown in the top-left cell of the grid for month `first`.
pub fn grid_start(first: NaiveDate, week_start: WeekStart) -> NaiveDate {
    let offset = match week_start {
        WeekStart::Sunday => first.weekday().num_days_from_sunday(),
        WeekStart::Monday => first.weekday().num_days_from_monday(),
    };
    first
        .checked_sub_days(Days::new(u64::from(offset)))
        .unwrap_or(first)
}

/// All dates of the grid in row-major order, `WEEKS_PER_GRID * 7` long
/// unless the grid would run past the representable date range.
pub fn grid_dates(first: NaiveDate, week_start: WeekStart) -> Vec<NaiveDate> {
    grid_start(first, week_start)
        .iter_days()
        .take(WEEKS_PER_GRID * DAYS_PER_WEEK)
        .collect()
}
