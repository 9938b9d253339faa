//! Month calendar derived from task due dates and diary entries.
//!
//! # Invariants
//! - A task appears in exactly one cell: the day of its `due_date`.
//! - Tasks inside a cell keep repository order (due time, then priority).
//! - Tasks due outside the visible grid are not returned.

use crate::model::calendar::{
    first_of_month, grid_dates, CalendarDay, CalendarTask, MonthGrid, WeekStart, DAYS_PER_WEEK,
};
use crate::model::diary::DiaryQuery;
use crate::model::task::Task;
use crate::model::user::UserId;
use crate::model::validation::ValidationError;
use crate::repo::diary_repo::DiaryRepository;
use crate::repo::task_repo::{TaskListQuery, TaskRepository};
use crate::service::ServiceResult;
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use std::collections::{BTreeMap, HashSet};

/// Calendar service facade.
pub struct CalendarService<T: TaskRepository, D: DiaryRepository> {
    tasks: T,
    entries: D,
}

impl<T: TaskRepository, D: DiaryRepository> CalendarService<T, D> {
    pub fn new(tasks: T, entries: D) -> Self {
        Self { tasks, entries }
    }

    /// Builds the grid for `year-month` as seen on `today`.
    pub fn month(
        &self,
        user_id: UserId,
        year: i32,
        month: u32,
        week_start: WeekStart,
        today: NaiveDate,
    ) -> ServiceResult<MonthGrid> {
        let first = month_start(year, month)?;
        let dates = grid_dates(first, week_start);
        let (Some(&grid_first), Some(&grid_last)) = (dates.first(), dates.last()) else {
            return Ok(build_month_grid(first, week_start, today, &[], &HashSet::new()));
        };

        let tasks = self
            .tasks
            .list_tasks(user_id, &TaskListQuery::due_between(grid_first, grid_last))?;

        let diary_days = self
            .entries
            .list_entries(user_id, &DiaryQuery::between(grid_first, grid_last))?
            .into_iter()
            .map(|entry| entry.entry_date)
            .collect::<HashSet<_>>();

        Ok(build_month_grid(first, week_start, today, &tasks, &diary_days))
    }
}

fn month_start(year: i32, month: u32) -> Result<NaiveDate, ValidationError> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::OutOfRange {
            field: "month",
            value: i64::from(month),
            min: 1,
            max: 12,
        });
    }
    first_of_month(year, month).ok_or(ValidationError::OutOfRange {
        field: "year",
        value: i64::from(year),
        min: i64::from(NaiveDate::MIN.year()),
        max: i64::from(NaiveDate::MAX.year()),
    })
}

/// Lays tasks and diary markers onto the grid of month `first`.
pub fn build_month_grid(
    first: NaiveDate,
    week_start: WeekStart,
    today: NaiveDate,
    tasks: &[Task],
    diary_days: &HashSet<NaiveDate>,
) -> MonthGrid {
    let mut by_day: BTreeMap<NaiveDate, Vec<CalendarTask>> = BTreeMap::new();
    for task in tasks {
        if let (Some(day), Some(due)) = (task.due_day(), task.due_date) {
            by_day.entry(day).or_default().push(CalendarTask {
                id: task.id,
                title: task.title.clone(),
                priority: task.priority,
                status: task.status,
                due_time: format_due_time(due.time()),
            });
        }
    }

    let days = grid_dates(first, week_start)
        .into_iter()
        .map(|date| CalendarDay {
            date,
            in_month: date.year() == first.year() && date.month() == first.month(),
            is_today: date == today,
            tasks: by_day.remove(&date).unwrap_or_default(),
            has_diary_entry: diary_days.contains(&date),
        })
        .collect::<Vec<_>>();

    MonthGrid {
        year: first.year(),
        month: first.month(),
        week_start,
        weeks: days
            .chunks(DAYS_PER_WEEK)
            .map(|week| week.to_vec())
            .collect(),
    }
}

fn format_due_time(time: NaiveTime) -> Option<String> {
    if time.num_seconds_from_midnight() == 0 {
        return None;
    }
    Some(format!("{:02}:{:02}", time.hour(), time.minute()))
}

#[cfg(test)]
mod tests {
    use super::build_month_grid;
    use crate::model::calendar::WeekStart;
    use crate::model::task::{Task, TaskStatus};
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(id: i64, due: Option<(NaiveDate, u32, u32)>, status: TaskStatus) -> Task {
        Task {
            id,
            user_id: 1,
            folder_id: None,
            title: format!("task {id}"),
            description: None,
            priority: 1,
            status,
            due_date: due.map(|(day, h, m)| day.and_hms_opt(h, m, 0).unwrap()),
            is_calendar_event: false,
            google_calendar_event_id: None,
            created_at: 0,
            updated_at: 0,
            substeps: Vec::new(),
            notes: Vec::new(),
        }
    }

    #[test]
    fn tasks_land_on_their_due_day_with_time_labels() {
        let tasks = vec![
            task(1, Some((date(2024, 5, 10), 9, 15)), TaskStatus::Pending),
            task(2, Some((date(2024, 5, 10), 0, 0)), TaskStatus::Completed),
            task(3, None, TaskStatus::Pending),
        ];
        let grid = build_month_grid(
            date(2024, 5, 1),
            WeekStart::Sunday,
            date(2024, 5, 10),
            &tasks,
            &HashSet::new(),
        );

        let cell = grid.day(date(2024, 5, 10)).expect("cell in grid");
        assert!(cell.is_today);
        assert_eq!(cell.tasks.len(), 2);
        assert_eq!(cell.tasks[0].due_time.as_deref(), Some("09:15"));
        assert_eq!(cell.tasks[1].due_time, None);
        assert_eq!(grid.days().map(|day| day.tasks.len()).sum::<usize>(), 2);
    }

    #[test]
    fn leading_and_trailing_days_are_outside_month() {
        let grid = build_month_grid(
            date(2024, 5, 1),
            WeekStart::Sunday,
            date(2000, 1, 1),
            &[],
            &HashSet::from([date(2024, 4, 30)]),
        );
        assert_eq!(grid.weeks.len(), 6);
        assert!(grid.weeks.iter().all(|week| week.len() == 7));

        let april = grid.day(date(2024, 4, 30)).unwrap();
        assert!(!april.in_month);
        assert!(april.has_diary_entry);
        assert!(grid.day(date(2024, 5, 31)).unwrap().in_month);
    }
}
