use chrono::NaiveDate;
use daybook_core::db::open_db_in_memory;
use daybook_core::{
    CalendarService, DiaryService, NewDiaryEntry, NewTask, ServiceError, SqliteDiaryRepository,
    SqliteFolderRepository, SqliteTaskRepository, SqliteUserRepository, TaskService, UserId,
    UserRepository, ValidationError, WeekStart,
};
use rusqlite::Connection;

fn user(conn: &Connection) -> UserId {
    SqliteUserRepository::try_new(conn)
        .unwrap()
        .create_user("planner@example.com", "Planner")
        .unwrap()
        .id
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn calendar(
    conn: &Connection,
) -> CalendarService<SqliteTaskRepository<'_>, SqliteDiaryRepository<'_>> {
    CalendarService::new(
        SqliteTaskRepository::try_new(conn).unwrap(),
        SqliteDiaryRepository::try_new(conn).unwrap(),
    )
}

fn add_task(conn: &Connection, owner: UserId, title: &str, due: Option<(NaiveDate, u32, u32)>) {
    let service = TaskService::new(
        SqliteTaskRepository::try_new(conn).unwrap(),
        SqliteFolderRepository::try_new(conn).unwrap(),
    );
    let mut task = NewTask::new(title);
    task.due_date = due.map(|(day, h, m)| day.and_hms_opt(h, m, 0).unwrap());
    service.create_task(owner, task).unwrap();
}

#[test]
fn month_grid_places_tasks_and_diary_markers() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn);

    add_task(&conn, owner, "dentist", Some((date(2024, 2, 29), 10, 30)));
    add_task(&conn, owner, "spill-over", Some((date(2024, 3, 2), 0, 0)));
    add_task(&conn, owner, "next month", Some((date(2024, 4, 15), 9, 0)));
    add_task(&conn, owner, "undated", None);
    DiaryService::new(
        SqliteDiaryRepository::try_new(&conn).unwrap(),
        SqliteFolderRepository::try_new(&conn).unwrap(),
    )
    .save_entry(owner, NewDiaryEntry::new(date(2024, 2, 14), "valentine"))
    .unwrap();

    let grid = calendar(&conn)
        .month(owner, 2024, 2, WeekStart::Sunday, date(2024, 2, 29))
        .unwrap();

    assert_eq!((grid.year, grid.month), (2024, 2));
    assert_eq!(grid.weeks.len(), 6);
    assert_eq!(grid.weeks[0][0].date, date(2024, 1, 28));

    let leap_day = grid.day(date(2024, 2, 29)).unwrap();
    assert!(leap_day.is_today);
    assert_eq!(leap_day.tasks.len(), 1);
    assert_eq!(leap_day.tasks[0].title, "dentist");
    assert_eq!(leap_day.tasks[0].due_time.as_deref(), Some("10:30"));

    let trailing = grid.day(date(2024, 3, 2)).unwrap();
    assert!(!trailing.in_month);
    assert_eq!(trailing.tasks.len(), 1);

    assert!(grid.day(date(2024, 2, 14)).unwrap().has_diary_entry);
    assert_eq!(grid.days().map(|d| d.tasks.len()).sum::<usize>(), 2);
}

#[test]
fn monday_week_start_shifts_first_column() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn);

    let grid = calendar(&conn)
        .month(owner, 2024, 9, WeekStart::Monday, date(2024, 1, 1))
        .unwrap();
    assert_eq!(grid.weeks[0][0].date, date(2024, 8, 26));
    assert!(grid.days().all(|d| !d.is_today));
}

#[test]
fn invalid_month_is_a_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn);

    match calendar(&conn).month(owner, 2024, 13, WeekStart::Sunday, date(2024, 1, 1)) {
        Err(ServiceError::Validation(err)) => assert_eq!(err.field(), "month"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn unrepresentable_year_names_the_year_field() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn);

    match calendar(&conn).month(owner, 400_000, 5, WeekStart::Sunday, date(2024, 1, 1)) {
        Err(ServiceError::Validation(ValidationError::OutOfRange { field, value, .. })) => {
            assert_eq!(field, "year");
            assert_eq!(value, 400_000);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
