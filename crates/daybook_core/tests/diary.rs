use chrono::NaiveDate;
use daybook_core::db::open_db_in_memory;
use daybook_core::{
    DiaryQuery, DiaryService, FolderService, NewDiaryEntry, NewFolder, SaveOutcome, ServiceError,
    SqliteDiaryRepository, SqliteFolderRepository, SqliteUserRepository, UserId, UserRepository,
};
use rusqlite::Connection;

type Service<'conn> = DiaryService<SqliteDiaryRepository<'conn>, SqliteFolderRepository<'conn>>;

fn user(conn: &Connection, email: &str) -> UserId {
    SqliteUserRepository::try_new(conn)
        .unwrap()
        .create_user(email, "Writer")
        .unwrap()
        .id
}

fn diary(conn: &Connection) -> Service<'_> {
    DiaryService::new(
        SqliteDiaryRepository::try_new(conn).unwrap(),
        SqliteFolderRepository::try_new(conn).unwrap(),
    )
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

#[test]
fn saving_same_slot_replaces_entry() {
    let conn = open_db_in_memory().unwrap();
    let writer = user(&conn, "writer@example.com");
    let service = diary(&conn);

    let mut first = NewDiaryEntry::new(day(4), "# Morning\nslept **well**");
    first.mood = Some(4);
    let (created, outcome) = service.save_entry(writer, first).unwrap();
    assert_eq!(outcome, SaveOutcome::Created);
    assert_eq!(created.preview_text.as_deref(), Some("Morning slept well"));

    let mut second = NewDiaryEntry::new(day(4), "rewritten");
    second.weather = Some("rain".to_string());
    let (updated, outcome) = service.save_entry(writer, second).unwrap();
    assert_eq!(outcome, SaveOutcome::Updated);
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.content, "rewritten");
    assert_eq!(updated.mood, None);
    assert_eq!(updated.weather.as_deref(), Some("rain"));
    assert_eq!(updated.created_at, created.created_at);

    assert_eq!(
        service
            .list_entries(writer, &DiaryQuery::default())
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn folder_is_part_of_the_slot() {
    let conn = open_db_in_memory().unwrap();
    let writer = user(&conn, "writer@example.com");
    let folder = FolderService::new(SqliteFolderRepository::try_new(&conn).unwrap())
        .create_folder(writer, NewFolder::new("travel"))
        .unwrap();
    let service = diary(&conn);

    service
        .save_entry(writer, NewDiaryEntry::new(day(5), "at home"))
        .unwrap();
    let mut filed = NewDiaryEntry::new(day(5), "on the road");
    filed.folder_id = Some(folder.id);
    let (_, outcome) = service.save_entry(writer, filed).unwrap();
    assert_eq!(outcome, SaveOutcome::Created);

    let same_day = service.list_entries(writer, &DiaryQuery::on(day(5))).unwrap();
    assert_eq!(same_day.len(), 2);

    let in_folder = service
        .list_entries(
            writer,
            &DiaryQuery {
                folder_id: Some(folder.id),
                ..DiaryQuery::default()
            },
        )
        .unwrap();
    assert_eq!(in_folder.len(), 1);
    assert_eq!(in_folder[0].content, "on the road");
}

#[test]
fn list_is_newest_first_and_range_is_inclusive() {
    let conn = open_db_in_memory().unwrap();
    let writer = user(&conn, "writer@example.com");
    let service = diary(&conn);
    for d in [1, 3, 7, 9] {
        service
            .save_entry(writer, NewDiaryEntry::new(day(d), format!("day {d}")))
            .unwrap();
    }

    let all = service.list_entries(writer, &DiaryQuery::default()).unwrap();
    let dates = all.iter().map(|e| e.entry_date).collect::<Vec<_>>();
    assert_eq!(dates, vec![day(9), day(7), day(3), day(1)]);

    let ranged = service
        .list_entries(writer, &DiaryQuery::between(day(3), day(7)))
        .unwrap();
    let dates = ranged.iter().map(|e| e.entry_date).collect::<Vec<_>>();
    assert_eq!(dates, vec![day(7), day(3)]);
}

#[test]
fn mood_outside_scale_and_foreign_folder_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice@example.com");
    let bob = user(&conn, "bob@example.com");
    let folder = FolderService::new(SqliteFolderRepository::try_new(&conn).unwrap())
        .create_folder(alice, NewFolder::new("secret"))
        .unwrap();
    let service = diary(&conn);

    let mut moody = NewDiaryEntry::new(day(2), "meh");
    moody.mood = Some(6);
    assert!(matches!(
        service.save_entry(alice, moody),
        Err(ServiceError::Validation(_))
    ));

    let mut foreign = NewDiaryEntry::new(day(2), "peek");
    foreign.folder_id = Some(folder.id);
    assert!(matches!(
        service.save_entry(bob, foreign),
        Err(ServiceError::InvalidReference {
            field: "folder_id",
            ..
        })
    ));
}

#[test]
fn entries_are_private_to_their_owner() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice@example.com");
    let bob = user(&conn, "bob@example.com");
    let service = diary(&conn);
    let (entry, _) = service
        .save_entry(alice, NewDiaryEntry::new(day(8), "dear diary"))
        .unwrap();

    assert!(service
        .list_entries(bob, &DiaryQuery::default())
        .unwrap()
        .is_empty());
    assert!(matches!(
        service.get_entry(bob, entry.id),
        Err(ServiceError::NotFound { .. })
    ));
    assert!(matches!(
        service.delete_entry(bob, entry.id),
        Err(ServiceError::NotFound { .. })
    ));

    service.delete_entry(alice, entry.id).unwrap();
    assert!(matches!(
        service.get_entry(alice, entry.id),
        Err(ServiceError::NotFound { .. })
    ));
}
