use daybook_core::db::open_db_in_memory;
use chrono::NaiveDate;
use daybook_core::{
    DiaryQuery, DiaryService, FolderPatch, FolderService, NewDiaryEntry, NewFolder, NewTask,
    RepoError, ServiceError, SqliteDiaryRepository, SqliteFolderRepository, SqliteTaskRepository,
    SqliteUserRepository, TaskService, UserId, UserRepository, ValidationError,
};
use rusqlite::Connection;

fn user(conn: &Connection, email: &str) -> UserId {
    SqliteUserRepository::try_new(conn)
        .unwrap()
        .create_user(email, "Folder Owner")
        .unwrap()
        .id
}

fn diary(
    conn: &Connection,
) -> DiaryService<SqliteDiaryRepository<'_>, SqliteFolderRepository<'_>> {
    DiaryService::new(
        SqliteDiaryRepository::try_new(conn).unwrap(),
        SqliteFolderRepository::try_new(conn).unwrap(),
    )
}

fn march(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn folders(conn: &Connection) -> FolderService<SqliteFolderRepository<'_>> {
    FolderService::new(SqliteFolderRepository::try_new(conn).unwrap())
}

#[test]
fn create_applies_default_color_and_lists_by_name() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner@example.com");
    let service = folders(&conn);

    service.create_folder(owner, NewFolder::new("work")).unwrap();
    let mut personal = NewFolder::new("  Personal ");
    personal.color = "#10b981".to_string();
    service.create_folder(owner, personal).unwrap();

    let listed = service.list_folders(owner).unwrap();
    let names = listed.iter().map(|f| f.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["Personal", "work"]);
    assert_eq!(listed[0].color, "#10B981");
    assert_eq!(listed[1].color, "#3B82F6");
}

#[test]
fn create_rejects_blank_name_and_bad_color() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner@example.com");
    let service = folders(&conn);

    let err = service.create_folder(owner, NewFolder::new("   ")).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::Blank { field: "name" })
    ));

    let mut bad = NewFolder::new("x");
    bad.color = "blue".to_string();
    assert!(matches!(
        service.create_folder(owner, bad),
        Err(ServiceError::Validation(_))
    ));
}

#[test]
fn parent_must_belong_to_same_user() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice@example.com");
    let bob = user(&conn, "bob@example.com");
    let service = folders(&conn);

    let alices = service.create_folder(alice, NewFolder::new("a")).unwrap();
    let mut child = NewFolder::new("b");
    child.parent_folder_id = Some(alices.id);

    let err = service.create_folder(bob, child).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::InvalidReference {
            field: "parent_folder_id",
            ..
        }
    ));
}

#[test]
fn reparenting_under_descendant_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner@example.com");
    let service = folders(&conn);

    let root = service.create_folder(owner, NewFolder::new("root")).unwrap();
    let mut mid = NewFolder::new("mid");
    mid.parent_folder_id = Some(root.id);
    let mid = service.create_folder(owner, mid).unwrap();
    let mut leaf = NewFolder::new("leaf");
    leaf.parent_folder_id = Some(mid.id);
    let leaf = service.create_folder(owner, leaf).unwrap();

    let patch = FolderPatch {
        parent_folder_id: Some(Some(leaf.id)),
        ..FolderPatch::default()
    };
    let err = service.update_folder(owner, root.id, patch).unwrap_err();
    assert!(matches!(err, ServiceError::CycleDetected { .. }));

    let self_parent = FolderPatch {
        parent_folder_id: Some(Some(root.id)),
        ..FolderPatch::default()
    };
    assert!(matches!(
        service.update_folder(owner, root.id, self_parent),
        Err(ServiceError::CycleDetected { .. })
    ));

    let detach = FolderPatch {
        parent_folder_id: Some(None),
        name: Some("leaf (top)".to_string()),
        ..FolderPatch::default()
    };
    let moved = service.update_folder(owner, leaf.id, detach).unwrap();
    assert_eq!(moved.parent_folder_id, None);
    assert_eq!(moved.name, "leaf (top)");
}

#[test]
fn delete_cascades_children_and_detaches_tasks() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner@example.com");
    let service = folders(&conn);
    let tasks = TaskService::new(
        SqliteTaskRepository::try_new(&conn).unwrap(),
        SqliteFolderRepository::try_new(&conn).unwrap(),
    );

    let parent = service.create_folder(owner, NewFolder::new("parent")).unwrap();
    let mut child = NewFolder::new("child");
    child.parent_folder_id = Some(parent.id);
    let child = service.create_folder(owner, child).unwrap();

    let mut task = NewTask::new("filed task");
    task.folder_id = Some(child.id);
    let task = tasks.create_task(owner, task).unwrap();

    service.delete_folder(owner, parent.id).unwrap();

    assert!(service.list_folders(owner).unwrap().is_empty());
    let kept = tasks.get_task(owner, task.id).unwrap();
    assert_eq!(kept.folder_id, None);

    assert!(matches!(
        service.delete_folder(owner, parent.id),
        Err(ServiceError::NotFound { entity: "folder", .. })
    ));
}

#[test]
fn delete_detaches_diary_entries_to_no_folder() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner@example.com");
    let service = folders(&conn);
    let entries = diary(&conn);

    let travel = service.create_folder(owner, NewFolder::new("travel")).unwrap();
    let mut filed = NewDiaryEntry::new(march(4), "on the road");
    filed.folder_id = Some(travel.id);
    let (entry, _) = entries.save_entry(owner, filed).unwrap();

    service.delete_folder(owner, travel.id).unwrap();

    let kept = entries.get_entry(owner, entry.id).unwrap();
    assert_eq!(kept.folder_id, None);
    assert_eq!(kept.content, "on the road");
}

#[test]
fn delete_conflicting_with_unfiled_entry_changes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let owner = user(&conn, "owner@example.com");
    let service = folders(&conn);
    let entries = diary(&conn);

    let travel = service.create_folder(owner, NewFolder::new("travel")).unwrap();
    let (unfiled, _) = entries
        .save_entry(owner, NewDiaryEntry::new(march(4), "at home"))
        .unwrap();
    let mut filed = NewDiaryEntry::new(march(4), "on the road");
    filed.folder_id = Some(travel.id);
    let (filed, _) = entries.save_entry(owner, filed).unwrap();

    assert!(matches!(
        service.delete_folder(owner, travel.id),
        Err(ServiceError::Repo(RepoError::Conflict(_)))
    ));

    let listed = service.list_folders(owner).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, travel.id);

    let same_day = entries.list_entries(owner, &DiaryQuery::on(march(4))).unwrap();
    assert_eq!(same_day.len(), 2);
    assert_eq!(
        entries.get_entry(owner, filed.id).unwrap().folder_id,
        Some(travel.id)
    );
    assert_eq!(entries.get_entry(owner, unfiled.id).unwrap().folder_id, None);
}
