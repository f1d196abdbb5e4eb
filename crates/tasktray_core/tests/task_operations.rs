use chrono::{Duration, Local, Timelike};
use tasktray_core::{
    JsonTaskStore, Task, TaskError, TaskRef, TaskService, TaskStore, TaskValidationError,
};

fn service_in(dir: &tempfile::TempDir) -> TaskService<JsonTaskStore> {
    TaskService::new(JsonTaskStore::new(dir.path().join("todos.json")))
}

fn seed(service: &TaskService<JsonTaskStore>, texts: &[&str]) {
    let tasks: Vec<Task> = texts.iter().map(|text| Task::new(*text, None).unwrap()).collect();
    service.store().save(&tasks).unwrap();
}

#[test]
fn add_without_delay_has_no_reminder() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);

    let none = service.add("no delay", None).unwrap();
    let zero = service.add("zero delay", Some(Duration::zero())).unwrap();

    assert_eq!(none.reminder, None);
    assert_eq!(zero.reminder, None);
    assert!(!none.done && !zero.done);
    assert_eq!(service.list().unwrap().len(), 2);
}

#[test]
fn add_with_delay_sets_reminder_relative_to_creation() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    let now = Local::now();

    let task = service
        .add_at("stretch", Some(Duration::minutes(5)), now)
        .unwrap();
    assert_eq!(task.reminder, Some(now + Duration::minutes(5)));

    let before = Local::now();
    let live = service.add("drink water", Some(Duration::minutes(15))).unwrap();
    let after = Local::now();
    let at = live.reminder.expect("reminder set");
    assert!(at >= before + Duration::minutes(15) - Duration::seconds(1));
    assert!(at <= after + Duration::minutes(15));
}

#[test]
fn persisted_reminder_matches_returned_one_and_never_fires_early() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    let now = Local::now().with_nanosecond(900_000_000).unwrap();

    let task = service
        .add_at("stretch", Some(Duration::minutes(5)), now)
        .unwrap();
    let scheduled = task.reminder.unwrap();
    assert_eq!(service.list().unwrap()[0].reminder, Some(scheduled));

    let early = service
        .take_due(scheduled - Duration::milliseconds(500))
        .unwrap();
    assert!(early.is_empty());
    assert_eq!(service.take_due(scheduled).unwrap().len(), 1);
}

#[test]
fn add_appends_in_order_and_allows_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);

    service.add("same", None).unwrap();
    service.add("other", None).unwrap();
    service.add("same", None).unwrap();

    let texts: Vec<_> = service.list().unwrap().into_iter().map(|t| t.text).collect();
    assert_eq!(texts, vec!["same", "other", "same"]);
}

#[test]
fn add_empty_text_is_rejected_and_store_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    seed(&service, &["keep me"]);
    let before = std::fs::read(service.store().path()).unwrap();

    let err = service.add("", Some(Duration::minutes(5))).unwrap_err();

    assert!(matches!(
        err,
        TaskError::Validation(TaskValidationError::EmptyText)
    ));
    assert_eq!(std::fs::read(service.store().path()).unwrap(), before);
}

#[test]
fn complete_marks_only_the_addressed_task() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    seed(&service, &["Buy milk"]);

    let updated = service.complete(TaskRef::Index(0)).unwrap();

    assert_eq!(updated.text, "Buy milk");
    assert!(updated.done);
    assert_eq!(updated.reminder, None);
    assert_eq!(service.list().unwrap(), vec![updated]);
}

#[test]
fn delete_removes_and_shifts() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    seed(&service, &["first", "second", "third"]);
    let before = service.list().unwrap();

    let removed = service.delete(TaskRef::Index(1)).unwrap();

    assert_eq!(removed, before[1]);
    assert_eq!(service.list().unwrap(), vec![before[0].clone(), before[2].clone()]);
}

#[test]
fn out_of_range_index_is_an_index_error() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    seed(&service, &["only"]);

    let complete_err = service.complete(TaskRef::Index(1)).unwrap_err();
    let delete_err = service.delete(TaskRef::Index(7)).unwrap_err();

    assert!(matches!(
        complete_err,
        TaskError::IndexOutOfRange { index: 1, len: 1 }
    ));
    assert!(matches!(
        delete_err,
        TaskError::IndexOutOfRange { index: 7, len: 1 }
    ));
    assert!(!service.list().unwrap()[0].done);
}

#[test]
fn corrupt_store_fails_mutations_without_overwriting() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(&dir);
    std::fs::write(service.store().path(), "[{\"task\": ").unwrap();

    let err = service.add("new", None).unwrap_err();

    assert!(matches!(err, TaskError::Store(ref store) if store.is_corrupt()));
    assert_eq!(
        std::fs::read_to_string(service.store().path()).unwrap(),
        "[{\"task\": "
    );
}
