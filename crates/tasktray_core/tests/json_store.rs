use chrono::{Duration, Local, Timelike};
use tasktray_core::{JsonTaskStore, StoreError, Task, TaskStore};

fn store_in(dir: &tempfile::TempDir) -> JsonTaskStore {
    JsonTaskStore::new(dir.path().join("todos.json"))
}

#[test]
fn missing_file_loads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    assert!(store.load().unwrap().is_empty());
    assert!(!store.path().exists());
}

#[test]
fn blank_file_loads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    std::fs::write(store.path(), "  \n").unwrap();

    assert!(store.load().unwrap().is_empty());
}

#[test]
fn save_then_load_is_a_fixed_point() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let at = (Local::now() + Duration::minutes(30))
        .with_nanosecond(678_901_000)
        .unwrap();

    let mut done = Task::new("file taxes", None).unwrap();
    done.mark_done();
    let tasks = vec![
        Task::new("Buy milk", Some(at)).unwrap(),
        done,
        Task::new("Buy milk", None).unwrap(),
    ];

    store.save(&tasks).unwrap();
    let first = store.load().unwrap();
    assert_eq!(first, tasks);

    store.save(&first).unwrap();
    assert_eq!(store.load().unwrap(), first);
}

#[test]
fn save_creates_parent_directories_and_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonTaskStore::new(dir.path().join("nested").join("todos.json"));

    store.save(&[Task::new("a", None).unwrap()]).unwrap();

    let names: Vec<_> = std::fs::read_dir(dir.path().join("nested"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["todos.json".to_string()]);
}

#[test]
fn save_replaces_rather_than_appends() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store
        .save(&[Task::new("a", None).unwrap(), Task::new("b", None).unwrap()])
        .unwrap();
    store.save(&[Task::new("c", None).unwrap()]).unwrap();

    let texts: Vec<_> = store.load().unwrap().into_iter().map(|t| t.text).collect();
    assert_eq!(texts, vec!["c"]);
}

#[test]
fn wire_format_uses_task_done_reminder_fields() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let task = Task::new("stand up", None).unwrap();
    store.save(std::slice::from_ref(&task)).unwrap();

    let raw = std::fs::read_to_string(store.path()).unwrap();
    assert!(raw.contains("\n    {"), "expected 4-space indent: {raw}");

    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entry = &value[0];
    assert_eq!(entry["task"], "stand up");
    assert_eq!(entry["done"], false);
    assert!(entry["reminder"].is_null());
    assert_eq!(entry["id"], task.id.to_string());
}

#[test]
fn legacy_records_without_id_or_offset_load() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    std::fs::write(
        store.path(),
        r#"[
            {"task": "old one", "done": false, "reminder": "2024-01-02T03:04:05.678901"},
            {"task": "no reminder key", "done": true}
        ]"#,
    )
    .unwrap();

    let tasks = store.load().unwrap();
    assert_eq!(tasks.len(), 2);
    assert!(tasks[0].reminder.is_some());
    assert_eq!(tasks[1].reminder, None);
    assert!(tasks[1].done);
    assert_ne!(tasks[0].id, tasks[1].id);
}

#[test]
fn legacy_ids_are_written_back_and_stay_stable() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    std::fs::write(
        store.path(),
        r#"[{"task": "Buy milk", "done": false, "reminder": null}]"#,
    )
    .unwrap();

    let first = store.load().unwrap();
    let second = store.load().unwrap();
    assert_eq!(first[0].id, second[0].id);

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(raw[0]["id"], first[0].id.to_string());
}

#[test]
fn legacy_sub_second_reminder_survives_a_resave() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    std::fs::write(
        store.path(),
        r#"[{"task": "old one", "done": false, "reminder": "2024-01-02T03:04:05.678901"}]"#,
    )
    .unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded[0].reminder.unwrap().nanosecond(), 678_901_000);

    store.save(&loaded).unwrap();
    assert_eq!(store.load().unwrap(), loaded);
}

#[test]
fn malformed_content_is_corrupt_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    std::fs::write(store.path(), "{ not json").unwrap();

    let err = store.load().unwrap_err();
    assert!(err.is_corrupt());
    assert!(matches!(err, StoreError::Corrupt { .. }));
}

#[test]
fn empty_task_text_in_file_is_corrupt_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    std::fs::write(store.path(), r#"[{"task": "", "done": false, "reminder": null}]"#).unwrap();

    assert!(store.load().unwrap_err().is_corrupt());
}

#[test]
fn unparseable_reminder_is_corrupt_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    std::fs::write(
        store.path(),
        r#"[{"task": "x", "done": false, "reminder": "soon"}]"#,
    )
    .unwrap();

    assert!(store.load().unwrap_err().is_corrupt());
}
