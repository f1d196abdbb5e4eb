use chrono::{Duration, Local};
use std::collections::HashSet;
use tasktray_core::{JsonTaskStore, StoreActor, TaskError, TaskRef, TaskStore};

const WRITERS: usize = 8;
const ADDS_PER_WRITER: usize = 25;

#[test]
fn concurrent_adds_are_never_lost() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonTaskStore::new(dir.path().join("todos.json"));
    let actor = StoreActor::spawn(store.clone()).unwrap();

    let writers: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let handle = actor.handle();
            std::thread::spawn(move || {
                for n in 0..ADDS_PER_WRITER {
                    handle.add(format!("w{writer}-{n}"), None).unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }
    actor.shutdown();

    let texts: HashSet<_> = store.load().unwrap().into_iter().map(|t| t.text).collect();
    assert_eq!(texts.len(), WRITERS * ADDS_PER_WRITER);
}

#[test]
fn scanner_clearing_does_not_drop_a_concurrent_completion() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonTaskStore::new(dir.path().join("todos.json"));
    let actor = StoreActor::spawn(store.clone()).unwrap();
    let handle = actor.handle();

    let due = handle.add("due", Some(Duration::seconds(1))).unwrap();
    let other = handle.add("other", None).unwrap();

    let scanner_side = handle.clone();
    let clearing = std::thread::spawn(move || {
        scanner_side
            .take_due(Local::now() + Duration::minutes(1))
            .unwrap()
    });
    handle.complete(TaskRef::Id(other.id)).unwrap();
    let fired = clearing.join().unwrap();

    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].id, due.id);

    let tasks = handle.list().unwrap();
    assert_eq!(tasks[0].reminder, None);
    assert!(tasks[1].done);
    actor.shutdown();
}

#[test]
fn stale_id_after_delete_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let actor = StoreActor::spawn(JsonTaskStore::new(dir.path().join("todos.json"))).unwrap();
    let handle = actor.handle();

    let first = handle.add("first", None).unwrap();
    handle.add("second", None).unwrap();
    handle.delete(TaskRef::Id(first.id)).unwrap();

    let err = handle.complete(TaskRef::Id(first.id)).unwrap_err();
    assert!(matches!(err, TaskError::NotFound(id) if id == first.id));
    assert!(!handle.list().unwrap()[0].done);
}

#[test]
fn tasks_from_an_id_less_file_complete_by_listed_id() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todos.json");
    std::fs::write(&path, r#"[{"task": "Buy milk", "done": false, "reminder": null}]"#).unwrap();
    let actor = StoreActor::spawn(JsonTaskStore::new(path)).unwrap();
    let handle = actor.handle();

    let listed = handle.list().unwrap();
    handle.complete(TaskRef::Id(listed[0].id)).unwrap();

    let tasks = handle.list().unwrap();
    assert_eq!(tasks[0].id, listed[0].id);
    assert!(tasks[0].done);
    actor.shutdown();
}
