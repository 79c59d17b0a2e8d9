use std::fs;
use std::path::Path;
use todo_core::{JsonTaskRepository, StorageError, Task, TaskRepository};

fn repo_in(dir: &Path) -> JsonTaskRepository {
    JsonTaskRepository::new(dir.join("tasks.json"))
}

fn sample_tasks() -> Vec<Task> {
    let mut done = Task::with_created_at(2, "Молоко и хлеб", "2024-03-02T08:00:00").unwrap();
    done.done = true;
    vec![
        Task::with_created_at(1, "Buy milk", "2024-03-01T12:00:00").unwrap(),
        done,
        Task::with_created_at(5, "Walk dog", "").unwrap(),
    ]
}

#[test]
fn load_creates_missing_file_with_empty_list() {
    let dir = tempfile::tempdir().unwrap();
    let repo = repo_in(dir.path());

    let tasks = repo.load().unwrap();
    assert!(tasks.is_empty());
    assert_eq!(fs::read_to_string(repo.path()).unwrap().trim(), "[]");
}

#[test]
fn load_fails_when_parent_directory_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonTaskRepository::new(dir.path().join("missing").join("tasks.json"));

    let err = repo.load().unwrap_err();
    assert!(matches!(err, StorageError::Io { .. }));
}

#[test]
fn load_treats_blank_file_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let repo = repo_in(dir.path());
    fs::write(repo.path(), "  \n\t").unwrap();

    assert!(repo.load().unwrap().is_empty());
}

#[test]
fn save_then_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let repo = repo_in(dir.path());
    let tasks = sample_tasks();

    repo.save(&tasks).unwrap();
    assert_eq!(repo.load().unwrap(), tasks);

    repo.save(&[]).unwrap();
    assert!(repo.load().unwrap().is_empty());
}

#[test]
fn save_writes_pretty_utf8_json_and_removes_tmp_file() {
    let dir = tempfile::tempdir().unwrap();
    let repo = repo_in(dir.path());

    repo.save(&sample_tasks()).unwrap();

    let raw = fs::read_to_string(repo.path()).unwrap();
    assert!(raw.starts_with("[\n  {"));
    assert!(raw.contains("Молоко и хлеб"));
    assert!(raw.contains("\"created_at\": \"2024-03-01T12:00:00\""));
    assert!(!repo.tmp_path().exists());
}

#[test]
fn tmp_path_is_a_sibling_of_the_backing_file() {
    let repo = JsonTaskRepository::new("/data/tasks.json");
    assert_eq!(repo.tmp_path(), Path::new("/data/tasks.json.tmp"));
}

#[test]
fn interrupted_save_leaves_original_intact() {
    let dir = tempfile::tempdir().unwrap();
    let repo = repo_in(dir.path());
    let tasks = sample_tasks();
    repo.save(&tasks).unwrap();
    let before = fs::read_to_string(repo.path()).unwrap();

    // Simulate a crash after the temp file was written but before rename.
    fs::write(repo.tmp_path(), "[{\"id\": 9, \"title\": \"half").unwrap();

    assert_eq!(fs::read_to_string(repo.path()).unwrap(), before);
    assert_eq!(repo.load().unwrap(), tasks);

    // The next successful save replaces the stale temp file.
    repo.save(&tasks[..1]).unwrap();
    assert_eq!(repo.load().unwrap(), tasks[..1].to_vec());
    assert!(!repo.tmp_path().exists());
}

#[test]
fn failed_save_keeps_previous_content() {
    let dir = tempfile::tempdir().unwrap();
    let repo = repo_in(dir.path());
    let tasks = sample_tasks();
    repo.save(&tasks).unwrap();

    // A directory squatting on the temp path makes the write fail.
    fs::create_dir(repo.tmp_path()).unwrap();
    let err = repo.save(&[]).unwrap_err();
    assert!(matches!(err, StorageError::Io { .. }));

    assert_eq!(repo.load().unwrap(), tasks);
}

#[test]
fn load_skips_records_missing_id_or_title() {
    let dir = tempfile::tempdir().unwrap();
    let repo = repo_in(dir.path());
    fs::write(
        repo.path(),
        r#"[
            {"id": 1, "title": "keep", "extra": [1, 2]},
            {"title": "no id"},
            {"id": 2},
            "not an object",
            42,
            {"id": 3, "title": "also keep", "done": true}
        ]"#,
    )
    .unwrap();

    let tasks = repo.load().unwrap();
    let ids = tasks.iter().map(|task| task.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![1, 3]);
    assert!(!tasks[0].done);
    assert_eq!(tasks[0].created_at, "");
    assert!(tasks[1].done);
}

#[test]
fn load_coerces_compatible_field_types() {
    let dir = tempfile::tempdir().unwrap();
    let repo = repo_in(dir.path());
    fs::write(
        repo.path(),
        r#"[
            {"id": "4", "title": 2024, "done": 1, "created_at": null},
            {"id": 5.0, "title": "five", "done": null}
        ]"#,
    )
    .unwrap();

    let tasks = repo.load().unwrap();
    assert_eq!(tasks[0].id, 4);
    assert_eq!(tasks[0].title, "2024");
    assert!(tasks[0].done);
    assert_eq!(tasks[0].created_at, "");
    assert_eq!(tasks[1].id, 5);
    assert!(!tasks[1].done);
}

#[test]
fn load_rejects_uncoercible_present_fields() {
    let dir = tempfile::tempdir().unwrap();
    let repo = repo_in(dir.path());

    for content in [
        r#"[{"id": "abc", "title": "x"}]"#,
        r#"[{"id": -1, "title": "x"}]"#,
        r#"[{"id": 0, "title": "x"}]"#,
        r#"[{"id": 1e30, "title": "x"}]"#,
        r#"[{"id": 18446744073709551616.0, "title": "x"}]"#,
        r#"[{"id": 1, "title": {"nested": true}}]"#,
        r#"[{"id": 1, "title": "x", "done": "yes"}]"#,
        r#"[{"id": 1, "title": "x", "created_at": 5}]"#,
    ] {
        fs::write(repo.path(), content).unwrap();
        let err = repo.load().unwrap_err();
        assert!(
            matches!(err, StorageError::InvalidData { .. }),
            "unexpected result for {content}: {err}"
        );
    }
}

#[test]
fn load_rejects_duplicate_ids() {
    let dir = tempfile::tempdir().unwrap();
    let repo = repo_in(dir.path());
    fs::write(
        repo.path(),
        r#"[{"id": 1, "title": "a"}, {"id": 1, "title": "b"}]"#,
    )
    .unwrap();

    let err = repo.load().unwrap_err();
    assert!(err.to_string().contains("duplicate task id 1"));
}

#[test]
fn load_rejects_corrupt_json() {
    let dir = tempfile::tempdir().unwrap();
    let repo = repo_in(dir.path());
    fs::write(repo.path(), "this is not json").unwrap();

    let err = repo.load().unwrap_err();
    assert!(matches!(err, StorageError::Json { .. }));
    assert_eq!(err.path(), repo.path());
}

#[test]
fn load_rejects_non_array_top_level() {
    let dir = tempfile::tempdir().unwrap();
    let repo = repo_in(dir.path());
    fs::write(repo.path(), r#"{"id": 1, "title": "x"}"#).unwrap();

    let err = repo.load().unwrap_err();
    assert!(matches!(
        err,
        StorageError::InvalidFormat {
            found: "an object",
            ..
        }
    ));
}
