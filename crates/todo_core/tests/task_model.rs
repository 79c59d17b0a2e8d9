use todo_core::{normalize_title, Task, TaskValidationError};

#[test]
fn task_new_sets_defaults() {
    let task = Task::new(1, "  Buy milk  ").unwrap();

    assert_eq!(task.id, 1);
    assert_eq!(task.title, "Buy milk");
    assert!(!task.done);
    // YYYY-MM-DDTHH:MM:SS
    assert_eq!(task.created_at.len(), 19);
    assert_eq!(&task.created_at[10..11], "T");
}

#[test]
fn task_new_rejects_blank_title_and_zero_id() {
    assert_eq!(Task::new(1, "   ").unwrap_err(), TaskValidationError::EmptyTitle);
    assert_eq!(Task::new(0, "x").unwrap_err(), TaskValidationError::InvalidId(0));
}

#[test]
fn toggle_flips_done() {
    let mut task = Task::with_created_at(1, "X", "").unwrap();
    assert!(task.toggle());
    assert!(!task.toggle());
}

#[test]
fn normalize_title_trims() {
    assert_eq!(normalize_title("  a b ").unwrap(), "a b");
    assert_eq!(normalize_title("\t \n").unwrap_err(), TaskValidationError::EmptyTitle);
}

#[test]
fn serialization_uses_persisted_field_names() {
    let task = Task::with_created_at(7, "Write report", "2024-05-01T09:30:00").unwrap();

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "id": 7,
            "title": "Write report",
            "done": false,
            "created_at": "2024-05-01T09:30:00"
        })
    );
}
