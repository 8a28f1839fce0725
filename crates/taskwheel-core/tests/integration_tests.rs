use chrono::{Days, Local};
use tempfile::TempDir;

use taskwheel_core::db::establish_connection;
use taskwheel_core::error::CoreError;
use taskwheel_core::models::{CompletionResult, NewTaskData, Task};
use taskwheel_core::recurrence::{format_date, next_date};
use taskwheel_core::repository::{SqliteRepository, TaskRepository};

/// Helper function to create a test database
async fn setup_test_db() -> (SqliteRepository, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");

    let pool = establish_connection(&db_path.to_string_lossy())
        .await
        .expect("Failed to establish test database connection");

    (SqliteRepository::new(pool), temp_dir)
}

fn today_text() -> String {
    format_date(Local::now().date_naive())
}

fn tomorrow_text() -> String {
    format_date(Local::now().date_naive() + Days::new(1))
}

async fn create_task(repo: &SqliteRepository, date: &str, title: &str, repeat: &str) -> Task {
    repo.add_task(NewTaskData {
        date: date.to_string(),
        title: title.to_string(),
        comment: String::new(),
        repeat: repeat.to_string(),
    })
    .await
    .expect("Failed to create test task")
}

#[tokio::test]
async fn test_basic_task_crud_workflow() {
    let (repo, _temp_dir) = setup_test_db().await;

    let task = repo
        .add_task(NewTaskData {
            date: "29991231".to_string(),
            title: "Renew passport".to_string(),
            comment: "bring photos".to_string(),
            repeat: String::new(),
        })
        .await
        .expect("Failed to add task");

    assert!(task.id > 0);
    assert_eq!(task.date, "29991231");
    assert_eq!(task.title, "Renew passport");

    let found = repo
        .find_task_by_id(task.id)
        .await
        .expect("Failed to fetch task")
        .expect("Task should exist");
    assert_eq!(found, task);

    let updated = repo
        .update_task(Task {
            title: "Renew passport early".to_string(),
            ..found
        })
        .await
        .expect("Failed to update task");
    assert_eq!(updated.title, "Renew passport early");
    assert_eq!(updated.date, "29991231");

    repo.delete_task(task.id).await.expect("Failed to delete task");

    let gone = repo.find_task_by_id(task.id).await.unwrap();
    assert!(gone.is_none());
}

#[tokio::test]
async fn test_add_task_rejects_missing_title() {
    let (repo, _temp_dir) = setup_test_db().await;

    let result = repo.add_task(NewTaskData::default()).await;
    assert!(matches!(result, Err(CoreError::InvalidInput(_))));
}

#[tokio::test]
async fn test_add_task_rejects_malformed_rule() {
    let (repo, _temp_dir) = setup_test_db().await;

    let result = repo
        .add_task(NewTaskData {
            title: "Water the plants".to_string(),
            repeat: "x 1".to_string(),
            ..Default::default()
        })
        .await;
    assert!(matches!(result, Err(CoreError::Recurrence(_))));
}

#[tokio::test]
async fn test_add_task_defaults_empty_date_to_today() {
    let (repo, _temp_dir) = setup_test_db().await;

    let task = create_task(&repo, "", "Water the plants", "").await;
    assert_eq!(task.date, today_text());
}

#[tokio::test]
async fn test_add_task_moves_stale_date_forward() {
    let (repo, _temp_dir) = setup_test_db().await;

    // One-shot task in the past lands on today.
    let one_shot = create_task(&repo, "20200101", "Water the plants", "").await;
    assert_eq!(one_shot.date, today_text());

    // Recurring task in the past lands on the rule's next occurrence.
    let recurring = create_task(&repo, "20200101", "Pay rent", "d 3").await;
    let today = Local::now().date_naive();
    let expected = next_date(today, "20200101", "d 3").unwrap();
    assert_eq!(recurring.date, expected);
}

#[tokio::test]
async fn test_complete_one_shot_task_deletes_it() {
    let (repo, _temp_dir) = setup_test_db().await;

    let task = create_task(&repo, "29991231", "Renew passport", "").await;

    let result = repo
        .complete_task(task.id)
        .await
        .expect("Failed to complete task");
    assert!(matches!(result, CompletionResult::Finished));

    let gone = repo.find_task_by_id(task.id).await.unwrap();
    assert!(gone.is_none());
}

#[tokio::test]
async fn test_complete_recurring_task_reschedules_it() {
    let (repo, _temp_dir) = setup_test_db().await;

    let tomorrow = tomorrow_text();
    let task = create_task(&repo, &tomorrow, "Daily standup", "d 1").await;
    assert_eq!(task.date, tomorrow);

    let result = repo
        .complete_task(task.id)
        .await
        .expect("Failed to complete task");

    let today = Local::now().date_naive();
    let expected = next_date(today, &tomorrow, "d 1").unwrap();
    match result {
        CompletionResult::Rescheduled(rescheduled) => {
            assert_eq!(rescheduled.id, task.id);
            assert_eq!(rescheduled.date, expected);
        }
        CompletionResult::Finished => panic!("Expected a rescheduled completion result"),
    }

    // The stored row carries the new date; nothing else changed.
    let stored = repo
        .find_task_by_id(task.id)
        .await
        .unwrap()
        .expect("Task should still exist");
    assert_eq!(stored.date, expected);
    assert_eq!(stored.title, "Daily standup");
    assert_eq!(stored.repeat, "d 1");
}

#[tokio::test]
async fn test_complete_missing_task_is_not_found() {
    let (repo, _temp_dir) = setup_test_db().await;

    let result = repo.complete_task(9999).await;
    assert!(matches!(result, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn test_find_tasks_orders_and_limits() {
    let (repo, _temp_dir) = setup_test_db().await;

    create_task(&repo, "29991203", "Third", "").await;
    create_task(&repo, "29991201", "First", "").await;
    create_task(&repo, "29991202", "Second", "").await;

    let all = repo.find_tasks(None, 50).await.unwrap();
    let titles: Vec<&str> = all.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["First", "Second", "Third"]);

    let limited = repo.find_tasks(None, 2).await.unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].title, "First");
}

#[tokio::test]
async fn test_find_tasks_searches_title_and_comment() {
    let (repo, _temp_dir) = setup_test_db().await;

    create_task(&repo, "29991201", "Buy groceries", "").await;
    repo.add_task(NewTaskData {
        date: "29991202".to_string(),
        title: "Call plumber".to_string(),
        comment: "about the groceries delivery hatch".to_string(),
        repeat: String::new(),
    })
    .await
    .unwrap();
    create_task(&repo, "29991203", "Stretch", "").await;

    let found = repo.find_tasks(Some("groceries"), 50).await.unwrap();
    assert_eq!(found.len(), 2);

    let none = repo.find_tasks(Some("dentist"), 50).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_find_tasks_searches_by_date() {
    let (repo, _temp_dir) = setup_test_db().await;

    create_task(&repo, "29991201", "Buy groceries", "").await;
    create_task(&repo, "29991202", "Call plumber", "").await;

    let found = repo.find_tasks(Some("01.12.2999"), 50).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Buy groceries");
}

#[tokio::test]
async fn test_update_missing_task_is_not_found() {
    let (repo, _temp_dir) = setup_test_db().await;

    let result = repo
        .update_task(Task {
            id: 9999,
            date: "29991231".to_string(),
            title: "Ghost".to_string(),
            comment: String::new(),
            repeat: String::new(),
        })
        .await;
    assert!(matches!(result, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_missing_task_is_not_found() {
    let (repo, _temp_dir) = setup_test_db().await;

    let result = repo.delete_task(9999).await;
    assert!(matches!(result, Err(CoreError::NotFound(_))));
}
