// File: src/service.rs
use crate::error::{TaskError, TaskResult};
use crate::model::{NewTask, Task, TaskPatch};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::{info, instrument};

/// The four persistence operations the controller relies on.
#[async_trait]
pub trait TaskService: Send + Sync {
    async fn create_task(&self, new_task: NewTask) -> TaskResult<Task>;
    async fn list_all_tasks(&self) -> TaskResult<Vec<Task>>;
    async fn update_task(&self, id: i64, patch: TaskPatch) -> TaskResult<Task>;
    /// `Ok(false)` when no row had this id.
    async fn delete_task(&self, id: i64) -> TaskResult<bool>;
}

#[derive(Clone, Debug)]
pub struct SqliteTaskService {
    pool: SqlitePool,
}

impl SqliteTaskService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// `updated_at` must move forward on every write, even within one clock tick.
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    let floor = previous + Duration::milliseconds(1);
    if now > floor { now } else { floor }
}

#[async_trait]
impl TaskService for SqliteTaskService {
    #[instrument(skip(self, new_task), fields(date = %new_task.date))]
    async fn create_task(&self, new_task: NewTask) -> TaskResult<Task> {
        new_task.validate()?;
        let now = Utc::now();

        let task: Task = sqlx::query_as(
            r#"INSERT INTO tasks (text, date, time, completed, created_at, updated_at)
            VALUES ($1, $2, $3, 0, $4, $5)
            RETURNING id, text, date, time, completed, created_at, updated_at
            "#,
        )
        .bind(&new_task.text)
        .bind(new_task.date)
        .bind(&new_task.time)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        info!(id = task.id, "task created");
        Ok(task)
    }

    async fn list_all_tasks(&self) -> TaskResult<Vec<Task>> {
        let tasks = sqlx::query_as(
            "SELECT id, text, date, time, completed, created_at, updated_at FROM tasks ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    #[instrument(skip(self, patch))]
    async fn update_task(&self, id: i64, patch: TaskPatch) -> TaskResult<Task> {
        patch.validate()?;
        let mut tx = self.pool.begin().await?;

        // Must write before reading: a transaction holding a read snapshot
        // cannot wait for the write lock and fails with SQLITE_BUSY.
        let patched: Option<Task> = sqlx::query_as(
            r#"UPDATE tasks SET
                text = COALESCE($1, text),
                date = COALESCE($2, date),
                time = COALESCE($3, time),
                completed = COALESCE($4, completed)
            WHERE id = $5
            RETURNING id, text, date, time, completed, created_at, updated_at
            "#,
        )
        .bind(patch.text.as_deref())
        .bind(patch.date)
        .bind(patch.time.as_deref())
        .bind(patch.completed)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let mut next = patched.ok_or(TaskError::NotFound(id))?;

        next.updated_at = next_timestamp(next.updated_at);
        sqlx::query("UPDATE tasks SET updated_at = $1 WHERE id = $2")
            .bind(next.updated_at)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(id, completed = next.completed, "task updated");
        Ok(next)
    }

    #[instrument(skip(self))]
    async fn delete_task(&self, id: i64) -> TaskResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        info!(id, removed, "task delete");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::NaiveDate;
    use std::sync::Arc;

    async fn service() -> SqliteTaskService {
        let pool = db::connect_in_memory().await.unwrap();
        SqliteTaskService::new(pool)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let svc = service().await;
        let created = svc
            .create_task(NewTask::new("Pay rent", date(2024, 4, 1), "09:00"))
            .await
            .unwrap();
        assert!(!created.completed);
        assert!(created.id > 0);

        let all = svc.list_all_tasks().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, created.id);
        assert_eq!(all[0].text, "Pay rent");
        assert_eq!(all[0].date, date(2024, 4, 1));
        assert_eq!(all[0].time, "09:00");
        assert!(!all[0].completed);
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let svc = service().await;
        for (i, text) in ["first", "second", "third"].iter().enumerate() {
            svc.create_task(NewTask::new(*text, date(2024, 1, 3 - i as u32), "08:00"))
                .await
                .unwrap();
        }
        let texts: Vec<String> = svc
            .list_all_tasks()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let svc = service().await;
        let err = svc
            .create_task(NewTask::new("", date(2024, 4, 1), "09:00"))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));

        let err = svc
            .create_task(NewTask::new("x", date(2024, 4, 1), ""))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));

        assert!(svc.list_all_tasks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_completion_bumps_updated_at() {
        let svc = service().await;
        let created = svc
            .create_task(NewTask::new("Pay rent", date(2024, 4, 1), "09:00"))
            .await
            .unwrap();

        let updated = svc
            .update_task(created.id, TaskPatch::completion(true))
            .await
            .unwrap();
        assert!(updated.completed);

        let reread = svc
            .list_all_tasks()
            .await
            .unwrap()
            .into_iter()
            .find(|t| t.id == created.id)
            .unwrap();
        assert!(reread.completed);
        assert!(reread.updated_at > created.updated_at);
        assert_eq!(reread.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_is_partial() {
        let svc = service().await;
        let created = svc
            .create_task(NewTask::new("Dentist", date(2024, 5, 2), "14:30"))
            .await
            .unwrap();

        let updated = svc
            .update_task(
                created.id,
                TaskPatch {
                    time: Some("15:00:00".into()),
                    ..TaskPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.text, "Dentist");
        assert_eq!(updated.date, date(2024, 5, 2));
        assert_eq!(updated.time, "15:00:00");
        assert!(!updated.completed);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let svc = service().await;
        let err = svc
            .update_task(42, TaskPatch::completion(true))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::NotFound(42)));
    }

    #[tokio::test]
    async fn test_delete_existing_and_missing() {
        let svc = service().await;
        let a = svc
            .create_task(NewTask::new("a", date(2024, 1, 1), "10:00"))
            .await
            .unwrap();
        let b = svc
            .create_task(NewTask::new("b", date(2024, 1, 2), "10:00"))
            .await
            .unwrap();

        assert!(svc.delete_task(a.id).await.unwrap());
        let left = svc.list_all_tasks().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, b.id);

        assert!(!svc.delete_task(a.id).await.unwrap());
        assert!(!svc.delete_task(999).await.unwrap());
        assert_eq!(svc.list_all_tasks().await.unwrap(), left);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let svc = service().await;
        let a = svc
            .create_task(NewTask::new("a", date(2024, 1, 1), "10:00"))
            .await
            .unwrap();
        svc.delete_task(a.id).await.unwrap();
        let b = svc
            .create_task(NewTask::new("b", date(2024, 1, 1), "10:00"))
            .await
            .unwrap();
        assert!(b.id > a.id);
    }

    async fn file_service(dir: &tempfile::TempDir) -> SqliteTaskService {
        let url = format!("sqlite://{}", dir.path().join("tasks.db").display());
        SqliteTaskService::new(db::connect(&url).await.unwrap())
    }

    #[tokio::test]
    async fn test_file_database_survives_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let created = file_service(&dir)
            .await
            .create_task(NewTask::new("Pay rent", date(2024, 4, 1), "09:00"))
            .await
            .unwrap();

        let reopened = file_service(&dir).await;
        assert_eq!(reopened.list_all_tasks().await.unwrap(), vec![created]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_on_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let svc = Arc::new(file_service(&dir).await);
        let mut ids = Vec::new();
        for text in ["a", "b"] {
            let task = svc
                .create_task(NewTask::new(text, date(2024, 4, 1), "09:00"))
                .await
                .unwrap();
            ids.push(task.id);
        }

        let mut handles = Vec::new();
        for round in 0..40 {
            for &id in &ids {
                let svc = svc.clone();
                handles.push(tokio::spawn(async move {
                    svc.update_task(id, TaskPatch::completion(round % 2 == 0))
                        .await
                }));
            }
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let tasks = svc.list_all_tasks().await.unwrap();
        assert_eq!(tasks.len(), 2);
        for task in tasks {
            assert!(task.updated_at > task.created_at);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_mixed_mutations_on_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let svc = Arc::new(file_service(&dir).await);
        let keep = svc
            .create_task(NewTask::new("keep", date(2024, 4, 1), "09:00"))
            .await
            .unwrap();
        let doomed = svc
            .create_task(NewTask::new("doomed", date(2024, 4, 2), "10:00"))
            .await
            .unwrap();

        let (keep_id, doomed_id) = (keep.id, doomed.id);

        let mut handles = Vec::new();
        for i in 0..20 {
            let svc_update = svc.clone();
            handles.push(tokio::spawn(async move {
                let patch = TaskPatch {
                    text: Some(format!("keep {}", i)),
                    ..Default::default()
                };
                svc_update.update_task(keep_id, patch).await.map(|_| ())
            }));
            let svc_create = svc.clone();
            handles.push(tokio::spawn(async move {
                svc_create.create_task(NewTask::new(format!("new {}", i), date(2024, 4, 3), "11:00"))
                    .await
                    .map(|_| ())
            }));
        }
        let deleted = {
            let svc = svc.clone();
            tokio::spawn(async move { svc.delete_task(doomed_id).await })
        };
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert!(deleted.await.unwrap().unwrap());

        let tasks = svc.list_all_tasks().await.unwrap();
        assert_eq!(tasks.len(), 21);
        assert!(tasks.iter().all(|t| t.id != doomed_id));
        assert!(tasks.iter().any(|t| t.id == keep_id && t.text.starts_with("keep ")));
    }
}
