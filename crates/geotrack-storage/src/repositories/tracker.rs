#![allow(async_fn_in_trait)]

use crate::error::{StorageError, StorageResult};
use crate::models::Tracker;
use sqlx::SqlitePool;

/// Repository trait for tracker record operations
///
/// Uses native async trait methods (Edition 2024), so no async-trait crate
/// is required. Implementations must be safe to share across session tasks.
pub trait TrackerRepository: Send + Sync {
    /// Find a tracker by the device id it transmits on the wire
    async fn find_by_device_id(&self, device_id: &str) -> StorageResult<Option<Tracker>>;

    /// Find a tracker by its row id
    async fn find_by_id(&self, id: i64) -> StorageResult<Option<Tracker>>;

    /// Create a new tracker, returning the assigned row id
    async fn create(&self, tracker: &Tracker) -> StorageResult<i64>;

    /// Update an existing tracker
    async fn update(&self, tracker: &Tracker) -> StorageResult<()>;

    /// Delete a tracker by row id
    async fn delete(&self, id: i64) -> StorageResult<()>;
}

/// SQLite implementation of TrackerRepository
pub struct SqliteTrackerRepository {
    pool: SqlitePool,
}

impl SqliteTrackerRepository {
    /// Create a new SQLite tracker repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl TrackerRepository for SqliteTrackerRepository {
    async fn find_by_device_id(&self, device_id: &str) -> StorageResult<Option<Tracker>> {
        let tracker = sqlx::query_as::<_, Tracker>(
            r#"
            SELECT id, device_id, phone, name, imei, comment,
                   response_interval_secs, status, connection_status, created_at
            FROM trackers
            WHERE device_id = ?
            "#,
        )
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tracker)
    }

    async fn find_by_id(&self, id: i64) -> StorageResult<Option<Tracker>> {
        let tracker = sqlx::query_as::<_, Tracker>(
            r#"
            SELECT id, device_id, phone, name, imei, comment,
                   response_interval_secs, status, connection_status, created_at
            FROM trackers
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tracker)
    }

    async fn create(&self, tracker: &Tracker) -> StorageResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO trackers (
                device_id, phone, name, imei, comment,
                response_interval_secs, status, connection_status, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&tracker.device_id)
        .bind(&tracker.phone)
        .bind(&tracker.name)
        .bind(&tracker.imei)
        .bind(&tracker.comment)
        .bind(tracker.response_interval_secs)
        .bind(&tracker.status)
        .bind(&tracker.connection_status)
        .bind(tracker.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn update(&self, tracker: &Tracker) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE trackers
            SET device_id = ?, phone = ?, name = ?, imei = ?, comment = ?,
                response_interval_secs = ?, status = ?, connection_status = ?
            WHERE id = ?
            "#,
        )
        .bind(&tracker.device_id)
        .bind(&tracker.phone)
        .bind(&tracker.name)
        .bind(&tracker.imei)
        .bind(&tracker.comment)
        .bind(tracker.response_interval_secs)
        .bind(&tracker.status)
        .bind(&tracker.connection_status)
        .bind(tracker.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound {
                entity_type: "Tracker",
                field: "id",
                value: tracker.id.to_string(),
            });
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM trackers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound {
                entity_type: "Tracker",
                field: "id",
                value: id.to_string(),
            });
        }

        Ok(())
    }
}
