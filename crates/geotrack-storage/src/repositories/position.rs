#![allow(async_fn_in_trait)]

use crate::error::{StorageError, StorageResult};
use crate::models::Position;
use sqlx::SqlitePool;

/// Repository trait for persisted GPS fixes
pub trait PositionRepository: Send + Sync {
    /// Store a new position, returning the assigned row id
    async fn create(&self, position: &Position) -> StorageResult<i64>;

    /// All positions reported by one tracker, oldest first
    async fn find_by_tracker(&self, tracker_id: i64) -> StorageResult<Vec<Position>>;

    /// Delete a position by row id
    async fn delete(&self, id: i64) -> StorageResult<()>;
}

/// SQLite implementation of PositionRepository
pub struct SqlitePositionRepository {
    pool: SqlitePool,
}

impl SqlitePositionRepository {
    /// Create a new SQLite position repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl PositionRepository for SqlitePositionRepository {
    async fn create(&self, position: &Position) -> StorageResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO positions (
                tracker_id, fix_time, created_at, availability,
                latitude, latitude_indicator, longitude, longitude_indicator,
                speed, heading, io_state, mile_post, mile_data
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(position.tracker_id)
        .bind(position.fix_time)
        .bind(position.created_at)
        .bind(&position.availability)
        .bind(position.latitude)
        .bind(&position.latitude_indicator)
        .bind(position.longitude)
        .bind(&position.longitude_indicator)
        .bind(position.speed)
        .bind(position.heading)
        .bind(&position.io_state)
        .bind(&position.mile_post)
        .bind(&position.mile_data)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn find_by_tracker(&self, tracker_id: i64) -> StorageResult<Vec<Position>> {
        let positions = sqlx::query_as::<_, Position>(
            r#"
            SELECT id, tracker_id, fix_time, created_at, availability,
                   latitude, latitude_indicator, longitude, longitude_indicator,
                   speed, heading, io_state, mile_post, mile_data
            FROM positions
            WHERE tracker_id = ?
            ORDER BY fix_time
            "#,
        )
        .bind(tracker_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(positions)
    }

    async fn delete(&self, id: i64) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM positions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound {
                entity_type: "Position",
                field: "id",
                value: id.to_string(),
            });
        }

        Ok(())
    }
}
