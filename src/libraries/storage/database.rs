use crate::libraries::events::{time, TypeReading, VolumeReading};
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use thiserror::Error;

/// Persistence errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// The database rejected or failed an operation
    #[error("database operation failed")]
    Database(#[from] sqlx::Error),
    /// A record carried a timestamp that is not in the wire format
    #[error("record carried an invalid timestamp")]
    InvalidTimestamp(#[from] chrono::ParseError),
}

/// Persisted hair volume reading
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct VolumeRow {
    pub id: i64,
    pub salon_id: String,
    pub salon_name: String,
    pub hair_volume: f64,
    pub disposal_method: String,
    pub batch_timestamp: NaiveDateTime,
    pub reading_timestamp: NaiveDateTime,
    pub date_created: NaiveDateTime,
    pub trace_id: String,
}

/// Persisted hair type reading
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TypeRow {
    pub id: i64,
    pub salon_id: String,
    pub salon_name: String,
    pub hair_colour: String,
    pub hair_texture: String,
    pub hair_thickness: f64,
    pub batch_timestamp: NaiveDateTime,
    pub reading_timestamp: NaiveDateTime,
    pub date_created: NaiveDateTime,
    pub trace_id: String,
}

/// Handle onto the reading store
///
/// Each operation runs in its own short-lived session; a reading is either fully committed or
/// not stored at all. The `id` and `date_created` columns are assigned by the database.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database, creating the file and tables when missing
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // In-memory databases exist per connection, so the pool must not fan out
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(include_str!("sql/volume.sql"))
            .execute(&pool)
            .await?;
        sqlx::query(include_str!("sql/type.sql"))
            .execute(&pool)
            .await?;

        Ok(Self { pool })
    }

    /// Stores one volume reading, converting its wire timestamps to structured form
    pub async fn insert_volume_reading(&self, record: &VolumeReading) -> Result<(), StorageError> {
        let batch_timestamp = time::parse_wire_timestamp(&record.batch_timestamp)?;
        let reading_timestamp = time::parse_wire_timestamp(&record.reading_timestamp)?;

        sqlx::query(
            r#"
                INSERT INTO Volume ( salon_id, salon_name, hair_volume, disposal_method, batch_timestamp, reading_timestamp, trace_id )
                VALUES ( ?, ?, ?, ?, ?, ?, ? )
            "#,
        )
        .bind(&record.salon_id)
        .bind(&record.salon_name)
        .bind(record.hair_volume)
        .bind(&record.disposal_method)
        .bind(batch_timestamp)
        .bind(reading_timestamp)
        .bind(record.trace_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Stores one type reading, converting its wire timestamps to structured form
    pub async fn insert_type_reading(&self, record: &TypeReading) -> Result<(), StorageError> {
        let batch_timestamp = time::parse_wire_timestamp(&record.batch_timestamp)?;
        let reading_timestamp = time::parse_wire_timestamp(&record.reading_timestamp)?;

        sqlx::query(
            r#"
                INSERT INTO Type ( salon_id, salon_name, hair_colour, hair_texture, hair_thickness, batch_timestamp, reading_timestamp, trace_id )
                VALUES ( ?, ?, ?, ?, ?, ?, ?, ? )
            "#,
        )
        .bind(&record.salon_id)
        .bind(&record.salon_name)
        .bind(&record.hair_colour)
        .bind(&record.hair_texture)
        .bind(record.hair_thickness)
        .bind(batch_timestamp)
        .bind(reading_timestamp)
        .bind(record.trace_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Volume readings whose creation time falls into `[start, end)`
    pub async fn volume_readings_created_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<VolumeRow>, StorageError> {
        let rows = sqlx::query_as::<_, VolumeRow>(
            r#"
                SELECT id, salon_id, salon_name, hair_volume, disposal_method, batch_timestamp, reading_timestamp, date_created, trace_id
                FROM Volume
                WHERE date_created >= ? AND date_created < ?
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Type readings whose creation time falls into `[start, end)`
    pub async fn type_readings_created_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<TypeRow>, StorageError> {
        let rows = sqlx::query_as::<_, TypeRow>(
            r#"
                SELECT id, salon_id, salon_name, hair_colour, hair_texture, hair_thickness, batch_timestamp, reading_timestamp, date_created, trace_id
                FROM Type
                WHERE date_created >= ? AND date_created < ?
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn volume_record() -> VolumeReading {
        VolumeReading {
            salon_id: "S-1".into(),
            salon_name: "Clip Joint".into(),
            hair_volume: 12.5,
            disposal_method: "compost".into(),
            batch_timestamp: "2024-03-01 10:00:00".into(),
            reading_timestamp: "2024-03-01 09:58:00".into(),
            trace_id: Uuid::new_v4(),
        }
    }

    async fn database() -> Database {
        Database::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn stores_and_returns_volume_readings() {
        let database = database().await;
        let record = volume_record();

        database.insert_volume_reading(&record).await.unwrap();

        let now = Utc::now().naive_utc();
        let rows = database
            .volume_readings_created_between(now - Duration::hours(1), now + Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].salon_id, "S-1");
        assert_eq!(rows[0].hair_volume, 12.5);
        assert_eq!(rows[0].trace_id, record.trace_id.to_string());
        assert_eq!(
            rows[0].batch_timestamp,
            time::parse_wire_timestamp("2024-03-01 10:00:00").unwrap()
        );
    }

    #[tokio::test]
    async fn date_created_is_assigned_by_the_store() {
        let database = database().await;
        database
            .insert_volume_reading(&volume_record())
            .await
            .unwrap();

        let now = Utc::now().naive_utc();
        let rows = database
            .volume_readings_created_between(now - Duration::hours(1), now + Duration::hours(1))
            .await
            .unwrap();

        // The record's own timestamps are from 2024; creation time comes from the store
        let age = now - rows[0].date_created;
        assert!(age < Duration::minutes(5));
        assert!(rows[0].date_created > rows[0].batch_timestamp);
    }

    #[tokio::test]
    async fn range_query_excludes_rows_outside_the_window() {
        let database = database().await;
        database
            .insert_volume_reading(&volume_record())
            .await
            .unwrap();

        let long_ago = time::parse_wire_timestamp("2001-01-01 00:00:00").unwrap();
        let rows = database
            .volume_readings_created_between(long_ago, long_ago + Duration::days(1))
            .await
            .unwrap();

        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn duplicate_trace_ids_are_permitted() {
        let database = database().await;
        let record = volume_record();

        database.insert_volume_reading(&record).await.unwrap();
        database.insert_volume_reading(&record).await.unwrap();

        let now = Utc::now().naive_utc();
        let rows = database
            .volume_readings_created_between(now - Duration::hours(1), now + Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_ne!(rows[0].id, rows[1].id);
        assert_eq!(rows[0].trace_id, rows[1].trace_id);
    }

    #[tokio::test]
    async fn stores_type_readings() {
        let database = database().await;
        let record = TypeReading {
            salon_id: "S-2".into(),
            salon_name: "Shear Genius".into(),
            hair_colour: "auburn".into(),
            hair_texture: "wavy".into(),
            hair_thickness: 0.07,
            batch_timestamp: "2024-03-01 11:00:00".into(),
            reading_timestamp: "2024-03-01 10:59:00".into(),
            trace_id: Uuid::new_v4(),
        };

        database.insert_type_reading(&record).await.unwrap();

        let now = Utc::now().naive_utc();
        let rows = database
            .type_readings_created_between(now - Duration::hours(1), now + Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].hair_colour, "auburn");
        assert_eq!(rows[0].hair_thickness, 0.07);
    }

    #[tokio::test]
    async fn rejects_records_with_malformed_timestamps() {
        let database = database().await;
        let mut record = volume_record();
        record.batch_timestamp = "not a timestamp".into();

        let result = database.insert_volume_reading(&record).await;

        assert!(matches!(result, Err(StorageError::InvalidTimestamp(_))));
    }
}
