use async_trait::async_trait;
use object_store::Locator;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use time::OffsetDateTime;
use uuid::Uuid;

use common::custody::{NewObjectRecord, ObjectRecord, ObjectRepository};

use super::types::DUuid;
use super::Database;

const RECORD_COLUMNS: &str = "id, original_name, locator, owner_id, content_type, size_bytes, \
     encryption_alg, authentication_alg, created_at, updated_at, deleted_at";

// Whole seconds, so a record read back compares equal to the one written
fn now() -> Result<OffsetDateTime, sqlx::Error> {
    OffsetDateTime::now_utc()
        .replace_nanosecond(0)
        .map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

fn record_from_row(row: &SqliteRow) -> Result<ObjectRecord, sqlx::Error> {
    let id: DUuid = row.try_get("id")?;
    let locator: String = row.try_get("locator")?;
    let size_bytes: i64 = row.try_get("size_bytes")?;

    Ok(ObjectRecord {
        id: id.into(),
        original_name: row.try_get("original_name")?,
        locator: Locator::new(locator),
        owner_id: row.try_get("owner_id")?,
        content_type: row.try_get("content_type")?,
        size_bytes: u64::try_from(size_bytes).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        encryption_alg: row.try_get("encryption_alg")?,
        authentication_alg: row.try_get("authentication_alg")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
    })
}

#[async_trait]
impl ObjectRepository for Database {
    type Error = sqlx::Error;

    async fn create(&self, record: NewObjectRecord) -> Result<ObjectRecord, Self::Error> {
        let id = DUuid::new();
        let now = now()?;
        let size_bytes =
            i64::try_from(record.size_bytes).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        sqlx::query(
            r#"
            INSERT INTO object_records (
                id, original_name, locator, owner_id, content_type, size_bytes,
                encryption_alg, authentication_alg, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(&record.original_name)
        .bind(record.locator.as_str())
        .bind(&record.owner_id)
        .bind(&record.content_type)
        .bind(size_bytes)
        .bind(&record.encryption_alg)
        .bind(&record.authentication_alg)
        .bind(now)
        .bind(now)
        .execute(&**self)
        .await?;

        tracing::debug!(object_id = %id, locator = %record.locator, "object record created");

        Ok(ObjectRecord {
            id: id.into(),
            original_name: record.original_name,
            locator: record.locator,
            owner_id: record.owner_id,
            content_type: record.content_type,
            size_bytes: record.size_bytes,
            encryption_alg: record.encryption_alg,
            authentication_alg: record.authentication_alg,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }

    async fn find(&self, id: Uuid) -> Result<Option<ObjectRecord>, Self::Error> {
        let query = format!(
            "SELECT {} FROM object_records WHERE id = ? AND deleted_at IS NULL",
            RECORD_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(DUuid::from(id))
            .fetch_optional(&**self)
            .await?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<ObjectRecord>, Self::Error> {
        // rowid breaks ties between records created within the same second
        let query = format!(
            "SELECT {} FROM object_records \
             WHERE owner_id = ? AND deleted_at IS NULL \
             ORDER BY created_at DESC, rowid DESC",
            RECORD_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(owner_id)
            .fetch_all(&**self)
            .await?;

        rows.iter().map(record_from_row).collect()
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, Self::Error> {
        let now = now()?;
        let result = sqlx::query(
            r#"
            UPDATE object_records
            SET deleted_at = ?, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(DUuid::from(id))
        .execute(&**self)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
