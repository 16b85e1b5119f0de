use std::fmt;

use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::sqlite::{SqliteArgumentValue, SqliteTypeInfo, SqliteValueRef};
use sqlx::{Decode, Encode, Sqlite, Type};
use uuid::Uuid;

/// Object id stored as hyphenated TEXT
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DUuid(Uuid);

impl DUuid {
    /// A fresh random (v4) id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DUuid {
    fn default() -> Self {
        Self::new()
    }
}

impl From<DUuid> for Uuid {
    fn from(id: DUuid) -> Self {
        id.0
    }
}

impl From<Uuid> for DUuid {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl Type<Sqlite> for DUuid {
    fn type_info() -> SqliteTypeInfo {
        <String as Type<Sqlite>>::type_info()
    }

    fn compatible(ty: &SqliteTypeInfo) -> bool {
        <String as Type<Sqlite>>::compatible(ty)
    }
}

impl Encode<'_, Sqlite> for DUuid {
    fn encode_by_ref(
        &self,
        args: &mut Vec<SqliteArgumentValue<'_>>,
    ) -> Result<IsNull, BoxDynError> {
        let text = self.0.hyphenated().to_string();
        args.push(SqliteArgumentValue::Text(text.into()));
        Ok(IsNull::No)
    }
}

impl Decode<'_, Sqlite> for DUuid {
    fn decode(value: SqliteValueRef<'_>) -> Result<Self, BoxDynError> {
        let text = <&str as Decode<Sqlite>>::decode(value)?;
        Ok(Self(Uuid::try_parse(text)?))
    }
}

impl fmt::Display for DUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::*;
    use crate::database::Database;

    #[tokio::test]
    async fn test_stored_as_text_and_read_back() {
        let db = Database::in_memory().await.unwrap();
        let id = DUuid::new();

        let row = sqlx::query("SELECT ?1 AS id, typeof(?1) AS kind")
            .bind(id)
            .fetch_one(&*db)
            .await
            .unwrap();

        let kind: String = row.try_get("kind").unwrap();
        assert_eq!(kind, "text");
        let back: DUuid = row.try_get("id").unwrap();
        assert_eq!(back, id);
        assert_eq!(Uuid::from(back).to_string(), id.to_string());
    }

    #[tokio::test]
    async fn test_malformed_text_fails_to_decode() {
        let db = Database::in_memory().await.unwrap();
        let row = sqlx::query("SELECT 'not-a-uuid' AS id")
            .fetch_one(&*db)
            .await
            .unwrap();

        assert!(row.try_get::<DUuid, _>("id").is_err());
    }
}
