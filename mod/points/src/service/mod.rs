pub mod cohort;
pub mod logged_activity;
pub mod redemption;
pub mod resolve;
pub mod schema;
pub mod society;

#[cfg(test)]
pub(crate) mod testutil;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use auth::service::AuthService;
use catalog::service::CatalogService;
use societies_notify::Notifier;
use societies_sql::{SQLStore, Value};

/// Points service error type.
#[derive(Debug, Error)]
pub enum PointsError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("{0}")]
    Storage(String),

    #[error("{0}")]
    Internal(String),
}

impl From<PointsError> for societies_core::ServiceError {
    fn from(e: PointsError) -> Self {
        match e {
            PointsError::NotFound(m) => societies_core::ServiceError::NotFound(m),
            PointsError::Conflict(m) => societies_core::ServiceError::Conflict(m),
            PointsError::Validation(m) => societies_core::ServiceError::Validation(m),
            PointsError::PermissionDenied(m) => {
                societies_core::ServiceError::PermissionDenied(m)
            }
            PointsError::Unprocessable(m) => societies_core::ServiceError::Unprocessable(m),
            PointsError::Storage(m) => societies_core::ServiceError::Storage(m),
            PointsError::Internal(m) => societies_core::ServiceError::Internal(m),
        }
    }
}

/// The Points service. Holds the SQL store, the catalog and auth
/// services it reads from, and the notification sink.
pub struct PointsService {
    pub(crate) sql: Arc<dyn SQLStore>,
    pub(crate) catalog: Arc<CatalogService>,
    pub(crate) auth: Arc<AuthService>,
    pub(crate) notifier: Arc<dyn Notifier>,
}

impl PointsService {
    /// Create a new PointsService, initializing the DB schema.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        catalog: Arc<CatalogService>,
        auth: Arc<AuthService>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Arc<Self>, PointsError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self { sql, catalog, auth, notifier }))
    }

    // ── Blob-row helpers for workflow tables ──
    //
    // Logged activities and redemption requests keep the full record as
    // JSON in `data` with the workflow-relevant columns indexed, so
    // status transitions can be guarded in a single UPDATE.

    pub(crate) fn insert_row<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), PointsError> {
        let json =
            serde_json::to_string(record).map_err(|e| PointsError::Internal(e.to_string()))?;

        let mut cols = vec!["id", "data"];
        let mut placeholders = vec!["?1".to_string(), "?2".to_string()];
        let mut params = vec![Value::Text(id.to_string()), Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 3;
            cols.push(col);
            placeholders.push(format!("?{}", idx));
            params.push(val.clone());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            cols.join(", "),
            placeholders.join(", "),
        );

        self.sql
            .exec(&sql, &params)
            .map_err(|e| PointsError::Storage(e.to_string()))?;
        Ok(())
    }

    pub(crate) fn get_row<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<T, PointsError> {
        let sql = format!("SELECT data FROM {} WHERE id = ?1", table);
        let rows = self
            .sql
            .query(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| PointsError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| PointsError::NotFound(format!("{}/{}", table, id)))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| PointsError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| PointsError::Internal(e.to_string()))
    }

    /// Replace a row's data and indexed columns, optionally guarded by
    /// an extra WHERE condition. Returns whether a row was updated; a
    /// `false` under a guard means the record was not in the expected
    /// state.
    pub(crate) fn update_row<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
        guard: Option<(&str, Value)>,
    ) -> Result<bool, PointsError> {
        let json =
            serde_json::to_string(record).map_err(|e| PointsError::Internal(e.to_string()))?;

        let mut sets = vec!["data = ?1".to_string()];
        let mut params: Vec<Value> = vec![Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 2;
            sets.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let id_idx = params.len() + 1;
        params.push(Value::Text(id.to_string()));

        let mut sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table,
            sets.join(", "),
            id_idx,
        );
        if let Some((col, val)) = guard {
            let guard_idx = params.len() + 1;
            sql.push_str(&format!(" AND {} = ?{}", col, guard_idx));
            params.push(val);
        }

        let affected = self
            .sql
            .exec(&sql, &params)
            .map_err(|e| PointsError::Storage(e.to_string()))?;
        Ok(affected > 0)
    }

    pub(crate) fn delete_row(&self, table: &str, id: &str) -> Result<(), PointsError> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", table);
        let affected = self
            .sql
            .exec(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| PointsError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(PointsError::NotFound(format!("{}/{}", table, id)));
        }
        Ok(())
    }

    /// List blob rows with equality filters and pagination, newest first.
    pub(crate) fn list_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, Value)],
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<T>, usize), PointsError> {
        let mut where_clauses = Vec::new();
        let mut params = Vec::new();

        for (i, (col, val)) in filters.iter().enumerate() {
            let idx = i + 1;
            where_clauses.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let where_sql = if where_clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_clauses.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) as cnt FROM {}{}", table, where_sql);
        let count_rows = self
            .sql
            .query(&count_sql, &params)
            .map_err(|e| PointsError::Storage(e.to_string()))?;
        let total = count_rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0) as usize;

        let limit_idx = params.len() + 1;
        let offset_idx = params.len() + 2;
        params.push(Value::Integer(limit as i64));
        params.push(Value::Integer(offset as i64));

        let sql = format!(
            "SELECT data FROM {}{} ORDER BY created_at DESC LIMIT ?{} OFFSET ?{}",
            table, where_sql, limit_idx, offset_idx,
        );

        let rows = self
            .sql
            .query(&sql, &params)
            .map_err(|e| PointsError::Storage(e.to_string()))?;

        let mut items = Vec::new();
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| PointsError::Internal("missing data column".into()))?;
            let item: T =
                serde_json::from_str(data).map_err(|e| PointsError::Internal(e.to_string()))?;
            items.push(item);
        }

        Ok((items, total))
    }
}
