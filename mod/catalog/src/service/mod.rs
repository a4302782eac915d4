pub mod activity;
pub mod activity_type;
pub mod schema;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use societies_sql::{SQLStore, Value};

/// Catalog service error type.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("{0}")]
    Storage(String),

    #[error("{0}")]
    Internal(String),
}

impl From<CatalogError> for societies_core::ServiceError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound(m) => societies_core::ServiceError::NotFound(m),
            CatalogError::Conflict(m) => societies_core::ServiceError::Conflict(m),
            CatalogError::Validation(m) => societies_core::ServiceError::Validation(m),
            CatalogError::Unprocessable(m) => societies_core::ServiceError::Unprocessable(m),
            CatalogError::Storage(m) => societies_core::ServiceError::Storage(m),
            CatalogError::Internal(m) => societies_core::ServiceError::Internal(m),
        }
    }
}

/// The Catalog service.
pub struct CatalogService {
    pub(crate) sql: Arc<dyn SQLStore>,
}

impl CatalogService {
    /// Create a new CatalogService, initializing the DB schema.
    pub fn new(sql: Arc<dyn SQLStore>) -> Result<Arc<Self>, CatalogError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self { sql }))
    }

    // ── Generic CRUD helpers (same pattern as AuthService) ──

    pub(crate) fn insert_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), CatalogError> {
        let json =
            serde_json::to_string(record).map_err(|e| CatalogError::Internal(e.to_string()))?;

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

        self.sql.exec(&sql, &params).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE constraint") {
                CatalogError::Conflict(msg)
            } else {
                CatalogError::Storage(msg)
            }
        })?;

        Ok(())
    }

    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<T, CatalogError> {
        let sql = format!("SELECT data FROM {} WHERE id = ?1", table);
        let rows = self
            .sql
            .query(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| CatalogError::NotFound(format!("{}/{}", table, id)))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| CatalogError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| CatalogError::Internal(e.to_string()))
    }

    pub(crate) fn update_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), CatalogError> {
        let json =
            serde_json::to_string(record).map_err(|e| CatalogError::Internal(e.to_string()))?;

        let mut sets = vec!["data = ?1".to_string()];
        let mut params: Vec<Value> = vec![Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 2;
            sets.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let id_idx = params.len() + 1;
        params.push(Value::Text(id.to_string()));

        let sql = format!("UPDATE {} SET {} WHERE id = ?{}", table, sets.join(", "), id_idx);

        let affected = self
            .sql
            .exec(&sql, &params)
            .map_err(|e| CatalogError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(CatalogError::NotFound(format!("{}/{}", table, id)));
        }

        Ok(())
    }

    pub(crate) fn delete_record(&self, table: &str, id: &str) -> Result<(), CatalogError> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", table);
        let affected = self
            .sql
            .exec(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(CatalogError::NotFound(format!("{}/{}", table, id)));
        }
        Ok(())
    }

    pub(crate) fn list_records<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, Value)],
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<T>, usize), CatalogError> {
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
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
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
            .map_err(|e| CatalogError::Storage(e.to_string()))?;

        let mut items = Vec::new();
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| CatalogError::Internal("missing data column".into()))?;
            let item: T =
                serde_json::from_str(data).map_err(|e| CatalogError::Internal(e.to_string()))?;
            items.push(item);
        }

        Ok((items, total))
    }
}
