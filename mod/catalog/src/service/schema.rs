use societies_sql::SQLStore;

use crate::service::CatalogError;

/// Initialize the SQLite schema for catalog resources.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), CatalogError> {
    let statements = [
        "CREATE TABLE IF NOT EXISTS activity_types (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL COLLATE NOCASE UNIQUE,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",

        "CREATE TABLE IF NOT EXISTS activities (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL COLLATE NOCASE UNIQUE,
            activity_type_id TEXT NOT NULL,
            activity_date TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (activity_type_id) REFERENCES activity_types(id)
        )",
        "CREATE INDEX IF NOT EXISTS idx_activities_type ON activities(activity_type_id)",
        "CREATE INDEX IF NOT EXISTS idx_activities_date ON activities(activity_date)",
    ];

    for stmt in &statements {
        sql.exec(stmt, &[])
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
    }

    Ok(())
}
