use societies_sql::SQLStore;

use crate::service::PointsError;

/// Initialize the SQLite schema for points resources.
///
/// `societies` is fully column-mapped so the point balance can move in
/// single conditional UPDATE statements. The workflow tables keep a
/// JSON `data` blob plus the columns their transitions are guarded on.
/// `cohorts` and `centers` are shared with the auth module; both
/// modules create them with `IF NOT EXISTS`.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), PointsError> {
    let statements = [
        "CREATE TABLE IF NOT EXISTS societies (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL COLLATE NOCASE UNIQUE,
            color_scheme TEXT,
            logo TEXT,
            photo TEXT,
            total_points INTEGER NOT NULL DEFAULT 0,
            used_points INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",

        "CREATE TABLE IF NOT EXISTS logged_activities (
            id TEXT PRIMARY KEY,
            data TEXT NOT NULL,
            status TEXT NOT NULL,
            redeemed INTEGER NOT NULL DEFAULT 0,
            value INTEGER NOT NULL,
            user_id TEXT NOT NULL,
            society_id TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_logged_status ON logged_activities(status)",
        "CREATE INDEX IF NOT EXISTS idx_logged_user ON logged_activities(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_logged_society ON logged_activities(society_id)",

        "CREATE TABLE IF NOT EXISTS redemptions (
            id TEXT PRIMARY KEY,
            data TEXT NOT NULL,
            name TEXT NOT NULL,
            status TEXT NOT NULL,
            value INTEGER NOT NULL,
            user_id TEXT NOT NULL,
            society_id TEXT NOT NULL,
            center_id TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_redemptions_status ON redemptions(status)",
        "CREATE INDEX IF NOT EXISTS idx_redemptions_society ON redemptions(society_id)",
        "CREATE INDEX IF NOT EXISTS idx_redemptions_center ON redemptions(center_id)",

        // Shared reference tables (also created by the auth module)
        "CREATE TABLE IF NOT EXISTS centers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL COLLATE NOCASE UNIQUE,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS cohorts (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            center_id TEXT,
            society_id TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_cohorts_society ON cohorts(society_id)",
    ];

    for stmt in &statements {
        sql.exec(stmt, &[])
            .map_err(|e| PointsError::Storage(e.to_string()))?;
    }

    Ok(())
}
