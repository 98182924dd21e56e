use rusqlite::{Connection, Result};

const SCHEMA: &str = include_str!("schema.sql");

/// Tables a readable manifest must contain.
const TABLES: &[&str] = &["project", "nodes", "targets", "phase_files"];

pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(&format!("BEGIN TRANSACTION; {} COMMIT;", SCHEMA))?;
    tracing::debug!("Created manifest schema");
    Ok(())
}

/// Whether every manifest table is present.
pub fn has_schema(conn: &Connection) -> Result<bool> {
    for table in TABLES {
        let count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
            [table],
            |row| row.get(0),
        )?;
        if count == 0 {
            return Ok(false);
        }
    }
    Ok(true)
}
