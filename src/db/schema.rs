use rusqlite::{Connection, Result};

pub fn run_migrations(conn: &Connection) -> Result<()> {
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS kv_store (
      visitor_id TEXT NOT NULL,
      key TEXT NOT NULL,
      value TEXT NOT NULL,
      updated_at TEXT NOT NULL,
      PRIMARY KEY (visitor_id, key)
    );

    CREATE INDEX IF NOT EXISTS idx_kv_store_key ON kv_store(key);
    "#,
  )?;

  Ok(())
}
