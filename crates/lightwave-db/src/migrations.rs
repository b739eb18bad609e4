use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Key-value state: message collection, subscription record,
        -- account list, free-unlock counter, profile fields.
        CREATE TABLE IF NOT EXISTS kv (
            key         TEXT PRIMARY KEY,
            value       TEXT NOT NULL,
            updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Media blobs, one row per captured audio clip or image.
        CREATE TABLE IF NOT EXISTS media (
            id          TEXT PRIMARY KEY,
            kind        TEXT NOT NULL CHECK (kind IN ('audio', 'image')),
            data        BLOB NOT NULL,
            sha256      TEXT NOT NULL,
            created_at  INTEGER NOT NULL
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
