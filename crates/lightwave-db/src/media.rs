use anyhow::Result;
use rusqlite::OptionalExtension;

use crate::Database;

/// Database row for a stored media blob. Maps directly to the `media`
/// table; conversion to the domain `MediaItem` happens in lightwave-core.
pub struct MediaRow {
    pub id: String,
    pub kind: String,
    pub data: Vec<u8>,
    pub sha256: String,
    pub created_at: i64,
}

impl Database {
    pub fn insert_media(
        &self,
        id: &str,
        kind: &str,
        data: &[u8],
        sha256: &str,
        created_at: i64,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO media (id, kind, data, sha256, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, kind, data, sha256, created_at],
            )?;
            Ok(())
        })
    }

    pub fn get_media(&self, id: &str) -> Result<Option<MediaRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, kind, data, sha256, created_at FROM media WHERE id = ?1",
                    [id],
                    |row| {
                        Ok(MediaRow {
                            id: row.get(0)?,
                            kind: row.get(1)?,
                            data: row.get(2)?,
                            sha256: row.get(3)?,
                            created_at: row.get(4)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Idempotent: deleting an absent id is not an error.
    pub fn delete_media(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM media WHERE id = ?1", [id])?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_insert_get_delete() {
        let db = Database::open_in_memory().unwrap();
        let id = uuid::Uuid::new_v4().to_string();

        assert!(db.get_media(&id).unwrap().is_none());

        db.insert_media(&id, "audio", b"RIFFdata", "abc123", 1_700_000_000_000)
            .unwrap();

        let row = db.get_media(&id).unwrap().expect("row present");
        assert_eq!(row.kind, "audio");
        assert_eq!(row.data, b"RIFFdata");
        assert_eq!(row.sha256, "abc123");

        db.delete_media(&id).unwrap();
        db.delete_media(&id).unwrap();
        assert!(db.get_media(&id).unwrap().is_none());
    }
}
