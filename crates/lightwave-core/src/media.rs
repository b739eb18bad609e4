use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use lightwave_db::Database;
use lightwave_types::models::{MediaItem, MediaKind, now_millis};

use crate::error::{Error, Result};

/// Blob store for captured audio and images, one SQLite row per item.
/// Rows are written once and deleted only explicitly; deleting a message
/// does not collect its media.
pub struct MediaStore {
    db: Arc<Database>,
    cache_dir: PathBuf,
}

impl MediaStore {
    /// `cache_dir` is where [`MediaStore::create_url`] materializes blobs
    /// for display.
    pub fn new(db: Arc<Database>, cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .map_err(|e| Error::Storage(anyhow::anyhow!("media cache dir: {}", e)))?;
        Ok(Self { db, cache_dir })
    }

    pub fn save(&self, id: Uuid, data: &[u8], kind: MediaKind) -> Result<Uuid> {
        if data.is_empty() {
            return Err(Error::Validation("media payload is empty".into()));
        }

        let sha256 = hex::encode(Sha256::digest(data));
        info!("Saving {} {} ({} bytes)", kind.as_str(), id, data.len());

        self.db
            .insert_media(&id.to_string(), kind.as_str(), data, &sha256, now_millis())?;
        Ok(id)
    }

    /// Absent media is `Ok(None)`, never an error; dangling references
    /// are expected.
    pub fn get(&self, id: Uuid) -> Result<Option<MediaItem>> {
        let Some(row) = self.db.get_media(&id.to_string())? else {
            return Ok(None);
        };

        let actual = hex::encode(Sha256::digest(&row.data));
        if actual != row.sha256 {
            return Err(Error::Storage(anyhow::anyhow!(
                "media {} checksum mismatch: expected {}, got {}",
                row.id,
                row.sha256,
                actual
            )));
        }

        let kind = MediaKind::parse(&row.kind).ok_or_else(|| {
            Error::Storage(anyhow::anyhow!("media {} has unknown kind {}", row.id, row.kind))
        })?;

        Ok(Some(MediaItem {
            id,
            kind,
            data: row.data,
            created: row.created_at,
        }))
    }

    /// Materializes the blob into the cache directory and hands back an
    /// RAII guard. The file lives as long as the guard does; drop it when
    /// the media leaves the screen.
    pub fn create_url(&self, id: Uuid) -> Result<Option<MediaUrl>> {
        let Some(item) = self.get(id)? else {
            return Ok(None);
        };

        let path = self.cache_dir.join(id.to_string());
        std::fs::write(&path, &item.data)
            .map_err(|e| Error::Storage(anyhow::anyhow!("materialize media {}: {}", id, e)))?;

        Ok(Some(MediaUrl { path }))
    }

    /// Idempotent: removing absent media succeeds quietly.
    pub fn delete(&self, id: Uuid) -> Result<()> {
        self.db.delete_media(&id.to_string())?;
        Ok(())
    }
}

/// Scoped handle to a materialized media file. Removing the backing file on
/// drop is the Rust rendition of revoking an object URL.
#[derive(Debug)]
pub struct MediaUrl {
    path: PathBuf,
}

impl MediaUrl {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn url(&self) -> String {
        format!("file://{}", self.path.display())
    }
}

impl Drop for MediaUrl {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!("Failed to revoke media url {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MediaStore {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let cache = std::env::temp_dir().join(format!("lightwave-media-{}", Uuid::new_v4()));
        MediaStore::new(db, cache).unwrap()
    }

    #[test]
    fn save_then_get_round_trips() {
        let media = store();
        let id = Uuid::new_v4();

        media.save(id, b"OggSopus-data", MediaKind::Audio).unwrap();

        let item = media.get(id).unwrap().expect("item present");
        assert_eq!(item.kind, MediaKind::Audio);
        assert_eq!(item.data, b"OggSopus-data");
    }

    #[test]
    fn absent_media_is_none_not_error() {
        let media = store();
        assert!(media.get(Uuid::new_v4()).unwrap().is_none());
        assert!(media.create_url(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn empty_payload_is_rejected() {
        let media = store();
        let err = media.save(Uuid::new_v4(), b"", MediaKind::Image).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn delete_is_idempotent() {
        let media = store();
        let id = Uuid::new_v4();
        media.save(id, b"pixels", MediaKind::Image).unwrap();

        media.delete(id).unwrap();
        media.delete(id).unwrap();
        assert!(media.get(id).unwrap().is_none());
    }

    #[test]
    fn media_url_lives_and_dies_with_the_guard() {
        let media = store();
        let id = Uuid::new_v4();
        media.save(id, b"pixels", MediaKind::Image).unwrap();

        let url = media.create_url(id).unwrap().expect("url present");
        let path = url.path().to_path_buf();
        assert_eq!(std::fs::read(&path).unwrap(), b"pixels");
        assert!(url.url().starts_with("file://"));

        drop(url);
        assert!(!path.exists());
    }
}
