use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Route prefix uploaded files are served under.
pub const PUBLIC_ROUTE: &str = "/uploads";

/// Longest extension carried over from a client-supplied filename.
const MAX_EXTENSION_LEN: usize = 10;

/// Disk store for uploaded images.
///
/// Every stored file is named `{unix_millis}-{sequence}{.ext}`. The sequence
/// is a process-wide monotonic counter shared by clones, so two uploads
/// landing in the same millisecond still get distinct names. Only the
/// extension of the client's filename is used; the rest is discarded, which
/// rules out path traversal through upload names.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    sequence: Arc<AtomicU64>,
}

/// A file persisted by [`UploadStore::store`].
#[derive(Debug, Clone)]
pub struct StoredUpload {
    /// Bare file name under the uploads directory.
    pub file_name: String,
    /// Public path the file is served from.
    pub relative_path: String,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Directory files are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the destination directory. Idempotent; called once at startup
    /// rather than on every upload.
    ///
    /// # Errors
    /// Returns error if the directory cannot be created
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Next collision-free file name for an upload with the given original
    /// name.
    pub fn unique_name(&self, original_name: &str) -> String {
        let millis = Utc::now().timestamp_millis();
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);

        match sanitized_extension(original_name) {
            Some(ext) => format!("{millis}-{seq}.{ext}"),
            None => format!("{millis}-{seq}"),
        }
    }

    /// Write `bytes` under a fresh unique name and report where it landed.
    ///
    /// # Errors
    /// Returns error if the disk write fails
    pub async fn store(&self, original_name: &str, bytes: &[u8]) -> std::io::Result<StoredUpload> {
        let file_name = self.unique_name(original_name);
        tokio::fs::write(self.dir.join(&file_name), bytes).await?;

        tracing::info!(file = %file_name, size = bytes.len(), "Stored uploaded file");

        Ok(StoredUpload {
            relative_path: format!("{PUBLIC_ROUTE}/{file_name}"),
            file_name,
        })
    }
}

/// Extension of a client-supplied filename, reduced to ASCII alphanumerics
/// and capped in length. `None` when nothing usable remains.
fn sanitized_extension(original_name: &str) -> Option<String> {
    let ext: String = Path::new(original_name)
        .extension()?
        .to_str()?
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(MAX_EXTENSION_LEN)
        .collect();

    (!ext.is_empty()).then_some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_burst_of_names_stays_unique() {
        let store = UploadStore::new("/tmp/ignored");

        // Far more than one call per millisecond; the sequence keeps the
        // names apart even when the timestamp does not move.
        let names: HashSet<String> = (0..200).map(|_| store.unique_name("a.png")).collect();
        assert_eq!(names.len(), 200);
    }

    #[test]
    fn test_clones_share_the_sequence() {
        let store = UploadStore::new("/tmp/ignored");
        let clone = store.clone();

        assert_ne!(store.unique_name("a.png"), clone.unique_name("a.png"));
    }

    #[test]
    fn test_extension_is_kept() {
        let store = UploadStore::new("/tmp/ignored");
        let name = store.unique_name("photo.png");
        assert!(name.ends_with(".png"), "got {name}");
    }

    #[test]
    fn test_only_final_extension_is_kept() {
        let store = UploadStore::new("/tmp/ignored");
        let name = store.unique_name("archive.tar.gz");
        assert!(name.ends_with(".gz"));
        assert!(!name.contains("tar"));
    }

    #[test]
    fn test_name_without_extension() {
        let store = UploadStore::new("/tmp/ignored");
        let name = store.unique_name("README");
        assert!(!name.contains('.'));
    }

    #[test]
    fn test_extension_sanitized() {
        assert_eq!(sanitized_extension("x.p?n*g"), Some("png".to_string()));
        assert_eq!(sanitized_extension("x.png"), Some("png".to_string()));
        assert_eq!(sanitized_extension("x...."), None);
        assert_eq!(sanitized_extension("x.∆∆∆"), None);
        assert_eq!(sanitized_extension("../../etc/passwd.png"), Some("png".to_string()));
    }

    #[tokio::test]
    async fn test_store_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        store.ensure_dir().await.unwrap();

        let stored = store.store("shirt.png", b"fake image bytes").await.unwrap();

        assert!(stored.relative_path.starts_with("/uploads/"));
        assert!(stored.relative_path.ends_with(&stored.file_name));

        let on_disk = tokio::fs::read(dir.path().join(&stored.file_name))
            .await
            .unwrap();
        assert_eq!(on_disk, b"fake image bytes");
    }

    #[tokio::test]
    async fn test_ensure_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("uploads");
        let store = UploadStore::new(&nested);

        store.ensure_dir().await.unwrap();
        store.ensure_dir().await.unwrap();

        assert!(nested.is_dir());
    }
}
