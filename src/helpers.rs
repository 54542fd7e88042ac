use crate::constants;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub(crate) fn upload_path(dir: &Path, file_name: &str, keep_extensions: bool) -> PathBuf {
    let mut name = format!("{}{}", constants::UPLOAD_FILE_PREFIX, Uuid::new_v4().simple());

    if keep_extensions {
        if let Some(ext) = extension(file_name) {
            name.push('.');
            name.push_str(ext);
        }
    }

    dir.join(name)
}

// Only the leading alphanumerics count, so "a.tar.gz" keeps "gz" and "x.j$pg" keeps "j".
fn extension(file_name: &str) -> Option<&str> {
    let ext = Path::new(file_name).extension()?.to_str()?;
    let end = ext
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_alphanumeric())
        .map(|(idx, _)| idx)
        .unwrap_or_else(|| ext.len());

    if end == 0 {
        None
    } else {
        Some(&ext[..end])
    }
}

pub(crate) fn base_name(file_name: &str) -> &str {
    file_name.rsplit(&['/', '\\'][..]).next().unwrap_or(file_name)
}

/// Removes a temporary upload when dropped unless [`keep`](UploadGuard::keep) was called.
pub(crate) struct UploadGuard {
    path: Option<PathBuf>,
}

impl UploadGuard {
    pub(crate) fn new(path: PathBuf) -> UploadGuard {
        UploadGuard { path: Some(path) }
    }

    pub(crate) fn keep(mut self) -> PathBuf {
        self.path.take().unwrap_or_default()
    }

    pub(crate) async fn remove(mut self) {
        if let Some(path) = self.path.take() {
            remove_upload(&path).await;
        }
    }
}

impl Drop for UploadGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            remove_upload_blocking(&path);
        }
    }
}

pub(crate) async fn remove_upload(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(_err) => {
            #[cfg(feature = "log")]
            log::warn!("Couldn't remove temporary upload {}: {}", path.display(), _err);
        }
    }
}

// Used from `Drop`, where nothing can be awaited.
pub(crate) fn remove_upload_blocking(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(_err) => {
            #[cfg(feature = "log")]
            log::warn!("Couldn't remove temporary upload {}: {}", path.display(), _err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        assert_eq!(extension("photo.jpg"), Some("jpg"));
        assert_eq!(extension("archive.tar.gz"), Some("gz"));
        assert_eq!(extension("weird.j$pg"), Some("j"));
        assert_eq!(extension("README"), None);
        assert_eq!(extension("trailing."), None);
        assert_eq!(extension(".hidden"), None);
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("a-text-file.txt"), "a-text-file.txt");
        assert_eq!(base_name("/home/user/a.txt"), "a.txt");
        assert_eq!(base_name("C:\\Users\\me\\b.png"), "b.png");
        assert_eq!(base_name("dir/"), "");
    }

    #[test]
    fn test_upload_path() {
        let dir = Path::new("/tmp/uploads");

        let path = upload_path(dir, "photo.jpg", false);
        assert_eq!(path.parent(), Some(dir));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("upload_"));
        assert_eq!(name.len(), "upload_".len() + 32);

        let path = upload_path(dir, "photo.jpg", true);
        assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("jpg"));

        assert_ne!(upload_path(dir, "a", false), upload_path(dir, "a", false));
    }

    #[test]
    fn test_upload_guard() {
        let dir = tempfile::tempdir().unwrap();

        let dropped = dir.path().join("upload_dropped");
        std::fs::write(&dropped, b"data").unwrap();
        drop(UploadGuard::new(dropped.clone()));
        assert!(!dropped.exists());

        let kept = dir.path().join("upload_kept");
        std::fs::write(&kept, b"data").unwrap();
        assert_eq!(UploadGuard::new(kept.clone()).keep(), kept);
        assert!(kept.exists());
    }
}
