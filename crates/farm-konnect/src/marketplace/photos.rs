use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// URL prefix under which stored photos are served.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// One uploaded file as received from a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl PhotoUpload {
    /// Whether the declared content type (or, failing that, the file name) names an image.
    pub fn is_image(&self) -> bool {
        let declared = self
            .content_type
            .as_deref()
            .and_then(|raw| raw.parse::<mime::Mime>().ok());
        match declared {
            Some(declared) if declared != mime::APPLICATION_OCTET_STREAM => {
                declared.type_() == mime::IMAGE
            }
            _ => self
                .file_name
                .as_deref()
                .and_then(|name| mime_guess::from_path(name).first())
                .map_or(false, |guess| guess.type_() == mime::IMAGE),
        }
    }

    /// File extension for the stored copy, derived from the file name or content type.
    pub fn extension(&self) -> Option<String> {
        let from_name = self.file_name.as_deref().and_then(|name| {
            let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
            mime_guess::from_ext(&ext)
                .first()
                .filter(|guess| guess.type_() == mime::IMAGE)
                .map(|_| ext)
        });

        from_name.or_else(|| {
            let content_type = self.content_type.as_deref()?;
            if content_type.eq_ignore_ascii_case("image/jpeg") {
                return Some("jpg".to_string());
            }
            mime_guess::get_mime_extensions_str(content_type)
                .and_then(|extensions| extensions.first())
                .map(|ext| ext.to_string())
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PhotoStorageError {
    #[error("failed to store photo: {0}")]
    Io(#[from] io::Error),
}

/// Destination for listing photos, addressed by the public path `store` returns.
pub trait PhotoStorage: Send + Sync {
    fn store(&self, upload: &PhotoUpload) -> Result<String, PhotoStorageError>;
    /// Delete a stored photo. Paths that were never stored are ignored.
    fn remove(&self, public_path: &str) -> Result<(), PhotoStorageError>;
}

/// Writes photos into a directory that the HTTP layer serves under [`PUBLIC_PREFIX`].
#[derive(Debug, Clone)]
pub struct DiskPhotoStorage {
    directory: PathBuf,
}

impl DiskPhotoStorage {
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, PhotoStorageError> {
        let directory = directory.into();
        fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl PhotoStorage for DiskPhotoStorage {
    fn store(&self, upload: &PhotoUpload) -> Result<String, PhotoStorageError> {
        let file_name = match upload.extension() {
            Some(ext) => format!("{}.{ext}", Uuid::new_v4().simple()),
            None => Uuid::new_v4().simple().to_string(),
        };
        fs::write(self.directory.join(&file_name), &upload.bytes)?;
        Ok(format!("{PUBLIC_PREFIX}/{file_name}"))
    }

    fn remove(&self, public_path: &str) -> Result<(), PhotoStorageError> {
        let file_name = public_path
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| {
                !name.is_empty() && !name.contains(['/', '\\']) && *name != ".."
            });
        let Some(file_name) = file_name else {
            return Ok(());
        };

        match fs::remove_file(self.directory.join(file_name)) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(file_name: Option<&str>, content_type: Option<&str>) -> PhotoUpload {
        PhotoUpload {
            file_name: file_name.map(str::to_string),
            content_type: content_type.map(str::to_string),
            bytes: vec![0xFF, 0xD8, 0xFF],
        }
    }

    #[test]
    fn image_detection_prefers_declared_type() {
        assert!(upload(Some("farm.jpg"), Some("image/jpeg")).is_image());
        assert!(!upload(Some("deed.pdf"), Some("application/pdf")).is_image());
        assert!(upload(Some("farm.png"), Some("application/octet-stream")).is_image());
        assert!(!upload(None, None).is_image());
    }

    #[test]
    fn extension_falls_back_to_content_type() {
        assert_eq!(
            upload(Some("Farm.JPEG"), Some("image/jpeg")).extension(),
            Some("jpeg".to_string())
        );
        assert_eq!(
            upload(Some("blob"), Some("image/jpeg")).extension(),
            Some("jpg".to_string())
        );
    }

    #[test]
    fn disk_storage_writes_under_public_prefix() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = DiskPhotoStorage::new(dir.path().join("uploads")).expect("storage");
        let path = storage
            .store(&upload(Some("field.png"), Some("image/png")))
            .expect("stored");

        assert!(path.starts_with("/uploads/"));
        assert!(path.ends_with(".png"));
        let file_name = path.trim_start_matches("/uploads/");
        let written = fs::read(storage.directory().join(file_name)).expect("file on disk");
        assert_eq!(written, vec![0xFF, 0xD8, 0xFF]);

        storage.remove(&path).expect("removed");
        assert!(!storage.directory().join(file_name).exists());
        storage.remove(&path).expect("second removal is a no-op");
    }

    #[test]
    fn disk_storage_ignores_paths_outside_its_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let outside = dir.path().join("keep.txt");
        fs::write(&outside, b"keep").expect("write");
        let storage = DiskPhotoStorage::new(dir.path().join("uploads")).expect("storage");

        storage.remove("/uploads/../keep.txt").expect("ignored");
        storage.remove("/elsewhere/keep.txt").expect("ignored");
        assert!(outside.exists());
    }
}
