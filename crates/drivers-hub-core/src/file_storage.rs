//! File storage abstraction for uploaded candidate documents.
//!
//! Business logic talks to [`FileStorage`]; [`LocalFileStorage`] keeps files
//! under a directory that the HTTP layer also serves statically.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use tokio::fs;

pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// MIME types accepted for candidate documents.
pub const ALLOWED_DOCUMENT_TYPES: [&str; 4] =
    ["application/pdf", "image/png", "image/jpeg", "image/webp"];

pub trait FileStorage: Send + Sync {
    /// Validate and persist `content` under `key`, returning the key.
    fn save<'a>(&'a self, key: &'a str, content: &'a [u8], mime_type: &'a str)
    -> StorageFuture<'a, String>;

    fn read<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Vec<u8>>;

    /// Remove a file. Missing files are not an error.
    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()>;

    fn get_url(&self, key: &str) -> Result<String, StorageError>;
}

#[derive(Debug)]
pub enum StorageError {
    InvalidFileSize { max_bytes: usize },
    InvalidMimeType { received: String },
    EmptyFile,
    IoError(std::io::Error),
    NotFound,
    InvalidKey(String),
}

impl StorageError {
    /// Whether the error was caused by the uploaded content rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::IoError(_))
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFileSize { max_bytes } => {
                write!(f, "File exceeds maximum size of {} bytes", max_bytes)
            }
            Self::InvalidMimeType { received } => write!(
                f,
                "File type '{}' not allowed. Allowed types: {}",
                received,
                ALLOWED_DOCUMENT_TYPES.join(", ")
            ),
            Self::EmptyFile => write!(f, "File is empty"),
            Self::IoError(e) => write!(f, "I/O error: {}", e),
            Self::NotFound => write!(f, "File not found"),
            Self::InvalidKey(msg) => write!(f, "Invalid storage key: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::IoError(e)
        }
    }
}

/// Guess a MIME type from a file name's extension.
pub fn mime_from_file_name(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Reduce a user-supplied file name to characters that are safe in a storage key.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Clone, Debug)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
    base_url: String,
    max_file_size: usize,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf, base_url: String, max_file_size: usize) -> Self {
        Self {
            base_dir,
            base_url,
            max_file_size,
        }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Rejects empty keys, absolute paths and traversal.
    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') || key.starts_with('\\') {
            return Err(StorageError::InvalidKey(
                "Key must not be empty, contain '..', or start with a separator".to_string(),
            ));
        }

        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '/' || c == '.')
        {
            return Err(StorageError::InvalidKey(
                "Key contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_content(&self, content: &[u8], mime_type: &str) -> Result<(), StorageError> {
        if content.is_empty() {
            return Err(StorageError::EmptyFile);
        }
        if content.len() > self.max_file_size {
            return Err(StorageError::InvalidFileSize {
                max_bytes: self.max_file_size,
            });
        }
        if !ALLOWED_DOCUMENT_TYPES.contains(&mime_type) {
            return Err(StorageError::InvalidMimeType {
                received: mime_type.to_string(),
            });
        }
        Ok(())
    }
}

impl FileStorage for LocalFileStorage {
    fn save<'a>(
        &'a self,
        key: &'a str,
        content: &'a [u8],
        mime_type: &'a str,
    ) -> StorageFuture<'a, String> {
        Box::pin(async move {
            Self::validate_key(key)?;
            self.validate_content(content, mime_type)?;

            let file_path = self.base_dir.join(key);
            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&file_path, content).await?;

            Ok(key.to_string())
        })
    }

    fn read<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Vec<u8>> {
        Box::pin(async move {
            Self::validate_key(key)?;
            Ok(fs::read(self.base_dir.join(key)).await?)
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            Self::validate_key(key)?;
            match fs::remove_file(self.base_dir.join(key)).await {
                Ok(_) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn get_url(&self, key: &str) -> Result<String, StorageError> {
        Self::validate_key(key)?;
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(dir: PathBuf) -> LocalFileStorage {
        LocalFileStorage::new(dir, "http://localhost:5000/uploads/".to_string(), 16)
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("drivers-hub-storage-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_validate_key_rejects_traversal_and_absolute_paths() {
        assert!(LocalFileStorage::validate_key("candidates/abc/licence.pdf").is_ok());
        assert!(LocalFileStorage::validate_key("../../etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("/etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("candidates/a b.pdf").is_err());
        assert!(LocalFileStorage::validate_key("").is_err());
    }

    #[test]
    fn test_get_url_trims_trailing_slash() {
        let url = storage(temp_dir()).get_url("candidates/x/id.pdf").unwrap();
        assert_eq!(url, "http://localhost:5000/uploads/candidates/x/id.pdf");
    }

    #[test]
    fn test_mime_from_file_name() {
        assert_eq!(mime_from_file_name("ID.PDF"), Some("application/pdf"));
        assert_eq!(mime_from_file_name("photo.jpeg"), Some("image/jpeg"));
        assert_eq!(mime_from_file_name("archive.zip"), None);
        assert_eq!(mime_from_file_name("no-extension"), None);
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../my licence (1).pdf"), "my_licence__1_.pdf");
        assert_eq!(sanitize_file_name("C:\\docs\\id.png"), "id.png");
        assert_eq!(sanitize_file_name(".."), "file");
    }

    #[tokio::test]
    async fn test_save_read_delete() {
        let dir = temp_dir();
        let storage = storage(dir.clone());

        let key = storage
            .save("candidates/c1/id.pdf", b"%PDF-1.4", "application/pdf")
            .await
            .unwrap();
        assert_eq!(storage.read(&key).await.unwrap(), b"%PDF-1.4");

        storage.delete(&key).await.unwrap();
        assert!(matches!(storage.read(&key).await, Err(StorageError::NotFound)));
        // deleting twice is fine
        storage.delete(&key).await.unwrap();

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_save_rejects_bad_content() {
        let storage = storage(temp_dir());

        let too_big = vec![0u8; 17];
        assert!(matches!(
            storage.save("candidates/c1/big.pdf", &too_big, "application/pdf").await,
            Err(StorageError::InvalidFileSize { max_bytes: 16 })
        ));
        assert!(matches!(
            storage.save("candidates/c1/x.exe", b"MZ", "application/x-msdownload").await,
            Err(StorageError::InvalidMimeType { .. })
        ));
        assert!(matches!(
            storage.save("candidates/c1/empty.pdf", b"", "application/pdf").await,
            Err(StorageError::EmptyFile)
        ));
    }
}
