//! Seam for the external document store.
//!
//! Onboarding documents are uploaded to a file store before the form is
//! submitted; only the resulting public URLs reach the backend. The store
//! itself is an external collaborator behind `DocumentStore`.

use std::future::Future;
use std::path::Path;

use log::debug;
use thiserror::Error;

/// Prefix under which every document is stored.
pub const DOCUMENT_PREFIX: &str = "images";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("document path has no file name: {0}")]
    NoFileName(String),

    #[error("upload of {key} failed: {reason}")]
    Upload { key: String, reason: String },
}

/// Uploads a local file under a destination key and returns its public URL.
pub trait DocumentStore: Send + Sync {
    fn upload(
        &self,
        local_path: &Path,
        key: &str,
    ) -> impl Future<Output = Result<String, StorageError>> + Send;
}

/// Destination key for a local file: `images/<file name>`.
pub fn document_key(local_path: &Path) -> Result<String, StorageError> {
    let name = local_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| StorageError::NoFileName(local_path.display().to_string()))?;
    Ok(format!("{DOCUMENT_PREFIX}/{name}"))
}

/// Upload each `(field, path)` pair in order, returning `(field, url)` pairs.
/// Stops at the first failure.
pub async fn upload_documents<S, P>(
    store: &S,
    documents: &[(&str, P)],
) -> Result<Vec<(String, String)>, StorageError>
where
    S: DocumentStore,
    P: AsRef<Path>,
{
    let mut urls = Vec::with_capacity(documents.len());
    for (field, path) in documents {
        let path: &Path = path.as_ref();
        let key = document_key(path)?;
        let url = store.upload(path, &key).await?;
        debug!("uploaded {field} to {key}");
        urls.push((field.to_string(), url));
    }
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct MemoryStore {
        keys: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl DocumentStore for MemoryStore {
        fn upload(
            &self,
            _local_path: &Path,
            key: &str,
        ) -> impl Future<Output = Result<String, StorageError>> + Send {
            let key = key.to_string();
            let result = if self.fail_on == Some(key.as_str()) {
                Err(StorageError::Upload {
                    key: key.clone(),
                    reason: "quota exceeded".to_string(),
                })
            } else {
                self.keys.lock().unwrap().push(key.clone());
                Ok(format!("https://files.example.com/{key}"))
            };
            async move { result }
        }
    }

    #[test]
    fn key_uses_file_name_only() {
        let key = document_key(Path::new("/tmp/picked/licence.pdf")).unwrap();
        assert_eq!(key, "images/licence.pdf");
    }

    #[test]
    fn key_requires_a_file_name() {
        assert!(matches!(
            document_key(Path::new("/")),
            Err(StorageError::NoFileName(_))
        ));
    }

    #[tokio::test]
    async fn uploads_map_fields_to_urls() {
        let store = MemoryStore::default();
        let docs = [
            ("insurance", PathBuf::from("/docs/insurance.pdf")),
            ("mot", PathBuf::from("/docs/mot.jpg")),
        ];
        let urls = upload_documents(&store, &docs).await.unwrap();
        assert_eq!(
            urls,
            vec![
                (
                    "insurance".to_string(),
                    "https://files.example.com/images/insurance.pdf".to_string()
                ),
                (
                    "mot".to_string(),
                    "https://files.example.com/images/mot.jpg".to_string()
                ),
            ]
        );
        assert_eq!(store.keys.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn first_failure_stops_the_batch() {
        let store = MemoryStore {
            fail_on: Some("images/a.pdf"),
            ..MemoryStore::default()
        };
        let docs = [("first", "/x/a.pdf"), ("second", "/x/b.pdf")];
        let err = upload_documents(&store, &docs).await.unwrap_err();
        assert!(matches!(err, StorageError::Upload { .. }));
        assert!(store.keys.lock().unwrap().is_empty());
    }
}
