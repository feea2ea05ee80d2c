//! Object storage collaborators.
//!
//! The job reads three objects and writes one. [`ObjectStore`] is the seam;
//! [`GcsStore`] talks to Google Cloud Storage and [`FsStore`] maps containers
//! to directories for local runs. [`Resilient`] adds a per-call timeout and a
//! single retry on transient failures.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use backon::{ConstantBuilder, Retryable};
use google_cloud_storage::client::{Client, ClientConfig};
use google_cloud_storage::http::objects::download::Range;
use google_cloud_storage::http::objects::get::GetObjectRequest;
use google_cloud_storage::http::objects::upload::{Media, UploadObjectRequest, UploadType};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object {container}/{key} not found")]
    NotFound { container: String, key: String },

    #[error("I/O error on {container}/{key}: {source}")]
    Io {
        container: String,
        key: String,
        #[source]
        source: io::Error,
    },

    #[error("Storage request for {container}/{key} failed: {message}")]
    Backend {
        container: String,
        key: String,
        message: String,
    },

    #[error("Storage request for {container}/{key} timed out after {after:?}")]
    Timeout {
        container: String,
        key: String,
        after: Duration,
    },

    #[error("Could not connect to storage: {0}")]
    Connect(String),
}

impl StorageError {
    /// Whether repeating the call could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StorageError::Backend { .. } | StorageError::Timeout { .. } | StorageError::Io { .. }
        )
    }
}

/// Read and write named objects in named containers.
pub trait ObjectStore {
    fn get(
        &self,
        container: &str,
        key: &str,
    ) -> impl Future<Output = Result<Vec<u8>, StorageError>>;

    fn put(
        &self,
        container: &str,
        key: &str,
        body: Vec<u8>,
    ) -> impl Future<Output = Result<(), StorageError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Gcs,
    Fs,
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKind::Gcs => write!(f, "gcs"),
            StoreKind::Fs => write!(f, "fs"),
        }
    }
}

/// Containers are subdirectories of `root`; keys are relative paths inside them.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, container: &str, key: &str) -> PathBuf {
        self.root.join(container).join(key)
    }

    fn io_error(container: &str, key: &str, source: io::Error) -> StorageError {
        if source.kind() == io::ErrorKind::NotFound {
            StorageError::NotFound {
                container: container.to_string(),
                key: key.to_string(),
            }
        } else {
            StorageError::Io {
                container: container.to_string(),
                key: key.to_string(),
                source,
            }
        }
    }
}

impl ObjectStore for FsStore {
    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path(container, key);
        debug!(path = %path.display(), "reading object");
        tokio::fs::read(&path)
            .await
            .map_err(|e| Self::io_error(container, key, e))
    }

    async fn put(&self, container: &str, key: &str, body: Vec<u8>) -> Result<(), StorageError> {
        let path = self.path(container, key);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Self::io_error(container, key, e))?;
        }
        debug!(path = %path.display(), bytes = body.len(), "writing object");
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| Self::io_error(container, key, e))
    }
}

/// Google Cloud Storage using application default credentials.
pub struct GcsStore {
    client: Client,
}

impl GcsStore {
    pub async fn connect() -> Result<Self, StorageError> {
        let config = ClientConfig::default()
            .with_auth()
            .await
            .map_err(|e| StorageError::Connect(e.to_string()))?;
        Ok(Self {
            client: Client::new(config),
        })
    }

    fn backend_error(
        container: &str,
        key: &str,
        err: google_cloud_storage::http::Error,
    ) -> StorageError {
        match err {
            google_cloud_storage::http::Error::Response(response) if response.code == 404 => {
                StorageError::NotFound {
                    container: container.to_string(),
                    key: key.to_string(),
                }
            }
            other => StorageError::Backend {
                container: container.to_string(),
                key: key.to_string(),
                message: other.to_string(),
            },
        }
    }
}

impl ObjectStore for GcsStore {
    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let request = GetObjectRequest {
            bucket: container.to_string(),
            object: key.to_string(),
            ..Default::default()
        };
        self.client
            .download_object(&request, &Range::default())
            .await
            .map_err(|e| Self::backend_error(container, key, e))
    }

    async fn put(&self, container: &str, key: &str, body: Vec<u8>) -> Result<(), StorageError> {
        let request = UploadObjectRequest {
            bucket: container.to_string(),
            ..Default::default()
        };
        let mut media = Media::new(key.to_string());
        media.content_type = "text/csv".into();

        self.client
            .upload_object(&request, body, &UploadType::Simple(media))
            .await
            .map(|_| ())
            .map_err(|e| Self::backend_error(container, key, e))
    }
}

/// The backend selected by configuration.
pub enum Store {
    Gcs(GcsStore),
    Fs(FsStore),
}

impl Store {
    pub async fn open(kind: StoreKind, fs_root: &Path) -> Result<Self, StorageError> {
        match kind {
            StoreKind::Gcs => Ok(Store::Gcs(GcsStore::connect().await?)),
            StoreKind::Fs => Ok(Store::Fs(FsStore::new(fs_root))),
        }
    }
}

impl ObjectStore for Store {
    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        match self {
            Store::Gcs(store) => store.get(container, key).await,
            Store::Fs(store) => store.get(container, key).await,
        }
    }

    async fn put(&self, container: &str, key: &str, body: Vec<u8>) -> Result<(), StorageError> {
        match self {
            Store::Gcs(store) => store.put(container, key, body).await,
            Store::Fs(store) => store.put(container, key, body).await,
        }
    }
}

/// Wraps a store with a per-call timeout and one retry of transient failures.
pub struct Resilient<S> {
    inner: S,
    timeout: Duration,
    retry_delay: Duration,
}

impl<S: ObjectStore> Resilient<S> {
    pub fn new(inner: S, timeout: Duration, retry_delay: Duration) -> Self {
        Self {
            inner,
            timeout,
            retry_delay,
        }
    }

    fn backoff(&self) -> ConstantBuilder {
        ConstantBuilder::default()
            .with_delay(self.retry_delay)
            .with_max_times(1)
    }

    async fn timed<T>(
        &self,
        container: &str,
        key: &str,
        call: impl Future<Output = Result<T, StorageError>>,
    ) -> Result<T, StorageError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| StorageError::Timeout {
                container: container.to_string(),
                key: key.to_string(),
                after: self.timeout,
            })?
    }
}

impl<S: ObjectStore> ObjectStore for Resilient<S> {
    async fn get(&self, container: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        (|| self.timed(container, key, self.inner.get(container, key)))
            .retry(self.backoff())
            .when(StorageError::is_transient)
            .notify(|err, delay| warn!(error = %err, ?delay, "retrying storage read"))
            .await
    }

    async fn put(&self, container: &str, key: &str, body: Vec<u8>) -> Result<(), StorageError> {
        (|| self.timed(container, key, self.inner.put(container, key, body.clone())))
            .retry(self.backoff())
            .when(StorageError::is_transient)
            .notify(|err, delay| warn!(error = %err, ?delay, "retrying storage write"))
            .await
    }
}
