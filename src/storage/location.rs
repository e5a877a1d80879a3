//! Object storage handle (local, S3, R2, GCS, Azure)

use super::glob::GlobPattern;
use crate::config::AwsCredentials;
use crate::error::{Error, Result};
use bytes::Bytes;
use futures::stream::{self, StreamExt, TryStreamExt};
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use parquet::arrow::async_reader::ParquetObjectReader;
use std::sync::Arc;

/// A storage root: an object store plus a key prefix inside it
///
/// All paths passed to and returned from a `Storage` are relative to the
/// root, `/`-separated, without leading slash.
#[derive(Debug, Clone)]
pub struct Storage {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Key prefix within the bucket/container
    prefix: String,
    /// URL scheme for logging
    scheme: String,
    /// Bucket/container (or local directory) for logging
    authority: String,
}

impl Storage {
    /// Open an existing storage root
    ///
    /// Supported formats:
    /// - `s3://bucket/path/` or `s3a://bucket/path/` - AWS S3
    /// - `r2://bucket/path/` - Cloudflare R2 (S3-compatible)
    /// - `gs://bucket/path/` - Google Cloud Storage
    /// - `az://container/path/` - Azure Blob Storage
    /// - `/local/path/`, `./path/` or `file:///path` - Local filesystem
    pub fn open(url: &str, aws: &AwsCredentials) -> Result<Self> {
        Self::parse(url, aws, false)
    }

    /// Open a storage root for writing, creating a local directory if needed
    pub fn create(url: &str, aws: &AwsCredentials) -> Result<Self> {
        Self::parse(url, aws, true)
    }

    /// Wrap an existing object store
    pub fn from_store(store: Arc<dyn ObjectStore>, prefix: &str) -> Self {
        Self {
            store,
            prefix: prefix.trim_matches('/').to_string(),
            scheme: "memory".to_string(),
            authority: String::new(),
        }
    }

    /// A fresh, empty in-memory store
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemory::new()), "")
    }

    fn parse(url: &str, aws: &AwsCredentials, create: bool) -> Result<Self> {
        if url.trim().is_empty() {
            return Err(Error::config("storage URL is empty"));
        }

        if let Some(rest) = url.strip_prefix("s3://") {
            Self::parse_s3(rest, "s3", aws)
        } else if let Some(rest) = url.strip_prefix("s3a://") {
            Self::parse_s3(rest, "s3a", aws)
        } else if let Some(rest) = url.strip_prefix("r2://") {
            Self::parse_s3(rest, "r2", aws)
        } else if let Some(rest) = url.strip_prefix("gs://") {
            Self::parse_gcs(rest)
        } else if let Some(rest) = url.strip_prefix("az://") {
            Self::parse_azure(rest)
        } else {
            Self::parse_local(url, create)
        }
    }

    /// Parse S3, S3A or R2 URL (scheme already stripped)
    fn parse_s3(without_scheme: &str, scheme: &str, aws: &AwsCredentials) -> Result<Self> {
        let (bucket, prefix) = split_bucket(without_scheme);
        if bucket.is_empty() {
            return Err(Error::config(format!("Missing bucket in {scheme} URL")));
        }

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);

        if let Some(key) = &aws.access_key_id {
            builder = builder.with_access_key_id(key);
        }
        if let Some(secret) = &aws.secret_access_key {
            builder = builder.with_secret_access_key(secret);
        }
        if let Some(region) = &aws.region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = &aws.endpoint {
            builder = builder.with_endpoint(endpoint);
        } else if scheme == "r2" {
            // R2 endpoint: https://<account_id>.r2.cloudflarestorage.com
            if let Ok(endpoint) = std::env::var("R2_ENDPOINT_URL") {
                builder = builder.with_endpoint(endpoint);
            }
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create {scheme} client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: scheme.to_string(),
            authority: bucket.to_string(),
        })
    }

    /// Parse GCS URL (scheme already stripped)
    fn parse_gcs(without_scheme: &str) -> Result<Self> {
        let (bucket, prefix) = split_bucket(without_scheme);

        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| Error::config(format!("Failed to create GCS client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "gs".to_string(),
            authority: bucket.to_string(),
        })
    }

    /// Parse Azure Blob URL (scheme already stripped)
    fn parse_azure(without_scheme: &str) -> Result<Self> {
        let (container, prefix) = split_bucket(without_scheme);

        let store = MicrosoftAzureBuilder::from_env()
            .with_container_name(container)
            .build()
            .map_err(|e| Error::config(format!("Failed to create Azure client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "az".to_string(),
            authority: container.to_string(),
        })
    }

    /// Parse local filesystem path
    fn parse_local(path: &str, create: bool) -> Result<Self> {
        let path = path.strip_prefix("file://").unwrap_or(path);

        if create {
            std::fs::create_dir_all(path).map_err(|e| {
                Error::write(path, format!("output root is not writable: {e}"))
            })?;
        } else if !std::path::Path::new(path).is_dir() {
            return Err(Error::config(format!("Directory does not exist: {path}")));
        }

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: String::new(),
            scheme: "file".to_string(),
            authority: path.trim_end_matches('/').to_string(),
        })
    }

    /// Get the scheme (s3, s3a, r2, gs, az, file, memory)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Full URL of a relative path, for logging
    pub fn url(&self, relative: &str) -> String {
        let key = self.key(relative);
        match (self.authority.is_empty(), key.is_empty()) {
            (true, _) => format!("{}://{key}", self.scheme),
            (false, true) => format!("{}://{}", self.scheme, self.authority),
            (false, false) => format!("{}://{}/{key}", self.scheme, self.authority),
        }
    }

    fn key(&self, relative: &str) -> String {
        let relative = relative.trim_matches('/');
        match (self.prefix.is_empty(), relative.is_empty()) {
            (true, _) => relative.to_string(),
            (false, true) => self.prefix.clone(),
            (false, false) => format!("{}/{relative}", self.prefix),
        }
    }

    /// Object path for a relative key
    ///
    /// Keys are taken verbatim (no re-encoding), so `%XX` escapes written by
    /// the partition writer come back unchanged from listings.
    fn location(&self, relative: &str) -> Result<ObjectPath> {
        let key = self.key(relative);
        ObjectPath::parse(&key)
            .map_err(|e| Error::Other(format!("Invalid object path '{key}': {e}")))
    }

    fn relative(&self, location: &ObjectPath) -> String {
        let full = location.as_ref();
        if self.prefix.is_empty() {
            return full.to_string();
        }
        full.strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(full)
            .to_string()
    }

    /// List every object under a relative directory, sorted by path
    pub async fn list(&self, relative_dir: &str) -> Result<Vec<String>> {
        let dir = self.location(relative_dir)?;
        let prefix = if dir.as_ref().is_empty() {
            None
        } else {
            Some(&dir)
        };

        let mut paths: Vec<String> = self
            .store
            .list(prefix)
            .map_ok(|meta| self.relative(&meta.location))
            .try_collect()
            .await?;
        paths.sort();
        Ok(paths)
    }

    /// List every object matching a glob, sorted by path
    pub async fn glob(&self, pattern: &GlobPattern) -> Result<Vec<String>> {
        let mut paths = self.list(pattern.prefix()).await?;
        paths.retain(|p| pattern.is_match(p));
        Ok(paths)
    }

    /// Read a whole object
    pub async fn get(&self, relative: &str) -> Result<Bytes> {
        let result = self.store.get(&self.location(relative)?).await?;
        Ok(result.bytes().await?)
    }

    /// Write a whole object, replacing any previous content
    ///
    /// Returns the full URL for logging.
    pub async fn put(&self, relative: &str, data: Bytes) -> Result<String> {
        self.store.put(&self.location(relative)?, data.into()).await?;
        Ok(self.url(relative))
    }

    /// Ranged reader over a Parquet object
    ///
    /// Only the byte ranges a caller asks for are fetched, so footer-only
    /// reads stay small.
    pub async fn parquet_reader(&self, relative: &str) -> Result<ParquetObjectReader> {
        let meta = self.store.head(&self.location(relative)?).await?;
        Ok(ParquetObjectReader::new(Arc::clone(&self.store), meta))
    }

    /// Check whether an object exists
    pub async fn exists(&self, relative: &str) -> Result<bool> {
        match self.store.head(&self.location(relative)?).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every object under a relative directory
    ///
    /// Returns the number of objects deleted.
    pub async fn delete_dir(&self, relative_dir: &str, concurrency: usize) -> Result<usize> {
        let paths = self.list(relative_dir).await?;
        let count = paths.len();

        stream::iter(paths)
            .map(|path| async move {
                self.store.delete(&self.location(&path)?).await?;
                Ok::<_, Error>(())
            })
            .buffer_unordered(concurrency.max(1))
            .try_collect::<Vec<_>>()
            .await?;

        Ok(count)
    }
}

fn split_bucket(without_scheme: &str) -> (&str, String) {
    match without_scheme.find('/') {
        Some(idx) => (
            &without_scheme[..idx],
            without_scheme[idx + 1..].trim_matches('/').to_string(),
        ),
        None => (without_scheme, String::new()),
    }
}
