//! Storage provider backed by the cloud drive's REST surface.
//!
//! A thin client over the provider's v3 endpoints: child listing by parent
//! query, metadata lookup, multipart upload, container creation and
//! deletion. The bearer credential is handed in at construction; the
//! identity layer owns refreshing it.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use super::provider::{ItemKind, ItemMetadata, ProgressFn, StorageError, StorageProvider};

const API_BASE: &str = "https://www.googleapis.com/drive/v3";
const UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";
const CONTAINER_MIME: &str = "application/vnd.google-apps.folder";
const LIST_FIELDS: &str = "files(id,name,mimeType,parents,size,modifiedTime,createdTime)";

#[derive(thiserror::Error, Debug)]
pub enum DriveStorageError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0} from {1}")]
    Status(StatusCode, String),
}

#[derive(Debug, Clone, Deserialize)]
struct DriveFile {
    id: String,
    name: String,
    #[serde(rename = "mimeType")]
    mime_type: String,
    #[serde(default)]
    size: Option<String>,
    #[serde(default, rename = "modifiedTime")]
    modified_time: Option<DateTime<Utc>>,
}

impl From<DriveFile> for ItemMetadata {
    fn from(file: DriveFile) -> Self {
        let kind = if file.mime_type == CONTAINER_MIME {
            ItemKind::Container
        } else {
            ItemKind::File
        };
        ItemMetadata {
            id: file.id,
            name: file.name,
            kind,
            size: file.size.and_then(|s| s.parse().ok()),
            modified_at: file.modified_time,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

/// Drive-backed [`StorageProvider`].
#[derive(Debug, Clone)]
pub struct DriveStorageProvider {
    client: reqwest::Client,
    token: Arc<String>,
    api_base: String,
    upload_base: String,
}

impl DriveStorageProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: Arc::new(token.into()),
            api_base: API_BASE.to_string(),
            upload_base: UPLOAD_BASE.to_string(),
        }
    }

    /// Point the adapter at a different API origin (tests, proxies).
    pub fn with_endpoints(mut self, api_base: impl Into<String>, upload_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self.upload_base = upload_base.into();
        self
    }

    fn check_status(
        response: &reqwest::Response,
        subject: &str,
    ) -> Result<(), StorageError<DriveStorageError>> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound(subject.to_string()));
        }
        if !status.is_success() {
            return Err(StorageError::Provider(DriveStorageError::Status(
                status,
                subject.to_string(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageProvider for DriveStorageProvider {
    type Error = DriveStorageError;

    async fn list_children(
        &self,
        container_id: &str,
    ) -> Result<Vec<ItemMetadata>, StorageError<Self::Error>> {
        let response = self
            .client
            .get(format!("{}/files", self.api_base))
            .query(&[
                ("q", format!("'{}' in parents", container_id)),
                ("fields", LIST_FIELDS.to_string()),
            ])
            .bearer_auth(self.token.as_str())
            .send()
            .await
            .map_err(DriveStorageError::Http)?;
        Self::check_status(&response, container_id)?;

        let list: DriveFileList = response.json().await.map_err(DriveStorageError::Http)?;
        Ok(list.files.into_iter().map(ItemMetadata::from).collect())
    }

    async fn get_metadata(
        &self,
        item_id: &str,
    ) -> Result<ItemMetadata, StorageError<Self::Error>> {
        let response = self
            .client
            .get(format!("{}/files/{}", self.api_base, item_id))
            .query(&[("fields", "id,name,mimeType,size,modifiedTime")])
            .bearer_auth(self.token.as_str())
            .send()
            .await
            .map_err(DriveStorageError::Http)?;
        Self::check_status(&response, item_id)?;

        let file: DriveFile = response.json().await.map_err(DriveStorageError::Http)?;
        Ok(file.into())
    }

    async fn create_container(
        &self,
        parent_id: &str,
        name: &str,
    ) -> Result<String, StorageError<Self::Error>> {
        let body = serde_json::json!({
            "name": name,
            "mimeType": CONTAINER_MIME,
            "parents": [parent_id],
        });
        let response = self
            .client
            .post(format!("{}/files", self.api_base))
            .bearer_auth(self.token.as_str())
            .json(&body)
            .send()
            .await
            .map_err(DriveStorageError::Http)?;
        Self::check_status(&response, parent_id)?;

        let file: DriveFile = response.json().await.map_err(DriveStorageError::Http)?;
        Ok(file.id)
    }

    async fn upload_item(
        &self,
        container_id: &str,
        name: &str,
        bytes: Bytes,
        progress: ProgressFn,
        cancel: CancellationToken,
    ) -> Result<String, StorageError<Self::Error>> {
        if cancel.is_cancelled() {
            return Err(StorageError::Cancelled(name.to_string()));
        }
        progress(0);

        let metadata = serde_json::json!({
            "name": name,
            "parents": [container_id],
        });
        let form = Form::new()
            .part(
                "metadata",
                Part::text(metadata.to_string())
                    .mime_str("application/json")
                    .map_err(DriveStorageError::Http)?,
            )
            .part(
                "file",
                Part::bytes(bytes.to_vec()).file_name(name.to_string()),
            );

        let request = self
            .client
            .post(format!("{}/files", self.upload_base))
            .query(&[("uploadType", "multipart")])
            .bearer_auth(self.token.as_str())
            .multipart(form)
            .send();

        // The REST surface gives no mid-flight progress; we report the
        // terminal step once the provider has acknowledged the upload.
        let response = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(StorageError::Cancelled(name.to_string()));
            }
            result = request => result.map_err(DriveStorageError::Http)?,
        };
        Self::check_status(&response, name)?;

        let file: DriveFile = response.json().await.map_err(DriveStorageError::Http)?;
        progress(100);
        Ok(file.id)
    }

    async fn delete_item(&self, item_id: &str) -> Result<(), StorageError<Self::Error>> {
        let response = self
            .client
            .delete(format!("{}/files/{}", self.api_base, item_id))
            .bearer_auth(self.token.as_str())
            .send()
            .await
            .map_err(DriveStorageError::Http)?;
        Self::check_status(&response, item_id)
    }
}
