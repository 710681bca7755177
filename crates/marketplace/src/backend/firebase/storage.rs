//! Cloud Storage for Firebase image store.

use mime::Mime;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{FirebaseBackend, parse_json, read_body};
use crate::backend::{BackendError, BlobPath, BlobStore};

const SERVICE: &str = "storage";

/// Object metadata returned by an upload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    name: String,
    #[serde(default)]
    download_tokens: Option<String>,
}

impl FirebaseBackend {
    fn objects_url(&self) -> String {
        let config = self.config();
        format!(
            "{}/v0/b/{}/o",
            config.storage_url.as_str().trim_end_matches('/'),
            config.storage_bucket
        )
    }

    fn object_url(&self, object: &str) -> String {
        format!("{}/{}", self.objects_url(), urlencoding::encode(object))
    }

    /// Public download URL of an uploaded object.
    fn download_url(&self, metadata: &ObjectMetadata) -> String {
        let base = format!("{}?alt=media", self.object_url(&metadata.name));
        match metadata
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .filter(|token| !token.is_empty())
        {
            Some(token) => format!("{base}&token={token}"),
            None => base,
        }
    }
}

impl BlobStore for FirebaseBackend {
    #[instrument(skip(self, bytes), fields(path = %path, size = bytes.len()))]
    async fn upload(
        &self,
        path: &BlobPath,
        bytes: Vec<u8>,
        content_type: &Mime,
    ) -> Result<String, BackendError> {
        let request = self
            .require_auth(self.client().post(self.objects_url()))
            .await?
            .query(&[("name", path.to_string())])
            .header(reqwest::header::CONTENT_TYPE, content_type.as_ref())
            .body(bytes);

        let text = read_body(request.send().await?, SERVICE).await?;
        let metadata: ObjectMetadata = parse_json(&text)?;
        let url = self.download_url(&metadata);
        debug!(object = %metadata.name, "Image uploaded");
        Ok(url)
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn delete(&self, path: &BlobPath) -> Result<(), BackendError> {
        let url = self.object_url(&path.to_string());
        let request = self.require_auth(self.client().delete(url)).await?;
        read_body(request.send().await?, SERVICE).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use drivex_core::OwnerId;

    use super::*;
    use crate::backend::firebase::tests::backend;

    #[test]
    fn test_download_url_uses_first_token() {
        let backend = backend(Duration::ZERO);
        let metadata: ObjectMetadata = serde_json::from_str(
            r#"{"name":"images/u1/abc","bucket":"drive-test.appspot.com","downloadTokens":"t1,t2"}"#,
        )
        .unwrap();
        assert_eq!(
            backend.download_url(&metadata),
            "http://127.0.0.1:9/v0/b/drive-test.appspot.com/o/images%2Fu1%2Fabc?alt=media&token=t1"
        );
    }

    #[tokio::test]
    async fn test_upload_requires_sign_in() {
        let backend = backend(Duration::ZERO);
        let path = BlobPath::new(OwnerId::new("u1"), "abc");
        assert!(matches!(
            backend.upload(&path, vec![1, 2, 3], &mime::IMAGE_PNG).await,
            Err(BackendError::Unauthenticated)
        ));
    }
}
