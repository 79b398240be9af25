use bytes::Bytes;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{ApiError, RepoError};
use crate::state::AppState;
use crate::storage::ObjectStore;
use crate::users::repo::User;

use super::repo::{self, NewTrace, Trace, TraceStatus};

/// One validated upload attempt, as parsed from the multipart form.
#[derive(Debug)]
pub struct TraceUpload {
    pub instructor_id: Uuid,
    pub file_name: String,
    pub vector_id: Option<String>,
    /// Original filename of the uploaded part, used in the storage key.
    pub original_name: String,
    pub content_type: String,
    pub body: Bytes,
}

/// Storage key: a fresh token in front of the original filename, so repeated
/// uploads of the same file never collide.
fn object_key(original_name: &str) -> String {
    format!("{}-{}", Uuid::new_v4(), original_name)
}

/// Upload phase of the workflow. Never fails: an adapter error becomes the
/// `failed` terminal state with an empty URL, which the record phase persists
/// like any other outcome.
async fn store_file(
    store: &dyn ObjectStore,
    key: &str,
    body: Bytes,
    content_type: &str,
) -> (TraceStatus, String) {
    match store.put_object(key, body, content_type).await {
        Ok(url) => (TraceStatus::Uploaded, url),
        Err(e) => {
            error!(error = %e, key, "object store upload failed");
            (TraceStatus::Failed, String::new())
        }
    }
}

/// Runs one upload attempt to a terminal state: push the bytes, then insert
/// exactly one trace row recording how it went. When the store rejected the
/// object the recorded row is kept and the caller still sees a server error.
///
/// A successful upload whose insert fails leaves an orphaned object behind;
/// there is no compensation step.
pub async fn upload_trace(
    state: &AppState,
    uploader: &User,
    course_id: Uuid,
    upload: TraceUpload,
) -> Result<Trace, ApiError> {
    let key = object_key(&upload.original_name);
    let (status, bucket_url) =
        store_file(state.storage.as_ref(), &key, upload.body, &upload.content_type).await;

    let trace = repo::insert(
        &state.db,
        NewTrace {
            uploader_user_id: uploader.id,
            instructor_id: upload.instructor_id,
            course_id,
            status,
            vector_id: upload.vector_id,
            file_name: upload.file_name,
            bucket_url,
        },
    )
    .await
    .map_err(|e| match e {
        RepoError::ForeignKey(_) => ApiError::bad_request("Invalid instructor_id or course_id"),
        other => {
            error!(error = %other, "insert trace record failed");
            ApiError::internal("Failed to insert trace record")
        }
    })?;

    info!(
        trace_id = %trace.id,
        course_id = %trace.course_id,
        status = ?trace.status,
        "trace recorded"
    );

    if trace.status == TraceStatus::Failed {
        return Err(ApiError::internal("Failed to upload file to object storage"));
    }
    Ok(trace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::async_trait;

    struct HappyStore;
    #[async_trait]
    impl ObjectStore for HappyStore {
        async fn put_object(
            &self,
            key: &str,
            _body: Bytes,
            _content_type: &str,
        ) -> anyhow::Result<String> {
            Ok(format!("https://bucket.example/{key}"))
        }
    }

    struct BrokenStore;
    #[async_trait]
    impl ObjectStore for BrokenStore {
        async fn put_object(
            &self,
            _key: &str,
            _body: Bytes,
            _content_type: &str,
        ) -> anyhow::Result<String> {
            anyhow::bail!("bucket unreachable")
        }
    }

    #[test]
    fn object_keys_keep_the_filename_and_never_collide() {
        let first = object_key("syllabus.pdf");
        let second = object_key("syllabus.pdf");
        assert!(first.ends_with("-syllabus.pdf"));
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn successful_upload_yields_uploaded_status_and_url() {
        let (status, url) = store_file(
            &HappyStore,
            "abc-syllabus.pdf",
            Bytes::from_static(b"pdf"),
            "application/pdf",
        )
        .await;
        assert_eq!(status, TraceStatus::Uploaded);
        assert_eq!(url, "https://bucket.example/abc-syllabus.pdf");
    }

    #[tokio::test]
    async fn failed_upload_yields_failed_status_and_empty_url() {
        let (status, url) = store_file(
            &BrokenStore,
            "abc-syllabus.pdf",
            Bytes::from_static(b"pdf"),
            "application/pdf",
        )
        .await;
        assert_eq!(status, TraceStatus::Failed);
        assert_eq!(url, "");
    }
}
