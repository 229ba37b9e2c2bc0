use async_trait::async_trait;
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::dto::admin_dto::{MediaLink, RequestDetail};
use crate::form::{MediaAttachment, QuoteSubmission};
use crate::model::activity::{ActivityEntry, ActivityKind};
use crate::model::quote_request::{MediaRef, QuoteRequest};
use crate::repository::{ActivityRepository, QuoteRequestRepository};
use crate::util::email::QuoteNotifier;
use crate::util::error::ServiceError;
use crate::util::minio::MediaStore;

#[async_trait]
pub trait QuoteRequestService: Send + Sync {
    /// Upload the media, then write the request as one document.
    async fn submit(&self, submission: QuoteSubmission) -> Result<QuoteRequest, ServiceError>;
    async fn get_request(&self, id: &str) -> Result<RequestDetail, ServiceError>;
    async fn list_requests(&self, limit: i64) -> Result<Vec<QuoteRequest>, ServiceError>;
    async fn list_for_contact(&self, email: &str) -> Result<Vec<QuoteRequest>, ServiceError>;
}

pub struct QuoteRequestServiceImpl {
    pub request_repo: Arc<dyn QuoteRequestRepository>,
    pub activity_repo: Arc<dyn ActivityRepository>,
    pub media_store: Arc<dyn MediaStore>,
    pub notifier: Option<Arc<dyn QuoteNotifier>>,
}

impl QuoteRequestServiceImpl {
    pub fn new(
        request_repo: Arc<dyn QuoteRequestRepository>,
        activity_repo: Arc<dyn ActivityRepository>,
        media_store: Arc<dyn MediaStore>,
        notifier: Option<Arc<dyn QuoteNotifier>>,
    ) -> Self {
        Self { request_repo, activity_repo, media_store, notifier }
    }

    async fn upload_media(&self, id: &ObjectId, media: Vec<MediaAttachment>) -> Result<Vec<MediaRef>, ServiceError> {
        let mut uploaded: Vec<MediaRef> = Vec::with_capacity(media.len());
        for file in media {
            let object_key = object_key_for(id, &file.filename);
            let size = file.size();
            if let Err(e) = self.media_store.put_object(&object_key, file.data, &file.content_type).await {
                error!("Failed to upload '{}': {}", file.filename, e);
                self.discard(&uploaded).await;
                return Err(ServiceError::InternalError(format!("Media upload failed: {}", e)));
            }
            uploaded.push(MediaRef {
                object_key,
                original_filename: file.filename,
                content_type: file.content_type,
                size,
                captured: file.captured,
            });
        }
        Ok(uploaded)
    }

    /// Remove objects of a submission that did not make it into the database.
    async fn discard(&self, media: &[MediaRef]) {
        for m in media {
            if let Err(e) = self.media_store.remove_object(&m.object_key).await {
                warn!("Failed to remove orphaned object '{}': {}", m.object_key, e);
            }
        }
    }
}

/// `requests/<request id>/<uuid>.<ext>`; the extension is kept only when it is plain alphanumeric.
pub fn object_key_for(request_id: &ObjectId, filename: &str) -> String {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("requests/{}/{}{}", request_id.to_hex(), Uuid::new_v4(), ext)
}

#[async_trait]
impl QuoteRequestService for QuoteRequestServiceImpl {
    #[instrument(skip(self, submission), fields(media = submission.media.len()))]
    async fn submit(&self, mut submission: QuoteSubmission) -> Result<QuoteRequest, ServiceError> {
        info!("Submitting quote request");
        let id = ObjectId::new();
        let media = std::mem::take(&mut submission.media);
        let media_refs = self.upload_media(&id, media).await?;

        let request = submission.into_request(id, media_refs.clone());
        let stored = match self.request_repo.create(request).await {
            Ok(stored) => stored,
            Err(e) => {
                error!("Failed to store quote request: {}", e);
                self.discard(&media_refs).await;
                return Err(e.into());
            }
        };

        let entry = ActivityEntry::new(
            ActivityKind::RequestSubmitted,
            format!("Quote request from {}", stored.contact.full_name),
        )
        .with_actor(stored.contact.email.clone())
        .with_target(stored.id.to_hex());
        if let Err(e) = self.activity_repo.record(entry).await {
            warn!("Failed to record submission activity: {}", e);
        }

        if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier.send_quote_confirmation(&stored).await {
                warn!("Confirmation email not sent: {}", e);
            }
        }

        info!(request_id = %stored.id, "Quote request submitted");
        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn get_request(&self, id: &str) -> Result<RequestDetail, ServiceError> {
        let oid = ObjectId::parse_str(id).map_err(|_| ServiceError::InvalidInput(format!("Invalid request id: {}", id)))?;
        let request = self.request_repo.get_by_id(oid).await?;
        let media_links = request
            .media
            .iter()
            .map(|m| MediaLink { media: m.clone(), url: self.media_store.download_link(&m.object_key) })
            .collect();
        Ok(RequestDetail { request, media_links })
    }

    async fn list_requests(&self, limit: i64) -> Result<Vec<QuoteRequest>, ServiceError> {
        Ok(self.request_repo.list_recent(limit).await?)
    }

    async fn list_for_contact(&self, email: &str) -> Result<Vec<QuoteRequest>, ServiceError> {
        Ok(self.request_repo.list_by_contact_email(email).await?)
    }
}
