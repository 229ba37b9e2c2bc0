use axum::{
    extract::{Json, Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::dto::form_dto::{DraftView, SubmitResponse, SuccessQuery, SuccessView};
use crate::form::{DraftStore, FormError, MediaAttachment, QuoteAnswers, QuoteWizard};
use crate::service::quote_request_service::{QuoteRequestService, QuoteRequestServiceImpl};
use crate::util::error::HandlerError;

pub struct FormState {
    pub drafts: Arc<DraftStore>,
    pub quote_service: Arc<QuoteRequestServiceImpl>,
}

fn parse_draft_id(raw: &str) -> Result<Uuid, HandlerError> {
    Uuid::parse_str(raw).map_err(|_| HandlerError::not_found(format!("No draft {}", raw)))
}

/// Run a wizard operation on a stored draft and answer with the new state.
async fn with_draft<F>(state: &FormState, draft_id: &str, op: F) -> Result<Json<DraftView>, HandlerError>
where
    F: FnOnce(&mut QuoteWizard) -> Result<(), FormError>,
{
    let id = parse_draft_id(draft_id)?;
    let view = state
        .drafts
        .update(&id, |wizard| op(wizard).map(|_| DraftView::new(&id, wizard)))
        .await
        .ok_or_else(|| HandlerError::not_found(format!("No draft {}", draft_id)))??;
    Ok(Json(view))
}

pub async fn create_draft_handler(State(state): State<Arc<FormState>>) -> Result<impl IntoResponse, HandlerError> {
    let (id, wizard) = state.drafts.create().await;
    info!(draft_id = %id, "Quote form started");
    Ok((StatusCode::CREATED, Json(DraftView::new(&id, &wizard))))
}

pub async fn get_draft_handler(
    State(state): State<Arc<FormState>>,
    Path(draft_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_draft_id(&draft_id)?;
    let wizard = state.drafts.get(&id).await.ok_or_else(|| HandlerError::not_found(format!("No draft {}", draft_id)))?;
    Ok(Json(DraftView::new(&id, &wizard)))
}

pub async fn update_draft_handler(
    State(state): State<Arc<FormState>>,
    Path(draft_id): Path<String>,
    Json(patch): Json<QuoteAnswers>,
) -> Result<impl IntoResponse, HandlerError> {
    with_draft(&state, &draft_id, |w| {
        w.apply(patch);
        Ok(())
    })
    .await
}

pub async fn next_step_handler(
    State(state): State<Arc<FormState>>,
    Path(draft_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    with_draft(&state, &draft_id, |w| w.next().map(|_| ())).await
}

pub async fn previous_step_handler(
    State(state): State<Arc<FormState>>,
    Path(draft_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    with_draft(&state, &draft_id, |w| w.back().map(|_| ())).await
}

/// Multipart body: any number of file parts plus an optional `capture` text
/// field marking them as taken with the live camera.
pub async fn upload_media_handler(
    State(state): State<Arc<FormState>>,
    Path(draft_id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let mut files: Vec<(String, String, bytes::Bytes)> = Vec::new();
    let mut captured = false;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!("Error getting next multipart field: {}", e);
        HandlerError::bad_request(format!("Failed to read multipart body: {}", e))
    })? {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();
        if name == "capture" {
            let value = field.text().await.map_err(|e| HandlerError::bad_request(e.to_string()))?;
            captured = matches!(value.trim(), "true" | "1" | "on");
            continue;
        }

        let Some(filename) = field.file_name().map(|s| s.to_string()) else {
            debug!("Skipping non-file field '{}'", name);
            continue;
        };
        let content_type = field.content_type().map(|s| s.to_string()).unwrap_or_default();
        let data = field.bytes().await.map_err(|e| {
            error!("Failed to read file '{}': {}", filename, e);
            HandlerError::bad_request(format!("Failed to read file {}: {}", filename, e))
        })?;
        files.push((filename, content_type, data));
    }

    if files.is_empty() {
        return Err(HandlerError::bad_request("No files in upload"));
    }
    info!(count = files.len(), captured, "Attaching media");
    let attachments = files
        .into_iter()
        .map(|(filename, content_type, data)| MediaAttachment::new(filename, content_type, data, captured))
        .collect();
    with_draft(&state, &draft_id, |w| w.attach_media(attachments).map(|_| ())).await
}

pub async fn remove_media_handler(
    State(state): State<Arc<FormState>>,
    Path((draft_id, index)): Path<(String, usize)>,
) -> Result<impl IntoResponse, HandlerError> {
    with_draft(&state, &draft_id, |w| w.remove_media(index).map(|_| ())).await
}

pub async fn submit_handler(
    State(state): State<Arc<FormState>>,
    Path(draft_id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_draft_id(&draft_id)?;
    // Taking the draft out makes a second submit of the same draft a 404
    let wizard = state.drafts.remove(&id).await.ok_or_else(|| HandlerError::not_found(format!("No draft {}", draft_id)))?;

    let submission = match wizard.prepare_submission() {
        Ok(submission) => submission,
        Err(e) => {
            state.drafts.restore(id, wizard).await;
            return Err(e.into());
        }
    };

    // On failure the draft goes back as it was so the user can try again
    let stored = match state.quote_service.submit(submission).await {
        Ok(stored) => stored,
        Err(e) => {
            state.drafts.restore(id, wizard).await;
            return Err(e.into());
        }
    };

    let request_id = stored.id.to_hex();
    info!(draft_id = %id, request_id = %request_id, "Quote form submitted");
    Ok((StatusCode::CREATED, Json(SubmitResponse::for_id(&request_id))))
}

pub async fn success_handler(Query(query): Query<SuccessQuery>) -> Result<impl IntoResponse, HandlerError> {
    match query.id {
        Some(id) if !id.is_empty() => Ok(Json(SuccessView::for_id(id))),
        _ => Err(HandlerError::bad_request("Missing request id")),
    }
}
