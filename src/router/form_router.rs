use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::handler::form_handler::{
    create_draft_handler, get_draft_handler, next_step_handler, previous_step_handler, remove_media_handler,
    submit_handler, success_handler, update_draft_handler, upload_media_handler, FormState,
};

/// Upload bodies may carry several photos or a short video.
pub const MEDIA_BODY_LIMIT: usize = 64 * 1024 * 1024;

pub fn form_router(state: Arc<FormState>) -> Router {
    Router::new()
        .route("/form", post(create_draft_handler))
        .route("/form/success", get(success_handler))
        .route("/form/{draft_id}", get(get_draft_handler).put(update_draft_handler))
        .route("/form/{draft_id}/next", post(next_step_handler))
        .route("/form/{draft_id}/back", post(previous_step_handler))
        .route(
            "/form/{draft_id}/media",
            post(upload_media_handler).layer(DefaultBodyLimit::max(MEDIA_BODY_LIMIT)),
        )
        .route("/form/{draft_id}/media/{index}", delete(remove_media_handler))
        .route("/form/{draft_id}/submit", post(submit_handler))
        .with_state(state)
}
