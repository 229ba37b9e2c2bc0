use serde::{Deserialize, Serialize};

use crate::form::wizard::{FormStep, MediaSummary, QuoteAnswers};
use crate::form::QuoteWizard;

/// Wizard state as the client sees it.
#[derive(Debug, Serialize)]
pub struct DraftView {
    pub draft_id: String,
    pub step: FormStep,
    pub step_index: usize,
    pub total_steps: usize,
    pub answers: QuoteAnswers,
    pub media: Vec<MediaSummary>,
    /// Fields the current step still needs before `next` succeeds
    pub missing: Vec<String>,
}

impl DraftView {
    pub fn new(draft_id: &uuid::Uuid, wizard: &QuoteWizard) -> Self {
        DraftView {
            draft_id: draft_id.to_string(),
            step: wizard.step(),
            step_index: wizard.step_index(),
            total_steps: FormStep::ALL.len(),
            answers: wizard.answers().clone(),
            media: wizard.media_summaries(),
            missing: wizard.missing_fields(wizard.step()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub id: String,
    pub redirect: String,
}

impl SubmitResponse {
    pub fn for_id(id: &str) -> Self {
        SubmitResponse { id: id.to_string(), redirect: format!("/form/success?id={}", id) }
    }
}

#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessView {
    pub id: String,
    pub message: String,
}

impl SuccessView {
    /// The id is echoed exactly as received.
    pub fn for_id(id: String) -> Self {
        let message = format!("Your quote request has been submitted. Your reference is {}.", id);
        SuccessView { id, message }
    }
}
