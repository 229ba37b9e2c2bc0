pub mod draft_store;
pub mod wizard;

pub use draft_store::DraftStore;
pub use wizard::{FormError, FormStep, MediaAttachment, QuoteAnswers, QuoteSubmission, QuoteWizard};
