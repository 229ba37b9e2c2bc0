//! Multi-step quote form.
//!
//! A [`QuoteWizard`] owns one record of answers, the index of the step being
//! shown and the survey media attached so far. Steps never talk to storage;
//! they only read and write the record. Moving between steps changes nothing
//! but the index.

use bson::oid::ObjectId;
use bytes::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::quote_request::{
    Address, ContactDetails, DismantlingOption, MediaRef, PackingOption, PropertyDetails,
    PropertyType, QuoteRequest, ServiceType, SurveyMethod,
};

/// Upper bound on attachments held by one draft.
pub const MAX_ATTACHMENTS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStep {
    ServiceType,
    PickupAddress,
    DeliveryAddress,
    PropertyDetails,
    Packing,
    Dismantling,
    Survey,
    ContactDetails,
    Review,
}

impl FormStep {
    pub const ALL: [FormStep; 9] = [
        FormStep::ServiceType,
        FormStep::PickupAddress,
        FormStep::DeliveryAddress,
        FormStep::PropertyDetails,
        FormStep::Packing,
        FormStep::Dismantling,
        FormStep::Survey,
        FormStep::ContactDetails,
        FormStep::Review,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<FormStep> {
        Self::ALL.get(index).copied()
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FormError {
    #[error("Step {step:?} is missing: {}", .fields.join(", "))]
    MissingFields { step: FormStep, fields: Vec<String> },

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Already at the first step")]
    AtFirstStep,

    #[error("Already at the last step")]
    AtLastStep,

    #[error("The form can only be submitted from the review step (currently at {0:?})")]
    NotAtReview(FormStep),

    #[error("No attachment at position {index} (have {len})")]
    MediaIndexOutOfRange { index: usize, len: usize },

    #[error("Unsupported media type: {0}")]
    UnsupportedMedia(String),

    #[error("Attachment {0} is empty")]
    EmptyMedia(String),

    #[error("At most {} attachments are accepted", MAX_ATTACHMENTS)]
    TooManyAttachments,
}

/// The flat answer record. Every field is optional while the form is being
/// filled; a patch with the same shape is merged in by [`QuoteWizard::apply`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteAnswers {
    pub service_type: Option<ServiceType>,
    pub pickup: Option<Address>,
    pub delivery: Option<Address>,
    pub property_type: Option<PropertyType>,
    pub bedrooms: Option<u8>,
    pub move_date: Option<NaiveDate>,
    pub flexible_dates: Option<bool>,
    pub packing: Option<PackingOption>,
    pub dismantling: Option<DismantlingOption>,
    pub survey_method: Option<SurveyMethod>,
    pub attach_media_now: Option<bool>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl QuoteAnswers {
    /// Overwrite every field the patch carries, keep the rest.
    pub fn merge(&mut self, patch: QuoteAnswers) {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if patch.$field.is_some() { self.$field = patch.$field; })*
            };
        }
        take!(
            service_type, pickup, delivery, property_type, bedrooms, move_date, flexible_dates,
            packing, dismantling, survey_method, attach_media_now, full_name, email, phone, notes,
        );
    }
}

/// A survey photo or video held in memory until submission.
#[derive(Debug, Clone)]
pub struct MediaAttachment {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
    pub captured: bool,
}

impl MediaAttachment {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, data: Bytes, captured: bool) -> Self {
        MediaAttachment { filename: filename.into(), content_type: content_type.into(), data, captured }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaSummary {
    pub position: usize,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    pub captured: bool,
}

#[derive(Debug, Clone, Default)]
pub struct QuoteWizard {
    answers: QuoteAnswers,
    step: usize,
    media: Vec<MediaAttachment>,
}

impl QuoteWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answers(&self) -> &QuoteAnswers {
        &self.answers
    }

    pub fn step(&self) -> FormStep {
        FormStep::from_index(self.step).unwrap_or(FormStep::Review)
    }

    pub fn step_index(&self) -> usize {
        self.step
    }

    pub fn media(&self) -> &[MediaAttachment] {
        &self.media
    }

    pub fn media_summaries(&self) -> Vec<MediaSummary> {
        self.media
            .iter()
            .enumerate()
            .map(|(position, m)| MediaSummary {
                position,
                filename: m.filename.clone(),
                content_type: m.content_type.clone(),
                size: m.size(),
                captured: m.captured,
            })
            .collect()
    }

    /// Setter handed to every step.
    pub fn apply(&mut self, patch: QuoteAnswers) {
        self.answers.merge(patch);
    }

    pub fn next(&mut self) -> Result<FormStep, FormError> {
        if self.step + 1 >= FormStep::ALL.len() {
            return Err(FormError::AtLastStep);
        }
        self.check_step(self.step())?;
        self.step += 1;
        Ok(self.step())
    }

    pub fn back(&mut self) -> Result<FormStep, FormError> {
        if self.step == 0 {
            return Err(FormError::AtFirstStep);
        }
        self.step -= 1;
        Ok(self.step())
    }

    /// Append images or videos, in order. Nothing is added if any of them is rejected.
    pub fn attach_media(&mut self, files: Vec<MediaAttachment>) -> Result<usize, FormError> {
        if self.media.len() + files.len() > MAX_ATTACHMENTS {
            return Err(FormError::TooManyAttachments);
        }
        for file in &files {
            let ct = file.content_type.to_ascii_lowercase();
            if !(ct.starts_with("image/") || ct.starts_with("video/")) {
                return Err(FormError::UnsupportedMedia(file.content_type.clone()));
            }
            if file.data.is_empty() {
                return Err(FormError::EmptyMedia(file.filename.clone()));
            }
        }
        self.media.extend(files);
        Ok(self.media.len())
    }

    pub fn remove_media(&mut self, position: usize) -> Result<MediaAttachment, FormError> {
        if position >= self.media.len() {
            return Err(FormError::MediaIndexOutOfRange { index: position, len: self.media.len() });
        }
        Ok(self.media.remove(position))
    }

    /// Fields the given step still needs.
    pub fn missing_fields(&self, step: FormStep) -> Vec<String> {
        let a = &self.answers;
        let mut missing: Vec<String> = Vec::new();
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());

        match step {
            FormStep::ServiceType => {
                if a.service_type.is_none() {
                    missing.push("service_type".into());
                }
            }
            FormStep::PickupAddress => address_gaps("pickup", a.pickup.as_ref(), &mut missing),
            FormStep::DeliveryAddress => address_gaps("delivery", a.delivery.as_ref(), &mut missing),
            FormStep::PropertyDetails => {
                if a.property_type.is_none() {
                    missing.push("property_type".into());
                }
                if a.move_date.is_none() {
                    missing.push("move_date".into());
                }
            }
            FormStep::Packing => {
                if a.packing.is_none() {
                    missing.push("packing".into());
                }
            }
            FormStep::Dismantling => {
                if a.dismantling.is_none() {
                    missing.push("dismantling".into());
                }
            }
            FormStep::Survey => {
                if a.survey_method.is_none() {
                    missing.push("survey_method".into());
                }
                if a.attach_media_now == Some(true) && self.media.is_empty() {
                    missing.push("media".into());
                }
            }
            FormStep::ContactDetails => {
                if blank(&a.full_name) {
                    missing.push("full_name".into());
                }
                if blank(&a.email) {
                    missing.push("email".into());
                }
                if blank(&a.phone) {
                    missing.push("phone".into());
                }
            }
            FormStep::Review => {}
        }
        missing
    }

    fn check_step(&self, step: FormStep) -> Result<(), FormError> {
        let fields = self.missing_fields(step);
        if !fields.is_empty() {
            return Err(FormError::MissingFields { step, fields });
        }
        if step == FormStep::ContactDetails {
            self.contact()?;
        }
        Ok(())
    }

    fn contact(&self) -> Result<ContactDetails, FormError> {
        let a = &self.answers;
        let contact = ContactDetails {
            full_name: a.full_name.clone().unwrap_or_default().trim().to_string(),
            email: a.email.clone().unwrap_or_default().trim().to_lowercase(),
            phone: a.phone.clone().unwrap_or_default().trim().to_string(),
        };
        contact.validate().map_err(|e| FormError::InvalidField {
            field: "contact".to_string(),
            reason: e.to_string(),
        })?;
        Ok(contact)
    }

    /// Re-check every step and freeze the record for writing.
    pub fn prepare_submission(&self) -> Result<QuoteSubmission, FormError> {
        if self.step() != FormStep::Review {
            return Err(FormError::NotAtReview(self.step()));
        }
        for step in FormStep::ALL {
            self.check_step(step)?;
        }

        let a = &self.answers;
        // check_step guarantees every unwrap_or_default below sees a value
        let submission = QuoteSubmission {
            service_type: a.service_type.unwrap_or(ServiceType::HomeRemoval),
            pickup: a.pickup.clone().unwrap_or_default(),
            delivery: a.delivery.clone().unwrap_or_default(),
            property: PropertyDetails {
                property_type: a.property_type.unwrap_or(PropertyType::Other),
                bedrooms: a.bedrooms,
                move_date: a.move_date.unwrap_or_default(),
                flexible_dates: a.flexible_dates.unwrap_or(false),
            },
            packing: a.packing.unwrap_or(PackingOption::SelfPack),
            dismantling: a.dismantling.unwrap_or(DismantlingOption::NotNeeded),
            survey_method: a.survey_method.unwrap_or(SurveyMethod::NoSurvey),
            contact: self.contact()?,
            notes: a.notes.clone().filter(|n| !n.trim().is_empty()),
            media: self.media.clone(),
        };
        Ok(submission)
    }
}

fn address_gaps(prefix: &str, address: Option<&Address>, missing: &mut Vec<String>) {
    match address {
        None => missing.push(prefix.to_string()),
        Some(addr) => missing.extend(addr.missing_parts().into_iter().map(|p| format!("{}.{}", prefix, p))),
    }
}

/// A complete, checked set of answers plus the media still to upload.
#[derive(Debug, Clone)]
pub struct QuoteSubmission {
    pub service_type: ServiceType,
    pub pickup: Address,
    pub delivery: Address,
    pub property: PropertyDetails,
    pub packing: PackingOption,
    pub dismantling: DismantlingOption,
    pub survey_method: SurveyMethod,
    pub contact: ContactDetails,
    pub notes: Option<String>,
    pub media: Vec<MediaAttachment>,
}

impl QuoteSubmission {
    /// The document to write. Media bytes stay out; only their storage references go in.
    pub fn into_request(self, id: ObjectId, media: Vec<MediaRef>) -> QuoteRequest {
        QuoteRequest {
            id,
            service_type: self.service_type,
            pickup: self.pickup,
            delivery: self.delivery,
            property: self.property,
            packing: self.packing,
            dismantling: self.dismantling,
            survey_method: self.survey_method,
            contact: self.contact,
            notes: self.notes,
            media,
            created_at: crate::model::now_timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(line1: &str) -> Address {
        Address {
            line1: line1.to_string(),
            city: "Leeds".to_string(),
            postcode: "LS1 4AP".to_string(),
            country: "UK".to_string(),
            ..Address::default()
        }
    }

    fn complete_answers() -> QuoteAnswers {
        QuoteAnswers {
            service_type: Some(ServiceType::HomeRemoval),
            pickup: Some(address("1 Park Row")),
            delivery: Some(address("9 Canal Wharf")),
            property_type: Some(PropertyType::Flat),
            bedrooms: Some(2),
            move_date: NaiveDate::from_ymd_opt(2026, 11, 20),
            flexible_dates: Some(true),
            packing: Some(PackingOption::FragileOnly),
            dismantling: Some(DismantlingOption::DismantleAndReassemble),
            survey_method: Some(SurveyMethod::VideoCall),
            attach_media_now: Some(false),
            full_name: Some("Ada Byron".to_string()),
            email: Some("ada@example.com".to_string()),
            phone: Some("07700900123".to_string()),
            notes: Some("Piano on second floor".to_string()),
        }
    }

    fn photo(name: &str) -> MediaAttachment {
        MediaAttachment::new(name, "image/jpeg", Bytes::from(name.as_bytes().to_vec()), false)
    }

    #[test]
    fn test_next_blocked_until_step_fields_present() {
        let mut wizard = QuoteWizard::new();
        let err = wizard.next().unwrap_err();
        assert_eq!(
            err,
            FormError::MissingFields { step: FormStep::ServiceType, fields: vec!["service_type".into()] }
        );
        assert_eq!(wizard.step(), FormStep::ServiceType);

        wizard.apply(QuoteAnswers { service_type: Some(ServiceType::ManAndVan), ..Default::default() });
        assert_eq!(wizard.next().unwrap(), FormStep::PickupAddress);
    }

    #[test]
    fn test_back_only_changes_index() {
        let mut wizard = QuoteWizard::new();
        wizard.apply(complete_answers());
        wizard.next().unwrap();
        wizard.next().unwrap();
        let before = wizard.answers().clone();
        assert_eq!(wizard.back().unwrap(), FormStep::PickupAddress);
        assert_eq!(wizard.answers(), &before);
        wizard.back().unwrap();
        assert_eq!(wizard.back().unwrap_err(), FormError::AtFirstStep);
    }

    #[test]
    fn test_merge_keeps_earlier_answers() {
        let mut wizard = QuoteWizard::new();
        wizard.apply(QuoteAnswers { packing: Some(PackingOption::SelfPack), ..Default::default() });
        wizard.apply(QuoteAnswers { notes: Some("lift is small".into()), ..Default::default() });
        assert_eq!(wizard.answers().packing, Some(PackingOption::SelfPack));
        assert_eq!(wizard.answers().notes.as_deref(), Some("lift is small"));
    }

    #[test]
    fn test_address_gaps_are_named() {
        let mut wizard = QuoteWizard::new();
        wizard.apply(QuoteAnswers {
            pickup: Some(Address { line1: "1 Park Row".into(), ..Address::default() }),
            ..Default::default()
        });
        assert_eq!(wizard.missing_fields(FormStep::PickupAddress), vec!["pickup.city", "pickup.postcode"]);
        assert_eq!(wizard.missing_fields(FormStep::DeliveryAddress), vec!["delivery"]);
    }

    #[test]
    fn test_attach_now_requires_media() {
        let mut wizard = QuoteWizard::new();
        wizard.apply(QuoteAnswers {
            survey_method: Some(SurveyMethod::SubmittedMedia),
            attach_media_now: Some(true),
            ..Default::default()
        });
        assert_eq!(wizard.missing_fields(FormStep::Survey), vec!["media"]);
        wizard.attach_media(vec![photo("lounge.jpg")]).unwrap();
        assert!(wizard.missing_fields(FormStep::Survey).is_empty());
    }

    #[test]
    fn test_remove_media_keeps_relative_order() {
        for n in 1..6 {
            for k in 0..n {
                let mut wizard = QuoteWizard::new();
                let names: Vec<String> = (0..n).map(|i| format!("f{}.jpg", i)).collect();
                wizard.attach_media(names.iter().map(|n| photo(n)).collect()).unwrap();

                let removed = wizard.remove_media(k).unwrap();
                assert_eq!(removed.filename, names[k]);

                let mut expected = names.clone();
                expected.remove(k);
                let left: Vec<String> = wizard.media().iter().map(|m| m.filename.clone()).collect();
                assert_eq!(left, expected);
            }
        }
    }

    #[test]
    fn test_remove_media_out_of_range() {
        let mut wizard = QuoteWizard::new();
        wizard.attach_media(vec![photo("a.jpg")]).unwrap();
        assert_eq!(wizard.remove_media(1).unwrap_err(), FormError::MediaIndexOutOfRange { index: 1, len: 1 });
    }

    #[test]
    fn test_attach_rejects_documents_atomically() {
        let mut wizard = QuoteWizard::new();
        let pdf = MediaAttachment::new("plan.pdf", "application/pdf", Bytes::from_static(b"%PDF"), false);
        let err = wizard.attach_media(vec![photo("ok.jpg"), pdf]).unwrap_err();
        assert_eq!(err, FormError::UnsupportedMedia("application/pdf".into()));
        assert!(wizard.media().is_empty());

        let clip = MediaAttachment::new("hall.mp4", "video/mp4", Bytes::from_static(b"...."), true);
        assert_eq!(wizard.attach_media(vec![clip]).unwrap(), 1);
    }

    #[test]
    fn test_invalid_email_blocks_contact_step() {
        let mut wizard = QuoteWizard::new();
        let mut answers = complete_answers();
        answers.email = Some("not-an-email".into());
        wizard.apply(answers);
        for _ in 0..7 {
            wizard.next().unwrap();
        }
        assert_eq!(wizard.step(), FormStep::ContactDetails);
        assert!(matches!(wizard.next(), Err(FormError::InvalidField { .. })));
    }

    #[test]
    fn test_submission_requires_review_step() {
        let mut wizard = QuoteWizard::new();
        wizard.apply(complete_answers());
        assert_eq!(wizard.prepare_submission().unwrap_err(), FormError::NotAtReview(FormStep::ServiceType));

        while wizard.step() != FormStep::Review {
            wizard.next().unwrap();
        }
        assert_eq!(wizard.next().unwrap_err(), FormError::AtLastStep);

        let submission = wizard.prepare_submission().unwrap();
        let id = ObjectId::new();
        let request = submission.into_request(id, vec![]);
        assert_eq!(request.id, id);
        assert_eq!(request.contact.full_name, "Ada Byron");
        assert_eq!(request.pickup.line1, "1 Park Row");
        assert_eq!(request.delivery.line1, "9 Canal Wharf");
        assert_eq!(request.property.bedrooms, Some(2));
        assert_eq!(request.dismantling, DismantlingOption::DismantleAndReassemble);
        assert_eq!(request.notes.as_deref(), Some("Piano on second floor"));
    }
}
