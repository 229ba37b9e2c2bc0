use bson::oid::ObjectId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    HomeRemoval,
    OfficeRemoval,
    ManAndVan,
    StorageMove,
    International,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    House,
    Flat,
    Bungalow,
    Office,
    StorageUnit,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackingOption {
    FullPacking,
    FragileOnly,
    SelfPack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DismantlingOption {
    NotNeeded,
    DismantleOnly,
    DismantleAndReassemble,
}

/// How the company estimates the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyMethod {
    VideoCall,
    InPerson,
    SubmittedMedia,
    NoSurvey,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub postcode: String,
    pub country: String,
    pub floor: Option<i32>,
    pub has_lift: Option<bool>,
}

impl Address {
    /// Names of the mandatory parts that are blank.
    pub fn missing_parts(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.line1.trim().is_empty() {
            missing.push("line1");
        }
        if self.city.trim().is_empty() {
            missing.push("city");
        }
        if self.postcode.trim().is_empty() {
            missing.push("postcode");
        }
        missing
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDetails {
    pub property_type: PropertyType,
    pub bedrooms: Option<u8>,
    pub move_date: NaiveDate,
    pub flexible_dates: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ContactDetails {
    #[validate(length(min = 2, max = 100))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 20))]
    pub phone: String,
}

/// Reference to a survey file held in object storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRef {
    pub object_key: String,
    pub original_filename: String,
    pub content_type: String,
    pub size: u64,
    /// Taken with the live camera rather than picked from disk
    pub captured: bool,
}

/// Submitted quote request. Written once, never updated by this service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub service_type: ServiceType,
    pub pickup: Address,
    pub delivery: Address,
    pub property: PropertyDetails,
    pub packing: PackingOption,
    pub dismantling: DismantlingOption,
    pub survey_method: SurveyMethod,
    pub contact: ContactDetails,
    pub notes: Option<String>,
    pub media: Vec<MediaRef>,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_missing_parts() {
        let address = Address { line1: "1 High St".into(), city: " ".into(), ..Address::default() };
        assert_eq!(address.missing_parts(), vec!["city", "postcode"]);
    }

    #[test]
    fn test_enums_use_snake_case() {
        let json = serde_json::to_string(&DismantlingOption::DismantleAndReassemble).unwrap();
        assert_eq!(json, "\"dismantle_and_reassemble\"");
        let parsed: SurveyMethod = serde_json::from_str("\"submitted_media\"").unwrap();
        assert_eq!(parsed, SurveyMethod::SubmittedMedia);
    }
}
