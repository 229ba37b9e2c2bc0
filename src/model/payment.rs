use bson::{oid::ObjectId, Bson};
use chrono::{SecondsFormat, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Pending,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Failed => "failed",
        }
    }
}

/// Produced by the billing process; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub company_id: ObjectId,
    pub request_id: ObjectId,
    pub amount: f64,
    pub method: String,
    pub status: PaymentStatus,
    /// Written by billing either as an RFC 3339 string or as a BSON date
    #[serde(deserialize_with = "timestamp_text")]
    pub created_at: String,
}

/// Accept a string or a BSON date and keep the fixed-width RFC 3339 text the
/// rest of the service sorts and prints.
fn timestamp_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Bson::deserialize(deserializer)? {
        Bson::String(text) => Ok(text),
        Bson::DateTime(date) => Utc
            .timestamp_millis_opt(date.timestamp_millis())
            .single()
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
            .ok_or_else(|| de::Error::custom(format!("created_at out of range: {}", date))),
        other => Err(de::Error::custom(format!("created_at must be a string or date, got {:?}", other.element_type()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn document(created_at: Bson) -> bson::Document {
        doc! {
            "_id": ObjectId::new(),
            "company_id": ObjectId::new(),
            "request_id": ObjectId::new(),
            "amount": 99.0,
            "method": "card",
            "status": "paid",
            "created_at": created_at,
        }
    }

    #[test]
    fn test_created_at_accepts_bson_date() {
        let date = bson::DateTime::from_millis(1_790_847_000_000);
        let payment: Payment = bson::from_document(document(Bson::DateTime(date))).unwrap();
        assert_eq!(payment.created_at, "2026-10-01T09:30:00.000Z");
    }

    #[test]
    fn test_created_at_accepts_text() {
        let payment: Payment = bson::from_document(document(Bson::String("2026-10-02T08:00:00.000Z".into()))).unwrap();
        assert_eq!(payment.created_at, "2026-10-02T08:00:00.000Z");
    }

    #[test]
    fn test_created_at_rejects_numbers() {
        assert!(bson::from_document::<Payment>(document(Bson::Int32(5))).is_err());
    }
}
