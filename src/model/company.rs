use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A moving company, keyed by the account id of its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub verified: bool,
    pub created_at: String,
}
