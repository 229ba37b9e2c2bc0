use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    SignIn,
    ProfileCreated,
    RoleCorrected,
    RequestSubmitted,
    CompanyRegistered,
}

/// Audit log line in the `activity` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub message: String,
    pub actor: Option<String>,
    pub target_id: Option<String>,
    pub timestamp: String,
}

impl ActivityEntry {
    pub fn new(kind: ActivityKind, message: impl Into<String>) -> Self {
        ActivityEntry {
            id: None,
            kind,
            message: message.into(),
            actor: None,
            target_id: None,
            timestamp: super::now_timestamp(),
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_target(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }
}
