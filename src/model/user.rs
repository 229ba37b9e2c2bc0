use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::model::role::Role;

/// Credentials record owned by the sign-in layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Always stored lower-cased
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub created_at: String,
}

/// Per-account document in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Same value as the account id
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub email: String,
    pub display_name: Option<String>,
    /// Kept as the raw stored string, see [`UserProfile::role`]
    pub role: Option<String>,
    pub created_at: String,
}

impl UserProfile {
    pub fn new(id: ObjectId, email: &str, display_name: Option<String>, role: Role) -> Self {
        UserProfile {
            id,
            email: email.to_string(),
            display_name,
            role: Some(role.as_str().to_string()),
            created_at: super::now_timestamp(),
        }
    }

    pub fn role(&self) -> Role {
        Role::from_stored(self.role.as_deref())
    }
}

/// Account as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub created_at: String,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        AccountView {
            id: account.id.to_hex(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            created_at: account.created_at.clone(),
        }
    }
}
