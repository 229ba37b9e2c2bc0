use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marketplace role. Decides the dashboard a user lands on and what they may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Company,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Company => "company",
            Role::Customer => "customer",
        }
    }

    /// Reads a stored role field. Missing or unknown values count as customer.
    pub fn from_stored(raw: Option<&str>) -> Role {
        raw.and_then(|r| r.parse().ok()).unwrap_or(Role::Customer)
    }

    pub fn dashboard_route(&self) -> &'static str {
        match self {
            Role::Admin => "/admin/dashboard",
            Role::Company => "/company/dashboard",
            Role::Customer => "/customer/dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "company" => Ok(Role::Company),
            "customer" => Ok(Role::Customer),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Final role from the three inputs that decide it.
///
/// The allow-list wins over everything, a companies document wins over the
/// stored field, and the stored field (default customer) is used otherwise.
pub fn resolve_role(allow_listed: bool, has_company: bool, stored: Option<&str>) -> Role {
    if allow_listed {
        Role::Admin
    } else if has_company {
        Role::Company
    } else {
        Role::from_stored(stored)
    }
}
