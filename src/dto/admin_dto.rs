use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::activity::ActivityEntry;
use crate::model::company::Company;
use crate::model::payment::{Payment, PaymentStatus};
use crate::model::quote_request::{MediaRef, QuoteRequest};
use crate::model::user::UserProfile;

#[derive(Debug, Deserialize, Validate)]
pub struct NewCompanyRequest {
    /// Account id (hex) of the company owner
    #[validate(length(equal = 24))]
    pub account_id: String,
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 20))]
    pub phone: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

/// `?status=` on the payments listing. Anything unrecognised means all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Paid,
    Pending,
    Failed,
}

impl StatusFilter {
    pub fn parse(raw: Option<&str>) -> StatusFilter {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("paid") => StatusFilter::Paid,
            Some("pending") => StatusFilter::Pending,
            Some("failed") => StatusFilter::Failed,
            _ => StatusFilter::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Paid => "paid",
            StatusFilter::Pending => "pending",
            StatusFilter::Failed => "failed",
        }
    }

    pub fn matches(&self, status: PaymentStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Paid => status == PaymentStatus::Paid,
            StatusFilter::Pending => status == PaymentStatus::Pending,
            StatusFilter::Failed => status == PaymentStatus::Failed,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PaymentsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentsView {
    pub filter: String,
    /// Payments loaded before filtering
    pub total: usize,
    pub payments: Vec<Payment>,
}

#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub requests: u64,
    pub companies: u64,
    pub profiles: u64,
    pub payments: u64,
}

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub stats: AdminStats,
    pub recent_activity: Vec<ActivityEntry>,
}

#[derive(Debug, Serialize)]
pub struct CompanyDashboard {
    pub company: Company,
    pub recent_requests: Vec<QuoteRequest>,
}

#[derive(Debug, Serialize)]
pub struct CustomerDashboard {
    pub profile: Option<UserProfile>,
    pub requests: Vec<QuoteRequest>,
}

#[derive(Debug, Serialize)]
pub struct MediaLink {
    #[serde(flatten)]
    pub media: MediaRef,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: QuoteRequest,
    pub media_links: Vec<MediaLink>,
}
