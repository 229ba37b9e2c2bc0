use std::sync::Arc;
use tracing::{info, instrument};

use crate::dto::admin_dto::{PaymentsView, StatusFilter};
use crate::model::payment::Payment;
use crate::repository::PaymentRepository;
use crate::util::error::ServiceError;

pub const CSV_HEADER: &str = "id,company_id,request_id,amount,method,status,created_at";

/// Payments loaded in one read, newest first. Filtering and export both work
/// on this list without going back to the database.
#[derive(Debug, Clone)]
pub struct PaymentLedger {
    payments: Vec<Payment>,
}

impl PaymentLedger {
    pub fn new(payments: Vec<Payment>) -> Self {
        PaymentLedger { payments }
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }

    pub fn filter(&self, filter: StatusFilter) -> Vec<Payment> {
        self.payments.iter().filter(|p| filter.matches(p.status)).cloned().collect()
    }

    /// One line per loaded payment, whatever filter the listing shows.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from(CSV_HEADER);
        csv.push('\n');
        for p in &self.payments {
            csv += &p.id.to_hex();
            csv.push(',');
            csv += &p.company_id.to_hex();
            csv.push(',');
            csv += &p.request_id.to_hex();
            csv.push(',');
            csv += &format!("{:.2}", p.amount);
            csv.push(',');
            csv += &csv_field(&p.method);
            csv.push(',');
            csv += p.status.as_str();
            csv.push(',');
            csv += &csv_field(&p.created_at);
            csv.push('\n');
        }
        csv
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub struct PaymentServiceImpl {
    pub payment_repo: Arc<dyn PaymentRepository>,
}

impl PaymentServiceImpl {
    pub fn new(payment_repo: Arc<dyn PaymentRepository>) -> Self {
        Self { payment_repo }
    }

    pub async fn load_ledger(&self) -> Result<PaymentLedger, ServiceError> {
        Ok(PaymentLedger::new(self.payment_repo.list_all().await?))
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: StatusFilter) -> Result<PaymentsView, ServiceError> {
        let ledger = self.load_ledger().await?;
        let payments = ledger.filter(filter);
        info!(total = ledger.len(), shown = payments.len(), "Payments listed");
        Ok(PaymentsView { filter: filter.as_str().to_string(), total: ledger.len(), payments })
    }

    #[instrument(skip(self))]
    pub async fn export_csv(&self) -> Result<String, ServiceError> {
        let ledger = self.load_ledger().await?;
        info!(rows = ledger.len(), "Exporting payments");
        Ok(ledger.to_csv())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::payment::PaymentStatus;
    use bson::oid::ObjectId;

    fn payment(status: PaymentStatus, method: &str, created_at: &str) -> Payment {
        Payment {
            id: ObjectId::new(),
            company_id: ObjectId::new(),
            request_id: ObjectId::new(),
            amount: 49.5,
            method: method.to_string(),
            status,
            created_at: created_at.to_string(),
        }
    }

    fn ledger() -> PaymentLedger {
        PaymentLedger::new(vec![
            payment(PaymentStatus::Paid, "card", "2026-10-03T10:00:00.000Z"),
            payment(PaymentStatus::Pending, "bank transfer", "2026-10-02T10:00:00.000Z"),
            payment(PaymentStatus::Failed, "card", "2026-10-01T10:00:00.000Z"),
            payment(PaymentStatus::Paid, "card", "2026-09-30T10:00:00.000Z"),
        ])
    }

    #[test]
    fn test_filter_by_status() {
        let ledger = ledger();
        assert_eq!(ledger.filter(StatusFilter::All).len(), 4);
        assert_eq!(ledger.filter(StatusFilter::Paid).len(), 2);
        assert_eq!(ledger.filter(StatusFilter::Pending).len(), 1);
        assert!(ledger.filter(StatusFilter::Failed).iter().all(|p| p.status == PaymentStatus::Failed));
    }

    #[test]
    fn test_filter_keeps_newest_first_order() {
        let paid = ledger().filter(StatusFilter::Paid);
        assert!(paid[0].created_at > paid[1].created_at);
    }

    #[test]
    fn test_csv_has_one_row_per_loaded_payment() {
        let ledger = ledger();
        let csv = ledger.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines.len() - 1, ledger.len());
        assert!(lines[1].contains(",49.50,card,paid,"));
    }

    #[test]
    fn test_csv_quotes_fields_with_commas() {
        let ledger = PaymentLedger::new(vec![payment(PaymentStatus::Paid, "card, \"visa\"", "2026-10-03T10:00:00.000Z")]);
        assert!(ledger.to_csv().contains(",\"card, \"\"visa\"\"\",paid,"));
    }

    #[test]
    fn test_unknown_status_filter_means_all() {
        assert_eq!(StatusFilter::parse(Some("PAID")), StatusFilter::Paid);
        assert_eq!(StatusFilter::parse(Some("refunded")), StatusFilter::All);
        assert_eq!(StatusFilter::parse(None), StatusFilter::All);
    }
}
