//! Fee Ledger Port
//!
//! The read-only interface through which the fees domain obtains learners and
//! fee records. Implemented by:
//!
//! - **PostgreSQL adapter**: `infra_db::PostgresFeeLedger`
//! - **In-memory adapter**: [`mock::InMemoryFeeLedger`] for tests
//!
//! ```rust,ignore
//! use domain_fees::{FeeLedgerPort, RosterService};
//! use std::sync::Arc;
//!
//! let ledger: Arc<dyn FeeLedgerPort> = Arc::new(PostgresFeeLedger::new(pool));
//! let service = RosterService::new(ledger, settings);
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, GradeId, HealthCheckable, InvoiceId, LearnerId, PortError};

use crate::academic::FeeScope;
use crate::fee_structure::FeeStructure;
use crate::invoice::StudentInvoice;
use crate::learner::Learner;
use crate::payment::FeePayment;
use crate::records::FeeRecords;
use crate::roster::RosterQuery;
use crate::transaction::FeeTransaction;

/// Port for reading learners and fee records
///
/// All methods are read-only. Lookups scoped by grade and term return every
/// row the backing store holds for that scope; narrowing to the rows that
/// count toward a balance is the calculator's job.
#[async_trait]
pub trait FeeLedgerPort: DomainPort + HealthCheckable {
    /// Lists learners in the query's grade (and stream, if set) whose status
    /// is one of the query's statuses
    async fn list_learners(&self, query: &RosterQuery) -> Result<Vec<Learner>, PortError>;

    /// Retrieves a learner by id, or `PortError::NotFound`
    async fn get_learner(&self, id: LearnerId) -> Result<Learner, PortError>;

    /// Fee structures configured for the grade in the scope
    async fn find_fee_structures(
        &self,
        grade_id: GradeId,
        scope: &FeeScope,
    ) -> Result<Vec<FeeStructure>, PortError>;

    /// Direct payments by the learner against the grade's structures in the scope
    async fn find_fee_payments(
        &self,
        learner_id: LearnerId,
        grade_id: GradeId,
        scope: &FeeScope,
    ) -> Result<Vec<FeePayment>, PortError>;

    /// Invoices issued to the learner under the grade in the scope
    async fn find_invoices(
        &self,
        learner_id: LearnerId,
        grade_id: GradeId,
        scope: &FeeScope,
    ) -> Result<Vec<StudentInvoice>, PortError>;

    /// Transactions recorded against any of the given invoices
    async fn find_transactions(
        &self,
        invoice_ids: &[InvoiceId],
    ) -> Result<Vec<FeeTransaction>, PortError>;

    /// Fetches everything the calculator needs for one learner and scope
    ///
    /// Structures, payments and invoices are requested concurrently;
    /// transactions follow once the invoice ids are known. A learner without
    /// a grade gets empty records and no query is issued.
    async fn fetch_fee_records(
        &self,
        learner: &Learner,
        scope: &FeeScope,
    ) -> Result<FeeRecords, PortError> {
        let Some(grade_id) = learner.current_grade_id else {
            return Ok(FeeRecords::default());
        };

        let (structures, payments, invoices) = futures::try_join!(
            self.find_fee_structures(grade_id, scope),
            self.find_fee_payments(learner.id, grade_id, scope),
            self.find_invoices(learner.id, grade_id, scope),
        )?;

        let invoice_ids: Vec<InvoiceId> = invoices
            .iter()
            .filter(|i| !i.is_cancelled())
            .map(|i| i.id)
            .collect();
        let transactions = if invoice_ids.is_empty() {
            Vec::new()
        } else {
            self.find_transactions(&invoice_ids).await?
        };

        Ok(FeeRecords {
            structures,
            payments,
            transactions,
            invoices,
        })
    }
}

/// In-memory implementation of FeeLedgerPort for testing
///
/// Supports injected failures per learner, artificial latency and tracking
/// of how many payment lookups ran at once.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use chrono::Utc;
    use core_kernel::{AdapterHealth, FeeStructureId, HealthCheckResult};

    #[derive(Debug, Default)]
    struct LedgerState {
        learners: Vec<Learner>,
        records: FeeRecords,
    }

    /// In-memory fee ledger
    #[derive(Debug, Default)]
    pub struct InMemoryFeeLedger {
        state: LedgerState,
        failing: HashSet<LearnerId>,
        fail_listing: bool,
        latency: Option<Duration>,
        health: Option<AdapterHealth>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
    }

    impl InMemoryFeeLedger {
        /// Creates a ledger pre-populated with learners and records
        pub fn new(learners: Vec<Learner>, records: FeeRecords) -> Self {
            Self {
                state: LedgerState { learners, records },
                ..Default::default()
            }
        }

        /// Makes every payment lookup for the learner fail with a connection error
        pub fn fail_for(mut self, learner_id: LearnerId) -> Self {
            self.failing.insert(learner_id);
            self
        }

        /// Makes learner listing fail as if the store were down
        pub fn fail_listing(mut self) -> Self {
            self.fail_listing = true;
            self
        }

        /// Delays every payment lookup
        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = Some(latency);
            self
        }

        /// Overrides the reported health status
        pub fn with_health(mut self, health: AdapterHealth) -> Self {
            self.health = Some(health);
            self
        }

        /// Highest number of payment lookups observed running at once
        pub fn peak_in_flight(&self) -> usize {
            self.peak_in_flight.load(Ordering::SeqCst)
        }

        /// Payment lookups currently running
        pub fn in_flight(&self) -> usize {
            self.in_flight.load(Ordering::SeqCst)
        }
    }

    /// Counts a payment lookup as running until dropped, including on cancellation
    struct InFlightGuard<'a>(&'a AtomicUsize);

    impl<'a> InFlightGuard<'a> {
        fn enter(counter: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
            let current = counter.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(current, Ordering::SeqCst);
            Self(counter)
        }
    }

    impl Drop for InFlightGuard<'_> {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl DomainPort for InMemoryFeeLedger {}

    #[async_trait]
    impl HealthCheckable for InMemoryFeeLedger {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "in-memory-fee-ledger".to_string(),
                status: self.health.unwrap_or(AdapterHealth::Healthy),
                latency_ms: 0,
                message: None,
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl FeeLedgerPort for InMemoryFeeLedger {
        async fn list_learners(&self, query: &RosterQuery) -> Result<Vec<Learner>, PortError> {
            if self.fail_listing {
                return Err(PortError::ServiceUnavailable {
                    service: "in-memory-fee-ledger".to_string(),
                });
            }
            let state = &self.state;
            Ok(state
                .learners
                .iter()
                .filter(|l| query.includes(l))
                .cloned()
                .collect())
        }

        async fn get_learner(&self, id: LearnerId) -> Result<Learner, PortError> {
            self.state
                .learners
                .iter()
                .find(|l| l.id == id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Learner", id))
        }

        async fn find_fee_structures(
            &self,
            grade_id: GradeId,
            scope: &FeeScope,
        ) -> Result<Vec<FeeStructure>, PortError> {
            let state = &self.state;
            Ok(state
                .records
                .structures
                .iter()
                .filter(|s| s.matches(grade_id, scope))
                .cloned()
                .collect())
        }

        async fn find_fee_payments(
            &self,
            learner_id: LearnerId,
            grade_id: GradeId,
            scope: &FeeScope,
        ) -> Result<Vec<FeePayment>, PortError> {
            let _guard = InFlightGuard::enter(&self.in_flight, &self.peak_in_flight);

            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }

            if self.failing.contains(&learner_id) {
                Err(PortError::connection(format!("injected failure for {}", learner_id)))
            } else {
                let state = &self.state;
                let structure_ids: HashSet<FeeStructureId> = state
                    .records
                    .structures
                    .iter()
                    .filter(|s| s.matches(grade_id, scope))
                    .map(|s| s.id)
                    .collect();
                Ok(state
                    .records
                    .payments
                    .iter()
                    .filter(|p| p.learner_id == learner_id && structure_ids.contains(&p.fee_structure_id))
                    .cloned()
                    .collect())
            }
        }

        async fn find_invoices(
            &self,
            learner_id: LearnerId,
            grade_id: GradeId,
            scope: &FeeScope,
        ) -> Result<Vec<StudentInvoice>, PortError> {
            let state = &self.state;
            Ok(state
                .records
                .invoices
                .iter()
                .filter(|i| {
                    i.learner_id == learner_id
                        && i.grade_id == grade_id
                        && scope.contains(&i.academic_year, i.term)
                })
                .cloned()
                .collect())
        }

        async fn find_transactions(
            &self,
            invoice_ids: &[InvoiceId],
        ) -> Result<Vec<FeeTransaction>, PortError> {
            let state = &self.state;
            Ok(state
                .records
                .transactions
                .iter()
                .filter(|t| invoice_ids.contains(&t.invoice_id))
                .cloned()
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::InMemoryFeeLedger;
    use super::*;
    use crate::invoice::InvoiceStatus;
    use crate::payment::PaymentMethod;
    use core_kernel::AdapterHealth;
    use rust_decimal_macros::dec;

    fn scope() -> FeeScope {
        FeeScope::parse("2024", "term_2").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_records_for_ungraded_learner_is_empty() {
        let learner = Learner::new("ADM-1", "Baraka Mwangi");
        let ledger = InMemoryFeeLedger::new(vec![learner.clone()], FeeRecords::new());

        let records = ledger.fetch_fee_records(&learner, &scope()).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_records_skips_cancelled_invoice_transactions() {
        let grade = GradeId::new();
        let learner = Learner::new("ADM-2", "Zawadi Achieng").with_grade(grade);
        let live = StudentInvoice::new(learner.id, grade, &scope());
        let voided = StudentInvoice::new(learner.id, grade, &scope()).with_status(InvoiceStatus::Cancelled);
        let records = FeeRecords::new()
            .with_transaction(FeeTransaction::new(live.id, dec!(400), PaymentMethod::MobileMoney))
            .with_transaction(FeeTransaction::new(voided.id, dec!(900), PaymentMethod::MobileMoney))
            .with_invoice(live)
            .with_invoice(voided);
        let ledger = InMemoryFeeLedger::new(vec![learner.clone()], records);

        let fetched = ledger.fetch_fee_records(&learner, &scope()).await.unwrap();
        assert_eq!(fetched.invoices.len(), 2);
        assert_eq!(fetched.transactions.len(), 1);
        assert_eq!(fetched.transactions[0].amount_paid, dec!(400));
    }

    #[tokio::test]
    async fn test_injected_failure_propagates() {
        let learner = Learner::new("ADM-3", "Imani Njeri").with_grade(GradeId::new());
        let ledger = InMemoryFeeLedger::new(vec![learner.clone()], FeeRecords::new()).fail_for(learner.id);

        let err = ledger.fetch_fee_records(&learner, &scope()).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_get_learner_not_found() {
        let ledger = InMemoryFeeLedger::default();
        let err = ledger.get_learner(core_kernel::LearnerId::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_cancelled_lookup_leaves_no_lookup_in_flight() {
        let learner = Learner::new("ADM-4", "Neema Wanjiku").with_grade(GradeId::new());
        let ledger = InMemoryFeeLedger::new(vec![learner.clone()], FeeRecords::new())
            .with_latency(std::time::Duration::from_millis(200));
        let grade = learner.current_grade_id.unwrap();

        for _ in 0..3 {
            let lookup_scope = scope();
            let lookup = ledger.find_fee_payments(learner.id, grade, &lookup_scope);
            let outcome = tokio::time::timeout(std::time::Duration::from_millis(5), lookup).await;
            assert!(outcome.is_err());
            assert_eq!(ledger.in_flight(), 0);
        }
        assert_eq!(ledger.peak_in_flight(), 1);
    }

    #[tokio::test]
    async fn test_health_override() {
        let ledger = InMemoryFeeLedger::default().with_health(AdapterHealth::Unhealthy);
        assert!(!ledger.health_check().await.is_healthy());
    }
}
