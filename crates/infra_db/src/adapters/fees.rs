//! PostgreSQL Fee Ledger Adapter
//!
//! Implements `FeeLedgerPort` over the `FeeRepository`. Rows are mapped to
//! domain types here; a stored enum value the domain does not recognise is
//! reported as `PortError::Transformation` rather than being defaulted.
//!
//! ```rust,ignore
//! use infra_db::PostgresFeeLedger;
//! use domain_fees::FeeLedgerPort;
//! use std::sync::Arc;
//!
//! let ledger: Arc<dyn FeeLedgerPort> = Arc::new(PostgresFeeLedger::new(pool));
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{
    AdapterHealth, DomainPort, GradeId, HealthCheckResult, HealthCheckable, InvoiceId, LearnerId,
    PortError,
};
use domain_fees::{
    AcademicYear, FeeLedgerPort, FeePayment, FeeScope, FeeStructure, FeeTransaction, InvoiceStatus,
    Learner, LearnerStatus, PaymentMethod, RosterQuery, StudentInvoice, Term,
};

use crate::repositories::fees::{
    FeePaymentRow, FeeRepository, FeeStructureRow, FeeTransactionRow, LearnerRow, StudentInvoiceRow,
};

const ADAPTER_ID: &str = "postgres-fee-ledger";

/// PostgreSQL-backed implementation of the FeeLedgerPort trait
#[derive(Debug, Clone)]
pub struct PostgresFeeLedger {
    repository: FeeRepository,
    pool: PgPool,
}

impl PostgresFeeLedger {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: FeeRepository::new(pool.clone()),
            pool,
        }
    }

    /// The underlying repository, for writes the port does not expose
    pub fn repository(&self) -> &FeeRepository {
        &self.repository
    }
}

impl DomainPort for PostgresFeeLedger {}

#[async_trait]
impl HealthCheckable for PostgresFeeLedger {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
        };

        HealthCheckResult {
            adapter_id: ADAPTER_ID.to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl FeeLedgerPort for PostgresFeeLedger {
    #[instrument(skip(self, query), fields(grade_id = %query.grade_id))]
    async fn list_learners(&self, query: &RosterQuery) -> Result<Vec<Learner>, PortError> {
        let statuses: Vec<String> = query.statuses.iter().map(|s| s.as_str().to_string()).collect();
        let rows = self
            .repository
            .list_learners(
                Uuid::from(query.grade_id),
                query.stream_id.map(Uuid::from),
                &statuses,
            )
            .await?;
        debug!(count = rows.len(), "Listed learners");
        rows.into_iter().map(row_to_learner).collect()
    }

    #[instrument(skip(self), fields(learner_id = %id))]
    async fn get_learner(&self, id: LearnerId) -> Result<Learner, PortError> {
        let row = self.repository.get_learner(id.into()).await?;
        row_to_learner(row)
    }

    async fn find_fee_structures(
        &self,
        grade_id: GradeId,
        scope: &FeeScope,
    ) -> Result<Vec<FeeStructure>, PortError> {
        let rows = self
            .repository
            .find_fee_structures(grade_id.into(), scope.academic_year.as_str(), scope.term.as_str())
            .await?;
        rows.into_iter().map(row_to_fee_structure).collect()
    }

    async fn find_fee_payments(
        &self,
        learner_id: LearnerId,
        grade_id: GradeId,
        scope: &FeeScope,
    ) -> Result<Vec<FeePayment>, PortError> {
        let rows = self
            .repository
            .find_fee_payments(
                learner_id.into(),
                grade_id.into(),
                scope.academic_year.as_str(),
                scope.term.as_str(),
            )
            .await?;
        rows.into_iter().map(row_to_fee_payment).collect()
    }

    async fn find_invoices(
        &self,
        learner_id: LearnerId,
        grade_id: GradeId,
        scope: &FeeScope,
    ) -> Result<Vec<StudentInvoice>, PortError> {
        let rows = self
            .repository
            .find_invoices(
                learner_id.into(),
                grade_id.into(),
                scope.academic_year.as_str(),
                scope.term.as_str(),
            )
            .await?;
        rows.into_iter().map(row_to_invoice).collect()
    }

    async fn find_transactions(
        &self,
        invoice_ids: &[InvoiceId],
    ) -> Result<Vec<FeeTransaction>, PortError> {
        let ids: Vec<Uuid> = invoice_ids.iter().map(|id| Uuid::from(*id)).collect();
        let rows = self.repository.find_transactions(&ids).await?;
        rows.into_iter().map(row_to_fee_transaction).collect()
    }
}

fn parse_term(value: &str) -> Result<Term, PortError> {
    value
        .parse()
        .map_err(|_| PortError::transformation(format!("unknown term '{}'", value)))
}

fn parse_year(value: String) -> Result<AcademicYear, PortError> {
    AcademicYear::new(value).map_err(|e| PortError::transformation(e.to_string()))
}

fn row_to_learner(row: LearnerRow) -> Result<Learner, PortError> {
    Ok(Learner {
        id: row.id.into(),
        admission_number: row.admission_number,
        full_name: row.full_name,
        current_grade_id: row.current_grade_id.map(Into::into),
        current_stream_id: row.current_stream_id.map(Into::into),
        status: row.status.parse::<LearnerStatus>()?,
    })
}

fn row_to_fee_structure(row: FeeStructureRow) -> Result<FeeStructure, PortError> {
    Ok(FeeStructure {
        id: row.id.into(),
        grade_id: row.grade_id.into(),
        term: parse_term(&row.term)?,
        academic_year: parse_year(row.academic_year)?,
        amount: row.amount,
        description: row.description,
    })
}

fn row_to_fee_payment(row: FeePaymentRow) -> Result<FeePayment, PortError> {
    Ok(FeePayment {
        id: row.id.into(),
        learner_id: row.learner_id.into(),
        fee_structure_id: row.fee_structure_id.into(),
        amount_paid: row.amount_paid,
        payment_method: row.payment_method.parse::<PaymentMethod>()?,
        transaction_reference: row.transaction_reference,
        paid_at: row.paid_at,
    })
}

fn row_to_invoice(row: StudentInvoiceRow) -> Result<StudentInvoice, PortError> {
    Ok(StudentInvoice {
        id: row.id.into(),
        invoice_number: row.invoice_number,
        learner_id: row.learner_id.into(),
        grade_id: row.grade_id.into(),
        term: parse_term(&row.term)?,
        academic_year: parse_year(row.academic_year)?,
        status: row.status.parse::<InvoiceStatus>()?,
        issued_at: row.issued_at,
    })
}

fn row_to_fee_transaction(row: FeeTransactionRow) -> Result<FeeTransaction, PortError> {
    Ok(FeeTransaction {
        id: row.id.into(),
        invoice_id: row.invoice_id.into(),
        amount_paid: row.amount_paid,
        payment_method: row.payment_method.parse::<PaymentMethod>()?,
        transaction_reference: row.transaction_reference,
        paid_at: row.paid_at,
    })
}
