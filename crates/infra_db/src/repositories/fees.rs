//! Fee ledger repository
//!
//! Row-level access to learners, fee structures, both payment channels and
//! student invoices. Rows carry text enums as stored; conversion to domain
//! types happens in the adapter.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use domain_fees::{FeePayment, FeeStructure, FeeTransaction, Learner, StudentInvoice};

use crate::error::DatabaseError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LearnerRow {
    pub id: Uuid,
    pub admission_number: String,
    pub full_name: String,
    pub current_grade_id: Option<Uuid>,
    pub current_stream_id: Option<Uuid>,
    pub status: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeeStructureRow {
    pub id: Uuid,
    pub grade_id: Uuid,
    pub academic_year: String,
    pub term: String,
    pub amount: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeePaymentRow {
    pub id: Uuid,
    pub learner_id: Uuid,
    pub fee_structure_id: Uuid,
    pub amount_paid: Decimal,
    pub payment_method: String,
    pub transaction_reference: Option<String>,
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StudentInvoiceRow {
    pub id: Uuid,
    pub invoice_number: String,
    pub learner_id: Uuid,
    pub grade_id: Uuid,
    pub academic_year: String,
    pub term: String,
    pub status: String,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeeTransactionRow {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub amount_paid: Decimal,
    pub payment_method: String,
    pub transaction_reference: Option<String>,
    pub paid_at: DateTime<Utc>,
}

/// Repository over the fee tables
#[derive(Debug, Clone)]
pub struct FeeRepository {
    pool: PgPool,
}

impl FeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Learners placed in a grade, optionally narrowed to a stream, with one of the given statuses
    pub async fn list_learners(
        &self,
        grade_id: Uuid,
        stream_id: Option<Uuid>,
        statuses: &[String],
    ) -> Result<Vec<LearnerRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, LearnerRow>(
            r#"
            SELECT id, admission_number, full_name, current_grade_id, current_stream_id, status
            FROM learners
            WHERE current_grade_id = $1
              AND ($2::uuid IS NULL OR current_stream_id = $2)
              AND status = ANY($3)
            ORDER BY admission_number
            "#,
        )
        .bind(grade_id)
        .bind(stream_id)
        .bind(statuses)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_learner(&self, id: Uuid) -> Result<LearnerRow, DatabaseError> {
        sqlx::query_as::<_, LearnerRow>(
            r#"
            SELECT id, admission_number, full_name, current_grade_id, current_stream_id, status
            FROM learners
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Learner", id))
    }

    /// Structures for a grade and scope, oldest first
    pub async fn find_fee_structures(
        &self,
        grade_id: Uuid,
        academic_year: &str,
        term: &str,
    ) -> Result<Vec<FeeStructureRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, FeeStructureRow>(
            r#"
            SELECT id, grade_id, academic_year, term, amount, description
            FROM fee_structures
            WHERE grade_id = $1 AND academic_year = $2 AND term = $3
            ORDER BY created_at, id
            "#,
        )
        .bind(grade_id)
        .bind(academic_year)
        .bind(term)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Direct payments by a learner against the grade's structures in the scope
    pub async fn find_fee_payments(
        &self,
        learner_id: Uuid,
        grade_id: Uuid,
        academic_year: &str,
        term: &str,
    ) -> Result<Vec<FeePaymentRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, FeePaymentRow>(
            r#"
            SELECT fp.id, fp.learner_id, fp.fee_structure_id, fp.amount_paid,
                   fp.payment_method, fp.transaction_reference, fp.paid_at
            FROM fee_payments fp
            JOIN fee_structures fs ON fs.id = fp.fee_structure_id
            WHERE fp.learner_id = $1
              AND fs.grade_id = $2
              AND fs.academic_year = $3
              AND fs.term = $4
            ORDER BY fp.paid_at, fp.id
            "#,
        )
        .bind(learner_id)
        .bind(grade_id)
        .bind(academic_year)
        .bind(term)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Invoices issued to a learner under a grade and scope, in any status
    pub async fn find_invoices(
        &self,
        learner_id: Uuid,
        grade_id: Uuid,
        academic_year: &str,
        term: &str,
    ) -> Result<Vec<StudentInvoiceRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, StudentInvoiceRow>(
            r#"
            SELECT id, invoice_number, learner_id, grade_id, academic_year, term, status, issued_at
            FROM student_invoices
            WHERE learner_id = $1 AND grade_id = $2 AND academic_year = $3 AND term = $4
            ORDER BY issued_at, id
            "#,
        )
        .bind(learner_id)
        .bind(grade_id)
        .bind(academic_year)
        .bind(term)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_transactions(
        &self,
        invoice_ids: &[Uuid],
    ) -> Result<Vec<FeeTransactionRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, FeeTransactionRow>(
            r#"
            SELECT id, invoice_id, amount_paid, payment_method, transaction_reference, paid_at
            FROM fee_transactions
            WHERE invoice_id = ANY($1)
            ORDER BY paid_at, id
            "#,
        )
        .bind(invoice_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn insert_learner(&self, learner: &Learner) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO learners (id, admission_number, full_name, current_grade_id, current_stream_id, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(learner.id.as_uuid())
        .bind(&learner.admission_number)
        .bind(&learner.full_name)
        .bind(learner.current_grade_id.map(Uuid::from))
        .bind(learner.current_stream_id.map(Uuid::from))
        .bind(learner.status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_fee_structure(&self, structure: &FeeStructure) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO fee_structures (id, grade_id, academic_year, term, amount, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(structure.id.as_uuid())
        .bind(structure.grade_id.as_uuid())
        .bind(structure.academic_year.as_str())
        .bind(structure.term.as_str())
        .bind(structure.amount)
        .bind(&structure.description)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_fee_payment(&self, payment: &FeePayment) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO fee_payments (id, learner_id, fee_structure_id, amount_paid,
                                      payment_method, transaction_reference, paid_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.learner_id.as_uuid())
        .bind(payment.fee_structure_id.as_uuid())
        .bind(payment.amount_paid)
        .bind(payment.payment_method.as_str())
        .bind(&payment.transaction_reference)
        .bind(payment.paid_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_invoice(&self, invoice: &StudentInvoice) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO student_invoices (id, invoice_number, learner_id, grade_id,
                                          academic_year, term, status, issued_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(invoice.id.as_uuid())
        .bind(&invoice.invoice_number)
        .bind(invoice.learner_id.as_uuid())
        .bind(invoice.grade_id.as_uuid())
        .bind(invoice.academic_year.as_str())
        .bind(invoice.term.as_str())
        .bind(invoice.status.as_str())
        .bind(invoice.issued_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_fee_transaction(&self, transaction: &FeeTransaction) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO fee_transactions (id, invoice_id, amount_paid, payment_method,
                                          transaction_reference, paid_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(transaction.invoice_id.as_uuid())
        .bind(transaction.amount_paid)
        .bind(transaction.payment_method.as_str())
        .bind(&transaction.transaction_reference)
        .bind(transaction.paid_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
