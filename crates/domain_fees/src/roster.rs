//! Roster computation
//!
//! Computes balances for every learner in a grade (optionally narrowed to a
//! stream) with bounded concurrency. A learner whose records cannot be read
//! or whose balance cannot be computed is reported as a failed entry; the
//! rest of the roster is unaffected.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use core_kernel::{GradeId, LearnerId, PortError, StreamId};

use crate::academic::FeeScope;
use crate::balance::{BalanceCalculator, FeeBalance};
use crate::error::FeeError;
use crate::learner::{Learner, LearnerStatus};
use crate::ports::FeeLedgerPort;
use crate::summary::RosterSummary;

/// Selects the learners of a roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterQuery {
    pub grade_id: GradeId,
    pub stream_id: Option<StreamId>,
    pub scope: FeeScope,
    /// Learner statuses to include
    pub statuses: Vec<LearnerStatus>,
}

impl RosterQuery {
    /// Active learners of the grade
    pub fn new(grade_id: GradeId, scope: FeeScope) -> Self {
        Self {
            grade_id,
            stream_id: None,
            scope,
            statuses: vec![LearnerStatus::Active],
        }
    }

    pub fn with_stream(mut self, stream_id: StreamId) -> Self {
        self.stream_id = Some(stream_id);
        self
    }

    pub fn with_statuses(mut self, statuses: Vec<LearnerStatus>) -> Self {
        self.statuses = statuses;
        self
    }

    /// Returns true if the learner belongs to this roster
    pub fn includes(&self, learner: &Learner) -> bool {
        learner.current_grade_id == Some(self.grade_id)
            && self
                .stream_id
                .map_or(true, |stream| learner.current_stream_id == Some(stream))
            && self.statuses.contains(&learner.status)
    }
}

/// Order of entries in a roster report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterOrder {
    /// As listed by the ledger
    #[default]
    Input,
    /// By full name, then admission number
    Name,
    AdmissionNumber,
}

impl RosterOrder {
    pub fn apply(&self, entries: &mut [RosterEntry]) {
        match self {
            RosterOrder::Input => {}
            RosterOrder::Name => entries.sort_by(|a, b| {
                a.learner
                    .full_name
                    .to_lowercase()
                    .cmp(&b.learner.full_name.to_lowercase())
                    .then_with(|| a.learner.admission_number.cmp(&b.learner.admission_number))
            }),
            RosterOrder::AdmissionNumber => {
                entries.sort_by(|a, b| a.learner.admission_number.cmp(&b.learner.admission_number))
            }
        }
    }
}

/// Tuning for roster computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterSettings {
    /// Upper bound on learners fetched at once; zero is treated as one
    pub max_concurrency: usize,
    /// Upper bound on one learner's record fetch
    pub fetch_timeout: Duration,
    pub order: RosterOrder,
    pub calculator: BalanceCalculator,
}

impl Default for RosterSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            fetch_timeout: Duration::from_secs(10),
            order: RosterOrder::default(),
            calculator: BalanceCalculator::default(),
        }
    }
}

/// One learner's result within a roster
#[derive(Debug)]
pub struct RosterEntry {
    pub learner: Learner,
    pub outcome: Result<FeeBalance, FeeError>,
}

impl RosterEntry {
    pub fn balance(&self) -> Option<&FeeBalance> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&FeeError> {
        self.outcome.as_ref().err()
    }
}

/// Result of a roster computation
#[derive(Debug)]
pub struct RosterReport {
    pub query: RosterQuery,
    pub entries: Vec<RosterEntry>,
    pub summary: RosterSummary,
}

/// Computes fee balances for learners read through a [`FeeLedgerPort`]
pub struct RosterService {
    ledger: Arc<dyn FeeLedgerPort>,
    settings: RosterSettings,
}

impl RosterService {
    pub fn new(ledger: Arc<dyn FeeLedgerPort>, settings: RosterSettings) -> Self {
        Self { ledger, settings }
    }

    pub fn settings(&self) -> &RosterSettings {
        &self.settings
    }

    /// Same service with a different entry order
    pub fn with_order(&self, order: RosterOrder) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            settings: RosterSettings { order, ..self.settings },
        }
    }

    /// Computes the balance of every learner selected by `query`
    ///
    /// # Errors
    ///
    /// Fails only when the learners cannot be listed or the summary totals
    /// overflow. Per-learner failures are reported in the entries.
    pub async fn compute_roster(&self, query: RosterQuery) -> Result<RosterReport, FeeError> {
        let learners = self.ledger.list_learners(&query).await?;
        info!(
            grade_id = %query.grade_id,
            scope = %query.scope,
            learners = learners.len(),
            max_concurrency = self.settings.max_concurrency,
            "Computing fee roster"
        );

        let limit = self.settings.max_concurrency.max(1);
        let scope = &query.scope;
        let mut indexed: Vec<(usize, RosterEntry)> = stream::iter(learners.into_iter().enumerate())
            .map(|(index, learner)| async move {
                let outcome = self.compute_for(&learner, scope).await;
                if let Err(e) = &outcome {
                    warn!(learner_id = %learner.id, error = %e, "Fee balance failed for learner");
                }
                (index, RosterEntry { learner, outcome })
            })
            .buffer_unordered(limit)
            .collect()
            .await;

        indexed.sort_by_key(|(index, _)| *index);
        let mut entries: Vec<RosterEntry> = indexed.into_iter().map(|(_, entry)| entry).collect();
        self.settings.order.apply(&mut entries);

        let summary = RosterSummary::from_entries(&entries)?;
        debug!(
            computed = summary.computed_count,
            failed = summary.failed_count,
            "Fee roster computed"
        );

        Ok(RosterReport {
            query,
            entries,
            summary,
        })
    }

    /// Computes one learner's balance
    pub async fn compute_learner(
        &self,
        learner_id: LearnerId,
        scope: FeeScope,
    ) -> Result<(Learner, FeeBalance), FeeError> {
        let learner = self.ledger.get_learner(learner_id).await?;
        let balance = self.compute_for(&learner, &scope).await?;
        Ok((learner, balance))
    }

    async fn compute_for(&self, learner: &Learner, scope: &FeeScope) -> Result<FeeBalance, FeeError> {
        let timeout = self.settings.fetch_timeout;
        let records = tokio::time::timeout(timeout, self.ledger.fetch_fee_records(learner, scope))
            .await
            .map_err(|_| PortError::timeout("fetch_fee_records", timeout.as_millis() as u64))??;
        self.settings.calculator.compute(learner, scope, &records)
    }
}
