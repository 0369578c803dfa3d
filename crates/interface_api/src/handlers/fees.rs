//! Fee balance handlers

use std::str::FromStr;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    Json,
};
use tracing::{debug, info};
use validator::Validate;

use core_kernel::{GradeId, LearnerId, StreamId};
use domain_fees::{reconcile, ChannelPolicy, RosterQuery};

use crate::dto::fees::{
    BalanceInput, ComputeBalanceRequest, ComputeBalanceResponse, LearnerBalanceResponse,
    LearnerView, RosterEntryResponse, RosterParams, RosterResponse, ScopeParams,
};
use crate::error::ApiError;
use crate::AppState;

fn parse_id<T>(value: &str, label: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = uuid::Error>,
{
    value
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid {} id '{}': {}", label, value, e)))
}

/// Fee balances of every learner in a grade
pub async fn grade_fee_balances(
    State(state): State<AppState>,
    Path(grade_id): Path<String>,
    params: Result<Query<RosterParams>, QueryRejection>,
) -> Result<Json<RosterResponse>, ApiError> {
    let Query(params) = params?;
    params.validate()?;

    let grade_id: GradeId = parse_id(&grade_id, "grade")?;
    let mut query = RosterQuery::new(grade_id, params.scope()?);
    if let Some(stream_id) = &params.stream_id {
        query = query.with_stream(parse_id::<StreamId>(stream_id, "stream")?);
    }

    let order = params.order.unwrap_or(state.roster.settings().order);
    let report = state.roster.with_order(order).compute_roster(query).await?;

    let entries: Vec<RosterEntryResponse> = report
        .entries
        .into_iter()
        .filter(|entry| match params.status {
            Some(status) => entry.balance().map(|b| b.status) == Some(status),
            None => true,
        })
        .map(|entry| {
            let learner = LearnerView::from(&entry.learner);
            match entry.outcome {
                Ok(balance) => RosterEntryResponse {
                    learner,
                    balance: Some(balance),
                    error: None,
                },
                Err(e) => RosterEntryResponse {
                    learner,
                    balance: None,
                    error: Some(ApiError::from(e).body()),
                },
            }
        })
        .collect();

    debug!(returned = entries.len(), "Roster entries after status filter");

    Ok(Json(RosterResponse {
        grade_id,
        stream_id: report.query.stream_id,
        scope: report.query.scope,
        order,
        status_filter: params.status,
        collection_rate: report.summary.collection_rate(),
        summary: report.summary,
        entries,
    }))
}

/// Fee balance of one learner
pub async fn learner_fee_balance(
    State(state): State<AppState>,
    Path(learner_id): Path<String>,
    params: Result<Query<ScopeParams>, QueryRejection>,
) -> Result<Json<LearnerBalanceResponse>, ApiError> {
    let Query(params) = params?;
    params.validate()?;

    let learner_id: LearnerId = parse_id(&learner_id, "learner")?;
    let (learner, balance) = state
        .roster
        .compute_learner(learner_id, params.scope()?)
        .await?;

    Ok(Json(LearnerBalanceResponse {
        learner: LearnerView::from(&learner),
        balance,
    }))
}

/// Computes a balance over records supplied in the request body
pub async fn compute_fee_balance(
    State(state): State<AppState>,
    body: Result<Json<ComputeBalanceRequest>, JsonRejection>,
) -> Result<Json<ComputeBalanceResponse>, ApiError> {
    let Json(request) = body?;
    request.validate()?;

    let mut calculator = state.config.calculator();
    if let Some(policy) = request.zero_balance_policy {
        calculator = calculator.with_zero_balance_policy(policy);
    }
    if let Some(strict) = request.strict_channels {
        calculator = calculator.with_channel_policy(if strict {
            ChannelPolicy::RejectOverlap
        } else {
            ChannelPolicy::Additive
        });
    }

    let BalanceInput {
        learner,
        scope,
        records,
    } = request.into_input()?;

    let reconciliation = reconcile(&learner, &scope, &records);
    let balance = calculator.compute(&learner, &scope, &records)?;

    info!(
        learner_id = %learner.id,
        scope = %scope,
        status = %balance.status,
        issues = reconciliation.issues.len(),
        "Computed fee balance from supplied records"
    );

    Ok(Json(ComputeBalanceResponse {
        balance,
        reconciliation,
    }))
}
