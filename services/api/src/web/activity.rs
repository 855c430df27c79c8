//! services/api/src/web/activity.rs
//!
//! Activity log and usage statistics endpoints. Everything here is read-only
//! and recomputed from the stored collections on every request.

use crate::error::{port_error_response, HandlerError};
use crate::web::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use library_catalog_core::domain::{LoanAction, LoanEvent};
use library_catalog_core::search::LogQuery;
use library_catalog_core::stats::{ActivitySummary, BookBorrowCount, BorrowerCount};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActionBody {
    Borrow,
    Return,
}

impl From<LoanAction> for ActionBody {
    fn from(action: LoanAction) -> Self {
        match action {
            LoanAction::Borrow => Self::Borrow,
            LoanAction::Return => Self::Return,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoanEventResponse {
    pub id: Uuid,
    /// May refer to a book that has since been deleted.
    pub book_id: Uuid,
    pub book_title: String,
    pub serial_number: i64,
    pub subject: String,
    pub borrower_name: String,
    pub action: ActionBody,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_number: Option<String>,
}

impl From<LoanEvent> for LoanEventResponse {
    fn from(event: LoanEvent) -> Self {
        Self {
            id: event.id,
            book_id: event.book_id,
            book_title: event.book_title,
            serial_number: event.serial_number,
            subject: event.subject,
            borrower_name: event.borrower_name,
            action: event.action.into(),
            timestamp: event.timestamp,
            special_number: event.special_number,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookStatResponse {
    pub serial_number: i64,
    pub book_title: String,
    pub count: usize,
}

impl From<BookBorrowCount> for BookStatResponse {
    fn from(stat: BookBorrowCount) -> Self {
        Self {
            serial_number: stat.serial_number,
            book_title: stat.book_title,
            count: stat.count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BorrowerStatResponse {
    pub name: String,
    pub count: usize,
}

impl From<BorrowerCount> for BorrowerStatResponse {
    fn from(stat: BorrowerCount) -> Self {
        Self {
            name: stat.name,
            count: stat.count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SummaryResponse {
    pub total_borrows: usize,
    pub total_returns: usize,
    /// Copies on loan right now, counted from the catalog.
    pub currently_borrowed: usize,
    /// Borrow events minus return events.
    pub log_balance: i64,
    pub titles: usize,
    pub total_copies: u64,
}

impl From<ActivitySummary> for SummaryResponse {
    fn from(s: ActivitySummary) -> Self {
        Self {
            total_borrows: s.total_borrows,
            total_returns: s.total_returns,
            currently_borrowed: s.currently_borrowed,
            log_balance: s.log_balance,
            titles: s.titles,
            total_copies: s.total_copies,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivityParams {
    /// `all`, `borrow` or `return`.
    pub action: Option<String>,
    /// Free text matched against book title, borrower name, serial number and special number.
    pub q: Option<String>,
}

impl ActivityParams {
    fn into_query(self) -> Result<LogQuery, String> {
        let action = match self.action.as_deref() {
            None | Some("") | Some("all") => None,
            Some("borrow") => Some(LoanAction::Borrow),
            Some("return") => Some(LoanAction::Return),
            Some(other) => return Err(format!("unknown action filter '{}'", other)),
        };
        Ok(LogQuery {
            text: self.q.unwrap_or_default(),
            action,
        })
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitParams {
    /// Keep only the first `limit` entries.
    pub limit: Option<usize>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /activity - The loan history, newest first.
#[utoipa::path(
    get,
    path = "/activity",
    params(ActivityParams),
    responses(
        (status = 200, description = "Matching events", body = [LoanEventResponse]),
        (status = 400, description = "Unknown action filter")
    )
)]
pub async fn activity_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<ActivityParams>,
) -> Result<Json<Vec<LoanEventResponse>>, HandlerError> {
    let query = params
        .into_query()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    let events = app_state
        .library
        .activity(&query)
        .await
        .map_err(|e| port_error_response("read activity", e))?;
    Ok(Json(events.into_iter().map(LoanEventResponse::from).collect()))
}

/// GET /stats/books - Most borrowed serial numbers.
#[utoipa::path(
    get,
    path = "/stats/books",
    params(LimitParams),
    responses((status = 200, description = "Borrow counts, highest first", body = [BookStatResponse]))
)]
pub async fn book_stats_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<BookStatResponse>>, HandlerError> {
    let stats = app_state
        .library
        .book_stats(params.limit)
        .await
        .map_err(|e| port_error_response("compute book stats", e))?;
    Ok(Json(stats.into_iter().map(BookStatResponse::from).collect()))
}

/// GET /stats/borrowers - Most active borrowers.
#[utoipa::path(
    get,
    path = "/stats/borrowers",
    params(LimitParams),
    responses((status = 200, description = "Borrow counts, highest first", body = [BorrowerStatResponse]))
)]
pub async fn borrower_stats_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Result<Json<Vec<BorrowerStatResponse>>, HandlerError> {
    let stats = app_state
        .library
        .borrower_stats(params.limit)
        .await
        .map_err(|e| port_error_response("compute borrower stats", e))?;
    Ok(Json(stats.into_iter().map(BorrowerStatResponse::from).collect()))
}

/// GET /stats/summary - Totals for the dashboard.
#[utoipa::path(
    get,
    path = "/stats/summary",
    responses((status = 200, description = "Activity totals", body = SummaryResponse))
)]
pub async fn summary_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<SummaryResponse>, HandlerError> {
    let summary = app_state
        .library
        .summary()
        .await
        .map_err(|e| port_error_response("compute summary", e))?;
    Ok(Json(summary.into()))
}
