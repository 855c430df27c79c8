//! services/api/src/web/rest.rs
//!
//! Assembles the REST router and holds the master definition for the OpenAPI
//! specification.

use crate::web::{
    activity::{self, ActionBody, BookStatResponse, BorrowerStatResponse, LoanEventResponse, SummaryResponse},
    books::{self, BookPayload, BookResponse, BorrowRequest, HeadlineBody, LoanBody, ReturnRequest},
    middleware::log_requests,
    state::AppState,
};
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        books::list_books_handler,
        books::get_book_handler,
        books::create_book_handler,
        books::update_book_handler,
        books::delete_book_handler,
        books::borrow_handler,
        books::return_handler,
        books::categories_handler,
        activity::activity_handler,
        activity::book_stats_handler,
        activity::borrower_stats_handler,
        activity::summary_handler,
    ),
    components(
        schemas(
            BookPayload,
            BookResponse,
            HeadlineBody,
            LoanBody,
            BorrowRequest,
            ReturnRequest,
            ActionBody,
            LoanEventResponse,
            BookStatResponse,
            BorrowerStatResponse,
            SummaryResponse,
        )
    ),
    tags(
        (name = "Library Catalog API", description = "Catalog, loan and activity endpoints for a single-user library.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Router
//=========================================================================================

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health_handler() -> &'static str {
    "ok"
}

/// Builds the API router over `state`. CORS and the Swagger UI are layered on
/// by the binary.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/books",
            get(books::list_books_handler).post(books::create_book_handler),
        )
        .route(
            "/books/{id}",
            get(books::get_book_handler)
                .put(books::update_book_handler)
                .delete(books::delete_book_handler),
        )
        .route("/books/{id}/borrow", post(books::borrow_handler))
        .route("/books/{id}/return", post(books::return_handler))
        .route("/categories", get(books::categories_handler))
        .route("/activity", get(activity::activity_handler))
        .route("/stats/books", get(activity::book_stats_handler))
        .route("/stats/borrowers", get(activity::borrower_stats_handler))
        .route("/stats/summary", get(activity::summary_handler))
        .layer(axum_middleware::from_fn(log_requests))
        .with_state(state)
}
