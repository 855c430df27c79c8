//! services/api/src/web/books.rs
//!
//! Catalog and loan endpoints: create, edit, delete and browse books, and
//! borrow or return copies.

use crate::error::{port_error_response, HandlerError};
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use library_catalog_core::domain::{ActiveLoan, Book, BookDraft, Headline};
use library_catalog_core::search::{BookQuery, StatusFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HeadlineBody {
    pub page: u32,
    pub text: String,
}

/// The librarian-entered fields of a book, used for both create and edit.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BookPayload {
    pub title: String,
    pub author: String,
    pub serial_number: i64,
    #[serde(default)]
    pub subject: String,
    pub total_copies: u32,
    #[serde(default)]
    pub shelf: Option<String>,
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub pages: Option<u32>,
    #[serde(default)]
    pub headlines: Vec<HeadlineBody>,
}

impl BookPayload {
    /// Checks the required fields and turns the payload into a draft.
    /// Blank optional text fields are stored as absent.
    pub fn into_draft(self) -> Result<BookDraft, String> {
        let title = self.title.trim().to_string();
        let author = self.author.trim().to_string();
        if title.is_empty() {
            return Err("title is required".to_string());
        }
        if author.is_empty() {
            return Err("author is required".to_string());
        }
        if self.total_copies == 0 {
            return Err("total_copies must be at least 1".to_string());
        }
        if self.pages == Some(0) {
            return Err("pages must be at least 1".to_string());
        }

        Ok(BookDraft {
            title,
            author,
            serial_number: self.serial_number,
            subject: self.subject.trim().to_string(),
            total_copies: self.total_copies,
            shelf: non_blank(self.shelf),
            column: non_blank(self.column),
            pages: self.pages,
            headlines: self
                .headlines
                .into_iter()
                .map(|h| Headline { page: h.page, text: h.text })
                .collect(),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoanBody {
    pub name: String,
    pub date: DateTime<Utc>,
}

impl From<ActiveLoan> for LoanBody {
    fn from(loan: ActiveLoan) -> Self {
        Self {
            name: loan.name,
            date: loan.date,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookResponse {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub serial_number: i64,
    pub subject: String,
    pub total_copies: u32,
    pub available_copies: u32,
    pub shelf: Option<String>,
    pub column: Option<String>,
    pub pages: Option<u32>,
    pub headlines: Vec<HeadlineBody>,
    /// Active loans, oldest first. Returns address a loan by its position here.
    pub borrowed_by: Vec<LoanBody>,
    pub date_added: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            serial_number: book.serial_number,
            subject: book.subject,
            total_copies: book.total_copies,
            available_copies: book.available_copies,
            shelf: book.shelf,
            column: book.column,
            pages: book.pages,
            headlines: book
                .headlines
                .into_iter()
                .map(|h| HeadlineBody { page: h.page, text: h.text })
                .collect(),
            borrowed_by: book.borrowed_by.into_iter().map(LoanBody::from).collect(),
            date_added: book.date_added,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BorrowRequest {
    pub borrower_name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReturnRequest {
    /// Position of the loan in the book's `borrowed_by` list.
    pub loan_index: usize,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListBooksParams {
    /// Free text matched against title, author, subject, serial number and headlines.
    pub q: Option<String>,
    /// Exact subject.
    pub subject: Option<String>,
    /// One of `all`, `available`, `unavailable`, `on_loan`.
    pub status: Option<String>,
}

impl ListBooksParams {
    fn into_query(self) -> Result<BookQuery, String> {
        let status = match self.status.as_deref() {
            Some(raw) => raw.parse::<StatusFilter>()?,
            None => StatusFilter::All,
        };
        Ok(BookQuery {
            text: self.q.unwrap_or_default(),
            subject: self.subject.filter(|s| !s.is_empty()),
            status,
        })
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /books - List the catalog, optionally filtered.
#[utoipa::path(
    get,
    path = "/books",
    params(ListBooksParams),
    responses(
        (status = 200, description = "Matching books in catalog order", body = [BookResponse]),
        (status = 400, description = "Unknown status filter")
    )
)]
pub async fn list_books_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<ListBooksParams>,
) -> Result<Json<Vec<BookResponse>>, HandlerError> {
    let query = params
        .into_query()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    let books = app_state
        .library
        .list_books(&query)
        .await
        .map_err(|e| port_error_response("list books", e))?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// GET /books/{id} - Fetch one book.
#[utoipa::path(
    get,
    path = "/books/{id}",
    params(("id" = Uuid, Path, description = "Book id")),
    responses(
        (status = 200, description = "The book", body = BookResponse),
        (status = 404, description = "No such book")
    )
)]
pub async fn get_book_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookResponse>, HandlerError> {
    let book = app_state
        .library
        .get_book(id)
        .await
        .map_err(|e| port_error_response("get book", e))?;
    Ok(Json(book.into()))
}

/// POST /books - Add a book to the catalog with every copy available.
#[utoipa::path(
    post,
    path = "/books",
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_book_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<BookPayload>,
) -> Result<impl IntoResponse, HandlerError> {
    let draft = payload
        .into_draft()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    let book = app_state
        .library
        .create_book(draft)
        .await
        .map_err(|e| port_error_response("create book", e))?;
    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// PUT /books/{id} - Edit a book.
///
/// Renaming a book also renames it in the activity log. Changing the copy
/// count recomputes the available copies according to the configured policy.
#[utoipa::path(
    put,
    path = "/books/{id}",
    params(("id" = Uuid, Path, description = "Book id")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 404, description = "No such book"),
        (status = 409, description = "New copy count is below the copies on loan")
    )
)]
pub async fn update_book_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BookPayload>,
) -> Result<Json<BookResponse>, HandlerError> {
    let draft = payload
        .into_draft()
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    let book = app_state
        .library
        .update_book(id, draft)
        .await
        .map_err(|e| port_error_response("update book", e))?;
    Ok(Json(book.into()))
}

/// DELETE /books/{id} - Remove a book. Its activity stays in the log.
#[utoipa::path(
    delete,
    path = "/books/{id}",
    params(("id" = Uuid, Path, description = "Book id")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "No such book")
    )
)]
pub async fn delete_book_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HandlerError> {
    app_state
        .library
        .delete_book(id)
        .await
        .map_err(|e| port_error_response("delete book", e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /books/{id}/borrow - Lend one copy.
#[utoipa::path(
    post,
    path = "/books/{id}/borrow",
    params(("id" = Uuid, Path, description = "Book id")),
    request_body = BorrowRequest,
    responses(
        (status = 200, description = "Copy lent", body = BookResponse),
        (status = 404, description = "No such book"),
        (status = 409, description = "No copy available or borrower name empty")
    )
)]
pub async fn borrow_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<BorrowRequest>,
) -> Result<Json<BookResponse>, HandlerError> {
    let book = app_state
        .library
        .borrow(id, &req.borrower_name)
        .await
        .map_err(|e| port_error_response("borrow", e))?;
    Ok(Json(book.into()))
}

/// POST /books/{id}/return - Return the loan at a given position.
#[utoipa::path(
    post,
    path = "/books/{id}/return",
    params(("id" = Uuid, Path, description = "Book id")),
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Copy returned", body = BookResponse),
        (status = 404, description = "No such book"),
        (status = 409, description = "Loan index out of range")
    )
)]
pub async fn return_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReturnRequest>,
) -> Result<Json<BookResponse>, HandlerError> {
    let book = app_state
        .library
        .return_loan(id, req.loan_index)
        .await
        .map_err(|e| port_error_response("return", e))?;
    Ok(Json(book.into()))
}

/// GET /categories - Distinct subjects, in the order they were first catalogued.
#[utoipa::path(
    get,
    path = "/categories",
    responses((status = 200, description = "Subjects", body = [String]))
)]
pub async fn categories_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, HandlerError> {
    let subjects = app_state
        .library
        .categories()
        .await
        .map_err(|e| port_error_response("list categories", e))?;
    Ok(Json(subjects))
}
