//! crates/library_catalog_core/src/catalog.rs
//!
//! The catalog mutation rules. Every rule works on an in-memory `Catalog`
//! snapshot and never touches storage, so a refused command leaves the
//! snapshot exactly as it was.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{ActiveLoan, Book, BookDraft, CopiesPolicy, LoanAction, LoanEvent};

/// Reasons a catalog rule refuses a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Book not found: {0}")]
    NotFound(Uuid),
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),
}

/// The result of a committed rule, plus whether the activity log was touched.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied<T> {
    pub value: T,
    pub log_changed: bool,
}

impl<T> Applied<T> {
    fn catalog_only(value: T) -> Self {
        Self { value, log_changed: false }
    }

    fn with_log(value: T) -> Self {
        Self { value, log_changed: true }
    }
}

/// The full state the rules operate on: the catalog and its activity log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub books: Vec<Book>,
    pub events: Vec<LoanEvent>,
}

impl Catalog {
    pub fn new(books: Vec<Book>, events: Vec<LoanEvent>) -> Self {
        Self { books, events }
    }

    pub fn book(&self, id: Uuid) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    fn position(&self, id: Uuid) -> Result<usize, CatalogError> {
        self.books
            .iter()
            .position(|b| b.id == id)
            .ok_or(CatalogError::NotFound(id))
    }

    /// Adds a new book with every copy available.
    pub fn create(&mut self, draft: BookDraft, now: DateTime<Utc>) -> Applied<Book> {
        let book = Book {
            id: Uuid::new_v4(),
            title: draft.title,
            author: draft.author,
            serial_number: draft.serial_number,
            subject: draft.subject,
            total_copies: draft.total_copies,
            available_copies: draft.total_copies,
            shelf: draft.shelf,
            column: draft.column,
            pages: draft.pages,
            headlines: draft.headlines,
            borrowed_by: Vec::new(),
            date_added: now,
        };
        self.books.push(book.clone());
        Applied::catalog_only(book)
    }

    /// Merges `draft` over the book with `id`.
    ///
    /// `id`, `date_added` and the active loans are kept. A changed total is
    /// applied according to `policy`, and a changed title is copied into every
    /// logged event for this book.
    pub fn update(
        &mut self,
        id: Uuid,
        draft: BookDraft,
        policy: CopiesPolicy,
    ) -> Result<Applied<Book>, CatalogError> {
        let idx = self.position(id)?;
        let current = &self.books[idx];

        let available_copies = if draft.total_copies == current.total_copies {
            current.available_copies
        } else {
            match policy {
                CopiesPolicy::Reset => draft.total_copies,
                CopiesPolicy::Reconcile => {
                    let out = u32::try_from(current.loans_out()).unwrap_or(u32::MAX);
                    draft.total_copies.checked_sub(out).ok_or_else(|| {
                        CatalogError::PreconditionFailed(format!(
                            "total copies {} is below the {} copies currently on loan",
                            draft.total_copies, out
                        ))
                    })?
                }
            }
        };
        let title_changed = draft.title != current.title;

        let book = &mut self.books[idx];
        book.title = draft.title;
        book.author = draft.author;
        book.serial_number = draft.serial_number;
        book.subject = draft.subject;
        book.total_copies = draft.total_copies;
        book.available_copies = available_copies;
        book.shelf = draft.shelf;
        book.column = draft.column;
        book.pages = draft.pages;
        book.headlines = draft.headlines;
        let updated = book.clone();

        if title_changed {
            for event in self.events.iter_mut().filter(|e| e.book_id == id) {
                event.book_title = updated.title.clone();
            }
            Ok(Applied::with_log(updated))
        } else {
            Ok(Applied::catalog_only(updated))
        }
    }

    /// Removes a book. Its logged events are kept as orphaned history.
    pub fn delete(&mut self, id: Uuid) -> Result<Applied<Book>, CatalogError> {
        let idx = self.position(id)?;
        Ok(Applied::catalog_only(self.books.remove(idx)))
    }

    /// Lends one copy of a book to `borrower_name`.
    pub fn borrow(
        &mut self,
        id: Uuid,
        borrower_name: &str,
        now: DateTime<Utc>,
    ) -> Result<Applied<Book>, CatalogError> {
        let idx = self.position(id)?;
        let name = borrower_name.trim();
        if name.is_empty() {
            return Err(CatalogError::PreconditionFailed(
                "borrower name must not be empty".to_string(),
            ));
        }

        let book = &mut self.books[idx];
        let Some(remaining) = book.available_copies.checked_sub(1) else {
            return Err(CatalogError::PreconditionFailed(format!(
                "no copies of '{}' are available",
                book.title
            )));
        };
        book.available_copies = remaining;
        book.borrowed_by.push(ActiveLoan {
            name: name.to_string(),
            date: now,
        });
        let book = book.clone();

        self.events.push(event_for(&book, name, LoanAction::Borrow, now));
        Ok(Applied::with_log(book))
    }

    /// Returns the loan at position `loan_index` in the book's borrower list.
    pub fn return_loan(
        &mut self,
        id: Uuid,
        loan_index: usize,
        now: DateTime<Utc>,
    ) -> Result<Applied<Book>, CatalogError> {
        let idx = self.position(id)?;
        let book = &mut self.books[idx];
        if loan_index >= book.borrowed_by.len() {
            return Err(CatalogError::PreconditionFailed(format!(
                "loan index {} is out of range ({} active loans)",
                loan_index,
                book.borrowed_by.len()
            )));
        }

        let loan = book.borrowed_by.remove(loan_index);
        book.available_copies = book.available_copies.saturating_add(1);
        let book = book.clone();

        self.events.push(event_for(&book, &loan.name, LoanAction::Return, now));
        Ok(Applied::with_log(book))
    }
}

fn event_for(book: &Book, borrower_name: &str, action: LoanAction, now: DateTime<Utc>) -> LoanEvent {
    LoanEvent {
        id: Uuid::new_v4(),
        book_id: book.id,
        book_title: book.title.clone(),
        serial_number: book.serial_number,
        subject: book.subject.clone(),
        borrower_name: borrower_name.to_string(),
        action,
        timestamp: now,
        special_number: None,
    }
}
