//! crates/library_catalog_core/src/service.rs
//!
//! The application service: every mutation reloads both collections from the
//! injected store, applies a catalog rule, and writes back what changed.
//! No state is held between calls, so a stale in-memory copy can never be saved.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::catalog::{Applied, Catalog, CatalogError};
use crate::domain::{Book, BookDraft, CopiesPolicy, LoanEvent};
use crate::ports::{LibraryStore, PortError, PortResult};
use crate::search::{self, BookQuery, LogQuery};
use crate::stats::{self, ActivitySummary, BookBorrowCount, BorrowerCount};

#[derive(Clone)]
pub struct LibraryService {
    store: Arc<dyn LibraryStore>,
    policy: CopiesPolicy,
}

impl LibraryService {
    /// Creates a new `LibraryService` over `store`.
    pub fn new(store: Arc<dyn LibraryStore>, policy: CopiesPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> CopiesPolicy {
        self.policy
    }

    async fn load(&self) -> PortResult<Catalog> {
        let books = self.store.load_books().await?;
        let events = self.store.load_events().await?;
        debug!(books = books.len(), events = events.len(), "Loaded catalog");
        Ok(Catalog::new(books, events))
    }

    /// Writes the catalog, then the log when it changed. If the log write
    /// fails, `books_before` is written back so neither collection holds half
    /// of the mutation.
    async fn commit(&self, catalog: &Catalog, books_before: &[Book], log_changed: bool) -> PortResult<()> {
        self.store.save_books(&catalog.books).await?;
        if log_changed {
            if let Err(err) = self.store.save_events(&catalog.events).await {
                error!(error = %err, "Saving the activity log failed, restoring the catalog");
                if let Err(restore_err) = self.store.save_books(books_before).await {
                    error!(error = %restore_err, "Restoring the catalog failed");
                }
                return Err(err);
            }
        }
        debug!(log_changed, "Saved catalog");
        Ok(())
    }

    /// Loads, applies `rule`, and saves on success. Refusals are logged and
    /// returned without writing anything.
    async fn mutate<F>(&self, op: &'static str, rule: F) -> PortResult<Book>
    where
        F: FnOnce(&mut Catalog) -> Result<Applied<Book>, CatalogError>,
    {
        let mut catalog = self.load().await?;
        let books_before = catalog.books.clone();
        match rule(&mut catalog) {
            Ok(applied) => {
                self.commit(&catalog, &books_before, applied.log_changed).await?;
                let book = applied.value;
                info!(
                    op,
                    book_id = %book.id,
                    available = book.available_copies,
                    total = book.total_copies,
                    "Catalog mutation committed"
                );
                Ok(book)
            }
            Err(err) => {
                warn!(op, error = %err, "Catalog mutation refused");
                Err(PortError::from(err))
            }
        }
    }

    // --- Catalog ---

    pub async fn list_books(&self, query: &BookQuery) -> PortResult<Vec<Book>> {
        let books = self.store.load_books().await?;
        Ok(search::filter_books(&books, query).into_iter().cloned().collect())
    }

    pub async fn get_book(&self, id: Uuid) -> PortResult<Book> {
        self.store
            .load_books()
            .await?
            .into_iter()
            .find(|b| b.id == id)
            .ok_or_else(|| PortError::from(CatalogError::NotFound(id)))
    }

    pub async fn categories(&self) -> PortResult<Vec<String>> {
        let books = self.store.load_books().await?;
        Ok(search::categories(&books))
    }

    pub async fn create_book(&self, draft: BookDraft) -> PortResult<Book> {
        self.mutate("create", |c| Ok(c.create(draft, Utc::now()))).await
    }

    pub async fn update_book(&self, id: Uuid, draft: BookDraft) -> PortResult<Book> {
        let policy = self.policy;
        self.mutate("update", |c| c.update(id, draft, policy)).await
    }

    pub async fn delete_book(&self, id: Uuid) -> PortResult<Book> {
        self.mutate("delete", |c| c.delete(id)).await
    }

    // --- Loans ---

    pub async fn borrow(&self, id: Uuid, borrower_name: &str) -> PortResult<Book> {
        self.mutate("borrow", |c| c.borrow(id, borrower_name, Utc::now()))
            .await
    }

    pub async fn return_loan(&self, id: Uuid, loan_index: usize) -> PortResult<Book> {
        self.mutate("return", |c| c.return_loan(id, loan_index, Utc::now()))
            .await
    }

    // --- Activity log and statistics ---

    pub async fn activity(&self, query: &LogQuery) -> PortResult<Vec<LoanEvent>> {
        let events = self.store.load_events().await?;
        Ok(search::filter_log(&events, query).into_iter().cloned().collect())
    }

    pub async fn book_stats(&self, limit: Option<usize>) -> PortResult<Vec<BookBorrowCount>> {
        let events = self.store.load_events().await?;
        Ok(truncate(stats::book_borrow_counts(&events), limit))
    }

    pub async fn borrower_stats(&self, limit: Option<usize>) -> PortResult<Vec<BorrowerCount>> {
        let events = self.store.load_events().await?;
        Ok(truncate(stats::borrower_counts(&events), limit))
    }

    pub async fn summary(&self) -> PortResult<ActivitySummary> {
        let catalog = self.load().await?;
        Ok(stats::summarize(&catalog.books, &catalog.events))
    }
}

fn truncate<T>(mut items: Vec<T>, limit: Option<usize>) -> Vec<T> {
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    items
}
