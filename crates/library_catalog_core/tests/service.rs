//! LibraryService behaviour against an in-memory store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use library_catalog_core::{
    Book, BookDraft, BookQuery, CopiesPolicy, LibraryService, LibraryStore, LoanAction, LoanEvent,
    LogQuery, PortError, PortResult,
};
use uuid::Uuid;

#[derive(Default)]
struct MemoryStore {
    books: Mutex<Vec<Book>>,
    events: Mutex<Vec<LoanEvent>>,
    saves: Mutex<Vec<&'static str>>,
    fail_log_writes: AtomicBool,
}

#[async_trait]
impl LibraryStore for MemoryStore {
    async fn load_books(&self) -> PortResult<Vec<Book>> {
        Ok(self.books.lock().unwrap().clone())
    }

    async fn save_books(&self, books: &[Book]) -> PortResult<()> {
        *self.books.lock().unwrap() = books.to_vec();
        self.saves.lock().unwrap().push("catalog");
        Ok(())
    }

    async fn load_events(&self) -> PortResult<Vec<LoanEvent>> {
        Ok(self.events.lock().unwrap().clone())
    }

    async fn save_events(&self, events: &[LoanEvent]) -> PortResult<()> {
        if self.fail_log_writes.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("disk full".to_string()));
        }
        *self.events.lock().unwrap() = events.to_vec();
        self.saves.lock().unwrap().push("activity-log");
        Ok(())
    }
}

fn draft(title: &str, serial_number: i64, total_copies: u32) -> BookDraft {
    BookDraft {
        title: title.to_string(),
        author: "Al-Jahiz".to_string(),
        serial_number,
        subject: "Literature".to_string(),
        total_copies,
        shelf: None,
        column: None,
        pages: None,
        headlines: Vec::new(),
    }
}

fn service() -> (Arc<MemoryStore>, LibraryService) {
    let store = Arc::new(MemoryStore::default());
    let svc = LibraryService::new(store.clone(), CopiesPolicy::Reconcile);
    (store, svc)
}

#[tokio::test]
async fn mutations_are_persisted_between_calls() {
    let (store, svc) = service();
    let book = svc.create_book(draft("Book of Animals", 100, 3)).await.unwrap();
    assert_eq!(book.available_copies, 3);
    assert_eq!(store.books.lock().unwrap().len(), 1);

    svc.borrow(book.id, "Ali").await.unwrap();
    svc.borrow(book.id, "Sara").await.unwrap();
    let after = svc.return_loan(book.id, 0).await.unwrap();

    assert_eq!(after.available_copies, 2);
    assert_eq!(after.borrowed_by[0].name, "Sara");

    let events = store.events.lock().unwrap().clone();
    assert_eq!(events.len(), 3);
    assert_eq!(events[2].action, LoanAction::Return);
    assert_eq!(events[2].borrower_name, "Ali");
}

#[tokio::test]
async fn create_does_not_touch_the_log() {
    let (store, svc) = service();
    svc.create_book(draft("A", 1, 1)).await.unwrap();
    assert_eq!(*store.saves.lock().unwrap(), vec!["catalog"]);
}

#[tokio::test]
async fn refused_borrow_writes_nothing() {
    let (store, svc) = service();
    let book = svc.create_book(draft("A", 1, 1)).await.unwrap();
    svc.borrow(book.id, "Ali").await.unwrap();
    let saves_before = store.saves.lock().unwrap().len();

    let err = svc.borrow(book.id, "Sara").await.unwrap_err();
    assert!(matches!(err, PortError::PreconditionFailed(_)));
    assert_eq!(store.saves.lock().unwrap().len(), saves_before);
    assert_eq!(store.events.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_books_surface_not_found() {
    let (_, svc) = service();
    let id = Uuid::new_v4();
    assert!(matches!(svc.get_book(id).await, Err(PortError::NotFound(_))));
    assert!(matches!(
        svc.update_book(id, draft("A", 1, 1)).await,
        Err(PortError::NotFound(_))
    ));
    assert!(matches!(svc.delete_book(id).await, Err(PortError::NotFound(_))));
}

#[tokio::test]
async fn rename_is_saved_with_the_log() {
    let (store, svc) = service();
    let a = svc.create_book(draft("A", 1, 2)).await.unwrap();
    let b = svc.create_book(draft("B", 2, 2)).await.unwrap();
    svc.borrow(a.id, "Ali").await.unwrap();
    svc.borrow(b.id, "Sara").await.unwrap();

    svc.update_book(a.id, draft("A2", 1, 2)).await.unwrap();

    let events = store.events.lock().unwrap().clone();
    let titles: Vec<&str> = events.iter().map(|e| e.book_title.as_str()).collect();
    assert_eq!(titles, vec!["A2", "B"]);
}

#[tokio::test]
async fn delete_keeps_history() {
    let (store, svc) = service();
    let book = svc.create_book(draft("A", 1, 2)).await.unwrap();
    svc.borrow(book.id, "Ali").await.unwrap();
    svc.delete_book(book.id).await.unwrap();

    assert!(store.books.lock().unwrap().is_empty());
    let events = svc.activity(&LogQuery::default()).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].book_id, book.id);
}

#[tokio::test]
async fn stats_and_summary() {
    let (_, svc) = service();
    let hundred = svc.create_book(draft("Hundred", 100, 5)).await.unwrap();
    let two_hundred = svc.create_book(draft("Two Hundred", 200, 5)).await.unwrap();
    svc.borrow(two_hundred.id, "Omar").await.unwrap();
    for who in ["Ali", "Sara", "Ali"] {
        svc.borrow(hundred.id, who).await.unwrap();
    }
    svc.return_loan(hundred.id, 0).await.unwrap();

    let books = svc.book_stats(None).await.unwrap();
    let pairs: Vec<(i64, usize)> = books.iter().map(|s| (s.serial_number, s.count)).collect();
    assert_eq!(pairs, vec![(100, 3), (200, 1)]);

    let borrowers = svc.borrower_stats(Some(1)).await.unwrap();
    assert_eq!(borrowers.len(), 1);
    assert_eq!(borrowers[0].name, "Ali");
    assert_eq!(borrowers[0].count, 2);

    let summary = svc.summary().await.unwrap();
    assert_eq!(summary.total_borrows, 4);
    assert_eq!(summary.total_returns, 1);
    assert_eq!(summary.currently_borrowed, 3);
    assert_eq!(summary.log_balance, 3);
    assert_eq!(summary.titles, 2);
    assert_eq!(summary.total_copies, 10);
}

#[tokio::test]
async fn listing_filters_and_categories() {
    let (_, svc) = service();
    svc.create_book(draft("Book of Misers", 10, 1)).await.unwrap();
    let mut poetry = draft("Diwan", 11, 1);
    poetry.subject = "Poetry".to_string();
    svc.create_book(poetry).await.unwrap();

    let query = BookQuery {
        text: "misers".to_string(),
        ..Default::default()
    };
    let hits = svc.list_books(&query).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].serial_number, 10);

    assert_eq!(svc.categories().await.unwrap(), vec!["Literature", "Poetry"]);
}

#[tokio::test]
async fn failed_log_write_restores_the_catalog() {
    let (store, svc) = service();
    let book = svc.create_book(draft("Epistles", 9, 1)).await.unwrap();
    store.fail_log_writes.store(true, Ordering::SeqCst);

    let err = svc.borrow(book.id, "Ali").await.unwrap_err();
    assert!(matches!(err, PortError::Unexpected(_)));

    let stored = svc.get_book(book.id).await.unwrap();
    assert_eq!(stored.available_copies, 1);
    assert!(stored.borrowed_by.is_empty());
    assert!(store.events.lock().unwrap().is_empty());

    store.fail_log_writes.store(false, Ordering::SeqCst);
    let retried = svc.borrow(book.id, "Ali").await.unwrap();
    assert_eq!(retried.borrowed_by.len(), 1);
    assert_eq!(store.events.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn failed_log_write_keeps_the_old_title() {
    let (store, svc) = service();
    let book = svc.create_book(draft("Epistles", 9, 2)).await.unwrap();
    svc.borrow(book.id, "Ali").await.unwrap();
    store.fail_log_writes.store(true, Ordering::SeqCst);

    assert!(svc.update_book(book.id, draft("Letters", 9, 2)).await.is_err());

    assert_eq!(svc.get_book(book.id).await.unwrap().title, "Epistles");
    assert_eq!(store.events.lock().unwrap()[0].book_title, "Epistles");
}
