//! crates/library_catalog_core/src/domain.rs
//!
//! Defines the pure, core data structures for the catalog.
//! These structs are independent of any storage backend or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One catalog entry: a title and its copy count, not a physical copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    /// Entered by the librarian. Duplicates are allowed.
    pub serial_number: i64,
    pub subject: String,
    pub total_copies: u32,
    pub available_copies: u32,
    pub shelf: Option<String>,
    pub column: Option<String>,
    pub pages: Option<u32>,
    pub headlines: Vec<Headline>,
    /// Active loans, oldest first.
    pub borrowed_by: Vec<ActiveLoan>,
    pub date_added: DateTime<Utc>,
}

impl Book {
    /// Number of copies currently out on loan.
    pub fn loans_out(&self) -> usize {
        self.borrowed_by.len()
    }
}

/// A table-of-contents style annotation attached to a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    pub page: u32,
    pub text: String,
}

/// A copy currently held by a borrower.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveLoan {
    pub name: String,
    pub date: DateTime<Utc>,
}

/// The librarian-supplied fields used to create or edit a book.
#[derive(Debug, Clone, PartialEq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub serial_number: i64,
    pub subject: String,
    pub total_copies: u32,
    pub shelf: Option<String>,
    pub column: Option<String>,
    pub pages: Option<u32>,
    pub headlines: Vec<Headline>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoanAction {
    Borrow,
    Return,
}

/// An immutable fact appended to the activity log on every borrow or return.
///
/// `book_title`, `serial_number` and `subject` are snapshots of the book at
/// event time. Only `book_title` is ever rewritten, when the book is renamed.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanEvent {
    pub id: Uuid,
    pub book_id: Uuid,
    pub book_title: String,
    pub serial_number: i64,
    pub subject: String,
    pub borrower_name: String,
    pub action: LoanAction,
    pub timestamp: DateTime<Utc>,
    /// Free-form reference carried by older log entries. New events leave it empty.
    pub special_number: Option<String>,
}

/// How an edit of `total_copies` recomputes `available_copies`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CopiesPolicy {
    /// `available = total - active loans`; totals below the active loan count are refused.
    #[default]
    Reconcile,
    /// `available = total`, ignoring active loans.
    Reset,
}

impl std::str::FromStr for CopiesPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reconcile" => Ok(Self::Reconcile),
            "reset" => Ok(Self::Reset),
            other => Err(format!("'{}' is not a copies policy (expected reconcile or reset)", other)),
        }
    }
}
