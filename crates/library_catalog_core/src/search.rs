//! crates/library_catalog_core/src/search.rs
//!
//! Pure filters over the catalog and the activity log.

use std::str::FromStr;

use crate::domain::{Book, LoanAction, LoanEvent};

/// Availability facet for the catalog view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    /// At least one copy on the shelf.
    Available,
    /// Every copy is out.
    Unavailable,
    /// At least one copy is out.
    OnLoan,
}

impl StatusFilter {
    fn matches(self, book: &Book) -> bool {
        match self {
            Self::All => true,
            Self::Available => book.available_copies > 0,
            Self::Unavailable => book.available_copies == 0,
            Self::OnLoan => !book.borrowed_by.is_empty(),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "all" => Ok(Self::All),
            "available" => Ok(Self::Available),
            "unavailable" => Ok(Self::Unavailable),
            "on_loan" => Ok(Self::OnLoan),
            other => Err(format!("unknown status filter '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookQuery {
    /// Case-insensitive substring; empty matches everything.
    pub text: String,
    /// Exact subject match when set.
    pub subject: Option<String>,
    pub status: StatusFilter,
}

impl BookQuery {
    pub fn matches(&self, book: &Book) -> bool {
        let subject_ok = self.subject.as_deref().map_or(true, |s| book.subject == s);
        subject_ok && self.status.matches(book) && text_matches(&self.text, book)
    }
}

fn text_matches(text: &str, book: &Book) -> bool {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let hit = |field: &str| field.to_lowercase().contains(&needle);

    hit(&book.title)
        || hit(&book.author)
        || hit(&book.subject)
        || book.serial_number.to_string().contains(&needle)
        || book.headlines.iter().any(|h| hit(&h.text))
}

/// Books matching `query`, in catalog order.
pub fn filter_books<'a>(books: &'a [Book], query: &BookQuery) -> Vec<&'a Book> {
    books.iter().filter(|b| query.matches(b)).collect()
}

/// Distinct subjects in the order they first appear in the catalog.
pub fn categories(books: &[Book]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for book in books {
        if !seen.iter().any(|s| *s == book.subject) {
            seen.push(book.subject.clone());
        }
    }
    seen
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogQuery {
    pub text: String,
    /// `None` keeps both borrows and returns.
    pub action: Option<LoanAction>,
}

impl LogQuery {
    pub fn matches(&self, event: &LoanEvent) -> bool {
        if self.action.is_some_and(|a| a != event.action) {
            return false;
        }
        let needle = self.text.trim().to_lowercase();
        needle.is_empty()
            || event.book_title.to_lowercase().contains(&needle)
            || event.borrower_name.to_lowercase().contains(&needle)
            || event.serial_number.to_string().contains(&needle)
            || event
                .special_number
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(&needle))
    }
}

/// Events matching `query`, newest first. Events sharing a timestamp keep
/// their stored order.
pub fn filter_log<'a>(events: &'a [LoanEvent], query: &LogQuery) -> Vec<&'a LoanEvent> {
    let mut hits: Vec<&LoanEvent> = events.iter().filter(|e| query.matches(e)).collect();
    hits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    hits
}
