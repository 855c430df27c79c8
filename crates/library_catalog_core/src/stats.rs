//! crates/library_catalog_core/src/stats.rs
//!
//! Read-only statistics derived from the activity log and the catalog.
//! Nothing here is persisted; every view is recomputed on demand.

use crate::domain::{Book, LoanAction, LoanEvent};

/// How often one serial number has been borrowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookBorrowCount {
    pub serial_number: i64,
    /// Title snapshot of the first event seen for this serial number.
    pub book_title: String,
    pub count: usize,
}

/// How many borrows one borrower name accounts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowerCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivitySummary {
    pub total_borrows: usize,
    pub total_returns: usize,
    /// Sum of the active loans across the catalog.
    pub currently_borrowed: usize,
    /// `total_borrows - total_returns`. Drifts from `currently_borrowed` when
    /// the log and the catalog disagree.
    pub log_balance: i64,
    pub titles: usize,
    pub total_copies: u64,
}

fn borrows(events: &[LoanEvent]) -> impl Iterator<Item = &LoanEvent> {
    events.iter().filter(|e| e.action == LoanAction::Borrow)
}

/// Borrow counts grouped by serial number, most borrowed first.
/// Ties keep the order in which serial numbers first appear in the log.
pub fn book_borrow_counts(events: &[LoanEvent]) -> Vec<BookBorrowCount> {
    let mut counts: Vec<BookBorrowCount> = Vec::new();
    for event in borrows(events) {
        match counts.iter_mut().find(|c| c.serial_number == event.serial_number) {
            Some(existing) => existing.count += 1,
            None => counts.push(BookBorrowCount {
                serial_number: event.serial_number,
                book_title: event.book_title.clone(),
                count: 1,
            }),
        }
    }
    // `sort_by` is stable.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Borrow counts grouped by exact borrower name, most active first.
pub fn borrower_counts(events: &[LoanEvent]) -> Vec<BorrowerCount> {
    let mut counts: Vec<BorrowerCount> = Vec::new();
    for event in borrows(events) {
        match counts.iter_mut().find(|c| c.name == event.borrower_name) {
            Some(existing) => existing.count += 1,
            None => counts.push(BorrowerCount {
                name: event.borrower_name.clone(),
                count: 1,
            }),
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Number of copies currently on loan, taken from the live borrower lists.
pub fn currently_borrowed(books: &[Book]) -> usize {
    books.iter().map(Book::loans_out).sum()
}

/// Borrow events minus return events over the whole log.
pub fn log_balance(events: &[LoanEvent]) -> i64 {
    events.iter().fold(0i64, |acc, e| match e.action {
        LoanAction::Borrow => acc.saturating_add(1),
        LoanAction::Return => acc.saturating_sub(1),
    })
}

pub fn summarize(books: &[Book], events: &[LoanEvent]) -> ActivitySummary {
    let total_borrows = borrows(events).count();
    ActivitySummary {
        total_borrows,
        total_returns: events.len() - total_borrows,
        currently_borrowed: currently_borrowed(books),
        log_balance: log_balance(events),
        titles: books.len(),
        total_copies: books.iter().map(|b| u64::from(b.total_copies)).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ActiveLoan;
    use chrono::Utc;
    use uuid::Uuid;

    fn event(serial_number: i64, title: &str, who: &str, action: LoanAction) -> LoanEvent {
        LoanEvent {
            id: Uuid::new_v4(),
            book_id: Uuid::new_v4(),
            book_title: title.to_string(),
            serial_number,
            subject: "Poetry".to_string(),
            borrower_name: who.to_string(),
            action,
            timestamp: Utc::now(),
            special_number: None,
        }
    }

    fn book_with_loans(total: u32, borrowers: &[&str]) -> Book {
        Book {
            id: Uuid::new_v4(),
            title: "T".to_string(),
            author: "A".to_string(),
            serial_number: 1,
            subject: "S".to_string(),
            total_copies: total,
            available_copies: total - borrowers.len() as u32,
            shelf: None,
            column: None,
            pages: None,
            headlines: Vec::new(),
            borrowed_by: borrowers
                .iter()
                .map(|n| ActiveLoan {
                    name: n.to_string(),
                    date: Utc::now(),
                })
                .collect(),
            date_added: Utc::now(),
        }
    }

    #[test]
    fn book_counts_sort_by_count() {
        let events = vec![
            event(200, "Diwan", "Sara", LoanAction::Borrow),
            event(100, "Kalila", "Ali", LoanAction::Borrow),
            event(100, "Kalila", "Sara", LoanAction::Borrow),
            event(100, "Kalila", "Ali", LoanAction::Return),
            event(100, "Kalila", "Omar", LoanAction::Borrow),
        ];
        let counts = book_borrow_counts(&events);
        assert_eq!(
            counts,
            vec![
                BookBorrowCount {
                    serial_number: 100,
                    book_title: "Kalila".to_string(),
                    count: 3
                },
                BookBorrowCount {
                    serial_number: 200,
                    book_title: "Diwan".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let events = vec![
            event(3, "C", "x", LoanAction::Borrow),
            event(1, "A", "y", LoanAction::Borrow),
            event(2, "B", "z", LoanAction::Borrow),
        ];
        let serials: Vec<i64> = book_borrow_counts(&events).iter().map(|c| c.serial_number).collect();
        assert_eq!(serials, vec![3, 1, 2]);
    }

    #[test]
    fn borrower_names_are_case_sensitive() {
        let events = vec![
            event(1, "A", "ali", LoanAction::Borrow),
            event(1, "A", "Ali", LoanAction::Borrow),
            event(2, "B", "Ali", LoanAction::Borrow),
            event(2, "B", "Ali", LoanAction::Return),
        ];
        assert_eq!(
            borrower_counts(&events),
            vec![
                BorrowerCount {
                    name: "Ali".to_string(),
                    count: 2
                },
                BorrowerCount {
                    name: "ali".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn currently_borrowed_follows_the_catalog_not_the_log() {
        let books = vec![book_with_loans(3, &["Ali", "Sara"]), book_with_loans(1, &[])];
        // The log only knows about one borrow.
        let events = vec![event(1, "T", "Ali", LoanAction::Borrow)];

        let summary = summarize(&books, &events);
        assert_eq!(summary.currently_borrowed, 2);
        assert_eq!(summary.log_balance, 1);
        assert_eq!(summary.total_borrows, 1);
        assert_eq!(summary.total_returns, 0);
        assert_eq!(summary.titles, 2);
        assert_eq!(summary.total_copies, 4);
    }

    #[test]
    fn empty_log_has_no_stats() {
        assert!(book_borrow_counts(&[]).is_empty());
        assert!(borrower_counts(&[]).is_empty());
        assert_eq!(summarize(&[], &[]), ActivitySummary::default());
    }
}
