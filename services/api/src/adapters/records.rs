//! services/api/src/adapters/records.rs
//!
//! "Impure" persisted shapes of the catalog and the activity log, and their
//! mapping to and from the core domain types. Field names follow the camelCase
//! layout the catalog has always been stored with.

use chrono::{DateTime, Utc};
use library_catalog_core::domain::{ActiveLoan, Book, Headline, LoanAction, LoanEvent};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    id: Uuid,
    title: String,
    author: String,
    serial_number: i64,
    #[serde(default)]
    subject: String,
    total_copies: u32,
    available_copies: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shelf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pages: Option<u32>,
    #[serde(default)]
    headlines: Vec<HeadlineRecord>,
    #[serde(default)]
    borrowed_by: Vec<LoanRecord>,
    date_added: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HeadlineRecord {
    page: u32,
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoanRecord {
    name: String,
    date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionRecord {
    Borrow,
    Return,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanEventRecord {
    id: Uuid,
    book_id: Uuid,
    book_title: String,
    serial_number: i64,
    #[serde(default)]
    subject: String,
    borrower_name: String,
    action: ActionRecord,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    special_number: Option<String>,
}

impl BookRecord {
    pub fn to_domain(self) -> Book {
        Book {
            id: self.id,
            title: self.title,
            author: self.author,
            serial_number: self.serial_number,
            subject: self.subject,
            total_copies: self.total_copies,
            available_copies: self.available_copies,
            shelf: self.shelf,
            column: self.column,
            pages: self.pages,
            headlines: self
                .headlines
                .into_iter()
                .map(|h| Headline { page: h.page, text: h.text })
                .collect(),
            borrowed_by: self
                .borrowed_by
                .into_iter()
                .map(|l| ActiveLoan { name: l.name, date: l.date })
                .collect(),
            date_added: self.date_added,
        }
    }

    pub fn from_domain(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            serial_number: book.serial_number,
            subject: book.subject.clone(),
            total_copies: book.total_copies,
            available_copies: book.available_copies,
            shelf: book.shelf.clone(),
            column: book.column.clone(),
            pages: book.pages,
            headlines: book
                .headlines
                .iter()
                .map(|h| HeadlineRecord {
                    page: h.page,
                    text: h.text.clone(),
                })
                .collect(),
            borrowed_by: book
                .borrowed_by
                .iter()
                .map(|l| LoanRecord {
                    name: l.name.clone(),
                    date: l.date,
                })
                .collect(),
            date_added: book.date_added,
        }
    }
}

impl From<ActionRecord> for LoanAction {
    fn from(action: ActionRecord) -> Self {
        match action {
            ActionRecord::Borrow => Self::Borrow,
            ActionRecord::Return => Self::Return,
        }
    }
}

impl From<LoanAction> for ActionRecord {
    fn from(action: LoanAction) -> Self {
        match action {
            LoanAction::Borrow => Self::Borrow,
            LoanAction::Return => Self::Return,
        }
    }
}

impl LoanEventRecord {
    pub fn to_domain(self) -> LoanEvent {
        LoanEvent {
            id: self.id,
            book_id: self.book_id,
            book_title: self.book_title,
            serial_number: self.serial_number,
            subject: self.subject,
            borrower_name: self.borrower_name,
            action: self.action.into(),
            timestamp: self.timestamp,
            special_number: self.special_number,
        }
    }

    pub fn from_domain(event: &LoanEvent) -> Self {
        Self {
            id: event.id,
            book_id: event.book_id,
            book_title: event.book_title.clone(),
            serial_number: event.serial_number,
            subject: event.subject.clone(),
            borrower_name: event.borrower_name.clone(),
            action: event.action.into(),
            timestamp: event.timestamp,
            special_number: event.special_number.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_catalog_entries_without_optional_fields() {
        let raw = json!([{
            "id": "6f1c1b9e-6a43-4a4b-9d0e-0d6c8f3a2b11",
            "title": "Kalila wa Dimna",
            "author": "Ibn al-Muqaffa",
            "serialNumber": 77,
            "subject": "Fables",
            "totalCopies": 2,
            "availableCopies": 2,
            "dateAdded": "2025-03-01T10:00:00Z"
        }]);
        let records: Vec<BookRecord> = serde_json::from_value(raw).unwrap();
        let book = records.into_iter().next().unwrap().to_domain();

        assert_eq!(book.serial_number, 77);
        assert_eq!(book.shelf, None);
        assert!(book.headlines.is_empty());
        assert!(book.borrowed_by.is_empty());
    }

    #[test]
    fn writes_camel_case_fields_and_lowercase_actions() {
        let event = LoanEvent {
            id: Uuid::new_v4(),
            book_id: Uuid::new_v4(),
            book_title: "Diwan".to_string(),
            serial_number: 12,
            subject: "Poetry".to_string(),
            borrower_name: "Sara".to_string(),
            action: LoanAction::Return,
            timestamp: Utc::now(),
            special_number: None,
        };
        let value = serde_json::to_value(LoanEventRecord::from_domain(&event)).unwrap();

        assert_eq!(value["bookTitle"], "Diwan");
        assert_eq!(value["borrowerName"], "Sara");
        assert_eq!(value["serialNumber"], 12);
        assert_eq!(value["action"], "return");
        assert!(value.get("specialNumber").is_none());
    }

    #[test]
    fn keeps_special_number_from_older_log_entries() {
        let raw = json!({
            "id": "0b6e7c1a-2f4d-4e1b-8c3a-5d9f1e2a7b40",
            "bookId": "6f1c1b9e-6a43-4a4b-9d0e-0d6c8f3a2b11",
            "bookTitle": "Kalila wa Dimna",
            "serialNumber": 77,
            "borrowerName": "Omar",
            "action": "borrow",
            "timestamp": "2025-03-02T09:30:00Z",
            "specialNumber": "K-3"
        });
        let record: LoanEventRecord = serde_json::from_value(raw).unwrap();
        let event = record.to_domain();

        assert_eq!(event.special_number.as_deref(), Some("K-3"));
        assert_eq!(event.subject, "");
        let back = serde_json::to_value(LoanEventRecord::from_domain(&event)).unwrap();
        assert_eq!(back["specialNumber"], "K-3");
    }
}
