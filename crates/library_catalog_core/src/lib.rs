pub mod catalog;
pub mod domain;
pub mod ports;
pub mod search;
pub mod service;
pub mod stats;

pub use catalog::{Applied, Catalog, CatalogError};
pub use domain::{ActiveLoan, Book, BookDraft, CopiesPolicy, Headline, LoanAction, LoanEvent};
pub use ports::{LibraryStore, PortError, PortResult};
pub use search::{BookQuery, LogQuery, StatusFilter};
pub use service::LibraryService;
pub use stats::{ActivitySummary, BookBorrowCount, BorrowerCount};
